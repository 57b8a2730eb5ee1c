//! Standard collection types with ready-made registrations.
//!
//! [`OrderedDict`], [`DefaultDict`], and [`Deque`] are ordinary custom
//! containers; [`TypeRegistry::with_standard_collections`] registers all
//! three globally with their display hints.

use std::collections::VecDeque;

use canopy_core::{Datum, Value};
use indexmap::IndexMap;

use crate::error::RegistryError;
use crate::handle::TypeHandle;
use crate::registration::{DisplayHint, Registration};
use crate::registry::TypeRegistry;

/// Insertion-ordered mapping whose equality is order-sensitive.
#[derive(Clone, Debug)]
pub struct OrderedDict<L>(pub IndexMap<Datum, Value<L>>);

impl<L: PartialEq> PartialEq for OrderedDict<L> {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().eq(other.0.iter())
    }
}

/// Mapping with a default-value factory, identified by a datum.
#[derive(Clone, Debug, PartialEq)]
pub struct DefaultDict<L> {
    /// Identifies the factory that fills missing keys.
    pub default_factory: Datum,
    /// Entries in insertion order.
    pub entries: IndexMap<Datum, Value<L>>,
}

/// Double-ended queue with an optional length bound.
#[derive(Clone, Debug, PartialEq)]
pub struct Deque<L> {
    /// Items front to back.
    pub items: VecDeque<Value<L>>,
    /// Maximum length, if bounded.
    pub maxlen: Option<usize>,
}

// The rebuild closures below only receive aux data that passed
// `Registration::check_aux`: one distinct key per child, and a
// `(factory, keys)` pair for default dicts.

fn rebuild_map<L>(keys: &[Datum], children: Vec<Value<L>>) -> IndexMap<Datum, Value<L>> {
    debug_assert_eq!(keys.len(), children.len());
    keys.iter().cloned().zip(children).collect()
}

fn map_keys(aux: Option<&Datum>) -> &[Datum] {
    aux.and_then(Datum::as_seq).unwrap_or_default()
}

impl<L> TypeRegistry<L>
where
    L: Clone + PartialEq + Send + Sync + 'static,
{
    /// A registry with [`OrderedDict`], [`DefaultDict`], and [`Deque`]
    /// registered globally.
    pub fn with_standard_collections() -> Self {
        let registry = Self::new();
        // A fresh registry has no conflicting entries.
        let _ = registry.register_standard_collections();
        registry
    }

    /// Register the standard collections into this registry.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateRegistration`] if any of them is
    /// already registered.
    pub fn register_standard_collections(&self) -> Result<(), RegistryError> {
        self.insert(
            Registration::new(
                TypeHandle::global("OrderedDict"),
                |d: &OrderedDict<L>| {
                    let keys = d.0.keys().cloned().collect();
                    (d.0.values().cloned().collect(), Some(Datum::List(keys)))
                },
                |aux, children| OrderedDict(rebuild_map(map_keys(aux), children)),
            )
            .with_display_hint(DisplayHint::OrderedDict),
        )?;

        self.insert(
            Registration::new(
                TypeHandle::global("DefaultDict"),
                |d: &DefaultDict<L>| {
                    let keys = d.entries.keys().cloned().collect();
                    let aux = Datum::Tuple(vec![d.default_factory.clone(), Datum::List(keys)]);
                    (d.entries.values().cloned().collect(), Some(aux))
                },
                |aux, children| {
                    let (default_factory, keys) = match map_keys(aux) {
                        [factory, keys] => (factory.clone(), map_keys(Some(keys))),
                        _ => (Datum::None, &[][..]),
                    };
                    DefaultDict {
                        default_factory,
                        entries: rebuild_map(keys, children),
                    }
                },
            )
            .with_display_hint(DisplayHint::DefaultDict),
        )?;

        self.insert(
            Registration::new(
                TypeHandle::global("Deque"),
                |d: &Deque<L>| {
                    let maxlen = match d.maxlen {
                        Some(n) => Datum::Int(n as i64),
                        None => Datum::None,
                    };
                    (d.items.iter().cloned().collect(), Some(maxlen))
                },
                |aux, children| Deque {
                    items: children.into(),
                    maxlen: aux
                        .and_then(Datum::as_int)
                        .and_then(|n| usize::try_from(n).ok()),
                },
            )
            .with_display_hint(DisplayHint::Deque),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::{NodeKind, Object};

    fn od(entries: &[(&str, i32)]) -> OrderedDict<i32> {
        OrderedDict(
            entries
                .iter()
                .map(|(k, v)| (Datum::from(*k), Value::Leaf(*v)))
                .collect(),
        )
    }

    #[test]
    fn ordered_dict_equality_is_order_sensitive() {
        assert_eq!(od(&[("a", 1), ("b", 2)]), od(&[("a", 1), ("b", 2)]));
        assert_ne!(od(&[("a", 1), ("b", 2)]), od(&[("b", 2), ("a", 1)]));
    }

    #[test]
    fn standard_collections_registered() {
        let registry = TypeRegistry::<i32>::with_standard_collections();
        assert_eq!(
            registry.handles(),
            vec![
                TypeHandle::global("OrderedDict"),
                TypeHandle::global("DefaultDict"),
                TypeHandle::global("Deque"),
            ]
        );
        assert!(registry.register_standard_collections().is_err());
    }

    #[test]
    fn ordered_dict_roundtrips_through_registration() {
        let registry = TypeRegistry::<i32>::with_standard_collections();
        let value = Value::object(od(&[("x", 1), ("y", 2)]));
        let Value::Object(obj) = &value else {
            unreachable!()
        };
        let reg = registry.lookup(obj.type_id(), None).unwrap();
        assert_eq!(reg.display_hint(), DisplayHint::OrderedDict);
        let (children, aux) = reg.to_children(obj).unwrap();
        assert_eq!(
            aux,
            Some(Datum::List(vec![Datum::from("x"), Datum::from("y")]))
        );
        assert_eq!(reg.from_children(aux.as_ref(), children).unwrap(), value);
    }

    #[test]
    fn default_dict_keeps_factory() {
        let registry = TypeRegistry::<i32>::with_standard_collections();
        let dd = DefaultDict {
            default_factory: Datum::from("list"),
            entries: [(Datum::from("k"), Value::Leaf(7))].into_iter().collect(),
        };
        let obj = Object::new(dd.clone());
        let reg = registry.lookup(obj.type_id(), None).unwrap();
        let (children, aux) = reg.to_children(&obj).unwrap();
        assert_eq!(
            aux,
            Some(Datum::Tuple(vec![
                Datum::from("list"),
                Datum::List(vec![Datum::from("k")])
            ]))
        );
        assert_eq!(
            reg.from_children(aux.as_ref(), children).unwrap(),
            Value::object(dd)
        );
    }

    #[test]
    fn deque_keeps_maxlen() {
        let registry = TypeRegistry::<i32>::with_standard_collections();
        let dq = Deque {
            items: [Value::Leaf(1), Value::Leaf(2)].into_iter().collect(),
            maxlen: Some(4),
        };
        let v = Value::object(dq.clone());
        assert_eq!(registry.classify(&v, None).kind(), NodeKind::Custom);
        let Value::Object(obj) = &v else {
            unreachable!()
        };
        let reg = registry.lookup(obj.type_id(), None).unwrap();
        let (children, aux) = reg.to_children(obj).unwrap();
        assert_eq!(aux, Some(Datum::Int(4)));
        assert_eq!(reg.from_children(aux.as_ref(), children).unwrap(), v);
    }

    #[test]
    fn miscounted_keys_do_not_rebuild() {
        let registry = TypeRegistry::<i32>::with_standard_collections();
        let obj = Object::new(od(&[("a", 1)]));
        let reg = registry.lookup(obj.type_id(), None).unwrap();
        let aux = Datum::List(vec![Datum::from("a")]);
        let two = vec![Value::Leaf(1), Value::Leaf(2)];
        assert!(matches!(
            reg.from_children(Some(&aux), two),
            Err(RegistryError::MalformedAux { .. })
        ));
        let dupes = Datum::List(vec![Datum::from("a"), Datum::from("a")]);
        let two = vec![Value::Leaf(1), Value::Leaf(2)];
        assert!(reg.from_children(Some(&dupes), two).is_err());
    }
}
