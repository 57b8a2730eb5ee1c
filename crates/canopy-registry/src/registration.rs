//! A single custom container registration.

use std::any::{Any, TypeId};
use std::fmt;

use canopy_core::{Datum, Object, Value};

use crate::error::RegistryError;
use crate::handle::TypeHandle;

/// How a tree spec renders nodes of a registered type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DisplayHint {
    /// `Name[aux](a, b)`, or `Name(a, b)` when there is no aux data.
    #[default]
    Generic,
    /// `Name([('k', a), ...])`; aux data is the sequence of distinct keys,
    /// one per child.
    OrderedDict,
    /// `Name(factory, {'k': a, ...})`; aux data is `(factory, keys)` with
    /// one distinct key per child.
    DefaultDict,
    /// `Name([a, b])`; aux data is absent or a non-negative `maxlen`.
    Deque,
}

impl DisplayHint {
    /// Whether `aux` has the shape this hint needs for a node with
    /// `arity` children.
    fn check_aux(self, aux: Option<&Datum>, arity: usize) -> Result<(), String> {
        match self {
            Self::Generic => Ok(()),
            Self::OrderedDict => check_keys(aux.and_then(Datum::as_seq), arity),
            Self::DefaultDict => match aux.and_then(Datum::as_seq) {
                Some([_, keys]) => check_keys(keys.as_seq(), arity),
                _ => Err("aux is not (factory, keys)".to_owned()),
            },
            Self::Deque => match aux {
                None | Some(Datum::Int(0..)) => Ok(()),
                Some(other) => Err(format!(
                    "maxlen {} is not a non-negative integer",
                    other.repr()
                )),
            },
        }
    }
}

fn check_keys(keys: Option<&[Datum]>, arity: usize) -> Result<(), String> {
    let Some(keys) = keys else {
        return Err("keys are not a sequence".to_owned());
    };
    if keys.len() != arity {
        return Err(format!("{} keys for {arity} children", keys.len()));
    }
    match Datum::first_duplicate(keys) {
        Some(key) => Err(format!("duplicate key {}", key.repr())),
        None => Ok(()),
    }
}

type ToChildren<L> = dyn Fn(&Object) -> Option<(Vec<Value<L>>, Option<Datum>)> + Send + Sync;
type FromChildren<L> = dyn Fn(Option<&Datum>, Vec<Value<L>>) -> Object + Send + Sync;

/// Decomposition and reconstruction functions for one concrete type.
///
/// Registrations are shared through `Arc`; tree spec nodes hold an `Arc`
/// to the registration they were built from, and two custom nodes are
/// only equal if they point at the same registration.
pub struct Registration<L> {
    handle: TypeHandle,
    type_id: TypeId,
    type_name: &'static str,
    hint: DisplayHint,
    to_children: Box<ToChildren<L>>,
    from_children: Box<FromChildren<L>>,
}

impl<L: 'static> Registration<L> {
    /// Build a registration for `T`.
    ///
    /// `to_children` returns the ordered children and optional aux data;
    /// `from_children` receives that aux data back with the (possibly
    /// transformed) children and rebuilds the value.
    pub fn new<T, F, G>(handle: TypeHandle, to_children: F, from_children: G) -> Self
    where
        T: Any + Send + Sync + PartialEq,
        F: Fn(&T) -> (Vec<Value<L>>, Option<Datum>) + Send + Sync + 'static,
        G: Fn(Option<&Datum>, Vec<Value<L>>) -> T + Send + Sync + 'static,
    {
        Self {
            handle,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            hint: DisplayHint::Generic,
            to_children: Box::new(move |obj: &Object| obj.downcast_ref::<T>().map(&to_children)),
            from_children: Box::new(move |aux: Option<&Datum>, children: Vec<Value<L>>| {
                Object::new(from_children(aux, children))
            }),
        }
    }
}

impl<L> Registration<L> {
    /// Set the rendering convention.
    pub fn with_display_hint(mut self, hint: DisplayHint) -> Self {
        self.hint = hint;
        self
    }

    /// Serializable identity.
    pub fn handle(&self) -> &TypeHandle {
        &self.handle
    }

    /// Registered type name (display name in rendered specs).
    pub fn name(&self) -> &str {
        self.handle.name()
    }

    /// Concrete Rust type this registration decomposes.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Concrete Rust type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Rendering convention.
    pub fn display_hint(&self) -> DisplayHint {
        self.hint
    }

    /// Split `obj` into children and aux data.
    ///
    /// Returns `None` if `obj` is not of the registered type.
    pub fn to_children(&self, obj: &Object) -> Option<(Vec<Value<L>>, Option<Datum>)> {
        (self.to_children)(obj)
    }

    /// Check `aux` against the display hint for a node with `arity`
    /// children.
    ///
    /// # Errors
    ///
    /// [`RegistryError::MalformedAux`] if the keys are missing, miscounted,
    /// or repeated, or a deque bound is not a non-negative integer.
    pub fn check_aux(&self, aux: Option<&Datum>, arity: usize) -> Result<(), RegistryError> {
        self.hint
            .check_aux(aux, arity)
            .map_err(|detail| RegistryError::MalformedAux {
                handle: self.handle.clone(),
                detail,
            })
    }

    /// Rebuild a value from aux data and children.
    ///
    /// The rebuild function only ever sees aux data that passed
    /// [`check_aux`](Self::check_aux).
    ///
    /// # Errors
    ///
    /// [`RegistryError::MalformedAux`] if `aux` does not fit the display
    /// hint for `children.len()` children.
    pub fn from_children(
        &self,
        aux: Option<&Datum>,
        children: Vec<Value<L>>,
    ) -> Result<Value<L>, RegistryError> {
        self.check_aux(aux, children.len())?;
        Ok(Value::Object((self.from_children)(aux, children)))
    }
}

impl<L> fmt::Debug for Registration<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("handle", &self.handle)
            .field("type_name", &self.type_name)
            .field("hint", &self.hint)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Pair(Value<i32>, Value<i32>);

    fn pair_registration() -> Registration<i32> {
        Registration::new(
            TypeHandle::global("Pair"),
            |p: &Pair| (vec![p.0.clone(), p.1.clone()], None),
            |_, children| {
                let mut it = children.into_iter();
                Pair(
                    it.next().unwrap_or(Value::None),
                    it.next().unwrap_or(Value::None),
                )
            },
        )
    }

    #[test]
    fn decomposes_registered_type() {
        let reg = pair_registration();
        let obj = Object::new(Pair(Value::Leaf(1), Value::Leaf(2)));
        let (children, aux) = reg.to_children(&obj).unwrap();
        assert_eq!(children, vec![Value::Leaf(1), Value::Leaf(2)]);
        assert_eq!(aux, None);
    }

    #[test]
    fn rejects_other_types() {
        let reg = pair_registration();
        assert!(reg.to_children(&Object::new(5u8)).is_none());
    }

    #[test]
    fn rebuilds_value() {
        let reg = pair_registration();
        let v = reg
            .from_children(None, vec![Value::Leaf(3), Value::Leaf(4)])
            .unwrap();
        assert_eq!(v, Value::object(Pair(Value::Leaf(3), Value::Leaf(4))));
    }

    #[test]
    fn generic_hint_accepts_any_aux() {
        let reg = pair_registration();
        assert!(reg.check_aux(Some(&Datum::Int(-1)), 2).is_ok());
        assert!(reg.check_aux(None, 0).is_ok());
    }

    #[test]
    fn ordered_dict_hint_needs_distinct_keys_per_child() {
        let reg = pair_registration().with_display_hint(DisplayHint::OrderedDict);
        let keys =
            |names: &[&str]| Datum::List(names.iter().map(|k| Datum::from(*k)).collect());
        assert!(reg.check_aux(Some(&keys(&["a", "b"])), 2).is_ok());
        assert!(reg.check_aux(Some(&keys(&["a"])), 2).is_err());
        assert!(reg.check_aux(Some(&keys(&["a", "a"])), 2).is_err());
        assert!(reg.check_aux(Some(&Datum::Int(5)), 0).is_err());
        assert!(reg.check_aux(None, 0).is_err());
    }

    #[test]
    fn default_dict_hint_needs_factory_and_keys() {
        let reg = pair_registration().with_display_hint(DisplayHint::DefaultDict);
        let aux = Datum::Tuple(vec![Datum::from("list"), Datum::List(vec![Datum::from("k")])]);
        assert!(reg.check_aux(Some(&aux), 1).is_ok());
        assert!(reg.check_aux(Some(&aux), 2).is_err());
        assert!(reg.check_aux(Some(&Datum::Int(5)), 0).is_err());
        let err = reg.check_aux(Some(&Datum::Tuple(vec![Datum::None])), 0).unwrap_err();
        assert!(matches!(err, RegistryError::MalformedAux { ref handle, .. }
            if *handle == TypeHandle::global("Pair")));
    }

    #[test]
    fn deque_hint_needs_non_negative_maxlen() {
        let reg = pair_registration().with_display_hint(DisplayHint::Deque);
        assert!(reg.check_aux(None, 3).is_ok());
        assert!(reg.check_aux(Some(&Datum::Int(0)), 3).is_ok());
        assert!(reg.check_aux(Some(&Datum::Int(-1)), 3).is_err());
        assert!(reg.check_aux(Some(&Datum::from("x")), 3).is_err());
    }

    #[test]
    fn rebuild_refuses_malformed_aux() {
        let reg = pair_registration().with_display_hint(DisplayHint::OrderedDict);
        let aux = Datum::List(vec![Datum::from("a")]);
        let result = reg.from_children(Some(&aux), vec![Value::Leaf(1), Value::Leaf(2)]);
        assert!(matches!(result, Err(RegistryError::MalformedAux { .. })));
    }

    #[test]
    fn metadata() {
        let reg = pair_registration().with_display_hint(DisplayHint::Deque);
        assert_eq!(reg.name(), "Pair");
        assert_eq!(reg.type_id(), TypeId::of::<Pair>());
        assert_eq!(reg.display_hint(), DisplayHint::Deque);
    }
}
