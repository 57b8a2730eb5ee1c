//! The type registry: which host values are containers, and how to take
//! them apart and put them back together.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use canopy_core::{Datum, NodeKind, Value};
use indexmap::IndexMap;

use crate::error::RegistryError;
use crate::handle::TypeHandle;
use crate::registration::Registration;

/// Result of classifying a value.
#[derive(Debug)]
pub enum Classification<L> {
    /// Atomic value, or an object of an unregistered type.
    Leaf,
    /// The unit value.
    None,
    /// Built-in tuple.
    Tuple,
    /// Built-in list.
    List,
    /// Built-in mapping.
    Dict,
    /// Named-tuple record.
    NamedTuple,
    /// Object of a registered type.
    Custom(Arc<Registration<L>>),
}

impl<L> Classification<L> {
    /// The node kind this classification produces.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Leaf => NodeKind::Leaf,
            Self::None => NodeKind::None,
            Self::Tuple => NodeKind::Tuple,
            Self::List => NodeKind::List,
            Self::Dict => NodeKind::Dict,
            Self::NamedTuple => NodeKind::NamedTuple,
            Self::Custom(_) => NodeKind::Custom,
        }
    }
}

struct Tables<L> {
    global: HashMap<TypeId, Arc<Registration<L>>>,
    named: HashMap<(String, TypeId), Arc<Registration<L>>>,
    by_handle: IndexMap<TypeHandle, Arc<Registration<L>>>,
}

/// Custom container registrations, shared by every flatten, unflatten,
/// and deserialize call that is handed this registry.
///
/// Built-in containers (`Tuple`, `List`, `Dict`, `Record`, `None`) are
/// always recognized. Objects are containers only if their concrete type
/// has been registered, either globally or in a namespace; global
/// registrations win over namespaced ones.
///
/// Lookups take a shared lock and may run concurrently; a registration
/// takes the exclusive lock only while inserting.
///
/// # Examples
///
/// ```
/// use canopy_registry::TypeRegistry;
/// use canopy_core::{Datum, Value};
///
/// #[derive(Debug, PartialEq)]
/// struct Point { x: i64, y: i64 }
///
/// let registry = TypeRegistry::<i64>::new();
/// registry
///     .register::<Point, _, _>(
///         "Point",
///         |p| (vec![Value::Leaf(p.x), Value::Leaf(p.y)], None),
///         |_, children| {
///             let xs: Vec<i64> = children.iter().filter_map(|c| c.as_leaf().copied()).collect();
///             Point { x: xs[0], y: xs[1] }
///         },
///     )
///     .unwrap();
///
/// let p = Value::object(Point { x: 1, y: 2 });
/// assert!(registry.classify(&p, None).kind() == canopy_core::NodeKind::Custom);
/// ```
pub struct TypeRegistry<L> {
    tables: RwLock<Tables<L>>,
}

impl<L> TypeRegistry<L> {
    /// An empty registry that only knows the built-in containers.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                global: HashMap::new(),
                named: HashMap::new(),
                by_handle: IndexMap::new(),
            }),
        }
    }

    /// Classify `value`, consulting `namespace` after global registrations.
    pub fn classify(&self, value: &Value<L>, namespace: Option<&str>) -> Classification<L> {
        match value {
            Value::Leaf(_) => Classification::Leaf,
            Value::None => Classification::None,
            Value::Tuple(_) => Classification::Tuple,
            Value::List(_) => Classification::List,
            Value::Dict(_) => Classification::Dict,
            Value::Record(_) => Classification::NamedTuple,
            Value::Object(obj) => match self.lookup(obj.type_id(), namespace) {
                Some(reg) => Classification::Custom(reg),
                None => Classification::Leaf,
            },
        }
    }

    /// Find the registration for a concrete type.
    pub fn lookup(&self, type_id: TypeId, namespace: Option<&str>) -> Option<Arc<Registration<L>>> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(reg) = tables.global.get(&type_id) {
            return Some(Arc::clone(reg));
        }
        let ns = namespace.filter(|ns| !ns.is_empty())?;
        tables
            .named
            .get(&(ns.to_owned(), type_id))
            .map(Arc::clone)
    }

    /// Find a registration by its serialized identity.
    pub fn lookup_by_handle(&self, handle: &TypeHandle) -> Option<Arc<Registration<L>>> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables.by_handle.get(handle).map(Arc::clone)
    }

    /// Handles of every registration, in registration order.
    pub fn handles(&self) -> Vec<TypeHandle> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables.by_handle.keys().cloned().collect()
    }

    /// Number of registrations across all namespaces.
    pub fn len(&self) -> usize {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables.by_handle.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a prebuilt registration.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateRegistration`] if the type is already
    /// registered globally, already registered in the handle's namespace,
    /// or the handle itself is taken.
    pub fn insert(
        &self,
        registration: Registration<L>,
    ) -> Result<Arc<Registration<L>>, RegistryError> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let handle = registration.handle().clone();
        let type_id = registration.type_id();
        let duplicate = || RegistryError::DuplicateRegistration {
            handle: handle.clone(),
            type_name: registration.type_name(),
        };

        if tables.global.contains_key(&type_id) || tables.by_handle.contains_key(&handle) {
            return Err(duplicate());
        }
        let named_key = handle.namespace().map(|ns| (ns.to_owned(), type_id));
        if let Some(key) = &named_key {
            if tables.named.contains_key(key) {
                return Err(duplicate());
            }
        }

        let registration = Arc::new(registration);
        match named_key {
            Some(key) => {
                tables.named.insert(key, Arc::clone(&registration));
            }
            None => {
                tables.global.insert(type_id, Arc::clone(&registration));
            }
        }
        tables.by_handle.insert(handle, Arc::clone(&registration));
        log::debug!(
            "registered custom type {} as {}",
            registration.type_name(),
            registration.handle()
        );
        Ok(registration)
    }
}

impl<L: 'static> TypeRegistry<L> {
    /// Register `T` in the global namespace under `name`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateRegistration`] if `T` or `name` is taken.
    pub fn register<T, F, G>(
        &self,
        name: &str,
        to_children: F,
        from_children: G,
    ) -> Result<Arc<Registration<L>>, RegistryError>
    where
        T: Any + Send + Sync + PartialEq,
        F: Fn(&T) -> (Vec<Value<L>>, Option<Datum>) + Send + Sync + 'static,
        G: Fn(Option<&Datum>, Vec<Value<L>>) -> T + Send + Sync + 'static,
    {
        self.insert(Registration::new(
            TypeHandle::global(name),
            to_children,
            from_children,
        ))
    }

    /// Register `T` in `namespace` under `name`. An empty namespace is
    /// the global namespace.
    ///
    /// A type registered globally cannot be registered in a namespace;
    /// the same type may be registered in several different namespaces.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateRegistration`] on any conflict.
    pub fn register_in<T, F, G>(
        &self,
        namespace: &str,
        name: &str,
        to_children: F,
        from_children: G,
    ) -> Result<Arc<Registration<L>>, RegistryError>
    where
        T: Any + Send + Sync + PartialEq,
        F: Fn(&T) -> (Vec<Value<L>>, Option<Datum>) + Send + Sync + 'static,
        G: Fn(Option<&Datum>, Vec<Value<L>>) -> T + Send + Sync + 'static,
    {
        self.insert(Registration::new(
            TypeHandle::namespaced(namespace, name),
            to_children,
            from_children,
        ))
    }
}

impl<L> Default for TypeRegistry<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L> std::fmt::Debug for TypeRegistry<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("handles", &self.handles())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::{Object, RecordType};

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Debug, PartialEq)]
    struct Unregistered;

    fn register_point(registry: &TypeRegistry<i32>, namespace: &str) -> Result<(), RegistryError> {
        registry
            .register_in::<Point, _, _>(
                namespace,
                "Point",
                |p| (vec![Value::Leaf(p.x), Value::Leaf(p.y)], None),
                |_, children| {
                    let mut it = children.into_iter().filter_map(|c| c.as_leaf().copied());
                    Point {
                        x: it.next().unwrap_or_default(),
                        y: it.next().unwrap_or_default(),
                    }
                },
            )
            .map(|_| ())
    }

    #[test]
    fn builtins_are_classified_without_registration() {
        let registry = TypeRegistry::<i32>::new();
        let ty = RecordType::new("P", ["a"]);
        let record = canopy_core::Record::new(ty, vec![Value::Leaf(1)]).unwrap();
        let cases: Vec<(Value<i32>, NodeKind)> = vec![
            (Value::Leaf(1), NodeKind::Leaf),
            (Value::None, NodeKind::None),
            (Value::tuple([]), NodeKind::Tuple),
            (Value::list([]), NodeKind::List),
            (Value::dict::<&str>([]), NodeKind::Dict),
            (Value::Record(record), NodeKind::NamedTuple),
        ];
        for (value, kind) in cases {
            assert_eq!(registry.classify(&value, None).kind(), kind);
        }
    }

    #[test]
    fn unregistered_objects_are_leaves() {
        let registry = TypeRegistry::<i32>::new();
        let v = Value::object(Unregistered);
        assert_eq!(registry.classify(&v, None).kind(), NodeKind::Leaf);
    }

    #[test]
    fn registered_objects_are_custom() {
        let registry = TypeRegistry::<i32>::new();
        register_point(&registry, "").unwrap();
        let v = Value::Object(Object::new(Point { x: 1, y: 2 }));
        match registry.classify(&v, None) {
            Classification::Custom(reg) => assert_eq!(reg.name(), "Point"),
            other => panic!("expected custom, got {:?}", other.kind()),
        }
    }

    #[test]
    fn duplicate_global_registration_rejected() {
        let registry = TypeRegistry::<i32>::new();
        register_point(&registry, "").unwrap();
        let err = register_point(&registry, "").unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateRegistration { .. }));
        assert!(err.to_string().contains("global namespace"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn globally_registered_type_cannot_be_namespaced() {
        let registry = TypeRegistry::<i32>::new();
        register_point(&registry, "").unwrap();
        assert!(register_point(&registry, "geo").is_err());
    }

    #[test]
    fn namespaced_registration_is_scoped() {
        let registry = TypeRegistry::<i32>::new();
        register_point(&registry, "geo").unwrap();
        register_point(&registry, "draw").unwrap();
        assert!(register_point(&registry, "geo").is_err());

        let v = Value::object(Point { x: 0, y: 0 });
        assert_eq!(registry.classify(&v, None).kind(), NodeKind::Leaf);
        assert_eq!(registry.classify(&v, Some("other")).kind(), NodeKind::Leaf);
        assert_eq!(registry.classify(&v, Some("geo")).kind(), NodeKind::Custom);
        assert_eq!(registry.classify(&v, Some("draw")).kind(), NodeKind::Custom);
    }

    #[test]
    fn lookup_by_handle_finds_exact_namespace() {
        let registry = TypeRegistry::<i32>::new();
        register_point(&registry, "geo").unwrap();
        assert!(registry
            .lookup_by_handle(&TypeHandle::namespaced("geo", "Point"))
            .is_some());
        assert!(registry
            .lookup_by_handle(&TypeHandle::global("Point"))
            .is_none());
    }

    #[test]
    fn same_registration_is_shared() {
        let registry = TypeRegistry::<i32>::new();
        register_point(&registry, "").unwrap();
        let a = registry.lookup(TypeId::of::<Point>(), None).unwrap();
        let b = registry
            .lookup_by_handle(&TypeHandle::global("Point"))
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn concurrent_lookups_and_registration() {
        let registry = Arc::new(TypeRegistry::<i32>::new());
        register_point(&registry, "").unwrap();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    if i == 0 {
                        registry
                            .register::<Unregistered, _, _>(
                                "Unit",
                                |_| (vec![], None),
                                |_, _| Unregistered,
                            )
                            .unwrap();
                    }
                    let v = Value::object(Point { x: i, y: i });
                    registry.classify(&v, None).kind()
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), NodeKind::Custom);
        }
        assert_eq!(registry.len(), 2);
    }
}
