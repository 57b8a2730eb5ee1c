//! Serializable identity of a registration.

use std::fmt;

use canopy_core::Datum;

/// Name under which a custom type is registered: an optional namespace
/// plus a type name.
///
/// The handle is what the serializer writes for custom nodes, so it must
/// stay stable for as long as persisted specs are expected to load.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeHandle {
    namespace: Option<String>,
    name: String,
}

impl TypeHandle {
    /// A handle in the global namespace.
    pub fn global(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    /// A handle in `namespace`. An empty namespace means global.
    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            namespace: (!namespace.is_empty()).then_some(namespace),
            name: name.into(),
        }
    }

    /// The namespace, or `None` for global registrations.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// The registered type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Self-describing form: `(namespace_or_None, name)`.
    pub fn to_datum(&self) -> Datum {
        let ns = match &self.namespace {
            Some(ns) => Datum::Str(ns.clone()),
            None => Datum::None,
        };
        Datum::Tuple(vec![ns, Datum::Str(self.name.clone())])
    }

    /// Inverse of [`to_datum`](TypeHandle::to_datum).
    pub fn from_datum(datum: &Datum) -> Option<Self> {
        let Datum::Tuple(parts) = datum else {
            return None;
        };
        match parts.as_slice() {
            [Datum::None, Datum::Str(name)] => Some(Self::global(name.clone())),
            [Datum::Str(ns), Datum::Str(name)] if !ns.is_empty() => {
                Some(Self::namespaced(ns.clone(), name.clone()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{ns}::{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}
