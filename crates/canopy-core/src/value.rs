//! The host value model walked by the flatten and unflatten engines.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::datum::Datum;
use crate::error::ValueError;

/// A nested host value.
///
/// `L` is the leaf payload; the core never looks inside it. Built-in
/// containers are variants; anything else travels as an [`Object`], which
/// is a container only if its concrete type has a registry entry.
///
/// The flatten and unflatten engines walk values with explicit stacks,
/// but the derived `Clone`, `PartialEq`, `Debug`, and `Drop` of this type
/// recurse once per nesting level. Values nested tens of thousands of
/// levels deep should be taken apart iteratively rather than dropped
/// whole on a small stack.
///
/// # Examples
///
/// ```
/// use canopy_core::Value;
///
/// let v: Value<i32> = Value::tuple([
///     Value::list([Value::Leaf(1), Value::Leaf(2)]),
///     Value::Leaf(3),
/// ]);
/// assert!(matches!(v, Value::Tuple(ref items) if items.len() == 2));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value<L> {
    /// An atomic leaf.
    Leaf(L),
    /// The unit value.
    None,
    /// Fixed-length positional container.
    Tuple(Vec<Value<L>>),
    /// Variable-length positional container.
    List(Vec<Value<L>>),
    /// Insertion-ordered mapping.
    Dict(IndexMap<Datum, Value<L>>),
    /// Named-tuple instance.
    Record(Record<L>),
    /// Type-erased host value.
    Object(Object),
}

impl<L> Value<L> {
    /// Build a tuple from any sequence of values.
    pub fn tuple(items: impl IntoIterator<Item = Value<L>>) -> Self {
        Self::Tuple(items.into_iter().collect())
    }

    /// Build a list from any sequence of values.
    pub fn list(items: impl IntoIterator<Item = Value<L>>) -> Self {
        Self::List(items.into_iter().collect())
    }

    /// Build a mapping, preserving the order of `entries`.
    ///
    /// A repeated key keeps its first position and takes the last value.
    pub fn dict<K: Into<Datum>>(entries: impl IntoIterator<Item = (K, Value<L>)>) -> Self {
        Self::Dict(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Wrap a host value of any type.
    pub fn object<T: Any + Send + Sync + PartialEq>(value: T) -> Self {
        Self::Object(Object::new(value))
    }

    /// Returns the leaf payload, if this is a leaf.
    pub fn as_leaf(&self) -> Option<&L> {
        match self {
            Self::Leaf(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the object, if this is an object.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl<L> From<Record<L>> for Value<L> {
    fn from(r: Record<L>) -> Self {
        Self::Record(r)
    }
}

impl<L> From<Object> for Value<L> {
    fn from(o: Object) -> Self {
        Self::Object(o)
    }
}

// ── Records ─────────────────────────────────────────────────────

/// Descriptor of a named-tuple type: its name and ordered field names.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordType {
    name: String,
    fields: Vec<String>,
}

impl RecordType {
    /// Create a shared descriptor.
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = S>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        })
    }

    /// Type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field names, in positional order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Number of fields.
    pub fn arity(&self) -> usize {
        self.fields.len()
    }
}

/// An instance of a [`RecordType`].
///
/// The value count always equals the descriptor's field count.
#[derive(Clone, Debug, PartialEq)]
pub struct Record<L> {
    ty: Arc<RecordType>,
    values: Vec<Value<L>>,
}

impl<L> Record<L> {
    /// Create a record, checking the value count against the descriptor.
    pub fn new(ty: Arc<RecordType>, values: Vec<Value<L>>) -> Result<Self, ValueError> {
        if values.len() != ty.arity() {
            return Err(ValueError::FieldCount {
                record: ty.name().to_owned(),
                expected: ty.arity(),
                found: values.len(),
            });
        }
        Ok(Self { ty, values })
    }

    /// The record's descriptor.
    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.ty
    }

    /// Field values in positional order.
    pub fn values(&self) -> &[Value<L>] {
        &self.values
    }

    /// Look up a field by name.
    pub fn get(&self, field: &str) -> Option<&Value<L>> {
        let idx = self.ty.fields.iter().position(|f| f == field)?;
        self.values.get(idx)
    }

    /// Split into descriptor and values.
    pub fn into_parts(self) -> (Arc<RecordType>, Vec<Value<L>>) {
        (self.ty, self.values)
    }
}

// ── Objects ─────────────────────────────────────────────────────

type ErasedEq = fn(&(dyn Any + Send + Sync), &(dyn Any + Send + Sync)) -> bool;

fn erased_eq<T: Any + PartialEq>(a: &(dyn Any + Send + Sync), b: &(dyn Any + Send + Sync)) -> bool {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// A type-erased, shared host value.
///
/// Cloning shares the underlying value. Objects created with
/// [`Object::new`] compare by value; objects created with
/// [`Object::opaque`] compare by identity only.
#[derive(Clone)]
pub struct Object {
    inner: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
    eq: Option<ErasedEq>,
}

impl Object {
    /// Wrap a value that compares by value.
    pub fn new<T: Any + Send + Sync + PartialEq>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            eq: Some(erased_eq::<T>),
        }
    }

    /// Wrap a value that compares by identity.
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            eq: None,
        }
    }

    /// The concrete type's id, used for registry lookup.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The concrete type's Rust name (diagnostics only).
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrow the concrete value.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Whether both handles share the same allocation.
    pub fn ptr_eq(&self, other: &Object) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.type_id != other.type_id {
            return false;
        }
        match self.eq {
            Some(eq) => eq(self.inner.as_ref(), other.inner.as_ref()),
            None => false,
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self.type_name)
    }
}
