//! Test fixtures and strategies for Canopy development.
//!
//! Provides two sample custom container types ([`Point`] and [`Tagged`]),
//! a registry pre-populated with them plus the standard collections, the
//! sample trees used across the test suites ([`fixtures`]), and proptest
//! strategies for generated trees ([`strategies`]).

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod strategies;

use std::sync::Arc;

use canopy_core::{Datum, Value};
use canopy_registry::{Registration, RegistryError, TypeRegistry};

/// Leaf payload used by the fixtures.
pub type Leaf = i64;

/// Two-field custom container without aux data.
///
/// Renders as `Point(*, *)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    pub x: Value<Leaf>,
    pub y: Value<Leaf>,
}

impl Point {
    pub fn new(x: Value<Leaf>, y: Value<Leaf>) -> Self {
        Self { x, y }
    }
}

/// Variable-arity custom container whose tag travels as aux data.
///
/// Renders as `Tagged[tag](*, ...)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Tagged {
    pub tag: String,
    pub items: Vec<Value<Leaf>>,
}

impl Tagged {
    pub fn new(tag: impl Into<String>, items: impl IntoIterator<Item = Value<Leaf>>) -> Self {
        Self {
            tag: tag.into(),
            items: items.into_iter().collect(),
        }
    }
}

/// Register [`Point`] globally.
pub fn register_point(
    registry: &TypeRegistry<Leaf>,
) -> Result<Arc<Registration<Leaf>>, RegistryError> {
    registry.register::<Point, _, _>(
        "Point",
        |p| (vec![p.x.clone(), p.y.clone()], None),
        |_, children| {
            let mut it = children.into_iter();
            Point {
                x: it.next().unwrap_or(Value::None),
                y: it.next().unwrap_or(Value::None),
            }
        },
    )
}

/// Register [`Tagged`] globally.
pub fn register_tagged(
    registry: &TypeRegistry<Leaf>,
) -> Result<Arc<Registration<Leaf>>, RegistryError> {
    registry.register::<Tagged, _, _>(
        "Tagged",
        |t| (t.items.clone(), Some(Datum::Str(t.tag.clone()))),
        |aux, children| Tagged {
            tag: aux.and_then(Datum::as_str).unwrap_or_default().to_owned(),
            items: children,
        },
    )
}

/// A registry with the standard collections, [`Point`], and [`Tagged`].
pub fn registry_with_fixtures() -> TypeRegistry<Leaf> {
    let registry = TypeRegistry::with_standard_collections();
    // A fresh registry holds neither type yet.
    let _ = register_point(&registry);
    let _ = register_tagged(&registry);
    registry
}

/// Leaf values `0..n`.
pub fn leaves(n: usize) -> Vec<Value<Leaf>> {
    (0..n as Leaf).map(Value::Leaf).collect()
}
