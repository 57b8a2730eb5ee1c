//! Flatten engine: value to (leaves, spec).
//!
//! The walk uses an explicit task stack instead of native recursion, so
//! nesting depth is bounded by memory rather than by the thread's stack.
//! Each container pushes a `Finish` task followed by its children in
//! reverse order; when the `Finish` task pops, every child subtree has
//! been emitted and the container's counts fall out of the lengths of the
//! node and leaf vectors.

use std::sync::Arc;

use canopy_core::{Datum, StructureFault, TreeError, Value};
use canopy_registry::{Classification, TypeRegistry};

use crate::config::{DictOrder, FlattenConfig};
use crate::node::{Node, NodeData};
use crate::spec::{check_metadata, TreeSpec};

/// Result of flattening: the leaves in traversal order and the shape.
#[derive(Clone, Debug, PartialEq)]
pub struct Flattened<L> {
    /// Leaves, left to right.
    pub leaves: Vec<Value<L>>,
    /// Shape of the flattened value.
    pub spec: TreeSpec<L>,
}

impl<L> Flattened<L> {
    /// Split into leaves and spec.
    pub fn into_parts(self) -> (Vec<Value<L>>, TreeSpec<L>) {
        (self.leaves, self.spec)
    }
}

/// Flatten `value` with the default [`FlattenConfig`].
///
/// # Errors
///
/// Only [`StructureFault::CustomTypeMismatch`], if a registration refuses
/// a value the registry classified for it.
///
/// # Examples
///
/// ```
/// use canopy_core::Value;
/// use canopy_registry::TypeRegistry;
/// use canopy_spec::flatten;
///
/// let registry = TypeRegistry::new();
/// let value = Value::tuple([
///     Value::list([Value::Leaf(1), Value::Leaf(2)]),
///     Value::Leaf(3),
/// ]);
/// let flat = flatten(&registry, &value).unwrap();
/// assert_eq!(flat.leaves, vec![Value::Leaf(1), Value::Leaf(2), Value::Leaf(3)]);
/// assert_eq!(flat.spec.to_string(), "TreeSpec(([*, *], *))");
/// ```
pub fn flatten<L: Clone>(
    registry: &TypeRegistry<L>,
    value: &Value<L>,
) -> Result<Flattened<L>, TreeError> {
    flatten_with(registry, value, &FlattenConfig::default())
}

/// Flatten `value` under `config`.
///
/// # Errors
///
/// See [`flatten`].
pub fn flatten_with<L: Clone>(
    registry: &TypeRegistry<L>,
    value: &Value<L>,
    config: &FlattenConfig,
) -> Result<Flattened<L>, TreeError> {
    let namespace = config.namespace.as_deref();
    let mut leaves: Vec<Value<L>> = Vec::new();
    let mut nodes: Vec<Node<L>> = Vec::new();
    let mut tasks: Vec<Task<'_, L>> = vec![Task::Visit(Slot::Borrowed(value))];

    while let Some(task) = tasks.pop() {
        let slot = match task {
            Task::Visit(slot) => slot,
            Task::Finish {
                data,
                arity,
                node_start,
                leaf_start,
            } => {
                if matches!(data, NodeData::Custom { .. }) {
                    check_metadata(nodes.len(), &data, arity)?;
                }
                let num_leaves = leaves.len() - leaf_start;
                let num_nodes = nodes.len() - node_start + 1;
                nodes.push(Node::with_counts(data, arity, num_leaves, num_nodes));
                continue;
            }
        };

        let (data, children) = match slot.value() {
            Value::None if !config.none_is_leaf => {
                nodes.push(Node::none());
                continue;
            }
            Value::Leaf(_) | Value::None => {
                leaves.push(slot.into_value());
                nodes.push(Node::leaf());
                continue;
            }
            Value::Tuple(_) => (NodeData::Tuple, slot.into_children()),
            Value::List(_) => (NodeData::List, slot.into_children()),
            Value::Record(r) => {
                let record = Arc::clone(r.record_type());
                (NodeData::NamedTuple { record }, slot.into_children())
            }
            Value::Dict(map) => {
                let keys: Vec<Datum> = map.keys().cloned().collect();
                let mut entries: Vec<(Datum, Slot<'_, L>)> =
                    keys.into_iter().zip(slot.into_children()).collect();
                if config.dict_order == DictOrder::Sorted {
                    entries.sort_by(|a, b| a.0.cmp(&b.0));
                }
                let (keys, children): (Vec<Datum>, Vec<Slot<'_, L>>) = entries.into_iter().unzip();
                (NodeData::Dict { keys: keys.into() }, children)
            }
            Value::Object(object) => {
                let Classification::Custom(registration) =
                    registry.classify(slot.value(), namespace)
                else {
                    leaves.push(slot.into_value());
                    nodes.push(Node::leaf());
                    continue;
                };
                let (children, aux) = registration.to_children(object).ok_or(
                    StructureFault::CustomTypeMismatch {
                        type_name: object.type_name(),
                    },
                )?;
                let children = children.into_iter().map(Slot::Owned).collect();
                // A unit aux is recorded as no aux at all.
                let aux = aux.filter(|aux| *aux != Datum::None);
                (NodeData::Custom { registration, aux }, children)
            }
        };

        tasks.push(Task::Finish {
            data,
            arity: children.len(),
            node_start: nodes.len(),
            leaf_start: leaves.len(),
        });
        tasks.extend(children.into_iter().rev().map(Task::Visit));
    }

    log::trace!(
        "flattened value into {} leaves across {} nodes",
        leaves.len(),
        nodes.len()
    );
    Ok(Flattened {
        leaves,
        spec: TreeSpec::from_trusted(nodes),
    })
}

enum Task<'a, L> {
    Visit(Slot<'a, L>),
    Finish {
        data: NodeData<L>,
        arity: usize,
        node_start: usize,
        leaf_start: usize,
    },
}

/// A value still to be visited. Children of custom containers are
/// produced by value, everything else is borrowed from the input.
enum Slot<'a, L> {
    Borrowed(&'a Value<L>),
    Owned(Value<L>),
}

impl<'a, L: Clone> Slot<'a, L> {
    fn value(&self) -> &Value<L> {
        match self {
            Self::Borrowed(v) => v,
            Self::Owned(v) => v,
        }
    }

    fn into_value(self) -> Value<L> {
        match self {
            Self::Borrowed(v) => v.clone(),
            Self::Owned(v) => v,
        }
    }

    /// Children of a built-in container, left to right.
    fn into_children(self) -> Vec<Slot<'a, L>> {
        match self {
            Self::Borrowed(value) => match value {
                Value::Tuple(items) | Value::List(items) => {
                    items.iter().map(Slot::Borrowed).collect()
                }
                Value::Record(record) => record.values().iter().map(Slot::Borrowed).collect(),
                Value::Dict(map) => map.values().map(Slot::Borrowed).collect(),
                _ => Vec::new(),
            },
            Self::Owned(value) => match value {
                Value::Tuple(items) | Value::List(items) => {
                    items.into_iter().map(Slot::Owned).collect()
                }
                Value::Record(record) => {
                    record.into_parts().1.into_iter().map(Slot::Owned).collect()
                }
                Value::Dict(map) => map.into_values().map(Slot::Owned).collect(),
                _ => Vec::new(),
            },
        }
    }
}
