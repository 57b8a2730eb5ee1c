//! Unflatten engine: (spec, leaves) to value.

use std::sync::Arc;

use canopy_core::{Record, StructureFault, TreeError, Value};
use smallvec::SmallVec;

use crate::node::NodeData;
use crate::spec::TreeSpec;

type Stack<L> = SmallVec<[Value<L>; 8]>;

impl<L> TreeSpec<L> {
    /// Rebuild a value of this shape from `leaves`.
    ///
    /// Leaves are consumed left to right, one per Leaf node. None nodes
    /// consume nothing. Nothing is returned on error; a partially built
    /// value is dropped.
    ///
    /// # Errors
    ///
    /// - [`TreeError::LeafCount`] if `leaves` runs out before the
    ///   traversal ends, or still has items once it does. A surplus is
    ///   detected by pulling one more leaf, so `supplied` is then
    ///   `expected + 1` however long the iterator is.
    /// - [`TreeError::Fault`] if the spec is empty (there is nothing to
    ///   build) or internally inconsistent.
    pub fn unflatten(
        &self,
        leaves: impl IntoIterator<Item = Value<L>>,
    ) -> Result<Value<L>, TreeError> {
        if self.is_empty() {
            return Err(StructureFault::Structural { remaining: 0 }.into());
        }
        let expected = self.num_leaves();
        let mut leaves = leaves.into_iter();
        let mut consumed = 0;
        let mut stack: Stack<L> = SmallVec::new();

        for (index, node) in self.nodes().iter().enumerate() {
            let value = match node.data() {
                NodeData::Leaf => {
                    let Some(leaf) = leaves.next() else {
                        return Err(TreeError::LeafCount {
                            expected,
                            supplied: consumed,
                        });
                    };
                    consumed += 1;
                    leaf
                }
                NodeData::None => Value::None,
                NodeData::Tuple => Value::Tuple(take_children(&mut stack, index, node.arity())?),
                NodeData::List => Value::List(take_children(&mut stack, index, node.arity())?),
                NodeData::Dict { keys } => {
                    let children = take_children(&mut stack, index, node.arity())?;
                    if keys.len() != children.len() {
                        return Err(StructureFault::MetadataMismatch {
                            node: index,
                            detail: format!("{} keys for {} children", keys.len(), children.len()),
                        }
                        .into());
                    }
                    Value::Dict(keys.iter().cloned().zip(children).collect())
                }
                NodeData::NamedTuple { record } => {
                    let children = take_children(&mut stack, index, node.arity())?;
                    let record = Record::new(Arc::clone(record), children).map_err(|err| {
                        StructureFault::MetadataMismatch {
                            node: index,
                            detail: err.to_string(),
                        }
                    })?;
                    Value::Record(record)
                }
                NodeData::Custom { registration, aux } => {
                    let children = take_children(&mut stack, index, node.arity())?;
                    registration
                        .from_children(aux.as_ref(), children)
                        .map_err(|err| StructureFault::MetadataMismatch {
                            node: index,
                            detail: err.to_string(),
                        })?
                }
            };
            stack.push(value);
        }

        // The surplus is not drained; the iterator may be unbounded.
        if leaves.next().is_some() {
            return Err(TreeError::LeafCount {
                expected,
                supplied: consumed + 1,
            });
        }
        if stack.len() != 1 {
            return Err(StructureFault::Structural {
                remaining: stack.len(),
            }
            .into());
        }
        log::trace!("unflattened {consumed} leaves across {} nodes", self.num_nodes());
        stack
            .pop()
            .ok_or_else(|| StructureFault::Structural { remaining: 0 }.into())
    }

    /// Rebuild a value from bare leaf payloads.
    ///
    /// # Errors
    ///
    /// See [`TreeSpec::unflatten`].
    pub fn unflatten_leaves(
        &self,
        leaves: impl IntoIterator<Item = L>,
    ) -> Result<Value<L>, TreeError> {
        self.unflatten(leaves.into_iter().map(Value::Leaf))
    }
}

/// Pop the top `arity` values, keeping their order.
fn take_children<L>(
    stack: &mut Stack<L>,
    index: usize,
    arity: usize,
) -> Result<Vec<Value<L>>, StructureFault> {
    if stack.len() < arity {
        return Err(StructureFault::Arity {
            node: index,
            arity,
            available: stack.len(),
        });
    }
    let start = stack.len() - arity;
    Ok(stack.drain(start..).collect())
}
