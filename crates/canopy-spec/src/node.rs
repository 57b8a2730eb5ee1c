//! Traversal nodes.

use std::fmt;
use std::sync::Arc;

use canopy_core::{Datum, NodeKind, RecordType};
use canopy_registry::Registration;

/// Per-kind node metadata.
///
/// Each variant carries exactly what its kind needs, so a leaf with keys
/// or a custom node without a registration cannot be built.
pub enum NodeData<L> {
    /// Atomic leaf placeholder.
    Leaf,
    /// Unit container.
    None,
    /// Positional tuple.
    Tuple,
    /// Positional list.
    List,
    /// Mapping; `keys[i]` pairs with child `i`.
    Dict {
        /// Keys in child order.
        keys: Arc<[Datum]>,
    },
    /// Named-tuple record.
    NamedTuple {
        /// Record descriptor.
        record: Arc<RecordType>,
    },
    /// Registered custom container.
    Custom {
        /// The registration this node was built from.
        registration: Arc<Registration<L>>,
        /// Aux data returned by `to_children`; never `Some(Datum::None)`.
        aux: Option<Datum>,
    },
}

impl<L> NodeData<L> {
    /// Kind tag of this metadata.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Leaf => NodeKind::Leaf,
            Self::None => NodeKind::None,
            Self::Tuple => NodeKind::Tuple,
            Self::List => NodeKind::List,
            Self::Dict { .. } => NodeKind::Dict,
            Self::NamedTuple { .. } => NodeKind::NamedTuple,
            Self::Custom { .. } => NodeKind::Custom,
        }
    }
}

impl<L> Clone for NodeData<L> {
    fn clone(&self) -> Self {
        match self {
            Self::Leaf => Self::Leaf,
            Self::None => Self::None,
            Self::Tuple => Self::Tuple,
            Self::List => Self::List,
            Self::Dict { keys } => Self::Dict {
                keys: Arc::clone(keys),
            },
            Self::NamedTuple { record } => Self::NamedTuple {
                record: Arc::clone(record),
            },
            Self::Custom { registration, aux } => Self::Custom {
                registration: Arc::clone(registration),
                aux: aux.clone(),
            },
        }
    }
}

/// Metadata compares by value; custom registrations compare by identity.
impl<L> PartialEq for NodeData<L> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Leaf, Self::Leaf)
            | (Self::None, Self::None)
            | (Self::Tuple, Self::Tuple)
            | (Self::List, Self::List) => true,
            (Self::Dict { keys: a }, Self::Dict { keys: b }) => a == b,
            (Self::NamedTuple { record: a }, Self::NamedTuple { record: b }) => a == b,
            (
                Self::Custom {
                    registration: ra,
                    aux: a,
                },
                Self::Custom {
                    registration: rb,
                    aux: b,
                },
            ) => Arc::ptr_eq(ra, rb) && a == b,
            _ => false,
        }
    }
}

impl<L> Eq for NodeData<L> {}

impl<L> fmt::Debug for NodeData<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf => f.write_str("Leaf"),
            Self::None => f.write_str("None"),
            Self::Tuple => f.write_str("Tuple"),
            Self::List => f.write_str("List"),
            Self::Dict { keys } => f.debug_struct("Dict").field("keys", keys).finish(),
            Self::NamedTuple { record } => f
                .debug_struct("NamedTuple")
                .field("record", record)
                .finish(),
            Self::Custom { registration, aux } => f
                .debug_struct("Custom")
                .field("handle", registration.handle())
                .field("aux", aux)
                .finish(),
        }
    }
}

/// One entry of a tree spec traversal, in post-order.
///
/// `num_leaves` and `num_nodes` describe the whole subtree rooted here and
/// are derived from the children; equality ignores them.
pub struct Node<L> {
    pub(crate) data: NodeData<L>,
    pub(crate) arity: usize,
    pub(crate) num_leaves: usize,
    pub(crate) num_nodes: usize,
}

impl<L> Node<L> {
    /// A leaf placeholder.
    pub fn leaf() -> Self {
        Self {
            data: NodeData::Leaf,
            arity: 0,
            num_leaves: 1,
            num_nodes: 1,
        }
    }

    /// A unit node.
    pub fn none() -> Self {
        Self {
            data: NodeData::None,
            arity: 0,
            num_leaves: 0,
            num_nodes: 1,
        }
    }

    /// A node with explicit counts, as read back from a serialized spec.
    ///
    /// Nothing is checked here; [`TreeSpec::from_nodes`](crate::TreeSpec::from_nodes)
    /// validates a whole traversal.
    pub fn with_counts(
        data: NodeData<L>,
        arity: usize,
        num_leaves: usize,
        num_nodes: usize,
    ) -> Self {
        Self {
            data,
            arity,
            num_leaves,
            num_nodes,
        }
    }

    /// Kind tag.
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    /// Per-kind metadata.
    pub fn data(&self) -> &NodeData<L> {
        &self.data
    }

    /// Number of immediate children.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Leaves in the subtree rooted here.
    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    /// Nodes in the subtree rooted here, this one included.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }
}

impl<L> Clone for Node<L> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            arity: self.arity,
            num_leaves: self.num_leaves,
            num_nodes: self.num_nodes,
        }
    }
}

impl<L> PartialEq for Node<L> {
    fn eq(&self, other: &Self) -> bool {
        self.arity == other.arity && self.data == other.data
    }
}

impl<L> Eq for Node<L> {}

impl<L> fmt::Debug for Node<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("data", &self.data)
            .field("arity", &self.arity)
            .field("num_leaves", &self.num_leaves)
            .field("num_nodes", &self.num_nodes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_registry::TypeRegistry;

    #[derive(Debug, PartialEq)]
    struct Unit;

    #[test]
    fn counts_do_not_affect_equality() {
        let a = Node::<i32>::with_counts(NodeData::Tuple, 2, 2, 3);
        let b = Node::<i32>::with_counts(NodeData::Tuple, 2, 5, 9);
        assert_eq!(a, b);
    }

    #[test]
    fn arity_affects_equality() {
        let a = Node::<i32>::with_counts(NodeData::List, 1, 1, 2);
        let b = Node::<i32>::with_counts(NodeData::List, 2, 2, 3);
        assert_ne!(a, b);
    }

    #[test]
    fn dict_keys_compare_by_value() {
        let keys_a: Arc<[Datum]> = vec![Datum::from("a")].into();
        let keys_b: Arc<[Datum]> = vec![Datum::from("a")].into();
        assert_eq!(
            NodeData::<i32>::Dict { keys: keys_a },
            NodeData::<i32>::Dict { keys: keys_b }
        );
    }

    #[test]
    fn custom_nodes_compare_registration_identity() {
        let first = TypeRegistry::<i32>::new();
        let second = TypeRegistry::<i32>::new();
        let make = |r: &TypeRegistry<i32>| {
            r.register::<Unit, _, _>("Unit", |_| (vec![], None), |_, _| Unit)
                .unwrap()
        };
        let reg_a = make(&first);
        let reg_b = make(&second);

        let same = NodeData::Custom {
            registration: Arc::clone(&reg_a),
            aux: None,
        };
        assert_eq!(same.clone(), same);
        let other = NodeData::Custom {
            registration: reg_b,
            aux: None,
        };
        assert_ne!(same, other);

        let with_aux = NodeData::Custom {
            registration: reg_a,
            aux: Some(Datum::Int(1)),
        };
        assert_ne!(same, with_aux);
    }

    #[test]
    fn leaf_and_none_counts() {
        let leaf = Node::<i32>::leaf();
        let none = Node::<i32>::none();
        assert_eq!((leaf.num_leaves(), leaf.num_nodes()), (1, 1));
        assert_eq!((none.num_leaves(), none.num_nodes()), (0, 1));
        assert_ne!(leaf, none);
    }
}
