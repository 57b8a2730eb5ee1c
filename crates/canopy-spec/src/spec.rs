//! The immutable tree spec.

use std::fmt;

use canopy_core::{Datum, NodeKind, StructureFault};
use smallvec::SmallVec;

use crate::node::{Node, NodeData};

/// Shape of a flattened tree: its nodes in post-order.
///
/// A spec is produced by [`flatten`](crate::flatten), by deserialization,
/// or by [`TreeSpec::from_nodes`]; all three yield a traversal whose
/// counts and arities are consistent. A spec never changes after it is
/// built and can be shared freely across threads.
///
/// The empty spec describes no tree at all: it has no leaves, renders as
/// `TreeSpec()`, and cannot be unflattened.
pub struct TreeSpec<L> {
    nodes: Vec<Node<L>>,
}

impl<L> TreeSpec<L> {
    /// The empty spec.
    pub fn empty() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Spec of a single leaf.
    pub fn leaf() -> Self {
        Self {
            nodes: vec![Node::leaf()],
        }
    }

    /// Spec of the unit value.
    pub fn none() -> Self {
        Self {
            nodes: vec![Node::none()],
        }
    }

    /// Build a spec from a post-order traversal, checking every node.
    ///
    /// # Errors
    ///
    /// Returns the first [`StructureFault`] found: a Leaf or None node
    /// with children, a container needing more children than precede it,
    /// metadata whose length disagrees with the arity, recorded counts
    /// that disagree with the children, or more than one root.
    pub fn from_nodes(nodes: Vec<Node<L>>) -> Result<Self, StructureFault> {
        validate(&nodes)?;
        Ok(Self { nodes })
    }

    /// Wrap a traversal built by the flatten engine.
    pub(crate) fn from_trusted(nodes: Vec<Node<L>>) -> Self {
        debug_assert!(validate(&nodes).is_ok());
        Self { nodes }
    }

    #[cfg(test)]
    pub(crate) fn from_unchecked(nodes: Vec<Node<L>>) -> Self {
        Self { nodes }
    }

    /// Number of leaves the tree holds; zero for the empty spec.
    pub fn num_leaves(&self) -> usize {
        self.nodes.last().map_or(0, Node::num_leaves)
    }

    /// Number of nodes in the traversal.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Whether this is the empty spec.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the whole tree is a single leaf.
    pub fn is_leaf(&self) -> bool {
        self.nodes.len() == 1 && self.nodes[0].kind() == NodeKind::Leaf
    }

    /// The traversal, in post-order.
    pub fn nodes(&self) -> &[Node<L>] {
        &self.nodes
    }

    /// The root node (last in the traversal).
    pub fn root(&self) -> Option<&Node<L>> {
        self.nodes.last()
    }

    /// Kind of the root node.
    pub fn kind(&self) -> Option<NodeKind> {
        self.root().map(Node::kind)
    }

    /// Structural equality.
    ///
    /// Node-by-node comparison of kind, arity, and metadata; custom nodes
    /// must also share the same registration. Subtree counts are derived
    /// data and are not compared.
    pub fn equals(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }

    /// The specs of the root's immediate children, left to right.
    ///
    /// Empty for the empty spec and for specs whose root has no children.
    pub fn children(&self) -> Vec<TreeSpec<L>> {
        let Some(root) = self.nodes.last() else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(root.arity());
        let mut end = self.nodes.len() - 1;
        for _ in 0..root.arity() {
            let span = self.nodes[end - 1].num_nodes();
            out.push(Self {
                nodes: self.nodes[end - span..end].to_vec(),
            });
            end -= span;
        }
        out.reverse();
        out
    }
}

/// Check a traversal with an explicit stack of `(num_leaves, num_nodes)`
/// subtree summaries.
pub(crate) fn validate<L>(nodes: &[Node<L>]) -> Result<(), StructureFault> {
    let mut stack: SmallVec<[(usize, usize); 16]> = SmallVec::new();
    for (index, node) in nodes.iter().enumerate() {
        let arity = node.arity();
        let derived = match node.data() {
            NodeData::Leaf | NodeData::None if arity != 0 => {
                return Err(StructureFault::MetadataMismatch {
                    node: index,
                    detail: format!("{} node has arity {arity}", node.kind()),
                });
            }
            NodeData::Leaf => (1, 1),
            NodeData::None => (0, 1),
            data => {
                check_metadata(index, data, arity)?;
                if stack.len() < arity {
                    return Err(StructureFault::Arity {
                        node: index,
                        arity,
                        available: stack.len(),
                    });
                }
                let start = stack.len() - arity;
                stack
                    .drain(start..)
                    .fold((0, 1), |(l, n), (cl, cn)| (l + cl, n + cn))
            }
        };
        check_count(index, "num_leaves", node.num_leaves(), derived.0)?;
        check_count(index, "num_nodes", node.num_nodes(), derived.1)?;
        stack.push(derived);
    }
    if !nodes.is_empty() && stack.len() != 1 {
        return Err(StructureFault::Structural {
            remaining: stack.len(),
        });
    }
    Ok(())
}

pub(crate) fn check_metadata<L>(
    index: usize,
    data: &NodeData<L>,
    arity: usize,
) -> Result<(), StructureFault> {
    let mismatch = |detail: String| StructureFault::MetadataMismatch {
        node: index,
        detail,
    };
    let expected = match data {
        NodeData::Dict { keys } => {
            if let Some(key) = Datum::first_duplicate(keys) {
                return Err(mismatch(format!("duplicate dict key {}", key.repr())));
            }
            keys.len()
        }
        NodeData::NamedTuple { record } => record.arity(),
        NodeData::Custom { registration, aux } => {
            return registration
                .check_aux(aux.as_ref(), arity)
                .map_err(|err| mismatch(err.to_string()));
        }
        NodeData::Leaf | NodeData::None | NodeData::Tuple | NodeData::List => return Ok(()),
    };
    if expected != arity {
        return Err(mismatch(format!(
            "{} metadata has {expected} entries but arity is {arity}",
            data.kind()
        )));
    }
    Ok(())
}

fn check_count(
    index: usize,
    field: &'static str,
    recorded: usize,
    derived: usize,
) -> Result<(), StructureFault> {
    if recorded != derived {
        return Err(StructureFault::CountMismatch {
            node: index,
            field,
            recorded,
            derived,
        });
    }
    Ok(())
}

impl<L> Clone for TreeSpec<L> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
        }
    }
}

impl<L> PartialEq for TreeSpec<L> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl<L> Eq for TreeSpec<L> {}

impl<L> Default for TreeSpec<L> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<L> fmt::Debug for TreeSpec<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Ok(text) => f.write_str(&text),
            Err(_) => f.debug_struct("TreeSpec").field("nodes", &self.nodes).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::RecordType;
    use canopy_registry::{Registration, TypeHandle, TypeRegistry};
    use std::sync::Arc;

    fn tuple(arity: usize, leaves: usize, nodes: usize) -> Node<i32> {
        Node::with_counts(NodeData::Tuple, arity, leaves, nodes)
    }

    /// `([*, *], *)`
    fn nested() -> Vec<Node<i32>> {
        vec![
            Node::leaf(),
            Node::leaf(),
            Node::with_counts(NodeData::List, 2, 2, 3),
            Node::leaf(),
            tuple(2, 3, 5),
        ]
    }

    #[test]
    fn accepts_consistent_traversal() {
        let spec = TreeSpec::from_nodes(nested()).unwrap();
        assert_eq!(spec.num_leaves(), 3);
        assert_eq!(spec.num_nodes(), 5);
        assert_eq!(spec.kind(), Some(NodeKind::Tuple));
        assert!(!spec.is_leaf());
    }

    #[test]
    fn empty_spec() {
        let spec = TreeSpec::<i32>::from_nodes(vec![]).unwrap();
        assert!(spec.is_empty());
        assert_eq!(spec.num_leaves(), 0);
        assert_eq!(spec.num_nodes(), 0);
        assert_eq!(spec, TreeSpec::empty());
        assert!(spec.children().is_empty());
    }

    #[test]
    fn rejects_underflow() {
        let err = TreeSpec::from_nodes(vec![Node::leaf(), tuple(2, 1, 2)]).unwrap_err();
        assert_eq!(
            err,
            StructureFault::Arity {
                node: 1,
                arity: 2,
                available: 1
            }
        );
    }

    #[test]
    fn rejects_multiple_roots() {
        let err = TreeSpec::<i32>::from_nodes(vec![Node::leaf(), Node::leaf()]).unwrap_err();
        assert_eq!(err, StructureFault::Structural { remaining: 2 });
    }

    #[test]
    fn rejects_leaf_with_children() {
        let nodes = vec![Node::leaf(), Node::with_counts(NodeData::Leaf, 1, 1, 2)];
        let err = TreeSpec::<i32>::from_nodes(nodes).unwrap_err();
        assert!(matches!(err, StructureFault::MetadataMismatch { node: 1, .. }));
    }

    #[test]
    fn rejects_wrong_counts() {
        let mut nodes = nested();
        nodes[4] = tuple(2, 4, 5);
        let err = TreeSpec::from_nodes(nodes).unwrap_err();
        assert_eq!(
            err,
            StructureFault::CountMismatch {
                node: 4,
                field: "num_leaves",
                recorded: 4,
                derived: 3
            }
        );
    }

    #[test]
    fn rejects_key_count_mismatch() {
        let keys: Arc<[Datum]> = vec![Datum::from("a")].into();
        let nodes = vec![
            Node::leaf(),
            Node::leaf(),
            Node::with_counts(NodeData::Dict { keys }, 2, 2, 3),
        ];
        let err = TreeSpec::<i32>::from_nodes(nodes).unwrap_err();
        assert!(matches!(err, StructureFault::MetadataMismatch { node: 2, .. }));
    }

    #[test]
    fn rejects_duplicate_dict_keys() {
        let keys: Arc<[Datum]> = vec![Datum::from("a"), Datum::from("a")].into();
        let nodes = vec![
            Node::leaf(),
            Node::leaf(),
            Node::with_counts(NodeData::Dict { keys }, 2, 2, 3),
        ];
        let err = TreeSpec::<i32>::from_nodes(nodes).unwrap_err();
        assert!(matches!(err, StructureFault::MetadataMismatch { node: 2, .. }));
    }

    fn standard(name: &str) -> Arc<Registration<i32>> {
        TypeRegistry::<i32>::with_standard_collections()
            .lookup_by_handle(&TypeHandle::global(name))
            .unwrap()
    }

    fn custom(name: &str, aux: Option<Datum>, arity: usize) -> Node<i32> {
        let data = NodeData::Custom {
            registration: standard(name),
            aux,
        };
        Node::with_counts(data, arity, arity, arity + 1)
    }

    #[test]
    fn rejects_ordered_dict_keys_that_miss_children() {
        let aux = Datum::List(vec![Datum::from("a")]);
        let nodes = vec![Node::leaf(), Node::leaf(), custom("OrderedDict", Some(aux), 2)];
        let err = TreeSpec::from_nodes(nodes).unwrap_err();
        assert!(matches!(err, StructureFault::MetadataMismatch { node: 2, .. }));

        let dupes = Datum::List(vec![Datum::from("a"), Datum::from("a")]);
        let nodes = vec![Node::leaf(), Node::leaf(), custom("OrderedDict", Some(dupes), 2)];
        assert!(TreeSpec::from_nodes(nodes).is_err());
    }

    #[test]
    fn rejects_default_dict_without_factory_and_keys() {
        let err = TreeSpec::from_nodes(vec![custom("DefaultDict", Some(Datum::Int(5)), 0)])
            .unwrap_err();
        assert!(matches!(err, StructureFault::MetadataMismatch { node: 0, .. }));
        assert!(TreeSpec::from_nodes(vec![custom("DefaultDict", None, 0)]).is_err());

        let aux = Datum::Tuple(vec![Datum::from("list"), Datum::List(vec![])]);
        let spec = TreeSpec::from_nodes(vec![custom("DefaultDict", Some(aux), 0)]).unwrap();
        assert_eq!(spec.to_string(), "TreeSpec(DefaultDict('list', {}))");
    }

    #[test]
    fn rejects_negative_deque_bound() {
        let nodes = vec![Node::leaf(), custom("Deque", Some(Datum::Int(-2)), 1)];
        assert!(TreeSpec::from_nodes(nodes).is_err());
        let nodes = vec![Node::leaf(), custom("Deque", Some(Datum::Int(2)), 1)];
        assert!(TreeSpec::from_nodes(nodes).is_ok());
    }

    #[test]
    fn rejects_field_count_mismatch() {
        let record = RecordType::new("P", ["x", "y"]);
        let nodes = vec![
            Node::leaf(),
            Node::with_counts(NodeData::NamedTuple { record }, 1, 1, 2),
        ];
        assert!(TreeSpec::<i32>::from_nodes(nodes).is_err());
    }

    #[test]
    fn children_split_root() {
        let spec = TreeSpec::from_nodes(nested()).unwrap();
        let children = spec.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].num_nodes(), 3);
        assert_eq!(children[0].kind(), Some(NodeKind::List));
        assert!(children[1].is_leaf());
        assert!(TreeSpec::<i32>::leaf().children().is_empty());
    }

    #[test]
    fn equality_is_structural() {
        let a = TreeSpec::from_nodes(nested()).unwrap();
        let b = a.clone();
        assert_eq!(a, b);
        assert!(a.equals(&b) && b.equals(&a));
        assert_ne!(a, TreeSpec::leaf());
        assert_ne!(TreeSpec::<i32>::leaf(), TreeSpec::none());
    }

    #[test]
    fn spec_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TreeSpec<i32>>();
    }
}
