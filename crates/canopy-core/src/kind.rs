//! The closed set of node kinds.

use std::fmt;

/// Structural role of one node in a tree spec traversal.
///
/// The integer codes returned by [`code`](NodeKind::code) are part of the
/// serialized record format and must never be renumbered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    /// An atomic value.
    Leaf,
    /// The unit container: no children, no leaves.
    None,
    /// Fixed-length positional container.
    Tuple,
    /// Positional container with named fields.
    NamedTuple,
    /// Variable-length positional container.
    List,
    /// Keyed container; keys are kept in the node metadata.
    Dict,
    /// Container whose decomposition comes from a registry entry.
    Custom,
}

impl NodeKind {
    /// All kinds, in code order.
    pub const ALL: [NodeKind; 7] = [
        NodeKind::Leaf,
        NodeKind::None,
        NodeKind::Tuple,
        NodeKind::NamedTuple,
        NodeKind::List,
        NodeKind::Dict,
        NodeKind::Custom,
    ];

    /// Stable integer code used by the serializer.
    pub fn code(self) -> i64 {
        match self {
            Self::Leaf => 0,
            Self::None => 1,
            Self::Tuple => 2,
            Self::NamedTuple => 3,
            Self::List => 4,
            Self::Dict => 5,
            Self::Custom => 6,
        }
    }

    /// Inverse of [`code`](NodeKind::code). Returns `None` for unknown codes.
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }

    /// Whether nodes of this kind carry metadata in the record format.
    pub fn has_metadata(self) -> bool {
        matches!(self, Self::NamedTuple | Self::Dict | Self::Custom)
    }

    /// Whether this kind is a terminal node in the traversal (no children).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Leaf | Self::None)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Leaf => "leaf",
            Self::None => "none",
            Self::Tuple => "tuple",
            Self::NamedTuple => "namedtuple",
            Self::List => "list",
            Self::Dict => "dict",
            Self::Custom => "custom",
        };
        f.write_str(name)
    }
}
