//! Error types shared by the tree engines.
//!
//! Two families are kept apart. [`TreeError::LeafCount`] is a caller
//! mistake and is safe to report and recover from. [`StructureFault`]
//! means a tree spec is internally inconsistent; a spec produced by
//! flattening or by validated deserialization never raises one, so
//! callers should treat it as a bug and propagate it unchanged.

use std::error::Error;
use std::fmt;

/// Errors from flattening, unflattening, or rendering a tree spec.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeError {
    /// The leaf sequence supplied to unflatten has the wrong length.
    ///
    /// Too few leaves are reported at the first node that cannot be
    /// filled; too many are reported once the traversal completes.
    LeafCount {
        /// Leaf count the spec requires.
        expected: usize,
        /// Leaves consumed before running out, or `expected + 1` once a
        /// surplus leaf is seen (the rest are not counted).
        supplied: usize,
    },
    /// The tree spec violated one of its own structural invariants.
    Fault(StructureFault),
}

impl TreeError {
    /// Whether this error is an internal-consistency fault rather than
    /// a caller mistake.
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeafCount { expected, supplied } if supplied < expected => {
                write!(f, "too few leaves: expected {expected}, got {supplied}")
            }
            Self::LeafCount { expected, supplied } => {
                write!(f, "too many leaves: expected {expected}, got at least {supplied}")
            }
            Self::Fault(fault) => write!(f, "malformed tree spec: {fault}"),
        }
    }
}

impl Error for TreeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Fault(fault) => Some(fault),
            _ => None,
        }
    }
}

impl From<StructureFault> for TreeError {
    fn from(fault: StructureFault) -> Self {
        Self::Fault(fault)
    }
}

/// Internal-consistency violations of a tree spec traversal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StructureFault {
    /// A container node needs more children than the working stack holds.
    Arity {
        /// Position of the node in the traversal.
        node: usize,
        /// The node's declared arity.
        arity: usize,
        /// Elements available on the stack.
        available: usize,
    },
    /// The traversal did not reduce to exactly one root.
    Structural {
        /// Elements left on the stack after the traversal.
        remaining: usize,
    },
    /// A node's metadata disagrees with its arity.
    MetadataMismatch {
        /// Position of the node in the traversal.
        node: usize,
        /// Description of the disagreement.
        detail: String,
    },
    /// A node's recorded subtree counts disagree with its children.
    CountMismatch {
        /// Position of the node in the traversal.
        node: usize,
        /// Which count disagrees (`"num_leaves"` or `"num_nodes"`).
        field: &'static str,
        /// Count stored on the node.
        recorded: usize,
        /// Count derived from the node's children.
        derived: usize,
    },
    /// A registered custom type refused a value it was classified for.
    CustomTypeMismatch {
        /// Rust type name of the offending value.
        type_name: &'static str,
    },
}

impl fmt::Display for StructureFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arity {
                node,
                arity,
                available,
            } => write!(
                f,
                "node {node} has arity {arity} but only {available} elements are available"
            ),
            Self::Structural { remaining } => {
                write!(f, "traversal left {remaining} elements, expected exactly 1")
            }
            Self::MetadataMismatch { node, detail } => {
                write!(f, "node {node}: {detail}")
            }
            Self::CountMismatch {
                node,
                field,
                recorded,
                derived,
            } => write!(
                f,
                "node {node} records {field}={recorded} but its children give {derived}"
            ),
            Self::CustomTypeMismatch { type_name } => {
                write!(f, "custom registration rejected a value of type {type_name}")
            }
        }
    }
}

impl Error for StructureFault {}

/// Errors from building host values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueError {
    /// A record got a different number of values than its type has fields.
    FieldCount {
        /// Record type name.
        record: String,
        /// Field count of the record type.
        expected: usize,
        /// Values supplied.
        found: usize,
    },
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldCount {
                record,
                expected,
                found,
            } => write!(f, "record {record} has {expected} fields, got {found} values"),
        }
    }
}

impl Error for ValueError {}
