//! Error types for spec serialization.

use std::fmt;
use std::io;

use canopy_registry::TypeHandle;

/// Errors from decoding serialized tree specs.
#[derive(Debug)]
pub enum CodecError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The stream does not start with the expected `b"TSPC"` magic bytes.
    InvalidMagic,
    /// The format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the stream.
        found: u8,
    },
    /// A record is inconsistent on its own or with the records before it.
    MalformedRecord {
        /// Position of the offending record.
        index: usize,
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// A custom node names a type the registry does not know.
    UnknownCustomType {
        /// The unresolved handle.
        handle: TypeHandle,
    },
}

impl CodecError {
    pub(crate) fn malformed(index: usize, detail: impl Into<String>) -> Self {
        Self::MalformedRecord {
            index,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"TSPC\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported format version {found}")
            }
            Self::MalformedRecord { index, detail } => {
                write!(f, "malformed record {index}: {detail}")
            }
            Self::UnknownCustomType { handle } => {
                write!(f, "unknown custom type {handle}")
            }
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CodecError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
