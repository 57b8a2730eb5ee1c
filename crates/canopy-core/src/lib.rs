//! Core types for the Canopy tree-spec engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the rest of the workspace: node kinds, the
//! opaque [`Datum`] metadata value, the host [`Value`] model, and the
//! error taxonomy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod datum;
pub mod error;
pub mod kind;
pub mod value;

pub use datum::Datum;
pub use error::{StructureFault, TreeError, ValueError};
pub use kind::NodeKind;
pub use value::{Object, Record, RecordType, Value};
