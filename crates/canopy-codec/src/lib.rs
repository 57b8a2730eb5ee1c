//! Serialization of Canopy tree specs.
//!
//! A spec serializes to one [`SpecRecord`] per node. Records have a
//! self-describing [`Datum`](canopy_core::Datum) form for hosts that
//! persist values generically, and a compact binary form for streams.
//! Custom nodes are stored by [`TypeHandle`](canopy_registry::TypeHandle)
//! and resolved against the registry passed to [`deserialize`].
//!
//! # Format
//!
//! ```text
//! [MAGIC "TSPC"] [VERSION u8] [COUNT u32]
//! [Record 1] [Record 2] ... [Record N]
//! ```
//!
//! Each record holds kind code, arity, optional metadata, optional custom
//! type handle, and the subtree leaf and node counts.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod record;
pub mod serialize;

pub use codec::{decode_records, decode_spec, encode_records, encode_spec};
pub use error::CodecError;
pub use record::{records_from_datum, records_to_datum, SpecRecord};
pub use serialize::{deserialize, serialize};

/// Magic bytes at the start of every binary spec.
pub const MAGIC: [u8; 4] = *b"TSPC";

/// Current binary format version.
pub const FORMAT_VERSION: u8 = 1;
