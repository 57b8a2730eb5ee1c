//! Custom container type registry for the Canopy tree-spec engine.
//!
//! The registry answers one question for the flatten engine (is this
//! value a container, and if so which kind?) and supplies the
//! decomposition and reconstruction functions for user-defined container
//! types. It is an explicit object: construct one at startup, register
//! custom types, then pass it by reference to flatten, unflatten, and
//! deserialize calls.
//!
//! # Architecture
//!
//! - [`TypeRegistry`] holds [`Registration`]s keyed by concrete type and
//!   by [`TypeHandle`], behind a readers-writer lock
//! - [`Registration`] pairs `to_children`/`from_children` with a
//!   [`DisplayHint`] for rendering
//! - [`collections`] ships `OrderedDict`, `DefaultDict`, and `Deque`

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod collections;
pub mod error;
pub mod handle;
pub mod registration;
pub mod registry;

pub use collections::{DefaultDict, Deque, OrderedDict};
pub use error::RegistryError;
pub use handle::TypeHandle;
pub use registration::{DisplayHint, Registration};
pub use registry::{Classification, TypeRegistry};
