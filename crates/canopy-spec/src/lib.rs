//! Tree specs for the Canopy engine.
//!
//! A [`TreeSpec`] records the shape of a nested value as a post-order
//! list of [`Node`]s. [`flatten`] splits a value into its leaves and its
//! spec; [`TreeSpec::unflatten`] puts new leaves back into the same
//! shape. Every traversal here (flatten, unflatten, rendering, and
//! validation) runs on an explicit stack.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod flatten;
mod format;
pub mod node;
pub mod spec;
mod unflatten;

pub use config::{DictOrder, FlattenConfig};
pub use flatten::{flatten, flatten_with, Flattened};
pub use node::{Node, NodeData};
pub use spec::TreeSpec;
