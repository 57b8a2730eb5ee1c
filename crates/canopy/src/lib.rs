//! Canopy: tree specs for nested container values.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Canopy sub-crates. For most users, adding `canopy` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use canopy::prelude::*;
//!
//! let registry: TypeRegistry<i32> = TypeRegistry::with_standard_collections();
//! let tree = Value::tuple([
//!     Value::list([Value::Leaf(1), Value::Leaf(2)]),
//!     Value::Leaf(3),
//! ]);
//!
//! // Split the tree into its leaves and its shape.
//! let Flattened { leaves, spec } = flatten(&registry, &tree)?;
//! assert_eq!(spec.to_string(), "TreeSpec(([*, *], *))");
//! assert_eq!(leaves.len(), 3);
//!
//! // Rebuild it, possibly from transformed leaves.
//! let rebuilt = spec.unflatten(leaves)?;
//! assert_eq!(rebuilt, tree);
//!
//! // Persist the shape and read it back.
//! let mut buf = Vec::new();
//! encode_spec(&mut buf, &spec)?;
//! let decoded: TreeSpec<i32> = decode_spec(&mut buf.as_slice(), &registry)?;
//! assert_eq!(decoded, spec);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `canopy-core` | Values, metadata data, node kinds, errors |
//! | [`registry`] | `canopy-registry` | Custom type registrations and standard collections |
//! | [`spec`] | `canopy-spec` | Tree specs, flatten, unflatten, rendering |
//! | [`codec`] | `canopy-codec` | Record serialization and the binary format |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Values, metadata data, and error types (`canopy-core`).
///
/// Contains [`types::Value`], the hashable [`types::Datum`] used for keys
/// and aux data, and the two error families [`types::TreeError`] and
/// [`types::StructureFault`].
pub use canopy_core as types;

/// Custom container registrations (`canopy-registry`).
///
/// [`registry::TypeRegistry`] maps Rust types to their flatten and
/// unflatten callbacks, optionally per namespace.
pub use canopy_registry as registry;

/// Tree specs and the flatten/unflatten engines (`canopy-spec`).
pub use canopy_spec as spec;

/// Serialization of tree specs (`canopy-codec`).
///
/// [`codec::serialize`] turns a spec into flat records;
/// [`codec::encode_spec`] and [`codec::decode_spec`] read and write the
/// binary format.
pub use canopy_codec as codec;

/// Common imports for typical Canopy usage.
///
/// ```rust
/// use canopy::prelude::*;
/// ```
pub mod prelude {
    // Values and errors
    pub use canopy_core::{
        Datum, NodeKind, Object, Record, RecordType, StructureFault, TreeError, Value,
    };

    // Registry
    pub use canopy_registry::{
        DefaultDict, Deque, DisplayHint, OrderedDict, Registration, RegistryError, TypeHandle,
        TypeRegistry,
    };

    // Specs
    pub use canopy_spec::{
        flatten, flatten_with, DictOrder, FlattenConfig, Flattened, Node, NodeData, TreeSpec,
    };

    // Codec
    pub use canopy_codec::{
        decode_spec, deserialize, encode_spec, serialize, CodecError, SpecRecord,
    };
}
