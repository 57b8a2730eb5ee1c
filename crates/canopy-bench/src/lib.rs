//! Benchmark profiles for the Canopy tree-spec engine.
//!
//! Provides pre-built trees for benchmarking:
//!
//! - [`reference_tree`]: balanced lists, 8 wide and 4 deep (4096 leaves)
//! - [`record_heavy_tree`]: a list of `n` dicts, each holding a record
//! - [`deep_tree`]: a single leaf under 10K nested lists

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use canopy_core::{Record, RecordType, Value};
use canopy_test_utils::fixtures::{deep_chain, wide_tree};
use canopy_test_utils::Leaf;

/// Balanced list tree: 8 children per node, 4 levels, 4096 leaves.
pub fn reference_tree() -> Value<Leaf> {
    wide_tree(8, 4)
}

/// `n` entries of `{'id': *, 'pos': Pos(x=*, y=*, z=*), 'tags': [*, *]}`.
///
/// Exercises keyed and named containers, whose nodes carry metadata.
pub fn record_heavy_tree(n: usize) -> Value<Leaf> {
    let pos = RecordType::new("Pos", ["x", "y", "z"]);
    Value::list((0..n as Leaf).map(|i| {
        let values = vec![Value::Leaf(i), Value::Leaf(i + 1), Value::Leaf(i + 2)];
        let record = Record::new(pos.clone(), values).map_or(Value::None, Value::Record);
        Value::dict([
            ("id", Value::Leaf(i)),
            ("pos", record),
            ("tags", Value::list([Value::Leaf(-i), Value::None])),
        ])
    }))
}

/// A single leaf nested inside 10K one-element lists.
///
/// Dropping this value recurses once per level; benchmarks keep it alive
/// for the whole run.
pub fn deep_tree() -> Value<Leaf> {
    deep_chain(10_000)
}
