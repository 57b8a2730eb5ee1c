//! Sample trees.
//!
//! Each builder returns a fresh value. The rendered form of each fixture
//! under [`registry_with_fixtures`](crate::registry_with_fixtures) is
//! noted on the builder.

use std::collections::VecDeque;

use canopy_core::{Datum, Record, RecordType, Value};
use canopy_registry::{DefaultDict, Deque, OrderedDict};
use indexmap::IndexMap;

use crate::{Leaf, Point, Tagged};

/// `TreeSpec(([*, *], *))`
pub fn nested_tuple() -> Value<Leaf> {
    Value::tuple([
        Value::list([Value::Leaf(1), Value::Leaf(2)]),
        Value::Leaf(3),
    ])
}

/// `TreeSpec({'a': *, 'b': *, 'c': *})`
pub fn flat_dict() -> Value<Leaf> {
    Value::dict([
        ("a", Value::Leaf(1)),
        ("b", Value::Leaf(2)),
        ("c", Value::Leaf(3)),
    ])
}

/// `TreeSpec((*,))`
pub fn single_tuple() -> Value<Leaf> {
    Value::tuple([Value::Leaf(1)])
}

/// `TreeSpec(Coord(x=*, y=*))`
pub fn record_coord() -> Value<Leaf> {
    let ty = RecordType::new("Coord", ["x", "y"]);
    // Field count matches the descriptor.
    match Record::new(ty, vec![Value::Leaf(1), Value::Leaf(2)]) {
        Ok(record) => Value::Record(record),
        Err(_) => Value::None,
    }
}

/// Every node kind at least once, custom types included:
///
/// ```text
/// TreeSpec({'items': [*, None, (*,)], 'point': Point(*, [*, *]),
///   'tagged': Tagged[t](*, *), 'ordered': OrderedDict([('k', *)]),
///   'default': DefaultDict('list', {'d': *}), 'deque': Deque([*]),
///   'record': Pair(a=*, b={})})
/// ```
pub fn mixed_tree() -> Value<Leaf> {
    let pair = RecordType::new("Pair", ["a", "b"]);
    let record = match Record::new(pair, vec![Value::Leaf(11), Value::dict::<&str>([])]) {
        Ok(record) => Value::Record(record),
        Err(_) => Value::None,
    };
    let ordered: IndexMap<Datum, Value<Leaf>> =
        [(Datum::from("k"), Value::Leaf(7))].into_iter().collect();
    Value::dict([
        (
            "items",
            Value::list([Value::Leaf(0), Value::None, Value::tuple([Value::Leaf(1)])]),
        ),
        (
            "point",
            Value::object(Point::new(
                Value::Leaf(2),
                Value::list([Value::Leaf(3), Value::Leaf(4)]),
            )),
        ),
        (
            "tagged",
            Value::object(Tagged::new("t", [Value::Leaf(5), Value::Leaf(6)])),
        ),
        ("ordered", Value::object(OrderedDict(ordered))),
        (
            "default",
            Value::object(DefaultDict::<Leaf> {
                default_factory: Datum::from("list"),
                entries: [(Datum::from("d"), Value::Leaf(8))].into_iter().collect(),
            }),
        ),
        (
            "deque",
            Value::object(Deque::<Leaf> {
                items: VecDeque::from([Value::Leaf(9)]),
                maxlen: Some(3),
            }),
        ),
        ("record", record),
    ])
}

/// A balanced tree of lists: `width` children per node, `depth` levels,
/// `width.pow(depth)` leaves numbered left to right.
pub fn wide_tree(width: usize, depth: u32) -> Value<Leaf> {
    let mut level: Vec<Value<Leaf>> = (0..width.pow(depth) as Leaf).map(Value::Leaf).collect();
    for _ in 0..depth {
        let mut items = level.into_iter();
        let mut next = Vec::new();
        loop {
            let chunk: Vec<Value<Leaf>> = items.by_ref().take(width).collect();
            if chunk.is_empty() {
                break;
            }
            next.push(Value::List(chunk));
        }
        level = next;
    }
    level.pop().unwrap_or(Value::None)
}

/// A single leaf wrapped in `depth` one-element lists.
pub fn deep_chain(depth: usize) -> Value<Leaf> {
    let mut value = Value::Leaf(0);
    for _ in 0..depth {
        value = Value::List(vec![value]);
    }
    value
}
