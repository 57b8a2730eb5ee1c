//! Proptest strategies for generated trees.

use std::collections::VecDeque;

use canopy_core::{Datum, Record, RecordType, Value};
use canopy_registry::{Deque, OrderedDict};
use proptest::prelude::*;

use crate::{Leaf, Point, Tagged};

/// Mapping keys: short strings and small integers.
pub fn arb_key() -> impl Strategy<Value = Datum> {
    prop_oneof![
        "[a-f]{1,2}".prop_map(Datum::Str),
        (-3i64..3).prop_map(Datum::Int),
    ]
}

/// Trees of built-in containers only.
pub fn arb_builtin_tree() -> impl Strategy<Value = Value<Leaf>> {
    arb_tree(false)
}

/// Trees that also contain [`Point`], [`Tagged`], `OrderedDict`, and
/// `Deque` objects; flatten them with
/// [`registry_with_fixtures`](crate::registry_with_fixtures).
pub fn arb_custom_tree() -> impl Strategy<Value = Value<Leaf>> {
    arb_tree(true)
}

fn arb_tree(custom: bool) -> impl Strategy<Value = Value<Leaf>> {
    let leaf = prop_oneof![
        4 => any::<Leaf>().prop_map(Value::Leaf),
        1 => Just(Value::None),
    ];
    leaf.prop_recursive(4, 64, 4, move |inner| {
        let builtin = prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Tuple),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
            prop::collection::vec((arb_key(), inner.clone()), 0..4)
                .prop_map(|entries| Value::Dict(entries.into_iter().collect())),
            prop::collection::vec(inner.clone(), 2).prop_map(|values| {
                let ty = RecordType::new("Coord", ["x", "y"]);
                Record::new(ty, values).map_or(Value::None, Value::Record)
            }),
        ];
        if !custom {
            return builtin.boxed();
        }
        prop_oneof![
            3 => builtin,
            1 => (inner.clone(), inner.clone())
                .prop_map(|(x, y)| Value::object(Point::new(x, y))),
            1 => ("[a-z]{0,3}", prop::collection::vec(inner.clone(), 0..3))
                .prop_map(|(tag, items)| Value::object(Tagged::new(tag, items))),
            1 => prop::collection::vec((arb_key(), inner.clone()), 0..3)
                .prop_map(|entries| Value::object(OrderedDict(entries.into_iter().collect()))),
            1 => (prop::collection::vec(inner, 0..3), proptest::option::of(0usize..5))
                .prop_map(|(items, maxlen)| Value::object(Deque {
                    items: VecDeque::from(items),
                    maxlen,
                })),
        ]
        .boxed()
    })
}
