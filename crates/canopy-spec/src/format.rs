//! Canonical text rendering of a tree spec.
//!
//! Leaves render as `*`. Containers render with their children in
//! traversal order, using the host-language literal syntax of their kind:
//!
//! | Kind         | Rendering                                 |
//! |--------------|-------------------------------------------|
//! | None         | `None`                                    |
//! | Tuple        | `(a, b)`, or `(a,)` for one element       |
//! | List         | `[a, b]`                                  |
//! | Dict         | `{'k': a}`                                |
//! | NamedTuple   | `Name(f=a, g=b)`                          |
//! | Custom       | depends on the registration's display hint |
//!
//! The whole spec is wrapped in `TreeSpec(...)`.

use std::fmt;

use canopy_core::{Datum, StructureFault, TreeError};
use canopy_registry::{DisplayHint, Registration};

use crate::node::NodeData;
use crate::spec::TreeSpec;

impl<L> TreeSpec<L> {
    /// Render the canonical string, e.g. `TreeSpec(([*, *], *))`.
    ///
    /// The empty spec renders as `TreeSpec()`.
    ///
    /// # Errors
    ///
    /// [`TreeError::Fault`] if the traversal is inconsistent or a node's
    /// metadata does not match its arity.
    pub fn render(&self) -> Result<String, TreeError> {
        let mut fragments: Vec<String> = Vec::with_capacity(self.num_nodes());
        for (index, node) in self.nodes().iter().enumerate() {
            let arity = node.arity();
            if fragments.len() < arity {
                return Err(StructureFault::Arity {
                    node: index,
                    arity,
                    available: fragments.len(),
                }
                .into());
            }
            let start = fragments.len() - arity;
            let text = render_node(index, node.data(), &fragments[start..])?;
            fragments.truncate(start);
            fragments.push(text);
        }
        match fragments.as_slice() {
            [] => Ok("TreeSpec()".to_owned()),
            [root] => Ok(format!("TreeSpec({root})")),
            rest => Err(StructureFault::Structural {
                remaining: rest.len(),
            }
            .into()),
        }
    }
}

/// Specs from `flatten`, `from_nodes` or `deserialize` are validated and always render.
impl<L> fmt::Display for TreeSpec<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.render().map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

fn render_node<L>(
    index: usize,
    data: &NodeData<L>,
    children: &[String],
) -> Result<String, StructureFault> {
    let text = match data {
        NodeData::Leaf => "*".to_owned(),
        NodeData::None => "None".to_owned(),
        NodeData::Tuple if children.len() == 1 => format!("({},)", children[0]),
        NodeData::Tuple => format!("({})", children.join(", ")),
        NodeData::List => format!("[{}]", children.join(", ")),
        NodeData::Dict { keys } => format!("{{{}}}", mapping(index, keys, children)?),
        NodeData::NamedTuple { record } => {
            let fields = record.fields();
            if fields.len() != children.len() {
                return Err(mismatch(index, "fields", fields.len(), children.len()));
            }
            let body: Vec<String> = fields
                .iter()
                .zip(children)
                .map(|(field, child)| format!("{field}={child}"))
                .collect();
            format!("{}({})", record.name(), body.join(", "))
        }
        NodeData::Custom { registration, aux } => {
            render_custom(index, registration, aux.as_ref(), children)?
        }
    };
    Ok(text)
}

fn render_custom<L>(
    index: usize,
    registration: &Registration<L>,
    aux: Option<&Datum>,
    children: &[String],
) -> Result<String, StructureFault> {
    let name = registration.name();
    let text = match registration.display_hint() {
        DisplayHint::OrderedDict => {
            let keys = aux.and_then(Datum::as_seq).unwrap_or_default();
            if keys.len() != children.len() {
                return Err(mismatch(index, "keys", keys.len(), children.len()));
            }
            let pairs: Vec<String> = keys
                .iter()
                .zip(children)
                .map(|(key, child)| format!("({}, {child})", key.repr()))
                .collect();
            format!("{name}([{}])", pairs.join(", "))
        }
        DisplayHint::DefaultDict => {
            let (factory, keys) = match aux.and_then(Datum::as_seq) {
                Some([factory, keys]) => (factory, keys.as_seq().unwrap_or_default()),
                _ => {
                    return Err(StructureFault::MetadataMismatch {
                        node: index,
                        detail: "default dict metadata is not (factory, keys)".to_owned(),
                    })
                }
            };
            format!("{name}({}, {{{}}})", factory.repr(), mapping(index, keys, children)?)
        }
        DisplayHint::Deque => format!("{name}([{}])", children.join(", ")),
        DisplayHint::Generic => match aux {
            Some(aux) => format!("{name}[{aux}]({})", children.join(", ")),
            None => format!("{name}({})", children.join(", ")),
        },
    };
    Ok(text)
}

/// `'k': a, 'j': b`
fn mapping(index: usize, keys: &[Datum], children: &[String]) -> Result<String, StructureFault> {
    if keys.len() != children.len() {
        return Err(mismatch(index, "keys", keys.len(), children.len()));
    }
    let entries: Vec<String> = keys
        .iter()
        .zip(children)
        .map(|(key, child)| format!("{}: {child}", key.repr()))
        .collect();
    Ok(entries.join(", "))
}

fn mismatch(index: usize, what: &str, count: usize, arity: usize) -> StructureFault {
    StructureFault::MetadataMismatch {
        node: index,
        detail: format!("{count} {what} for {arity} children"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use crate::node::Node;
    use canopy_core::{Record, RecordType, Value};
    use canopy_registry::{DefaultDict, Deque, OrderedDict, TypeRegistry};

    #[derive(Debug, PartialEq)]
    struct Pair(Value<i32>, Value<i32>);

    fn render(registry: &TypeRegistry<i32>, value: &Value<i32>) -> String {
        flatten(registry, value).unwrap().spec.to_string()
    }

    fn builtins(value: &Value<i32>) -> String {
        render(&TypeRegistry::new(), value)
    }

    #[test]
    fn nested_tuple_and_list() {
        let value = Value::tuple([
            Value::list([Value::Leaf(1), Value::Leaf(2)]),
            Value::Leaf(3),
        ]);
        assert_eq!(builtins(&value), "TreeSpec(([*, *], *))");
    }

    #[test]
    fn single_element_tuple_has_trailing_comma() {
        assert_eq!(builtins(&Value::tuple([Value::Leaf(1)])), "TreeSpec((*,))");
        assert_eq!(builtins(&Value::tuple([])), "TreeSpec(())");
    }

    #[test]
    fn dict_keys_use_repr() {
        let value = Value::dict([
            ("a", Value::Leaf(1)),
            ("b", Value::Leaf(2)),
            ("c", Value::Leaf(3)),
        ]);
        assert_eq!(builtins(&value), "TreeSpec({'a': *, 'b': *, 'c': *})");
        let value = Value::dict([(1i64, Value::Leaf(1)), (2i64, Value::None)]);
        assert_eq!(builtins(&value), "TreeSpec({1: *, 2: None})");
    }

    #[test]
    fn record_fields() {
        let ty = RecordType::new("Point", ["x", "y"]);
        let record = Record::new(ty, vec![Value::Leaf(1), Value::list([])]).unwrap();
        assert_eq!(builtins(&Value::Record(record)), "TreeSpec(Point(x=*, y=[]))");
    }

    #[test]
    fn leaf_none_and_empty() {
        assert_eq!(builtins(&Value::Leaf(0)), "TreeSpec(*)");
        assert_eq!(builtins(&Value::None), "TreeSpec(None)");
        assert_eq!(TreeSpec::<i32>::empty().to_string(), "TreeSpec()");
    }

    #[test]
    fn standard_collections() {
        let registry = TypeRegistry::<i32>::with_standard_collections();
        let od = OrderedDict(
            [
                (Datum::from("a"), Value::Leaf(1)),
                (Datum::from("b"), Value::Leaf(2)),
            ]
            .into_iter()
            .collect(),
        );
        assert_eq!(
            render(&registry, &Value::object(od)),
            "TreeSpec(OrderedDict([('a', *), ('b', *)]))"
        );

        let dd = DefaultDict {
            default_factory: Datum::from("list"),
            entries: [(Datum::from("a"), Value::Leaf(1))].into_iter().collect(),
        };
        assert_eq!(
            render(&registry, &Value::object(dd)),
            "TreeSpec(DefaultDict('list', {'a': *}))"
        );

        let dq = Deque {
            items: [Value::Leaf(1), Value::Leaf(2)].into_iter().collect(),
            maxlen: None,
        };
        assert_eq!(render(&registry, &Value::object(dq)), "TreeSpec(Deque([*, *]))");
    }

    #[test]
    fn generic_custom_with_and_without_aux() {
        let registry = TypeRegistry::<i32>::new();
        registry
            .register::<Pair, _, _>(
                "Pair",
                |p| {
                    let aux = matches!(p.0, Value::None).then(|| Datum::from("left-empty"));
                    (vec![p.0.clone(), p.1.clone()], aux)
                },
                |_, _| Pair(Value::None, Value::None),
            )
            .unwrap();
        let plain = Value::object(Pair(Value::Leaf(1), Value::Leaf(2)));
        assert_eq!(render(&registry, &plain), "TreeSpec(Pair(*, *))");
        let tagged = Value::object(Pair(Value::None, Value::Leaf(2)));
        assert_eq!(render(&registry, &tagged), "TreeSpec(Pair[left-empty](None, *))");
    }

    #[test]
    fn inconsistent_traversal_is_a_fault() {
        let spec = TreeSpec::<i32>::from_unchecked(vec![Node::leaf(), Node::leaf()]);
        assert_eq!(
            spec.render(),
            Err(TreeError::Fault(StructureFault::Structural { remaining: 2 }))
        );
        let spec =
            TreeSpec::<i32>::from_unchecked(vec![Node::with_counts(NodeData::List, 1, 0, 1)]);
        assert!(matches!(
            spec.render(),
            Err(TreeError::Fault(StructureFault::Arity { node: 0, .. }))
        ));
    }
}
