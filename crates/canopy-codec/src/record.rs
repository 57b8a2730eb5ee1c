//! The flat record form of a tree spec node.

use canopy_core::Datum;
use canopy_registry::TypeHandle;

use crate::error::CodecError;

/// One serialized node: six fields, in a fixed order.
///
/// | # | Field         | Datum form                      |
/// |---|---------------|---------------------------------|
/// | 0 | `kind_code`   | `Int`                           |
/// | 1 | `arity`       | `Int`                           |
/// | 2 | `metadata`    | the datum, or `None` if absent  |
/// | 3 | `custom_type` | `(namespace, name)`, or `None`  |
/// | 4 | `num_leaves`  | `Int`                           |
/// | 5 | `num_nodes`   | `Int`                           |
///
/// Integers are signed so a corrupt record can say something negative;
/// [`deserialize`](crate::deserialize) rejects it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpecRecord {
    /// Stable [`NodeKind`](canopy_core::NodeKind) code.
    pub kind_code: i64,
    /// Number of immediate children.
    pub arity: i64,
    /// Dict keys, record descriptor, or custom aux data.
    pub metadata: Option<Datum>,
    /// Registration identity of a custom node.
    pub custom_type: Option<TypeHandle>,
    /// Leaves in the subtree.
    pub num_leaves: i64,
    /// Nodes in the subtree, this one included.
    pub num_nodes: i64,
}

impl SpecRecord {
    /// Number of fields in the datum form.
    pub const FIELD_COUNT: usize = 6;

    /// The self-describing datum form: a 6-tuple.
    pub fn to_datum(&self) -> Datum {
        Datum::Tuple(vec![
            Datum::Int(self.kind_code),
            Datum::Int(self.arity),
            self.metadata.clone().unwrap_or(Datum::None),
            self.custom_type
                .as_ref()
                .map_or(Datum::None, TypeHandle::to_datum),
            Datum::Int(self.num_leaves),
            Datum::Int(self.num_nodes),
        ])
    }

    /// Parse the datum form of the record at `index`.
    pub(crate) fn from_datum(datum: &Datum, index: usize) -> Result<Self, CodecError> {
        let fields = match datum {
            Datum::Tuple(fields) => fields,
            other => {
                return Err(CodecError::malformed(
                    index,
                    format!("expected a tuple, got {}", other.repr()),
                ))
            }
        };
        let [kind_code, arity, metadata, custom_type, num_leaves, num_nodes] = fields.as_slice()
        else {
            return Err(CodecError::malformed(
                index,
                format!("expected {} fields, got {}", Self::FIELD_COUNT, fields.len()),
            ));
        };
        let int = |field: &Datum, name: &str| {
            field
                .as_int()
                .ok_or_else(|| CodecError::malformed(index, format!("{name} is not an integer")))
        };
        let custom_type = match custom_type {
            Datum::None => None,
            handle => Some(TypeHandle::from_datum(handle).ok_or_else(|| {
                CodecError::malformed(index, format!("invalid custom type {}", handle.repr()))
            })?),
        };
        Ok(Self {
            kind_code: int(kind_code, "kind code")?,
            arity: int(arity, "arity")?,
            metadata: (*metadata != Datum::None).then(|| metadata.clone()),
            custom_type,
            num_leaves: int(num_leaves, "num_leaves")?,
            num_nodes: int(num_nodes, "num_nodes")?,
        })
    }
}

impl TryFrom<&Datum> for SpecRecord {
    type Error = CodecError;

    fn try_from(datum: &Datum) -> Result<Self, Self::Error> {
        Self::from_datum(datum, 0)
    }
}

/// The datum form of a whole record list.
pub fn records_to_datum(records: &[SpecRecord]) -> Datum {
    Datum::List(records.iter().map(SpecRecord::to_datum).collect())
}

/// Parse a list (or tuple) of record tuples.
///
/// # Errors
///
/// [`CodecError::MalformedRecord`] naming the first record that does not
/// parse; index 0 if `datum` is not a sequence at all.
pub fn records_from_datum(datum: &Datum) -> Result<Vec<SpecRecord>, CodecError> {
    let items = datum
        .as_seq()
        .ok_or_else(|| CodecError::malformed(0, "record list is not a sequence"))?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| SpecRecord::from_datum(item, index))
        .collect()
}
