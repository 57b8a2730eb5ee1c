//! Spec to records and back.
//!
//! Serialization cannot fail. Deserialization checks each record on its
//! own (kind code, signs, which optional fields are present, metadata
//! shape, custom type resolution) and then the traversal as a whole, so a
//! spec that comes back from here never raises a structural fault later.

use std::sync::Arc;

use canopy_core::{Datum, NodeKind, RecordType, StructureFault};
use canopy_registry::TypeRegistry;
use canopy_spec::{Node, NodeData, TreeSpec};

use crate::error::CodecError;
use crate::record::SpecRecord;

/// Turn a spec into one record per node, in traversal order.
pub fn serialize<L>(spec: &TreeSpec<L>) -> Vec<SpecRecord> {
    spec.nodes().iter().map(to_record).collect()
}

fn to_record<L>(node: &Node<L>) -> SpecRecord {
    let (metadata, custom_type) = match node.data() {
        NodeData::Leaf | NodeData::None | NodeData::Tuple | NodeData::List => (None, None),
        NodeData::Dict { keys } => (Some(Datum::List(keys.to_vec())), None),
        NodeData::NamedTuple { record } => (Some(record_metadata(record)), None),
        NodeData::Custom { registration, aux } => {
            (aux.clone(), Some(registration.handle().clone()))
        }
    };
    SpecRecord {
        kind_code: node.kind().code(),
        arity: node.arity() as i64,
        metadata,
        custom_type,
        num_leaves: node.num_leaves() as i64,
        num_nodes: node.num_nodes() as i64,
    }
}

/// `(name, (field, ...))`
fn record_metadata(record: &RecordType) -> Datum {
    let fields = record.fields().iter().map(|f| Datum::Str(f.clone())).collect();
    Datum::Tuple(vec![Datum::Str(record.name().to_owned()), Datum::Tuple(fields)])
}

/// Rebuild a spec from records, resolving custom types in `registry`.
///
/// An empty slice gives the empty spec.
///
/// # Errors
///
/// - [`CodecError::UnknownCustomType`] if a custom record's handle is not
///   registered.
/// - [`CodecError::MalformedRecord`] for anything else that does not
///   describe a valid traversal.
pub fn deserialize<L>(
    registry: &TypeRegistry<L>,
    records: &[SpecRecord],
) -> Result<TreeSpec<L>, CodecError> {
    let nodes = records
        .iter()
        .enumerate()
        .map(|(index, record)| to_node(registry, index, record))
        .collect::<Result<Vec<_>, _>>()?;
    let spec = TreeSpec::from_nodes(nodes).map_err(|fault| {
        let index = fault_index(&fault).unwrap_or(records.len().saturating_sub(1));
        log::debug!("rejected serialized spec at record {index}: {fault}");
        CodecError::malformed(index, fault.to_string())
    })?;
    log::trace!("deserialized spec with {} nodes", spec.num_nodes());
    Ok(spec)
}

fn to_node<L>(
    registry: &TypeRegistry<L>,
    index: usize,
    record: &SpecRecord,
) -> Result<Node<L>, CodecError> {
    let code = record.kind_code;
    let kind = NodeKind::from_code(code)
        .ok_or_else(|| CodecError::malformed(index, format!("unknown kind code {code}")))?;
    let count = |value: i64, name: &str| {
        usize::try_from(value)
            .map_err(|_| CodecError::malformed(index, format!("negative {name} {value}")))
    };
    let arity = count(record.arity, "arity")?;
    let num_leaves = count(record.num_leaves, "num_leaves")?;
    let num_nodes = count(record.num_nodes, "num_nodes")?;

    if kind != NodeKind::Custom && record.custom_type.is_some() {
        return Err(CodecError::malformed(index, format!("{kind} node carries a custom type")));
    }
    if !kind.has_metadata() && record.metadata.is_some() {
        return Err(CodecError::malformed(index, format!("{kind} node carries metadata")));
    }

    let missing = || CodecError::malformed(index, format!("{kind} node is missing its metadata"));
    let data = match kind {
        NodeKind::Leaf => NodeData::Leaf,
        NodeKind::None => NodeData::None,
        NodeKind::Tuple => NodeData::Tuple,
        NodeKind::List => NodeData::List,
        NodeKind::Dict => {
            let keys = record
                .metadata
                .as_ref()
                .and_then(Datum::as_seq)
                .ok_or_else(missing)?;
            NodeData::Dict { keys: keys.into() }
        }
        NodeKind::NamedTuple => {
            let metadata = record.metadata.as_ref().ok_or_else(missing)?;
            let record = parse_record_type(metadata).ok_or_else(|| {
                let detail = format!("invalid record descriptor {}", metadata.repr());
                CodecError::malformed(index, detail)
            })?;
            NodeData::NamedTuple { record }
        }
        NodeKind::Custom => {
            let handle = record
                .custom_type
                .as_ref()
                .ok_or_else(|| CodecError::malformed(index, "custom node has no type"))?;
            let registration = registry.lookup_by_handle(handle).ok_or_else(|| {
                log::debug!("record {index} names unregistered custom type {handle}");
                CodecError::UnknownCustomType {
                    handle: handle.clone(),
                }
            })?;
            NodeData::Custom {
                registration,
                aux: record.metadata.clone().filter(|aux| *aux != Datum::None),
            }
        }
    };
    Ok(Node::with_counts(data, arity, num_leaves, num_nodes))
}

fn parse_record_type(metadata: &Datum) -> Option<Arc<RecordType>> {
    let [name, fields] = metadata.as_seq()? else {
        return None;
    };
    let fields = fields
        .as_seq()?
        .iter()
        .map(|f| f.as_str().map(str::to_owned))
        .collect::<Option<Vec<_>>>()?;
    Some(RecordType::new(name.as_str()?, fields))
}

fn fault_index(fault: &StructureFault) -> Option<usize> {
    match fault {
        StructureFault::Arity { node, .. }
        | StructureFault::MetadataMismatch { node, .. }
        | StructureFault::CountMismatch { node, .. } => Some(*node),
        StructureFault::Structural { .. } | StructureFault::CustomTypeMismatch { .. } => None,
    }
}
