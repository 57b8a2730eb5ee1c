//! Binary encode/decode for serialized specs.
//!
//! All integers are little-endian. Strings are length-prefixed with a
//! `u32` length. Optional fields use a `u8` presence flag (0 = absent,
//! 1 = present) followed by the value.
//!
//! A [`Datum`] is a one-byte tag followed by its payload:
//!
//! | Tag | Variant | Payload                         |
//! |-----|---------|---------------------------------|
//! | 0   | None    | nothing                         |
//! | 1   | Bool    | `u8` (0 or 1)                   |
//! | 2   | Int     | `i64`                           |
//! | 3   | Str     | length-prefixed UTF-8           |
//! | 4   | Tuple   | `u32` count, then each item     |
//! | 5   | List    | `u32` count, then each item     |

use std::io::{Read, Write};

use canopy_core::Datum;
use canopy_registry::{TypeHandle, TypeRegistry};
use canopy_spec::TreeSpec;

use crate::error::CodecError;
use crate::record::SpecRecord;
use crate::serialize::{deserialize, serialize};
use crate::{FORMAT_VERSION, MAGIC};

const TAG_NONE: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_INT: u8 = 2;
const TAG_STR: u8 = 3;
const TAG_TUPLE: u8 = 4;
const TAG_LIST: u8 = 5;

/// Datum nesting deeper than this is rejected on decode.
pub const MAX_DATUM_DEPTH: usize = 64;

/// Upper bound on speculative preallocation from untrusted counts.
const PREALLOC_LIMIT: usize = 4096;

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub(crate) fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), CodecError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u32.
pub(crate) fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), CodecError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian i64.
pub(crate) fn write_i64_le(w: &mut dyn Write, v: i64) -> Result<(), CodecError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a length-prefixed UTF-8 string (u32 length + bytes).
pub(crate) fn write_length_prefixed_str(w: &mut dyn Write, s: &str) -> Result<(), CodecError> {
    write_len(w, s.len())?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

fn write_len(w: &mut dyn Write, len: usize) -> Result<(), CodecError> {
    let len = u32::try_from(len).map_err(|_| {
        CodecError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("length {len} does not fit in u32"),
        ))
    })?;
    write_u32_le(w, len)
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub(crate) fn read_u8(r: &mut dyn Read) -> Result<u8, CodecError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a little-endian u32.
pub(crate) fn read_u32_le(r: &mut dyn Read) -> Result<u32, CodecError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian i64.
pub(crate) fn read_i64_le(r: &mut dyn Read) -> Result<i64, CodecError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

/// Read a length-prefixed UTF-8 string.
///
/// Reads at most the declared length, so a corrupt length cannot force a
/// huge allocation up front.
pub(crate) fn read_length_prefixed_str(
    r: &mut dyn Read,
    index: usize,
) -> Result<String, CodecError> {
    let len = read_u32_le(r)? as u64;
    let mut buf = Vec::new();
    r.take(len).read_to_end(&mut buf)?;
    if buf.len() as u64 != len {
        return Err(CodecError::malformed(
            index,
            format!("truncated string: got {} of {len} bytes", buf.len()),
        ));
    }
    String::from_utf8(buf)
        .map_err(|e| CodecError::malformed(index, format!("invalid UTF-8 string: {e}")))
}

fn read_presence(r: &mut dyn Read, index: usize, field: &str) -> Result<bool, CodecError> {
    match read_u8(r)? {
        0 => Ok(false),
        1 => Ok(true),
        flag => Err(CodecError::malformed(
            index,
            format!("invalid {field} presence flag: {flag}"),
        )),
    }
}

// ── Datum encode/decode ─────────────────────────────────────────

/// Encode a datum.
pub fn encode_datum(w: &mut dyn Write, datum: &Datum) -> Result<(), CodecError> {
    match datum {
        Datum::None => write_u8(w, TAG_NONE),
        Datum::Bool(b) => {
            write_u8(w, TAG_BOOL)?;
            write_u8(w, u8::from(*b))
        }
        Datum::Int(i) => {
            write_u8(w, TAG_INT)?;
            write_i64_le(w, *i)
        }
        Datum::Str(s) => {
            write_u8(w, TAG_STR)?;
            write_length_prefixed_str(w, s)
        }
        Datum::Tuple(items) | Datum::List(items) => {
            let tag = if matches!(datum, Datum::Tuple(_)) {
                TAG_TUPLE
            } else {
                TAG_LIST
            };
            write_u8(w, tag)?;
            write_len(w, items.len())?;
            items.iter().try_for_each(|item| encode_datum(w, item))
        }
    }
}

/// Decode a datum belonging to record `index`.
pub fn decode_datum(r: &mut dyn Read, index: usize) -> Result<Datum, CodecError> {
    decode_datum_at(r, index, 0)
}

fn decode_datum_at(r: &mut dyn Read, index: usize, depth: usize) -> Result<Datum, CodecError> {
    if depth > MAX_DATUM_DEPTH {
        return Err(CodecError::malformed(
            index,
            format!("datum nested deeper than {MAX_DATUM_DEPTH}"),
        ));
    }
    let datum = match read_u8(r)? {
        TAG_NONE => Datum::None,
        TAG_BOOL => match read_u8(r)? {
            0 => Datum::Bool(false),
            1 => Datum::Bool(true),
            b => {
                return Err(CodecError::malformed(index, format!("invalid bool byte {b}")));
            }
        },
        TAG_INT => Datum::Int(read_i64_le(r)?),
        TAG_STR => Datum::Str(read_length_prefixed_str(r, index)?),
        tag @ (TAG_TUPLE | TAG_LIST) => {
            let count = read_u32_le(r)? as usize;
            let mut items = Vec::with_capacity(count.min(PREALLOC_LIMIT));
            for _ in 0..count {
                items.push(decode_datum_at(r, index, depth + 1)?);
            }
            if tag == TAG_TUPLE {
                Datum::Tuple(items)
            } else {
                Datum::List(items)
            }
        }
        tag => {
            return Err(CodecError::malformed(index, format!("unknown datum tag {tag}")));
        }
    };
    Ok(datum)
}

// ── Record encode/decode ────────────────────────────────────────

/// Encode a single record.
pub fn encode_record(w: &mut dyn Write, record: &SpecRecord) -> Result<(), CodecError> {
    write_i64_le(w, record.kind_code)?;
    write_i64_le(w, record.arity)?;
    match &record.metadata {
        Some(datum) => {
            write_u8(w, 1)?;
            encode_datum(w, datum)?;
        }
        None => write_u8(w, 0)?,
    }
    match &record.custom_type {
        Some(handle) => {
            write_u8(w, 1)?;
            match handle.namespace() {
                Some(ns) => {
                    write_u8(w, 1)?;
                    write_length_prefixed_str(w, ns)?;
                }
                None => write_u8(w, 0)?,
            }
            write_length_prefixed_str(w, handle.name())?;
        }
        None => write_u8(w, 0)?,
    }
    write_i64_le(w, record.num_leaves)?;
    write_i64_le(w, record.num_nodes)?;
    Ok(())
}

/// Decode the record at position `index`.
pub fn decode_record(r: &mut dyn Read, index: usize) -> Result<SpecRecord, CodecError> {
    let kind_code = read_i64_le(r)?;
    let arity = read_i64_le(r)?;
    let metadata = if read_presence(r, index, "metadata")? {
        Some(decode_datum(r, index)?)
    } else {
        None
    };
    let custom_type = if read_presence(r, index, "custom type")? {
        let namespace = if read_presence(r, index, "namespace")? {
            Some(read_length_prefixed_str(r, index)?)
        } else {
            None
        };
        let name = read_length_prefixed_str(r, index)?;
        Some(match namespace {
            Some(ns) => TypeHandle::namespaced(ns, name),
            None => TypeHandle::global(name),
        })
    } else {
        None
    };
    Ok(SpecRecord {
        kind_code,
        arity,
        metadata,
        custom_type,
        num_leaves: read_i64_le(r)?,
        num_nodes: read_i64_le(r)?,
    })
}

// ── Stream encode/decode ────────────────────────────────────────

/// Write the header and a record list.
pub fn encode_records(w: &mut dyn Write, records: &[SpecRecord]) -> Result<(), CodecError> {
    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)?;
    write_len(w, records.len())?;
    records.iter().try_for_each(|record| encode_record(w, record))
}

/// Read and check the header, then the record list.
pub fn decode_records(r: &mut dyn Read) -> Result<Vec<SpecRecord>, CodecError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(CodecError::InvalidMagic);
    }
    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion { found: version });
    }
    let count = read_u32_le(r)? as usize;
    let mut records = Vec::with_capacity(count.min(PREALLOC_LIMIT));
    for index in 0..count {
        records.push(decode_record(r, index)?);
    }
    Ok(records)
}

/// Serialize `spec` and write it in binary form.
pub fn encode_spec<L>(w: &mut dyn Write, spec: &TreeSpec<L>) -> Result<(), CodecError> {
    encode_records(w, &serialize(spec))
}

/// Read a binary spec and rebuild it against `registry`.
///
/// # Errors
///
/// Everything [`decode_records`] and [`deserialize`] can return.
pub fn decode_spec<L>(
    r: &mut dyn Read,
    registry: &TypeRegistry<L>,
) -> Result<TreeSpec<L>, CodecError> {
    let records = decode_records(r)?;
    deserialize(registry, &records)
}
