//! Value payload decoding for every supported type/encoding pair. Plain
//! families read counts and strings straight off the stream; compact
//! families read one opaque blob and hand it to the matching sub-decoder.
//! Either way the caller gets a fully materialized [`Value`].

use std::io::Read;

use bytes::Bytes;
use itertools::Itertools;

use crate::encodings::{intset, listpack, ziplist};
use crate::length;
use crate::opcode::ObjectType;
use crate::reader::RdbReader;
use crate::string;
use crate::value::Value;
use crate::{Error, Result};

// Quicklist node containers (type code 18).
const QUICKLIST_NODE_PLAIN: u64 = 1;
const QUICKLIST_NODE_PACKED: u64 = 2;

pub fn read_object<R: Read>(reader: &mut RdbReader<R>, object_type: ObjectType) -> Result<Value> {
    match object_type {
        ObjectType::String => Ok(Value::String(string::read_string(reader)?)),
        ObjectType::List => Ok(Value::List(read_string_sequence(reader)?)),
        ObjectType::Set => Ok(Value::Set(read_string_sequence(reader)?)),
        ObjectType::Hash => {
            let count = length::read_length(reader)?;
            let mut fields = Vec::new();
            for _ in 0..count {
                let field = string::read_string(reader)?;
                let value = string::read_string(reader)?;
                fields.push((field, value));
            }
            Ok(Value::Hash(fields))
        }
        ObjectType::SortedSet => {
            let count = length::read_length(reader)?;
            let mut members = Vec::new();
            for _ in 0..count {
                let member = string::read_string(reader)?;
                let score = read_textual_double(reader)?;
                members.push((member, score));
            }
            Ok(Value::SortedSet(members))
        }
        ObjectType::SortedSet2 => {
            let count = length::read_length(reader)?;
            let mut members = Vec::new();
            for _ in 0..count {
                let member = string::read_string(reader)?;
                let score = reader.read_f64_le()?;
                members.push((member, score));
            }
            Ok(Value::SortedSet(members))
        }
        ObjectType::ListZiplist => {
            let (blob, base) = read_blob(reader)?;
            Ok(Value::List(ziplist::entries(&blob, base)?))
        }
        ObjectType::SetIntset => {
            let (blob, base) = read_blob(reader)?;
            Ok(Value::Set(intset::entries(&blob, base)?))
        }
        ObjectType::SortedSetZiplist => {
            let (blob, base) = read_blob(reader)?;
            Ok(Value::SortedSet(pair_up_scored(
                ziplist::entries(&blob, base)?,
                base,
            )?))
        }
        ObjectType::HashZiplist => {
            let (blob, base) = read_blob(reader)?;
            Ok(Value::Hash(pair_up(ziplist::entries(&blob, base)?, base)?))
        }
        ObjectType::ListQuicklist => {
            let nodes = length::read_length(reader)?;
            let mut items = Vec::new();
            for _ in 0..nodes {
                let (blob, base) = read_blob(reader)?;
                items.extend(ziplist::entries(&blob, base)?);
            }
            Ok(Value::List(items))
        }
        ObjectType::ListQuicklist2 => {
            let nodes = length::read_length(reader)?;
            let mut items = Vec::new();
            for _ in 0..nodes {
                let container = length::read_length(reader)?;
                let (blob, base) = read_blob(reader)?;
                match container {
                    QUICKLIST_NODE_PLAIN => items.push(blob),
                    QUICKLIST_NODE_PACKED => items.extend(listpack::entries(&blob, base)?),
                    _ => {
                        return Err(Error::format(
                            base,
                            format!("unknown quicklist node container {container}"),
                        ))
                    }
                }
            }
            Ok(Value::List(items))
        }
        ObjectType::HashListpack => {
            let (blob, base) = read_blob(reader)?;
            Ok(Value::Hash(pair_up(listpack::entries(&blob, base)?, base)?))
        }
        ObjectType::SortedSetListpack => {
            let (blob, base) = read_blob(reader)?;
            Ok(Value::SortedSet(pair_up_scored(
                listpack::entries(&blob, base)?,
                base,
            )?))
        }
        ObjectType::SetListpack => {
            let (blob, base) = read_blob(reader)?;
            Ok(Value::Set(listpack::entries(&blob, base)?))
        }
    }
}

fn read_string_sequence<R: Read>(reader: &mut RdbReader<R>) -> Result<Vec<Bytes>> {
    let count = length::read_length(reader)?;
    let mut items = Vec::new();
    for _ in 0..count {
        items.push(string::read_string(reader)?);
    }
    Ok(items)
}

/// Read a blob-encoded compact structure, remembering where it started so
/// errors inside it can point back into the stream.
fn read_blob<R: Read>(reader: &mut RdbReader<R>) -> Result<(Bytes, u64)> {
    let base = reader.offset();
    let blob = string::read_string(reader)?;
    Ok((blob, base))
}

/// Textual double, used by the textual-score sorted set: one length byte
/// with 255/254/253 reserved for -inf/+inf/NaN, otherwise that many ASCII
/// bytes.
fn read_textual_double<R: Read>(reader: &mut RdbReader<R>) -> Result<f64> {
    let len = reader.read_u8()?;
    match len {
        255 => Ok(f64::NEG_INFINITY),
        254 => Ok(f64::INFINITY),
        253 => Ok(f64::NAN),
        _ => {
            let offset = reader.offset();
            let bytes = reader.read_bytes(len as u64)?;
            parse_score(&bytes, offset)
        }
    }
}

fn parse_score(bytes: &[u8], offset: u64) -> Result<f64> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| {
            Error::corrupt(
                offset,
                format!("bad score {:?}", String::from_utf8_lossy(bytes)),
            )
        })
}

fn pair_up(entries: Vec<Bytes>, base: u64) -> Result<Vec<(Bytes, Bytes)>> {
    if entries.len() % 2 != 0 {
        return Err(Error::corrupt(
            base,
            format!("odd entry count {} in field/value encoding", entries.len()),
        ));
    }
    Ok(entries.into_iter().tuples().collect())
}

fn pair_up_scored(entries: Vec<Bytes>, base: u64) -> Result<Vec<(Bytes, f64)>> {
    pair_up(entries, base)?
        .into_iter()
        .map(|(member, score)| Ok((member, parse_score(&score, base)?)))
        .collect()
}
