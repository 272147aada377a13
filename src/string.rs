//! Encoded string objects: raw length-prefixed bytes, inline small
//! integers rendered as decimal text, or an LZF-compressed block.

use std::io::Read;

use bytes::Bytes;

use crate::length::{self, Length};
use crate::lzf;
use crate::reader::RdbReader;
use crate::{Error, Result};

const ENC_INT8: u8 = 0;
const ENC_INT16: u8 = 1;
const ENC_INT32: u8 = 2;
const ENC_LZF: u8 = 3;

pub fn read_string<R: Read>(reader: &mut RdbReader<R>) -> Result<Bytes> {
    match length::read_length_or_encoding(reader)? {
        Length::Plain(len) => Ok(Bytes::from(reader.read_bytes(len)?)),
        Length::Special(ENC_INT8) => {
            let n = reader.read_i8()?;
            Ok(Bytes::from(n.to_string()))
        }
        Length::Special(ENC_INT16) => {
            let n = reader.read_i16_le()?;
            Ok(Bytes::from(n.to_string()))
        }
        Length::Special(ENC_INT32) => {
            let n = reader.read_i32_le()?;
            Ok(Bytes::from(n.to_string()))
        }
        Length::Special(ENC_LZF) => {
            let compressed_len = length::read_length(reader)?;
            let decompressed_len = length::read_length(reader)?;
            let block_offset = reader.offset();
            let compressed = reader.read_bytes(compressed_len)?;

            let decompressed_len = usize::try_from(decompressed_len).map_err(|_| {
                Error::corrupt(
                    block_offset,
                    format!("decompressed length {decompressed_len} too large"),
                )
            })?;
            let decompressed = lzf::decompress(&compressed, decompressed_len)
                .map_err(|e| Error::corrupt(block_offset, e.to_string()))?;
            Ok(Bytes::from(decompressed))
        }
        Length::Special(selector) => Err(Error::format(
            reader.offset(),
            format!("unknown string encoding {selector}"),
        )),
    }
}
