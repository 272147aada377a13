//! The variable-length unsigned-integer encoding used throughout the RDB
//! format. The top two bits of the first byte select the scheme:
//!
//! ```text
//! 00|XXXXXX                 6-bit length (0-63)
//! 01|XXXXXX XXXXXXXX        14-bit length, high bits first
//! 10|000000 [4 bytes BE]    32-bit length
//! 10|000001 [8 bytes BE]    64-bit length
//! 11|SSSSSS                 not a length: special string-encoding selector
//! ```
//!
//! The `11` case must be surfaced as such, never coerced into a length; an
//! incorrect interpretation here desynchronizes the whole remaining stream.

use std::io::Read;

use crate::reader::RdbReader;
use crate::{Error, Result};

const LEN_6BIT: u8 = 0;
const LEN_14BIT: u8 = 1;
const LEN_32BIT: u8 = 0x80;
const LEN_64BIT: u8 = 0x81;
const ENCVAL: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    /// An ordinary length or count.
    Plain(u64),
    /// A special-encoding selector for a string object; only the string
    /// decoder may consume this.
    Special(u8),
}

pub fn read_length_or_encoding<R: Read>(reader: &mut RdbReader<R>) -> Result<Length> {
    let first = reader.read_u8()?;

    match first >> 6 {
        ENCVAL => Ok(Length::Special(first & 0x3F)),
        LEN_6BIT => Ok(Length::Plain((first & 0x3F) as u64)),
        LEN_14BIT => {
            let low = reader.read_u8()?;
            Ok(Length::Plain((((first & 0x3F) as u64) << 8) | low as u64))
        }
        _ => match first {
            LEN_32BIT => Ok(Length::Plain(reader.read_u32_be()? as u64)),
            LEN_64BIT => Ok(Length::Plain(reader.read_u64_be()?)),
            _ => Err(Error::format(
                reader.offset(),
                format!("unknown length encoding byte 0x{first:02X}"),
            )),
        },
    }
}

/// Read a Length where a special encoding would be a grammar violation
/// (element counts, database numbers, module payloads).
pub fn read_length<R: Read>(reader: &mut RdbReader<R>) -> Result<u64> {
    match read_length_or_encoding(reader)? {
        Length::Plain(len) => Ok(len),
        Length::Special(selector) => Err(Error::format(
            reader.offset(),
            format!("expected a length, found special string encoding {selector}"),
        )),
    }
}
