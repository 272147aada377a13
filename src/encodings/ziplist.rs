//! Ziplist: `[zlbytes:u32le][zltail:u32le][zllen:u16le]` followed by packed
//! entries and a 0xFF terminator. Each entry is a previous-entry length
//! (one byte, or 0xFE plus four bytes), then an encoding flag selecting a
//! string of some width or an inline integer. Integers are rendered as
//! decimal text so every entry comes out as bytes.

use bytes::Bytes;

use super::Blob;
use crate::Result;

const END: u8 = 0xFF;
const BIG_PREVLEN: u8 = 0xFE;

const INT_16: u8 = 0xC0;
const INT_32: u8 = 0xD0;
const INT_64: u8 = 0xE0;
const INT_24: u8 = 0xF0;
const INT_8: u8 = 0xFE;

/// Parse a ziplist blob into its entries, in order.
pub fn entries(blob: &[u8], base: u64) -> Result<Vec<Bytes>> {
    let mut b = Blob::new(blob, base);

    let _zlbytes = b.u32_le()?;
    let _zltail = b.u32_le()?;
    let declared = b.u16_le()?;

    let mut out = Vec::new();
    loop {
        if b.peek_u8()? == END {
            break;
        }

        // Previous-entry length, only needed for reverse traversal.
        if b.u8()? == BIG_PREVLEN {
            b.skip(4)?;
        }

        let flag = b.u8()?;
        let entry = match flag >> 6 {
            0 => Bytes::copy_from_slice(b.take((flag & 0x3F) as usize)?),
            1 => {
                let low = b.u8()?;
                let len = (((flag & 0x3F) as usize) << 8) | low as usize;
                Bytes::copy_from_slice(b.take(len)?)
            }
            2 => {
                if flag != 0x80 {
                    return Err(b.err(format!("bad ziplist string flag 0x{flag:02X}")));
                }
                let len = b.u32_be()? as usize;
                Bytes::copy_from_slice(b.take(len)?)
            }
            _ => match flag {
                INT_16 => Bytes::from(b.i16_le()?.to_string()),
                INT_32 => Bytes::from(b.i32_le()?.to_string()),
                INT_64 => Bytes::from(b.i64_le()?.to_string()),
                INT_24 => Bytes::from(b.i24_le()?.to_string()),
                INT_8 => Bytes::from(b.i8()?.to_string()),
                // 0xF1..=0xFD carry the value in the flag itself.
                0xF1..=0xFD => Bytes::from(((flag & 0x0F) as i64 - 1).to_string()),
                _ => return Err(b.err(format!("bad ziplist entry flag 0x{flag:02X}"))),
            },
        };
        out.push(entry);
    }

    // 0xFFFF means the count outgrew the header field; the terminator is
    // authoritative then.
    if declared != u16::MAX && out.len() != declared as usize {
        return Err(b.err(format!(
            "ziplist declares {declared} entries but contains {}",
            out.len()
        )));
    }

    Ok(out)
}
