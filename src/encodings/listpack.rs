//! Listpack: `[total-bytes:u32le][num-elements:u16le]` followed by packed
//! entries and a 0xFF terminator. Each entry is an encoding byte (possibly
//! with inline length bits), the payload, and a trailing back-length whose
//! width depends on the entry size; a forward scan computes and skips it.
//! Integers are rendered as decimal text so every entry comes out as bytes.

use bytes::Bytes;

use super::Blob;
use crate::Result;

const END: u8 = 0xFF;

const STR_32: u8 = 0xF0;
const INT_16: u8 = 0xF1;
const INT_24: u8 = 0xF2;
const INT_32: u8 = 0xF3;
const INT_64: u8 = 0xF4;

/// Bytes the back-length field occupies for an entry of `entry_len` bytes.
fn backlen_size(entry_len: usize) -> usize {
    match entry_len {
        0..=127 => 1,
        128..=16383 => 2,
        16384..=2_097_151 => 3,
        2_097_152..=268_435_455 => 4,
        _ => 5,
    }
}

/// Parse a listpack blob into its entries, in order.
pub fn entries(blob: &[u8], base: u64) -> Result<Vec<Bytes>> {
    let mut b = Blob::new(blob, base);

    let _total_bytes = b.u32_le()?;
    let declared = b.u16_le()?;

    let mut out = Vec::new();
    loop {
        if b.peek_u8()? == END {
            break;
        }

        let flag = b.u8()?;
        let mut entry_len = 1usize;
        let entry = if flag & 0x80 == 0 {
            // 7-bit unsigned integer, value in the flag byte.
            Bytes::from((flag & 0x7F).to_string())
        } else if flag & 0xC0 == 0x80 {
            // 6-bit string length.
            let len = (flag & 0x3F) as usize;
            entry_len += len;
            Bytes::copy_from_slice(b.take(len)?)
        } else if flag & 0xE0 == 0xC0 {
            // 13-bit signed integer, high bits in the flag.
            let low = b.u8()?;
            entry_len += 1;
            let raw = (((flag & 0x1F) as i32) << 8) | low as i32;
            let value = (raw << 19) >> 19;
            Bytes::from(value.to_string())
        } else if flag & 0xF0 == 0xE0 {
            // 12-bit string length.
            let low = b.u8()?;
            entry_len += 1;
            let len = (((flag & 0x0F) as usize) << 8) | low as usize;
            entry_len += len;
            Bytes::copy_from_slice(b.take(len)?)
        } else {
            match flag {
                STR_32 => {
                    let len = b.u32_le()? as usize;
                    entry_len += 4 + len;
                    Bytes::copy_from_slice(b.take(len)?)
                }
                INT_16 => {
                    entry_len += 2;
                    Bytes::from(b.i16_le()?.to_string())
                }
                INT_24 => {
                    entry_len += 3;
                    Bytes::from(b.i24_le()?.to_string())
                }
                INT_32 => {
                    entry_len += 4;
                    Bytes::from(b.i32_le()?.to_string())
                }
                INT_64 => {
                    entry_len += 8;
                    Bytes::from(b.i64_le()?.to_string())
                }
                _ => return Err(b.err(format!("bad listpack entry flag 0x{flag:02X}"))),
            }
        };

        b.skip(backlen_size(entry_len))?;
        out.push(entry);
    }

    // 0xFFFF means the count outgrew the header field; the terminator is
    // authoritative then.
    if declared != u16::MAX && out.len() != declared as usize {
        return Err(b.err(format!(
            "listpack declares {declared} entries but contains {}",
            out.len()
        )));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a listpack blob from pre-encoded entries (without back-lengths).
    fn listpack(entries: &[&[u8]]) -> Vec<u8> {
        let mut body = Vec::new();
        for entry in entries {
            body.extend_from_slice(entry);
            // Entries in these fixtures are all short, one back-length byte.
            assert!(entry.len() < 128);
            body.push(entry.len() as u8);
        }
        body.push(0xFF);

        let mut blob = Vec::new();
        blob.extend_from_slice(&((6 + body.len() + 1) as u32).to_le_bytes());
        blob.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        blob.extend_from_slice(&body);
        blob
    }

    fn str_entry(s: &[u8]) -> Vec<u8> {
        let mut e = vec![0x80 | s.len() as u8];
        e.extend_from_slice(s);
        e
    }

    #[test]
    fn small_string_entries() {
        let blob = listpack(&[&str_entry(b"field"), &str_entry(b"value")]);
        let got = entries(&blob, 0).unwrap();
        assert_eq!(got, vec![Bytes::from("field"), Bytes::from("value")]);
    }

    #[test]
    fn seven_bit_integers() {
        let blob = listpack(&[&[0x00], &[0x7F]]);
        let got = entries(&blob, 0).unwrap();
        assert_eq!(got, vec![Bytes::from("0"), Bytes::from("127")]);
    }

    #[test]
    fn thirteen_bit_integers_sign_extend() {
        // 0xC0 0x80: high bits 0, low byte 128 -> 128.
        // 0xDF 0xFF: all bits set -> -1.
        let blob = listpack(&[&[0xC0, 0x80], &[0xDF, 0xFF]]);
        let got = entries(&blob, 0).unwrap();
        assert_eq!(got, vec![Bytes::from("128"), Bytes::from("-1")]);
    }

    #[test]
    fn wide_integers() {
        let blob = listpack(&[
            &[INT_16, 0x39, 0x30],                                     // 12345
            &[INT_64, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80], // i64::MIN
        ]);
        let got = entries(&blob, 0).unwrap();
        assert_eq!(
            got,
            vec![Bytes::from("12345"), Bytes::from(i64::MIN.to_string())]
        );
    }

    #[test]
    fn twelve_bit_string_length() {
        let payload = vec![b'x'; 200];
        let mut entry = vec![0xE0, 200];
        entry.extend_from_slice(&payload);

        // 202-byte entry needs a two-byte back-length.
        let mut body = entry.clone();
        body.extend_from_slice(&[0x81, 0x49]);
        body.push(0xFF);
        let mut blob = Vec::new();
        blob.extend_from_slice(&((6 + body.len() + 1) as u32).to_le_bytes());
        blob.extend_from_slice(&1u16.to_le_bytes());
        blob.extend_from_slice(&body);

        let got = entries(&blob, 0).unwrap();
        assert_eq!(got, vec![Bytes::from(payload)]);
    }

    #[test]
    fn count_mismatch_is_corrupt() {
        let mut blob = listpack(&[&str_entry(b"one")]);
        blob[4] = 2;
        assert!(entries(&blob, 0).is_err());
    }

    #[test]
    fn missing_terminator_is_corrupt() {
        let mut blob = listpack(&[&str_entry(b"one")]);
        blob.pop();
        assert!(entries(&blob, 0).is_err());
    }

    #[test]
    fn bad_flag_is_corrupt() {
        let blob = listpack(&[&[0xF5]]);
        assert!(entries(&blob, 0).is_err());
    }
}
