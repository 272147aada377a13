//! Intset: `[encoding:u32le][length:u32le]` followed by `length` integers of
//! `encoding` bytes each, little-endian. Members are rendered as decimal
//! text to match the shape of a plain set.

use bytes::Bytes;

use super::Blob;
use crate::Result;

const ENC_INT16: u32 = 2;
const ENC_INT32: u32 = 4;
const ENC_INT64: u32 = 8;

/// Parse an intset blob into its members, in order.
pub fn entries(blob: &[u8], base: u64) -> Result<Vec<Bytes>> {
    let mut b = Blob::new(blob, base);

    let encoding = b.u32_le()?;
    let length = b.u32_le()?;

    if !matches!(encoding, ENC_INT16 | ENC_INT32 | ENC_INT64) {
        return Err(b.err(format!("bad intset encoding {encoding}")));
    }
    // The declared count is untrusted; check it fits the blob before
    // allocating for it.
    let needed = (length as usize)
        .checked_mul(encoding as usize)
        .ok_or_else(|| b.err("intset length overflow"))?;
    if b.remaining() < needed {
        return Err(b.err(format!(
            "intset declares {length} members but only {} bytes remain",
            b.remaining()
        )));
    }

    let mut out = Vec::with_capacity(length as usize);
    for _ in 0..length {
        let value = match encoding {
            ENC_INT16 => b.i16_le()? as i64,
            ENC_INT32 => b.i32_le()? as i64,
            _ => b.i64_le()?,
        };
        out.push(Bytes::from(value.to_string()));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intset16(values: &[i16]) -> Vec<u8> {
        let mut blob = Vec::new();
        blob.extend_from_slice(&2u32.to_le_bytes());
        blob.extend_from_slice(&(values.len() as u32).to_le_bytes());
        for v in values {
            blob.extend_from_slice(&v.to_le_bytes());
        }
        blob
    }

    #[test]
    fn int16_members() {
        let blob = intset16(&[-1, 0, 512]);
        let got = entries(&blob, 0).unwrap();
        assert_eq!(
            got,
            vec![Bytes::from("-1"), Bytes::from("0"), Bytes::from("512")]
        );
    }

    #[test]
    fn int64_members() {
        let mut blob = Vec::new();
        blob.extend_from_slice(&8u32.to_le_bytes());
        blob.extend_from_slice(&1u32.to_le_bytes());
        blob.extend_from_slice(&i64::MIN.to_le_bytes());

        assert_eq!(
            entries(&blob, 0).unwrap(),
            vec![Bytes::from(i64::MIN.to_string())]
        );
    }

    #[test]
    fn bad_encoding_is_corrupt() {
        let mut blob = Vec::new();
        blob.extend_from_slice(&3u32.to_le_bytes());
        blob.extend_from_slice(&0u32.to_le_bytes());
        assert!(entries(&blob, 0).is_err());
    }

    #[test]
    fn truncated_members_are_corrupt() {
        let mut blob = intset16(&[1, 2]);
        blob.pop();
        assert!(entries(&blob, 0).is_err());
    }
}
