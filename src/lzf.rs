//! LZF decompression.
//!
//! LZF output is a sequence of chunks, each introduced by a control byte:
//! values below 32 start a literal run, everything else a back-reference
//! into the bytes already produced. The back-reference tag is two bytes, or
//! three when the copy length overflows the control byte's three length
//! bits. Both the compressed and the decompressed sizes are declared up
//! front by the container, so every read and write is checked against them.

use thiserror::Error as ThisError;

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum LzfError {
    #[error("compressed input ended mid-chunk")]
    TruncatedInput,
    #[error("back-reference points before the start of the output")]
    BadReference,
    #[error("output would exceed the declared decompressed length")]
    OutputOverrun,
    #[error("decompressed length mismatch: expected {expected}, produced {produced}")]
    LengthMismatch { expected: usize, produced: usize },
}

/// Decompress `input` into exactly `expected_len` bytes.
pub fn decompress(input: &[u8], expected_len: usize) -> Result<Vec<u8>, LzfError> {
    let mut out: Vec<u8> = Vec::with_capacity(expected_len);
    let mut i = 0;

    while i < input.len() {
        let ctrl = input[i] as usize;
        i += 1;

        if ctrl < 32 {
            // Literal run of ctrl + 1 bytes.
            let run = ctrl + 1;
            if i + run > input.len() {
                return Err(LzfError::TruncatedInput);
            }
            if out.len() + run > expected_len {
                return Err(LzfError::OutputOverrun);
            }
            out.extend_from_slice(&input[i..i + run]);
            i += run;
        } else {
            // Back-reference: three length bits, 13 offset bits. A length
            // field of 7 means the real length lives in an extra byte.
            let mut len = ctrl >> 5;
            if len == 7 {
                if i >= input.len() {
                    return Err(LzfError::TruncatedInput);
                }
                len += input[i] as usize;
                i += 1;
            }
            let len = len + 2;

            if i >= input.len() {
                return Err(LzfError::TruncatedInput);
            }
            let offset = ((ctrl & 0x1F) << 8) | input[i] as usize;
            i += 1;

            let start = out
                .len()
                .checked_sub(offset + 1)
                .ok_or(LzfError::BadReference)?;
            if out.len() + len > expected_len {
                return Err(LzfError::OutputOverrun);
            }
            // Byte-at-a-time so the copy may overlap its own output.
            for j in 0..len {
                let byte = out[start + j];
                out.push(byte);
            }
        }
    }

    if out.len() != expected_len {
        return Err(LzfError::LengthMismatch {
            expected: expected_len,
            produced: out.len(),
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_run_only() {
        // Control byte 4 = literal run of 5 bytes.
        let compressed = [0x04, b'h', b'e', b'l', b'l', b'o'];
        assert_eq!(decompress(&compressed, 5).unwrap(), b"hello");
    }

    #[test]
    fn overlapping_back_reference() {
        // "abc" literal, then a 6-byte copy starting 3 bytes back.
        let compressed = [0x02, b'a', b'b', b'c', 0x80, 0x02];
        assert_eq!(decompress(&compressed, 9).unwrap(), b"abcabcabc");
    }

    #[test]
    fn long_match_form() {
        // Single 'a', then a 19-byte copy with the extended length byte.
        let compressed = [0x00, b'a', 0xE0, 0x0A, 0x00];
        assert_eq!(decompress(&compressed, 20).unwrap(), vec![b'a'; 20]);
    }

    #[test]
    fn truncated_literal_run() {
        let compressed = [0x04, b'h', b'e'];
        assert_eq!(decompress(&compressed, 5), Err(LzfError::TruncatedInput));
    }

    #[test]
    fn truncated_back_reference() {
        let compressed = [0x02, b'a', b'b', b'c', 0x80];
        assert_eq!(decompress(&compressed, 9), Err(LzfError::TruncatedInput));
    }

    #[test]
    fn reference_before_output_start() {
        // Offset reaches past the single literal byte produced so far.
        let compressed = [0x00, b'a', 0x80, 0x05];
        assert_eq!(decompress(&compressed, 8), Err(LzfError::BadReference));
    }

    #[test]
    fn output_overrun_is_rejected() {
        let compressed = [0x04, b'h', b'e', b'l', b'l', b'o'];
        assert_eq!(decompress(&compressed, 3), Err(LzfError::OutputOverrun));
    }

    #[test]
    fn short_output_is_rejected() {
        let compressed = [0x01, b'h', b'i'];
        assert_eq!(
            decompress(&compressed, 5),
            Err(LzfError::LengthMismatch {
                expected: 5,
                produced: 2
            })
        );
    }
}
