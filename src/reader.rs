use std::io::{ErrorKind, Read};

use crate::crc64;
use crate::error::Error;
use crate::Result;

/// Declared lengths come from untrusted input, so big reads are done in
/// bounded chunks: a lying length fails on the short stream instead of
/// allocating the whole claim up front.
const CHUNK: usize = 64 * 1024;

/// A forward-only byte source with a running CRC-64 and offset counter.
///
/// Every byte consumed through the typed read methods feeds the checksum,
/// which is exactly what the trailing RDB checksum covers. The one
/// exception is [`read_trailer`](RdbReader::read_trailer), which reads the
/// stored checksum itself.
pub struct RdbReader<R> {
    src: R,
    offset: u64,
    crc: u64,
}

impl<R: Read> RdbReader<R> {
    pub fn new(src: R) -> RdbReader<R> {
        RdbReader {
            src,
            offset: 0,
            crc: 0,
        }
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// CRC-64 over every byte consumed so far.
    pub fn checksum(&self) -> u64 {
        self.crc
    }

    fn fill_raw(&mut self, buf: &mut [u8]) -> Result<()> {
        self.src.read_exact(buf).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => Error::format(self.offset, "unexpected end of stream"),
            _ => Error::Io {
                offset: self.offset,
                source: e,
            },
        })?;
        self.offset += buf.len() as u64;
        Ok(())
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        self.fill_raw(buf)?;
        self.crc = crc64::update(self.crc, buf);
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.fill(&mut buf)?;
        Ok(buf[0])
    }

    pub fn read_bytes(&mut self, len: u64) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut remaining = usize::try_from(len)
            .map_err(|_| Error::corrupt(self.offset, format!("length {len} too large")))?;
        while remaining > 0 {
            let n = remaining.min(CHUNK);
            let mut chunk = vec![0u8; n];
            self.fill(&mut chunk)?;
            out.extend_from_slice(&chunk);
            remaining -= n;
        }
        Ok(out)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_i16_le(&mut self) -> Result<i16> {
        let mut buf = [0u8; 2];
        self.fill(&mut buf)?;
        Ok(i16::from_le_bytes(buf))
    }

    pub fn read_i32_le(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    pub fn read_u32_be(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    pub fn read_u64_be(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }

    pub fn read_f32_le(&mut self) -> Result<f32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(f32::from_le_bytes(buf))
    }

    pub fn read_f64_le(&mut self) -> Result<f64> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf)?;
        Ok(f64::from_le_bytes(buf))
    }

    /// Read the trailing 8-byte stored checksum. The stored value is the
    /// one field the running checksum must not cover.
    pub fn read_trailer(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.fill_raw(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn offset_tracks_consumed_bytes() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let mut reader = RdbReader::new(Cursor::new(&data[..]));

        assert_eq!(reader.offset(), 0);
        assert_eq!(reader.read_u8().unwrap(), 1);
        assert_eq!(reader.offset(), 1);
        assert_eq!(reader.read_bytes(3).unwrap(), vec![2, 3, 4]);
        assert_eq!(reader.offset(), 4);
    }

    #[test]
    fn checksum_matches_direct_computation() {
        let data = b"some snapshot bytes";
        let mut reader = RdbReader::new(Cursor::new(&data[..]));
        reader.read_bytes(data.len() as u64).unwrap();

        assert_eq!(reader.checksum(), crc64::update(0, data));
    }

    #[test]
    fn trailer_is_excluded_from_checksum() {
        let mut data = b"payload".to_vec();
        data.extend_from_slice(&0xDEAD_BEEFu64.to_le_bytes());
        let mut reader = RdbReader::new(Cursor::new(&data[..]));

        reader.read_bytes(7).unwrap();
        let before = reader.checksum();
        assert_eq!(reader.read_trailer().unwrap(), 0xDEAD_BEEF);
        assert_eq!(reader.checksum(), before);
    }

    #[test]
    fn short_stream_is_a_format_error() {
        let data = [1u8, 2];
        let mut reader = RdbReader::new(Cursor::new(&data[..]));

        let err = reader.read_u32_le().unwrap_err();
        assert!(matches!(err, Error::Format { offset: 0, .. }));
    }

    #[test]
    fn endianness_helpers() {
        let data = [0x01, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01];
        let mut reader = RdbReader::new(Cursor::new(&data[..]));
        assert_eq!(reader.read_i16_le().unwrap(), 0x0201);
        let mut reader = RdbReader::new(Cursor::new(&data[..]));
        assert_eq!(reader.read_u32_be().unwrap(), 0x0102_0000);
        let mut reader = RdbReader::new(Cursor::new(&data[..]));
        assert_eq!(reader.read_u64_be().unwrap(), 0x0102_0000_0000_0001);
    }
}
