//! Redis's memory-compact collection encodings. Each variant is stored in
//! the stream as one opaque length-prefixed blob whose internal micro-format
//! this module family parses into a flat entry list; the object decoder
//! then gives the entries the same logical shape as their plain-encoded
//! counterparts.

pub mod intset;
pub mod listpack;
pub mod ziplist;

use crate::{Error, Result};

/// Bounds-checked cursor over a compact-encoding blob. `base` is the stream
/// offset the blob started at, so errors point into the original stream.
pub(crate) struct Blob<'a> {
    data: &'a [u8],
    pos: usize,
    base: u64,
}

impl<'a> Blob<'a> {
    pub(crate) fn new(data: &'a [u8], base: u64) -> Blob<'a> {
        Blob { data, pos: 0, base }
    }

    pub(crate) fn err(&self, message: impl Into<String>) -> Error {
        Error::corrupt(self.base + self.pos as u64, message)
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.data.len() - self.pos < n {
            return Err(self.err("blob ends mid-entry"));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub(crate) fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    pub(crate) fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn peek_u8(&self) -> Result<u8> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.err("blob ends mid-entry"))
    }

    pub(crate) fn u16_le(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub(crate) fn u32_le(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn u32_be(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn i8(&mut self) -> Result<i8> {
        Ok(self.u8()? as i8)
    }

    pub(crate) fn i16_le(&mut self) -> Result<i16> {
        let b = self.take(2)?;
        Ok(i16::from_le_bytes([b[0], b[1]]))
    }

    pub(crate) fn i24_le(&mut self) -> Result<i32> {
        let b = self.take(3)?;
        // Sign-extend from 24 bits.
        let raw = (b[0] as i32) | ((b[1] as i32) << 8) | ((b[2] as i32) << 16);
        Ok((raw << 8) >> 8)
    }

    pub(crate) fn i32_le(&mut self) -> Result<i32> {
        let b = self.take(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn i64_le(&mut self) -> Result<i64> {
        let b = self.take(8)?;
        Ok(i64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }
}
