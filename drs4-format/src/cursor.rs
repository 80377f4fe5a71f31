//! Bounds-checked little-endian reads over a byte slice.

use crate::tag::RawTag;
use crate::{Error, Result};

/// Sequential reader over the decoded byte source.
///
/// Every fixed-size read either returns the full field or fails with
/// [`Error::Truncated`] without moving the cursor.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte offset.
    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True once every byte has been consumed.
    #[inline]
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Reads `len` bytes.
    ///
    /// # Errors
    /// Returns [`Error::Truncated`] if fewer than `len` bytes remain.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(Error::Truncated {
                offset: self.pos,
                needed: len,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Reads a fixed-size array.
    ///
    /// # Errors
    /// Returns [`Error::Truncated`] if fewer than `N` bytes remain.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Reads a little-endian `u16`.
    ///
    /// # Errors
    /// Returns [`Error::Truncated`] at end of input.
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    /// Reads a little-endian `u32`.
    ///
    /// # Errors
    /// Returns [`Error::Truncated`] at end of input.
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    /// Reads `count` little-endian `u16` values.
    ///
    /// # Errors
    /// Returns [`Error::Truncated`] if the block is incomplete.
    pub fn read_u16_block(&mut self, count: usize) -> Result<Vec<u16>> {
        let bytes = self.read_bytes(count * 2)?;
        Ok(bytes
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect())
    }

    /// Reads `count` little-endian `f32` values.
    ///
    /// # Errors
    /// Returns [`Error::Truncated`] if the block is incomplete.
    pub fn read_f32_block(&mut self, count: usize) -> Result<Vec<f32>> {
        let bytes = self.read_bytes(count * 4)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    /// Reads the next 4-byte tag.
    ///
    /// Returns `Ok(None)` when the input is exhausted exactly at a tag
    /// boundary.
    ///
    /// # Errors
    /// Returns [`Error::Truncated`] if only part of a tag remains.
    pub fn read_tag(&mut self) -> Result<Option<RawTag>> {
        if self.is_at_end() {
            return Ok(None);
        }
        self.read_array().map(|bytes| Some(RawTag(bytes)))
    }

    /// Reads a 4-byte record whose trailing two bytes hold a `u16`.
    ///
    /// Board tags and trigger-cell records share this layout.
    ///
    /// # Errors
    /// Returns [`Error::Truncated`] at end of input.
    pub fn read_trailing_u16(&mut self) -> Result<u16> {
        let record: [u8; 4] = self.read_array()?;
        Ok(u16::from_le_bytes([record[2], record[3]]))
    }
}
