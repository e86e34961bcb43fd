//! Primitive encoder: a cursor over a mutable byte region.
//!
//! Symmetric to [`crate::decoder`]. Writes fail with
//! [`NineError::BufferOverflow`] once the region is exhausted; the
//! `size_of_*` helpers compute the exact encoded length of each primitive
//! so builders can reserve and back-patch frame headers.

use crate::error::{NineError, Result};
use crate::message::{Qid, Stat};

/// Encoded length of a qid: type[1] version[4] path[8].
pub const SIZE_OF_QID: usize = 13;

/// Encoded length of a length-prefixed string.
#[must_use]
pub fn size_of_str(value: &str) -> usize { 2 + value.len() }

/// Encoded length of a `u32`-prefixed data blob.
#[must_use]
pub fn size_of_data(value: &[u8]) -> usize { 4 + value.len() }

/// Encoded length of a walk path with the given elements.
#[must_use]
pub fn size_of_path(elements: &[&str]) -> usize {
    2 + elements.iter().map(|element| size_of_str(element)).sum::<usize>()
}

/// Encoded length of a stat record, the leading `size` field included.
#[must_use]
pub fn size_of_stat(stat: &Stat<'_>) -> usize {
    2 + 2
        + 4
        + SIZE_OF_QID
        + 4
        + 4
        + 4
        + 8
        + size_of_str(stat.name)
        + size_of_str(stat.uid)
        + size_of_str(stat.gid)
        + size_of_str(stat.muid)
}

/// Cursor over a mutable byte region.
#[derive(Debug)]
pub struct Encoder<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Encoder<'a> {
    /// Wrap a byte region for encoding.
    pub fn new(buf: &'a mut [u8]) -> Self { Self { buf, pos: 0 } }

    /// Current cursor position from the start of the region.
    #[must_use]
    pub fn position(&self) -> usize { self.pos }

    /// Bytes left between the cursor and the end of the region.
    #[must_use]
    pub fn remaining(&self) -> usize { self.buf.len() - self.pos }

    /// The bytes written so far, from the start of the region to the
    /// cursor.
    #[must_use]
    pub fn written(&self) -> &[u8] { &self.buf[..self.pos] }

    /// Move the cursor to an absolute position inside the region.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.buf.len() {
            return Err(NineError::BufferOverflow);
        }
        self.pos = pos;
        Ok(())
    }

    /// Advance the cursor without writing, leaving the skipped bytes as
    /// they were.
    pub fn skip(&mut self, count: usize) -> Result<()> { self.reserve(count).map(|_| ()) }

    fn reserve(&mut self, count: usize) -> Result<&mut [u8]> {
        let end = self
            .pos
            .checked_add(count)
            .ok_or(NineError::BufferOverflow)?;
        let region = self
            .buf
            .get_mut(self.pos..end)
            .ok_or(NineError::BufferOverflow)?;
        self.pos = end;
        Ok(region)
    }

    /// Write an unsigned byte.
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.reserve(1)?[0] = value;
        Ok(())
    }

    /// Write a little-endian `u16`.
    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.reserve(2)?.copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Write a little-endian `u32`.
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.reserve(4)?.copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Write a little-endian `u64`.
    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.reserve(8)?.copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Write raw bytes with no length prefix.
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.reserve(bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    /// Write a length-prefixed string.
    ///
    /// # Errors
    ///
    /// [`NineError::IllFormedMessage`] if the string is longer than a
    /// `u16` length prefix can express; the datum is never truncated.
    pub fn write_str(&mut self, value: &str) -> Result<()> {
        let len = u16::try_from(value.len()).map_err(|_| NineError::IllFormedMessage)?;
        self.write_u16(len)?;
        self.write_raw(value.as_bytes())
    }

    /// Write a `u32`-prefixed data blob.
    pub fn write_data(&mut self, value: &[u8]) -> Result<()> {
        let len = u32::try_from(value.len()).map_err(|_| NineError::IllFormedMessage)?;
        self.write_u32(len)?;
        self.write_raw(value)
    }

    /// Write a 13-byte qid.
    pub fn write_qid(&mut self, qid: &Qid) -> Result<()> {
        self.write_u8(qid.typ.bits())?;
        self.write_u32(qid.version)?;
        self.write_u64(qid.path)
    }

    /// Write a stat record, emitting the `size` field exactly as stored.
    pub fn write_stat(&mut self, stat: &Stat<'_>) -> Result<()> {
        self.write_u16(stat.size)?;
        self.write_u16(stat.typ)?;
        self.write_u32(stat.dev)?;
        self.write_qid(&stat.qid)?;
        self.write_u32(stat.mode.bits())?;
        self.write_u32(stat.atime)?;
        self.write_u32(stat.mtime)?;
        self.write_u64(stat.length)?;
        self.write_str(stat.name)?;
        self.write_str(stat.uid)?;
        self.write_str(stat.gid)?;
        self.write_str(stat.muid)
    }

    /// Write a walk path: element count followed by each element.
    pub fn write_path(&mut self, elements: &[&str]) -> Result<()> {
        let count = u16::try_from(elements.len()).map_err(|_| NineError::IllFormedMessage)?;
        self.write_u16(count)?;
        for element in elements {
            self.write_str(element)?;
        }
        Ok(())
    }
}
