//! Primitive decoder: a cursor over a borrowed byte region.
//!
//! Every read either advances the cursor by exactly the bytes it consumed
//! or leaves the cursor untouched and returns an error, so a failed parse
//! can be abandoned without cleanup. Strings and data blobs are returned
//! as views into the source buffer; the decoder never allocates.

use crate::error::{NineError, Result};
use crate::message::{DirMode, Qid, QidType, Stat, WalkPath};

/// Cursor over an immutable byte region.
#[derive(Debug)]
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    /// Wrap a byte region for decoding.
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self { Self { buf, pos: 0 } }

    /// Current cursor position from the start of the region.
    #[must_use]
    pub const fn position(&self) -> usize { self.pos }

    /// Bytes left between the cursor and the end of the region.
    #[must_use]
    pub const fn remaining(&self) -> usize { self.buf.len() - self.pos }

    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(count).ok_or(NineError::NotEnoughData)?;
        let bytes = self
            .buf
            .get(self.pos..end)
            .ok_or(NineError::NotEnoughData)?;
        self.pos = end;
        Ok(bytes)
    }

    /// Run a composite read, rewinding the cursor if any step fails.
    fn atomically<T>(&mut self, read: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let start = self.pos;
        let result = read(self);
        if result.is_err() {
            self.pos = start;
        }
        result
    }

    /// Read a fixed-size byte array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.take(N)?;
        let mut out = [0_u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read an unsigned byte.
    pub fn read_u8(&mut self) -> Result<u8> { Ok(self.take(1)?[0]) }

    /// Read a little-endian `u16`.
    pub fn read_u16(&mut self) -> Result<u16> { self.read_array().map(u16::from_le_bytes) }

    /// Read a little-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32> { self.read_array().map(u32::from_le_bytes) }

    /// Read a little-endian `u64`.
    pub fn read_u64(&mut self) -> Result<u64> { self.read_array().map(u64::from_le_bytes) }

    /// Read a length-prefixed UTF-8 string as a view into the source
    /// buffer.
    ///
    /// # Errors
    ///
    /// [`NineError::NotEnoughData`] if the region ends before the
    /// declared length; [`NineError::IllFormedMessage`] if the bytes are
    /// not valid UTF-8.
    pub fn read_str(&mut self) -> Result<&'a str> {
        self.atomically(|decoder| {
            let len = usize::from(decoder.read_u16()?);
            let bytes = decoder.take(len)?;
            std::str::from_utf8(bytes).map_err(|_| NineError::IllFormedMessage)
        })
    }

    /// Read a `u32`-prefixed data blob as a view into the source buffer.
    pub fn read_data(&mut self) -> Result<&'a [u8]> {
        self.atomically(|decoder| {
            let len = decoder.read_u32()?;
            let len = usize::try_from(len).map_err(|_| NineError::NotEnoughData)?;
            decoder.take(len)
        })
    }

    /// Read a 13-byte qid.
    pub fn read_qid(&mut self) -> Result<Qid> {
        self.atomically(|decoder| {
            Ok(Qid {
                typ: QidType::from_bits_retain(decoder.read_u8()?),
                version: decoder.read_u32()?,
                path: decoder.read_u64()?,
            })
        })
    }

    /// Read a stat record.
    ///
    /// The `size` field is taken as declared by the peer; only wire-format
    /// well-formedness is checked.
    pub fn read_stat(&mut self) -> Result<Stat<'a>> {
        self.atomically(|decoder| {
            Ok(Stat {
                size: decoder.read_u16()?,
                typ: decoder.read_u16()?,
                dev: decoder.read_u32()?,
                qid: decoder.read_qid()?,
                mode: DirMode::from_bits_retain(decoder.read_u32()?),
                atime: decoder.read_u32()?,
                mtime: decoder.read_u32()?,
                length: decoder.read_u64()?,
                name: decoder.read_str()?,
                uid: decoder.read_str()?,
                gid: decoder.read_str()?,
                muid: decoder.read_str()?,
            })
        })
    }

    /// Read a walk path: a `u16` element count followed by that many
    /// strings, returned as a zero-copy view.
    ///
    /// Every element is validated here so that iterating the view later
    /// cannot fail.
    pub fn read_walk_path(&mut self) -> Result<WalkPath<'a>> {
        self.atomically(|decoder| {
            let count = decoder.read_u16()?;
            let start = decoder.pos;
            for _ in 0..count {
                decoder.read_str()?;
            }
            Ok(WalkPath::from_raw(count, &decoder.buf[start..decoder.pos]))
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::Decoder;
    use crate::error::NineError;
    use crate::message::QidType;

    #[test]
    fn scalars_decode_little_endian() {
        let bytes = [
            0x2A, // u8
            0x34, 0x12, // u16
            0x78, 0x56, 0x34, 0x12, // u32
            0xF0, 0xDE, 0xBC, 0x9A, 0x78, 0x56, 0x34, 0x12, // u64
        ];
        let mut decoder = Decoder::new(&bytes);
        assert_eq!(decoder.read_u8(), Ok(0x2A));
        assert_eq!(decoder.read_u16(), Ok(0x1234));
        assert_eq!(decoder.read_u32(), Ok(0x1234_5678));
        assert_eq!(decoder.read_u64(), Ok(0x1234_5678_9ABC_DEF0));
        assert_eq!(decoder.remaining(), 0);
    }

    #[rstest]
    #[case::empty(&[])]
    #[case::one_short(&[0x01, 0x02, 0x03])]
    fn short_scalar_reads_leave_cursor_untouched(#[case] bytes: &[u8]) {
        let mut decoder = Decoder::new(bytes);
        assert_eq!(decoder.read_u32(), Err(NineError::NotEnoughData));
        assert_eq!(decoder.position(), 0);
    }

    #[test]
    fn str_is_a_view_into_the_buffer() {
        let bytes = [0x03, 0x00, b'u', b's', b'r'];
        let mut decoder = Decoder::new(&bytes);
        let value = decoder.read_str().expect("string should decode");
        assert_eq!(value, "usr");
        assert_eq!(value.as_ptr(), bytes[2..].as_ptr());
    }

    #[test]
    fn truncated_str_rewinds_past_its_length_prefix() {
        let bytes = [0x05, 0x00, b'u', b's'];
        let mut decoder = Decoder::new(&bytes);
        assert_eq!(decoder.read_str(), Err(NineError::NotEnoughData));
        assert_eq!(decoder.position(), 0);
    }

    #[test]
    fn invalid_utf8_is_ill_formed() {
        let bytes = [0x02, 0x00, 0xFF, 0xFE];
        let mut decoder = Decoder::new(&bytes);
        assert_eq!(decoder.read_str(), Err(NineError::IllFormedMessage));
        assert_eq!(decoder.position(), 0);
    }

    #[test]
    fn qid_decodes_all_thirteen_bytes() {
        let bytes = [
            0x80, // type
            0x01, 0x00, 0x00, 0x00, // version
            0x40, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // path
        ];
        let mut decoder = Decoder::new(&bytes);
        let qid = decoder.read_qid().expect("qid should decode");
        assert_eq!(qid.typ, QidType::DIR);
        assert_eq!(qid.version, 1);
        assert_eq!(qid.path, 64);
        assert_eq!(decoder.remaining(), 0);
    }

    #[test]
    fn walk_path_elements_iterate_in_order() {
        let bytes = [
            0x03, 0x00, // count
            0x03, 0x00, b'u', b's', b'r', // "usr"
            0x05, 0x00, b'l', b'o', b'c', b'a', b'l', // "local"
            0x03, 0x00, b'b', b'i', b'n', // "bin"
        ];
        let mut decoder = Decoder::new(&bytes);
        let path = decoder.read_walk_path().expect("path should decode");
        assert_eq!(path.len(), 3);
        let elements: Vec<&str> = path.iter().collect();
        assert_eq!(elements, ["usr", "local", "bin"]);
        assert_eq!(decoder.remaining(), 0);
    }

    #[test]
    fn truncated_walk_path_rewinds_whole_read() {
        let bytes = [0x02, 0x00, 0x03, 0x00, b'u', b's', b'r'];
        let mut decoder = Decoder::new(&bytes);
        assert_eq!(decoder.read_walk_path(), Err(NineError::NotEnoughData));
        assert_eq!(decoder.position(), 0);
    }

    #[test]
    fn data_blob_is_a_view_into_the_buffer() {
        let bytes = [0x04, 0x00, 0x00, 0x00, 0xDE, 0xAD, 0xBE, 0xEF];
        let mut decoder = Decoder::new(&bytes);
        let data = decoder.read_data().expect("blob should decode");
        assert_eq!(data, &bytes[4..]);
        assert_eq!(data.as_ptr(), bytes[4..].as_ptr());
    }
}
