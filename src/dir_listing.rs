//! Directory-listing encoder.
//!
//! A `TRead` on a directory returns a sequence of packed stat records,
//! and the client pages through them by raising `offset` (in bytes of
//! the packed stream) on each request, bounded by `count`.
//! [`DirListingWriter`] keeps those two numbers honest for a server
//! streaming entries into a reply:
//!
//! ```
//! use ninewire::{DirListingWriter, Encoder};
//! # use ninewire::message::Stat;
//! # fn entries() -> Vec<Stat<'static>> { Vec::new() }
//! let mut buf = [0_u8; 4096];
//! let mut encoder = Encoder::new(&mut buf);
//! let mut writer = DirListingWriter::new(&mut encoder, 4096, 0);
//! for entry in &entries() {
//!     if !writer.encode(entry)? {
//!         break;
//!     }
//! }
//! # Ok::<(), ninewire::NineError>(())
//! ```
//!
//! Records wholly before `offset` are skipped, records that would push
//! the reply past `count` end the listing, and a record is never split.

use crate::encoder::{Encoder, size_of_stat};
use crate::error::Result;
use crate::message::Stat;

/// Streams packed stat records into a bounded reply region.
#[derive(Debug)]
pub struct DirListingWriter<'e, 'b> {
    dest: &'e mut Encoder<'b>,
    offset: u64,
    count: u32,
    bytes_traversed: u64,
    bytes_encoded: u32,
}

impl<'e, 'b> DirListingWriter<'e, 'b> {
    /// Create a writer that skips `offset` bytes of the packed stream
    /// and then emits at most `count` bytes into `dest`.
    #[must_use]
    pub fn new(dest: &'e mut Encoder<'b>, count: u32, offset: u64) -> Self {
        Self {
            dest,
            offset,
            count,
            bytes_traversed: 0,
            bytes_encoded: 0,
        }
    }

    /// Exact encoded length of a stat record, its leading size field
    /// included.
    #[must_use]
    pub fn size_stat(stat: &Stat<'_>) -> u16 {
        u16::try_from(size_of_stat(stat)).unwrap_or(u16::MAX)
    }

    /// Offer the next directory entry to the listing.
    ///
    /// Returns `Ok(true)` while the caller should keep offering entries
    /// (the entry was written, or skipped because it lies wholly before
    /// `offset`), and `Ok(false)` once the next entry no longer fits in
    /// `count` bytes.
    pub fn encode(&mut self, stat: &Stat<'_>) -> Result<bool> {
        let record = u64::from(Self::size_stat(stat));

        // Entries wholly before the requested offset are measured but
        // not written; the client already has them.
        if self.bytes_traversed + record <= self.offset {
            self.bytes_traversed += record;
            return Ok(true);
        }

        if u64::from(self.bytes_encoded) + record > u64::from(self.count) {
            return Ok(false);
        }

        self.dest.write_stat(stat)?;
        self.bytes_traversed += record;
        self.bytes_encoded += u32::try_from(record).unwrap_or(u32::MAX);
        Ok(true)
    }

    /// Bytes of the packed stream seen so far, skipped entries included.
    #[must_use]
    pub const fn bytes_traversed(&self) -> u64 { self.bytes_traversed }

    /// Bytes actually written into the reply region.
    #[must_use]
    pub const fn bytes_encoded(&self) -> u32 { self.bytes_encoded }
}
