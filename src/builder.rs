//! Message builders.
//!
//! [`RequestBuilder`] and [`ResponseBuilder`] assemble complete frames in
//! a caller-supplied buffer: each method reserves room for the 7-byte
//! header, encodes its payload through the primitive encoder, then
//! back-patches the header with the final frame size. On any failure the
//! buffer contents are invalid and nothing is delivered.
//!
//! Both builders stamp every frame with the tag given at construction,
//! [`NO_TAG`] by default. Version negotiation must use `NO_TAG`; the
//! conventional `version` arguments are
//! [`MAX_MESSAGE_SIZE`](crate::message::MAX_MESSAGE_SIZE) and
//! [`PROTOCOL_VERSION`](crate::message::PROTOCOL_VERSION).

use crate::encoder::Encoder;
use crate::error::{NineError, Result};
use crate::message::{Fid, HEADER_SIZE, MAX_WALK_ELEMENTS, MessageType, NO_TAG, OpenMode, Qid, Stat, Tag};

/// Write one frame: placeholder header, payload, back-patched size.
fn frame(
    encoder: &mut Encoder<'_>,
    message_type: MessageType,
    tag: Tag,
    payload: impl FnOnce(&mut Encoder<'_>) -> Result<()>,
) -> Result<usize> {
    let start = encoder.position();
    encoder.skip(HEADER_SIZE as usize)?;
    payload(encoder)?;
    let end = encoder.position();

    let size = u32::try_from(end - start).map_err(|_| NineError::BufferOverflow)?;
    encoder.seek(start)?;
    encoder.write_u32(size)?;
    encoder.write_u8(message_type.code())?;
    encoder.write_u16(tag)?;
    encoder.seek(end)?;
    Ok(end - start)
}

/// Builder for client-to-server frames.
///
/// Each method encodes one complete request and returns its frame length
/// in bytes; [`bytes`](Self::bytes) exposes everything written so far.
#[derive(Debug)]
pub struct RequestBuilder<'a> {
    encoder: Encoder<'a>,
    tag: Tag,
}

impl<'a> RequestBuilder<'a> {
    /// Build frames tagged [`NO_TAG`] into `buffer`.
    #[must_use]
    pub fn new(buffer: &'a mut [u8]) -> Self { Self::with_tag(buffer, NO_TAG) }

    /// Build frames carrying `tag` into `buffer`.
    #[must_use]
    pub fn with_tag(buffer: &'a mut [u8], tag: Tag) -> Self {
        Self {
            encoder: Encoder::new(buffer),
            tag,
        }
    }

    /// Tag stamped on every frame this builder writes.
    #[must_use]
    pub const fn tag(&self) -> Tag { self.tag }

    /// The frames written so far.
    #[must_use]
    pub fn bytes(&self) -> &[u8] { self.encoder.written() }

    fn frame(
        &mut self,
        message_type: MessageType,
        payload: impl FnOnce(&mut Encoder<'_>) -> Result<()>,
    ) -> Result<usize> {
        frame(&mut self.encoder, message_type, self.tag, payload)
    }

    /// `TVersion`: negotiate the protocol version and message size.
    pub fn version(&mut self, msize: u32, version: &str) -> Result<usize> {
        self.frame(MessageType::TVersion, |encoder| {
            encoder.write_u32(msize)?;
            encoder.write_str(version)
        })
    }

    /// `TAuth`: establish an authentication file.
    pub fn auth(&mut self, afid: Fid, uname: &str, aname: &str) -> Result<usize> {
        self.frame(MessageType::TAuth, |encoder| {
            encoder.write_u32(afid)?;
            encoder.write_str(uname)?;
            encoder.write_str(aname)
        })
    }

    /// `TFlush`: abort the request carrying `oldtag`.
    pub fn flush(&mut self, oldtag: Tag) -> Result<usize> {
        self.frame(MessageType::TFlush, |encoder| encoder.write_u16(oldtag))
    }

    /// `TAttach`: attach to a file tree.
    pub fn attach(&mut self, fid: Fid, afid: Fid, uname: &str, aname: &str) -> Result<usize> {
        self.frame(MessageType::TAttach, |encoder| {
            encoder.write_u32(fid)?;
            encoder.write_u32(afid)?;
            encoder.write_str(uname)?;
            encoder.write_str(aname)
        })
    }

    /// `TWalk`: walk `path` from `fid`, binding the result to `newfid`.
    pub fn walk(&mut self, fid: Fid, newfid: Fid, path: &[&str]) -> Result<usize> {
        self.frame(MessageType::TWalk, |encoder| {
            encoder.write_u32(fid)?;
            encoder.write_u32(newfid)?;
            encoder.write_path(path)
        })
    }

    /// `TOpen`: prepare `fid` for I/O.
    pub fn open(&mut self, fid: Fid, mode: OpenMode) -> Result<usize> {
        self.frame(MessageType::TOpen, |encoder| {
            encoder.write_u32(fid)?;
            encoder.write_u8(mode.bits())
        })
    }

    /// `TCreate`: create `name` in the directory `fid` represents.
    pub fn create(&mut self, fid: Fid, name: &str, perm: u32, mode: OpenMode) -> Result<usize> {
        self.frame(MessageType::TCreate, |encoder| {
            encoder.write_u32(fid)?;
            encoder.write_str(name)?;
            encoder.write_u32(perm)?;
            encoder.write_u8(mode.bits())
        })
    }

    /// `TRead`: read `count` bytes at `offset`.
    pub fn read(&mut self, fid: Fid, offset: u64, count: u32) -> Result<usize> {
        self.frame(MessageType::TRead, |encoder| {
            encoder.write_u32(fid)?;
            encoder.write_u64(offset)?;
            encoder.write_u32(count)
        })
    }

    /// `TWrite`: write `data` at `offset`.
    pub fn write(&mut self, fid: Fid, offset: u64, data: &[u8]) -> Result<usize> {
        self.frame(MessageType::TWrite, |encoder| {
            encoder.write_u32(fid)?;
            encoder.write_u64(offset)?;
            encoder.write_data(data)
        })
    }

    /// `TClunk`: release `fid`.
    pub fn clunk(&mut self, fid: Fid) -> Result<usize> {
        self.frame(MessageType::TClunk, |encoder| encoder.write_u32(fid))
    }

    /// `TRemove`: remove the file and release `fid`.
    pub fn remove(&mut self, fid: Fid) -> Result<usize> {
        self.frame(MessageType::TRemove, |encoder| encoder.write_u32(fid))
    }

    /// `TStat`: ask for the file's stat record.
    pub fn stat(&mut self, fid: Fid) -> Result<usize> {
        self.frame(MessageType::TStat, |encoder| encoder.write_u32(fid))
    }

    /// `TWStat`: rewrite the file's stat record.
    pub fn wstat(&mut self, fid: Fid, stat: &Stat<'_>) -> Result<usize> {
        self.frame(MessageType::TWStat, |encoder| {
            encoder.write_u32(fid)?;
            encoder.write_stat(stat)
        })
    }

    /// `TSession`: resume the session identified by `key` (9P2000.e).
    pub fn session(&mut self, key: [u8; 8]) -> Result<usize> {
        self.frame(MessageType::TSession, |encoder| encoder.write_raw(&key))
    }

    /// `TSRead`: read a whole file by path (9P2000.e).
    pub fn sread(&mut self, fid: Fid, path: &[&str]) -> Result<usize> {
        self.frame(MessageType::TSRead, |encoder| {
            encoder.write_u32(fid)?;
            encoder.write_path(path)
        })
    }

    /// `TSWrite`: overwrite a whole file by path (9P2000.e).
    pub fn swrite(&mut self, fid: Fid, path: &[&str], data: &[u8]) -> Result<usize> {
        self.frame(MessageType::TSWrite, |encoder| {
            encoder.write_u32(fid)?;
            encoder.write_path(path)?;
            encoder.write_data(data)
        })
    }
}

/// Builder for server-to-client frames.
#[derive(Debug)]
pub struct ResponseBuilder<'a> {
    encoder: Encoder<'a>,
    tag: Tag,
}

impl<'a> ResponseBuilder<'a> {
    /// Build frames tagged [`NO_TAG`] into `buffer`.
    #[must_use]
    pub fn new(buffer: &'a mut [u8]) -> Self { Self::with_tag(buffer, NO_TAG) }

    /// Build frames carrying `tag` into `buffer`.
    #[must_use]
    pub fn with_tag(buffer: &'a mut [u8], tag: Tag) -> Self {
        Self {
            encoder: Encoder::new(buffer),
            tag,
        }
    }

    /// Tag stamped on every frame this builder writes.
    #[must_use]
    pub const fn tag(&self) -> Tag { self.tag }

    /// The frames written so far.
    #[must_use]
    pub fn bytes(&self) -> &[u8] { self.encoder.written() }

    fn frame(
        &mut self,
        message_type: MessageType,
        payload: impl FnOnce(&mut Encoder<'_>) -> Result<()>,
    ) -> Result<usize> {
        frame(&mut self.encoder, message_type, self.tag, payload)
    }

    /// `RVersion`: answer a version negotiation.
    pub fn version(&mut self, msize: u32, version: &str) -> Result<usize> {
        self.frame(MessageType::RVersion, |encoder| {
            encoder.write_u32(msize)?;
            encoder.write_str(version)
        })
    }

    /// `RAuth`: return the qid of the authentication file.
    pub fn auth(&mut self, aqid: &Qid) -> Result<usize> {
        self.frame(MessageType::RAuth, |encoder| encoder.write_qid(aqid))
    }

    /// `RError`: report a failed request.
    pub fn error(&mut self, ename: &str) -> Result<usize> {
        self.frame(MessageType::RError, |encoder| encoder.write_str(ename))
    }

    /// `RAttach`: return the qid of the attached tree root.
    pub fn attach(&mut self, qid: &Qid) -> Result<usize> {
        self.frame(MessageType::RAttach, |encoder| encoder.write_qid(qid))
    }

    /// `RWalk`: return the qids visited by a walk.
    ///
    /// # Errors
    ///
    /// [`NineError::IllFormedMessage`] if more than
    /// [`MAX_WALK_ELEMENTS`] qids are supplied.
    pub fn walk(&mut self, qids: &[Qid]) -> Result<usize> {
        if qids.len() > MAX_WALK_ELEMENTS {
            return Err(NineError::IllFormedMessage);
        }
        self.frame(MessageType::RWalk, |encoder| {
            encoder.write_u16(u16::try_from(qids.len()).map_err(|_| NineError::IllFormedMessage)?)?;
            for qid in qids {
                encoder.write_qid(qid)?;
            }
            Ok(())
        })
    }

    /// `ROpen`: acknowledge an open.
    pub fn open(&mut self, qid: &Qid, iounit: u32) -> Result<usize> {
        self.frame(MessageType::ROpen, |encoder| {
            encoder.write_qid(qid)?;
            encoder.write_u32(iounit)
        })
    }

    /// `RCreate`: acknowledge a create.
    pub fn create(&mut self, qid: &Qid, iounit: u32) -> Result<usize> {
        self.frame(MessageType::RCreate, |encoder| {
            encoder.write_qid(qid)?;
            encoder.write_u32(iounit)
        })
    }

    /// `RRead`: return bytes read from a file.
    pub fn read(&mut self, data: &[u8]) -> Result<usize> {
        self.frame(MessageType::RRead, |encoder| encoder.write_data(data))
    }

    /// `RWrite`: acknowledge a write of `count` bytes.
    pub fn write(&mut self, count: u32) -> Result<usize> {
        self.frame(MessageType::RWrite, |encoder| encoder.write_u32(count))
    }

    /// `RStat`: return a file's stat record, wrapped in the outer
    /// length the protocol requires.
    pub fn stat(&mut self, stat: &Stat<'_>) -> Result<usize> {
        let wrapper = stat
            .size
            .checked_add(2)
            .ok_or(NineError::IllFormedMessage)?;
        self.frame(MessageType::RStat, |encoder| {
            encoder.write_u16(wrapper)?;
            encoder.write_stat(stat)
        })
    }

    /// `RFlush`: acknowledge a flush.
    pub fn flush(&mut self) -> Result<usize> {
        self.frame(MessageType::RFlush, |_| Ok(()))
    }

    /// `RClunk`: acknowledge a clunk.
    pub fn clunk(&mut self) -> Result<usize> {
        self.frame(MessageType::RClunk, |_| Ok(()))
    }

    /// `RRemove`: acknowledge a remove.
    pub fn remove(&mut self) -> Result<usize> {
        self.frame(MessageType::RRemove, |_| Ok(()))
    }

    /// `RWStat`: acknowledge a stat update.
    pub fn wstat(&mut self) -> Result<usize> {
        self.frame(MessageType::RWStat, |_| Ok(()))
    }

    /// `RSession`: acknowledge a session resumption (9P2000.e).
    pub fn session(&mut self) -> Result<usize> {
        self.frame(MessageType::RSession, |_| Ok(()))
    }

    /// `RSRead`: return a whole file's bytes (9P2000.e).
    pub fn sread(&mut self, data: &[u8]) -> Result<usize> {
        self.frame(MessageType::RSRead, |encoder| encoder.write_data(data))
    }

    /// `RSWrite`: acknowledge a whole-file write (9P2000.e).
    pub fn swrite(&mut self, count: u32) -> Result<usize> {
        self.frame(MessageType::RSWrite, |encoder| encoder.write_u32(count))
    }
}
