//! Protocol data model: message types, headers, qids, stats, and the
//! fixed constants of a 9P2000 session.
//!
//! All integers are unsigned little-endian on the wire. Strings are a
//! `u16` length prefix followed by that many UTF-8 bytes, never
//! null-terminated. Parsed records borrow their string fields from the
//! buffer they were decoded from.

use std::fmt;

use bitflags::bitflags;

use crate::error::{NineError, Result};

/// Client-chosen identifier correlating a response with its request.
pub type Tag = u16;

/// Client-chosen handle naming a file on the server, akin to a file
/// descriptor.
pub type Fid = u32;

/// Tag value reserved for messages outside any request/response pairing.
/// Version negotiation must use it.
pub const NO_TAG: Tag = !0;

/// Fid value meaning "no fid", e.g. the `afid` of an unauthenticated
/// attach.
pub const NOFID: Fid = !0;

/// Default maximum frame size in bytes. Sessions may negotiate down from
/// this but never up past the parser's configured limit.
pub const MAX_MESSAGE_SIZE: u32 = 8 * 1024;

/// Protocol version offered by default.
pub const PROTOCOL_VERSION: &str = "9P2000.e";

/// Version string a peer answers with when it cannot match the offered
/// version.
pub const UNKNOWN_PROTOCOL_VERSION: &str = "unknown";

/// Size in bytes of the mandatory frame header: size[4] type[1] tag[2].
pub const HEADER_SIZE: u32 = 7;

/// Most qids a single walk reply may carry (MAXWELEM in Plan 9).
pub const MAX_WALK_ELEMENTS: usize = 16;

/// Wire codes of every supported message.
///
/// Even codes are requests (`T*`), odd codes are responses (`R*`). The
/// base 9P2000 set occupies 100..=127; the 9P2000.e extension adds
/// 150..=155. `TError` exists as a wire code but no such message may ever
/// be sent; the parsers reject it at dispatch.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum MessageType {
    TVersion = 100,
    RVersion = 101,
    TAuth = 102,
    RAuth = 103,
    TAttach = 104,
    RAttach = 105,
    /// Illegal; reserved so that every `T` code has an `R` partner.
    TError = 106,
    RError = 107,
    TFlush = 108,
    RFlush = 109,
    TWalk = 110,
    RWalk = 111,
    TOpen = 112,
    ROpen = 113,
    TCreate = 114,
    RCreate = 115,
    TRead = 116,
    RRead = 117,
    TWrite = 118,
    RWrite = 119,
    TClunk = 120,
    RClunk = 121,
    TRemove = 122,
    RRemove = 123,
    TStat = 124,
    RStat = 125,
    TWStat = 126,
    RWStat = 127,
    TSession = 150,
    RSession = 151,
    TSRead = 152,
    RSRead = 153,
    TSWrite = 154,
    RSWrite = 155,
}

impl MessageType {
    /// Short protocol name of the message type, e.g. `"TVersion"`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TVersion => "TVersion",
            Self::RVersion => "RVersion",
            Self::TAuth => "TAuth",
            Self::RAuth => "RAuth",
            Self::TAttach => "TAttach",
            Self::RAttach => "RAttach",
            Self::TError => "TError",
            Self::RError => "RError",
            Self::TFlush => "TFlush",
            Self::RFlush => "RFlush",
            Self::TWalk => "TWalk",
            Self::RWalk => "RWalk",
            Self::TOpen => "TOpen",
            Self::ROpen => "ROpen",
            Self::TCreate => "TCreate",
            Self::RCreate => "RCreate",
            Self::TRead => "TRead",
            Self::RRead => "RRead",
            Self::TWrite => "TWrite",
            Self::RWrite => "RWrite",
            Self::TClunk => "TClunk",
            Self::RClunk => "RClunk",
            Self::TRemove => "TRemove",
            Self::RRemove => "RRemove",
            Self::TStat => "TStat",
            Self::RStat => "RStat",
            Self::TWStat => "TWStat",
            Self::RWStat => "RWStat",
            Self::TSession => "TSession",
            Self::RSession => "RSession",
            Self::TSRead => "TSRead",
            Self::RSRead => "RSRead",
            Self::TSWrite => "TSWrite",
            Self::RSWrite => "RSWrite",
        }
    }

    /// Wire code of the message type.
    #[must_use]
    pub const fn code(self) -> u8 { self as u8 }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl TryFrom<u8> for MessageType {
    type Error = NineError;

    fn try_from(code: u8) -> Result<Self> {
        let message_type = match code {
            100 => Self::TVersion,
            101 => Self::RVersion,
            102 => Self::TAuth,
            103 => Self::RAuth,
            104 => Self::TAttach,
            105 => Self::RAttach,
            106 => Self::TError,
            107 => Self::RError,
            108 => Self::TFlush,
            109 => Self::RFlush,
            110 => Self::TWalk,
            111 => Self::RWalk,
            112 => Self::TOpen,
            113 => Self::ROpen,
            114 => Self::TCreate,
            115 => Self::RCreate,
            116 => Self::TRead,
            117 => Self::RRead,
            118 => Self::TWrite,
            119 => Self::RWrite,
            120 => Self::TClunk,
            121 => Self::RClunk,
            122 => Self::TRemove,
            123 => Self::RRemove,
            124 => Self::TStat,
            125 => Self::RStat,
            126 => Self::TWStat,
            127 => Self::RWStat,
            150 => Self::TSession,
            151 => Self::RSession,
            152 => Self::TSRead,
            153 => Self::RSRead,
            154 => Self::TSWrite,
            155 => Self::RSWrite,
            _ => return Err(NineError::UnsupportedMessageType),
        };
        Ok(message_type)
    }
}

/// Fixed-size header every frame starts with.
///
/// `size` counts the whole frame, header included.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageHeader {
    /// Total frame size in bytes, this header included.
    pub size: u32,
    /// Type of the message that follows.
    pub message_type: MessageType,
    /// Tag correlating concurrent messages; chosen by the client.
    pub tag: Tag,
}

impl MessageHeader {
    /// Build a header for a payload of the given size.
    #[must_use]
    pub const fn for_payload(message_type: MessageType, tag: Tag, payload_size: u32) -> Self {
        Self {
            size: HEADER_SIZE + payload_size,
            message_type,
            tag,
        }
    }

    /// Number of payload bytes that follow this header.
    #[must_use]
    pub const fn payload_size(&self) -> u32 { self.size.saturating_sub(HEADER_SIZE) }
}

bitflags! {
    /// Type of I/O requested when opening or creating a file.
    ///
    /// The low two bits select the access mode (`READ`, `WRITE`, `RDWR`,
    /// `EXEC` are mutually exclusive); the high bits are independent
    /// flags or'ed in.
    #[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
    pub struct OpenMode: u8 {
        /// Open read-only.
        const READ = 0;
        /// Open write-only.
        const WRITE = 1;
        /// Open read-write.
        const RDWR = 2;
        /// Execute; read with the execute permission checked.
        const EXEC = 3;
        /// Truncate the file first (except for exec).
        const TRUNC = 16;
        /// Close on exec.
        const CEXEC = 32;
        /// Remove on close.
        const RCLOSE = 64;
    }
}

impl OpenMode {
    /// The access-mode selector in the low two bits.
    #[must_use]
    pub const fn access(self) -> u8 { self.bits() & 0x3 }
}

bitflags! {
    /// Bits in `Stat::mode`: file-type bits in the high byte, Unix
    /// permission triads in the low bits.
    #[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
    pub struct DirMode: u32 {
        /// Directory.
        const DIR = 0x8000_0000;
        /// Append-only file.
        const APPEND = 0x4000_0000;
        /// Exclusive-use file.
        const EXCL = 0x2000_0000;
        /// Mounted channel.
        const MOUNT = 0x1000_0000;
        /// Authentication file.
        const AUTH = 0x0800_0000;
        /// Non-backed-up file.
        const TMP = 0x0400_0000;
        /// Symbolic link (9P2000.u).
        const SYMLINK = 0x0200_0000;
        /// Device file (9P2000.u).
        const DEVICE = 0x0080_0000;
        /// Named pipe (9P2000.u).
        const NAMEDPIPE = 0x0020_0000;
        /// Socket (9P2000.u).
        const SOCKET = 0x0010_0000;
        /// Setuid (9P2000.u).
        const SETUID = 0x0008_0000;
        /// Setgid (9P2000.u).
        const SETGID = 0x0004_0000;
        /// Read permission.
        const READ = 0x4;
        /// Write permission.
        const WRITE = 0x2;
        /// Execute permission.
        const EXEC = 0x1;
    }
}

bitflags! {
    /// Bits in `Qid::typ`, mirroring the high byte of the file's mode
    /// word.
    #[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
    pub struct QidType: u8 {
        /// Directory.
        const DIR = 0x80;
        /// Append-only file.
        const APPEND = 0x40;
        /// Exclusive-use file.
        const EXCL = 0x20;
        /// Mounted channel.
        const MOUNT = 0x10;
        /// Authentication file.
        const AUTH = 0x08;
        /// Non-backed-up file.
        const TMP = 0x04;
        /// Symbolic link (9P2000.u).
        const LINK = 0x02;
        /// Plain file.
        const FILE = 0x00;
    }
}

/// The server's unique identification for a file.
///
/// Two files on the same server hierarchy are the same if and only if
/// their qids are the same.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub struct Qid {
    /// File-type bits.
    pub typ: QidType,
    /// Version, incremented each time the file is modified.
    pub version: u32,
    /// Unique path identifier issued by the server.
    pub path: u64,
}

/// Directory-entry record describing one file.
///
/// The string fields borrow from the buffer the stat was decoded from.
/// `size` is the byte count of the record after the `size` field itself;
/// [`Stat::new`] computes it so callers never have to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stat<'a> {
    /// Byte count of the remainder of the record.
    pub size: u16,
    /// Server type, for kernel use.
    pub typ: u16,
    /// Server subtype, for kernel use.
    pub dev: u32,
    /// Unique id from the server.
    pub qid: Qid,
    /// Permissions and flags.
    pub mode: DirMode,
    /// Last read time.
    pub atime: u32,
    /// Last write time.
    pub mtime: u32,
    /// File length in bytes.
    pub length: u64,
    /// File name; `/` if the file is the server's root directory.
    pub name: &'a str,
    /// Owner name.
    pub uid: &'a str,
    /// Group name.
    pub gid: &'a str,
    /// Name of the user who last modified the file.
    pub muid: &'a str,
}

impl<'a> Stat<'a> {
    /// Assemble a stat record with the wire `size` field computed from
    /// the remaining fields.
    #[expect(clippy::too_many_arguments, reason = "mirrors the wire record field for field")]
    #[must_use]
    pub fn new(
        typ: u16,
        dev: u32,
        qid: Qid,
        mode: DirMode,
        atime: u32,
        mtime: u32,
        length: u64,
        name: &'a str,
        uid: &'a str,
        gid: &'a str,
        muid: &'a str,
    ) -> Self {
        let mut stat = Self {
            size: 0,
            typ,
            dev,
            qid,
            mode,
            atime,
            mtime,
            length,
            name,
            uid,
            gid,
            muid,
        };
        let body = crate::encoder::size_of_stat(&stat).saturating_sub(2);
        stat.size = u16::try_from(body).unwrap_or(u16::MAX);
        stat
    }
}

/// Zero-copy view over an encoded walk path: a `u16` element count
/// followed by that many length-prefixed strings.
///
/// The view is produced by [`crate::decoder::Decoder::read_walk_path`],
/// which validates every element up front; iteration afterwards cannot
/// fail and does not allocate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WalkPath<'a> {
    count: u16,
    data: &'a [u8],
}

impl<'a> WalkPath<'a> {
    /// A path with no elements.
    pub const EMPTY: WalkPath<'static> = WalkPath { count: 0, data: &[] };

    /// Wrap an already-validated encoded element region.
    pub(crate) const fn from_raw(count: u16, data: &'a [u8]) -> Self { Self { count, data } }

    /// Number of path elements.
    #[must_use]
    pub const fn len(&self) -> usize { self.count as usize }

    /// Whether the path has no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool { self.count == 0 }

    /// Iterate over the path elements in order.
    #[must_use]
    pub const fn iter(&self) -> WalkPathIter<'a> {
        WalkPathIter {
            data: self.data,
            remaining: self.count,
        }
    }
}

impl<'a> IntoIterator for &WalkPath<'a> {
    type Item = &'a str;
    type IntoIter = WalkPathIter<'a>;

    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

/// Iterator over the elements of a [`WalkPath`].
#[derive(Clone, Debug)]
pub struct WalkPathIter<'a> {
    data: &'a [u8],
    remaining: u16,
}

impl<'a> Iterator for WalkPathIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let len_bytes = self.data.get(..2)?;
        let len = usize::from(u16::from_le_bytes([len_bytes[0], len_bytes[1]]));
        let bytes = self.data.get(2..2 + len)?;
        self.data = self.data.get(2 + len..)?;
        // Validated when the view was constructed.
        std::str::from_utf8(bytes).ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::from(self.remaining);
        (remaining, Some(remaining))
    }
}

/// Fixed-capacity list of qids carried by a walk reply.
#[derive(Clone, Copy, Debug)]
pub struct QidList {
    qids: [Qid; MAX_WALK_ELEMENTS],
    len: usize,
}

impl QidList {
    /// An empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            qids: [Qid {
                typ: QidType::empty(),
                version: 0,
                path: 0,
            }; MAX_WALK_ELEMENTS],
            len: 0,
        }
    }

    /// Append a qid.
    ///
    /// # Errors
    ///
    /// Returns [`NineError::IllFormedMessage`] once the list already
    /// holds [`MAX_WALK_ELEMENTS`] entries.
    pub fn push(&mut self, qid: Qid) -> Result<()> {
        if self.len == MAX_WALK_ELEMENTS {
            return Err(NineError::IllFormedMessage);
        }
        self.qids[self.len] = qid;
        self.len += 1;
        Ok(())
    }

    /// Number of qids held.
    #[must_use]
    pub const fn len(&self) -> usize { self.len }

    /// Whether the list is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool { self.len == 0 }

    /// The held qids, in walk order.
    #[must_use]
    pub fn as_slice(&self) -> &[Qid] { &self.qids[..self.len] }
}

impl Default for QidList {
    fn default() -> Self { Self::new() }
}

impl PartialEq for QidList {
    fn eq(&self, other: &Self) -> bool { self.as_slice() == other.as_slice() }
}

impl Eq for QidList {}

impl TryFrom<&[Qid]> for QidList {
    type Error = NineError;

    fn try_from(qids: &[Qid]) -> Result<Self> {
        let mut list = Self::new();
        for qid in qids {
            list.push(*qid)?;
        }
        Ok(list)
    }
}
