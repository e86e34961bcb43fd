//! Server-to-client messages.

use crate::message::{MessageType, Qid, QidList, Stat};

/// A response, as decoded from a frame payload.
///
/// String and data fields are views into the buffer the response was
/// parsed from and live only as long as it does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Response<'a> {
    /// Version and message size the server accepts.
    Version {
        /// Maximum message size the server will receive.
        msize: u32,
        /// Protocol version the server accepted, or `"unknown"`.
        version: &'a str,
    },
    /// Qid of the authentication file.
    Auth {
        /// Qid of the auth file to write the handshake through.
        aqid: Qid,
    },
    /// The request failed; no other response fields are meaningful.
    Error {
        /// Human-readable reason supplied by the server.
        ename: &'a str,
    },
    /// Qid of the attached file tree root.
    Attach {
        /// Qid of the tree root.
        qid: Qid,
    },
    /// Qids of the directories visited by a walk, one per element
    /// walked, at most [`crate::message::MAX_WALK_ELEMENTS`].
    Walk {
        /// Visited qids in walk order.
        qids: QidList,
    },
    /// The file is open for I/O.
    Open {
        /// Qid of the opened file.
        qid: Qid,
        /// Hint for the number of bytes to transfer per operation.
        iounit: u32,
    },
    /// The file was created and opened.
    Create {
        /// Qid of the created file.
        qid: Qid,
        /// Hint for the number of bytes to transfer per operation.
        iounit: u32,
    },
    /// Bytes read from a file.
    Read {
        /// The bytes read.
        data: &'a [u8],
    },
    /// Acknowledges a write.
    Write {
        /// Number of bytes recorded.
        count: u32,
    },
    /// Stat record of the inquired file.
    Stat {
        /// The file's directory entry.
        stat: Stat<'a>,
    },
    /// Acknowledges a flush.
    Flush,
    /// Acknowledges a clunk.
    Clunk,
    /// Acknowledges a remove.
    Remove,
    /// Acknowledges a stat update.
    WStat,
    /// Acknowledges a session resumption (9P2000.e).
    Session,
    /// Whole-file read result (9P2000.e).
    ShortRead {
        /// The bytes read.
        data: &'a [u8],
    },
    /// Whole-file write acknowledgement (9P2000.e).
    ShortWrite {
        /// Number of bytes recorded.
        count: u32,
    },
}

impl Response<'_> {
    /// Wire type code of this response.
    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        match self {
            Self::Version { .. } => MessageType::RVersion,
            Self::Auth { .. } => MessageType::RAuth,
            Self::Error { .. } => MessageType::RError,
            Self::Attach { .. } => MessageType::RAttach,
            Self::Walk { .. } => MessageType::RWalk,
            Self::Open { .. } => MessageType::ROpen,
            Self::Create { .. } => MessageType::RCreate,
            Self::Read { .. } => MessageType::RRead,
            Self::Write { .. } => MessageType::RWrite,
            Self::Stat { .. } => MessageType::RStat,
            Self::Flush => MessageType::RFlush,
            Self::Clunk => MessageType::RClunk,
            Self::Remove => MessageType::RRemove,
            Self::WStat => MessageType::RWStat,
            Self::Session => MessageType::RSession,
            Self::ShortRead { .. } => MessageType::RSRead,
            Self::ShortWrite { .. } => MessageType::RSWrite,
        }
    }
}
