//! Client-to-server messages.

use crate::message::{Fid, MessageType, OpenMode, Stat, Tag, WalkPath};

/// A request, as decoded from a frame payload.
///
/// String and data fields are views into the buffer the request was
/// parsed from and live only as long as it does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request<'a> {
    /// Negotiate the protocol version and message size for the
    /// connection. Must be the first message sent.
    Version {
        /// Client-suggested maximum message size in bytes.
        msize: u32,
        /// Protocol version the client wants to speak.
        version: &'a str,
    },
    /// Establish an authentication file for the connection.
    Auth {
        /// New fid to associate with the authentication file.
        afid: Fid,
        /// User seeking access.
        uname: &'a str,
        /// File tree the user wants to access.
        aname: &'a str,
    },
    /// Abort an outstanding request.
    Flush {
        /// Tag of the message to abort.
        oldtag: Tag,
    },
    /// Introduce a user to the server and attach to a file tree.
    Attach {
        /// Fid to become the root of the selected tree.
        fid: Fid,
        /// Fid previously established by an auth message, or `NOFID`.
        afid: Fid,
        /// User on whose behalf all actions are performed.
        uname: &'a str,
        /// File tree to attach to.
        aname: &'a str,
    },
    /// Walk a path from a known fid, binding the result to a new fid.
    Walk {
        /// Directory to start walking from.
        fid: Fid,
        /// Fid to associate with the walk result.
        newfid: Fid,
        /// Path elements to traverse.
        path: WalkPath<'a>,
    },
    /// Check permissions and prepare a fid for I/O.
    Open {
        /// File to open.
        fid: Fid,
        /// Requested type of I/O.
        mode: OpenMode,
    },
    /// Create a new file in the directory the fid represents.
    Create {
        /// Directory to create the file in.
        fid: Fid,
        /// Name of the new file.
        name: &'a str,
        /// Permissions for the new file.
        perm: u32,
        /// Mode to open the new file in.
        mode: OpenMode,
    },
    /// Read bytes from an open file.
    Read {
        /// File to read from.
        fid: Fid,
        /// Byte offset to read at.
        offset: u64,
        /// Maximum number of bytes to return.
        count: u32,
    },
    /// Write bytes to an open file.
    Write {
        /// File to write to.
        fid: Fid,
        /// Byte offset to write at.
        offset: u64,
        /// Bytes to record.
        data: &'a [u8],
    },
    /// Release a fid. The fid is invalidated even if cleanup fails.
    Clunk {
        /// Fid to release.
        fid: Fid,
    },
    /// Remove the file and clunk the fid, even if the remove fails.
    Remove {
        /// File to remove.
        fid: Fid,
    },
    /// Inquire about the file the fid identifies.
    Stat {
        /// File to inquire about.
        fid: Fid,
    },
    /// Update the stat record of a file.
    WStat {
        /// File to update.
        fid: Fid,
        /// New stat fields.
        stat: Stat<'a>,
    },
    /// Re-establish a previous session (9P2000.e).
    Session {
        /// Key of the session to resume.
        key: [u8; 8],
    },
    /// Read a whole file by path in one round trip (9P2000.e).
    ShortRead {
        /// Root directory to resolve the path from.
        fid: Fid,
        /// Path of the file to read.
        path: WalkPath<'a>,
    },
    /// Overwrite a whole file by path in one round trip (9P2000.e).
    ShortWrite {
        /// Root directory to resolve the path from.
        fid: Fid,
        /// Path of the file to write.
        path: WalkPath<'a>,
        /// Bytes to record.
        data: &'a [u8],
    },
}

impl Request<'_> {
    /// Wire type code of this request.
    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        match self {
            Self::Version { .. } => MessageType::TVersion,
            Self::Auth { .. } => MessageType::TAuth,
            Self::Flush { .. } => MessageType::TFlush,
            Self::Attach { .. } => MessageType::TAttach,
            Self::Walk { .. } => MessageType::TWalk,
            Self::Open { .. } => MessageType::TOpen,
            Self::Create { .. } => MessageType::TCreate,
            Self::Read { .. } => MessageType::TRead,
            Self::Write { .. } => MessageType::TWrite,
            Self::Clunk { .. } => MessageType::TClunk,
            Self::Remove { .. } => MessageType::TRemove,
            Self::Stat { .. } => MessageType::TStat,
            Self::WStat { .. } => MessageType::TWStat,
            Self::Session { .. } => MessageType::TSession,
            Self::ShortRead { .. } => MessageType::TSRead,
            Self::ShortWrite { .. } => MessageType::TSWrite,
        }
    }
}
