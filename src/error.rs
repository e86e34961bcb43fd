//! Error types for the codec.
//!
//! Every decode, parse, encode, and finalize operation returns either a
//! value or one of the errors defined here. The parser surfaces the first
//! error and stops: once framing has been violated the caller must discard
//! the connection or resynchronise externally, so there is no recovery
//! path inside the codec.
//!
//! # Error Categories
//!
//! - Header errors ([`NineError::IllFormedHeader`],
//!   [`NineError::FrameTooShort`], [`NineError::FrameTooBig`],
//!   [`NineError::UnsupportedMessageType`]) reject a frame before its
//!   payload is touched.
//! - Envelope errors ([`NineError::NotEnoughData`],
//!   [`NineError::MoreThanExpectedData`]) reject a payload whose length
//!   disagrees with the declared frame size.
//! - [`NineError::IllFormedMessage`] rejects a payload whose fields are
//!   structurally invalid even though the envelope is intact.
//! - [`NineError::BufferOverflow`] is the encode-side failure: the
//!   destination region is too small.

use thiserror::Error;

/// Category tag carried by every protocol error.
pub const ERROR_CATEGORY: &str = "9p2000";

/// Failure modes of the codec.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum NineError {
    /// Too few bytes in the buffer to read a message header.
    #[error("ill-formed message header: not enough data to read a header")]
    IllFormedHeader,

    /// The declared frame size is smaller than the mandatory header.
    #[error("ill-formed message: declared frame size less than header")]
    FrameTooShort,

    /// The declared frame size exceeds the negotiated maximum.
    #[error("ill-formed message: declared frame size greater than negotiated one")]
    FrameTooBig,

    /// The message type code is not part of the protocol.
    #[error("ill-formed message: unsupported message type")]
    UnsupportedMessageType,

    /// The buffer holds fewer payload bytes than the frame declared.
    #[error("ill-formed message: declared frame size larger than message data received")]
    NotEnoughData,

    /// The buffer holds more payload bytes than the frame declared.
    #[error("ill-formed message: declared frame size less than message data received")]
    MoreThanExpectedData,

    /// A payload field is structurally invalid: a string that is not UTF-8,
    /// a walk reply with more qids than the protocol permits, or a datum
    /// too long for its length prefix.
    #[error("ill-formed message: malformed payload field")]
    IllFormedMessage,

    /// A write ran past the end of the destination buffer.
    #[error("write past the end of the destination buffer")]
    BufferOverflow,
}

impl NineError {
    /// Returns the fixed error-category tag, for logging and metrics.
    #[must_use]
    pub const fn category(&self) -> &'static str { ERROR_CATEGORY }
}

/// Canonical result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NineError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
