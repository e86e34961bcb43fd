//! Zero-copy codec for the 9P2000 wire protocol and its 9P2000.e
//! extension.
//!
//! `ninewire` parses and serialises the framed messages a 9P client and
//! server exchange over a reliable byte stream. It is a pure protocol
//! engine: it opens no sockets, performs no I/O, and implements no
//! filesystem semantics. Transports, fid resolution, and tag pairing
//! belong to the caller.
//!
//! Parsed messages borrow their strings and data blobs from the input
//! buffer, and builders write into a caller-supplied buffer, so neither
//! direction allocates on the hot path. A [`Parser`] carries the one
//! piece of per-connection state the protocol has: the negotiated
//! version and maximum frame size.
//!
//! Receive path: bytes → [`Parser::parse_header`] →
//! [`Parser::parse_request`] / [`Parser::parse_response`] → a
//! [`Request`] / [`Response`] variant. Send path: a
//! [`RequestBuilder`] / [`ResponseBuilder`] method → primitive
//! [`Encoder`] writes → the header size is back-patched → the frame is
//! ready to hand to a transport.

pub mod builder;
pub mod decoder;
pub mod dir_listing;
pub mod encoder;
pub mod error;
pub mod message;
pub mod parser;
pub mod request;
pub mod response;

pub use builder::{RequestBuilder, ResponseBuilder};
pub use decoder::Decoder;
pub use dir_listing::DirListingWriter;
pub use encoder::Encoder;
pub use error::{NineError, Result};
pub use message::{
    Fid,
    HEADER_SIZE,
    MAX_MESSAGE_SIZE,
    MAX_WALK_ELEMENTS,
    MessageHeader,
    MessageType,
    NO_TAG,
    NOFID,
    PROTOCOL_VERSION,
    Tag,
    UNKNOWN_PROTOCOL_VERSION,
};
pub use parser::{Parser, ParserConfig};
pub use request::Request;
pub use response::Response;
