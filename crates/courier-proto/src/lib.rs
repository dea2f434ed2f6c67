//! # Courier Proto
//!
//! Message catalog for the Courier file transfer protocol.
//!
//! Every exchange is one request followed by one response. Requests carry the
//! 16-byte client id (all zero before registration), the protocol version,
//! an operation code and the payload length; responses carry only version,
//! code and payload length. Payload layout depends on the code.
//!
//! ```text
//! Request:   id(16) ver(2) code(2) len(4) | payload(len)
//! Response:  ver(2) code(2) len(4)        | payload(len)
//! ```
//!
//! Integer header fields are little-endian on the wire. Names, keys and
//! ciphertext are opaque bytes and are never reordered.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codes;
pub mod error;
pub mod fields;
pub mod header;
pub mod request;
pub mod response;

pub use codes::{RequestCode, ResponseCode};
pub use error::ProtoError;
pub use fields::{ClientId, NameField, PublicKeyField};
pub use header::{RequestHeader, ResponseHeader};
pub use request::{Request, RequestBody};
pub use response::Response;

/// Protocol version spoken by this client.
pub const PROTOCOL_VERSION: u16 = 3;

/// Client id size in bytes.
pub const ID_SIZE: usize = 16;

/// Name / file path field size in bytes (NUL padded).
pub const NAME_SIZE: usize = 255;

/// Public key field size in bytes.
pub const PUBLIC_KEY_SIZE: usize = 160;

/// Symmetric key size in bytes.
pub const SYMMETRIC_KEY_SIZE: usize = 16;

/// Request header size: id(16) + version(2) + code(2) + payload length(4).
pub const REQUEST_HEADER_SIZE: usize = ID_SIZE + 2 + 2 + 4;

/// Response header size: version(2) + code(2) + payload length(4).
pub const RESPONSE_HEADER_SIZE: usize = 2 + 2 + 4;

/// Full size of a registration response (header + id).
pub const REGISTRATION_RESPONSE_SIZE: usize =
    RESPONSE_HEADER_SIZE + response::REGISTRATION_PAYLOAD_SIZE;

/// Full size of a file-received response (header + id, size, name, checksum).
pub const FILE_RECEIVED_RESPONSE_SIZE: usize =
    RESPONSE_HEADER_SIZE + response::FILE_RECEIVED_PAYLOAD_SIZE;

/// Full size of a generic "message received" acknowledgment.
pub const ACK_RESPONSE_SIZE: usize = RESPONSE_HEADER_SIZE;
