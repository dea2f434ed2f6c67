//! Error types for message encoding and decoding

use thiserror::Error;

/// Errors raised while building or parsing protocol messages
#[derive(Debug, Error)]
pub enum ProtoError {
    /// Buffer ended before a complete structure could be read
    #[error("Buffer too short: expected {expected} bytes, got {actual}")]
    TooShort {
        /// Bytes required
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// Declared payload length disagrees with the layout or the bytes received
    #[error("Framing error: header declares {declared} payload bytes, expected {expected}")]
    LengthMismatch {
        /// Length in the header
        declared: u32,
        /// Length the layout or buffer allows
        expected: usize,
    },

    /// Request code not in the catalog
    #[error("Unknown request code: {0}")]
    UnknownRequestCode(u16),

    /// Response code not in the catalog
    #[error("Unknown response code: {0}")]
    UnknownResponseCode(u16),

    /// Text does not fit the fixed name field
    #[error("Name too long: {len} bytes (max {max})")]
    NameTooLong {
        /// Encoded length
        len: usize,
        /// Maximum accepted length
        max: usize,
    },

    /// Text contains an interior NUL byte
    #[error("Name contains a NUL byte")]
    NameContainsNul,

    /// Fixed-size binary field had the wrong length
    #[error("Invalid {field} length: expected {expected} bytes, got {actual}")]
    InvalidFieldLength {
        /// Field name
        field: &'static str,
        /// Expected number of bytes
        expected: usize,
        /// Actual number of bytes
        actual: usize,
    },

    /// Invalid hexadecimal encoding
    #[error("Invalid hex encoding: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Payload does not fit the 32-bit length field
    #[error("Payload too large: {0} bytes")]
    PayloadTooLarge(usize),
}
