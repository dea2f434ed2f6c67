//! Request and response header encoding.
//!
//! ```text
//! Request header (24 bytes)         Response header (8 bytes)
//!  Offset  Size  Field               Offset  Size  Field
//!  0       16    Client id           0       2     Version
//!  16      2     Version             2       2     Code
//!  18      2     Code                4       4     Payload length
//!  20      4     Payload length
//! ```
//!
//! Integer fields are little-endian. The byte order is fixed per field so the
//! wire format does not depend on the host, and opaque payload bytes are left
//! untouched.

use crate::codes::{RequestCode, ResponseCode};
use crate::error::ProtoError;
use crate::fields::ClientId;
use crate::{ID_SIZE, PROTOCOL_VERSION, REQUEST_HEADER_SIZE, RESPONSE_HEADER_SIZE};

/// Header preceding every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    /// Sender id, unset before registration.
    pub client_id: ClientId,
    /// Protocol version.
    pub version: u16,
    /// Operation code.
    pub code: RequestCode,
    /// Number of payload bytes following the header.
    pub payload_len: u32,
}

impl RequestHeader {
    /// Create a header with the current protocol version.
    #[must_use]
    pub fn new(client_id: ClientId, code: RequestCode, payload_len: u32) -> Self {
        Self {
            client_id,
            version: PROTOCOL_VERSION,
            code,
            payload_len,
        }
    }

    /// Encode into a 24-byte array.
    #[must_use]
    pub fn encode(&self) -> [u8; REQUEST_HEADER_SIZE] {
        let mut buf = [0u8; REQUEST_HEADER_SIZE];
        buf[..ID_SIZE].copy_from_slice(self.client_id.as_bytes());
        buf[16..18].copy_from_slice(&self.version.to_le_bytes());
        buf[18..20].copy_from_slice(&u16::from(self.code).to_le_bytes());
        buf[20..24].copy_from_slice(&self.payload_len.to_le_bytes());
        buf
    }

    /// Decode a header from the start of `buf`.
    ///
    /// # Errors
    ///
    /// Returns `ProtoError::TooShort` if the buffer is smaller than 24 bytes
    /// and `ProtoError::UnknownRequestCode` for codes outside the catalog.
    pub fn decode(buf: &[u8]) -> Result<Self, ProtoError> {
        if buf.len() < REQUEST_HEADER_SIZE {
            return Err(ProtoError::TooShort {
                expected: REQUEST_HEADER_SIZE,
                actual: buf.len(),
            });
        }
        let client_id = ClientId::from_slice(&buf[..ID_SIZE])?;
        let version = u16::from_le_bytes([buf[16], buf[17]]);
        let code = RequestCode::try_from(u16::from_le_bytes([buf[18], buf[19]]))?;
        let payload_len = u32::from_le_bytes([buf[20], buf[21], buf[22], buf[23]]);

        Ok(Self {
            client_id,
            version,
            code,
            payload_len,
        })
    }
}

/// Header preceding every response.
///
/// The code is kept raw: a response may carry a code this client does not
/// expect, and the caller decides what that means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    /// Protocol version reported by the server.
    pub version: u16,
    /// Raw response code.
    pub code: u16,
    /// Number of payload bytes following the header.
    pub payload_len: u32,
}

impl ResponseHeader {
    /// Create a header with the current protocol version.
    #[must_use]
    pub fn new(code: ResponseCode, payload_len: u32) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            code: code.into(),
            payload_len,
        }
    }

    /// Encode into an 8-byte array.
    #[must_use]
    pub fn encode(&self) -> [u8; RESPONSE_HEADER_SIZE] {
        let mut buf = [0u8; RESPONSE_HEADER_SIZE];
        buf[0..2].copy_from_slice(&self.version.to_le_bytes());
        buf[2..4].copy_from_slice(&self.code.to_le_bytes());
        buf[4..8].copy_from_slice(&self.payload_len.to_le_bytes());
        buf
    }

    /// Decode a header from the start of `buf`.
    ///
    /// # Errors
    ///
    /// Returns `ProtoError::TooShort` if the buffer is smaller than 8 bytes.
    pub fn decode(buf: &[u8]) -> Result<Self, ProtoError> {
        if buf.len() < RESPONSE_HEADER_SIZE {
            return Err(ProtoError::TooShort {
                expected: RESPONSE_HEADER_SIZE,
                actual: buf.len(),
            });
        }
        Ok(Self {
            version: u16::from_le_bytes([buf[0], buf[1]]),
            code: u16::from_le_bytes([buf[2], buf[3]]),
            payload_len: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
        })
    }

    /// Whether the header carries `code`.
    #[must_use]
    pub fn is(&self, code: ResponseCode) -> bool {
        self.code == u16::from(code)
    }

    /// The code as a catalog entry, if it is one.
    #[must_use]
    pub fn response_code(&self) -> Option<ResponseCode> {
        ResponseCode::try_from(self.code).ok()
    }

    /// Declared payload length as `usize`.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.payload_len as usize
    }
}
