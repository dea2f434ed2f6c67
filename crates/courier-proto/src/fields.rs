//! Fixed-size payload fields.
//!
//! Names and file paths travel in a 255-byte NUL-padded slot, public keys in a
//! 160-byte slot and client ids are 16 opaque bytes.

use crate::error::ProtoError;
use crate::{ID_SIZE, NAME_SIZE, PUBLIC_KEY_SIZE};
use std::fmt;

/// Server-assigned client identifier (all zero until registration).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ClientId([u8; ID_SIZE]);

impl ClientId {
    /// The unset id carried by requests sent before registration.
    pub const UNSET: ClientId = ClientId([0u8; ID_SIZE]);

    /// Create an id from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; ID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create an id from a slice of exactly 16 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ProtoError::InvalidFieldLength`] if the slice is not 16 bytes.
    pub fn from_slice(slice: &[u8]) -> Result<Self, ProtoError> {
        let bytes: [u8; ID_SIZE] = slice
            .try_into()
            .map_err(|_| ProtoError::InvalidFieldLength {
                field: "client id",
                expected: ID_SIZE,
                actual: slice.len(),
            })?;
        Ok(Self(bytes))
    }

    /// Parse a hex encoded id (with or without "0x" prefix).
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid hex or not 16 bytes long.
    pub fn from_hex(input: &str) -> Result<Self, ProtoError> {
        let input = input.trim();
        let input = input.strip_prefix("0x").unwrap_or(input);
        let bytes = hex::decode(input)?;
        Self::from_slice(&bytes)
    }

    /// Lowercase hex encoding of the id.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; ID_SIZE] {
        &self.0
    }

    /// Whether the id has not been assigned yet.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.0 == [0u8; ID_SIZE]
    }
}

impl fmt::Debug for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClientId({})", self.to_hex())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A 255-byte NUL padded text slot holding a client name or a file path.
#[derive(Clone, PartialEq, Eq)]
pub struct NameField([u8; NAME_SIZE]);

impl NameField {
    /// Longest accepted value; one byte is kept for the terminating NUL.
    pub const MAX_LEN: usize = NAME_SIZE - 1;

    /// Build a field from text.
    ///
    /// # Errors
    ///
    /// Returns [`ProtoError::NameTooLong`] if the text exceeds
    /// [`Self::MAX_LEN`] bytes and [`ProtoError::NameContainsNul`] if it holds
    /// a NUL byte.
    pub fn new(value: &str) -> Result<Self, ProtoError> {
        let bytes = value.as_bytes();
        if bytes.len() > Self::MAX_LEN {
            return Err(ProtoError::NameTooLong {
                len: bytes.len(),
                max: Self::MAX_LEN,
            });
        }
        if bytes.contains(&0) {
            return Err(ProtoError::NameContainsNul);
        }
        let mut field = [0u8; NAME_SIZE];
        field[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(field))
    }

    /// Read a field from the wire. Bytes after the first NUL are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ProtoError::TooShort`] if fewer than 255 bytes are given.
    pub fn decode(buf: &[u8]) -> Result<Self, ProtoError> {
        if buf.len() < NAME_SIZE {
            return Err(ProtoError::TooShort {
                expected: NAME_SIZE,
                actual: buf.len(),
            });
        }
        let mut field = [0u8; NAME_SIZE];
        field.copy_from_slice(&buf[..NAME_SIZE]);
        Ok(Self(field))
    }

    /// The raw 255-byte slot.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; NAME_SIZE] {
        &self.0
    }

    /// Text up to the first NUL, lossily decoded.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(NAME_SIZE);
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }
}

impl Default for NameField {
    fn default() -> Self {
        Self([0u8; NAME_SIZE])
    }
}

impl fmt::Debug for NameField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NameField({:?})", self.to_string_lossy())
    }
}

/// The client's public key in its 160-byte wire form.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKeyField([u8; PUBLIC_KEY_SIZE]);

impl PublicKeyField {
    /// Create from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from a slice of exactly 160 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ProtoError::InvalidFieldLength`] on any other length.
    pub fn from_slice(slice: &[u8]) -> Result<Self, ProtoError> {
        let bytes: [u8; PUBLIC_KEY_SIZE] = slice
            .try_into()
            .map_err(|_| ProtoError::InvalidFieldLength {
                field: "public key",
                expected: PUBLIC_KEY_SIZE,
                actual: slice.len(),
            })?;
        Ok(Self(bytes))
    }

    /// Raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for PublicKeyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKeyField({}..)", hex::encode(&self.0[..8]))
    }
}
