//! Server responses.
//!
//! The payload shape depends on the code actually received, so decoding
//! always starts from a [`ResponseHeader`] and never assumes the layout the
//! caller hoped for.
//!
//! | Code | Payload |
//! |------|---------|
//! | 2100 registration accepted | id(16) |
//! | 2101 registration denied | id(16), or empty |
//! | 2102 public key received | id(16) encrypted key(variable) |
//! | 2103 file received | id(16) content length(4) file name(255) checksum(4) |
//! | 2104 message received | empty |
//! | 2105 reconnect accepted | id(16) encrypted key(variable) |
//! | 2106 reconnect rejected | id(16) |
//! | 2107 general error | empty |

use crate::codes::ResponseCode;
use crate::error::ProtoError;
use crate::fields::{ClientId, NameField};
use crate::header::ResponseHeader;
use crate::{ID_SIZE, NAME_SIZE, RESPONSE_HEADER_SIZE};

/// Payload size of a registration-accepted response.
pub const REGISTRATION_PAYLOAD_SIZE: usize = ID_SIZE;

/// Payload size of a file-received response.
pub const FILE_RECEIVED_PAYLOAD_SIZE: usize = ID_SIZE + 4 + NAME_SIZE + 4;

/// A decoded server response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Registration succeeded.
    RegistrationAccepted {
        /// Newly assigned id
        client_id: ClientId,
    },
    /// Registration refused.
    RegistrationDenied {
        /// Echoed id, when the server sends one
        client_id: Option<ClientId>,
    },
    /// Public key stored; symmetric key delivered.
    PublicKeyReceived {
        /// Echoed id
        client_id: ClientId,
        /// Symmetric key encrypted with the client's public key
        encrypted_key: Vec<u8>,
    },
    /// File received and checksummed.
    FileReceived {
        /// Echoed id
        client_id: ClientId,
        /// Plaintext length the server recovered
        content_size: u32,
        /// Echoed file name
        file_name: NameField,
        /// CRC32 of the plaintext the server recovered
        checksum: u32,
    },
    /// Generic acknowledgment.
    MessageReceived,
    /// Reconnection accepted; fresh symmetric key delivered.
    ReconnectAccepted {
        /// Echoed id
        client_id: ClientId,
        /// Symmetric key encrypted with the stored public key
        encrypted_key: Vec<u8>,
    },
    /// Reconnection refused.
    ReconnectRejected {
        /// Echoed id
        client_id: ClientId,
    },
    /// Server-side failure.
    GeneralError,
}

impl Response {
    /// Response code for this variant.
    #[must_use]
    pub fn code(&self) -> ResponseCode {
        match self {
            Self::RegistrationAccepted { .. } => ResponseCode::RegistrationAccepted,
            Self::RegistrationDenied { .. } => ResponseCode::RegistrationDenied,
            Self::PublicKeyReceived { .. } => ResponseCode::PublicKeyReceived,
            Self::FileReceived { .. } => ResponseCode::FileReceived,
            Self::MessageReceived => ResponseCode::MessageReceived,
            Self::ReconnectAccepted { .. } => ResponseCode::ReconnectAccepted,
            Self::ReconnectRejected { .. } => ResponseCode::ReconnectRejected,
            Self::GeneralError => ResponseCode::GeneralError,
        }
    }

    /// Encode header and payload.
    ///
    /// # Errors
    ///
    /// Returns [`ProtoError::PayloadTooLarge`] if an encrypted key does not
    /// fit the 32-bit length field.
    pub fn encode(&self) -> Result<Vec<u8>, ProtoError> {
        let mut payload = Vec::new();
        match self {
            Self::RegistrationAccepted { client_id } | Self::ReconnectRejected { client_id } => {
                payload.extend_from_slice(client_id.as_bytes());
            }
            Self::PublicKeyReceived {
                client_id,
                encrypted_key,
            }
            | Self::ReconnectAccepted {
                client_id,
                encrypted_key,
            } => {
                payload.extend_from_slice(client_id.as_bytes());
                payload.extend_from_slice(encrypted_key);
            }
            Self::FileReceived {
                client_id,
                content_size,
                file_name,
                checksum,
            } => {
                payload.extend_from_slice(client_id.as_bytes());
                payload.extend_from_slice(&content_size.to_le_bytes());
                payload.extend_from_slice(file_name.as_bytes());
                payload.extend_from_slice(&checksum.to_le_bytes());
            }
            Self::RegistrationDenied { client_id } => {
                if let Some(client_id) = client_id {
                    payload.extend_from_slice(client_id.as_bytes());
                }
            }
            Self::MessageReceived | Self::GeneralError => {}
        }

        let payload_len =
            u32::try_from(payload.len()).map_err(|_| ProtoError::PayloadTooLarge(payload.len()))?;
        let mut buf = Vec::with_capacity(RESPONSE_HEADER_SIZE + payload.len());
        buf.extend_from_slice(&ResponseHeader::new(self.code(), payload_len).encode());
        buf.extend_from_slice(&payload);
        Ok(buf)
    }

    /// Decode the payload that follows `header`.
    ///
    /// `payload` may be longer than declared (fixed-size reads can pick up
    /// trailing padding); only the declared length is used. Fixed layouts must
    /// declare exactly their layout size.
    ///
    /// # Errors
    ///
    /// Returns a framing error when the declared length exceeds the bytes
    /// available or disagrees with the layout, and an unknown-code error for
    /// codes outside the catalog.
    pub fn decode(header: &ResponseHeader, payload: &[u8]) -> Result<Self, ProtoError> {
        let code = ResponseCode::try_from(header.code)?;
        let declared = header.payload_len();
        if declared > payload.len() {
            return Err(ProtoError::LengthMismatch {
                declared: header.payload_len,
                expected: payload.len(),
            });
        }
        let payload = &payload[..declared];

        let expect_len = |expected: usize| {
            if declared == expected {
                Ok(())
            } else {
                Err(ProtoError::LengthMismatch {
                    declared: header.payload_len,
                    expected,
                })
            }
        };
        let expect_at_least = |expected: usize| {
            if declared >= expected {
                Ok(())
            } else {
                Err(ProtoError::TooShort {
                    expected,
                    actual: declared,
                })
            }
        };

        match code {
            ResponseCode::RegistrationAccepted => {
                expect_len(REGISTRATION_PAYLOAD_SIZE)?;
                Ok(Self::RegistrationAccepted {
                    client_id: ClientId::from_slice(payload)?,
                })
            }
            ResponseCode::ReconnectRejected => {
                expect_len(ID_SIZE)?;
                Ok(Self::ReconnectRejected {
                    client_id: ClientId::from_slice(payload)?,
                })
            }
            ResponseCode::PublicKeyReceived => {
                expect_at_least(ID_SIZE)?;
                Ok(Self::PublicKeyReceived {
                    client_id: ClientId::from_slice(&payload[..ID_SIZE])?,
                    encrypted_key: payload[ID_SIZE..].to_vec(),
                })
            }
            ResponseCode::ReconnectAccepted => {
                expect_at_least(ID_SIZE)?;
                Ok(Self::ReconnectAccepted {
                    client_id: ClientId::from_slice(&payload[..ID_SIZE])?,
                    encrypted_key: payload[ID_SIZE..].to_vec(),
                })
            }
            ResponseCode::FileReceived => {
                expect_len(FILE_RECEIVED_PAYLOAD_SIZE)?;
                let size_at = ID_SIZE;
                let name_at = size_at + 4;
                let crc_at = name_at + NAME_SIZE;
                Ok(Self::FileReceived {
                    client_id: ClientId::from_slice(&payload[..ID_SIZE])?,
                    content_size: u32::from_le_bytes([
                        payload[size_at],
                        payload[size_at + 1],
                        payload[size_at + 2],
                        payload[size_at + 3],
                    ]),
                    file_name: NameField::decode(&payload[name_at..crc_at])?,
                    checksum: u32::from_le_bytes([
                        payload[crc_at],
                        payload[crc_at + 1],
                        payload[crc_at + 2],
                        payload[crc_at + 3],
                    ]),
                })
            }
            ResponseCode::RegistrationDenied => {
                let client_id = match declared {
                    0 => None,
                    _ => {
                        expect_len(ID_SIZE)?;
                        Some(ClientId::from_slice(payload)?)
                    }
                };
                Ok(Self::RegistrationDenied { client_id })
            }
            ResponseCode::MessageReceived => {
                expect_len(0)?;
                Ok(Self::MessageReceived)
            }
            ResponseCode::GeneralError => {
                expect_len(0)?;
                Ok(Self::GeneralError)
            }
        }
    }

    /// Decode a complete response (header followed by payload).
    ///
    /// # Errors
    ///
    /// Same as [`Self::decode`], plus `TooShort` when the header is incomplete.
    pub fn decode_frame(buf: &[u8]) -> Result<Self, ProtoError> {
        let header = ResponseHeader::decode(buf)?;
        Self::decode(&header, &buf[RESPONSE_HEADER_SIZE..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FILE_RECEIVED_RESPONSE_SIZE, REGISTRATION_RESPONSE_SIZE};

    #[test]
    fn test_fixed_response_sizes() {
        assert_eq!(REGISTRATION_RESPONSE_SIZE, 24);
        assert_eq!(FILE_RECEIVED_RESPONSE_SIZE, 8 + 16 + 4 + 255 + 4);
    }

    #[test]
    fn test_registration_accepted_roundtrip() {
        let id = ClientId::from_bytes([0x11; ID_SIZE]);
        let buf = Response::RegistrationAccepted { client_id: id }.encode().unwrap();
        assert_eq!(buf.len(), REGISTRATION_RESPONSE_SIZE);
        assert_eq!(
            Response::decode_frame(&buf).unwrap(),
            Response::RegistrationAccepted { client_id: id }
        );
    }

    #[test]
    fn test_file_received_layout() {
        let response = Response::FileReceived {
            client_id: ClientId::from_bytes([0x22; ID_SIZE]),
            content_size: 100,
            file_name: NameField::new("notes.txt").unwrap(),
            checksum: 0xDEAD_BEEF,
        };
        let buf = response.encode().unwrap();
        assert_eq!(buf.len(), FILE_RECEIVED_RESPONSE_SIZE);
        assert_eq!(&buf[buf.len() - 4..], &0xDEAD_BEEFu32.to_le_bytes());
        assert_eq!(Response::decode_frame(&buf).unwrap(), response);
    }

    #[test]
    fn test_variable_key_payload() {
        let response = Response::PublicKeyReceived {
            client_id: ClientId::from_bytes([0x33; ID_SIZE]),
            encrypted_key: vec![0x44; 128],
        };
        let buf = response.encode().unwrap();
        let header = ResponseHeader::decode(&buf).unwrap();
        assert_eq!(header.payload_len(), ID_SIZE + 128);
        assert_eq!(Response::decode_frame(&buf).unwrap(), response);
    }

    #[test]
    fn test_decode_ignores_trailing_padding() {
        let mut buf = Response::MessageReceived.encode().unwrap();
        buf.resize(1024, 0);
        assert_eq!(Response::decode_frame(&buf).unwrap(), Response::MessageReceived);
    }

    #[test]
    fn test_decode_rejects_declared_length_beyond_buffer() {
        let header = ResponseHeader::new(ResponseCode::PublicKeyReceived, 200);
        let mut buf = header.encode().to_vec();
        buf.extend_from_slice(&[0u8; 50]);
        assert!(matches!(
            Response::decode_frame(&buf),
            Err(ProtoError::LengthMismatch {
                declared: 200,
                expected: 50
            })
        ));
    }

    #[test]
    fn test_decode_rejects_wrong_fixed_length() {
        let header = ResponseHeader::new(ResponseCode::FileReceived, 279 + 1);
        let mut buf = header.encode().to_vec();
        buf.resize(RESPONSE_HEADER_SIZE + 280, 0);
        assert!(matches!(
            Response::decode_frame(&buf),
            Err(ProtoError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_decode_follows_received_code() {
        // Caller asked for a registration but the server refused: the payload
        // is read as a denial, not as an id.
        let buf = Response::RegistrationDenied { client_id: None }
            .encode()
            .unwrap();
        let mut padded = buf.clone();
        padded.resize(REGISTRATION_RESPONSE_SIZE, 0xFF);
        assert_eq!(
            Response::decode_frame(&padded).unwrap(),
            Response::RegistrationDenied { client_id: None }
        );
    }

    #[test]
    fn test_registration_denied_with_id() {
        let denied = Response::RegistrationDenied {
            client_id: Some(ClientId::from_bytes([0x55; ID_SIZE])),
        };
        let buf = denied.encode().unwrap();
        assert_eq!(buf.len(), REGISTRATION_RESPONSE_SIZE);
        assert_eq!(Response::decode_frame(&buf).unwrap(), denied);

        let header = ResponseHeader::new(ResponseCode::RegistrationDenied, 8);
        let mut odd = header.encode().to_vec();
        odd.resize(RESPONSE_HEADER_SIZE + 8, 0);
        assert!(matches!(
            Response::decode_frame(&odd),
            Err(ProtoError::LengthMismatch {
                declared: 8,
                expected: 16
            })
        ));
    }

    #[test]
    fn test_decode_unknown_code() {
        let header = ResponseHeader {
            version: 3,
            code: 9999,
            payload_len: 0,
        };
        assert!(matches!(
            Response::decode(&header, &[]),
            Err(ProtoError::UnknownResponseCode(9999))
        ));
    }
}
