//! Client requests.
//!
//! | Code | Payload |
//! |------|---------|
//! | 1100 registration | name(255) |
//! | 1101 public key | name(255) public key(160) |
//! | 1102 reconnect | name(255) |
//! | 1103 file send | content length(4) file name(255) ciphertext(content length) |
//! | 1104/1105/1106 CRC | file name(255) |

use crate::codes::RequestCode;
use crate::error::ProtoError;
use crate::fields::{ClientId, NameField, PublicKeyField};
use crate::header::RequestHeader;
use crate::{NAME_SIZE, PUBLIC_KEY_SIZE, REQUEST_HEADER_SIZE};

/// Size of the fixed part of a file-send payload (content length + file name).
pub const FILE_SEND_FIXED_SIZE: usize = 4 + NAME_SIZE;

/// Code-specific request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Register `name` with the server.
    Registration {
        /// Chosen display name
        name: NameField,
    },
    /// Submit the client's public key.
    PublicKey {
        /// Registered name
        name: NameField,
        /// Public key in wire form
        public_key: PublicKeyField,
    },
    /// Reconnect using the id in the header.
    Reconnect {
        /// Registered name
        name: NameField,
    },
    /// Send the encrypted file.
    FileSend {
        /// File path as given by the user
        file_name: NameField,
        /// Concatenated encrypted blocks
        content: Vec<u8>,
    },
    /// Checksum matched.
    CrcGood {
        /// File path
        file_name: NameField,
    },
    /// Checksum mismatched, the file follows again.
    CrcRetry {
        /// File path
        file_name: NameField,
    },
    /// Checksum mismatched for the last time.
    CrcAbort {
        /// File path
        file_name: NameField,
    },
}

impl RequestBody {
    /// Operation code for this body.
    #[must_use]
    pub fn code(&self) -> RequestCode {
        match self {
            Self::Registration { .. } => RequestCode::Registration,
            Self::PublicKey { .. } => RequestCode::PublicKey,
            Self::Reconnect { .. } => RequestCode::Reconnect,
            Self::FileSend { .. } => RequestCode::FileSend,
            Self::CrcGood { .. } => RequestCode::CrcGood,
            Self::CrcRetry { .. } => RequestCode::CrcRetry,
            Self::CrcAbort { .. } => RequestCode::CrcAbort,
        }
    }

    /// Number of payload bytes this body encodes to.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        match self {
            Self::PublicKey { .. } => NAME_SIZE + PUBLIC_KEY_SIZE,
            Self::FileSend { content, .. } => FILE_SEND_FIXED_SIZE + content.len(),
            _ => NAME_SIZE,
        }
    }

    fn encode_into(&self, buf: &mut Vec<u8>) -> Result<(), ProtoError> {
        match self {
            Self::Registration { name } | Self::Reconnect { name } => {
                buf.extend_from_slice(name.as_bytes());
            }
            Self::PublicKey { name, public_key } => {
                buf.extend_from_slice(name.as_bytes());
                buf.extend_from_slice(public_key.as_bytes());
            }
            Self::FileSend { file_name, content } => {
                let content_len = u32::try_from(content.len())
                    .map_err(|_| ProtoError::PayloadTooLarge(content.len()))?;
                buf.extend_from_slice(&content_len.to_le_bytes());
                buf.extend_from_slice(file_name.as_bytes());
                buf.extend_from_slice(content);
            }
            Self::CrcGood { file_name }
            | Self::CrcRetry { file_name }
            | Self::CrcAbort { file_name } => {
                buf.extend_from_slice(file_name.as_bytes());
            }
        }
        Ok(())
    }

    fn decode(code: RequestCode, payload: &[u8]) -> Result<Self, ProtoError> {
        let expect_len = |expected: usize| {
            if payload.len() == expected {
                Ok(())
            } else {
                Err(ProtoError::LengthMismatch {
                    declared: payload.len() as u32,
                    expected,
                })
            }
        };

        match code {
            RequestCode::Registration => {
                expect_len(NAME_SIZE)?;
                Ok(Self::Registration {
                    name: NameField::decode(payload)?,
                })
            }
            RequestCode::Reconnect => {
                expect_len(NAME_SIZE)?;
                Ok(Self::Reconnect {
                    name: NameField::decode(payload)?,
                })
            }
            RequestCode::PublicKey => {
                expect_len(NAME_SIZE + PUBLIC_KEY_SIZE)?;
                Ok(Self::PublicKey {
                    name: NameField::decode(payload)?,
                    public_key: PublicKeyField::from_slice(&payload[NAME_SIZE..])?,
                })
            }
            RequestCode::FileSend => {
                if payload.len() < FILE_SEND_FIXED_SIZE {
                    return Err(ProtoError::TooShort {
                        expected: FILE_SEND_FIXED_SIZE,
                        actual: payload.len(),
                    });
                }
                let content_len =
                    u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]) as usize;
                expect_len(FILE_SEND_FIXED_SIZE + content_len)?;
                Ok(Self::FileSend {
                    file_name: NameField::decode(&payload[4..])?,
                    content: payload[FILE_SEND_FIXED_SIZE..].to_vec(),
                })
            }
            RequestCode::CrcGood | RequestCode::CrcRetry | RequestCode::CrcAbort => {
                expect_len(NAME_SIZE)?;
                let file_name = NameField::decode(payload)?;
                Ok(match code {
                    RequestCode::CrcGood => Self::CrcGood { file_name },
                    RequestCode::CrcRetry => Self::CrcRetry { file_name },
                    _ => Self::CrcAbort { file_name },
                })
            }
        }
    }
}

/// A complete request: sender id plus body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Sender id (unset before registration).
    pub client_id: ClientId,
    /// Code-specific payload.
    pub body: RequestBody,
}

impl Request {
    /// Create a request.
    #[must_use]
    pub fn new(client_id: ClientId, body: RequestBody) -> Self {
        Self { client_id, body }
    }

    /// Header describing this request.
    ///
    /// # Errors
    ///
    /// Returns [`ProtoError::PayloadTooLarge`] if the payload does not fit the
    /// 32-bit length field.
    pub fn header(&self) -> Result<RequestHeader, ProtoError> {
        let len = self.body.payload_len();
        let payload_len = u32::try_from(len).map_err(|_| ProtoError::PayloadTooLarge(len))?;
        Ok(RequestHeader::new(self.client_id, self.body.code(), payload_len))
    }

    /// Encode header and payload into one contiguous buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ProtoError::PayloadTooLarge`] for payloads over 4 GiB.
    pub fn encode(&self) -> Result<Vec<u8>, ProtoError> {
        let header = self.header()?;
        let mut buf = Vec::with_capacity(REQUEST_HEADER_SIZE + header.payload_len as usize);
        buf.extend_from_slice(&header.encode());
        self.body.encode_into(&mut buf)?;
        Ok(buf)
    }

    /// Decode a request, checking that the declared payload length matches
    /// both the layout for its code and the bytes present.
    ///
    /// # Errors
    ///
    /// Returns a framing error on any length disagreement, or an unknown-code
    /// error for codes outside the catalog.
    pub fn decode(buf: &[u8]) -> Result<Self, ProtoError> {
        let header = RequestHeader::decode(buf)?;
        let payload = &buf[REQUEST_HEADER_SIZE..];
        if payload.len() != header.payload_len as usize {
            return Err(ProtoError::LengthMismatch {
                declared: header.payload_len,
                expected: payload.len(),
            });
        }
        Ok(Self {
            client_id: header.client_id,
            body: RequestBody::decode(header.code, payload)?,
        })
    }
}
