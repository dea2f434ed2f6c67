//! Request and response operation codes.

use crate::error::ProtoError;

/// Operation codes sent by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum RequestCode {
    /// Register a new client name
    Registration = 1100,
    /// Submit the client's public key
    PublicKey = 1101,
    /// Reconnect with a previously issued id
    Reconnect = 1102,
    /// Send the encrypted file
    FileSend = 1103,
    /// Checksum matched, transfer confirmed
    CrcGood = 1104,
    /// Checksum mismatch, the file will be sent again
    CrcRetry = 1105,
    /// Checksum mismatch, giving up
    CrcAbort = 1106,
}

/// Operation codes sent by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ResponseCode {
    /// Registration succeeded, payload carries the new id
    RegistrationAccepted = 2100,
    /// Registration refused (for example, name taken)
    RegistrationDenied = 2101,
    /// Public key stored, payload carries the encrypted symmetric key
    PublicKeyReceived = 2102,
    /// File received, payload carries the server's checksum
    FileReceived = 2103,
    /// Generic acknowledgment
    MessageReceived = 2104,
    /// Reconnection accepted, payload carries the encrypted symmetric key
    ReconnectAccepted = 2105,
    /// Reconnection refused, the client has to register again
    ReconnectRejected = 2106,
    /// The server could not process the request
    GeneralError = 2107,
}

impl RequestCode {
    /// All request codes in numeric order.
    pub const ALL: [RequestCode; 7] = [
        RequestCode::Registration,
        RequestCode::PublicKey,
        RequestCode::Reconnect,
        RequestCode::FileSend,
        RequestCode::CrcGood,
        RequestCode::CrcRetry,
        RequestCode::CrcAbort,
    ];
}

impl ResponseCode {
    /// All response codes in numeric order.
    pub const ALL: [ResponseCode; 8] = [
        ResponseCode::RegistrationAccepted,
        ResponseCode::RegistrationDenied,
        ResponseCode::PublicKeyReceived,
        ResponseCode::FileReceived,
        ResponseCode::MessageReceived,
        ResponseCode::ReconnectAccepted,
        ResponseCode::ReconnectRejected,
        ResponseCode::GeneralError,
    ];
}

impl TryFrom<u16> for RequestCode {
    type Error = ProtoError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|code| *code as u16 == value)
            .ok_or(ProtoError::UnknownRequestCode(value))
    }
}

impl TryFrom<u16> for ResponseCode {
    type Error = ProtoError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|code| *code as u16 == value)
            .ok_or(ProtoError::UnknownResponseCode(value))
    }
}

impl From<RequestCode> for u16 {
    fn from(code: RequestCode) -> u16 {
        code as u16
    }
}

impl From<ResponseCode> for u16 {
    fn from(code: ResponseCode) -> u16 {
        code as u16
    }
}
