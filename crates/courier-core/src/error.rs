//! Error types for the client session

use courier_crypto::CryptoError;
use courier_files::FileError;
use courier_proto::ProtoError;
use courier_transport::TransportError;
use thiserror::Error;

/// Errors that end a session
#[derive(Debug, Error)]
pub enum SessionError {
    /// Descriptor, identity record or source file problem
    #[error("Input error: {0}")]
    Input(#[from] FileError),

    /// Connection, read or write failure
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Malformed message
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtoError),

    /// Key generation, export or decryption failed
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Server answered with a code the current step cannot accept
    #[error("{step} rejected by server (response code {code})")]
    Rejected {
        /// Step that was rejected
        step: &'static str,
        /// Code received
        code: u16,
    },

    /// File transfer started without a session key
    #[error("No symmetric key established")]
    NoSymmetricKey,
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
