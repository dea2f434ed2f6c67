//! Transport error types.

use courier_proto::ProtoError;
use std::io;
use thiserror::Error;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// `connect` called before `configure`
    #[error("Transport has no target configured")]
    NotConfigured,

    /// Target could not be resolved to any socket address
    #[error("Failed to resolve {target}: {reason}")]
    Resolve {
        /// `address:port` as configured
        target: String,
        /// Resolver message
        reason: String,
    },

    /// No resolved address accepted the connection
    #[error("Connection to {target} failed: {source}")]
    ConnectionFailed {
        /// `address:port` as configured
        target: String,
        /// Error from the last address tried
        #[source]
        source: io::Error,
    },

    /// Send or receive without an open connection
    #[error("Not connected")]
    NotConnected,

    /// A write transferred zero bytes
    #[error("Connection closed while sending ({sent} of {expected} bytes written)")]
    ZeroWrite {
        /// Bytes written before the failure
        sent: usize,
        /// Bytes requested
        expected: usize,
    },

    /// A read transferred zero bytes
    #[error("Connection closed while receiving ({received} of {expected} bytes read)")]
    ZeroRead {
        /// Bytes read before the failure
        received: usize,
        /// Bytes requested
        expected: usize,
    },

    /// Declared payload exceeds what the client will allocate
    #[error("Response payload too large: {declared} bytes (max {max})")]
    PayloadTooLarge {
        /// Length in the response header
        declared: usize,
        /// Accepted maximum
        max: usize,
    },

    /// Response header could not be parsed
    #[error("Framing error: {0}")]
    Frame(#[from] ProtoError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
