//! Error types for local file handling.

use courier_proto::ProtoError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors reading or writing the client's local files.
#[derive(Debug, Error)]
pub enum FileError {
    /// File could not be read or written
    #[error("{path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// A required line is absent
    #[error("{path}: missing line {line} ({what})")]
    MissingLine {
        /// File involved
        path: PathBuf,
        /// One-based line number
        line: usize,
        /// What the line should hold
        what: &'static str,
    },

    /// Server endpoint is not `address:port`
    #[error("Invalid server endpoint '{0}': expected address:port")]
    InvalidEndpoint(String),

    /// Port is not a number in 0..=65535
    #[error("Invalid port '{0}'")]
    InvalidPort(String),

    /// The file named for transfer does not exist
    #[error("File to send not found: {0}")]
    SourceMissing(PathBuf),

    /// Identity id line is not a valid hex id
    #[error("Invalid client id in identity record: {0}")]
    InvalidId(#[source] ProtoError),

    /// Identity key lines are not valid base64
    #[error("Invalid private key encoding in identity record: {0}")]
    InvalidKeyEncoding(#[from] base64::DecodeError),
}

impl FileError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for file operations.
pub type Result<T> = std::result::Result<T, FileError>;
