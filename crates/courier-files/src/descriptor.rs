//! Transfer descriptor: who to talk to and what to send.
//!
//! ```text
//! 127.0.0.1:1234      server address and port
//! alice               username
//! docs/report.txt     file to send
//! ```

use crate::error::{FileError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Parsed transfer descriptor. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferDescriptor {
    /// Server host name or address
    pub address: String,
    /// Server port
    pub port: u16,
    /// Name to register or reconnect as
    pub username: String,
    /// File to send, exactly as written in the descriptor
    pub file_path: String,
}

impl TransferDescriptor {
    /// Load a descriptor file. The file to send is not touched; see
    /// [`Self::check_source`].
    ///
    /// # Errors
    ///
    /// Returns an error if the descriptor cannot be read or a line is missing
    /// or malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| FileError::io(path, e))?;
        let descriptor = Self::parse(path, &text)?;
        debug!(path = %path.display(), "loaded transfer descriptor");
        Ok(descriptor)
    }

    /// Parse descriptor text. `origin` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns an error for missing lines, a malformed endpoint or a bad port.
    pub fn parse(origin: &Path, text: &str) -> Result<Self> {
        let mut lines = text.lines().map(str::trim);
        let mut next = |line: usize, what: &'static str| {
            lines
                .next()
                .filter(|l| !l.is_empty())
                .ok_or_else(|| FileError::MissingLine {
                    path: origin.to_path_buf(),
                    line,
                    what,
                })
        };

        let endpoint = next(1, "address:port")?;
        let username = next(2, "username")?;
        let file_path = next(3, "file path")?;

        // IPv6 literals are written bracketed: `[::1]:1234`.
        let (address, port) = endpoint
            .rsplit_once(':')
            .map(|(address, port)| {
                let address = address
                    .strip_prefix('[')
                    .and_then(|a| a.strip_suffix(']'))
                    .unwrap_or(address);
                (address, port)
            })
            .filter(|(address, _)| !address.is_empty())
            .ok_or_else(|| FileError::InvalidEndpoint(endpoint.to_string()))?;
        let port = port
            .parse::<u16>()
            .map_err(|_| FileError::InvalidPort(port.to_string()))?;

        Ok(Self {
            address: address.to_string(),
            port,
            username: username.to_string(),
            file_path: file_path.to_string(),
        })
    }

    /// Fail unless the file to send exists and is a regular file.
    ///
    /// # Errors
    ///
    /// Returns [`FileError::SourceMissing`].
    pub fn check_source(&self) -> Result<()> {
        let path = PathBuf::from(&self.file_path);
        if path.is_file() {
            Ok(())
        } else {
            Err(FileError::SourceMissing(path))
        }
    }
}
