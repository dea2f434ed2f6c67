//! Client configuration.

use std::path::PathBuf;

/// Default transfer descriptor location.
pub const DEFAULT_TRANSFER_PATH: &str = "transfer.info";

/// Default identity record location.
pub const DEFAULT_IDENTITY_PATH: &str = "me.info";

/// Where the client finds its inputs and keeps its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Transfer descriptor (server, username, file)
    pub transfer_path: PathBuf,
    /// Identity record, read when present and written on registration
    pub identity_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            transfer_path: PathBuf::from(DEFAULT_TRANSFER_PATH),
            identity_path: PathBuf::from(DEFAULT_IDENTITY_PATH),
        }
    }
}

impl ClientConfig {
    /// Configuration with both files under `dir`.
    #[must_use]
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            transfer_path: dir.join(DEFAULT_TRANSFER_PATH),
            identity_path: dir.join(DEFAULT_IDENTITY_PATH),
        }
    }
}
