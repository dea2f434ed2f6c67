//! Persisted identity record.
//!
//! ```text
//! alice                                   name
//! 000102030405060708090a0b0c0d0e0f        client id (hex)
//! MIICdgIBADANBgkqhkiG9w0BAQEFAASCAmAw... private key (base64, PKCS#8 DER,
//! ...                                     wrapped over any number of lines)
//! ```

use crate::error::{FileError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use courier_proto::ClientId;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::debug;
use zeroize::Zeroizing;

/// Width of the wrapped base64 key lines.
const KEY_LINE_WIDTH: usize = 64;

/// Name, id and private key of a registered client.
#[derive(Clone)]
pub struct IdentityRecord {
    /// Registered name
    pub name: String,
    /// Server-assigned id
    pub id: ClientId,
    /// PKCS#8 DER private key
    pub private_key_der: Zeroizing<Vec<u8>>,
}

impl std::fmt::Debug for IdentityRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityRecord")
            .field("name", &self.name)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl IdentityRecord {
    /// Whether an identity record exists at `path`.
    #[must_use]
    pub fn exists(path: &Path) -> bool {
        path.is_file()
    }

    /// Read a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, a line is missing, the id
    /// is not 32 hex digits or the key lines are not valid base64.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| FileError::io(path, e))?;
        let mut lines = text.lines().map(str::trim);
        let missing = |line, what| FileError::MissingLine {
            path: path.to_path_buf(),
            line,
            what,
        };

        let name = lines
            .next()
            .filter(|l| !l.is_empty())
            .ok_or_else(|| missing(1, "name"))?
            .to_string();
        let id_line = lines.next().ok_or_else(|| missing(2, "client id"))?;
        let id = ClientId::from_hex(id_line).map_err(FileError::InvalidId)?;

        let key_text = Zeroizing::new(lines.collect::<String>());
        if key_text.is_empty() {
            return Err(missing(3, "private key"));
        }
        let private_key_der = Zeroizing::new(STANDARD.decode(key_text.as_bytes())?);

        debug!(path = %path.display(), %id, "loaded identity record");
        Ok(Self {
            name,
            id,
            private_key_der,
        })
    }

    /// Write the record, replacing any existing file. On Unix the file is
    /// created readable by the owner only.
    ///
    /// # Errors
    ///
    /// Returns [`FileError::Io`] if the file cannot be written.
    pub fn store(&self, path: &Path) -> Result<()> {
        let mut text = Zeroizing::new(String::new());
        text.push_str(&self.name);
        text.push('\n');
        text.push_str(&self.id.to_hex());
        text.push('\n');

        let encoded = Zeroizing::new(STANDARD.encode(self.private_key_der.as_slice()));
        for line in encoded.as_bytes().chunks(KEY_LINE_WIDTH) {
            // base64 output is ASCII
            text.push_str(&String::from_utf8_lossy(line));
            text.push('\n');
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(path).map_err(|e| FileError::io(path, e))?;
        file.write_all(text.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| FileError::io(path, e))?;

        debug!(path = %path.display(), id = %self.id, "stored identity record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> IdentityRecord {
        IdentityRecord {
            name: "alice".to_string(),
            id: ClientId::from_bytes([0xA5; 16]),
            private_key_der: Zeroizing::new((0..=255u8).cycle().take(300).collect()),
        }
    }

    #[test]
    fn test_store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.info");
        assert!(!IdentityRecord::exists(&path));

        let original = record();
        original.store(&path).unwrap();
        assert!(IdentityRecord::exists(&path));

        let loaded = IdentityRecord::load(&path).unwrap();
        assert_eq!(loaded.name, original.name);
        assert_eq!(loaded.id, original.id);
        assert_eq!(*loaded.private_key_der, *original.private_key_der);
    }

    #[test]
    fn test_stored_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.info");
        record().store(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "alice");
        assert_eq!(lines[1], "a5".repeat(16));
        // 300 bytes -> 400 base64 characters -> 7 lines of at most 64
        assert_eq!(lines.len(), 2 + 7);
        assert!(lines[2..].iter().all(|l| l.len() <= KEY_LINE_WIDTH));
    }

    #[cfg(unix)]
    #[test]
    fn test_stored_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.info");
        record().store(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_load_unwrapped_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.info");
        fs::write(
            &path,
            "bob\r\n000102030405060708090a0b0c0d0e0f\r\nAAEC\r\nAwQF\r\n",
        )
        .unwrap();
        let loaded = IdentityRecord::load(&path).unwrap();
        assert_eq!(loaded.name, "bob");
        assert_eq!(loaded.id.as_bytes()[1], 1);
        assert_eq!(*loaded.private_key_der, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_load_rejects_bad_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.info");
        fs::write(&path, "bob\nnot-hex\nAAEC\n").unwrap();
        assert!(matches!(
            IdentityRecord::load(&path),
            Err(FileError::InvalidId(_))
        ));
    }

    #[test]
    fn test_load_rejects_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.info");
        fs::write(&path, "bob\n000102030405060708090a0b0c0d0e0f\n").unwrap();
        assert!(matches!(
            IdentityRecord::load(&path),
            Err(FileError::MissingLine { line: 3, .. })
        ));
    }

    #[test]
    fn test_load_rejects_bad_base64() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.info");
        fs::write(&path, "bob\n000102030405060708090a0b0c0d0e0f\n!!!!\n").unwrap();
        assert!(matches!(
            IdentityRecord::load(&path),
            Err(FileError::InvalidKeyEncoding(_))
        ));
    }
}
