//! Encrypted block stream for the file being sent.
//!
//! The file is read in 16-byte blocks. A short final block gets one
//! [`MARKER_BYTE`] appended before encryption; a file whose length is a
//! multiple of the block size gets none. Every block is encrypted on its own
//! and the ciphertexts are concatenated.
//!
//! The plaintext actually handed to the cipher is kept alongside, so the
//! client can compute the checksum the server should report.

use crate::error::{FileError, Result};
use courier_crypto::{BlockCipher, checksum};
use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read};
use std::path::Path;
use tracing::debug;

/// Plaintext block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Sentinel appended to a short final block.
pub const MARKER_BYTE: u8 = 0x05;

/// Result of encrypting a whole file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedFile {
    /// Concatenated ciphertext of every block
    pub ciphertext: Vec<u8>,
    /// Every plaintext byte encrypted, marker included
    pub plaintext: Vec<u8>,
    /// Whether the last block carries the marker
    pub marker_added: bool,
    /// Number of blocks encrypted
    pub blocks: usize,
}

impl EncryptedFile {
    /// The original file content: the plaintext without the marker.
    #[must_use]
    pub fn checksum_input(&self) -> &[u8] {
        if self.marker_added {
            &self.plaintext[..self.plaintext.len() - 1]
        } else {
            &self.plaintext
        }
    }

    /// CRC32 the server is expected to report.
    #[must_use]
    pub fn checksum(&self) -> u32 {
        checksum(self.checksum_input())
    }

    /// Length of the original file content.
    #[must_use]
    pub fn content_len(&self) -> usize {
        self.checksum_input().len()
    }
}

/// Fill `buf` from `reader`, stopping early only at end of input.
fn read_block<R: Read>(reader: &mut R, buf: &mut [u8; BLOCK_SIZE]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < BLOCK_SIZE {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Encrypt everything `reader` yields.
///
/// # Errors
///
/// Returns any read error.
pub fn encrypt_reader<R: Read>(mut reader: R, cipher: &BlockCipher) -> io::Result<EncryptedFile> {
    let mut out = EncryptedFile {
        ciphertext: Vec::new(),
        plaintext: Vec::new(),
        marker_added: false,
        blocks: 0,
    };
    let mut block = [0u8; BLOCK_SIZE];

    loop {
        let n = read_block(&mut reader, &mut block)?;
        if n == 0 {
            break;
        }

        let mut plain = block[..n].to_vec();
        if n < BLOCK_SIZE {
            plain.push(MARKER_BYTE);
            out.marker_added = true;
        }
        out.ciphertext.extend_from_slice(&cipher.encrypt_block(&plain));
        out.plaintext.extend_from_slice(&plain);
        out.blocks += 1;

        if n < BLOCK_SIZE {
            break;
        }
    }

    Ok(out)
}

/// Encrypt the file at `path`.
///
/// # Errors
///
/// Returns [`FileError::Io`] if the file cannot be opened or read.
pub fn encrypt_file(path: &Path, cipher: &BlockCipher) -> Result<EncryptedFile> {
    let file = File::open(path).map_err(|e| FileError::io(path, e))?;
    let encrypted =
        encrypt_reader(BufReader::new(file), cipher).map_err(|e| FileError::io(path, e))?;
    debug!(
        path = %path.display(),
        blocks = encrypted.blocks,
        content = encrypted.content_len(),
        ciphertext = encrypted.ciphertext.len(),
        marker = encrypted.marker_added,
        "encrypted file"
    );
    Ok(encrypted)
}
