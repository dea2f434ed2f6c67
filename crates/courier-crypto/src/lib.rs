//! # Courier Crypto
//!
//! Cryptographic primitives for the Courier client:
//!
//! - **Key exchange**: RSA-1024 (public exponent 17) with OAEP/SHA-1. The
//!   public key travels as a 160-byte X.509 `SubjectPublicKeyInfo` DER blob.
//! - **File encryption**: AES-128-CBC with a zero IV and PKCS#7 padding,
//!   applied to each 16-byte file block independently.
//! - **Integrity**: CRC32 (IEEE) over the plaintext.
//!
//! Secret material is zeroized on drop.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod asymmetric;
pub mod checksum;
pub mod symmetric;

pub use asymmetric::{PrivateKey, PublicKey};
pub use checksum::checksum;
pub use symmetric::{BlockCipher, SymmetricKey};

use thiserror::Error;

/// RSA modulus size in bits.
pub const RSA_KEY_BITS: usize = 1024;

/// RSA public exponent.
pub const RSA_PUBLIC_EXPONENT: u32 = 17;

/// Cryptographic errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key pair generation failed
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// Key could not be serialized
    #[error("Key encoding failed: {0}")]
    Encoding(String),

    /// Key bytes could not be parsed
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Encoded public key does not fit the wire field
    #[error("Public key encodes to {actual} bytes, expected {expected}")]
    PublicKeySize {
        /// Wire field size
        expected: usize,
        /// DER length produced
        actual: usize,
    },

    /// Key material had the wrong length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected number of bytes
        expected: usize,
        /// Actual number of bytes
        actual: usize,
    },

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),
}
