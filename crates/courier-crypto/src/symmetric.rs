//! AES-128 block encryption for file content.
//!
//! Each file block is encrypted as its own CBC message with an all-zero IV
//! and PKCS#7 padding, so a full 16-byte block produces 32 bytes of
//! ciphertext and any shorter block produces 16.

use crate::CryptoError;
use aes::Aes128;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use courier_proto::SYMMETRIC_KEY_SIZE;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// AES block size in bytes.
pub const AES_BLOCK_SIZE: usize = 16;

const ZERO_IV: [u8; AES_BLOCK_SIZE] = [0u8; AES_BLOCK_SIZE];

type Encryptor = cbc::Encryptor<Aes128>;
type Decryptor = cbc::Decryptor<Aes128>;

/// 128-bit session key delivered by the server. Zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; SYMMETRIC_KEY_SIZE]);

impl SymmetricKey {
    /// Create a key from raw bytes.
    #[must_use]
    pub fn new(bytes: [u8; SYMMETRIC_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from slice.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKeyLength` if slice length is not 16 bytes.
    pub fn from_slice(slice: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; SYMMETRIC_KEY_SIZE] =
            slice.try_into().map_err(|_| CryptoError::InvalidKeyLength {
                expected: SYMMETRIC_KEY_SIZE,
                actual: slice.len(),
            })?;
        Ok(Self(bytes))
    }

    /// Raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; SYMMETRIC_KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey(..)")
    }
}

/// Per-block AES-128-CBC cipher bound to one session key.
pub struct BlockCipher {
    key: SymmetricKey,
}

impl BlockCipher {
    /// Create a cipher for `key`.
    #[must_use]
    pub fn new(key: SymmetricKey) -> Self {
        Self { key }
    }

    /// Encrypt one block of plaintext (any length, normally at most 16 bytes).
    #[must_use]
    pub fn encrypt_block(&self, plaintext: &[u8]) -> Vec<u8> {
        Encryptor::new(self.key.as_bytes().into(), &ZERO_IV.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext)
    }

    /// Decrypt one ciphertext block produced by [`Self::encrypt_block`].
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::DecryptionFailed`] if the input is not a whole
    /// number of AES blocks or the padding is invalid.
    pub fn decrypt_block(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Decryptor::new(self.key.as_bytes().into(), &ZERO_IV.into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> BlockCipher {
        BlockCipher::new(SymmetricKey::new([0x42; SYMMETRIC_KEY_SIZE]))
    }

    #[test]
    fn test_full_block_gains_padding_block() {
        let ct = cipher().encrypt_block(&[7u8; AES_BLOCK_SIZE]);
        assert_eq!(ct.len(), 2 * AES_BLOCK_SIZE);
    }

    #[test]
    fn test_short_block_pads_to_one_block() {
        for len in 1..AES_BLOCK_SIZE {
            assert_eq!(cipher().encrypt_block(&vec![1u8; len]).len(), AES_BLOCK_SIZE);
        }
    }

    #[test]
    fn test_blocks_are_independent() {
        // Zero IV and a fresh chain per block: equal plaintext, equal ciphertext.
        let c = cipher();
        assert_eq!(c.encrypt_block(b"same block text!"), c.encrypt_block(b"same block text!"));
    }

    #[test]
    fn test_known_answer() {
        // FIPS-197 C.1; CBC with a zero IV reduces to ECB for the first block.
        let key: [u8; 16] = [
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
            0x0e, 0x0f,
        ];
        let plaintext: [u8; 16] = [
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd,
            0xee, 0xff,
        ];
        let expected: [u8; 16] = [
            0x69, 0xc4, 0xe0, 0xd8, 0x6a, 0x7b, 0x04, 0x30, 0xd8, 0xcd, 0xb7, 0x80, 0x70, 0xb4,
            0xc5, 0x5a,
        ];
        let ct = BlockCipher::new(SymmetricKey::new(key)).encrypt_block(&plaintext);
        assert_eq!(&ct[..16], &expected);
    }

    #[test]
    fn test_decrypt_rejects_partial_block() {
        assert!(cipher().decrypt_block(&[0u8; 15]).is_err());
    }

    #[test]
    fn test_key_from_slice_length() {
        assert!(SymmetricKey::from_slice(&[0u8; 16]).is_ok());
        assert!(matches!(
            SymmetricKey::from_slice(&[0u8; 32]),
            Err(CryptoError::InvalidKeyLength {
                expected: 16,
                actual: 32
            })
        ));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_block_roundtrip(
                key in prop::array::uniform16(any::<u8>()),
                block in prop::collection::vec(any::<u8>(), 0..=AES_BLOCK_SIZE),
            ) {
                let c = BlockCipher::new(SymmetricKey::new(key));
                prop_assert_eq!(c.decrypt_block(&c.encrypt_block(&block)).unwrap(), block);
            }
        }
    }
}
