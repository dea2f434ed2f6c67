//! RSA key pair used to receive the session's symmetric key.
//!
//! The client generates a 1024-bit key with public exponent 17, sends the
//! public half in its 160-byte DER form and receives the symmetric key
//! encrypted under RSA-OAEP with SHA-1.

use crate::{CryptoError, RSA_KEY_BITS, RSA_PUBLIC_EXPONENT};
use courier_proto::{PUBLIC_KEY_SIZE, PublicKeyField};
use rand_core::OsRng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::{BigUint, Oaep, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use zeroize::Zeroizing;

/// RSA private key. Zeroized on drop.
#[derive(Clone)]
pub struct PrivateKey {
    inner: RsaPrivateKey,
}

impl PrivateKey {
    /// Generate a fresh key pair from the OS CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyGeneration`] if prime generation fails.
    pub fn generate() -> Result<Self, CryptoError> {
        let exponent = BigUint::from(RSA_PUBLIC_EXPONENT);
        let inner = RsaPrivateKey::new_with_exp(&mut OsRng, RSA_KEY_BITS, &exponent)
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Parse a PKCS#8 DER private key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] if the bytes are not a valid key.
    pub fn from_der(der: &[u8]) -> Result<Self, CryptoError> {
        let inner = RsaPrivateKey::from_pkcs8_der(der)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { inner })
    }

    /// PKCS#8 DER encoding of the private key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Encoding`] if serialization fails.
    pub fn to_der(&self) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let doc = self
            .inner
            .to_pkcs8_der()
            .map_err(|e| CryptoError::Encoding(e.to_string()))?;
        Ok(Zeroizing::new(doc.as_bytes().to_vec()))
    }

    /// The matching public key.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            inner: self.inner.to_public_key(),
        }
    }

    /// Public key in its 160-byte wire form.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::PublicKeySize`] if the DER encoding is not
    /// exactly 160 bytes.
    pub fn public_key_field(&self) -> Result<PublicKeyField, CryptoError> {
        self.public_key().to_field()
    }

    /// Decrypt an RSA-OAEP (SHA-1) ciphertext.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::DecryptionFailed`] if the ciphertext is
    /// malformed or was encrypted for another key.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        self.inner
            .decrypt(Oaep::new::<Sha1>(), ciphertext)
            .map(Zeroizing::new)
            .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

/// RSA public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    inner: RsaPublicKey,
}

impl PublicKey {
    /// Parse an X.509 `SubjectPublicKeyInfo` DER public key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] on malformed input.
    pub fn from_der(der: &[u8]) -> Result<Self, CryptoError> {
        let inner = RsaPublicKey::from_public_key_der(der)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { inner })
    }

    /// X.509 `SubjectPublicKeyInfo` DER encoding.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Encoding`] if serialization fails.
    pub fn to_der(&self) -> Result<Vec<u8>, CryptoError> {
        let doc = self
            .inner
            .to_public_key_der()
            .map_err(|e| CryptoError::Encoding(e.to_string()))?;
        Ok(doc.as_bytes().to_vec())
    }

    /// The key in its 160-byte wire field.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::PublicKeySize`] when the encoding has another
    /// length (a different modulus size or exponent).
    pub fn to_field(&self) -> Result<PublicKeyField, CryptoError> {
        let der = self.to_der()?;
        PublicKeyField::from_slice(&der).map_err(|_| CryptoError::PublicKeySize {
            expected: PUBLIC_KEY_SIZE,
            actual: der.len(),
        })
    }

    /// Encrypt `plaintext` with RSA-OAEP (SHA-1).
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EncryptionFailed`] if the message is too long
    /// for the modulus.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.inner
            .encrypt(&mut OsRng, Oaep::new::<Sha1>(), plaintext)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
    }
}
