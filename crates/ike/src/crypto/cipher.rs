//! Cipher implementations for the IKEv2 Encrypted payload
//!
//! Two families are used by SK payloads (RFC 7296 Section 3.14):
//!
//! - [`AeadAlgorithm`]: combined mode ciphers. The keying material carries a
//!   4-byte salt after the key; the 12-byte nonce is `salt || IV`
//!   (RFC 5282 for AES-GCM, RFC 7634 for ChaCha20-Poly1305).
//! - [`BlockCipherAlgorithm`]: AES-CBC, used together with a separate
//!   integrity algorithm.

use crate::{Error, Result};
use aes::{Aes128, Aes192, Aes256};
use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes128Gcm, Aes256Gcm, Nonce as AesGcmNonce,
};
use cbc::{Decryptor, Encryptor};
use chacha20poly1305::ChaCha20Poly1305;
use cipher::{block_padding::NoPadding, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use ring::rand::SecureRandom;

/// Length of the implicit salt appended to AEAD keys
pub const AEAD_SALT_LEN: usize = 4;

/// Length of the explicit IV carried in SK payloads for AEAD ciphers
pub const AEAD_IV_LEN: usize = 8;

/// AEAD cipher for SK payload encryption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AeadAlgorithm {
    /// AES-GCM with 16-byte ICV and 128-bit key
    AesGcm16_128,
    /// AES-GCM with 16-byte ICV and 256-bit key
    AesGcm16_256,
    /// ChaCha20-Poly1305
    ChaCha20Poly1305,
}

impl AeadAlgorithm {
    /// Cipher key length in bytes (excluding salt)
    pub fn key_len(self) -> usize {
        match self {
            AeadAlgorithm::AesGcm16_128 => 16,
            AeadAlgorithm::AesGcm16_256 => 32,
            AeadAlgorithm::ChaCha20Poly1305 => 32,
        }
    }

    /// Salt length in bytes
    pub fn salt_len(self) -> usize {
        AEAD_SALT_LEN
    }

    /// Length of SK_e keying material (key followed by salt)
    pub fn keying_material_len(self) -> usize {
        self.key_len() + self.salt_len()
    }

    /// Explicit IV length in bytes
    pub fn iv_len(self) -> usize {
        AEAD_IV_LEN
    }

    /// Authentication tag length in bytes
    pub fn tag_len(self) -> usize {
        16
    }

    /// Padding alignment in bytes
    pub fn block_size(self) -> usize {
        4
    }

    /// Draw a fresh explicit IV
    pub fn generate_iv(self, rng: &dyn SecureRandom) -> Result<Vec<u8>> {
        let mut iv = vec![0u8; self.iv_len()];
        rng.fill(&mut iv)
            .map_err(|_| Error::CryptoError("Failed to generate IV".into()))?;
        Ok(iv)
    }

    fn nonce(self, key_material: &[u8], iv: &[u8]) -> Result<[u8; 12]> {
        if key_material.len() != self.keying_material_len() {
            return Err(Error::InvalidKeyLength {
                expected: self.keying_material_len(),
                actual: key_material.len(),
            });
        }
        if iv.len() != self.iv_len() {
            return Err(Error::InvalidIvLength {
                expected: self.iv_len(),
                actual: iv.len(),
            });
        }

        let mut nonce = [0u8; 12];
        nonce[..AEAD_SALT_LEN].copy_from_slice(&key_material[self.key_len()..]);
        nonce[AEAD_SALT_LEN..].copy_from_slice(iv);
        Ok(nonce)
    }

    /// Encrypt data with AEAD cipher
    ///
    /// # Arguments
    ///
    /// * `key_material` - SK_e including trailing salt
    /// * `iv` - Explicit 8-byte IV
    /// * `plaintext` - Data to encrypt (already padded)
    /// * `aad` - Associated data (IKE header through the end of the SK/SKF header)
    ///
    /// # Returns
    ///
    /// Returns ciphertext with the authentication tag appended
    pub fn encrypt(
        self,
        key_material: &[u8],
        iv: &[u8],
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>> {
        let nonce = self.nonce(key_material, iv)?;
        let key = &key_material[..self.key_len()];
        let payload = Payload {
            msg: plaintext,
            aad,
        };

        match self {
            AeadAlgorithm::AesGcm16_128 => Aes128Gcm::new_from_slice(key)
                .map_err(|_| Error::CryptoError("Failed to create AES-GCM cipher".into()))?
                .encrypt(AesGcmNonce::from_slice(&nonce), payload)
                .map_err(|_| Error::CryptoError("AES-GCM encryption failed".into())),
            AeadAlgorithm::AesGcm16_256 => Aes256Gcm::new_from_slice(key)
                .map_err(|_| Error::CryptoError("Failed to create AES-GCM cipher".into()))?
                .encrypt(AesGcmNonce::from_slice(&nonce), payload)
                .map_err(|_| Error::CryptoError("AES-GCM encryption failed".into())),
            AeadAlgorithm::ChaCha20Poly1305 => ChaCha20Poly1305::new_from_slice(key)
                .map_err(|_| Error::CryptoError("Failed to create ChaCha20 cipher".into()))?
                .encrypt(chacha20poly1305::Nonce::from_slice(&nonce), payload)
                .map_err(|_| Error::CryptoError("ChaCha20-Poly1305 encryption failed".into())),
        }
    }

    /// Decrypt and verify data with AEAD cipher
    ///
    /// `ciphertext` must include the trailing tag. On tag mismatch no
    /// plaintext is released.
    pub fn decrypt(
        self,
        key_material: &[u8],
        iv: &[u8],
        ciphertext: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>> {
        let nonce = self.nonce(key_material, iv)?;
        if ciphertext.len() < self.tag_len() {
            return Err(Error::BufferTooShort {
                required: self.tag_len(),
                available: ciphertext.len(),
            });
        }

        let key = &key_material[..self.key_len()];
        let payload = Payload {
            msg: ciphertext,
            aad,
        };

        match self {
            AeadAlgorithm::AesGcm16_128 => Aes128Gcm::new_from_slice(key)
                .map_err(|_| Error::CryptoError("Failed to create AES-GCM cipher".into()))?
                .decrypt(AesGcmNonce::from_slice(&nonce), payload)
                .map_err(|_| Error::AuthenticationFailed("AES-GCM tag mismatch".into())),
            AeadAlgorithm::AesGcm16_256 => Aes256Gcm::new_from_slice(key)
                .map_err(|_| Error::CryptoError("Failed to create AES-GCM cipher".into()))?
                .decrypt(AesGcmNonce::from_slice(&nonce), payload)
                .map_err(|_| Error::AuthenticationFailed("AES-GCM tag mismatch".into())),
            AeadAlgorithm::ChaCha20Poly1305 => ChaCha20Poly1305::new_from_slice(key)
                .map_err(|_| Error::CryptoError("Failed to create ChaCha20 cipher".into()))?
                .decrypt(chacha20poly1305::Nonce::from_slice(&nonce), payload)
                .map_err(|_| Error::AuthenticationFailed("ChaCha20-Poly1305 tag mismatch".into())),
        }
    }
}

/// Block cipher used with a separate integrity algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockCipherAlgorithm {
    /// AES-CBC with 128-bit key
    AesCbc128,
    /// AES-CBC with 192-bit key
    AesCbc192,
    /// AES-CBC with 256-bit key
    AesCbc256,
}

impl BlockCipherAlgorithm {
    /// Key length in bytes
    pub fn key_len(self) -> usize {
        match self {
            BlockCipherAlgorithm::AesCbc128 => 16,
            BlockCipherAlgorithm::AesCbc192 => 24,
            BlockCipherAlgorithm::AesCbc256 => 32,
        }
    }

    /// IV length in bytes
    pub fn iv_len(self) -> usize {
        16
    }

    /// Cipher block size in bytes
    pub fn block_size(self) -> usize {
        16
    }

    /// Draw a fresh random IV
    pub fn generate_iv(self, rng: &dyn SecureRandom) -> Result<Vec<u8>> {
        let mut iv = vec![0u8; self.iv_len()];
        rng.fill(&mut iv)
            .map_err(|_| Error::CryptoError("Failed to generate IV".into()))?;
        Ok(iv)
    }

    fn check(self, key: &[u8], iv: &[u8], data: &[u8]) -> Result<()> {
        if key.len() != self.key_len() {
            return Err(Error::InvalidKeyLength {
                expected: self.key_len(),
                actual: key.len(),
            });
        }
        if iv.len() != self.iv_len() {
            return Err(Error::InvalidIvLength {
                expected: self.iv_len(),
                actual: iv.len(),
            });
        }
        if data.len() % self.block_size() != 0 {
            return Err(Error::InvalidSyntax(format!(
                "{} bytes is not a multiple of the {}-byte cipher block",
                data.len(),
                self.block_size()
            )));
        }
        Ok(())
    }

    /// Encrypt block-aligned data in CBC mode
    pub fn encrypt(self, key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        self.check(key, iv, plaintext)?;

        let mut buf = plaintext.to_vec();
        let len = buf.len();
        let written = match self {
            BlockCipherAlgorithm::AesCbc128 => Encryptor::<Aes128>::new_from_slices(key, iv)
                .map_err(|_| Error::CryptoError("Failed to create AES-CBC cipher".into()))?
                .encrypt_padded_mut::<NoPadding>(&mut buf, len)
                .map(|ct| ct.len()),
            BlockCipherAlgorithm::AesCbc192 => Encryptor::<Aes192>::new_from_slices(key, iv)
                .map_err(|_| Error::CryptoError("Failed to create AES-CBC cipher".into()))?
                .encrypt_padded_mut::<NoPadding>(&mut buf, len)
                .map(|ct| ct.len()),
            BlockCipherAlgorithm::AesCbc256 => Encryptor::<Aes256>::new_from_slices(key, iv)
                .map_err(|_| Error::CryptoError("Failed to create AES-CBC cipher".into()))?
                .encrypt_padded_mut::<NoPadding>(&mut buf, len)
                .map(|ct| ct.len()),
        }
        .map_err(|_| Error::CryptoError("AES-CBC encryption failed".into()))?;

        buf.truncate(written);
        Ok(buf)
    }

    /// Decrypt block-aligned data in CBC mode
    ///
    /// Padding is left in place; the caller strips IKE padding.
    pub fn decrypt(self, key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.check(key, iv, ciphertext)?;

        let mut buf = ciphertext.to_vec();
        let written = match self {
            BlockCipherAlgorithm::AesCbc128 => Decryptor::<Aes128>::new_from_slices(key, iv)
                .map_err(|_| Error::CryptoError("Failed to create AES-CBC cipher".into()))?
                .decrypt_padded_mut::<NoPadding>(&mut buf)
                .map(|pt| pt.len()),
            BlockCipherAlgorithm::AesCbc192 => Decryptor::<Aes192>::new_from_slices(key, iv)
                .map_err(|_| Error::CryptoError("Failed to create AES-CBC cipher".into()))?
                .decrypt_padded_mut::<NoPadding>(&mut buf)
                .map(|pt| pt.len()),
            BlockCipherAlgorithm::AesCbc256 => Decryptor::<Aes256>::new_from_slices(key, iv)
                .map_err(|_| Error::CryptoError("Failed to create AES-CBC cipher".into()))?
                .decrypt_padded_mut::<NoPadding>(&mut buf)
                .map(|pt| pt.len()),
        }
        .map_err(|_| Error::CryptoError("AES-CBC decryption failed".into()))?;

        buf.truncate(written);
        Ok(buf)
    }
}
