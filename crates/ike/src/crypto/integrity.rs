//! Integrity algorithms for non-AEAD SK payloads (IANA Transform Type 3)
//!
//! The checksum is the leading `output_len()` bytes of the HMAC.

use crate::{Error, Result};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;

/// Truncated HMAC integrity algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegrityAlgorithm {
    /// AUTH_HMAC_SHA1_96 (RFC 2404)
    HmacSha1_96,
    /// AUTH_HMAC_SHA2_256_128 (RFC 4868)
    HmacSha256_128,
    /// AUTH_HMAC_SHA2_384_192 (RFC 4868)
    HmacSha384_192,
    /// AUTH_HMAC_SHA2_512_256 (RFC 4868)
    HmacSha512_256,
}

impl IntegrityAlgorithm {
    /// Key length in bytes
    pub fn key_len(self) -> usize {
        match self {
            IntegrityAlgorithm::HmacSha1_96 => 20,
            IntegrityAlgorithm::HmacSha256_128 => 32,
            IntegrityAlgorithm::HmacSha384_192 => 48,
            IntegrityAlgorithm::HmacSha512_256 => 64,
        }
    }

    /// Truncated checksum length in bytes
    pub fn output_len(self) -> usize {
        match self {
            IntegrityAlgorithm::HmacSha1_96 => 12,
            IntegrityAlgorithm::HmacSha256_128 => 16,
            IntegrityAlgorithm::HmacSha384_192 => 24,
            IntegrityAlgorithm::HmacSha512_256 => 32,
        }
    }

    /// Compute the truncated checksum over `data`
    pub fn compute(self, key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        if key.len() != self.key_len() {
            return Err(Error::InvalidKeyLength {
                expected: self.key_len(),
                actual: key.len(),
            });
        }

        let mut full = match self {
            IntegrityAlgorithm::HmacSha1_96 => mac::<Hmac<Sha1>>(key, data)?,
            IntegrityAlgorithm::HmacSha256_128 => mac::<Hmac<Sha256>>(key, data)?,
            IntegrityAlgorithm::HmacSha384_192 => mac::<Hmac<Sha384>>(key, data)?,
            IntegrityAlgorithm::HmacSha512_256 => mac::<Hmac<Sha512>>(key, data)?,
        };
        full.truncate(self.output_len());
        Ok(full)
    }

    /// Verify a received checksum in constant time
    ///
    /// # Errors
    ///
    /// Returns `IntegrityCheckFailed` on any mismatch, including a checksum
    /// of the wrong length.
    pub fn verify(self, key: &[u8], data: &[u8], checksum: &[u8]) -> Result<()> {
        let expected = self.compute(key, data)?;
        if expected.ct_eq(checksum).into() {
            Ok(())
        } else {
            Err(Error::IntegrityCheckFailed)
        }
    }
}

fn mac<M: Mac + hmac::digest::KeyInit>(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = <M as Mac>::new_from_slice(key)
        .map_err(|_| Error::CryptoError("Failed to create HMAC".into()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}
