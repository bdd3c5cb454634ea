//! Pseudo-Random Function (PRF) and IKE SA key derivation
//!
//! Implements prf, prf+ and the SKEYSEED key schedule of RFC 7296
//! Sections 2.13 and 2.14.

use crate::ikev2::encrypted::{SkCipher, SkTransform};
use crate::{Error, Result};
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// PRF algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrfAlgorithm {
    /// PRF_HMAC_SHA2_256
    HmacSha256,
    /// PRF_HMAC_SHA2_384
    HmacSha384,
    /// PRF_HMAC_SHA2_512
    HmacSha512,
}

impl PrfAlgorithm {
    /// Get PRF output length in bytes
    pub fn output_len(self) -> usize {
        match self {
            PrfAlgorithm::HmacSha256 => 32,
            PrfAlgorithm::HmacSha384 => 48,
            PrfAlgorithm::HmacSha512 => 64,
        }
    }

    /// Compute prf(key, data)
    pub fn compute(self, key: &[u8], data: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let out = match self {
            PrfAlgorithm::HmacSha256 => {
                let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(key)
                    .map_err(|_| Error::CryptoError("Failed to create PRF".into()))?;
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
            PrfAlgorithm::HmacSha384 => {
                let mut mac = <Hmac<Sha384> as Mac>::new_from_slice(key)
                    .map_err(|_| Error::CryptoError("Failed to create PRF".into()))?;
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
            PrfAlgorithm::HmacSha512 => {
                let mut mac = <Hmac<Sha512> as Mac>::new_from_slice(key)
                    .map_err(|_| Error::CryptoError("Failed to create PRF".into()))?;
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
        };
        Ok(Zeroizing::new(out))
    }

    /// Compute prf+ (key expansion function)
    ///
    /// Defined in RFC 7296 Section 2.13:
    /// ```text
    /// prf+ (K,S) = T1 | T2 | T3 | T4 | ...
    ///
    /// where:
    /// T1 = prf (K, S | 0x01)
    /// T2 = prf (K, T1 | S | 0x02)
    /// T3 = prf (K, T2 | S | 0x03)
    /// ...
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if more than 255 blocks would be needed.
    pub fn prf_plus(self, key: &[u8], seed: &[u8], output_len: usize) -> Result<Zeroizing<Vec<u8>>> {
        let max = self.output_len() * 255;
        if output_len > max {
            return Err(Error::InvalidParameter(format!(
                "prf+ output of {} bytes exceeds {}",
                output_len, max
            )));
        }

        let mut output = Zeroizing::new(Vec::with_capacity(output_len));
        let mut t = Zeroizing::new(Vec::new());
        let mut counter: u8 = 1;

        while output.len() < output_len {
            let mut input = Zeroizing::new(Vec::with_capacity(t.len() + seed.len() + 1));
            input.extend_from_slice(&t);
            input.extend_from_slice(seed);
            input.push(counter);

            t = self.compute(key, &input)?;
            output.extend_from_slice(&t);

            counter = counter.wrapping_add(1);
        }

        output.truncate(output_len);
        Ok(output)
    }
}

/// IKE SA keys derived from SKEYSEED, zeroized on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    /// SK_d - Key for deriving Child SA keys
    pub sk_d: Vec<u8>,

    /// SK_ai - Initiator's integrity key
    pub sk_ai: Vec<u8>,

    /// SK_ar - Responder's integrity key
    pub sk_ar: Vec<u8>,

    /// SK_ei - Initiator's encryption key
    pub sk_ei: Vec<u8>,

    /// SK_er - Responder's encryption key
    pub sk_er: Vec<u8>,

    /// SK_pi - Initiator's AUTH payload key
    pub sk_pi: Vec<u8>,

    /// SK_pr - Responder's AUTH payload key
    pub sk_pr: Vec<u8>,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("sk_d_len", &self.sk_d.len())
            .field("sk_a_len", &self.sk_ai.len())
            .field("sk_e_len", &self.sk_ei.len())
            .finish_non_exhaustive()
    }
}

impl KeyMaterial {
    /// Derive IKE SA key material
    ///
    /// ```text
    /// SKEYSEED = prf(Ni | Nr, g^ir)
    ///
    /// {SK_d | SK_ai | SK_ar | SK_ei | SK_er | SK_pi | SK_pr}
    ///     = prf+ (SKEYSEED, Ni | Nr | SPIi | SPIr)
    /// ```
    ///
    /// `encr_key_len` includes the salt for combined-mode ciphers;
    /// `integ_key_len` is zero for them.
    #[allow(clippy::too_many_arguments)]
    pub fn derive(
        prf_alg: PrfAlgorithm,
        nonce_i: &[u8],
        nonce_r: &[u8],
        shared_secret: &[u8],
        spi_i: &[u8; 8],
        spi_r: &[u8; 8],
        encr_key_len: usize,
        integ_key_len: usize,
    ) -> Result<Self> {
        let mut prf_key = Zeroizing::new(Vec::with_capacity(nonce_i.len() + nonce_r.len()));
        prf_key.extend_from_slice(nonce_i);
        prf_key.extend_from_slice(nonce_r);

        let skeyseed = prf_alg.compute(&prf_key, shared_secret)?;

        let mut seed = Vec::with_capacity(nonce_i.len() + nonce_r.len() + 16);
        seed.extend_from_slice(nonce_i);
        seed.extend_from_slice(nonce_r);
        seed.extend_from_slice(spi_i);
        seed.extend_from_slice(spi_r);

        let prf_len = prf_alg.output_len();
        let total_len = 3 * prf_len + 2 * integ_key_len + 2 * encr_key_len;
        let keymat = prf_alg.prf_plus(&skeyseed, &seed, total_len)?;

        // Fields are evaluated in order, consuming keymat front to back
        let mut offset = 0;
        let mut take = |len: usize| {
            let key = keymat[offset..offset + len].to_vec();
            offset += len;
            key
        };

        Ok(KeyMaterial {
            sk_d: take(prf_len),
            sk_ai: take(integ_key_len),
            sk_ar: take(integ_key_len),
            sk_ei: take(encr_key_len),
            sk_er: take(encr_key_len),
            sk_pi: take(prf_len),
            sk_pr: take(prf_len),
        })
    }

    /// Derive key material sized for `transform`
    #[allow(clippy::too_many_arguments)]
    pub fn derive_for(
        prf_alg: PrfAlgorithm,
        transform: SkTransform,
        nonce_i: &[u8],
        nonce_r: &[u8],
        shared_secret: &[u8],
        spi_i: &[u8; 8],
        spi_r: &[u8; 8],
    ) -> Result<Self> {
        Self::derive(
            prf_alg,
            nonce_i,
            nonce_r,
            shared_secret,
            spi_i,
            spi_r,
            transform.encryption_key_len(),
            transform.integrity_key_len(),
        )
    }

    /// Protection for messages sent by the initiator (SK_ei, SK_ai)
    pub fn initiator_cipher(&self, transform: SkTransform) -> Result<SkCipher<'_>> {
        Self::check(transform, &self.sk_ei, &self.sk_ai)?;
        Ok(transform.with_keys(&self.sk_ei, &self.sk_ai))
    }

    /// Protection for messages sent by the responder (SK_er, SK_ar)
    pub fn responder_cipher(&self, transform: SkTransform) -> Result<SkCipher<'_>> {
        Self::check(transform, &self.sk_er, &self.sk_ar)?;
        Ok(transform.with_keys(&self.sk_er, &self.sk_ar))
    }

    fn check(transform: SkTransform, encryption_key: &[u8], integrity_key: &[u8]) -> Result<()> {
        if encryption_key.len() != transform.encryption_key_len() {
            return Err(Error::InvalidKeyLength {
                expected: transform.encryption_key_len(),
                actual: encryption_key.len(),
            });
        }
        if integrity_key.len() != transform.integrity_key_len() {
            return Err(Error::InvalidKeyLength {
                expected: transform.integrity_key_len(),
                actual: integrity_key.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::cipher::{AeadAlgorithm, BlockCipherAlgorithm};
    use crate::crypto::integrity::IntegrityAlgorithm;

    fn derive(nonce_i: &[u8]) -> KeyMaterial {
        KeyMaterial::derive(
            PrfAlgorithm::HmacSha256,
            nonce_i,
            &[0x02; 32],
            &[0x03; 256],
            &[0x04; 8],
            &[0x05; 8],
            32,
            32,
        )
        .unwrap()
    }

    #[test]
    fn test_prf_output_len() {
        assert_eq!(PrfAlgorithm::HmacSha256.output_len(), 32);
        assert_eq!(PrfAlgorithm::HmacSha384.output_len(), 48);
        assert_eq!(PrfAlgorithm::HmacSha512.output_len(), 64);
    }

    #[test]
    fn test_prf_known_answer() {
        // RFC 4231 test case 2
        let out = PrfAlgorithm::HmacSha256
            .compute(b"Jefe", b"what do ya want for nothing?")
            .unwrap();
        assert_eq!(
            hex::encode(&*out),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_prf_different_algorithms() {
        let sha256 = PrfAlgorithm::HmacSha256.compute(b"k", b"d").unwrap();
        let sha384 = PrfAlgorithm::HmacSha384.compute(b"k", b"d").unwrap();
        let sha512 = PrfAlgorithm::HmacSha512.compute(b"k", b"d").unwrap();

        assert_eq!(sha256.len(), 32);
        assert_eq!(sha384.len(), 48);
        assert_eq!(sha512.len(), 64);
        assert_ne!(&sha384[..32], &sha256[..]);
    }

    #[test]
    fn test_prf_plus_first_block() {
        let key = b"secret key";
        let seed = b"seed data";

        let t1 = PrfAlgorithm::HmacSha256.compute(key, b"seed data\x01").unwrap();
        let out = PrfAlgorithm::HmacSha256.prf_plus(key, seed, 32).unwrap();
        assert_eq!(*out, *t1);
    }

    #[test]
    fn test_prf_plus_prefix_property() {
        let key = b"secret key";
        let seed = b"seed data";

        let short = PrfAlgorithm::HmacSha384.prf_plus(key, seed, 20).unwrap();
        let long = PrfAlgorithm::HmacSha384.prf_plus(key, seed, 150).unwrap();
        assert_eq!(long.len(), 150);
        assert_eq!(&short[..], &long[..20]);
    }

    #[test]
    fn test_prf_plus_limit() {
        assert!(PrfAlgorithm::HmacSha256.prf_plus(b"k", b"s", 32 * 255).is_ok());
        assert!(matches!(
            PrfAlgorithm::HmacSha256.prf_plus(b"k", b"s", 32 * 255 + 1),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_key_material_derivation() {
        let keymat = derive(&[0x01; 32]);

        assert_eq!(keymat.sk_d.len(), 32);
        assert_eq!(keymat.sk_ai.len(), 32);
        assert_eq!(keymat.sk_ar.len(), 32);
        assert_eq!(keymat.sk_ei.len(), 32);
        assert_eq!(keymat.sk_er.len(), 32);
        assert_eq!(keymat.sk_pi.len(), 32);
        assert_eq!(keymat.sk_pr.len(), 32);

        assert_ne!(keymat.sk_ai, keymat.sk_ar);
        assert_ne!(keymat.sk_ei, keymat.sk_er);
        assert_ne!(keymat.sk_pi, keymat.sk_pr);
    }

    #[test]
    fn test_key_material_deterministic() {
        let a = derive(&[0x01; 32]);
        let b = derive(&[0x01; 32]);
        let c = derive(&[0x09; 32]);

        assert_eq!(a.sk_d, b.sk_d);
        assert_eq!(a.sk_ei, b.sk_ei);
        assert_ne!(a.sk_d, c.sk_d);
    }

    #[test]
    fn test_derive_for_transform() {
        let transform = SkTransform::Combined(AeadAlgorithm::AesGcm16_256);
        let keymat = KeyMaterial::derive_for(
            PrfAlgorithm::HmacSha512,
            transform,
            &[1; 16],
            &[2; 16],
            &[3; 32],
            &[4; 8],
            &[5; 8],
        )
        .unwrap();

        assert_eq!(keymat.sk_ei.len(), 36);
        assert!(keymat.sk_ai.is_empty());
        assert_eq!(keymat.sk_d.len(), 64);
        assert!(keymat.initiator_cipher(transform).is_ok());
        assert!(keymat.responder_cipher(transform).is_ok());
    }

    #[test]
    fn test_cipher_key_length_checked() {
        let keymat = derive(&[0x01; 32]);
        let transform = SkTransform::Separate {
            cipher: BlockCipherAlgorithm::AesCbc128,
            integrity: IntegrityAlgorithm::HmacSha256_128,
        };
        assert!(matches!(
            keymat.initiator_cipher(transform),
            Err(Error::InvalidKeyLength {
                expected: 16,
                actual: 32
            })
        ));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let keymat = derive(&[0x01; 32]);
        let shown = format!("{:?}", keymat);
        assert!(!shown.contains(&format!("{:?}", keymat.sk_ei)));
    }
}
