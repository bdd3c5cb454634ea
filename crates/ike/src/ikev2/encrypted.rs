//! Encrypted Payload body (RFC 7296 Section 3.14)
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! | Next Payload  |C|  RESERVED   |         Payload Length        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                     Initialization Vector                     |
//! |         (length is block size for encryption algorithm)       |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ~                    Encrypted IKE Payloads                     ~
//! +               +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |               |             Padding (0-255 octets)            |
//! +-+-+-+-+-+-+-+-+                               +-+-+-+-+-+-+-+-+
//! |                                               |  Pad Length   |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ~                    Integrity Checksum Data                    ~
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! The body is everything after the generic header (and after the SKF
//! sub-header for fragments). The integrity checksum or AEAD tag covers the
//! whole message up to the checksum, starting at the IKE header.

use super::constants::{GENERIC_PAYLOAD_HEADER_SIZE, IKE_HEADER_SIZE, SKF_HEADER_SIZE};
use super::fragment::SkfHeader;
use super::message::IkeHeader;
use super::payload::PayloadHeader;
use crate::crypto::cipher::{AeadAlgorithm, BlockCipherAlgorithm};
use crate::crypto::integrity::IntegrityAlgorithm;
use crate::{logging, Error, Result};
use ring::rand::SecureRandom;
use zeroize::Zeroizing;

/// Negotiated SK protection, without keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkTransform {
    /// Combined-mode cipher
    Combined(AeadAlgorithm),
    /// Block cipher with a separate integrity algorithm
    Separate {
        /// Encryption algorithm
        cipher: BlockCipherAlgorithm,
        /// Integrity algorithm
        integrity: IntegrityAlgorithm,
    },
}

impl SkTransform {
    /// Length of SK_e (including salt for AEAD)
    pub fn encryption_key_len(self) -> usize {
        match self {
            SkTransform::Combined(alg) => alg.keying_material_len(),
            SkTransform::Separate { cipher, .. } => cipher.key_len(),
        }
    }

    /// Length of SK_a (zero for AEAD)
    pub fn integrity_key_len(self) -> usize {
        match self {
            SkTransform::Combined(_) => 0,
            SkTransform::Separate { integrity, .. } => integrity.key_len(),
        }
    }

    /// IV length
    pub fn iv_len(self) -> usize {
        match self {
            SkTransform::Combined(alg) => alg.iv_len(),
            SkTransform::Separate { cipher, .. } => cipher.iv_len(),
        }
    }

    /// Checksum length (truncated MAC or AEAD tag)
    pub fn checksum_len(self) -> usize {
        match self {
            SkTransform::Combined(alg) => alg.tag_len(),
            SkTransform::Separate { integrity, .. } => integrity.output_len(),
        }
    }

    /// Padding alignment
    pub fn block_size(self) -> usize {
        match self {
            SkTransform::Combined(alg) => alg.block_size(),
            SkTransform::Separate { cipher, .. } => cipher.block_size(),
        }
    }

    /// Attach keys
    ///
    /// `integrity_key` is ignored for combined-mode ciphers.
    pub fn with_keys<'a>(self, encryption_key: &'a [u8], integrity_key: &'a [u8]) -> SkCipher<'a> {
        match self {
            SkTransform::Combined(algorithm) => SkCipher::Combined {
                algorithm,
                key: encryption_key,
            },
            SkTransform::Separate { cipher, integrity } => SkCipher::Separate {
                cipher,
                encryption_key,
                integrity,
                integrity_key,
            },
        }
    }
}

/// Keyed SK protection for one direction
#[derive(Clone, Copy)]
pub enum SkCipher<'a> {
    /// Combined-mode cipher with SK_e (key followed by salt)
    Combined {
        /// AEAD algorithm
        algorithm: AeadAlgorithm,
        /// SK_e keying material
        key: &'a [u8],
    },
    /// Block cipher plus integrity algorithm
    Separate {
        /// Encryption algorithm
        cipher: BlockCipherAlgorithm,
        /// SK_e
        encryption_key: &'a [u8],
        /// Integrity algorithm
        integrity: IntegrityAlgorithm,
        /// SK_a
        integrity_key: &'a [u8],
    },
}

impl std::fmt::Debug for SkCipher<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SkCipher").field(&self.transform()).finish()
    }
}

impl SkCipher<'_> {
    /// Algorithms without keys
    pub fn transform(&self) -> SkTransform {
        match *self {
            SkCipher::Combined { algorithm, .. } => SkTransform::Combined(algorithm),
            SkCipher::Separate {
                cipher, integrity, ..
            } => SkTransform::Separate { cipher, integrity },
        }
    }

    fn generate_iv(&self, rng: &dyn SecureRandom) -> Result<Vec<u8>> {
        match *self {
            SkCipher::Combined { algorithm, .. } => algorithm.generate_iv(rng),
            SkCipher::Separate { cipher, .. } => cipher.generate_iv(rng),
        }
    }
}

/// Padding length for `plaintext_len` bytes so that
/// `plaintext_len + pad_len + 1` is a multiple of `block_size`
pub fn padding_len(plaintext_len: usize, block_size: usize) -> usize {
    (block_size - (plaintext_len + 1) % block_size) % block_size
}

/// Encrypted body of an SK or SKF payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayloadBody {
    iv: Vec<u8>,
    ciphertext: Vec<u8>,
    checksum: Vec<u8>,
    plaintext: Vec<u8>,
}

impl EncryptedPayloadBody {
    /// Encrypt inner payloads for an SK (or SKF when `fragment` is set) payload
    ///
    /// # Arguments
    ///
    /// * `header` - IKE header of the outgoing message; next payload and
    ///   length are rewritten to match the protected payload
    /// * `first_payload` - Type of the first inner payload
    /// * `fragment` - SKF sub-header, `None` for an unfragmented SK payload
    /// * `plaintext` - Serialized inner payloads
    /// * `cipher` - Keyed protection for this direction
    /// * `rng` - Source of the IV and padding
    pub fn encrypt(
        header: &IkeHeader,
        first_payload: u8,
        fragment: Option<&SkfHeader>,
        plaintext: &[u8],
        cipher: &SkCipher<'_>,
        rng: &dyn SecureRandom,
    ) -> Result<Self> {
        let iv = cipher.generate_iv(rng)?;

        let mut padding = vec![0u8; padding_len(plaintext.len(), cipher.transform().block_size())];
        rng.fill(&mut padding)
            .map_err(|_| Error::CryptoError("Failed to generate padding".into()))?;

        Self::encrypt_with(header, first_payload, fragment, plaintext, cipher, iv, &padding)
    }

    /// Encrypt with caller-chosen IV and padding bytes
    pub(crate) fn encrypt_with(
        header: &IkeHeader,
        first_payload: u8,
        fragment: Option<&SkfHeader>,
        plaintext: &[u8],
        cipher: &SkCipher<'_>,
        iv: Vec<u8>,
        padding: &[u8],
    ) -> Result<Self> {
        let transform = cipher.transform();
        if iv.len() != transform.iv_len() {
            return Err(Error::InvalidIvLength {
                expected: transform.iv_len(),
                actual: iv.len(),
            });
        }
        if padding.len() > u8::MAX as usize
            || (plaintext.len() + padding.len() + 1) % transform.block_size() != 0
        {
            return Err(Error::InvalidParameter(format!(
                "{} padding bytes do not align {} bytes to {}",
                padding.len(),
                plaintext.len(),
                transform.block_size()
            )));
        }

        let mut padded = Zeroizing::new(Vec::with_capacity(plaintext.len() + padding.len() + 1));
        padded.extend_from_slice(plaintext);
        padded.extend_from_slice(padding);
        padded.push(padding.len() as u8);

        let body_len = transform.iv_len() + padded.len() + transform.checksum_len();
        let prefix = protected_prefix(header, first_payload, fragment, body_len)?;

        let (ciphertext, checksum) = match *cipher {
            SkCipher::Combined { algorithm, key } => {
                let mut sealed = algorithm.encrypt(key, &iv, &padded, &prefix)?;
                let checksum = sealed.split_off(sealed.len() - algorithm.tag_len());
                (sealed, checksum)
            }
            SkCipher::Separate {
                cipher,
                encryption_key,
                integrity,
                integrity_key,
            } => {
                let ciphertext = cipher.encrypt(encryption_key, &iv, &padded)?;

                let mut authenticated =
                    Vec::with_capacity(prefix.len() + iv.len() + ciphertext.len());
                authenticated.extend_from_slice(&prefix);
                authenticated.extend_from_slice(&iv);
                authenticated.extend_from_slice(&ciphertext);
                let checksum = integrity.compute(integrity_key, &authenticated)?;

                (ciphertext, checksum)
            }
        };

        logging::log_sk_encrypted(
            &header.initiator_spi,
            header.message_id,
            plaintext.len(),
            padding.len(),
        );

        Ok(EncryptedPayloadBody {
            iv,
            ciphertext,
            checksum,
            plaintext: plaintext.to_vec(),
        })
    }

    /// Verify and decrypt the body found at `body_offset` in `message`
    ///
    /// `message` must end where the body ends. For AEAD the associated data
    /// is `message[..body_offset]`; for separate integrity the checksum
    /// covers `message[..body_offset + iv + ciphertext]` and is verified
    /// before anything is decrypted.
    ///
    /// # Errors
    ///
    /// - `InvalidSyntax` if the body is too short or not block aligned
    /// - `IntegrityCheckFailed` / `AuthenticationFailed` on a bad checksum
    /// - `InvalidPadding` if the pad length byte is out of range
    pub fn decrypt(message: &[u8], body_offset: usize, cipher: &SkCipher<'_>) -> Result<Self> {
        let transform = cipher.transform();
        let iv_len = transform.iv_len();
        let checksum_len = transform.checksum_len();

        let ct_len = message
            .len()
            .checked_sub(body_offset)
            .and_then(|n| n.checked_sub(iv_len))
            .and_then(|n| n.checked_sub(checksum_len))
            .ok_or_else(|| {
                Error::InvalidSyntax(format!(
                    "Encrypted body of {} bytes too short for {} byte IV and {} byte checksum",
                    message.len().saturating_sub(body_offset),
                    iv_len,
                    checksum_len
                ))
            })?;

        let iv_end = body_offset + iv_len;
        let ct_end = iv_end + ct_len;
        let iv = &message[body_offset..iv_end];
        let ciphertext = &message[iv_end..ct_end];
        let checksum = &message[ct_end..];
        let body_len = message.len() - body_offset;

        let decrypted = match *cipher {
            SkCipher::Combined { algorithm, key } => {
                let aad = &message[..body_offset];
                let sealed = &message[iv_end..];
                Zeroizing::new(algorithm.decrypt(key, iv, sealed, aad).map_err(|e| {
                    if e.is_security_failure() {
                        logging::log_integrity_failure("aead", body_len);
                    }
                    e
                })?)
            }
            SkCipher::Separate {
                cipher,
                encryption_key,
                integrity,
                integrity_key,
            } => {
                if let Err(e) = integrity.verify(integrity_key, &message[..ct_end], checksum) {
                    logging::log_integrity_failure("hmac", body_len);
                    return Err(e);
                }
                Zeroizing::new(cipher.decrypt(encryption_key, iv, ciphertext)?)
            }
        };

        let pad_len = match decrypted.last() {
            Some(&b) => b as usize,
            None => {
                return Err(Error::InvalidSyntax(
                    "Encrypted body holds no pad length byte".into(),
                ))
            }
        };
        if pad_len + 1 > decrypted.len() {
            return Err(Error::InvalidPadding {
                pad_len,
                available: decrypted.len(),
            });
        }
        let plaintext = decrypted[..decrypted.len() - pad_len - 1].to_vec();

        logging::log_sk_decrypted(body_len, plaintext.len());

        Ok(EncryptedPayloadBody {
            iv: iv.to_vec(),
            ciphertext: ciphertext.to_vec(),
            checksum: checksum.to_vec(),
            plaintext,
        })
    }

    /// Initialization vector
    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    /// Ciphertext (encrypted plaintext, padding and pad length byte)
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Integrity checksum or AEAD tag
    pub fn checksum(&self) -> &[u8] {
        &self.checksum
    }

    /// Inner payloads in the clear
    pub fn plaintext(&self) -> &[u8] {
        &self.plaintext
    }

    /// Consume the body, returning the plaintext
    pub fn into_plaintext(self) -> Vec<u8> {
        self.plaintext
    }

    /// Encoded body length: IV + ciphertext + checksum
    pub fn total_length(&self) -> usize {
        self.iv.len() + self.ciphertext.len() + self.checksum.len()
    }

    /// Serialize as `IV || ciphertext || checksum`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total_length());
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.checksum);
        out
    }

    /// Body length that `plaintext_len` bytes of inner payloads encrypt to
    pub fn encoded_len(transform: SkTransform, plaintext_len: usize) -> usize {
        let padded = plaintext_len + padding_len(plaintext_len, transform.block_size()) + 1;
        transform.iv_len() + padded + transform.checksum_len()
    }
}

/// Offset of the encrypted body from the start of the IKE message
pub fn body_offset(fragmented: bool) -> usize {
    IKE_HEADER_SIZE
        + GENERIC_PAYLOAD_HEADER_SIZE
        + if fragmented { SKF_HEADER_SIZE } else { 0 }
}

/// Bytes that precede the body on the wire: IKE header, SK/SKF generic
/// header and SKF sub-header
///
/// This is also the AEAD associated data.
pub(crate) fn protected_prefix(
    header: &IkeHeader,
    first_payload: u8,
    fragment: Option<&SkfHeader>,
    body_len: usize,
) -> Result<Vec<u8>> {
    let offset = body_offset(fragment.is_some());
    let payload_len = offset - IKE_HEADER_SIZE + body_len;
    let payload_len = u16::try_from(payload_len).map_err(|_| {
        Error::InvalidParameter(format!(
            "Encrypted payload of {} bytes exceeds 65535",
            payload_len
        ))
    })?;

    let ike_header = header.for_protected_payload(fragment.is_some(), offset + body_len)?;
    let generic = PayloadHeader::new(first_payload, false, payload_len);

    let mut prefix = Vec::with_capacity(offset);
    prefix.extend_from_slice(&ike_header.to_bytes());
    prefix.extend_from_slice(&generic.to_bytes());
    if let Some(skf) = fragment {
        prefix.extend_from_slice(&skf.to_bytes());
    }
    Ok(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ikev2::constants::{ExchangeType, IkeFlags, PayloadType};
    use ring::rand::SystemRandom;

    static ENC_KEY: [u8; 36] = [0x11; 36];
    static INTEG_KEY: [u8; 64] = [0x22; 64];

    fn header() -> IkeHeader {
        IkeHeader::new(
            [1; 8],
            [2; 8],
            PayloadType::SK,
            ExchangeType::IkeAuth,
            IkeFlags::request(true),
            1,
            0,
        )
    }

    fn transforms() -> Vec<SkTransform> {
        vec![
            SkTransform::Combined(AeadAlgorithm::AesGcm16_128),
            SkTransform::Combined(AeadAlgorithm::AesGcm16_256),
            SkTransform::Combined(AeadAlgorithm::ChaCha20Poly1305),
            SkTransform::Separate {
                cipher: BlockCipherAlgorithm::AesCbc128,
                integrity: IntegrityAlgorithm::HmacSha1_96,
            },
            SkTransform::Separate {
                cipher: BlockCipherAlgorithm::AesCbc256,
                integrity: IntegrityAlgorithm::HmacSha256_128,
            },
            SkTransform::Separate {
                cipher: BlockCipherAlgorithm::AesCbc192,
                integrity: IntegrityAlgorithm::HmacSha512_256,
            },
        ]
    }

    fn keyed(transform: SkTransform) -> SkCipher<'static> {
        transform.with_keys(
            &ENC_KEY[..transform.encryption_key_len()],
            &INTEG_KEY[..transform.integrity_key_len()],
        )
    }

    fn seal(
        transform: SkTransform,
        fragment: Option<&SkfHeader>,
        plaintext: &[u8],
    ) -> (Vec<u8>, EncryptedPayloadBody) {
        let rng = SystemRandom::new();
        let cipher = keyed(transform);
        let body = EncryptedPayloadBody::encrypt(&header(), 35, fragment, plaintext, &cipher, &rng)
            .unwrap();
        let mut message = protected_prefix(&header(), 35, fragment, body.total_length()).unwrap();
        message.extend_from_slice(&body.to_bytes());
        (message, body)
    }

    #[test]
    fn test_padding_len() {
        assert_eq!(padding_len(0, 16), 15);
        assert_eq!(padding_len(15, 16), 0);
        assert_eq!(padding_len(16, 16), 15);
        assert_eq!(padding_len(3, 4), 0);
        assert_eq!(padding_len(4, 4), 3);
        for len in 0..64 {
            let pad = padding_len(len, 16);
            assert!(pad < 16);
            assert_eq!((len + pad + 1) % 16, 0);
        }
    }

    #[test]
    fn test_roundtrip_all_modes_and_lengths() {
        for transform in transforms() {
            let cipher = keyed(transform);
            for len in 0..=40 {
                let plaintext: Vec<u8> = (0..len as u8).collect();
                let (message, body) = seal(transform, None, &plaintext);

                assert_eq!(
                    body.total_length(),
                    body.iv().len() + body.ciphertext().len() + body.checksum().len()
                );
                assert_eq!(
                    body.total_length(),
                    EncryptedPayloadBody::encoded_len(transform, len)
                );
                assert_eq!(body.ciphertext().len() % transform.block_size(), 0);
                assert_eq!(
                    body.ciphertext().len(),
                    len + padding_len(len, transform.block_size()) + 1
                );

                let decrypted =
                    EncryptedPayloadBody::decrypt(&message, body_offset(false), &cipher).unwrap();
                assert_eq!(decrypted.plaintext(), &plaintext[..]);
                assert_eq!(decrypted.iv(), body.iv());
                assert_eq!(decrypted.checksum(), body.checksum());
            }
        }
    }

    #[test]
    fn test_fragment_roundtrip() {
        let skf = SkfHeader::new(2, 3).unwrap();
        for transform in transforms() {
            let (message, _) = seal(transform, Some(&skf), b"fragment data");
            assert_eq!(message[16], PayloadType::SKF.to_u8());
            let decrypted =
                EncryptedPayloadBody::decrypt(&message, body_offset(true), &keyed(transform))
                    .unwrap();
            assert_eq!(decrypted.plaintext(), b"fragment data");
        }
    }

    #[test]
    fn test_single_bit_tamper_detected() {
        for transform in transforms() {
            let (message, _) = seal(transform, None, b"integrity protected payloads");
            let cipher = keyed(transform);

            for byte in 0..message.len() {
                let mut tampered = message.clone();
                tampered[byte] ^= 0x01;
                let err = EncryptedPayloadBody::decrypt(&tampered, body_offset(false), &cipher)
                    .unwrap_err();
                assert!(
                    err.is_security_failure(),
                    "byte {} of {:?}: {:?}",
                    byte,
                    transform,
                    err
                );
            }
        }
    }

    #[test]
    fn test_skf_header_is_authenticated() {
        let skf = SkfHeader::new(1, 2).unwrap();
        for transform in transforms() {
            let (mut message, _) = seal(transform, Some(&skf), b"abc");
            // Fragment number low byte
            message[33] ^= 0x03;
            assert!(
                EncryptedPayloadBody::decrypt(&message, body_offset(true), &keyed(transform))
                    .unwrap_err()
                    .is_security_failure()
            );
        }
    }

    #[test]
    fn test_known_padding_layout() {
        let transform = SkTransform::Separate {
            cipher: BlockCipherAlgorithm::AesCbc128,
            integrity: IntegrityAlgorithm::HmacSha256_128,
        };
        let cipher = keyed(transform);
        let body = EncryptedPayloadBody::encrypt_with(
            &header(),
            35,
            None,
            &[0xAB; 10],
            &cipher,
            vec![0; 16],
            &[0xEE; 5],
        )
        .unwrap();
        assert_eq!(body.ciphertext().len(), 16);

        let raw = BlockCipherAlgorithm::AesCbc128
            .decrypt(&ENC_KEY[..16], body.iv(), body.ciphertext())
            .unwrap();
        assert_eq!(&raw[..10], &[0xAB; 10]);
        assert_eq!(&raw[10..15], &[0xEE; 5]);
        assert_eq!(raw[15], 5);
    }

    #[test]
    fn test_misaligned_padding_rejected() {
        let cipher = keyed(SkTransform::Combined(AeadAlgorithm::AesGcm16_128));
        let result = EncryptedPayloadBody::encrypt_with(
            &header(),
            35,
            None,
            &[1, 2],
            &cipher,
            vec![0; 8],
            &[0, 0],
        );
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_body_too_short() {
        let cipher = keyed(SkTransform::Combined(AeadAlgorithm::AesGcm16_128));
        let message = vec![0u8; body_offset(false) + 8 + 15];
        let err = EncryptedPayloadBody::decrypt(&message, body_offset(false), &cipher).unwrap_err();
        assert!(matches!(err, Error::InvalidSyntax(_)));

        let err = EncryptedPayloadBody::decrypt(&message, message.len() + 1, &cipher).unwrap_err();
        assert!(matches!(err, Error::InvalidSyntax(_)));
    }

    #[test]
    fn test_bad_pad_length() {
        // Valid checksum over a ciphertext whose last byte claims 255 bytes of padding
        let transform = SkTransform::Separate {
            cipher: BlockCipherAlgorithm::AesCbc128,
            integrity: IntegrityAlgorithm::HmacSha256_128,
        };
        let iv = [0x33u8; 16];
        let mut padded = [0u8; 16];
        padded[15] = 255;
        let ct = BlockCipherAlgorithm::AesCbc128
            .encrypt(&ENC_KEY[..16], &iv, &padded)
            .unwrap();

        let mut message = protected_prefix(&header(), 35, None, 16 + 16 + 16).unwrap();
        message.extend_from_slice(&iv);
        message.extend_from_slice(&ct);
        let tag = IntegrityAlgorithm::HmacSha256_128
            .compute(&INTEG_KEY[..32], &message)
            .unwrap();
        message.extend_from_slice(&tag);

        let err = EncryptedPayloadBody::decrypt(&message, body_offset(false), &keyed(transform))
            .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidPadding {
                pad_len: 255,
                available: 16
            }
        );
    }

    #[test]
    fn test_unaligned_ciphertext_after_valid_mac() {
        let transform = SkTransform::Separate {
            cipher: BlockCipherAlgorithm::AesCbc128,
            integrity: IntegrityAlgorithm::HmacSha1_96,
        };
        let mut message = protected_prefix(&header(), 35, None, 16 + 17 + 12).unwrap();
        message.extend_from_slice(&[0u8; 16 + 17]);
        let tag = IntegrityAlgorithm::HmacSha1_96
            .compute(&INTEG_KEY[..20], &message)
            .unwrap();
        message.extend_from_slice(&tag);

        let err = EncryptedPayloadBody::decrypt(&message, body_offset(false), &keyed(transform))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSyntax(_)));
    }

    #[test]
    fn test_prefix_lengths() {
        let prefix = protected_prefix(&header(), 35, None, 100).unwrap();
        assert_eq!(prefix.len(), 32);
        assert_eq!(prefix[16], PayloadType::SK.to_u8());
        assert_eq!(&prefix[24..28], &132u32.to_be_bytes());
        assert_eq!(prefix[28], 35);
        assert_eq!(&prefix[30..32], &104u16.to_be_bytes());

        let skf = SkfHeader::new(1, 1).unwrap();
        let prefix = protected_prefix(&header(), 35, Some(&skf), 100).unwrap();
        assert_eq!(prefix.len(), 36);
        assert_eq!(&prefix[24..28], &136u32.to_be_bytes());
        assert_eq!(&prefix[30..32], &108u16.to_be_bytes());
        assert_eq!(&prefix[32..36], &[0, 1, 0, 1]);
    }

    #[test]
    fn test_transform_key_lengths() {
        let t = SkTransform::Combined(AeadAlgorithm::AesGcm16_256);
        assert_eq!(t.encryption_key_len(), 36);
        assert_eq!(t.integrity_key_len(), 0);

        let t = SkTransform::Separate {
            cipher: BlockCipherAlgorithm::AesCbc192,
            integrity: IntegrityAlgorithm::HmacSha384_192,
        };
        assert_eq!(t.encryption_key_len(), 24);
        assert_eq!(t.integrity_key_len(), 48);
        assert_eq!(t.checksum_len(), 24);
    }
}
