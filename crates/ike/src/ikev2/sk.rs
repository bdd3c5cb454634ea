//! SK and SKF payloads as complete IKE messages
//!
//! An encrypted message is laid out as
//!
//! ```text
//! IKE header | SK or SKF generic header | [SKF sub-header] | IV | ciphertext | checksum
//! ```
//!
//! and is always the last (and only) top-level payload of its packet.

use super::constants::{PayloadType, IKE_HEADER_SIZE, SKF_HEADER_SIZE};
use super::encrypted::{body_offset, protected_prefix, EncryptedPayloadBody, SkCipher};
use super::fragment::SkfHeader;
use super::message::IkeHeader;
use super::payload::PayloadHeader;
use crate::config::FragmentationConfig;
use crate::{logging, Error, Result};
use ring::rand::SecureRandom;

/// An SK or SKF payload together with the IKE header it is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkPayload {
    header: IkeHeader,
    first_payload: u8,
    fragment: Option<SkfHeader>,
    body: EncryptedPayloadBody,
}

impl SkPayload {
    /// Encrypt `plaintext` into an SK payload (SKF when `fragment` is set)
    ///
    /// The stored header has its next payload and length fields set for
    /// the encoded message.
    pub fn encrypt(
        header: &IkeHeader,
        first_payload: u8,
        fragment: Option<SkfHeader>,
        plaintext: &[u8],
        cipher: &SkCipher<'_>,
        rng: &dyn SecureRandom,
    ) -> Result<Self> {
        let body = EncryptedPayloadBody::encrypt(
            header,
            first_payload,
            fragment.as_ref(),
            plaintext,
            cipher,
            rng,
        )?;
        let header = header.for_protected_payload(
            fragment.is_some(),
            body_offset(fragment.is_some()) + body.total_length(),
        )?;

        Ok(SkPayload {
            header,
            first_payload,
            fragment,
            body,
        })
    }

    /// IKE header of the message carrying this payload
    pub fn header(&self) -> &IkeHeader {
        &self.header
    }

    /// Type of the first inner payload (zero in SKF fragments after the first)
    pub fn first_payload(&self) -> u8 {
        self.first_payload
    }

    /// SKF sub-header, `None` for SK
    pub fn fragment(&self) -> Option<&SkfHeader> {
        self.fragment.as_ref()
    }

    /// Encrypted body
    pub fn body(&self) -> &EncryptedPayloadBody {
        &self.body
    }

    /// Consume the payload, returning the decrypted inner payloads
    pub fn into_plaintext(self) -> Vec<u8> {
        self.body.into_plaintext()
    }

    /// SK/SKF payload length including generic header and sub-header
    pub fn payload_length(&self) -> usize {
        PayloadHeader::SIZE
            + if self.fragment.is_some() {
                SKF_HEADER_SIZE
            } else {
                0
            }
            + self.body.total_length()
    }

    /// Serialize the whole IKE message
    pub fn encode_message(&self) -> Result<Vec<u8>> {
        let mut message = protected_prefix(
            &self.header,
            self.first_payload,
            self.fragment.as_ref(),
            self.body.total_length(),
        )?;
        message.extend_from_slice(&self.body.to_bytes());
        Ok(message)
    }

    /// Parse, verify and decrypt an SK or SKF message
    ///
    /// # Errors
    ///
    /// - Header errors from [`IkeHeader::from_bytes`]
    /// - `InvalidLength` if the header length differs from the packet size
    /// - `InvalidSyntax` if the first payload is not SK/SKF or does not
    ///   extend to the end of the packet
    /// - Body errors from [`EncryptedPayloadBody::decrypt`]
    pub fn decode_message(message: &[u8], cipher: &SkCipher<'_>) -> Result<Self> {
        let header = IkeHeader::from_bytes(message)?;
        if header.length as usize != message.len() {
            return Err(Error::InvalidLength {
                expected: header.length as usize,
                actual: message.len(),
            });
        }

        let fragmented = match header.next_payload {
            PayloadType::SK => false,
            PayloadType::SKF => true,
            other => {
                return Err(Error::InvalidSyntax(format!(
                    "Expected SK or SKF payload, got {:?}",
                    other
                )))
            }
        };

        let generic = PayloadHeader::from_bytes(&message[IKE_HEADER_SIZE..])?;
        if IKE_HEADER_SIZE + generic.length as usize != message.len() {
            return Err(Error::InvalidSyntax(format!(
                "Encrypted payload length {} does not reach end of {} byte message",
                generic.length,
                message.len()
            )));
        }

        let fragment = if fragmented {
            Some(SkfHeader::from_bytes(
                &message[IKE_HEADER_SIZE + PayloadHeader::SIZE..],
            )?)
        } else {
            None
        };

        let body = EncryptedPayloadBody::decrypt(message, body_offset(fragmented), cipher)?;

        Ok(SkPayload {
            header,
            first_payload: generic.next_payload,
            fragment,
            body,
        })
    }
}

/// Encrypt inner payloads into one SK packet, or SKF packets if needed
///
/// Fragmentation applies only when enabled and the single SK packet would
/// exceed `max_fragment_size`. Each fragment then carries at most
///
/// ```text
/// max_fragment_size - IKE header - SKF header - SKF sub-header - IV - checksum - block size
/// ```
///
/// plaintext bytes. Only fragment 1 names the first inner payload.
pub fn encrypt_and_encode(
    header: &IkeHeader,
    first_payload: u8,
    plaintext: &[u8],
    cipher: &SkCipher<'_>,
    fragmentation: &FragmentationConfig,
    rng: &dyn SecureRandom,
) -> Result<Vec<Vec<u8>>> {
    let transform = cipher.transform();
    let single_len = body_offset(false) + EncryptedPayloadBody::encoded_len(transform, plaintext.len());

    if !fragmentation.enabled || single_len <= fragmentation.max_fragment_size {
        let sk = SkPayload::encrypt(header, first_payload, None, plaintext, cipher, rng)?;
        return Ok(vec![sk.encode_message()?]);
    }

    let overhead =
        body_offset(true) + transform.iv_len() + transform.checksum_len() + transform.block_size();
    let data_per_fragment = fragmentation
        .max_fragment_size
        .checked_sub(overhead)
        .filter(|n| *n > 0)
        .ok_or_else(|| {
            Error::InvalidParameter(format!(
                "max_fragment_size {} leaves no room for data after {} bytes of overhead",
                fragmentation.max_fragment_size, overhead
            ))
        })?;

    let chunks: Vec<&[u8]> = plaintext.chunks(data_per_fragment).collect();
    let total = u16::try_from(chunks.len()).map_err(|_| {
        Error::InvalidParameter(format!("{} fragments exceed 65535", chunks.len()))
    })?;

    let mut packets = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let number = i as u16 + 1;
        let next = if number == 1 {
            first_payload
        } else {
            PayloadType::None.to_u8()
        };
        let skf = SkfHeader::new(number, total)?;
        let sk = SkPayload::encrypt(header, next, Some(skf), chunk, cipher, rng)?;
        packets.push(sk.encode_message()?);
    }

    logging::log_fragments_built(header.message_id, total, fragmentation.max_fragment_size);
    Ok(packets)
}
