//! Key Exchange payload (RFC 7296 Section 3.4)
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! | Next Payload  |C|  RESERVED   |         Payload Length        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |   Diffie-Hellman Group Num    |           RESERVED            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                                                               |
//! ~                       Key Exchange Data                       ~
//! |                                                               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! [`KePayload`] is the wire view of a payload, local or received.
//! [`PendingKeyExchange`] is the local side of an exchange in progress: it
//! owns the private key and is consumed when the shared secret is computed.

use super::payload::PayloadHeader;
use crate::crypto::dh::{DhGroup, DhPrivateKey};
use crate::{logging, Error, Result};
use ring::rand::SecureRandom;
use zeroize::Zeroizing;

/// Size of the group number and reserved field
const KE_FIXED_SIZE: usize = 4;

/// Largest public value that fits a 16-bit payload length
pub const MAX_KE_DATA_LEN: usize = u16::MAX as usize - PayloadHeader::SIZE - KE_FIXED_SIZE;

/// Key Exchange payload as carried on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KePayload {
    /// Diffie-Hellman group number
    pub dh_group: u16,

    /// Key exchange data (public value)
    pub key_data: Vec<u8>,
}

impl KePayload {
    /// Create a KE payload, checking the public value width for known groups
    ///
    /// # Errors
    ///
    /// - `InvalidKePayload` if a known group's public value has the wrong width
    /// - `InvalidParameter` if the public value exceeds [`MAX_KE_DATA_LEN`]
    pub fn new(dh_group: u16, key_data: Vec<u8>) -> Result<Self> {
        if key_data.len() > MAX_KE_DATA_LEN {
            return Err(Error::InvalidParameter(format!(
                "KE public value of {} bytes exceeds {}",
                key_data.len(),
                MAX_KE_DATA_LEN
            )));
        }

        if let Some(group) = DhGroup::from_u16(dh_group) {
            if key_data.len() != group.public_value_len() {
                return Err(Error::InvalidKePayload {
                    group: dh_group,
                    expected: group.public_value_len(),
                    actual: key_data.len(),
                });
            }
        }

        Ok(KePayload { dh_group, key_data })
    }

    /// Parse KE payload from data (without generic header)
    ///
    /// The critical bit has no meaning for KE and is accepted either way.
    /// Groups this crate does not implement are accepted without a width
    /// check so the caller can answer with INVALID_KE_PAYLOAD.
    ///
    /// # Errors
    ///
    /// - `BufferTooShort` if fewer than 4 bytes are present
    /// - `InvalidKePayload` if a known group's public value has the wrong
    ///   width
    pub fn from_payload_data(data: &[u8], _critical: bool) -> Result<Self> {
        if data.len() < KE_FIXED_SIZE {
            return Err(Error::BufferTooShort {
                required: KE_FIXED_SIZE,
                available: data.len(),
            });
        }

        let dh_group = u16::from_be_bytes([data[0], data[1]]);
        // bytes 2-3 reserved
        Self::new(dh_group, data[KE_FIXED_SIZE..].to_vec())
    }

    /// Serialize KE payload to bytes (without generic header)
    pub fn to_payload_data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(KE_FIXED_SIZE + self.key_data.len());
        data.extend_from_slice(&self.dh_group.to_be_bytes());
        data.extend_from_slice(&[0u8, 0u8]);
        data.extend_from_slice(&self.key_data);
        data
    }

    /// Get total payload length (header + data)
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `key_data` was grown past
    /// [`MAX_KE_DATA_LEN`] after construction.
    pub fn total_length(&self) -> Result<u16> {
        let length = PayloadHeader::SIZE + KE_FIXED_SIZE + self.key_data.len();
        u16::try_from(length).map_err(|_| {
            Error::InvalidParameter(format!("KE payload of {} bytes exceeds 65535", length))
        })
    }

    /// The group if it is one this crate implements
    pub fn group(&self) -> Option<DhGroup> {
        DhGroup::from_u16(self.dh_group)
    }
}

/// Local half of a key exchange
///
/// Holds the ephemeral private key until [`compute_shared_secret`] consumes
/// it. The private key is never serialized.
///
/// [`compute_shared_secret`]: PendingKeyExchange::compute_shared_secret
#[derive(Debug)]
pub struct PendingKeyExchange {
    group: DhGroup,
    public_value: Vec<u8>,
    private_key: DhPrivateKey,
}

impl PendingKeyExchange {
    /// Generate a fresh key pair for `group`
    pub fn generate(group: DhGroup, rng: &dyn SecureRandom) -> Result<Self> {
        let (private_key, public_value) = DhPrivateKey::generate(group, rng)?;
        if public_value.len() != group.public_value_len() {
            return Err(Error::Internal(format!(
                "Generated {} byte public value for group {}",
                public_value.len(),
                group.to_u16()
            )));
        }

        logging::log_ke_generated(group.to_u16(), public_value.len());

        Ok(PendingKeyExchange {
            group,
            public_value,
            private_key,
        })
    }

    /// Negotiated group
    pub fn group(&self) -> DhGroup {
        self.group
    }

    /// Local public value
    pub fn public_value(&self) -> &[u8] {
        &self.public_value
    }

    /// KE payload advertising the local public value
    pub fn payload(&self) -> KePayload {
        KePayload {
            dh_group: self.group.to_u16(),
            key_data: self.public_value.clone(),
        }
    }

    /// Serialize the local KE payload (without generic header)
    pub fn to_payload_data(&self) -> Vec<u8> {
        self.payload().to_payload_data()
    }

    /// Compute the shared secret with the peer's KE payload
    ///
    /// Consumes the pending exchange so the private key is used once.
    ///
    /// # Errors
    ///
    /// - `DhGroupMismatch` if the peer used another group
    /// - `InvalidKePayload` if the peer value has the wrong width
    /// - `InvalidPublicValue` if the peer value is rejected by the group
    pub fn compute_shared_secret(self, peer: &KePayload) -> Result<Zeroizing<Vec<u8>>> {
        if peer.dh_group != self.group.to_u16() {
            logging::log_ke_rejected(peer.dh_group, "group mismatch");
            return Err(Error::DhGroupMismatch {
                local: self.group.to_u16(),
                peer: peer.dh_group,
            });
        }

        self.compute_shared_secret_raw(&peer.key_data)
    }

    /// Compute the shared secret from a raw peer public value of the same group
    pub fn compute_shared_secret_raw(self, peer_public: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let group = self.group;
        match self.private_key.agree(peer_public) {
            Ok(secret) => {
                logging::log_shared_secret_derived(group.to_u16(), secret.len());
                Ok(secret)
            }
            Err(e) => {
                logging::log_ke_rejected(group.to_u16(), &e.to_string());
                Err(e)
            }
        }
    }
}
