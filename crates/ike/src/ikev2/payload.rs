//! Generic payload header and payload chains
//!
//! Implements the generic header of RFC 7296 Section 3.2 and the
//! next-payload chain carried inside a decrypted SK payload.

use super::constants::{PayloadType, CRITICAL_FLAG, GENERIC_PAYLOAD_HEADER_SIZE};
use crate::{Error, Result};

/// Generic IKE payload header (4 bytes)
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Next Payload  |C|  RESERVED   |         Payload Length        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// The next payload byte is kept raw so unknown types can be skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadHeader {
    /// Next payload type
    pub next_payload: u8,

    /// Critical bit (if set, must understand this payload)
    pub critical: bool,

    /// Total payload length including header (4 bytes + data)
    pub length: u16,
}

impl PayloadHeader {
    /// Payload header size
    pub const SIZE: usize = GENERIC_PAYLOAD_HEADER_SIZE;

    /// Create new payload header
    pub fn new(next_payload: u8, critical: bool, length: u16) -> Self {
        PayloadHeader {
            next_payload,
            critical,
            length,
        }
    }

    /// Parse payload header from bytes
    ///
    /// # Errors
    ///
    /// Returns error if buffer is too short or the length field is smaller
    /// than the header itself
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(Error::BufferTooShort {
                required: Self::SIZE,
                available: data.len(),
            });
        }

        let next_payload = data[0];
        let critical = (data[1] & CRITICAL_FLAG) != 0;
        let length = u16::from_be_bytes([data[2], data[3]]);

        if (length as usize) < Self::SIZE {
            return Err(Error::InvalidLength {
                expected: Self::SIZE,
                actual: length as usize,
            });
        }

        Ok(PayloadHeader {
            next_payload,
            critical,
            length,
        })
    }

    /// Serialize payload header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0] = self.next_payload;
        bytes[1] = if self.critical { CRITICAL_FLAG } else { 0x00 };
        bytes[2..4].copy_from_slice(&self.length.to_be_bytes());
        bytes
    }

    /// Next payload as a known type, if it is one
    pub fn next_payload_type(&self) -> Option<PayloadType> {
        PayloadType::from_u8(self.next_payload)
    }

    /// Get payload data length (excluding header)
    pub fn data_length(&self) -> usize {
        self.length as usize - Self::SIZE
    }
}

/// One payload of a chain, body kept undecoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload {
    /// Payload type (taken from the previous header's next payload field)
    pub payload_type: u8,

    /// Critical bit from this payload's header
    pub critical: bool,

    /// Payload data (excluding header)
    pub data: Vec<u8>,
}

impl RawPayload {
    /// Create a non-critical payload
    pub fn new(payload_type: PayloadType, data: Vec<u8>) -> Self {
        RawPayload {
            payload_type: payload_type.to_u8(),
            critical: false,
            data,
        }
    }

    /// Payload type if known
    pub fn known_type(&self) -> Option<PayloadType> {
        PayloadType::from_u8(self.payload_type)
    }

    /// Get total payload length (header + data)
    pub fn total_length(&self) -> usize {
        PayloadHeader::SIZE + self.data.len()
    }
}

/// Split decrypted SK plaintext into its payload chain
///
/// `first_payload` comes from the SK header's next payload field. Parsing
/// stops at a next payload of 0, which must coincide with the end of
/// `data`.
///
/// # Errors
///
/// - `BufferTooShort` / `InvalidLength` on a truncated payload
/// - `InvalidSyntax` on trailing bytes after the last payload, or on a
///   nested SK/SKF payload
/// - `UnsupportedCriticalPayload` for an unknown type with the critical bit
pub fn parse_payload_chain(first_payload: u8, data: &[u8]) -> Result<Vec<RawPayload>> {
    let mut payloads = Vec::new();
    let mut current = first_payload;
    let mut offset = 0;

    while current != PayloadType::None.to_u8() {
        let remaining = &data[offset..];
        let header = PayloadHeader::from_bytes(remaining)?;

        if remaining.len() < header.length as usize {
            return Err(Error::BufferTooShort {
                required: header.length as usize,
                available: remaining.len(),
            });
        }

        match PayloadType::from_u8(current) {
            Some(kind) if kind.is_protected() => {
                return Err(Error::InvalidSyntax(format!(
                    "Nested encrypted payload {} inside SK",
                    current
                )));
            }
            None if header.critical => {
                return Err(Error::UnsupportedCriticalPayload(current));
            }
            _ => {}
        }

        payloads.push(RawPayload {
            payload_type: current,
            critical: header.critical,
            data: remaining[PayloadHeader::SIZE..header.length as usize].to_vec(),
        });

        offset += header.length as usize;
        current = header.next_payload;
    }

    if offset != data.len() {
        return Err(Error::InvalidSyntax(format!(
            "{} trailing bytes after last payload",
            data.len() - offset
        )));
    }

    Ok(payloads)
}

/// Join payloads into a chain, returning the first payload type and the bytes
///
/// An empty slice encodes as `(0, [])`.
pub fn encode_payload_chain(payloads: &[RawPayload]) -> Result<(u8, Vec<u8>)> {
    let first = payloads
        .first()
        .map(|p| p.payload_type)
        .unwrap_or(PayloadType::None.to_u8());

    let mut out = Vec::with_capacity(payloads.iter().map(RawPayload::total_length).sum());
    for (i, payload) in payloads.iter().enumerate() {
        let length = u16::try_from(payload.total_length()).map_err(|_| {
            Error::InvalidParameter(format!(
                "Payload of {} bytes exceeds 65535",
                payload.total_length()
            ))
        })?;
        let next = payloads
            .get(i + 1)
            .map(|p| p.payload_type)
            .unwrap_or(PayloadType::None.to_u8());

        out.extend_from_slice(&PayloadHeader::new(next, payload.critical, length).to_bytes());
        out.extend_from_slice(&payload.data);
    }

    Ok((first, out))
}
