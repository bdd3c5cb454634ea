//! IKE message header
//!
//! Implements the fixed header of RFC 7296 Section 3.1. Every SK or SKF
//! packet starts with it, and it is covered by the packet's checksum.

use super::constants::*;
use crate::{Error, Result};

/// IKE message header (28 bytes)
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                       IKE SA Initiator's SPI                  |
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                       IKE SA Responder's SPI                  |
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Next Payload | MjVer | MnVer | Exchange Type |     Flags     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          Message ID                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                            Length                             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IkeHeader {
    /// Initiator's Security Parameter Index (8 bytes)
    pub initiator_spi: [u8; 8],

    /// Responder's Security Parameter Index (8 bytes)
    pub responder_spi: [u8; 8],

    /// Next payload type
    pub next_payload: PayloadType,

    /// Protocol version (must be 0x20 for IKEv2)
    pub version: u8,

    /// Exchange type
    pub exchange_type: ExchangeType,

    /// Message flags
    pub flags: IkeFlags,

    /// Message ID
    pub message_id: u32,

    /// Total message length in bytes (including header)
    pub length: u32,
}

impl IkeHeader {
    /// Create a new IKE header
    pub fn new(
        initiator_spi: [u8; 8],
        responder_spi: [u8; 8],
        next_payload: PayloadType,
        exchange_type: ExchangeType,
        flags: IkeFlags,
        message_id: u32,
        length: u32,
    ) -> Self {
        IkeHeader {
            initiator_spi,
            responder_spi,
            next_payload,
            version: IKE_VERSION,
            exchange_type,
            flags,
            message_id,
            length,
        }
    }

    /// Parse IKE header from bytes
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Buffer is too short (< 28 bytes)
    /// - Next payload type is unknown
    /// - Protocol version is not 0x20
    /// - Exchange type is unknown
    /// - Message length is out of range
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < IKE_HEADER_SIZE {
            return Err(Error::BufferTooShort {
                required: IKE_HEADER_SIZE,
                available: data.len(),
            });
        }

        let mut initiator_spi = [0u8; 8];
        let mut responder_spi = [0u8; 8];
        initiator_spi.copy_from_slice(&data[0..8]);
        responder_spi.copy_from_slice(&data[8..16]);

        let next_payload = PayloadType::from_u8(data[16])
            .ok_or_else(|| Error::InvalidSyntax(format!("Unknown payload type: {}", data[16])))?;

        let version = data[17];
        if version != IKE_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        let exchange_type = ExchangeType::from_u8(data[18])
            .ok_or(Error::UnsupportedExchangeType(data[18]))?;

        let flags = IkeFlags::new(data[19]);
        let message_id = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
        let length = u32::from_be_bytes([data[24], data[25], data[26], data[27]]);

        let header = IkeHeader {
            initiator_spi,
            responder_spi,
            next_payload,
            version,
            exchange_type,
            flags,
            message_id,
            length,
        };
        header.validate()?;

        Ok(header)
    }

    /// Serialize IKE header to bytes
    pub fn to_bytes(&self) -> [u8; IKE_HEADER_SIZE] {
        let mut bytes = [0u8; IKE_HEADER_SIZE];

        bytes[0..8].copy_from_slice(&self.initiator_spi);
        bytes[8..16].copy_from_slice(&self.responder_spi);
        bytes[16] = self.next_payload.to_u8();
        bytes[17] = self.version;
        bytes[18] = self.exchange_type.to_u8();
        bytes[19] = self.flags.value();
        bytes[20..24].copy_from_slice(&self.message_id.to_be_bytes());
        bytes[24..28].copy_from_slice(&self.length.to_be_bytes());

        bytes
    }

    /// Validate header fields
    pub fn validate(&self) -> Result<()> {
        if self.version != IKE_VERSION {
            return Err(Error::UnsupportedVersion(self.version));
        }

        if self.length > MAX_IKE_MESSAGE_SIZE {
            return Err(Error::MessageTooLarge(self.length));
        }

        if self.length < IKE_HEADER_SIZE as u32 {
            return Err(Error::InvalidLength {
                expected: IKE_HEADER_SIZE,
                actual: self.length as usize,
            });
        }

        Ok(())
    }

    /// Copy of this header with a different total length
    pub fn with_length(&self, length: u32) -> Self {
        IkeHeader {
            length,
            ..self.clone()
        }
    }

    /// Copy of this header introducing an SK (or SKF when `fragmented`)
    /// payload of a message `length` bytes long
    ///
    /// # Errors
    ///
    /// Returns `MessageTooLarge` if `length` exceeds the IKE maximum.
    pub fn for_protected_payload(&self, fragmented: bool, length: usize) -> Result<Self> {
        let length = u32::try_from(length)
            .ok()
            .filter(|len| *len <= MAX_IKE_MESSAGE_SIZE)
            .ok_or(Error::MessageTooLarge(length.min(u32::MAX as usize) as u32))?;

        let next_payload = if fragmented {
            PayloadType::SKF
        } else {
            PayloadType::SK
        };

        Ok(IkeHeader {
            next_payload,
            length,
            ..self.clone()
        })
    }

    /// True if both headers belong to the same exchange
    pub fn same_exchange(&self, other: &IkeHeader) -> bool {
        self.initiator_spi == other.initiator_spi
            && self.responder_spi == other.responder_spi
            && self.exchange_type == other.exchange_type
            && self.message_id == other.message_id
            && self.flags.is_response() == other.flags.is_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> IkeHeader {
        IkeHeader::new(
            [1, 2, 3, 4, 5, 6, 7, 8],
            [9, 10, 11, 12, 13, 14, 15, 16],
            PayloadType::SK,
            ExchangeType::IkeAuth,
            IkeFlags::request(true),
            1,
            100,
        )
    }

    #[test]
    fn test_header_roundtrip() {
        let header = sample_header();
        let bytes = header.to_bytes();
        let parsed = IkeHeader::from_bytes(&bytes).unwrap();
        assert_eq!(header, parsed);
    }

    #[test]
    fn test_header_parse() {
        let mut data = vec![0u8; 28];
        data[0..8].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        data[8..16].copy_from_slice(&[9, 10, 11, 12, 13, 14, 15, 16]);
        data[16] = 53; // SKF
        data[17] = 0x20;
        data[18] = 35; // IKE_AUTH
        data[19] = 0x08;
        data[20..24].copy_from_slice(&42u32.to_be_bytes());
        data[24..28].copy_from_slice(&100u32.to_be_bytes());

        let header = IkeHeader::from_bytes(&data).unwrap();

        assert_eq!(header.next_payload, PayloadType::SKF);
        assert_eq!(header.exchange_type, ExchangeType::IkeAuth);
        assert!(header.flags.is_initiator());
        assert_eq!(header.message_id, 42);
        assert_eq!(header.length, 100);
    }

    #[test]
    fn test_buffer_too_short() {
        let result = IkeHeader::from_bytes(&[0u8; 27]);
        assert!(matches!(result, Err(Error::BufferTooShort { .. })));
    }

    #[test]
    fn test_invalid_version() {
        let mut data = sample_header().to_bytes();
        data[17] = 0x10;
        assert!(matches!(
            IkeHeader::from_bytes(&data),
            Err(Error::UnsupportedVersion(0x10))
        ));
    }

    #[test]
    fn test_unknown_exchange_type() {
        let mut data = sample_header().to_bytes();
        data[18] = 99;
        assert!(matches!(
            IkeHeader::from_bytes(&data),
            Err(Error::UnsupportedExchangeType(99))
        ));
    }

    #[test]
    fn test_unknown_next_payload() {
        let mut data = sample_header().to_bytes();
        data[16] = 200;
        assert!(matches!(
            IkeHeader::from_bytes(&data),
            Err(Error::InvalidSyntax(_))
        ));
    }

    #[test]
    fn test_length_bounds() {
        let mut data = sample_header().to_bytes();
        data[24..28].copy_from_slice(&70000u32.to_be_bytes());
        assert!(matches!(
            IkeHeader::from_bytes(&data),
            Err(Error::MessageTooLarge(70000))
        ));

        data[24..28].copy_from_slice(&20u32.to_be_bytes());
        assert!(matches!(
            IkeHeader::from_bytes(&data),
            Err(Error::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_for_protected_payload() {
        let header = sample_header().with_length(0);

        let sk = header.for_protected_payload(false, 80).unwrap();
        assert_eq!(sk.next_payload, PayloadType::SK);
        assert_eq!(sk.length, 80);

        let skf = header.for_protected_payload(true, 1280).unwrap();
        assert_eq!(skf.next_payload, PayloadType::SKF);
        assert_eq!(skf.message_id, header.message_id);

        assert!(matches!(
            header.for_protected_payload(false, 65536),
            Err(Error::MessageTooLarge(65536))
        ));
    }

    #[test]
    fn test_same_exchange() {
        let a = sample_header();
        let mut b = a.with_length(500);
        assert!(a.same_exchange(&b));

        b.message_id = 2;
        assert!(!a.same_exchange(&b));

        let mut c = a.clone();
        c.exchange_type = ExchangeType::Informational;
        assert!(!a.same_exchange(&c));
    }
}
