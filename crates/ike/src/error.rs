//! Error types for IKEv2 cryptographic framing
//!
//! Every error carries one of three kinds (see [`ErrorKind`]). The session
//! layer above this crate uses the kind to pick its reaction: answer the peer
//! with INVALID_SYNTAX, drop the exchange as unauthenticated, or treat the
//! failure as a local bug.

use std::fmt;

/// Result type for IKE framing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Structural violation in received bytes
    InvalidSyntax,
    /// Integrity, authentication or key agreement failure
    Security,
    /// Caller contract violation or local failure (RNG, cipher setup)
    Contract,
}

/// IKE framing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed message or payload
    InvalidSyntax(String),

    /// KE payload public value does not match its group's width
    InvalidKePayload {
        /// Diffie-Hellman group number
        group: u16,
        /// Width defined by the group
        expected: usize,
        /// Received public value length
        actual: usize,
    },

    /// Buffer too short for operation
    BufferTooShort {
        /// Required length
        required: usize,
        /// Available length
        available: usize,
    },

    /// Invalid length field
    InvalidLength {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Pad length byte points outside the decrypted data
    InvalidPadding {
        /// Pad length read from the last byte
        pad_len: usize,
        /// Decrypted length including padding
        available: usize,
    },

    /// Unsupported protocol version
    UnsupportedVersion(u8),

    /// Unsupported exchange type
    UnsupportedExchangeType(u8),

    /// Message too large
    MessageTooLarge(u32),

    /// Unrecognized payload marked critical
    UnsupportedCriticalPayload(u8),

    /// Peer used a different Diffie-Hellman group than the local key pair
    DhGroupMismatch {
        /// Group of the local key pair
        local: u16,
        /// Group carried by the peer's payload
        peer: u16,
    },

    /// Integrity checksum did not match
    IntegrityCheckFailed,

    /// AEAD authentication failed
    AuthenticationFailed(String),

    /// Peer Diffie-Hellman public value rejected
    InvalidPublicValue(String),

    /// Local cryptographic failure (RNG, cipher setup)
    CryptoError(String),

    /// Invalid key length
    InvalidKeyLength {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Invalid IV length
    InvalidIvLength {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Invalid parameter supplied by the caller
    InvalidParameter(String),

    /// Internal error (should not happen)
    Internal(String),
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidSyntax(_)
            | Error::InvalidKePayload { .. }
            | Error::BufferTooShort { .. }
            | Error::InvalidLength { .. }
            | Error::InvalidPadding { .. }
            | Error::UnsupportedVersion(_)
            | Error::UnsupportedExchangeType(_)
            | Error::MessageTooLarge(_)
            | Error::UnsupportedCriticalPayload(_)
            | Error::DhGroupMismatch { .. } => ErrorKind::InvalidSyntax,
            Error::IntegrityCheckFailed
            | Error::AuthenticationFailed(_)
            | Error::InvalidPublicValue(_) => ErrorKind::Security,
            Error::CryptoError(_)
            | Error::InvalidKeyLength { .. }
            | Error::InvalidIvLength { .. }
            | Error::InvalidParameter(_)
            | Error::Internal(_) => ErrorKind::Contract,
        }
    }

    /// True for integrity, authentication and key agreement failures
    pub fn is_security_failure(&self) -> bool {
        self.kind() == ErrorKind::Security
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidSyntax(msg) => write!(f, "Invalid syntax: {}", msg),
            Error::InvalidKePayload {
                group,
                expected,
                actual,
            } => write!(
                f,
                "Invalid KE payload: DH group {} expects {} bytes of key exchange data, got {}",
                group, expected, actual
            ),
            Error::BufferTooShort {
                required,
                available,
            } => {
                write!(
                    f,
                    "Buffer too short: need {} bytes, have {}",
                    required, available
                )
            }
            Error::InvalidLength { expected, actual } => {
                write!(f, "Invalid length: expected {}, got {}", expected, actual)
            }
            Error::InvalidPadding { pad_len, available } => write!(
                f,
                "Invalid padding: pad length {} exceeds {} decrypted bytes",
                pad_len, available
            ),
            Error::UnsupportedVersion(v) => {
                write!(f, "Unsupported IKE version: 0x{:02x}", v)
            }
            Error::UnsupportedExchangeType(t) => {
                write!(f, "Unsupported exchange type: {}", t)
            }
            Error::MessageTooLarge(size) => {
                write!(f, "IKE message too large: {} bytes", size)
            }
            Error::UnsupportedCriticalPayload(t) => {
                write!(f, "Unsupported critical payload: {}", t)
            }
            Error::DhGroupMismatch { local, peer } => write!(
                f,
                "DH group mismatch: local key pair uses group {}, peer sent group {}",
                local, peer
            ),
            Error::IntegrityCheckFailed => write!(f, "Integrity checksum verification failed"),
            Error::AuthenticationFailed(msg) => write!(f, "Authentication failed: {}", msg),
            Error::InvalidPublicValue(msg) => write!(f, "Invalid DH public value: {}", msg),
            Error::CryptoError(msg) => write!(f, "Cryptographic error: {}", msg),
            Error::InvalidKeyLength { expected, actual } => {
                write!(f, "Invalid key length: expected {}, got {}", expected, actual)
            }
            Error::InvalidIvLength { expected, actual } => {
                write!(f, "Invalid IV length: expected {}, got {}", expected, actual)
            }
            Error::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
