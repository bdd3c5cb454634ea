//! IKEv2 key exchange and encrypted payload framing for the Fynx security
//! ecosystem.
//!
//! This crate implements the cryptographic framing layer of IKEv2:
//!
//! - **KE payload**: ephemeral key pairs for MODP groups 2, 5, 14, 15, 16 and
//!   Curve25519, and the Diffie-Hellman shared secret
//! - **Encrypted payload body**: `IV || ciphertext || checksum` with either a
//!   combined-mode cipher (AES-GCM, ChaCha20-Poly1305) or AES-CBC plus HMAC
//! - **SK/SKF messages**: full packet encoding, fragmentation and reassembly
//! - **Key derivation**: SKEYSEED and prf+
//!
//! Session state, proposal negotiation and transport are out of scope; the
//! caller passes negotiated algorithms and keys in.
//!
//! # Example
//!
//! ```rust
//! use fynx_ike::crypto::{AeadAlgorithm, DhGroup};
//! use fynx_ike::ikev2::{
//!     encrypt_and_encode, ExchangeType, FragmentReassembler, DecodeOutcome, IkeFlags,
//!     IkeHeader, PayloadType, PendingKeyExchange, SkTransform,
//! };
//! use fynx_ike::FragmentationConfig;
//! use ring::rand::SystemRandom;
//!
//! let rng = SystemRandom::new();
//!
//! // Both sides agree on a shared secret
//! let initiator = PendingKeyExchange::generate(DhGroup::Curve25519, &rng).unwrap();
//! let responder = PendingKeyExchange::generate(DhGroup::Curve25519, &rng).unwrap();
//! let responder_ke = responder.payload();
//! let secret = initiator.compute_shared_secret(&responder_ke).unwrap();
//! assert_eq!(secret.len(), 32);
//!
//! // Protect a message (keys would normally come from KeyMaterial)
//! let transform = SkTransform::Combined(AeadAlgorithm::AesGcm16_128);
//! let cipher = transform.with_keys(&[0x42; 20], &[]);
//! let header = IkeHeader::new(
//!     [1; 8], [2; 8], PayloadType::SK, ExchangeType::IkeAuth,
//!     IkeFlags::request(true), 1, 0,
//! );
//! let packets = encrypt_and_encode(
//!     &header, PayloadType::N.to_u8(), &[0, 0, 0, 8, 0, 0, 0x40, 0x04],
//!     &cipher, &FragmentationConfig::default(), &rng,
//! ).unwrap();
//!
//! let mut reassembler = FragmentReassembler::new();
//! match reassembler.process(&packets[0], &cipher).unwrap() {
//!     DecodeOutcome::Complete(msg) => assert_eq!(msg.payloads().unwrap().len(), 1),
//!     DecodeOutcome::Partial { .. } => unreachable!(),
//! }
//! ```
//!
//! # Security
//!
//! - Cryptographic operations use vetted libraries (`ring`, RustCrypto)
//! - Constant-time checksum comparison
//! - Private keys and derived keys are zeroized with `zeroize`
//! - No plaintext is released before the checksum or tag verifies
//!
//! # References
//!
//! - [RFC 7296](https://datatracker.ietf.org/doc/html/rfc7296) - IKEv2 Protocol
//! - [RFC 7383](https://datatracker.ietf.org/doc/html/rfc7383) - IKEv2 Message Fragmentation
//! - [RFC 3526](https://datatracker.ietf.org/doc/html/rfc3526) - MODP Diffie-Hellman groups
//! - [RFC 8031](https://datatracker.ietf.org/doc/html/rfc8031) - Curve25519 for IKEv2
//! - [RFC 5282](https://datatracker.ietf.org/doc/html/rfc5282) - AES-GCM in IKEv2
//! - [RFC 7634](https://datatracker.ietf.org/doc/html/rfc7634) - ChaCha20-Poly1305 in IKEv2

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod config;
pub mod crypto;
pub mod error;
pub mod ikev2;
pub mod logging;

pub use config::{FragmentationConfig, FragmentationConfigBuilder};
pub use error::{Error, ErrorKind, Result};
