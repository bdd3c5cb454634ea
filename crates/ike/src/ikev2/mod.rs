//! IKEv2 payload framing
//!
//! This module covers the parts of an IKEv2 message that carry keys and
//! ciphertext:
//!
//! 1. **KE**: Diffie-Hellman public values (RFC 7296 Section 3.4)
//! 2. **SK**: Encrypted and Authenticated payload (RFC 7296 Section 3.14)
//! 3. **SKF**: Encrypted fragments and their reassembly (RFC 7383)
//!
//! # Message Flow
//!
//! ```text
//! outbound:  inner payloads --encode_payload_chain--> plaintext
//!            plaintext --encrypt_and_encode--> one SK packet or N SKF packets
//!
//! inbound:   packet --FragmentReassembler::process--> DecryptedMessage
//!            DecryptedMessage::payloads --> inner payloads
//! ```
//!
//! # References
//!
//! - [RFC 7296](https://datatracker.ietf.org/doc/html/rfc7296) - IKEv2 Protocol
//! - [RFC 7383](https://datatracker.ietf.org/doc/html/rfc7383) - IKEv2 Message Fragmentation

pub mod constants;
pub mod encrypted;
pub mod fragment;
pub mod ke;
pub mod message;
pub mod payload;
pub mod sk;

pub use constants::*;
pub use encrypted::*;
pub use fragment::*;
pub use ke::*;
pub use message::*;
pub use payload::*;
pub use sk::*;
