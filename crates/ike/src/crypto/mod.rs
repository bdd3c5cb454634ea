//! Cryptographic primitives for IKEv2
//!
//! - Diffie-Hellman groups (MODP and Curve25519)
//! - AEAD and CBC ciphers for SK payloads
//! - Truncated HMAC integrity algorithms
//! - PRF and IKE SA key derivation

pub mod cipher;
pub mod dh;
pub mod integrity;
pub mod prf;

pub use self::cipher::*;
pub use dh::*;
pub use integrity::*;
pub use prf::*;
