//! Diffie-Hellman groups for IKEv2 key exchange (RFC 7296 Section 3.4).
//!
//! Two families are supported:
//! - MODP finite-field groups 2, 5, 14, 15 and 16 (RFC 2409, RFC 3526)
//! - Curve25519 (group 31, RFC 8031)
//!
//! # Security
//!
//! - MODP peer values are range checked (1 < y < p-1)
//! - X25519 agreement rejects low-order points
//! - Private keys are zeroized on drop

use crate::{Error, Result};
use num_bigint::BigUint;
use once_cell::sync::Lazy;
use ring::agreement::{agree_ephemeral, EphemeralPrivateKey, UnparsedPublicKey, X25519};
use ring::rand::SecureRandom;
use zeroize::Zeroizing;

/// Length of a raw X25519 public key
pub const X25519_PUBLIC_KEY_LEN: usize = 32;

/// DER prefix of an X.509 SubjectPublicKeyInfo carrying a 32-byte X25519 key
///
/// `SEQUENCE { SEQUENCE { OID 1.3.101.110 } BIT STRING (0 unused bits) }`
pub const X25519_SPKI_HEADER: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x6e, 0x03, 0x21, 0x00,
];

/// MODP prime constants (RFC 2409 Section 6, RFC 3526)
mod modp {
    use num_bigint::BigUint;
    use once_cell::sync::Lazy;

    fn parse(hex_str: &str) -> BigUint {
        let digits: String = hex_str.chars().filter(|c| !c.is_whitespace()).collect();
        BigUint::parse_bytes(digits.as_bytes(), 16).unwrap_or_default()
    }

    /// 1024-bit MODP prime (group 2)
    pub static P_1024: Lazy<BigUint> = Lazy::new(|| {
        parse(
            "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD1
             29024E088A67CC74020BBEA63B139B22514A08798E3404DD
             EF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245
             E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED
             EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE65381
             FFFFFFFFFFFFFFFF",
        )
    });

    /// 1536-bit MODP prime (group 5)
    pub static P_1536: Lazy<BigUint> = Lazy::new(|| {
        parse(
            "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD1
             29024E088A67CC74020BBEA63B139B22514A08798E3404DD
             EF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245
             E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED
             EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3D
             C2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F
             83655D23DCA3AD961C62F356208552BB9ED529077096966D
             670C354E4ABC9804F1746C08CA237327FFFFFFFFFFFFFFFF",
        )
    });

    /// 2048-bit MODP prime (group 14)
    pub static P_2048: Lazy<BigUint> = Lazy::new(|| {
        parse(
            "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD1
             29024E088A67CC74020BBEA63B139B22514A08798E3404DD
             EF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245
             E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED
             EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3D
             C2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F
             83655D23DCA3AD961C62F356208552BB9ED529077096966D
             670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B
             E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9
             DE2BCBF6955817183995497CEA956AE515D2261898FA0510
             15728E5A8AACAA68FFFFFFFFFFFFFFFF",
        )
    });

    /// 3072-bit MODP prime (group 15)
    pub static P_3072: Lazy<BigUint> = Lazy::new(|| {
        parse(
            "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD1
             29024E088A67CC74020BBEA63B139B22514A08798E3404DD
             EF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245
             E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED
             EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3D
             C2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F
             83655D23DCA3AD961C62F356208552BB9ED529077096966D
             670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B
             E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9
             DE2BCBF6955817183995497CEA956AE515D2261898FA0510
             15728E5A8AAAC42DAD33170D04507A33A85521ABDF1CBA64
             ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7
             ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6B
             F12FFA06D98A0864D87602733EC86A64521F2B18177B200C
             BBE117577A615D6C770988C0BAD946E208E24FA074E5AB31
             43DB5BFCE0FD108E4B82D120A93AD2CAFFFFFFFFFFFFFFFF",
        )
    });

    /// 4096-bit MODP prime (group 16)
    pub static P_4096: Lazy<BigUint> = Lazy::new(|| {
        parse(
            "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD1
             29024E088A67CC74020BBEA63B139B22514A08798E3404DD
             EF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245
             E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED
             EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3D
             C2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F
             83655D23DCA3AD961C62F356208552BB9ED529077096966D
             670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B
             E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9
             DE2BCBF6955817183995497CEA956AE515D2261898FA0510
             15728E5A8AAAC42DAD33170D04507A33A85521ABDF1CBA64
             ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7
             ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6B
             F12FFA06D98A0864D87602733EC86A64521F2B18177B200C
             BBE117577A615D6C770988C0BAD946E208E24FA074E5AB31
             43DB5BFCE0FD108E4B82D120A92108011A723C12A787E6D7
             88719A10BDBA5B2699C327186AF4E23C1A946834B6150BDA
             2583E9CA2AD44CE8DBBBC2DB04DE8EF92E8EFC141FBECAA6
             287C59474E6BC05D99B2964FA090C3A2233BA186515BE7ED
             1F612970CEE2D7AFB81BDD762170481CD0069127D5B05AA9
             93B4EA988D8FDDC186FFB7DC90A6C08F4DF435C934063199
             FFFFFFFFFFFFFFFF",
        )
    });
}

/// Shared MODP generator
static GENERATOR: Lazy<BigUint> = Lazy::new(|| BigUint::from(2u32));

/// Diffie-Hellman groups supported for key exchange (IANA Transform Type 4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum DhGroup {
    /// 1024-bit MODP group (2)
    Modp1024 = 2,
    /// 1536-bit MODP group (5)
    Modp1536 = 5,
    /// 2048-bit MODP group (14)
    Modp2048 = 14,
    /// 3072-bit MODP group (15)
    Modp3072 = 15,
    /// 4096-bit MODP group (16)
    Modp4096 = 16,
    /// Curve25519 (31)
    Curve25519 = 31,
}

impl DhGroup {
    /// All supported groups
    pub const ALL: [DhGroup; 6] = [
        DhGroup::Modp1024,
        DhGroup::Modp1536,
        DhGroup::Modp2048,
        DhGroup::Modp3072,
        DhGroup::Modp4096,
        DhGroup::Curve25519,
    ];

    /// Convert from u16, `None` for unsupported group numbers
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            2 => Some(DhGroup::Modp1024),
            5 => Some(DhGroup::Modp1536),
            14 => Some(DhGroup::Modp2048),
            15 => Some(DhGroup::Modp3072),
            16 => Some(DhGroup::Modp4096),
            31 => Some(DhGroup::Curve25519),
            _ => None,
        }
    }

    /// Convert to u16
    pub fn to_u16(self) -> u16 {
        self as u16
    }

    /// Exact length of the key exchange data on the wire
    pub fn public_value_len(self) -> usize {
        match self {
            DhGroup::Modp1024 => 128,
            DhGroup::Modp1536 => 192,
            DhGroup::Modp2048 => 256,
            DhGroup::Modp3072 => 384,
            DhGroup::Modp4096 => 512,
            DhGroup::Curve25519 => X25519_PUBLIC_KEY_LEN,
        }
    }

    /// X.509 SubjectPublicKeyInfo prefix for curve groups
    ///
    /// The KE payload carries raw bytes; this is for peers and tools that
    /// store or exchange SPKI-encoded keys.
    pub fn spki_header(self) -> Option<&'static [u8]> {
        match self {
            DhGroup::Curve25519 => Some(&X25519_SPKI_HEADER as &[u8]),
            _ => None,
        }
    }

    /// Human-readable group name
    pub fn name(self) -> &'static str {
        match self {
            DhGroup::Modp1024 => "modp1024",
            DhGroup::Modp1536 => "modp1536",
            DhGroup::Modp2048 => "modp2048",
            DhGroup::Modp3072 => "modp3072",
            DhGroup::Modp4096 => "modp4096",
            DhGroup::Curve25519 => "curve25519",
        }
    }

    fn prime(self) -> Option<&'static BigUint> {
        match self {
            DhGroup::Modp1024 => Some(&*modp::P_1024),
            DhGroup::Modp1536 => Some(&*modp::P_1536),
            DhGroup::Modp2048 => Some(&*modp::P_2048),
            DhGroup::Modp3072 => Some(&*modp::P_3072),
            DhGroup::Modp4096 => Some(&*modp::P_4096),
            DhGroup::Curve25519 => None,
        }
    }

    /// Private exponent length in bytes, sized to twice the group strength
    /// (RFC 3526 Section 8)
    fn exponent_len(self) -> usize {
        match self {
            DhGroup::Modp1024 | DhGroup::Modp1536 => 32,
            DhGroup::Modp2048 => 40,
            DhGroup::Modp3072 => 52,
            DhGroup::Modp4096 => 60,
            DhGroup::Curve25519 => 0,
        }
    }
}

/// Ephemeral private key for one key exchange.
///
/// Consumed by [`DhPrivateKey::agree`], so it can be used exactly once.
pub enum DhPrivateKey {
    /// MODP private exponent (big-endian)
    Modp {
        /// Group the exponent belongs to
        group: DhGroup,
        /// Private exponent x
        exponent: Zeroizing<Vec<u8>>,
    },
    /// X25519 private key held by ring
    Curve25519(EphemeralPrivateKey),
}

impl std::fmt::Debug for DhPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DhPrivateKey")
            .field("group", &self.group())
            .finish_non_exhaustive()
    }
}

impl DhPrivateKey {
    /// Group this key belongs to
    pub fn group(&self) -> DhGroup {
        match self {
            DhPrivateKey::Modp { group, .. } => *group,
            DhPrivateKey::Curve25519(_) => DhGroup::Curve25519,
        }
    }

    /// Generate a key pair, returning the private key and the wire public value
    pub fn generate(group: DhGroup, rng: &dyn SecureRandom) -> Result<(Self, Vec<u8>)> {
        match group.prime() {
            Some(p) => {
                let mut exponent = Zeroizing::new(vec![0u8; group.exponent_len()]);
                rng.fill(&mut exponent)
                    .map_err(|_| Error::CryptoError("Failed to generate DH private key".into()))?;
                // Force full exponent length, which also keeps x >= 2
                exponent[0] |= 0x80;

                let x = BigUint::from_bytes_be(&exponent);
                let y = GENERATOR.modpow(&x, p);
                let public_value = left_pad(&y.to_bytes_be(), group.public_value_len())?;

                Ok((DhPrivateKey::Modp { group, exponent }, public_value))
            }
            None => {
                let private_key = EphemeralPrivateKey::generate(&X25519, rng).map_err(|_| {
                    Error::CryptoError("Failed to generate Curve25519 key".to_string())
                })?;
                let public_key = private_key.compute_public_key().map_err(|_| {
                    Error::CryptoError("Failed to compute Curve25519 public key".to_string())
                })?;

                Ok((
                    DhPrivateKey::Curve25519(private_key),
                    public_key.as_ref().to_vec(),
                ))
            }
        }
    }

    /// Compute the shared secret g^ir from the peer's raw public value
    ///
    /// The result is zero-left-padded to the group width (RFC 7296 Section 2.14).
    ///
    /// # Errors
    ///
    /// - `InvalidKePayload` if the peer value has the wrong width
    /// - `InvalidPublicValue` if the peer value is outside the valid range
    ///   or is a low-order curve point
    pub fn agree(self, peer_public: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let group = self.group();
        if peer_public.len() != group.public_value_len() {
            return Err(Error::InvalidKePayload {
                group: group.to_u16(),
                expected: group.public_value_len(),
                actual: peer_public.len(),
            });
        }

        match self {
            DhPrivateKey::Modp { group, exponent } => {
                let p = group
                    .prime()
                    .ok_or_else(|| Error::Internal("MODP group without prime".into()))?;
                let y_peer = BigUint::from_bytes_be(peer_public);

                // 1 < y < p-1 rejects the trivial subgroup {1, p-1}
                let p_minus_one = p.clone() - 1u32;
                if y_peer <= BigUint::from(1u32) || y_peer >= p_minus_one {
                    return Err(Error::InvalidPublicValue(format!(
                        "{} peer value out of range",
                        group.name()
                    )));
                }

                let x = BigUint::from_bytes_be(&exponent);
                let k = y_peer.modpow(&x, p);
                left_pad(&k.to_bytes_be(), group.public_value_len()).map(Zeroizing::new)
            }
            DhPrivateKey::Curve25519(private_key) => {
                let peer_public_key = UnparsedPublicKey::new(&X25519, peer_public);
                agree_ephemeral(private_key, &peer_public_key, |key_material| {
                    Zeroizing::new(key_material.to_vec())
                })
                .map_err(|_| {
                    Error::InvalidPublicValue("Curve25519 key agreement failed".to_string())
                })
            }
        }
    }
}

/// Wrap a raw X25519 public key in its X.509 SubjectPublicKeyInfo encoding
///
/// For interop with peers and tools that carry SPKI-encoded keys. The KE
/// payload itself always holds the raw 32 bytes.
pub fn encode_x25519_spki(raw: &[u8; X25519_PUBLIC_KEY_LEN]) -> Vec<u8> {
    let mut der = Vec::with_capacity(X25519_SPKI_HEADER.len() + X25519_PUBLIC_KEY_LEN);
    der.extend_from_slice(&X25519_SPKI_HEADER);
    der.extend_from_slice(raw);
    der
}

/// Strip the SubjectPublicKeyInfo header from an encoded X25519 public key
pub fn decode_x25519_spki(der: &[u8]) -> Result<[u8; X25519_PUBLIC_KEY_LEN]> {
    let expected = X25519_SPKI_HEADER.len() + X25519_PUBLIC_KEY_LEN;
    if der.len() != expected {
        return Err(Error::InvalidLength {
            expected,
            actual: der.len(),
        });
    }
    if der[..X25519_SPKI_HEADER.len()] != X25519_SPKI_HEADER {
        return Err(Error::InvalidSyntax(
            "Not an X25519 SubjectPublicKeyInfo".into(),
        ));
    }

    let mut raw = [0u8; X25519_PUBLIC_KEY_LEN];
    raw.copy_from_slice(&der[X25519_SPKI_HEADER.len()..]);
    Ok(raw)
}

/// Left-pad a big-endian value with zeros to exactly `width` bytes
fn left_pad(value: &[u8], width: usize) -> Result<Vec<u8>> {
    if value.len() > width {
        return Err(Error::Internal(format!(
            "DH value of {} bytes exceeds group width {}",
            value.len(),
            width
        )));
    }

    let mut padded = vec![0u8; width - value.len()];
    padded.extend_from_slice(value);
    Ok(padded)
}
