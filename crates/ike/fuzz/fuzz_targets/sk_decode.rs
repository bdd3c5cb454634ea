//! Fuzz target for SK/SKF message decoding and fragment reassembly.
//!
//! Every input must be rejected cleanly: random bytes never carry a valid
//! checksum under the fixed keys.
//!
//! Run with:
//! ```bash
//! cd crates/ike
//! cargo +nightly fuzz run sk_decode -- -max_total_time=300
//! ```

#![no_main]
use fynx_ike::crypto::{AeadAlgorithm, BlockCipherAlgorithm, IntegrityAlgorithm};
use fynx_ike::ikev2::{FragmentReassembler, SkPayload, SkTransform};
use libfuzzer_sys::fuzz_target;

static ENC_KEY: [u8; 20] = [0x11; 20];
static INTEG_KEY: [u8; 32] = [0x22; 32];

fuzz_target!(|data: &[u8]| {
    let aead = SkTransform::Combined(AeadAlgorithm::AesGcm16_128).with_keys(&ENC_KEY, &[]);
    let cbc = SkTransform::Separate {
        cipher: BlockCipherAlgorithm::AesCbc128,
        integrity: IntegrityAlgorithm::HmacSha256_128,
    }
    .with_keys(&ENC_KEY[..16], &INTEG_KEY);

    for cipher in [aead, cbc] {
        assert!(SkPayload::decode_message(data, &cipher).is_err());

        let mut reassembler = FragmentReassembler::new();
        assert!(reassembler.process(data, &cipher).is_err());
        assert!(!reassembler.is_in_progress());
    }
});
