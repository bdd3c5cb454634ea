//! Fuzz target for KE payload parsing.
//!
//! Run with:
//! ```bash
//! cd crates/ike
//! cargo +nightly fuzz run ke_payload -- -max_total_time=300
//! ```

#![no_main]
use fynx_ike::ikev2::KePayload;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(ke) = KePayload::from_payload_data(data, false) {
        let serialized = ke.to_payload_data();
        let reparsed =
            KePayload::from_payload_data(&serialized, false).expect("Re-encoded KE must parse");

        assert_eq!(ke, reparsed);
    }
});
