//! Structured logging for IKE framing operations
//!
//! Thin wrappers over `tracing` so that every call site emits the same field
//! names. Key material, shared secrets and plaintext are never passed in;
//! only lengths, group numbers and SPIs.
//!
//! # Log Levels
//!
//! - **TRACE**: Per-packet sizes and fragment bookkeeping
//! - **DEBUG**: Key exchange and encryption events
//! - **WARN**: Integrity failures and discarded fragments
//!
//! # Example
//!
//! ```no_run
//! use fynx_ike::logging;
//!
//! tracing_subscriber::fmt()
//!     .with_env_filter("fynx_ike=debug")
//!     .init();
//!
//! logging::log_ke_generated(31, 32);
//! ```

use tracing::{debug, trace, warn};

/// Log ephemeral key pair generation
///
/// # Arguments
///
/// * `dh_group` - Diffie-Hellman group number
/// * `public_len` - Length of the public value in bytes
pub fn log_ke_generated(dh_group: u16, public_len: usize) {
    debug!(
        dh_group = dh_group,
        public_len = public_len,
        "Generated ephemeral DH key pair"
    );
}

/// Log shared secret computation
pub fn log_shared_secret_derived(dh_group: u16, secret_len: usize) {
    debug!(
        dh_group = dh_group,
        secret_len = secret_len,
        "Computed DH shared secret"
    );
}

/// Log a rejected peer public value
///
/// # Arguments
///
/// * `dh_group` - Diffie-Hellman group number
/// * `reason` - Rejection reason
pub fn log_ke_rejected(dh_group: u16, reason: &str) {
    warn!(dh_group = dh_group, reason = reason, "Rejected peer KE payload");
}

/// Log SK payload encryption
///
/// # Arguments
///
/// * `spi_i` - Initiator SPI
/// * `message_id` - IKE message ID
/// * `plaintext_len` - Inner payload length before padding
/// * `pad_len` - Padding length
pub fn log_sk_encrypted(spi_i: &[u8], message_id: u32, plaintext_len: usize, pad_len: usize) {
    debug!(
        ike_spi_i = %hex::encode(spi_i),
        message_id = message_id,
        plaintext_len = plaintext_len,
        pad_len = pad_len,
        "Encrypted SK payload"
    );
}

/// Log SK payload decryption
pub fn log_sk_decrypted(body_len: usize, plaintext_len: usize) {
    trace!(
        body_len = body_len,
        plaintext_len = plaintext_len,
        "Decrypted SK payload"
    );
}

/// Log checksum or AEAD tag failure
///
/// # Arguments
///
/// * `mode` - "aead" or "hmac"
/// * `body_len` - Length of the encrypted body
pub fn log_integrity_failure(mode: &str, body_len: usize) {
    warn!(
        mode = mode,
        body_len = body_len,
        "SK payload failed integrity check"
    );
}

/// Log outbound fragmentation
///
/// # Arguments
///
/// * `message_id` - IKE message ID
/// * `total_fragments` - Number of SKF packets produced
/// * `max_fragment_size` - Configured packet size limit
pub fn log_fragments_built(message_id: u32, total_fragments: u16, max_fragment_size: usize) {
    debug!(
        message_id = message_id,
        total_fragments = total_fragments,
        max_fragment_size = max_fragment_size,
        "Split message into SKF fragments"
    );
}

/// Log an accepted inbound fragment
pub fn log_fragment_received(message_id: u32, fragment_number: u16, total_fragments: u16) {
    trace!(
        message_id = message_id,
        fragment_number = fragment_number,
        total_fragments = total_fragments,
        "Received SKF fragment"
    );
}

/// Log a discarded inbound fragment
///
/// # Arguments
///
/// * `message_id` - IKE message ID of the discarded packet
/// * `reason` - Why the fragment was dropped (e.g., "duplicate")
pub fn log_fragment_discarded(message_id: u32, reason: &str) {
    warn!(
        message_id = message_id,
        reason = reason,
        "Discarded SKF fragment"
    );
}

/// Log completed reassembly
pub fn log_reassembly_complete(message_id: u32, total_fragments: u16, plaintext_len: usize) {
    debug!(
        message_id = message_id,
        total_fragments = total_fragments,
        plaintext_len = plaintext_len,
        "Reassembled fragmented message"
    );
}
