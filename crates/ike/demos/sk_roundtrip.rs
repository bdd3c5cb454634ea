//! Protect an IKE_AUTH request end to end
//!
//! Runs a Curve25519 key exchange, derives the IKE SA keys, fragments a
//! large request and reassembles it on the responder side.
//!
//! Run with: `RUST_LOG=debug cargo run --example sk_roundtrip`

use fynx_ike::crypto::{AeadAlgorithm, DhGroup, KeyMaterial, PrfAlgorithm};
use fynx_ike::ikev2::{
    encode_payload_chain, encrypt_and_encode, DecodeOutcome, ExchangeType, FragmentReassembler,
    IkeFlags, IkeHeader, KePayload, PayloadType, PendingKeyExchange, RawPayload, SkTransform,
};
use fynx_ike::FragmentationConfig;
use ring::rand::{SecureRandom, SystemRandom};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let rng = SystemRandom::new();
    let group = DhGroup::Curve25519;
    let transform = SkTransform::Combined(AeadAlgorithm::AesGcm16_256);

    let mut spi_i = [0u8; 8];
    let mut spi_r = [0u8; 8];
    let mut nonce_i = [0u8; 32];
    let mut nonce_r = [0u8; 32];
    for buf in [&mut spi_i[..], &mut spi_r[..], &mut nonce_i[..], &mut nonce_r[..]] {
        rng.fill(buf).map_err(|_| "random generation failed")?;
    }

    // IKE_SA_INIT: exchange public values
    let initiator = PendingKeyExchange::generate(group, &rng)?;
    let responder = PendingKeyExchange::generate(group, &rng)?;
    let ke_i = KePayload::from_payload_data(&initiator.to_payload_data(), false)?;
    let ke_r = KePayload::from_payload_data(&responder.to_payload_data(), false)?;
    println!("KE payloads: {} bytes each", ke_i.total_length()?);

    let secret_i = initiator.compute_shared_secret(&ke_r)?;
    let secret_r = responder.compute_shared_secret(&ke_i)?;

    let prf = PrfAlgorithm::HmacSha256;
    let keys_i = KeyMaterial::derive_for(prf, transform, &nonce_i, &nonce_r, &secret_i, &spi_i, &spi_r)?;
    let keys_r = KeyMaterial::derive_for(prf, transform, &nonce_i, &nonce_r, &secret_r, &spi_i, &spi_r)?;

    // IKE_AUTH: a certificate-sized request
    let (first_payload, plaintext) = encode_payload_chain(&[
        RawPayload::new(PayloadType::IDi, vec![0x02; 24]),
        RawPayload::new(PayloadType::CERT, vec![0x30; 3000]),
        RawPayload::new(PayloadType::AUTH, vec![0x0E; 36]),
    ])?;

    let header = IkeHeader::new(
        spi_i,
        spi_r,
        PayloadType::SK,
        ExchangeType::IkeAuth,
        IkeFlags::request(true),
        1,
        0,
    );
    let config = FragmentationConfig::builder()
        .with_enabled(true)
        .with_max_fragment_size(1280)
        .build()?;

    let packets = encrypt_and_encode(
        &header,
        first_payload,
        &plaintext,
        &keys_i.initiator_cipher(transform)?,
        &config,
        &rng,
    )?;
    println!("Sent {} packets for {} plaintext bytes", packets.len(), plaintext.len());

    let cipher = keys_r.initiator_cipher(transform)?;
    let mut reassembler = FragmentReassembler::new();
    for packet in packets.iter().rev() {
        match reassembler.process(packet, &cipher)? {
            DecodeOutcome::Partial { received, total } => {
                println!("  fragment accepted ({}/{})", received, total)
            }
            DecodeOutcome::Complete(message) => {
                for payload in message.payloads()? {
                    println!("  payload {:?}: {} bytes", payload.known_type(), payload.data.len());
                }
            }
        }
    }

    Ok(())
}
