//! IKEv2 Integration Tests
//!
//! End-to-end flows across key exchange, key derivation, SK protection
//! and fragment reassembly, as a peer would drive them.

use fynx_ike::crypto::{
    decode_x25519_spki, encode_x25519_spki, AeadAlgorithm, BlockCipherAlgorithm, DhGroup,
    IntegrityAlgorithm, KeyMaterial, PrfAlgorithm, X25519_PUBLIC_KEY_LEN, X25519_SPKI_HEADER,
};
use fynx_ike::ikev2::{
    encode_payload_chain, encrypt_and_encode, DecodeOutcome, ExchangeType, FragmentReassembler,
    IkeFlags, IkeHeader, KePayload, PayloadType, PendingKeyExchange, RawPayload, SkPayload,
    SkTransform,
};
use fynx_ike::{Error, ErrorKind, FragmentationConfig};
use rand::seq::SliceRandom;
use ring::rand::SystemRandom;

const SPI_I: [u8; 8] = [0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88];
const SPI_R: [u8; 8] = [0x99, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x01];

/// Helper function to create a request header for the IKE_AUTH exchange
fn auth_request(message_id: u32) -> IkeHeader {
    IkeHeader::new(
        SPI_I,
        SPI_R,
        PayloadType::SK,
        ExchangeType::IkeAuth,
        IkeFlags::request(true),
        message_id,
        0,
    )
}

/// Helper function to build a plausible IKE_AUTH inner payload chain
fn auth_payloads(id_len: usize) -> (u8, Vec<u8>) {
    let payloads = vec![
        RawPayload::new(PayloadType::IDi, vec![0x02; id_len]),
        RawPayload::new(PayloadType::AUTH, vec![0x0E; 36]),
        RawPayload::new(PayloadType::N, vec![0x00, 0x00, 0x40, 0x04]),
    ];
    encode_payload_chain(&payloads).unwrap()
}

/// Run a key exchange over the wire encoding and derive both sides' keys
fn establish(group: DhGroup, transform: SkTransform) -> (KeyMaterial, KeyMaterial) {
    let rng = SystemRandom::new();
    let initiator = PendingKeyExchange::generate(group, &rng).unwrap();
    let responder = PendingKeyExchange::generate(group, &rng).unwrap();

    // Each side only sees the other's encoded payload
    let ke_i = KePayload::from_payload_data(&initiator.to_payload_data(), false).unwrap();
    let ke_r = KePayload::from_payload_data(&responder.to_payload_data(), false).unwrap();

    let secret_i = initiator.compute_shared_secret(&ke_r).unwrap();
    let secret_r = responder.compute_shared_secret(&ke_i).unwrap();
    assert_eq!(*secret_i, *secret_r);

    let nonce_i = [0xA1u8; 32];
    let nonce_r = [0xB2u8; 32];
    let prf = PrfAlgorithm::HmacSha256;

    let keys_i =
        KeyMaterial::derive_for(prf, transform, &nonce_i, &nonce_r, &secret_i, &SPI_I, &SPI_R)
            .unwrap();
    let keys_r =
        KeyMaterial::derive_for(prf, transform, &nonce_i, &nonce_r, &secret_r, &SPI_I, &SPI_R)
            .unwrap();
    (keys_i, keys_r)
}

fn all_transforms() -> Vec<SkTransform> {
    vec![
        SkTransform::Combined(AeadAlgorithm::AesGcm16_128),
        SkTransform::Combined(AeadAlgorithm::AesGcm16_256),
        SkTransform::Combined(AeadAlgorithm::ChaCha20Poly1305),
        SkTransform::Separate {
            cipher: BlockCipherAlgorithm::AesCbc128,
            integrity: IntegrityAlgorithm::HmacSha1_96,
        },
        SkTransform::Separate {
            cipher: BlockCipherAlgorithm::AesCbc256,
            integrity: IntegrityAlgorithm::HmacSha256_128,
        },
    ]
}

//
// Test Cases - Key Exchange to Protected Message
//

#[test]
fn test_ike_auth_request_after_curve25519() {
    let rng = SystemRandom::new();
    for transform in all_transforms() {
        let (keys_i, keys_r) = establish(DhGroup::Curve25519, transform);
        let (first, plaintext) = auth_payloads(12);

        let packets = encrypt_and_encode(
            &auth_request(1),
            first,
            &plaintext,
            &keys_i.initiator_cipher(transform).unwrap(),
            &FragmentationConfig::default(),
            &rng,
        )
        .unwrap();
        assert_eq!(packets.len(), 1);

        let mut reassembler = FragmentReassembler::new();
        let outcome = reassembler
            .process(&packets[0], &keys_r.initiator_cipher(transform).unwrap())
            .unwrap();

        let DecodeOutcome::Complete(message) = outcome else {
            panic!("expected a complete message for {:?}", transform);
        };
        assert_eq!(message.header.message_id, 1);
        assert_eq!(message.header.initiator_spi, SPI_I);
        assert_eq!(message.first_payload, PayloadType::IDi.to_u8());
        assert_eq!(message.plaintext, plaintext);

        let payloads = message.payloads().unwrap();
        assert_eq!(payloads.len(), 3);
        assert_eq!(payloads[1].known_type(), Some(PayloadType::AUTH));
    }
}

#[test]
fn test_ike_auth_request_after_modp2048() {
    let rng = SystemRandom::new();
    let transform = SkTransform::Separate {
        cipher: BlockCipherAlgorithm::AesCbc128,
        integrity: IntegrityAlgorithm::HmacSha256_128,
    };
    let (keys_i, keys_r) = establish(DhGroup::Modp2048, transform);
    let (first, plaintext) = auth_payloads(20);

    let sk = SkPayload::encrypt(
        &auth_request(1),
        first,
        None,
        &plaintext,
        &keys_i.initiator_cipher(transform).unwrap(),
        &rng,
    )
    .unwrap();
    let wire = sk.encode_message().unwrap();

    let decoded =
        SkPayload::decode_message(&wire, &keys_r.initiator_cipher(transform).unwrap()).unwrap();
    assert_eq!(decoded.header().length as usize, wire.len());
    assert_eq!(decoded.first_payload(), first);
    assert_eq!(decoded.into_plaintext(), plaintext);
}

#[test]
fn test_directions_use_distinct_keys() {
    let rng = SystemRandom::new();
    let transform = SkTransform::Combined(AeadAlgorithm::AesGcm16_256);
    let (keys_i, keys_r) = establish(DhGroup::Curve25519, transform);
    let (first, plaintext) = auth_payloads(8);

    let wire = SkPayload::encrypt(
        &auth_request(2),
        first,
        None,
        &plaintext,
        &keys_i.initiator_cipher(transform).unwrap(),
        &rng,
    )
    .unwrap()
    .encode_message()
    .unwrap();

    // The responder must not accept an initiator message under its own keys
    let err =
        SkPayload::decode_message(&wire, &keys_r.responder_cipher(transform).unwrap()).unwrap_err();
    assert!(matches!(err, Error::AuthenticationFailed(_)));
    assert_eq!(err.kind(), ErrorKind::Security);
}

#[test]
fn test_tampered_header_rejected() {
    let rng = SystemRandom::new();
    for transform in all_transforms() {
        let (keys_i, keys_r) = establish(DhGroup::Curve25519, transform);
        let (first, plaintext) = auth_payloads(16);

        let mut wire = SkPayload::encrypt(
            &auth_request(3),
            first,
            None,
            &plaintext,
            &keys_i.initiator_cipher(transform).unwrap(),
            &rng,
        )
        .unwrap()
        .encode_message()
        .unwrap();

        // Message ID is covered by the checksum or the AEAD associated data
        wire[23] ^= 0x01;
        let err = SkPayload::decode_message(&wire, &keys_r.initiator_cipher(transform).unwrap())
            .unwrap_err();
        assert!(err.is_security_failure(), "{:?}: {:?}", transform, err);
    }
}

//
// Test Cases - Fragmentation
//

#[test]
fn test_fragmented_request_any_arrival_order() {
    let rng = SystemRandom::new();
    let config = FragmentationConfig::enabled(576).unwrap();

    for transform in all_transforms() {
        let (keys_i, keys_r) = establish(DhGroup::Curve25519, transform);
        let (first, plaintext) = auth_payloads(2500);

        let mut packets = encrypt_and_encode(
            &auth_request(4),
            first,
            &plaintext,
            &keys_i.initiator_cipher(transform).unwrap(),
            &config,
            &rng,
        )
        .unwrap();
        assert!(packets.len() > 1);
        assert!(packets.iter().all(|p| p.len() <= 576));

        packets.shuffle(&mut rand::thread_rng());

        let cipher = keys_r.initiator_cipher(transform).unwrap();
        let mut reassembler = FragmentReassembler::new();
        let last = packets.len() - 1;
        for (i, packet) in packets.iter().enumerate() {
            match reassembler.process(packet, &cipher).unwrap() {
                DecodeOutcome::Partial { received, total } => {
                    assert!(i < last);
                    assert_eq!(received as usize, i + 1);
                    assert_eq!(total as usize, packets.len());
                }
                DecodeOutcome::Complete(message) => {
                    assert_eq!(i, last);
                    assert_eq!(message.first_payload, first);
                    assert_eq!(message.plaintext, plaintext);
                    assert_eq!(message.payloads().unwrap().len(), 3);
                }
            }
        }
        assert!(!reassembler.is_in_progress());
    }
}

#[test]
fn test_tampered_fragment_discarded_then_retransmitted() {
    let rng = SystemRandom::new();
    let transform = SkTransform::Combined(AeadAlgorithm::ChaCha20Poly1305);
    let (keys_i, keys_r) = establish(DhGroup::Curve25519, transform);
    let (first, plaintext) = auth_payloads(1500);

    let packets = encrypt_and_encode(
        &auth_request(5),
        first,
        &plaintext,
        &keys_i.initiator_cipher(transform).unwrap(),
        &FragmentationConfig::enabled(600).unwrap(),
        &rng,
    )
    .unwrap();
    assert!(packets.len() >= 3);

    let cipher = keys_r.initiator_cipher(transform).unwrap();
    let mut reassembler = FragmentReassembler::new();
    assert!(matches!(
        reassembler.process(&packets[0], &cipher).unwrap(),
        DecodeOutcome::Partial { received: 1, .. }
    ));

    // A forged fragment is dropped without disturbing reassembly
    let mut forged = packets[1].clone();
    let last = forged.len() - 1;
    forged[last] ^= 0x80;
    assert!(matches!(
        reassembler.process(&forged, &cipher).unwrap(),
        DecodeOutcome::Partial { received: 1, .. }
    ));

    let mut complete = None;
    for packet in &packets[1..] {
        if let DecodeOutcome::Complete(message) = reassembler.process(packet, &cipher).unwrap() {
            complete = Some(message);
        }
    }
    assert_eq!(complete.unwrap().plaintext, plaintext);
}

#[test]
fn test_forged_single_packet_reported_when_idle() {
    let rng = SystemRandom::new();
    let transform = SkTransform::Separate {
        cipher: BlockCipherAlgorithm::AesCbc256,
        integrity: IntegrityAlgorithm::HmacSha512_256,
    };
    let (keys_i, keys_r) = establish(DhGroup::Curve25519, transform);
    let (first, plaintext) = auth_payloads(4);

    let mut wire = encrypt_and_encode(
        &auth_request(6),
        first,
        &plaintext,
        &keys_i.initiator_cipher(transform).unwrap(),
        &FragmentationConfig::disabled(),
        &rng,
    )
    .unwrap()
    .remove(0);
    let last = wire.len() - 1;
    wire[last] ^= 0x01;

    let mut reassembler = FragmentReassembler::new();
    let err = reassembler
        .process(&wire, &keys_r.initiator_cipher(transform).unwrap())
        .unwrap_err();
    assert_eq!(err, Error::IntegrityCheckFailed);
}

#[test]
fn test_unsupported_group_surfaces_for_invalid_ke_reply() {
    // Group 19 (ECP-256) is parsed but not implemented here
    let mut data = vec![0x00, 19, 0x00, 0x00];
    data.extend_from_slice(&[0x04; 64]);
    let ke = KePayload::from_payload_data(&data, false).unwrap();
    assert_eq!(ke.group(), None);

    let rng = SystemRandom::new();
    let local = PendingKeyExchange::generate(DhGroup::Modp2048, &rng).unwrap();
    assert_eq!(
        local.compute_shared_secret(&ke).unwrap_err(),
        Error::DhGroupMismatch {
            local: 14,
            peer: 19
        }
    );
}

#[test]
fn test_curve25519_peer_key_from_spki() {
    let rng = SystemRandom::new();
    let local = PendingKeyExchange::generate(DhGroup::Curve25519, &rng).unwrap();
    let peer = PendingKeyExchange::generate(DhGroup::Curve25519, &rng).unwrap();

    // Peer key arrives as X.509 SubjectPublicKeyInfo from external tooling
    let mut raw = [0u8; X25519_PUBLIC_KEY_LEN];
    raw.copy_from_slice(peer.public_value());
    let der = encode_x25519_spki(&raw);
    assert_eq!(
        &der[..X25519_SPKI_HEADER.len()],
        DhGroup::Curve25519.spki_header().unwrap()
    );

    let ke = KePayload::new(31, decode_x25519_spki(&der).unwrap().to_vec()).unwrap();
    assert_eq!(ke.key_data, peer.public_value());

    let local_ke = local.payload();
    let k_local = local.compute_shared_secret(&ke).unwrap();
    let k_peer = peer.compute_shared_secret(&local_ke).unwrap();
    assert_eq!(*k_local, *k_peer);
}
