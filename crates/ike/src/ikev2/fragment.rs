//! IKEv2 message fragmentation (RFC 7383)
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! | Next Payload  |C|  RESERVED   |         Payload Length        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |        Fragment Number        |        Total Fragments        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                     Initialization Vector                     |
//! ~                      Encrypted content                        ~
//! ~                    Integrity Checksum Data                    ~
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Each fragment is encrypted and authenticated on its own. The receiver
//! collects verified fragments in a [`FragmentReassembler`] until all of
//! them are present.

use super::constants::SKF_HEADER_SIZE;
use super::encrypted::SkCipher;
use super::message::IkeHeader;
use super::payload::{parse_payload_chain, RawPayload};
use super::sk::SkPayload;
use crate::{logging, Error, Result};
use std::collections::BTreeMap;

/// Encrypted Fragment sub-header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkfHeader {
    /// 1-based fragment number
    pub fragment_number: u16,

    /// Number of fragments the message was split into
    pub total_fragments: u16,
}

impl SkfHeader {
    /// Create a sub-header, requiring `1 <= fragment_number <= total_fragments`
    pub fn new(fragment_number: u16, total_fragments: u16) -> Result<Self> {
        if fragment_number == 0 || fragment_number > total_fragments {
            return Err(Error::InvalidSyntax(format!(
                "Invalid fragment number {} of {}",
                fragment_number, total_fragments
            )));
        }

        Ok(SkfHeader {
            fragment_number,
            total_fragments,
        })
    }

    /// Parse the sub-header from the first 4 bytes of `data`
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < SKF_HEADER_SIZE {
            return Err(Error::BufferTooShort {
                required: SKF_HEADER_SIZE,
                available: data.len(),
            });
        }

        Self::new(
            u16::from_be_bytes([data[0], data[1]]),
            u16::from_be_bytes([data[2], data[3]]),
        )
    }

    /// Serialize the sub-header
    pub fn to_bytes(&self) -> [u8; SKF_HEADER_SIZE] {
        let mut bytes = [0u8; SKF_HEADER_SIZE];
        bytes[0..2].copy_from_slice(&self.fragment_number.to_be_bytes());
        bytes[2..4].copy_from_slice(&self.total_fragments.to_be_bytes());
        bytes
    }
}

/// A fully decrypted message, reassembled if it arrived in fragments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedMessage {
    /// IKE header of the (first) packet
    pub header: IkeHeader,

    /// Type of the first inner payload
    pub first_payload: u8,

    /// Concatenated inner payloads
    pub plaintext: Vec<u8>,
}

impl DecryptedMessage {
    /// Split the plaintext into its payload chain
    pub fn payloads(&self) -> Result<Vec<RawPayload>> {
        parse_payload_chain(self.first_payload, &self.plaintext)
    }
}

/// Result of feeding one packet to a [`FragmentReassembler`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// A whole message is available
    Complete(DecryptedMessage),

    /// More fragments are needed; the packet may have been discarded
    Partial {
        /// Fragments collected so far
        received: u16,
        /// Fragments expected (zero when nothing is being collected)
        total: u16,
    },
}

#[derive(Debug)]
struct Reassembly {
    header: IkeHeader,
    total_fragments: u16,
    first_payload: Option<u8>,
    fragments: BTreeMap<u16, Vec<u8>>,
}

impl Reassembly {
    fn start(header: IkeHeader, total_fragments: u16) -> Self {
        Reassembly {
            header,
            total_fragments,
            first_payload: None,
            fragments: BTreeMap::new(),
        }
    }
}

/// Collects SKF fragments of one message
///
/// Packets that cannot contribute to the message in progress are dropped:
/// duplicates, fragments announcing fewer total fragments, fragments of
/// another exchange, unfragmented SK messages, and packets that fail
/// decryption. A fragment announcing more total fragments restarts
/// collection.
#[derive(Debug, Default)]
pub struct FragmentReassembler {
    state: Option<Reassembly>,
}

impl FragmentReassembler {
    /// Create an idle reassembler
    pub fn new() -> Self {
        Self::default()
    }

    /// True while fragments of a message are being collected
    pub fn is_in_progress(&self) -> bool {
        self.state.is_some()
    }

    /// Drop any partially collected message
    pub fn reset(&mut self) {
        self.state = None;
    }

    fn progress(&self) -> DecodeOutcome {
        match &self.state {
            Some(state) => DecodeOutcome::Partial {
                received: state.fragments.len() as u16,
                total: state.total_fragments,
            },
            None => DecodeOutcome::Partial {
                received: 0,
                total: 0,
            },
        }
    }

    fn discard(&self, message_id: u32, reason: &str) -> DecodeOutcome {
        logging::log_fragment_discarded(message_id, reason);
        self.progress()
    }

    /// Decode one received SK or SKF packet
    ///
    /// # Errors
    ///
    /// Decoding and integrity errors are returned only when no reassembly
    /// is in progress; otherwise the packet is discarded.
    pub fn process(&mut self, message: &[u8], cipher: &SkCipher<'_>) -> Result<DecodeOutcome> {
        let sk = match SkPayload::decode_message(message, cipher) {
            Ok(sk) => sk,
            Err(e) => match &self.state {
                Some(state) => {
                    let id = state.header.message_id;
                    return Ok(self.discard(id, &e.to_string()));
                }
                None => return Err(e),
            },
        };

        let header = sk.header().clone();
        let skf = match sk.fragment() {
            Some(skf) => *skf,
            None => {
                if self.state.is_some() {
                    return Ok(self.discard(header.message_id, "unfragmented message"));
                }
                let first_payload = sk.first_payload();
                return Ok(DecodeOutcome::Complete(DecryptedMessage {
                    header,
                    first_payload,
                    plaintext: sk.into_plaintext(),
                }));
            }
        };

        if let Some(state) = &self.state {
            if !state.header.same_exchange(&header) {
                return Ok(self.discard(header.message_id, "different exchange"));
            }
            if skf.total_fragments < state.total_fragments {
                return Ok(self.discard(header.message_id, "fewer total fragments"));
            }
            if skf.total_fragments == state.total_fragments
                && state.fragments.contains_key(&skf.fragment_number)
            {
                return Ok(self.discard(header.message_id, "duplicate"));
            }
        }

        let restart = self
            .state
            .as_ref()
            .map_or(true, |state| skf.total_fragments > state.total_fragments);
        if restart {
            self.state = Some(Reassembly::start(header.clone(), skf.total_fragments));
        }

        let first_payload = sk.first_payload();
        let plaintext = sk.into_plaintext();
        let state = self
            .state
            .as_mut()
            .ok_or_else(|| Error::Internal("Reassembly state missing".into()))?;

        if skf.fragment_number == 1 {
            state.first_payload = Some(first_payload);
            state.header = header.clone();
        }
        state.fragments.insert(skf.fragment_number, plaintext);
        logging::log_fragment_received(
            header.message_id,
            skf.fragment_number,
            skf.total_fragments,
        );

        if state.fragments.len() < state.total_fragments as usize {
            return Ok(self.progress());
        }

        let state = self
            .state
            .take()
            .ok_or_else(|| Error::Internal("Reassembly state missing".into()))?;
        let first_payload = state
            .first_payload
            .ok_or_else(|| Error::Internal("Fragment 1 missing from complete set".into()))?;
        let plaintext: Vec<u8> = state.fragments.into_values().flatten().collect();

        logging::log_reassembly_complete(
            state.header.message_id,
            state.total_fragments,
            plaintext.len(),
        );

        Ok(DecodeOutcome::Complete(DecryptedMessage {
            header: state.header,
            first_payload,
            plaintext,
        }))
    }
}
