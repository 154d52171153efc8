//! Relationship fingerprints and message IDs
//!
//! ```text
//! fp          = H(max(a, b) ‖ min(a, b) ‖ sender ‖ receiver)
//! message ID  = H(fp ‖ conversation_id as u64 big-endian)
//! ```
//!
//! Ordering the keys numerically makes the fingerprint independent of which
//! party computes it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use mixcrypt_core::{CryptoError, CryptoResult, Id};
use mixcrypt_crypto::{hash_parts, LargeInt, HASH_LEN};

pub const MESSAGE_ID_LEN: usize = 32;

/// Shared fingerprint of the relationship between two DH keys.
pub fn relationship_fingerprint(
    key_a: &LargeInt,
    key_b: &LargeInt,
    sender: &Id,
    receiver: &Id,
) -> [u8; HASH_LEN] {
    let (high, low) = if key_a >= key_b {
        (key_a, key_b)
    } else {
        (key_b, key_a)
    };
    hash_parts(&[
        high.bytes().as_slice(),
        low.bytes().as_slice(),
        sender.as_bytes(),
        receiver.as_bytes(),
    ])
}

/// Identifier of one message within a relationship.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId([u8; MESSAGE_ID_LEN]);

impl MessageId {
    pub fn new(relationship_fingerprint: &[u8; HASH_LEN], conversation_id: u64) -> Self {
        Self(hash_parts(&[
            relationship_fingerprint,
            &conversation_id.to_be_bytes(),
        ]))
    }

    pub fn from_bytes(data: &[u8]) -> CryptoResult<Self> {
        <[u8; MESSAGE_ID_LEN]>::try_from(data)
            .map(Self)
            .map_err(|_| CryptoError::invalid_length("message ID", MESSAGE_ID_LEN, data.len()))
    }

    pub fn as_bytes(&self) -> &[u8; MESSAGE_ID_LEN] {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&STANDARD.encode(self.0))
    }
}

impl std::fmt::Debug for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MessageId({self})")
    }
}
