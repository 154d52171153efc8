//! Key residues: public proof that a message was sent under a given key

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use mixcrypt_core::{CryptoError, CryptoResult};
use mixcrypt_crypto::{hash_parts, KEY_SIZE};

pub const KEY_RESIDUE_LEN: usize = 32;

const KEY_RESIDUE_SALT: &[u8] = b"e2eKeyResidueSalt";

/// `H(message_key ‖ "e2eKeyResidueSalt")`; reveals nothing about the key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyResidue([u8; KEY_RESIDUE_LEN]);

impl KeyResidue {
    pub fn new(message_key: &[u8; KEY_SIZE]) -> Self {
        Self(hash_parts(&[message_key, KEY_RESIDUE_SALT]))
    }

    pub fn from_bytes(data: &[u8]) -> CryptoResult<Self> {
        <[u8; KEY_RESIDUE_LEN]>::try_from(data)
            .map(Self)
            .map_err(|_| CryptoError::invalid_length("key residue", KEY_RESIDUE_LEN, data.len()))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_RESIDUE_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for KeyResidue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyResidue({})", STANDARD.encode(self.0))
    }
}
