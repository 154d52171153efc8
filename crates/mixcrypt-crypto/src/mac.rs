//! HMAC over blake2b-256
//!
//! blake2b has no eager block buffer, so the generic `SimpleHmac` construction
//! is used instead of `Hmac`.

use hmac::{Mac as _, SimpleHmac};

use crate::hash::Blake2b256;
use crate::HASH_LEN;

/// `HMAC_H(key, data)`
pub fn hmac_blake2b(key: &[u8], data: &[u8]) -> [u8; HASH_LEN] {
    let Ok(mut mac) = SimpleHmac::<Blake2b256>::new_from_slice(key) else {
        unreachable!("HMAC accepts keys of any length");
    };
    mac.update(data);
    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_changes_output() {
        let a = hmac_blake2b(b"key-a", b"data");
        let b = hmac_blake2b(b"key-b", b"data");
        assert_ne!(a, b);
    }

    #[test]
    fn test_is_not_plain_hash() {
        let keyed = hmac_blake2b(b"", b"data");
        assert_ne!(keyed, crate::hash(b"data"));
    }

    #[test]
    fn test_long_key() {
        // Keys longer than the 128-byte block are hashed first
        let key = vec![0x42u8; 300];
        let a = hmac_blake2b(&key, b"data");
        let b = hmac_blake2b(&key, b"data");
        assert_eq!(a, b);
    }
}
