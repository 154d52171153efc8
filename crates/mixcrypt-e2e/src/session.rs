//! Session keys and the per-message key sequence
//!
//! ```text
//! session  = partner_pub ^ own_priv mod p
//! key(i)   = H(bytes(session) ‖ uvarint(i))
//! ```

use std::ops::Range;

use zeroize::Zeroizing;

use mixcrypt_core::CryptoResult;
use mixcrypt_crypto::{hash_parts, CyclicGroup, LargeInt, KEY_SIZE};

/// Longest unsigned LEB128 encoding of a u64
const MAX_UVARINT_LEN: usize = 10;

/// A per-message key; zeroized on drop.
pub type MessageKey = Zeroizing<[u8; KEY_SIZE]>;

/// Diffie–Hellman session key between `own_private` and `partner_public`.
pub fn session_key(
    group: &CyclicGroup,
    own_private: &LargeInt,
    partner_public: &LargeInt,
) -> CryptoResult<LargeInt> {
    group.diffie_hellman(own_private, partner_public)
}

/// Unsigned LEB128, seven bits per byte, low group first.
pub(crate) fn put_uvarint(buf: &mut [u8; MAX_UVARINT_LEN], mut value: u64) -> usize {
    let mut i = 0;
    while value >= 0x80 {
        buf[i] = (value as u8) | 0x80;
        value >>= 7;
        i += 1;
    }
    buf[i] = value as u8;
    i + 1
}

/// Key number `index` of the session.
pub fn derive_key(session: &LargeInt, index: u64) -> MessageKey {
    let mut varint = [0u8; MAX_UVARINT_LEN];
    let len = put_uvarint(&mut varint, index);
    let session_bytes = Zeroizing::new(session.bytes());
    Zeroizing::new(hash_parts(&[session_bytes.as_slice(), &varint[..len]]))
}

/// Keys for every index in `range`, in order.
pub fn derive_keys(session: &LargeInt, range: Range<u64>) -> impl Iterator<Item = (u64, MessageKey)> + '_ {
    range.map(move |i| (i, derive_key(session, i)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn uvarint(v: u64) -> Vec<u8> {
        let mut buf = [0u8; MAX_UVARINT_LEN];
        let len = put_uvarint(&mut buf, v);
        buf[..len].to_vec()
    }

    #[test]
    fn test_uvarint_encoding() {
        assert_eq!(uvarint(0), vec![0x00]);
        assert_eq!(uvarint(1), vec![0x01]);
        assert_eq!(uvarint(127), vec![0x7F]);
        assert_eq!(uvarint(128), vec![0x80, 0x01]);
        assert_eq!(uvarint(300), vec![0xAC, 0x02]);
        assert_eq!(uvarint(u64::MAX).len(), MAX_UVARINT_LEN);
    }

    #[test]
    fn test_session_key_agreement() {
        let group = CyclicGroup::modp_2048();
        let mut rng = StdRng::seed_from_u64(1);
        let a = group.random_private_key(32, &mut rng).unwrap();
        let b = group.random_private_key(32, &mut rng).unwrap();
        let ab = session_key(group, &a, &group.public_key(&b)).unwrap();
        let ba = session_key(group, &b, &group.public_key(&a)).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_derive_keys_matches_single() {
        let session = LargeInt::from_u64(0xDEAD_BEEF);
        let keys: Vec<_> = derive_keys(&session, 5..9).collect();
        assert_eq!(keys.len(), 4);
        for (i, key) in &keys {
            assert_eq!(**key, *derive_key(&session, *i));
        }
        assert_ne!(*keys[0].1, *keys[1].1);
    }

    #[test]
    fn test_key_depends_on_session() {
        let a = derive_key(&LargeInt::from_u64(1), 0);
        let b = derive_key(&LargeInt::from_u64(2), 0);
        assert_ne!(*a, *b);
    }
}
