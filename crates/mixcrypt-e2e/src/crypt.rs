//! Authenticated encryption between two DH key holders
//!
//! ```text
//! session = DH(own_priv, partner_pub)
//! ct      = XSalsa20(H(bytes(session)), nonce[..24]) ⊕ payload
//! mac     = H(bytes(recipient_pub) ‖ bytes(session) ‖ salt ‖ ct), top bit cleared
//! ```
//!
//! The session is a full group element, so it is hashed down to the 32-byte
//! stream key. The MAC still covers the unhashed session bytes.
//!
//! The sender MACs over the partner's public key; the receiver checks against
//! its own, which is the same value.

use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use mixcrypt_core::{CryptoError, CryptoResult};
use mixcrypt_crypto::stream::salsa20_xor;
use mixcrypt_crypto::{
    decode_sized_broadcast, hash, hash_parts, new_sized_broadcast, CyclicGroup, LargeInt, Mac,
    NONCE_SIZE,
};

use crate::session::session_key;

fn stream_key(session: &LargeInt) -> Zeroizing<[u8; 32]> {
    let bytes = Zeroizing::new(session.bytes());
    Zeroizing::new(hash(&bytes))
}

fn make_mac(recipient_public: &LargeInt, session: &LargeInt, salt: &[u8], ciphertext: &[u8]) -> Mac {
    let session_bytes = Zeroizing::new(session.bytes());
    Mac::from_hash(hash_parts(&[
        recipient_public.bytes().as_slice(),
        session_bytes.as_slice(),
        salt,
        ciphertext,
    ]))
}

fn check_nonce(nonce: &[u8]) -> CryptoResult<()> {
    if nonce.len() < NONCE_SIZE {
        return Err(CryptoError::invalid_length("nonce", NONCE_SIZE, nonce.len()));
    }
    Ok(())
}

/// Encrypt `payload` for the holder of `partner_public`.
pub fn encrypt(
    group: &CyclicGroup,
    own_private: &LargeInt,
    partner_public: &LargeInt,
    nonce: &[u8],
    salt: &[u8],
    payload: &[u8],
) -> CryptoResult<(Vec<u8>, Mac)> {
    check_nonce(nonce)?;
    let session = session_key(group, own_private, partner_public)?;
    let ciphertext = salsa20_xor(&stream_key(&session), nonce, payload)?;
    let mac = make_mac(partner_public, &session, salt, &ciphertext);
    Ok((ciphertext, mac))
}

/// Verify and decrypt a ciphertext from the holder of `partner_public`.
pub fn decrypt(
    group: &CyclicGroup,
    own_private: &LargeInt,
    partner_public: &LargeInt,
    nonce: &[u8],
    salt: &[u8],
    ciphertext: &[u8],
    mac: &[u8],
) -> CryptoResult<Vec<u8>> {
    check_nonce(nonce)?;
    let session = session_key(group, own_private, partner_public)?;
    let own_public = group.public_key(own_private);
    if !make_mac(&own_public, &session, salt, ciphertext).verify(mac) {
        tracing::debug!(len = ciphertext.len(), "e2e MAC mismatch");
        return Err(CryptoError::MacMismatch);
    }
    salsa20_xor(&stream_key(&session), nonce, ciphertext)
}

/// [`encrypt`] over a sized frame of `outer_len` bytes, hiding the payload length.
#[allow(clippy::too_many_arguments)]
pub fn encrypt_sized<R: RngCore + CryptoRng>(
    group: &CyclicGroup,
    own_private: &LargeInt,
    partner_public: &LargeInt,
    nonce: &[u8],
    salt: &[u8],
    payload: &[u8],
    outer_len: usize,
    rng: &mut R,
) -> CryptoResult<(Vec<u8>, Mac)> {
    let frame = new_sized_broadcast(outer_len, payload, rng)?;
    encrypt(group, own_private, partner_public, nonce, salt, &frame)
}

pub fn decrypt_sized(
    group: &CyclicGroup,
    own_private: &LargeInt,
    partner_public: &LargeInt,
    nonce: &[u8],
    salt: &[u8],
    ciphertext: &[u8],
    mac: &[u8],
) -> CryptoResult<Vec<u8>> {
    let frame = decrypt(group, own_private, partner_public, nonce, salt, ciphertext, mac)?;
    Ok(decode_sized_broadcast(&frame)?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixcrypt_crypto::slot::msb_is_clear;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Pair {
        alice: LargeInt,
        bob: LargeInt,
        alice_pub: LargeInt,
        bob_pub: LargeInt,
    }

    fn pair(seed: u64) -> Pair {
        let group = CyclicGroup::modp_2048();
        let mut rng = StdRng::seed_from_u64(seed);
        let alice = group.random_private_key(32, &mut rng).unwrap();
        let bob = group.random_private_key(32, &mut rng).unwrap();
        Pair {
            alice_pub: group.public_key(&alice),
            bob_pub: group.public_key(&bob),
            alice,
            bob,
        }
    }

    #[test]
    fn test_roundtrip() {
        let group = CyclicGroup::modp_2048();
        let p = pair(1);
        let nonce = [7u8; 32];
        let (ct, mac) = encrypt(group, &p.alice, &p.bob_pub, &nonce, b"salt", b"hi bob").unwrap();
        assert!(msb_is_clear(mac.as_bytes()));
        let pt = decrypt(group, &p.bob, &p.alice_pub, &nonce, b"salt", &ct, mac.as_bytes()).unwrap();
        assert_eq!(pt, b"hi bob");
    }

    #[test]
    fn test_stream_key_is_hashed_session() {
        let group = CyclicGroup::modp_2048();
        let p = pair(6);
        let nonce = [3u8; 24];
        let (ct, _) = encrypt(group, &p.alice, &p.bob_pub, &nonce, b"salt", b"keystream").unwrap();

        let session = session_key(group, &p.bob, &p.alice_pub).unwrap();
        assert!(session.bytes().len() > 32);
        let expected = salsa20_xor(&hash(&session.bytes()), &nonce, b"keystream").unwrap();
        assert_eq!(ct, expected);
    }

    #[test]
    fn test_salt_is_authenticated() {
        let group = CyclicGroup::modp_2048();
        let p = pair(2);
        let nonce = [7u8; 24];
        let (ct, mac) = encrypt(group, &p.alice, &p.bob_pub, &nonce, b"salt", b"x").unwrap();
        assert!(matches!(
            decrypt(group, &p.bob, &p.alice_pub, &nonce, b"other", &ct, mac.as_bytes()),
            Err(CryptoError::MacMismatch)
        ));
    }

    #[test]
    fn test_short_nonce() {
        let group = CyclicGroup::modp_2048();
        let p = pair(3);
        assert!(matches!(
            encrypt(group, &p.alice, &p.bob_pub, &[0u8; 16], b"", b"x"),
            Err(CryptoError::InvalidLength { what: "nonce", .. })
        ));
    }

    #[test]
    fn test_sized_roundtrip() {
        let group = CyclicGroup::modp_2048();
        let p = pair(4);
        let mut rng = StdRng::seed_from_u64(4);
        let nonce = [1u8; 24];
        let (ct, mac) =
            encrypt_sized(group, &p.alice, &p.bob_pub, &nonce, b"s", b"short", 256, &mut rng).unwrap();
        assert_eq!(ct.len(), 256);
        let pt = decrypt_sized(group, &p.bob, &p.alice_pub, &nonce, b"s", &ct, mac.as_bytes()).unwrap();
        assert_eq!(pt, b"short");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn tampered_ciphertext_fails(payload in proptest::collection::vec(any::<u8>(), 1..256), flip in any::<usize>()) {
            let group = CyclicGroup::modp_2048();
            let p = pair(5);
            let nonce = [9u8; 24];
            let (mut ct, mac) = encrypt(group, &p.alice, &p.bob_pub, &nonce, b"salt", &payload).unwrap();
            let i = flip % ct.len();
            ct[i] ^= 0x01;
            let failed = matches!(
                decrypt(group, &p.bob, &p.alice_pub, &nonce, b"salt", &ct, mac.as_bytes()),
                Err(CryptoError::MacMismatch)
            );
            prop_assert!(failed);
        }
    }
}
