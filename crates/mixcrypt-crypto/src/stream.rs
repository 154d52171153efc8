//! Unauthenticated XOR keystreams
//!
//! Both ciphers use the extended 24-byte nonce. Authentication is supplied by
//! the caller (a separate MAC carried in its own slot).

use chacha20::XChaCha20;
use salsa20::cipher::{KeyIvInit, StreamCipher};
use salsa20::XSalsa20;

use mixcrypt_core::{CryptoError, CryptoResult};

use crate::{KEY_SIZE, NONCE_SIZE};

fn nonce_prefix(nonce: &[u8]) -> CryptoResult<&[u8]> {
    if nonce.len() < NONCE_SIZE {
        return Err(CryptoError::invalid_length("nonce", NONCE_SIZE, nonce.len()));
    }
    Ok(&nonce[..NONCE_SIZE])
}

/// XOR `msg` with the XSalsa20 keystream. Only the first 24 nonce bytes are used.
pub fn salsa20_xor(key: &[u8; KEY_SIZE], nonce: &[u8], msg: &[u8]) -> CryptoResult<Vec<u8>> {
    let nonce = nonce_prefix(nonce)?;
    let mut cipher = XSalsa20::new(
        salsa20::Key::from_slice(key),
        salsa20::XNonce::from_slice(nonce),
    );
    let mut out = msg.to_vec();
    cipher.apply_keystream(&mut out);
    Ok(out)
}

/// XOR `msg` with the XChaCha20 keystream. Only the first 24 nonce bytes are used.
pub fn xchacha20_xor(key: &[u8; KEY_SIZE], nonce: &[u8], msg: &[u8]) -> CryptoResult<Vec<u8>> {
    let nonce = nonce_prefix(nonce)?;
    let mut cipher = XChaCha20::new(
        chacha20::Key::from_slice(key),
        chacha20::XNonce::from_slice(nonce),
    );
    let mut out = msg.to_vec();
    cipher.apply_keystream(&mut out);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_salsa_uses_only_first_24_nonce_bytes() {
        let key = [9u8; KEY_SIZE];
        let mut long_nonce = [1u8; 32];
        let a = salsa20_xor(&key, &long_nonce, b"payload").unwrap();
        long_nonce[30] = 0xFF;
        let b = salsa20_xor(&key, &long_nonce, b"payload").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_short_nonce_rejected() {
        let key = [0u8; KEY_SIZE];
        assert!(matches!(
            salsa20_xor(&key, &[0u8; 23], b"x"),
            Err(CryptoError::InvalidLength { expected: 24, got: 23, .. })
        ));
        assert!(xchacha20_xor(&key, &[0u8; 8], b"x").is_err());
    }

    #[test]
    fn test_ciphers_differ() {
        let key = [3u8; KEY_SIZE];
        let nonce = [4u8; NONCE_SIZE];
        let a = salsa20_xor(&key, &nonce, &[0u8; 64]).unwrap();
        let b = xchacha20_xor(&key, &nonce, &[0u8; 64]).unwrap();
        assert_ne!(a, b);
    }

    proptest! {
        #[test]
        fn xor_is_an_involution(
            key in any::<[u8; 32]>(),
            nonce in any::<[u8; 24]>(),
            msg in proptest::collection::vec(any::<u8>(), 0..512),
        ) {
            let ct = salsa20_xor(&key, &nonce, &msg).unwrap();
            prop_assert_eq!(salsa20_xor(&key, &nonce, &ct).unwrap(), msg.clone());

            let ct = xchacha20_xor(&key, &nonce, &msg).unwrap();
            prop_assert_eq!(xchacha20_xor(&key, &nonce, &ct).unwrap(), msg);
        }
    }
}
