//! XChaCha20-Poly1305 with a hashed key
//!
//! The cipher key is always `H(raw_key)`, so callers may pass any byte string
//! (a password, a KEK, a derived group key) as `raw_key`.
//!
//! Prefixed format (binary):
//! ```text
//! [24 bytes: nonce][N bytes: ciphertext][16 bytes: Poly1305 tag]
//! ```

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

use mixcrypt_core::{CryptoError, CryptoResult};

use crate::hash::hash;
use crate::rng::random_array;
use crate::{NONCE_SIZE, TAG_SIZE};

fn cipher_for(raw_key: &[u8]) -> XChaCha20Poly1305 {
    let mut key = hash(raw_key);
    let cipher = XChaCha20Poly1305::new((&key).into());
    key.zeroize();
    cipher
}

/// Seal `plaintext` under `H(raw_key)` with an explicit nonce.
pub fn seal(raw_key: &[u8], nonce: &[u8; NONCE_SIZE], plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    cipher_for(raw_key)
        .encrypt(XNonce::from_slice(nonce), plaintext)
        .map_err(|e| CryptoError::Other(anyhow::anyhow!("XChaCha20-Poly1305 seal failed: {e}")))
}

/// Open a ciphertext produced by [`seal`].
pub fn open(raw_key: &[u8], nonce: &[u8; NONCE_SIZE], ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
    cipher_for(raw_key)
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::AeadFailure)
}

/// Seal with a fresh random nonce and prepend it: `nonce ‖ ciphertext`.
pub fn seal_prefixed<R: RngCore + CryptoRng>(
    raw_key: &[u8],
    plaintext: &[u8],
    rng: &mut R,
) -> CryptoResult<Vec<u8>> {
    let nonce: [u8; NONCE_SIZE] = random_array(rng)?;
    let ciphertext = seal(raw_key, &nonce, plaintext)?;

    let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    result.extend_from_slice(&nonce);
    result.extend_from_slice(&ciphertext);
    Ok(result)
}

/// Open `nonce ‖ ciphertext` (output of [`seal_prefixed`]).
pub fn open_prefixed(raw_key: &[u8], data: &[u8]) -> CryptoResult<Vec<u8>> {
    if data.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::invalid_length(
            "sealed data",
            NONCE_SIZE + TAG_SIZE,
            data.len(),
        ));
    }

    let (nonce_bytes, ciphertext) = data.split_at(NONCE_SIZE);
    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(nonce_bytes);
    open(raw_key, &nonce, ciphertext)
}
