//! Per-epoch keys, per-recipient fingerprints, MACs and message encryption
//!
//! ```text
//! crypt key   = HKDF(secret = group_key ‖ epoch LE32, salt = salt32)
//! fingerprint = H(group_key ‖ recipient_id ‖ salt), top bit cleared
//! ct          = XChaCha20(H(crypt_key), fingerprint[..24]) ⊕ internal
//! mac         = H(crypt_key ‖ ct ‖ bytes(recipient_dh)), top bit cleared
//! ```
//!
//! The fingerprint doubles as the nonce; it is unique per (salt, recipient).

use zeroize::{Zeroize, Zeroizing};

use mixcrypt_core::{CryptoResult, Id};
use mixcrypt_crypto::hkdf::hkdf_blake2b;
use mixcrypt_crypto::stream::xchacha20_xor;
use mixcrypt_crypto::{hash, hash_parts, Fingerprint, LargeInt, Mac, KEY_SIZE};

use crate::keys::GroupKey;

pub const SALT_LEN: usize = 32;

/// Per-epoch, per-message key; zeroized on drop.
pub type CryptKey = Zeroizing<[u8; KEY_SIZE]>;

pub fn new_kdf_key(key: &GroupKey, epoch: u32, salt: &[u8; SALT_LEN]) -> CryptKey {
    let mut secret = [0u8; KEY_SIZE + 4];
    secret[..KEY_SIZE].copy_from_slice(key.as_bytes());
    secret[KEY_SIZE..].copy_from_slice(&epoch.to_le_bytes());
    let out = hkdf_blake2b(&secret, Some(&salt[..]), &[]);
    secret.zeroize();
    Zeroizing::new(out)
}

pub fn new_key_fingerprint(key: &GroupKey, salt: &[u8; SALT_LEN], recipient: &Id) -> Fingerprint {
    Fingerprint::from_hash(hash_parts(&[key.as_bytes(), recipient.as_bytes(), salt]))
}

/// MAC over the ciphertext bound to the recipient's DH key (empty if unknown).
pub fn new_mac(crypt_key: &[u8; KEY_SIZE], ciphertext: &[u8], recipient_dh: Option<&LargeInt>) -> Mac {
    let dh = recipient_dh.map(LargeInt::bytes).unwrap_or_default();
    Mac::from_hash(hash_parts(&[crypt_key, ciphertext, &dh]))
}

/// XOR the internal message with the keystream; encryption and decryption are the same.
pub fn encrypt_internal(
    crypt_key: &[u8; KEY_SIZE],
    fingerprint: &Fingerprint,
    internal: &[u8],
) -> CryptoResult<Vec<u8>> {
    let stream_key = Zeroizing::new(hash(crypt_key));
    xchacha20_xor(&stream_key, fingerprint.as_bytes(), internal)
}

pub fn decrypt_internal(
    crypt_key: &[u8; KEY_SIZE],
    fingerprint: &Fingerprint,
    ciphertext: &[u8],
) -> CryptoResult<Vec<u8>> {
    encrypt_internal(crypt_key, fingerprint, ciphertext)
}
