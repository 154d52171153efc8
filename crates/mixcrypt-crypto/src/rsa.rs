//! RSA with blake2b-256: PSS signatures, OAEP, and multicast OAEP
//!
//! Multicast OAEP turns the usual direction around: the holder of the private
//! key pads a message with EME-OAEP and applies the *private* exponent, so any
//! holder of the public key can recover it. It gives authenticity of origin,
//! not confidentiality against public-key holders.
//!
//! Multicast ciphertext layout:
//! ```text
//! [k bytes: block 0][k bytes: block 1]…   k = modulus size in bytes
//! block payload ≤ k − 2·32 − 2
//! ```
//!
//! Public key wire form: `[4 bytes: E big-endian][k bytes: N big-endian]`.

use ::rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding};
use ::rsa::hazmat::rsa_decrypt_and_check;
use ::rsa::traits::PublicKeyParts;
use ::rsa::{BigUint, Oaep, Pss};
use rand::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

pub use ::rsa::{RsaPrivateKey, RsaPublicKey};

use mixcrypt_core::{CryptoError, CryptoResult};

use crate::hash::{hash, hash_parts, Blake2b256, HASH_LEN};
use crate::rng::fill_random;

/// Length of the public exponent in the public key wire form
pub const E_LEN: usize = 4;

/// Generate a new RSA key pair with a modulus of `bits` bits.
pub fn generate_key<R: RngCore + CryptoRng>(
    bits: usize,
    rng: &mut R,
) -> CryptoResult<RsaPrivateKey> {
    RsaPrivateKey::new(rng, bits).map_err(|e| CryptoError::Rsa(format!("key generation: {e}")))
}

/// Canonical PEM (PKCS#1, LF line endings) of a public key.
pub fn public_key_pem(key: &RsaPublicKey) -> CryptoResult<String> {
    key.to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| CryptoError::Rsa(format!("public key PEM encoding: {e}")))
}

/// `H(canonical PEM)`, the hash channels carry instead of the full key.
pub fn public_key_hash(key: &RsaPublicKey) -> CryptoResult<[u8; HASH_LEN]> {
    Ok(hash(public_key_pem(key)?.as_bytes()))
}

pub fn private_key_pem(key: &RsaPrivateKey) -> CryptoResult<Zeroizing<String>> {
    key.to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| CryptoError::Rsa(format!("private key PEM encoding: {e}")))
}

pub fn private_key_from_pem(pem: &str) -> CryptoResult<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs1_pem(pem)
        .map_err(|e| CryptoError::Rsa(format!("private key PEM decoding: {e}")))
}

/// Modulus size in bytes
pub fn key_len(key: &RsaPublicKey) -> usize {
    key.size()
}

/// Big-endian bytes of the public exponent and modulus (`E`, `N`).
pub fn public_key_parts(key: &RsaPublicKey) -> (Vec<u8>, Vec<u8>) {
    (key.e().to_bytes_be(), key.n().to_bytes_be())
}

/// `E(4) ‖ N(k)` wire form.
pub fn public_key_to_wire(key: &RsaPublicKey) -> CryptoResult<Vec<u8>> {
    let e = key.e().to_bytes_be();
    if e.len() > E_LEN {
        return Err(CryptoError::Rsa(format!(
            "public exponent of {} bytes does not fit the wire form",
            e.len()
        )));
    }
    let k = key.size();
    let mut out = vec![0u8; E_LEN - e.len()];
    out.extend_from_slice(&e);
    out.extend_from_slice(&left_pad(&key.n().to_bytes_be(), k));
    Ok(out)
}

/// Parse the `E(4) ‖ N(k)` wire form.
pub fn public_key_from_wire(data: &[u8]) -> CryptoResult<RsaPublicKey> {
    if data.len() <= E_LEN {
        return Err(CryptoError::invalid_length(
            "RSA public key",
            E_LEN + 1,
            data.len(),
        ));
    }
    let (e, n) = data.split_at(E_LEN);
    RsaPublicKey::new(BigUint::from_bytes_be(n), BigUint::from_bytes_be(e))
        .map_err(|e| CryptoError::Rsa(format!("invalid public key: {e}")))
}

/// RSA-PSS signature over `H(message)`.
pub fn sign_pss<R: RngCore + CryptoRng>(
    key: &RsaPrivateKey,
    message: &[u8],
    rng: &mut R,
) -> CryptoResult<Vec<u8>> {
    let digest = hash(message);
    key.sign_with_rng(rng, Pss::new::<Blake2b256>(), &digest)
        .map_err(|e| CryptoError::Rsa(format!("PSS signing: {e}")))
}

/// Verify an RSA-PSS signature produced by [`sign_pss`].
pub fn verify_pss(key: &RsaPublicKey, message: &[u8], signature: &[u8]) -> CryptoResult<()> {
    let digest = hash(message);
    key.verify(Pss::new::<Blake2b256>(), &digest, signature)
        .map_err(|e| CryptoError::Rsa(format!("PSS verification: {e}")))
}

/// Standard RSA-OAEP encryption to a public key.
pub fn encrypt_oaep<R: RngCore + CryptoRng>(
    key: &RsaPublicKey,
    message: &[u8],
    label: &str,
    rng: &mut R,
) -> CryptoResult<Vec<u8>> {
    key.encrypt(rng, Oaep::new_with_label::<Blake2b256, _>(label), message)
        .map_err(|e| CryptoError::Rsa(format!("OAEP encryption: {e}")))
}

pub fn decrypt_oaep(key: &RsaPrivateKey, ciphertext: &[u8], label: &str) -> CryptoResult<Vec<u8>> {
    key.decrypt(Oaep::new_with_label::<Blake2b256, _>(label), ciphertext)
        .map_err(|_| CryptoError::OaepFailure)
}

/// Largest payload one multicast block carries for a `key_len`-byte modulus.
pub fn multicast_block_payload(key_len: usize) -> usize {
    key_len.saturating_sub(2 * HASH_LEN + 2)
}

/// Encrypt with the private exponent so any public-key holder can decrypt.
///
/// Payloads longer than one block are split across consecutive blocks. The
/// private operation is blinded with `rng` and checked against the public
/// exponent before the block is emitted.
pub fn multicast_encrypt<R: RngCore + CryptoRng>(
    key: &RsaPrivateKey,
    message: &[u8],
    label: &str,
    rng: &mut R,
) -> CryptoResult<Vec<u8>> {
    let k = key.size();
    let block_payload = multicast_block_payload(k);
    if block_payload == 0 {
        return Err(CryptoError::TooLarge {
            size: message.len(),
            max: 0,
        });
    }

    let label_hash = hash(label.as_bytes());
    let blocks = message.len().div_ceil(block_payload).max(1);
    let mut out = Vec::with_capacity(blocks * k);

    for i in 0..blocks {
        let start = i * block_payload;
        let end = (start + block_payload).min(message.len());
        let em = oaep_encode(&message[start..end], &label_hash, k, rng)?;
        let m = BigUint::from_bytes_be(&em);
        let c = rsa_decrypt_and_check(key, Some(&mut *rng), &m)
            .map_err(|e| CryptoError::Rsa(format!("multicast private operation: {e}")))?;
        out.extend_from_slice(&left_pad(&c.to_bytes_be(), k));
    }
    Ok(out)
}

/// Decrypt a [`multicast_encrypt`] ciphertext with the public key.
pub fn multicast_decrypt(key: &RsaPublicKey, ciphertext: &[u8], label: &str) -> CryptoResult<Vec<u8>> {
    let k = key.size();
    if ciphertext.is_empty() || ciphertext.len() % k != 0 {
        return Err(CryptoError::malformed(format!(
            "multicast ciphertext of {} bytes is not a multiple of the {k}-byte modulus",
            ciphertext.len()
        )));
    }

    let label_hash = hash(label.as_bytes());
    let mut out = Vec::new();
    for block in ciphertext.chunks(k) {
        let c = BigUint::from_bytes_be(block);
        if &c >= key.n() {
            return Err(CryptoError::OaepFailure);
        }
        let m = c.modpow(key.e(), key.n());
        let em = left_pad(&m.to_bytes_be(), k);
        out.extend_from_slice(&oaep_decode(&em, &label_hash)?);
    }
    Ok(out)
}

fn left_pad(data: &[u8], len: usize) -> Vec<u8> {
    if data.len() >= len {
        return data.to_vec();
    }
    let mut out = vec![0u8; len - data.len()];
    out.extend_from_slice(data);
    out
}

/// MGF1 over blake2b-256
fn mgf1(seed: &[u8], len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len + HASH_LEN);
    let mut counter: u32 = 0;
    while out.len() < len {
        out.extend_from_slice(&hash_parts(&[seed, &counter.to_be_bytes()]));
        counter += 1;
    }
    out.truncate(len);
    out
}

fn xor_in_place(dst: &mut [u8], mask: &[u8]) {
    for (d, m) in dst.iter_mut().zip(mask) {
        *d ^= m;
    }
}

/// EME-OAEP encoding: `0x00 ‖ maskedSeed ‖ maskedDB`
fn oaep_encode<R: RngCore + CryptoRng>(
    message: &[u8],
    label_hash: &[u8; HASH_LEN],
    k: usize,
    rng: &mut R,
) -> CryptoResult<Vec<u8>> {
    let max = multicast_block_payload(k);
    if message.len() > max {
        return Err(CryptoError::TooLarge {
            size: message.len(),
            max,
        });
    }

    // DB = lHash ‖ PS ‖ 0x01 ‖ M
    let db_len = k - HASH_LEN - 1;
    let mut db = Vec::with_capacity(db_len);
    db.extend_from_slice(label_hash);
    db.resize(db_len - message.len() - 1, 0);
    db.push(0x01);
    db.extend_from_slice(message);

    let mut seed = [0u8; HASH_LEN];
    fill_random(rng, &mut seed)?;

    xor_in_place(&mut db, &mgf1(&seed, db_len));
    xor_in_place(&mut seed, &mgf1(&db, HASH_LEN));

    let mut em = Vec::with_capacity(k);
    em.push(0x00);
    em.extend_from_slice(&seed);
    em.extend_from_slice(&db);
    Ok(em)
}

fn oaep_decode(em: &[u8], label_hash: &[u8; HASH_LEN]) -> CryptoResult<Vec<u8>> {
    if em.len() < 2 * HASH_LEN + 2 {
        return Err(CryptoError::OaepFailure);
    }

    let leading_zero = em[0].ct_eq(&0);
    let mut seed = em[1..=HASH_LEN].to_vec();
    let mut db = em[HASH_LEN + 1..].to_vec();

    xor_in_place(&mut seed, &mgf1(&db, HASH_LEN));
    let db_len = db.len();
    xor_in_place(&mut db, &mgf1(&seed, db_len));

    let (db_label_hash, rest) = db.split_at(HASH_LEN);
    let label_ok = db_label_hash.ct_eq(label_hash);

    // PS is zero bytes up to the 0x01 separator
    let separator = rest.iter().position(|&b| b != 0);
    let message_start = match separator {
        Some(i) if rest[i] == 0x01 => Some(i + 1),
        _ => None,
    };

    match message_start {
        Some(start) if bool::from(leading_zero & label_ok) => Ok(rest[start..].to_vec()),
        _ => Err(CryptoError::OaepFailure),
    }
}
