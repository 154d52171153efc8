//! HKDF extract-and-expand over blake2b-256

use ::hkdf::SimpleHkdf;

use crate::hash::Blake2b256;
use crate::KEY_SIZE;

/// `HKDF(secret, salt, info, 32)` with blake2b-256 as the hash.
///
/// A `None` salt is the all-zero salt, matching RFC 5869.
pub fn hkdf_blake2b(secret: &[u8], salt: Option<&[u8]>, info: &[u8]) -> [u8; KEY_SIZE] {
    let hkdf = SimpleHkdf::<Blake2b256>::new(salt, secret);
    let mut okm = [0u8; KEY_SIZE];
    let Ok(()) = hkdf.expand(info, &mut okm) else {
        unreachable!("32 bytes is a valid HKDF-blake2b output length");
    };
    okm
}
