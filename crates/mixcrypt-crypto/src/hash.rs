//! blake2b-256 and SHA-256 hashing

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use sha2::Sha256;

/// blake2b with a 256-bit output
pub type Blake2b256 = Blake2b<U32>;

/// Output length of `H`
pub const HASH_LEN: usize = 32;

/// `H(data)`
pub fn hash(data: &[u8]) -> [u8; HASH_LEN] {
    hash_parts(&[data])
}

/// `H(parts[0] ‖ parts[1] ‖ …)`
pub fn hash_parts(parts: &[&[u8]]) -> [u8; HASH_LEN] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// SHA-256 of a byte slice
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(data));
    out
}
