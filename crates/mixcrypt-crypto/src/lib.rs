//! mixcrypt-crypto: primitive adapters and framing for the mixcrypt protocols
//!
//! The protocol crates only ever compose the functions here; nothing above this
//! layer touches a cipher or hash crate directly.
//!
//! ```text
//! H(x)            blake2b-256, unkeyed                      hash
//! HKDF            extract-and-expand over H                 hkdf
//! HMAC            HMAC over H                               mac
//! AEAD            XChaCha20-Poly1305, key = H(raw_key)      aead
//! XOR streams     XSalsa20 / XChaCha20 keystreams           stream
//! RSA             PSS sign, OAEP, multicast OAEP            rsa
//! DH              prime-order cyclic group                  cyclic
//! KEK             Argon2id                                  kdf
//! framing         sized broadcast, tag-delimited text       frame, tagged
//! ```
//!
//! Every value that lands in a mixnet slot (fingerprints, MACs, nonces) must
//! have its most significant bit cleared; see [`slot`].

pub mod aead;
pub mod cyclic;
pub mod encoding;
pub mod frame;
pub mod hash;
pub mod hkdf;
pub mod kdf;
pub mod mac;
pub mod rng;
pub mod rsa;
pub mod slot;
pub mod stream;
pub mod tagged;

pub use cyclic::{CyclicGroup, LargeInt};
pub use frame::{decode_sized_broadcast, max_sized_broadcast_payload_size, new_sized_broadcast};
pub use hash::{hash, hash_parts, HASH_LEN};
pub use kdf::{derive_kek, Kek, KdfParams};
pub use slot::{Fingerprint, Mac};

/// Size of a symmetric key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of an XChaCha20 / XSalsa20 nonce (192-bit)
pub const NONCE_SIZE: usize = 24;

/// Size of a Poly1305 authentication tag
pub const TAG_SIZE: usize = 16;
