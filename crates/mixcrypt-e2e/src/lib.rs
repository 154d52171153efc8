//! mixcrypt-e2e: the authenticated end-to-end frame
//!
//! All operations are pure functions of DH keys in a [`CyclicGroup`]
//! (usually [`CyclicGroup::modp_2048`]) plus caller-supplied nonces and salts.
//!
//! - `session`: session key and the per-message key sequence
//! - `crypt`: XSalsa20 encryption with a top-bit-cleared MAC
//! - `auth`: auth keys, request fingerprints, ownership proofs, negotiation fingerprints
//! - `relationship`: order-independent relationship fingerprint and message IDs
//! - `residue`: key residues
//! - `ttl`: deterministic re-keying limits

pub mod auth;
pub mod crypt;
pub mod relationship;
pub mod residue;
pub mod session;
pub mod ttl;

pub use auth::{make_auth_key, negotiation_fingerprint, ownership_proof, request_fingerprint, verify_auth_key};
pub use crypt::{decrypt, encrypt};
pub use relationship::{relationship_fingerprint, MessageId};
pub use residue::KeyResidue;
pub use session::{derive_key, derive_keys, session_key, MessageKey};
pub use ttl::{generate_key_ttl, KeyTtl, TtlParams};

pub use mixcrypt_crypto::{CyclicGroup, LargeInt};
