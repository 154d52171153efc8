//! Authenticated channel setup: auth keys, request fingerprints, ownership
//! proofs and re-auth negotiation fingerprints

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use mixcrypt_core::CryptoResult;
use mixcrypt_crypto::{hash_parts, CyclicGroup, Fingerprint, LargeInt, HASH_LEN};

const AUTH_KEY_CONSTANT: &[u8] = b"MakeAuthKey";
const REQUEST_FINGERPRINT_VECTOR: &[u8] = b"authRequestFingerprintVector";
const OWNERSHIP_VECTOR: &[u8] = b"ownershipVector";

/// `H(bytes(session) ‖ salt ‖ "MakeAuthKey")`
pub fn make_auth_key(session: &LargeInt, salt: &[u8]) -> Zeroizing<[u8; HASH_LEN]> {
    let session_bytes = Zeroizing::new(session.bytes());
    Zeroizing::new(hash_parts(&[
        session_bytes.as_slice(),
        salt,
        AUTH_KEY_CONSTANT,
    ]))
}

/// Recompute the auth key and compare it in constant time.
pub fn verify_auth_key(session: &LargeInt, salt: &[u8], received: &[u8]) -> bool {
    make_auth_key(session, salt)[..].ct_eq(received).into()
}

/// Routing tag for an auth request addressed to the holder of `public_key`.
pub fn request_fingerprint(public_key: &LargeInt) -> Fingerprint {
    Fingerprint::from_hash(hash_parts(&[
        public_key.bytes().as_slice(),
        REQUEST_FINGERPRINT_VECTOR,
    ]))
}

/// Proof that the sender holds the private half of a historical key:
/// `H(bytes(DH(own_hist_priv, partner_hist_pub)) ‖ "ownershipVector")`.
pub fn ownership_proof(
    group: &CyclicGroup,
    own_historical_private: &LargeInt,
    partner_historical_public: &LargeInt,
) -> CryptoResult<[u8; HASH_LEN]> {
    let shared = group.diffie_hellman(own_historical_private, partner_historical_public)?;
    let shared_bytes = Zeroizing::new(shared.bytes());
    Ok(hash_parts(&[shared_bytes.as_slice(), OWNERSHIP_VECTOR]))
}

pub fn verify_ownership_proof(
    group: &CyclicGroup,
    own_historical_private: &LargeInt,
    partner_historical_public: &LargeInt,
    received: &[u8],
) -> CryptoResult<bool> {
    let expected = ownership_proof(group, own_historical_private, partner_historical_public)?;
    Ok(expected[..].ct_eq(received).into())
}

/// Fingerprint of a re-auth negotiation: `H(bytes(dh_pub) ‖ variant ‖ sidh_pub)`.
///
/// `variant` identifies the post-quantum key variant; `sidh_public` is its
/// marshalled public key.
pub fn negotiation_fingerprint(
    partner_dh_public: &LargeInt,
    variant: u8,
    partner_sidh_public: &[u8],
) -> [u8; HASH_LEN] {
    hash_parts(&[
        partner_dh_public.bytes().as_slice(),
        &[variant],
        partner_sidh_public,
    ])
}
