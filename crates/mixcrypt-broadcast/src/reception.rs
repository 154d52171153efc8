//! Reception ID derivation
//!
//! ```text
//! RSA ID:        content = H(E ‖ N ‖ salt)
//! channel ID:    intermediary = H(name ‖ description ‖ H(pem(pub)) ‖ H(secret) ‖ salt)
//!                content      = HKDF(secret = intermediary, salt = salt, info = HKDF_INFO)
//! symmetric ID:  content      = H(salt ‖ name ‖ description ‖ SYMMETRIC_SALT_CONSTANT)
//! ```
//!
//! The channel secret only ever enters the derivation pre-hashed.

use mixcrypt_core::{CryptoError, CryptoResult, Id, IdType};
use mixcrypt_crypto::hkdf::hkdf_blake2b;
use mixcrypt_crypto::rsa::{public_key_parts, RsaPublicKey};
use mixcrypt_crypto::{hash, hash_parts, HASH_LEN};

/// Length of channel salts and secrets
pub const SALT_LEN: usize = 32;

/// HKDF info string shared by reception-ID and symmetric-key derivation
pub const HKDF_INFO: &[u8] = b"XX_Network_Broadcast_Channel_HKDF_Blake2b";

const SYMMETRIC_SALT_CONSTANT: &[u8] = b"symmetricBroadcastReceptionIdSalt";

/// Build an ID from an RSA public key and a 32-byte salt.
///
/// Only gateway, node and user IDs may be derived this way.
pub fn new_id_from_rsa(key: &RsaPublicKey, salt: &[u8], id_type: IdType) -> CryptoResult<Id> {
    if salt.len() != SALT_LEN {
        return Err(CryptoError::invalid_length("salt", SALT_LEN, salt.len()));
    }
    match id_type {
        IdType::Gateway | IdType::Node | IdType::User => {}
        other => return Err(CryptoError::UnsupportedType(other.as_byte())),
    }
    let (e, n) = public_key_parts(key);
    Ok(Id::new(hash_parts(&[e.as_slice(), n.as_slice(), salt]), id_type))
}

/// The intermediary every channel key and ID is derived from.
pub fn channel_intermediary(
    name: &str,
    description: &str,
    rsa_pub_key_hash: &[u8; HASH_LEN],
    secret: &[u8; SALT_LEN],
    salt: &[u8; SALT_LEN],
) -> [u8; HASH_LEN] {
    hash_parts(&[
        name.as_bytes(),
        description.as_bytes(),
        rsa_pub_key_hash,
        &hash(secret),
        salt,
    ])
}

/// Derive a channel's reception ID. Identical inputs always give the same ID.
pub fn new_channel_id(
    name: &str,
    description: &str,
    rsa_pub_key_hash: &[u8; HASH_LEN],
    secret: &[u8; SALT_LEN],
    salt: &[u8; SALT_LEN],
) -> Id {
    let intermediary = channel_intermediary(name, description, rsa_pub_key_hash, secret, salt);
    Id::new(hkdf_blake2b(&intermediary, Some(&salt[..]), HKDF_INFO), IdType::User)
}

/// `H(salt ‖ name ‖ description ‖ "symmetricBroadcastReceptionIdSalt")`
pub fn symmetric_reception_salt(salt: &[u8], name: &str, description: &str) -> [u8; HASH_LEN] {
    hash_parts(&[
        salt,
        name.as_bytes(),
        description.as_bytes(),
        SYMMETRIC_SALT_CONSTANT,
    ])
}

/// Reception ID for a symmetric-only broadcast with no RSA key.
pub fn new_symmetric_reception_id(salt: &[u8], name: &str, description: &str) -> CryptoResult<Id> {
    if salt.len() != SALT_LEN {
        return Err(CryptoError::invalid_length("salt", SALT_LEN, salt.len()));
    }
    Ok(Id::new(
        symmetric_reception_salt(salt, name, description),
        IdType::User,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixcrypt_crypto::rsa::generate_key;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::LazyLock;

    static PUBLIC: LazyLock<RsaPublicKey> = LazyLock::new(|| {
        generate_key(512, &mut StdRng::seed_from_u64(9))
            .unwrap()
            .to_public_key()
    });

    #[test]
    fn test_rsa_id_types() {
        let salt = [1u8; SALT_LEN];
        for ok in [IdType::Gateway, IdType::Node, IdType::User] {
            let id = new_id_from_rsa(&PUBLIC, &salt, ok).unwrap();
            assert_eq!(id.id_type(), ok);
        }
        for bad in [IdType::Generic, IdType::Group] {
            assert!(matches!(
                new_id_from_rsa(&PUBLIC, &salt, bad),
                Err(CryptoError::UnsupportedType(b)) if b == bad.as_byte()
            ));
        }
    }

    #[test]
    fn test_rsa_id_salt_length() {
        assert!(matches!(
            new_id_from_rsa(&PUBLIC, &[0u8; 31], IdType::User),
            Err(CryptoError::InvalidLength { what: "salt", got: 31, .. })
        ));
    }

    #[test]
    fn test_rsa_id_depends_on_salt() {
        let a = new_id_from_rsa(&PUBLIC, &[1u8; 32], IdType::User).unwrap();
        let b = new_id_from_rsa(&PUBLIC, &[2u8; 32], IdType::User).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_channel_id_changes_with_each_field() {
        let base = new_channel_id("name", "desc", &[1; 32], &[2; 32], &[3; 32]);
        assert_eq!(base.id_type(), IdType::User);
        assert_ne!(base, new_channel_id("name2", "desc", &[1; 32], &[2; 32], &[3; 32]));
        assert_ne!(base, new_channel_id("name", "desc2", &[1; 32], &[2; 32], &[3; 32]));
        assert_ne!(base, new_channel_id("name", "desc", &[9; 32], &[2; 32], &[3; 32]));
        assert_ne!(base, new_channel_id("name", "desc", &[1; 32], &[9; 32], &[3; 32]));
        assert_ne!(base, new_channel_id("name", "desc", &[1; 32], &[2; 32], &[9; 32]));
    }

    #[test]
    fn test_symmetric_reception_id() {
        let a = new_symmetric_reception_id(&[5u8; 32], "name", "desc").unwrap();
        let b = new_symmetric_reception_id(&[5u8; 32], "name", "desc").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, new_symmetric_reception_id(&[6u8; 32], "name", "desc").unwrap());
        assert!(new_symmetric_reception_id(&[5u8; 16], "name", "desc").is_err());
    }

    proptest! {
        #[test]
        fn channel_id_is_deterministic(
            name in "[a-zA-Z0-9_]{1,24}",
            desc in ".{0,64}",
            key_hash in any::<[u8; 32]>(),
            secret in any::<[u8; 32]>(),
            salt in any::<[u8; 32]>(),
        ) {
            let a = new_channel_id(&name, &desc, &key_hash, &secret, &salt);
            let b = new_channel_id(&name, &desc, &key_hash, &secret, &salt);
            prop_assert_eq!(a, b);
        }
    }
}
