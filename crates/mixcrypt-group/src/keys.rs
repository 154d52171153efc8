//! Group identity and long-lived key
//!
//! ```text
//! group ID  = H(id_preimage  ‖ digest ‖ "GroupIDConstant"), type Group
//! group key = H(key_preimage ‖ digest ‖ "GroupKeyConstant")
//! ```
//!
//! The two preimages are drawn independently so the ID reveals nothing about
//! the key.

use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use mixcrypt_core::{CryptoError, CryptoResult, Id, IdType};
use mixcrypt_crypto::rng::random_array;
use mixcrypt_crypto::{hash_parts, KEY_SIZE};

use crate::membership::Membership;

pub const PREIMAGE_LEN: usize = 32;

const GROUP_ID_CONSTANT: &[u8] = b"GroupIDConstant";
const GROUP_KEY_CONSTANT: &[u8] = b"GroupKeyConstant";

macro_rules! preimage {
    ($(#[$doc:meta])* $name:ident, $what:literal) => {
        $(#[$doc])*
        #[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
        pub struct $name([u8; PREIMAGE_LEN]);

        impl $name {
            pub fn new<R: RngCore + CryptoRng>(rng: &mut R) -> CryptoResult<Self> {
                random_array(rng).map(Self)
            }

            pub fn from_bytes(data: &[u8]) -> CryptoResult<Self> {
                <[u8; PREIMAGE_LEN]>::try_from(data)
                    .map(Self)
                    .map_err(|_| CryptoError::invalid_length($what, PREIMAGE_LEN, data.len()))
            }

            pub fn as_bytes(&self) -> &[u8; PREIMAGE_LEN] {
                &self.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(concat!(stringify!($name), "([REDACTED])"))
            }
        }
    };
}

preimage!(
    /// Random input to the group ID.
    IdPreimage,
    "ID preimage"
);

preimage!(
    /// Random input to the group key.
    KeyPreimage,
    "key preimage"
);

/// The group's long-lived symmetric key; zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct GroupKey([u8; KEY_SIZE]);

impl GroupKey {
    pub fn from_bytes(data: &[u8]) -> CryptoResult<Self> {
        <[u8; KEY_SIZE]>::try_from(data)
            .map(Self)
            .map_err(|_| CryptoError::invalid_length("group key", KEY_SIZE, data.len()))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GroupKey([REDACTED])")
    }
}

pub fn new_id(preimage: &IdPreimage, membership: &Membership) -> Id {
    let digest = membership.digest();
    Id::new(
        hash_parts(&[preimage.as_bytes(), &digest, GROUP_ID_CONSTANT]),
        IdType::Group,
    )
}

pub fn new_key(preimage: &KeyPreimage, membership: &Membership) -> GroupKey {
    let digest = membership.digest();
    GroupKey(hash_parts(&[preimage.as_bytes(), &digest, GROUP_KEY_CONSTANT]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::testing::member;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_id_and_key_are_separated() {
        let m = Membership::new(member(1), &[member(2), member(3)]).unwrap();
        let id = new_id(&IdPreimage::from_bytes(&[7u8; 32]).unwrap(), &m);
        let key = new_key(&KeyPreimage::from_bytes(&[7u8; 32]).unwrap(), &m);
        assert_eq!(id.id_type(), IdType::Group);
        assert_ne!(id.content(), key.as_bytes());
    }

    #[test]
    fn test_id_depends_on_membership() {
        let pre = IdPreimage::from_bytes(&[0u8; 32]).unwrap();
        let a = Membership::new(member(1), &[member(2), member(3)]).unwrap();
        let b = Membership::new(member(2), &[member(1), member(3)]).unwrap();
        assert_ne!(new_id(&pre, &a), new_id(&pre, &b));
    }

    #[test]
    fn test_preimage_length() {
        assert!(matches!(
            IdPreimage::from_bytes(&[0u8; 31]),
            Err(CryptoError::InvalidLength { what: "ID preimage", .. })
        ));
        assert!(KeyPreimage::from_bytes(&[0u8; 33]).is_err());
    }

    #[test]
    fn test_random_preimages_differ() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = KeyPreimage::new(&mut rng).unwrap();
        let b = KeyPreimage::new(&mut rng).unwrap();
        assert_ne!(a, b);
        assert_eq!(format!("{a:?}"), "KeyPreimage([REDACTED])");
    }
}
