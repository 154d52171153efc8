//! Values that travel in mixnet message slots
//!
//! A slot value is interpreted as an element of the underlying cyclic group, so
//! its most significant bit must be zero. The bit is cleared where the value is
//! produced ([`Fingerprint::from_hash`], [`Mac::from_hash`]) and checked where it
//! is consumed ([`Fingerprint::from_bytes`], [`Mac::verify`]).

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use subtle::ConstantTimeEq;

use mixcrypt_core::{CryptoError, CryptoResult};

/// Length of every slot value
pub const SLOT_LEN: usize = 32;

/// Clear the most significant bit of a slot value in place.
pub fn clear_msb(value: &mut [u8]) {
    if let Some(first) = value.first_mut() {
        *first &= 0x7F;
    }
}

/// True if the most significant bit is zero (or the value is empty).
pub fn msb_is_clear(value: &[u8]) -> bool {
    value.first().is_none_or(|b| b & 0x80 == 0)
}

macro_rules! slot_value {
    ($(#[$doc:meta])* $name:ident, $what:literal) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; SLOT_LEN]);

        impl $name {
            /// Build from freshly derived bytes, clearing the top bit.
            pub fn from_hash(mut bytes: [u8; SLOT_LEN]) -> Self {
                clear_msb(&mut bytes);
                Self(bytes)
            }

            /// Parse a received value, rejecting bad lengths and a set top bit.
            pub fn from_bytes(data: &[u8]) -> CryptoResult<Self> {
                if data.len() != SLOT_LEN {
                    return Err(CryptoError::invalid_length($what, SLOT_LEN, data.len()));
                }
                if !msb_is_clear(data) {
                    return Err(CryptoError::malformed(concat!($what, " has its top bit set")));
                }
                let mut bytes = [0u8; SLOT_LEN];
                bytes.copy_from_slice(data);
                Ok(Self(bytes))
            }

            pub fn as_bytes(&self) -> &[u8; SLOT_LEN] {
                &self.0
            }

            pub fn to_vec(&self) -> Vec<u8> {
                self.0.to_vec()
            }

            /// Constant-time comparison against received bytes.
            pub fn verify(&self, received: &[u8]) -> bool {
                if received.len() != SLOT_LEN || !msb_is_clear(received) {
                    return false;
                }
                self.0[..].ct_eq(received).into()
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), STANDARD.encode(self.0))
            }
        }
    };
}

slot_value!(
    /// A 32-byte routing tag (key fingerprint or symmetric nonce), top bit zero.
    Fingerprint,
    "fingerprint"
);

slot_value!(
    /// A 32-byte message authentication code, top bit zero.
    Mac,
    "MAC"
);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_from_bytes_rejects_top_bit() {
        let mut raw = [0u8; SLOT_LEN];
        raw[0] = 0x80;
        assert!(matches!(
            Fingerprint::from_bytes(&raw),
            Err(CryptoError::Malformed(_))
        ));
        raw[0] = 0x7F;
        assert!(Fingerprint::from_bytes(&raw).is_ok());
    }

    #[test]
    fn test_from_bytes_rejects_length() {
        assert!(matches!(
            Mac::from_bytes(&[0u8; 31]),
            Err(CryptoError::InvalidLength { got: 31, .. })
        ));
    }

    #[test]
    fn test_verify() {
        let mac = Mac::from_hash([0xFFu8; SLOT_LEN]);
        let mut received = mac.to_vec();
        assert!(mac.verify(&received));

        received[5] ^= 1;
        assert!(!mac.verify(&received));

        // Top bit set can never verify even if the rest matches
        let mut flipped = mac.to_vec();
        flipped[0] |= 0x80;
        assert!(!mac.verify(&flipped));
    }

    proptest! {
        #[test]
        fn from_hash_always_clears_msb(bytes in any::<[u8; 32]>()) {
            let fp = Fingerprint::from_hash(bytes);
            prop_assert!(msb_is_clear(fp.as_bytes()));
            prop_assert_eq!(&fp.as_bytes()[1..], &bytes[1..]);
        }
    }
}
