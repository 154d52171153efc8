//! Group message wire formats
//!
//! ```text
//! internal: [timestamp: 8 LE][sender: 33][size: 2 LE][payload: size][zero padding]
//! public:   [salt: 32][encrypted internal]
//! ```
//!
//! Internal messages are padded to a fixed length before encryption so every
//! ciphertext for a given packet size looks the same.

use std::fmt;

use mixcrypt_core::{CryptoError, CryptoResult, Id, ID_LEN};
use mixcrypt_crypto::{hash_parts, HASH_LEN};

use crate::crypt::SALT_LEN;

const TIMESTAMP_LEN: usize = 8;
const SIZE_LEN: usize = 2;

/// Bytes of an internal message before the payload
pub const INTERNAL_HEADER_LEN: usize = TIMESTAMP_LEN + ID_LEN + SIZE_LEN;

/// Largest payload that fits an internal message of `internal_len` bytes.
pub fn max_internal_payload_size(internal_len: usize) -> usize {
    internal_len
        .saturating_sub(INTERNAL_HEADER_LEN)
        .min(usize::from(u16::MAX))
}

/// The plaintext every recipient decrypts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalMessage {
    /// Unix nanoseconds at send time
    pub timestamp: u64,
    pub sender: Id,
    pub payload: Vec<u8>,
}

impl InternalMessage {
    /// Encode into exactly `internal_len` bytes.
    pub fn to_bytes(&self, internal_len: usize) -> CryptoResult<Vec<u8>> {
        let max = max_internal_payload_size(internal_len);
        if self.payload.len() > max {
            return Err(CryptoError::TooLarge {
                size: self.payload.len(),
                max,
            });
        }
        let Ok(size) = u16::try_from(self.payload.len()) else {
            unreachable!("payload bounded by u16::MAX above");
        };
        let mut out = Vec::with_capacity(internal_len);
        out.extend_from_slice(&self.timestamp.to_le_bytes());
        out.extend_from_slice(self.sender.as_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&self.payload);
        out.resize(internal_len, 0);
        Ok(out)
    }

    pub fn from_bytes(data: &[u8]) -> CryptoResult<Self> {
        if data.len() < INTERNAL_HEADER_LEN {
            return Err(CryptoError::SizeOverflow {
                size: INTERNAL_HEADER_LEN,
                available: data.len(),
            });
        }
        let (timestamp, rest) = data.split_at(TIMESTAMP_LEN);
        let (sender, rest) = rest.split_at(ID_LEN);
        let (size, body) = rest.split_at(SIZE_LEN);

        let mut ts = [0u8; TIMESTAMP_LEN];
        ts.copy_from_slice(timestamp);
        let size = usize::from(u16::from_le_bytes([size[0], size[1]]));
        if size > body.len() {
            return Err(CryptoError::SizeOverflow {
                size,
                available: body.len(),
            });
        }

        Ok(Self {
            timestamp: u64::from_le_bytes(ts),
            sender: Id::from_bytes(sender)?,
            payload: body[..size].to_vec(),
        })
    }
}

/// What travels in the packet payload: the salt and the encrypted internal message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicMessage {
    pub salt: [u8; SALT_LEN],
    pub ciphertext: Vec<u8>,
}

impl PublicMessage {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SALT_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    pub fn from_bytes(data: &[u8]) -> CryptoResult<Self> {
        if data.len() < SALT_LEN {
            return Err(CryptoError::invalid_length("public group message", SALT_LEN, data.len()));
        }
        let (salt, ciphertext) = data.split_at(SALT_LEN);
        let mut s = [0u8; SALT_LEN];
        s.copy_from_slice(salt);
        Ok(Self {
            salt: s,
            ciphertext: ciphertext.to_vec(),
        })
    }
}

/// `H(group_id ‖ internal message bytes)`
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupMessageId([u8; HASH_LEN]);

impl GroupMessageId {
    pub fn new(group_id: &Id, internal: &[u8]) -> Self {
        Self(hash_parts(&[group_id.as_bytes(), internal]))
    }

    pub fn from_bytes(data: &[u8]) -> CryptoResult<Self> {
        <[u8; HASH_LEN]>::try_from(data)
            .map(Self)
            .map_err(|_| CryptoError::invalid_length("group message ID", HASH_LEN, data.len()))
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }
}

impl fmt::Debug for GroupMessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupMessageId(")?;
        for b in &self.0[..8] {
            write!(f, "{b:02x}")?;
        }
        write!(f, "..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixcrypt_core::IdType;

    fn msg(payload: &[u8]) -> InternalMessage {
        InternalMessage {
            timestamp: 1_700_000_000_000_000_000,
            sender: Id::new([4u8; 32], IdType::User),
            payload: payload.to_vec(),
        }
    }

    #[test]
    fn test_internal_layout() {
        let bytes = msg(b"abc").to_bytes(64).unwrap();
        assert_eq!(bytes.len(), 64);
        assert_eq!(&bytes[..8], &1_700_000_000_000_000_000u64.to_le_bytes());
        assert_eq!(&bytes[8 + ID_LEN..INTERNAL_HEADER_LEN], &[3u8, 0]);
        assert_eq!(&bytes[INTERNAL_HEADER_LEN..INTERNAL_HEADER_LEN + 3], b"abc");
        assert!(bytes[INTERNAL_HEADER_LEN + 3..].iter().all(|&b| b == 0));
        assert_eq!(InternalMessage::from_bytes(&bytes).unwrap(), msg(b"abc"));
    }

    #[test]
    fn test_internal_too_large() {
        let max = max_internal_payload_size(64);
        assert!(msg(&vec![1u8; max]).to_bytes(64).is_ok());
        assert!(matches!(
            msg(&vec![1u8; max + 1]).to_bytes(64),
            Err(CryptoError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_internal_size_overflow() {
        assert!(matches!(
            InternalMessage::from_bytes(&[0u8; INTERNAL_HEADER_LEN - 1]),
            Err(CryptoError::SizeOverflow { .. })
        ));
        let mut bytes = msg(b"abc").to_bytes(INTERNAL_HEADER_LEN + 3).unwrap();
        bytes[8 + ID_LEN] = 4;
        assert!(matches!(
            InternalMessage::from_bytes(&bytes),
            Err(CryptoError::SizeOverflow { size: 4, available: 3 })
        ));
    }

    #[test]
    fn test_public_message() {
        let public = PublicMessage {
            salt: [8u8; SALT_LEN],
            ciphertext: vec![1, 2, 3],
        };
        let bytes = public.to_bytes();
        assert_eq!(bytes.len(), SALT_LEN + 3);
        assert_eq!(PublicMessage::from_bytes(&bytes).unwrap(), public);
        assert!(PublicMessage::from_bytes(&[0u8; 31]).is_err());
    }

    #[test]
    fn test_message_id_binds_group() {
        let a = GroupMessageId::new(&Id::new([1; 32], IdType::Group), b"m");
        let b = GroupMessageId::new(&Id::new([2; 32], IdType::Group), b"m");
        assert_ne!(a, b);
        assert_eq!(GroupMessageId::from_bytes(a.as_bytes()).unwrap(), a);
    }
}
