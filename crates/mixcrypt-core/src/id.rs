//! Typed 33-byte identifiers
//!
//! Layout: `[32 bytes: content][1 byte: type]`. Identifiers are always produced
//! by hashing typed material; the constructors here only assemble and validate.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CryptoError, CryptoResult};

/// Length of the content portion of an ID
pub const ID_CONTENT_LEN: usize = 32;

/// Total length of a marshalled ID (content + type byte)
pub const ID_LEN: usize = ID_CONTENT_LEN + 1;

/// The kind of entity an [`Id`] names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum IdType {
    Generic = 0,
    User = 1,
    Gateway = 2,
    Node = 3,
    Group = 4,
}

impl IdType {
    pub fn from_byte(b: u8) -> CryptoResult<Self> {
        match b {
            0 => Ok(Self::Generic),
            1 => Ok(Self::User),
            2 => Ok(Self::Gateway),
            3 => Ok(Self::Node),
            4 => Ok(Self::Group),
            other => Err(CryptoError::UnsupportedType(other)),
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for IdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Generic => "generic",
            Self::User => "user",
            Self::Gateway => "gateway",
            Self::Node => "node",
            Self::Group => "group",
        };
        f.write_str(s)
    }
}

/// A 33-byte identifier. Ordering is raw byte lexicographic order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id([u8; ID_LEN]);

impl Id {
    /// Assemble an ID from its 32 content bytes and type.
    pub fn new(content: [u8; ID_CONTENT_LEN], id_type: IdType) -> Self {
        let mut bytes = [0u8; ID_LEN];
        bytes[..ID_CONTENT_LEN].copy_from_slice(&content);
        bytes[ID_CONTENT_LEN] = id_type.as_byte();
        Self(bytes)
    }

    /// Parse a marshalled ID, validating its length and type byte.
    pub fn from_bytes(data: &[u8]) -> CryptoResult<Self> {
        if data.len() != ID_LEN {
            return Err(CryptoError::invalid_length("ID", ID_LEN, data.len()));
        }
        IdType::from_byte(data[ID_CONTENT_LEN])?;
        let mut bytes = [0u8; ID_LEN];
        bytes.copy_from_slice(data);
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    pub fn content(&self) -> &[u8] {
        &self.0[..ID_CONTENT_LEN]
    }

    pub fn id_type(&self) -> IdType {
        // The type byte is validated at every construction site
        IdType::from_byte(self.0[ID_CONTENT_LEN]).unwrap_or(IdType::Generic)
    }

    /// Standard base64 of all 33 bytes
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    pub fn from_base64(s: &str) -> CryptoResult<Self> {
        let data = STANDARD
            .decode(s)
            .map_err(|e| CryptoError::malformed(format!("ID base64: {e}")))?;
        Self::from_bytes(&data)
    }
}

impl AsRef<[u8]> for Id {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl std::fmt::Debug for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Id({}, {})", self.to_base64(), self.id_type())
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_base64(&s).map_err(serde::de::Error::custom)
    }
}
