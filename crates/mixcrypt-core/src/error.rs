use thiserror::Error;

use crate::id::Id;

pub type CryptoResult<T> = Result<T, CryptoError>;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid {what} length: got {got} bytes, expected {expected}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("unsupported ID type: {0}")]
    UnsupportedType(u8),

    #[error("invalid privacy level: {0}")]
    InvalidPrivacyLevel(u8),

    #[error("duplicate member in membership: {0}")]
    DuplicateMember(Id),

    #[error("too few members: {got} (minimum {min})")]
    TooFewMembers { got: usize, min: usize },

    #[error("too many members: {got} (maximum {max})")]
    TooManyMembers { got: usize, max: usize },

    #[error("MAC mismatch")]
    MacMismatch,

    #[error("AEAD decryption failed: wrong key or corrupted data")]
    AeadFailure,

    #[error("OAEP decoding failed")]
    OaepFailure,

    #[error("malformed input: {0}")]
    Malformed(String),

    #[error("version mismatch: expected {expected}, got {got}")]
    VersionMismatch { expected: u32, got: u32 },

    #[error("unsupported version: {0}")]
    UnsupportedVersion(String),

    #[error("max uses mismatch: URL has {url}, encrypted data has {encrypted}")]
    MaxUsesMismatch { url: u16, encrypted: u16 },

    #[error("RNG failure: {0}")]
    Rng(String),

    #[error("size {size} overflows buffer of {available} bytes")]
    SizeOverflow { size: usize, available: usize },

    #[error("payload of {size} bytes is too large (maximum {max})")]
    TooLarge { size: usize, max: usize },

    #[error("name is {len} characters (maximum {max})")]
    NameTooLong { len: usize, max: usize },

    #[error("description is {len} characters (maximum {max})")]
    DescriptionTooLong { len: usize, max: usize },

    #[error("public key does not match channel")]
    PublicKeyMismatch,

    #[error("invalid key TTL range: min {min} must be below max {max}")]
    InvalidTtlRange { min: u16, max: u16 },

    #[error("RSA error: {0}")]
    Rsa(String),

    #[error("KDF error: {0}")]
    Kdf(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CryptoError {
    /// Shorthand for an [`CryptoError::InvalidLength`] on a named field.
    pub fn invalid_length(what: &'static str, expected: usize, got: usize) -> Self {
        Self::InvalidLength {
            what,
            expected,
            got,
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}
