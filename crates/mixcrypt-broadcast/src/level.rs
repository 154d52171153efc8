//! Privacy levels and channel options

use serde::{Deserialize, Serialize};

use mixcrypt_core::{CryptoError, CryptoResult};

/// How much of a channel a share URL reveals in the clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PrivacyLevel {
    /// Everything, including the secret, is in the URL query
    Public = 0,
    /// Name, description and creation time are visible; the rest is encrypted
    Private = 1,
    /// Everything is encrypted
    Secret = 2,
}

impl PrivacyLevel {
    pub fn from_byte(b: u8) -> CryptoResult<Self> {
        match b {
            0 => Ok(Self::Public),
            1 => Ok(Self::Private),
            2 => Ok(Self::Secret),
            other => Err(CryptoError::InvalidPrivacyLevel(other)),
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// True if the level is one of the known values.
    ///
    /// Always true for a constructed value; raw bytes are checked via [`from_byte`](Self::from_byte).
    pub fn verify(self) -> bool {
        Self::from_byte(self.as_byte()).is_ok()
    }

    /// Whether sharing at this level needs a password.
    pub fn needs_password(self) -> bool {
        !matches!(self, Self::Public)
    }
}

impl std::fmt::Display for PrivacyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Public => "Public",
            Self::Private => "Private",
            Self::Secret => "Secret",
        };
        f.write_str(s)
    }
}

/// Who may post to a channel besides its admin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminLevel {
    #[default]
    Normal,
    /// Only the admin posts
    Announcement,
    /// Admin commands are disabled
    Free,
}

/// Structured channel tail, not covered by the reception ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub admin_level: AdminLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_bytes() {
        for level in [PrivacyLevel::Public, PrivacyLevel::Private, PrivacyLevel::Secret] {
            assert_eq!(PrivacyLevel::from_byte(level.as_byte()).unwrap(), level);
            assert!(level.verify());
        }
        assert!(matches!(
            PrivacyLevel::from_byte(3),
            Err(CryptoError::InvalidPrivacyLevel(3))
        ));
    }

    #[test]
    fn test_options_default_from_empty_json() {
        let opts: Options = serde_json::from_str("{}").unwrap();
        assert_eq!(opts.admin_level, AdminLevel::Normal);

        let opts: Options = serde_json::from_str(r#"{"admin_level":"announcement"}"#).unwrap();
        assert_eq!(opts.admin_level, AdminLevel::Announcement);
    }
}
