//! base64 helpers shared by URL, JSON and export codecs

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;

use mixcrypt_core::{CryptoError, CryptoResult};

pub fn to_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

pub fn from_base64(what: &str, data: &str) -> CryptoResult<Vec<u8>> {
    STANDARD
        .decode(data)
        .map_err(|e| CryptoError::malformed(format!("{what} is not valid base64: {e}")))
}

/// URL-safe base64 without padding, for query parameters.
pub fn to_base64_url(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

pub fn from_base64_url(what: &str, data: &str) -> CryptoResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(data)
        .map_err(|e| CryptoError::malformed(format!("{what} is not valid base64: {e}")))
}

/// Decode base64 into a fixed-size array, rejecting other lengths.
pub fn from_base64_array<const N: usize>(what: &'static str, data: &str) -> CryptoResult<[u8; N]> {
    let raw = from_base64(what, data)?;
    <[u8; N]>::try_from(raw.as_slice()).map_err(|_| CryptoError::invalid_length(what, N, raw.len()))
}

/// Serde adapters for byte fields carried as standard base64 strings.
pub mod serde_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer, T: AsRef<[u8]>>(value: &T, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>, T: TryFrom<Vec<u8>>>(d: D) -> Result<T, D::Error> {
        let s = String::deserialize(d)?;
        let raw = STANDARD.decode(&s).map_err(serde::de::Error::custom)?;
        let len = raw.len();
        T::try_from(raw)
            .map_err(|_| serde::de::Error::custom(format!("unexpected byte length {len}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_form_has_no_reserved_chars() {
        let encoded = to_base64_url(&[0xFB, 0xFF, 0xFE, 0x00]);
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('='));
        assert_eq!(from_base64_url("x", &encoded).unwrap(), vec![0xFB, 0xFF, 0xFE, 0x00]);
    }

    #[test]
    fn test_array_length_checked() {
        let encoded = to_base64(&[1u8; 31]);
        assert!(matches!(
            from_base64_array::<32>("salt", &encoded),
            Err(CryptoError::InvalidLength { what: "salt", expected: 32, got: 31 })
        ));
        let encoded = to_base64(&[1u8; 32]);
        assert_eq!(from_base64_array::<32>("salt", &encoded).unwrap(), [1u8; 32]);
    }

    #[test]
    fn test_invalid_base64() {
        assert!(matches!(from_base64("salt", "!!"), Err(CryptoError::Malformed(_))));
    }
}
