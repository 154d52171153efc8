//! Channel URL codec shared by share and invite URLs
//!
//! Query parameters by privacy level:
//! ```text
//! Public   v, 0Name, 1Description, 2Level, 3Created, s, k, l, p, e, m
//! Private  v, 0Name, 1Description, 3Created, d, m
//! Secret   v, d, m
//! ```
//!
//! `d` is `base64url(nonce ‖ XChaCha20-Poly1305(H(password), blob))`, with blobs
//! (integers little-endian):
//! ```text
//! Private  [1: level][32: salt][32: key hash][2: key len][2: sub-payloads][32: secret][2: max uses]
//! Secret   [1: level][2: name len][2: desc len][name][desc][8: created]
//!          [32: salt][32: key hash][2: key len][2: sub-payloads][32: secret][2: max uses]
//! ```
//!
//! Decoding picks the level from the keys present: `s` → Public, `0Name` →
//! Private, `d` → Secret.

use std::collections::HashMap;
use std::str::FromStr;

use rand::{CryptoRng, RngCore};
use url::Url;
use zeroize::Zeroizing;

use mixcrypt_core::{CryptoError, CryptoResult};
use mixcrypt_crypto::aead;
use mixcrypt_crypto::encoding::{from_base64_url, to_base64_url};
use mixcrypt_crypto::HASH_LEN;

use crate::channel::{Channel, ChannelFields};
use crate::level::{Options, PrivacyLevel};
use crate::password::generate_password;
use crate::reception::SALT_LEN;

const VERSION_KEY: &str = "v";
const MAX_USES_KEY: &str = "m";
const NAME_KEY: &str = "0Name";
const DESCRIPTION_KEY: &str = "1Description";
const LEVEL_KEY: &str = "2Level";
const CREATED_KEY: &str = "3Created";
const SALT_KEY: &str = "s";
const RSA_PUB_KEY_HASH_KEY: &str = "k";
const RSA_PUB_KEY_LENGTH_KEY: &str = "l";
const RSA_SUB_PAYLOADS_KEY: &str = "p";
const SECRET_KEY: &str = "e";
const DATA_KEY: &str = "d";

const PRIV_LEVEL_LEN: usize = 1;
const RSA_PUB_KEY_LENGTH_LEN: usize = 2;
const RSA_SUB_PAYLOADS_LEN: usize = 2;
const MAX_USES_LEN: usize = 2;
const CREATED_LEN: usize = 8;
const NAME_LEN_LEN: usize = 2;
const DESCRIPTION_LEN_LEN: usize = 2;

/// Length of the Private blob
pub(crate) const MARSHALLED_PRIVATE_LEN: usize = PRIV_LEVEL_LEN
    + SALT_LEN
    + HASH_LEN
    + RSA_PUB_KEY_LENGTH_LEN
    + RSA_SUB_PAYLOADS_LEN
    + SALT_LEN
    + MAX_USES_LEN;

/// Length of the Secret blob before the name and description
pub(crate) const MARSHALLED_SECRET_LEN: usize =
    MARSHALLED_PRIVATE_LEN + NAME_LEN_LEN + DESCRIPTION_LEN_LEN + CREATED_LEN;

/// One URL dialect: share and invite URLs differ only in their version namespace.
pub(crate) struct UrlCodec {
    pub version: u32,
    pub kind: &'static str,
}

impl UrlCodec {
    /// Encode `channel` at its own privacy level.
    ///
    /// Returns the URL and the password protecting it (empty for Public).
    pub(crate) fn encode<R: RngCore + CryptoRng>(
        &self,
        channel: &Channel,
        host: &str,
        max_uses: u16,
        rng: &mut R,
    ) -> CryptoResult<(String, Zeroizing<String>)> {
        let mut url = Url::parse(host)
            .map_err(|e| CryptoError::malformed(format!("{} URL host {host:?}: {e}", self.kind)))?;
        let fields = channel.fields();
        let level = channel.level();

        let mut password = Zeroizing::new(String::new());
        let data = match level {
            PrivacyLevel::Public => None,
            PrivacyLevel::Private | PrivacyLevel::Secret => {
                password = generate_password(rng)?;
                let blob = if level == PrivacyLevel::Private {
                    marshal_private(&fields, max_uses)
                } else {
                    marshal_secret(&fields, max_uses)?
                };
                Some(to_base64_url(&aead::seal_prefixed(
                    password.as_bytes(),
                    &blob,
                    rng,
                )?))
            }
        };

        {
            let mut query = url.query_pairs_mut();
            query.clear();
            query.append_pair(VERSION_KEY, &self.version.to_string());
            match level {
                PrivacyLevel::Public => {
                    query
                        .append_pair(NAME_KEY, &fields.name)
                        .append_pair(DESCRIPTION_KEY, &fields.description)
                        .append_pair(LEVEL_KEY, &level.as_byte().to_string())
                        .append_pair(CREATED_KEY, &fields.created.to_string())
                        .append_pair(SALT_KEY, &to_base64_url(&fields.salt))
                        .append_pair(RSA_PUB_KEY_HASH_KEY, &to_base64_url(&fields.rsa_pub_key_hash))
                        .append_pair(RSA_PUB_KEY_LENGTH_KEY, &fields.rsa_pub_key_length.to_string())
                        .append_pair(RSA_SUB_PAYLOADS_KEY, &fields.rsa_sub_payloads.to_string())
                        .append_pair(SECRET_KEY, &to_base64_url(&fields.secret));
                }
                PrivacyLevel::Private => {
                    query
                        .append_pair(NAME_KEY, &fields.name)
                        .append_pair(DESCRIPTION_KEY, &fields.description)
                        .append_pair(CREATED_KEY, &fields.created.to_string());
                }
                PrivacyLevel::Secret => {}
            }
            if let Some(data) = &data {
                query.append_pair(DATA_KEY, data);
            }
            query.append_pair(MAX_USES_KEY, &max_uses.to_string());
        }

        tracing::debug!(
            kind = self.kind,
            version = self.version,
            level = %level,
            max_uses,
            "encoded channel URL"
        );
        Ok((url.into(), password))
    }

    /// Decode a URL produced by [`encode`](Self::encode) with this dialect.
    ///
    /// Returns the channel and the URL's max-uses value.
    pub(crate) fn decode(&self, url: &str, password: &str) -> CryptoResult<(Channel, u16)> {
        let query = parse_query(url)?;

        let got: u32 = parse_number(&query, VERSION_KEY)?;
        if got != self.version {
            return Err(CryptoError::VersionMismatch {
                expected: self.version,
                got,
            });
        }
        let max_uses: u16 = parse_number(&query, MAX_USES_KEY)?;

        let level = level_from_query(&query)?;
        let fields = match level {
            PrivacyLevel::Public => decode_public(&query)?,
            PrivacyLevel::Private => {
                let blob = decrypt_data(&query, password)?;
                let (mut fields, encrypted_max_uses) = unmarshal_private(&blob)?;
                check_max_uses(max_uses, encrypted_max_uses)?;
                fields.name = required(&query, NAME_KEY)?.to_string();
                fields.description = required(&query, DESCRIPTION_KEY)?.to_string();
                fields.created = parse_number(&query, CREATED_KEY)?;
                fields
            }
            PrivacyLevel::Secret => {
                let blob = decrypt_data(&query, password)?;
                let (fields, encrypted_max_uses) = unmarshal_secret(&blob)?;
                check_max_uses(max_uses, encrypted_max_uses)?;
                fields
            }
        };

        let channel = Channel::assemble(fields, Options::default())?;
        tracing::debug!(
            kind = self.kind,
            version = got,
            level = %level,
            id = %channel.reception_id(),
            "decoded channel URL"
        );
        Ok((channel, max_uses))
    }

    /// The privacy level of a URL, judged by which keys it carries.
    pub(crate) fn level(&self, url: &str) -> CryptoResult<PrivacyLevel> {
        level_from_query(&parse_query(url)?)
    }
}

fn parse_query(url: &str) -> CryptoResult<HashMap<String, String>> {
    let url = Url::parse(url).map_err(|e| CryptoError::malformed(format!("channel URL: {e}")))?;
    Ok(url.query_pairs().into_owned().collect())
}

fn level_from_query(query: &HashMap<String, String>) -> CryptoResult<PrivacyLevel> {
    if query.contains_key(SALT_KEY) {
        Ok(PrivacyLevel::Public)
    } else if query.contains_key(NAME_KEY) {
        Ok(PrivacyLevel::Private)
    } else if query.contains_key(DATA_KEY) {
        Ok(PrivacyLevel::Secret)
    } else {
        Err(CryptoError::malformed(
            "channel URL carries no channel fields",
        ))
    }
}

fn required<'a>(query: &'a HashMap<String, String>, key: &str) -> CryptoResult<&'a str> {
    query
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| CryptoError::malformed(format!("channel URL is missing {key:?}")))
}

fn parse_number<T: FromStr>(query: &HashMap<String, String>, key: &str) -> CryptoResult<T> {
    let raw = required(query, key)?;
    raw.parse()
        .map_err(|_| CryptoError::malformed(format!("channel URL {key:?} is not a number: {raw:?}")))
}

fn parse_array<const N: usize>(
    query: &HashMap<String, String>,
    key: &str,
    what: &'static str,
) -> CryptoResult<[u8; N]> {
    let raw = from_base64_url(what, required(query, key)?)?;
    <[u8; N]>::try_from(raw.as_slice()).map_err(|_| CryptoError::invalid_length(what, N, raw.len()))
}

fn check_max_uses(url: u16, encrypted: u16) -> CryptoResult<()> {
    if url != encrypted {
        return Err(CryptoError::MaxUsesMismatch { url, encrypted });
    }
    Ok(())
}

fn decrypt_data(query: &HashMap<String, String>, password: &str) -> CryptoResult<Zeroizing<Vec<u8>>> {
    let data = from_base64_url("encrypted channel data", required(query, DATA_KEY)?)?;
    Ok(Zeroizing::new(aead::open_prefixed(password.as_bytes(), &data)?))
}

fn decode_public(query: &HashMap<String, String>) -> CryptoResult<ChannelFields> {
    Ok(ChannelFields {
        name: required(query, NAME_KEY)?.to_string(),
        description: required(query, DESCRIPTION_KEY)?.to_string(),
        level: PrivacyLevel::from_byte(parse_number(query, LEVEL_KEY)?)?,
        created: parse_number(query, CREATED_KEY)?,
        salt: parse_array(query, SALT_KEY, "salt")?,
        rsa_pub_key_hash: parse_array(query, RSA_PUB_KEY_HASH_KEY, "RSA public key hash")?,
        rsa_pub_key_length: parse_number(query, RSA_PUB_KEY_LENGTH_KEY)?,
        rsa_sub_payloads: parse_number(query, RSA_SUB_PAYLOADS_KEY)?,
        secret: parse_array(query, SECRET_KEY, "secret")?,
    })
}

fn put_key_material(out: &mut Vec<u8>, fields: &ChannelFields, max_uses: u16) {
    out.extend_from_slice(&fields.salt);
    out.extend_from_slice(&fields.rsa_pub_key_hash);
    out.extend_from_slice(&fields.rsa_pub_key_length.to_le_bytes());
    out.extend_from_slice(&fields.rsa_sub_payloads.to_le_bytes());
    out.extend_from_slice(&fields.secret);
    out.extend_from_slice(&max_uses.to_le_bytes());
}

fn marshal_private(fields: &ChannelFields, max_uses: u16) -> Zeroizing<Vec<u8>> {
    let mut out = Zeroizing::new(Vec::with_capacity(MARSHALLED_PRIVATE_LEN));
    out.push(fields.level.as_byte());
    put_key_material(&mut out, fields, max_uses);
    out
}

fn marshal_secret(fields: &ChannelFields, max_uses: u16) -> CryptoResult<Zeroizing<Vec<u8>>> {
    let name_len = u16::try_from(fields.name.len())
        .map_err(|_| CryptoError::malformed("channel name does not fit a u16 length"))?;
    let description_len = u16::try_from(fields.description.len())
        .map_err(|_| CryptoError::malformed("channel description does not fit a u16 length"))?;

    let mut out = Zeroizing::new(Vec::with_capacity(
        MARSHALLED_SECRET_LEN + fields.name.len() + fields.description.len(),
    ));
    out.push(fields.level.as_byte());
    out.extend_from_slice(&name_len.to_le_bytes());
    out.extend_from_slice(&description_len.to_le_bytes());
    out.extend_from_slice(fields.name.as_bytes());
    out.extend_from_slice(fields.description.as_bytes());
    out.extend_from_slice(&fields.created.to_le_bytes());
    put_key_material(&mut out, fields, max_uses);
    Ok(out)
}

/// Sequential reader over a decrypted blob.
struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize, what: &'static str) -> CryptoResult<&'a [u8]> {
        if self.data.len() < n {
            return Err(CryptoError::invalid_length(what, n, self.data.len()));
        }
        let (head, rest) = self.data.split_at(n);
        self.data = rest;
        Ok(head)
    }

    fn array<const N: usize>(&mut self, what: &'static str) -> CryptoResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, what)?);
        Ok(out)
    }

    fn u16(&mut self, what: &'static str) -> CryptoResult<u16> {
        Ok(u16::from_le_bytes(self.array(what)?))
    }

    fn string(&mut self, n: usize, what: &'static str) -> CryptoResult<String> {
        String::from_utf8(self.take(n, what)?.to_vec())
            .map_err(|_| CryptoError::malformed(format!("{what} is not UTF-8")))
    }

    fn finish(self) -> CryptoResult<()> {
        if !self.data.is_empty() {
            return Err(CryptoError::malformed(format!(
                "{} trailing bytes in channel data",
                self.data.len()
            )));
        }
        Ok(())
    }
}

/// Read salt through max uses into `fields`, returning max uses.
fn read_key_material(reader: &mut Reader<'_>, fields: &mut ChannelFields) -> CryptoResult<u16> {
    fields.salt = reader.array("salt")?;
    fields.rsa_pub_key_hash = reader.array("RSA public key hash")?;
    fields.rsa_pub_key_length = reader.u16("RSA public key length")?;
    fields.rsa_sub_payloads = reader.u16("RSA sub-payloads")?;
    fields.secret = reader.array("secret")?;
    reader.u16("max uses")
}

/// Read the level byte and require it to match the URL form being decoded.
fn read_level(reader: &mut Reader<'_>, expected: PrivacyLevel) -> CryptoResult<PrivacyLevel> {
    let [byte] = reader.array::<1>("privacy level")?;
    let level = PrivacyLevel::from_byte(byte)?;
    if level != expected {
        return Err(CryptoError::InvalidPrivacyLevel(byte));
    }
    Ok(level)
}

fn empty_fields(level: PrivacyLevel) -> ChannelFields {
    ChannelFields {
        name: String::new(),
        description: String::new(),
        level,
        created: 0,
        salt: [0; SALT_LEN],
        rsa_pub_key_hash: [0; HASH_LEN],
        rsa_pub_key_length: 0,
        rsa_sub_payloads: 0,
        secret: [0; SALT_LEN],
    }
}

fn unmarshal_private(blob: &[u8]) -> CryptoResult<(ChannelFields, u16)> {
    if blob.len() != MARSHALLED_PRIVATE_LEN {
        return Err(CryptoError::invalid_length(
            "private channel data",
            MARSHALLED_PRIVATE_LEN,
            blob.len(),
        ));
    }
    let mut reader = Reader { data: blob };
    let mut fields = empty_fields(read_level(&mut reader, PrivacyLevel::Private)?);
    let max_uses = read_key_material(&mut reader, &mut fields)?;
    reader.finish()?;
    Ok((fields, max_uses))
}

fn unmarshal_secret(blob: &[u8]) -> CryptoResult<(ChannelFields, u16)> {
    if blob.len() < MARSHALLED_SECRET_LEN {
        return Err(CryptoError::invalid_length(
            "secret channel data",
            MARSHALLED_SECRET_LEN,
            blob.len(),
        ));
    }
    let mut reader = Reader { data: blob };
    let mut fields = empty_fields(read_level(&mut reader, PrivacyLevel::Secret)?);
    let name_len = usize::from(reader.u16("name length")?);
    let description_len = usize::from(reader.u16("description length")?);
    fields.name = reader.string(name_len, "name")?;
    fields.description = reader.string(description_len, "description")?;
    fields.created = u64::from_le_bytes(reader.array("created")?);
    let max_uses = read_key_material(&mut reader, &mut fields)?;
    reader.finish()?;
    Ok((fields, max_uses))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> ChannelFields {
        ChannelFields {
            name: "name".into(),
            description: "a description".into(),
            level: PrivacyLevel::Secret,
            created: 1_700_000_000_000_000_000,
            salt: [1; SALT_LEN],
            rsa_pub_key_hash: [2; HASH_LEN],
            rsa_pub_key_length: 128,
            rsa_sub_payloads: 1,
            secret: [3; SALT_LEN],
        }
    }

    fn private_fields() -> ChannelFields {
        let mut fields = fields();
        fields.level = PrivacyLevel::Private;
        fields
    }

    #[test]
    fn test_blob_lengths() {
        assert_eq!(MARSHALLED_PRIVATE_LEN, 103);
        assert_eq!(MARSHALLED_SECRET_LEN, 115);
        assert_eq!(marshal_private(&fields(), 0).len(), 103);
        assert_eq!(marshal_secret(&fields(), 0).unwrap().len(), 115 + 4 + 13);
    }

    #[test]
    fn test_private_blob_roundtrip() {
        let blob = marshal_private(&private_fields(), 7);
        let (back, max_uses) = unmarshal_private(&blob).unwrap();
        assert_eq!(max_uses, 7);
        assert_eq!(back.salt, [1; SALT_LEN]);
        assert_eq!(back.rsa_pub_key_length, 128);
        assert_eq!(back.secret, [3; SALT_LEN]);
        assert_eq!(back.level, PrivacyLevel::Private);
    }

    #[test]
    fn test_secret_blob_roundtrip() {
        let blob = marshal_secret(&fields(), 9).unwrap();
        let (back, max_uses) = unmarshal_secret(&blob).unwrap();
        assert_eq!(max_uses, 9);
        assert_eq!(back.name, "name");
        assert_eq!(back.description, "a description");
        assert_eq!(back.created, 1_700_000_000_000_000_000);
    }

    #[test]
    fn test_secret_blob_bad_lengths() {
        let blob = marshal_secret(&fields(), 9).unwrap();
        assert!(unmarshal_secret(&blob[..blob.len() - 1]).is_err());
        let mut longer = blob.to_vec();
        longer.push(0);
        assert!(matches!(
            unmarshal_secret(&longer),
            Err(CryptoError::Malformed(_))
        ));
    }

    #[test]
    fn test_bad_level_byte() {
        let mut blob = marshal_private(&private_fields(), 0);
        blob[0] = 9;
        assert!(matches!(
            unmarshal_private(&blob),
            Err(CryptoError::InvalidPrivacyLevel(9))
        ));
    }

    #[test]
    fn test_blob_level_must_match_form() {
        for level in [PrivacyLevel::Public, PrivacyLevel::Secret] {
            let mut blob = marshal_private(&private_fields(), 0);
            blob[0] = level.as_byte();
            assert!(matches!(
                unmarshal_private(&blob),
                Err(CryptoError::InvalidPrivacyLevel(b)) if b == level.as_byte()
            ));
        }

        let mut blob = marshal_secret(&fields(), 0).unwrap();
        blob[0] = PrivacyLevel::Private.as_byte();
        assert!(matches!(
            unmarshal_secret(&blob),
            Err(CryptoError::InvalidPrivacyLevel(1))
        ));
    }

    #[test]
    fn test_level_detection() {
        let codec = UrlCodec {
            version: 1,
            kind: "test",
        };
        assert_eq!(codec.level("https://x/?v=1&s=abc").unwrap(), PrivacyLevel::Public);
        assert_eq!(codec.level("https://x/?v=1&0Name=n&d=abc").unwrap(), PrivacyLevel::Private);
        assert_eq!(codec.level("https://x/?v=1&d=abc").unwrap(), PrivacyLevel::Secret);
        assert!(matches!(codec.level("https://x/?v=1"), Err(CryptoError::Malformed(_))));
    }
}
