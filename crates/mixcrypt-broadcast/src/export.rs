//! Portable private key export
//!
//! Text form:
//! ```text
//! <xxChannelPrivateKey(<version>)<base64(body)>xxChannelPrivateKey>
//! ```
//!
//! Version "0" body:
//! ```text
//! [16 bytes: Argon2id salt][9 bytes: KDF params][24 bytes: nonce][ciphertext + 16-byte tag]
//! ```
//!
//! The AEAD key is `H(Argon2id(password, salt, params))`. The plaintext is
//! `[1 byte: container version][33 bytes: channel ID][PKCS#1 PEM]`.

use rand::{CryptoRng, RngCore};
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use mixcrypt_core::{CryptoError, CryptoResult, Id, ID_LEN};
use mixcrypt_crypto::encoding::{from_base64, to_base64};
use mixcrypt_crypto::kdf::{KDF_PARAMS_LEN, KDF_SALT_LEN};
use mixcrypt_crypto::rng::random_array;
use mixcrypt_crypto::rsa::{private_key_from_pem, private_key_pem, RsaPrivateKey};
use mixcrypt_crypto::tagged::{decode_tagged, encode_tagged};
use mixcrypt_crypto::{aead, derive_kek, KdfParams};

use crate::channel::Channel;

pub const PRIVATE_KEY_HEAD_TAG: &str = "<xxChannelPrivateKey";
pub const PRIVATE_KEY_FOOT_TAG: &str = "xxChannelPrivateKey>";

/// Version written by [`export_private_key`]
pub const EXPORT_VERSION: &str = "0";

const CONTAINER_VERSION: u8 = 0;

type Decoder = fn(&SecretString, &[u8]) -> CryptoResult<(Id, RsaPrivateKey)>;

/// Decoders by export version
static DECODERS: &[(&str, Decoder)] = &[("0", decode_v0)];

/// Wrap a channel's private key under `password`.
pub fn export_private_key<R: RngCore + CryptoRng>(
    channel_id: &Id,
    private_key: &RsaPrivateKey,
    password: &SecretString,
    params: &KdfParams,
    rng: &mut R,
) -> CryptoResult<String> {
    let pem = private_key_pem(private_key)?;
    let mut plaintext = Zeroizing::new(Vec::with_capacity(1 + ID_LEN + pem.len()));
    plaintext.push(CONTAINER_VERSION);
    plaintext.extend_from_slice(channel_id.as_bytes());
    plaintext.extend_from_slice(pem.as_bytes());

    let salt: [u8; KDF_SALT_LEN] = random_array(rng)?;
    let kek = derive_kek(password, &salt, params)?;
    let sealed = aead::seal_prefixed(kek.expose_secret(), &plaintext, rng)?;

    let mut body = Vec::with_capacity(KDF_SALT_LEN + KDF_PARAMS_LEN + sealed.len());
    body.extend_from_slice(&salt);
    body.extend_from_slice(&params.to_bytes());
    body.extend_from_slice(&sealed);

    tracing::debug!(id = %channel_id, version = EXPORT_VERSION, "exported channel private key");
    Ok(encode_tagged(
        PRIVATE_KEY_HEAD_TAG,
        PRIVATE_KEY_FOOT_TAG,
        EXPORT_VERSION,
        &to_base64(&body),
    ))
}

/// Unwrap an exported key, returning the channel ID and private key.
pub fn import_private_key(password: &SecretString, data: &str) -> CryptoResult<(Id, RsaPrivateKey)> {
    let (version, body) = decode_tagged(PRIVATE_KEY_HEAD_TAG, PRIVATE_KEY_FOOT_TAG, data)?;
    let Some((_, decode)) = DECODERS.iter().find(|(v, _)| *v == version) else {
        return Err(CryptoError::UnsupportedVersion(version.to_string()));
    };
    let body = from_base64("exported private key", body)?;
    let (id, key) = decode(password, &body)?;
    tracing::debug!(id = %id, version, "imported channel private key");
    Ok((id, key))
}

fn decode_v0(password: &SecretString, body: &[u8]) -> CryptoResult<(Id, RsaPrivateKey)> {
    if body.len() < KDF_SALT_LEN + KDF_PARAMS_LEN {
        return Err(CryptoError::invalid_length(
            "exported private key",
            KDF_SALT_LEN + KDF_PARAMS_LEN,
            body.len(),
        ));
    }
    let (salt, rest) = body.split_at(KDF_SALT_LEN);
    let (params, sealed) = rest.split_at(KDF_PARAMS_LEN);
    let mut salt_bytes = [0u8; KDF_SALT_LEN];
    salt_bytes.copy_from_slice(salt);

    let kek = derive_kek(password, &salt_bytes, &KdfParams::from_bytes(params)?)?;
    let plaintext = Zeroizing::new(aead::open_prefixed(kek.expose_secret(), sealed)?);

    if plaintext.len() < 1 + ID_LEN {
        return Err(CryptoError::invalid_length(
            "private key container",
            1 + ID_LEN,
            plaintext.len(),
        ));
    }
    if plaintext[0] != CONTAINER_VERSION {
        return Err(CryptoError::UnsupportedVersion(format!(
            "container {}",
            plaintext[0]
        )));
    }
    let id = Id::from_bytes(&plaintext[1..1 + ID_LEN])?;
    let pem = std::str::from_utf8(&plaintext[1 + ID_LEN..])
        .map_err(|_| CryptoError::malformed("private key PEM is not UTF-8"))?;
    Ok((id, private_key_from_pem(pem)?))
}

impl Channel {
    /// Export `private_key` bound to this channel's reception ID.
    pub fn export_private_key<R: RngCore + CryptoRng>(
        &self,
        private_key: &RsaPrivateKey,
        password: &SecretString,
        params: &KdfParams,
        rng: &mut R,
    ) -> CryptoResult<String> {
        export_private_key(self.reception_id(), private_key, password, params, rng)
    }
}
