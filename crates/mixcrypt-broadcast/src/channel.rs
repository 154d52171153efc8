//! Broadcast channels and their envelopes
//!
//! Symmetric envelope, for a payload `P` and the cached channel key `k`:
//! ```text
//! nonce  = random(32), top bit cleared          (fingerprint slot)
//! k      = HKDF(secret = Secret, salt = intermediary, info = HKDF_INFO)
//! mk     = HKDF(secret = k, salt = nonce, info = ∅)
//! ct     = XSalsa20(mk, nonce[..24]) ⊕ P
//! mac    = HMAC(mk, ct), top bit cleared          (MAC slot)
//! ```
//!
//! The secret/salt roles in `k` are swapped relative to the reception-ID
//! derivation; the two must stay disjoint.
//!
//! Asymmetric envelope: multicast OAEP under the channel's private key with
//! the channel name as label. An asymmetric packet carries the sender's public
//! key so receivers need only the channel descriptor:
//! ```text
//! sized frame( [4 bytes: E][K bytes: N][K × sub-payloads bytes: ciphertext] )
//! ```

use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use mixcrypt_core::{CryptoError, CryptoResult, Id};
use mixcrypt_crypto::encoding::serde_base64;
use mixcrypt_crypto::frame::SIZED_OVERHEAD;
use mixcrypt_crypto::hkdf::hkdf_blake2b;
use mixcrypt_crypto::mac::hmac_blake2b;
use mixcrypt_crypto::rng::random_array;
use mixcrypt_crypto::rsa::{
    self, multicast_block_payload, public_key_from_wire, public_key_hash, public_key_to_wire,
    RsaPrivateKey, RsaPublicKey, E_LEN,
};
use mixcrypt_crypto::stream::salsa20_xor;
use mixcrypt_crypto::{
    decode_sized_broadcast, max_sized_broadcast_payload_size, new_sized_broadcast, Fingerprint,
    Mac, HASH_LEN, KEY_SIZE,
};

use crate::level::{Options, PrivacyLevel};
use crate::reception::{channel_intermediary, new_channel_id, HKDF_INFO, SALT_LEN};

/// Maximum channel name length in characters
pub const NAME_MAX_CHARS: usize = 24;

/// Maximum channel description length in characters
pub const DESCRIPTION_MAX_CHARS: usize = 144;

/// Number of multicast sub-payloads used by newly created channels
pub const RSA_SUB_PAYLOADS: u16 = 1;

/// Largest RSA key size in bytes whose asymmetric packet fits `packet_len`.
///
/// The public key and one ciphertext block (each `K` bytes) share the sized
/// frame with the exponent, so `K = ((packet_len − 10 − E_LEN) / 2)` rounded
/// down to a multiple of 128 bytes.
pub fn calculate_key_size(packet_len: usize) -> CryptoResult<usize> {
    let available = packet_len.saturating_sub(SIZED_OVERHEAD + E_LEN);
    let key_len = (available / 2) & !127;
    if key_len == 0 {
        return Err(CryptoError::invalid_length(
            "packet payload",
            SIZED_OVERHEAD + E_LEN + 2 * 128,
            packet_len,
        ));
    }
    Ok(key_len)
}

/// Immutable channel fields from which the reception ID is derived.
pub(crate) struct ChannelFields {
    pub name: String,
    pub description: String,
    pub level: PrivacyLevel,
    pub created: u64,
    pub salt: [u8; SALT_LEN],
    pub rsa_pub_key_hash: [u8; HASH_LEN],
    pub rsa_pub_key_length: u16,
    pub rsa_sub_payloads: u16,
    pub secret: [u8; SALT_LEN],
}

impl Drop for ChannelFields {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

/// A broadcast channel descriptor.
///
/// Holds everything a member needs to receive: the reception ID, the symmetric
/// secret and the hash of the admin's RSA public key. The private key is
/// returned separately by [`Channel::new`] and never stored here.
#[derive(Clone)]
pub struct Channel {
    reception_id: Id,
    name: String,
    description: String,
    level: PrivacyLevel,
    created: u64,
    salt: [u8; SALT_LEN],
    rsa_pub_key_hash: [u8; HASH_LEN],
    rsa_pub_key_length: u16,
    rsa_sub_payloads: u16,
    secret: [u8; SALT_LEN],
    options: Options,
    key: OnceLock<[u8; KEY_SIZE]>,
}

fn check_name_and_description(name: &str, description: &str) -> CryptoResult<()> {
    let len = name.chars().count();
    if len > NAME_MAX_CHARS {
        return Err(CryptoError::NameTooLong {
            len,
            max: NAME_MAX_CHARS,
        });
    }
    let len = description.chars().count();
    if len > DESCRIPTION_MAX_CHARS {
        return Err(CryptoError::DescriptionTooLong {
            len,
            max: DESCRIPTION_MAX_CHARS,
        });
    }
    Ok(())
}

fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

impl Channel {
    /// Create a channel with a fresh RSA key of `key_bits` bits.
    pub fn new<R: RngCore + CryptoRng>(
        name: &str,
        description: &str,
        level: PrivacyLevel,
        key_bits: usize,
        rng: &mut R,
    ) -> CryptoResult<(Self, RsaPrivateKey)> {
        check_name_and_description(name, description)?;

        let private_key = rsa::generate_key(key_bits, rng)?;
        let public_key = private_key.to_public_key();
        let salt: [u8; SALT_LEN] = random_array(rng)?;
        let secret: [u8; SALT_LEN] = random_array(rng)?;

        let rsa_pub_key_length = u16::try_from(rsa::key_len(&public_key)).map_err(|_| {
            CryptoError::Rsa(format!("{key_bits}-bit key is too large for a channel"))
        })?;

        let channel = Self::assemble(
            ChannelFields {
                name: name.to_string(),
                description: description.to_string(),
                level,
                created: now_nanos(),
                salt,
                rsa_pub_key_hash: public_key_hash(&public_key)?,
                rsa_pub_key_length,
                rsa_sub_payloads: RSA_SUB_PAYLOADS,
                secret,
            },
            Options::default(),
        )?;

        tracing::debug!(
            id = %channel.reception_id,
            level = %level,
            key_bits,
            "created broadcast channel"
        );
        Ok((channel, private_key))
    }

    /// Create a channel whose asymmetric packets fit `packet_len` bytes.
    pub fn new_for_packet_size<R: RngCore + CryptoRng>(
        name: &str,
        description: &str,
        level: PrivacyLevel,
        packet_len: usize,
        rng: &mut R,
    ) -> CryptoResult<(Self, RsaPrivateKey)> {
        let key_len = calculate_key_size(packet_len)?;
        Self::new(name, description, level, key_len * 8, rng)
    }

    /// Build a channel from its fields, deriving the reception ID.
    pub(crate) fn assemble(fields: ChannelFields, options: Options) -> CryptoResult<Self> {
        check_name_and_description(&fields.name, &fields.description)?;
        let reception_id = new_channel_id(
            &fields.name,
            &fields.description,
            &fields.rsa_pub_key_hash,
            &fields.secret,
            &fields.salt,
        );
        Ok(Self {
            reception_id,
            name: fields.name.clone(),
            description: fields.description.clone(),
            level: fields.level,
            created: fields.created,
            salt: fields.salt,
            rsa_pub_key_hash: fields.rsa_pub_key_hash,
            rsa_pub_key_length: fields.rsa_pub_key_length,
            rsa_sub_payloads: fields.rsa_sub_payloads,
            secret: fields.secret,
            options,
            key: OnceLock::new(),
        })
    }

    /// Replace the options tail. Options do not affect the reception ID.
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn reception_id(&self) -> &Id {
        &self.reception_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn level(&self) -> PrivacyLevel {
        self.level
    }

    /// Creation time in nanoseconds since the UNIX epoch
    pub fn created(&self) -> u64 {
        self.created
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn rsa_pub_key_hash(&self) -> &[u8; HASH_LEN] {
        &self.rsa_pub_key_hash
    }

    /// RSA modulus size in bytes
    pub fn rsa_pub_key_length(&self) -> u16 {
        self.rsa_pub_key_length
    }

    pub fn rsa_sub_payloads(&self) -> u16 {
        self.rsa_sub_payloads
    }

    pub fn secret(&self) -> &[u8; SALT_LEN] {
        &self.secret
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub(crate) fn fields(&self) -> ChannelFields {
        ChannelFields {
            name: self.name.clone(),
            description: self.description.clone(),
            level: self.level,
            created: self.created,
            salt: self.salt,
            rsa_pub_key_hash: self.rsa_pub_key_hash,
            rsa_pub_key_length: self.rsa_pub_key_length,
            rsa_sub_payloads: self.rsa_sub_payloads,
            secret: self.secret,
        }
    }

    /// The channel's symmetric key, derived on first use.
    fn symmetric_key(&self) -> &[u8; KEY_SIZE] {
        self.key.get_or_init(|| {
            let intermediary = channel_intermediary(
                &self.name,
                &self.description,
                &self.rsa_pub_key_hash,
                &self.secret,
                &self.salt,
            );
            hkdf_blake2b(&self.secret, Some(&intermediary[..]), HKDF_INFO)
        })
    }

    fn message_key(&self, nonce: &Fingerprint) -> Zeroizing<[u8; KEY_SIZE]> {
        Zeroizing::new(hkdf_blake2b(self.symmetric_key(), Some(nonce.as_ref()), &[]))
    }

    /// Encrypt for every holder of the channel secret.
    ///
    /// Returns `(ciphertext, mac, nonce)`; the nonce travels in the fingerprint slot.
    pub fn encrypt_symmetric<R: RngCore + CryptoRng>(
        &self,
        payload: &[u8],
        rng: &mut R,
    ) -> CryptoResult<(Vec<u8>, Mac, Fingerprint)> {
        let nonce = Fingerprint::from_hash(random_array(rng)?);
        let key = self.message_key(&nonce);
        let ciphertext = salsa20_xor(&key, nonce.as_bytes(), payload)?;
        let mac = Mac::from_hash(hmac_blake2b(&*key, &ciphertext));
        Ok((ciphertext, mac, nonce))
    }

    /// Verify and decrypt a symmetric envelope. Nothing is decrypted if the MAC fails.
    pub fn decrypt_symmetric(&self, ciphertext: &[u8], mac: &[u8], nonce: &[u8]) -> CryptoResult<Vec<u8>> {
        let nonce = Fingerprint::from_bytes(nonce)?;
        let key = self.message_key(&nonce);
        let expected = Mac::from_hash(hmac_blake2b(&*key, ciphertext));
        if !expected.verify(mac) {
            tracing::debug!(id = %self.reception_id, "symmetric MAC mismatch");
            return Err(CryptoError::MacMismatch);
        }
        salsa20_xor(&key, nonce.as_bytes(), ciphertext)
    }

    /// Wrap `payload` in a sized frame of `packet_len` bytes, then encrypt it symmetrically.
    pub fn encrypt_symmetric_sized<R: RngCore + CryptoRng>(
        &self,
        payload: &[u8],
        packet_len: usize,
        rng: &mut R,
    ) -> CryptoResult<(Vec<u8>, Mac, Fingerprint)> {
        let frame = new_sized_broadcast(packet_len, payload, rng)?;
        self.encrypt_symmetric(&frame, rng)
    }

    pub fn decrypt_symmetric_sized(&self, ciphertext: &[u8], mac: &[u8], nonce: &[u8]) -> CryptoResult<Vec<u8>> {
        let frame = self.decrypt_symmetric(ciphertext, mac, nonce)?;
        Ok(decode_sized_broadcast(&frame)?.to_vec())
    }

    /// Largest symmetric payload for a packet of `packet_len` bytes.
    pub fn max_symmetric_payload_size(packet_len: usize) -> usize {
        max_sized_broadcast_payload_size(packet_len)
    }

    /// Largest payload [`encrypt_asymmetric`](Self::encrypt_asymmetric) accepts.
    pub fn max_asymmetric_payload_size(&self) -> usize {
        usize::from(self.rsa_sub_payloads)
            * multicast_block_payload(usize::from(self.rsa_pub_key_length))
    }

    fn check_public_key(&self, key: &RsaPublicKey) -> CryptoResult<()> {
        if public_key_hash(key)? != self.rsa_pub_key_hash {
            return Err(CryptoError::PublicKeyMismatch);
        }
        Ok(())
    }

    /// Encrypt with the channel's private key; any holder of the public key can decrypt.
    pub fn encrypt_asymmetric<R: RngCore + CryptoRng>(
        &self,
        payload: &[u8],
        private_key: &RsaPrivateKey,
        rng: &mut R,
    ) -> CryptoResult<Vec<u8>> {
        self.check_public_key(&private_key.to_public_key())?;
        let max = self.max_asymmetric_payload_size();
        if payload.len() > max {
            return Err(CryptoError::TooLarge {
                size: payload.len(),
                max,
            });
        }
        rsa::multicast_encrypt(private_key, payload, &self.name, rng)
    }

    pub fn decrypt_asymmetric(&self, ciphertext: &[u8], public_key: &RsaPublicKey) -> CryptoResult<Vec<u8>> {
        self.check_public_key(public_key)?;
        rsa::multicast_decrypt(public_key, ciphertext, &self.name)
    }

    /// Build a full asymmetric packet carrying the sender's public key.
    pub fn encrypt_asymmetric_packet<R: RngCore + CryptoRng>(
        &self,
        payload: &[u8],
        private_key: &RsaPrivateKey,
        packet_len: usize,
        rng: &mut R,
    ) -> CryptoResult<Vec<u8>> {
        let ciphertext = self.encrypt_asymmetric(payload, private_key, rng)?;
        let mut body = public_key_to_wire(&private_key.to_public_key())?;
        body.extend_from_slice(&ciphertext);
        new_sized_broadcast(packet_len, &body, rng)
    }

    /// Open a packet from [`encrypt_asymmetric_packet`](Self::encrypt_asymmetric_packet).
    ///
    /// Fails with [`CryptoError::PublicKeyMismatch`] if the carried key is not the channel's.
    pub fn decrypt_asymmetric_packet(&self, packet: &[u8]) -> CryptoResult<Vec<u8>> {
        let body = decode_sized_broadcast(packet)?;
        let wire_len = E_LEN + usize::from(self.rsa_pub_key_length);
        if body.len() < wire_len {
            return Err(CryptoError::invalid_length(
                "asymmetric packet",
                wire_len,
                body.len(),
            ));
        }
        let (wire, ciphertext) = body.split_at(wire_len);
        let public_key = public_key_from_wire(wire)?;
        self.decrypt_asymmetric(ciphertext, &public_key)
    }

    /// Sign an admin message with the channel's private key (RSA-PSS).
    pub fn sign<R: RngCore + CryptoRng>(
        &self,
        message: &[u8],
        private_key: &RsaPrivateKey,
        rng: &mut R,
    ) -> CryptoResult<Vec<u8>> {
        self.check_public_key(&private_key.to_public_key())?;
        rsa::sign_pss(private_key, message, rng)
    }

    pub fn verify(&self, message: &[u8], signature: &[u8], public_key: &RsaPublicKey) -> CryptoResult<()> {
        self.check_public_key(public_key)?;
        rsa::verify_pss(public_key, message, signature)
    }

    /// JSON form including the options tail.
    pub fn marshal(&self) -> CryptoResult<Vec<u8>> {
        let disk = ChannelJson {
            reception_id: self.reception_id,
            name: self.name.clone(),
            description: self.description.clone(),
            level: self.level,
            created: self.created,
            salt: self.salt,
            rsa_pub_key_hash: self.rsa_pub_key_hash,
            rsa_pub_key_length: self.rsa_pub_key_length,
            rsa_sub_payloads: self.rsa_sub_payloads,
            secret: self.secret,
            options: self.options,
        };
        serde_json::to_vec(&disk).map_err(|e| CryptoError::Other(e.into()))
    }

    /// Parse [`marshal`](Self::marshal) output, re-deriving and checking the reception ID.
    pub fn unmarshal(data: &[u8]) -> CryptoResult<Self> {
        let disk: ChannelJson = serde_json::from_slice(data)
            .map_err(|e| CryptoError::malformed(format!("channel JSON: {e}")))?;
        let channel = Self::assemble(
            ChannelFields {
                name: disk.name,
                description: disk.description,
                level: disk.level,
                created: disk.created,
                salt: disk.salt,
                rsa_pub_key_hash: disk.rsa_pub_key_hash,
                rsa_pub_key_length: disk.rsa_pub_key_length,
                rsa_sub_payloads: disk.rsa_sub_payloads,
                secret: disk.secret,
            },
            disk.options,
        )?;
        if channel.reception_id != disk.reception_id {
            return Err(CryptoError::malformed(
                "reception ID does not match channel fields",
            ));
        }
        Ok(channel)
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        self.secret.zeroize();
        if let Some(key) = self.key.get_mut() {
            key.zeroize();
        }
    }
}

impl PartialEq for Channel {
    fn eq(&self, other: &Self) -> bool {
        self.reception_id == other.reception_id
            && self.name == other.name
            && self.description == other.description
            && self.level == other.level
            && self.created == other.created
            && self.salt == other.salt
            && self.rsa_pub_key_hash == other.rsa_pub_key_hash
            && self.rsa_pub_key_length == other.rsa_pub_key_length
            && self.rsa_sub_payloads == other.rsa_sub_payloads
            && self.secret == other.secret
            && self.options == other.options
    }
}

impl Eq for Channel {}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("reception_id", &self.reception_id)
            .field("name", &self.name)
            .field("level", &self.level)
            .field("rsa_pub_key_length", &self.rsa_pub_key_length)
            .field("secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelJson {
    reception_id: Id,
    name: String,
    description: String,
    level: PrivacyLevel,
    created: u64,
    #[serde(with = "serde_base64")]
    salt: [u8; SALT_LEN],
    #[serde(with = "serde_base64")]
    rsa_pub_key_hash: [u8; HASH_LEN],
    rsa_pub_key_length: u16,
    rsa_sub_payloads: u16,
    #[serde(with = "serde_base64")]
    secret: [u8; SALT_LEN],
    #[serde(default)]
    options: Options,
}
