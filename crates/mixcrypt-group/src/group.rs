//! A group: its membership, identity and key, and per-recipient sealing
//!
//! Each message is sealed once per recipient under a fresh salt. The
//! recipient's key fingerprint is the routing tag and the cipher nonce; the
//! MAC binds the ciphertext to the recipient's DH key.

use rand::{CryptoRng, RngCore};

use mixcrypt_core::{CryptoError, CryptoResult, Id};
use mixcrypt_crypto::rng::random_array;
use mixcrypt_crypto::{Fingerprint, Mac};

use crate::crypt::{decrypt_internal, encrypt_internal, new_kdf_key, new_key_fingerprint, new_mac, SALT_LEN};
use crate::keys::{new_id, new_key, GroupKey, IdPreimage, KeyPreimage};
use crate::membership::{Member, Membership};
use crate::message::{GroupMessageId, InternalMessage, PublicMessage};

/// One recipient's copy of a group message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedMessage {
    pub fingerprint: Fingerprint,
    pub mac: Mac,
    /// Marshalled [`PublicMessage`]
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Group {
    id: Id,
    key: GroupKey,
    id_preimage: IdPreimage,
    key_preimage: KeyPreimage,
    membership: Membership,
}

impl Group {
    /// Create a group with fresh preimages.
    pub fn new<R: RngCore + CryptoRng>(membership: Membership, rng: &mut R) -> CryptoResult<Self> {
        let id_preimage = IdPreimage::new(rng)?;
        let key_preimage = KeyPreimage::new(rng)?;
        let group = Self::from_preimages(membership, id_preimage, key_preimage);
        tracing::debug!(id = %group.id, members = group.membership.len(), "group created");
        Ok(group)
    }

    /// Rebuild a group from stored preimages.
    pub fn from_preimages(membership: Membership, id_preimage: IdPreimage, key_preimage: KeyPreimage) -> Self {
        Self {
            id: new_id(&id_preimage, &membership),
            key: new_key(&key_preimage, &membership),
            id_preimage,
            key_preimage,
            membership,
        }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn key(&self) -> &GroupKey {
        &self.key
    }

    pub fn id_preimage(&self) -> &IdPreimage {
        &self.id_preimage
    }

    pub fn key_preimage(&self) -> &KeyPreimage {
        &self.key_preimage
    }

    pub fn membership(&self) -> &Membership {
        &self.membership
    }

    /// `(member, fingerprint)` for every member under `salt`.
    ///
    /// Storing the fingerprint to handler mapping is left to the caller.
    pub fn key_fingerprints<'a>(
        &'a self,
        salt: &'a [u8; SALT_LEN],
    ) -> impl Iterator<Item = (&'a Id, Fingerprint)> + 'a {
        self.membership
            .members()
            .iter()
            .map(move |m| (&m.id, new_key_fingerprint(&self.key, salt, &m.id)))
    }

    /// Seal `message` for one recipient into a payload of `payload_len` bytes.
    pub fn seal_for_member<R: RngCore + CryptoRng>(
        &self,
        recipient: &Member,
        epoch: u32,
        message: &InternalMessage,
        payload_len: usize,
        rng: &mut R,
    ) -> CryptoResult<(SealedMessage, GroupMessageId)> {
        let internal_len = payload_len
            .checked_sub(SALT_LEN)
            .ok_or(CryptoError::TooLarge {
                size: SALT_LEN,
                max: payload_len,
            })?;
        let internal = message.to_bytes(internal_len)?;
        let message_id = GroupMessageId::new(&self.id, &internal);

        let salt: [u8; SALT_LEN] = random_array(rng)?;
        let crypt_key = new_kdf_key(&self.key, epoch, &salt);
        let fingerprint = new_key_fingerprint(&self.key, &salt, &recipient.id);
        let ciphertext = encrypt_internal(&crypt_key, &fingerprint, &internal)?;
        let mac = new_mac(&crypt_key, &ciphertext, recipient.dh_key.as_ref());

        let payload = PublicMessage { salt, ciphertext }.to_bytes();
        Ok((
            SealedMessage {
                fingerprint,
                mac,
                payload,
            },
            message_id,
        ))
    }

    /// Seal `message` for every member except `sender`.
    pub fn seal_for_all<R: RngCore + CryptoRng>(
        &self,
        sender: &Id,
        epoch: u32,
        message: &InternalMessage,
        payload_len: usize,
        rng: &mut R,
    ) -> CryptoResult<(Vec<(Id, SealedMessage)>, GroupMessageId)> {
        let mut sealed = Vec::with_capacity(self.membership.len());
        let mut message_id = None;
        for member in self.membership.members().iter().filter(|m| m.id != *sender) {
            let (msg, id) = self.seal_for_member(member, epoch, message, payload_len, rng)?;
            message_id = Some(id);
            sealed.push((member.id, msg));
        }
        let Some(message_id) = message_id else {
            unreachable!("a membership always has recipients besides the sender");
        };
        tracing::trace!(group = %self.id, recipients = sealed.len(), "sealed group message");
        Ok((sealed, message_id))
    }

    /// Verify and decrypt a message addressed to member `own_id`.
    pub fn open(
        &self,
        own_id: &Id,
        epoch: u32,
        sealed: &SealedMessage,
    ) -> CryptoResult<(InternalMessage, GroupMessageId)> {
        let member = self
            .membership
            .get(own_id)
            .ok_or_else(|| CryptoError::malformed(format!("{own_id} is not a member of {}", self.id)))?;
        let public = PublicMessage::from_bytes(&sealed.payload)?;

        let expected = new_key_fingerprint(&self.key, &public.salt, own_id);
        if !expected.verify(sealed.fingerprint.as_bytes()) {
            return Err(CryptoError::malformed("key fingerprint is not addressed to this member"));
        }

        let crypt_key = new_kdf_key(&self.key, epoch, &public.salt);
        let mac = new_mac(&crypt_key, &public.ciphertext, member.dh_key.as_ref());
        if !mac.verify(sealed.mac.as_bytes()) {
            tracing::debug!(group = %self.id, epoch, "group MAC mismatch");
            return Err(CryptoError::MacMismatch);
        }

        let internal = decrypt_internal(&crypt_key, &expected, &public.ciphertext)?;
        let message_id = GroupMessageId::new(&self.id, &internal);
        Ok((InternalMessage::from_bytes(&internal)?, message_id))
    }
}
