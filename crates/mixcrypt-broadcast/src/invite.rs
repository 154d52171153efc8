//! Invite URLs
//!
//! Same encoding as share URLs under a separate version namespace, so the two
//! can evolve independently.

use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use mixcrypt_core::CryptoResult;

use crate::channel::Channel;
use crate::level::PrivacyLevel;
use crate::url_codec::UrlCodec;

pub const INVITE_VERSION: u32 = 1;

const INVITE: UrlCodec = UrlCodec {
    version: INVITE_VERSION,
    kind: "invite",
};

impl Channel {
    /// Encode the channel as an invite URL rooted at `host`.
    pub fn invite_url<R: RngCore + CryptoRng>(
        &self,
        host: &str,
        max_uses: u16,
        rng: &mut R,
    ) -> CryptoResult<(String, Zeroizing<String>)> {
        INVITE.encode(self, host, max_uses, rng)
    }
}

pub fn decode_invite_url(url: &str, password: &str) -> CryptoResult<(Channel, u16)> {
    INVITE.decode(url, password)
}

pub fn invite_url_level(url: &str) -> CryptoResult<PrivacyLevel> {
    INVITE.level(url)
}
