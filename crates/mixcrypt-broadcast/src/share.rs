//! Share URLs: a channel encoded for distribution at its privacy level
//!
//! Public channels need no password. Private and Secret channels return a
//! generated eight-word password that the recipient must supply to decode.

use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use mixcrypt_core::CryptoResult;

use crate::channel::Channel;
use crate::level::PrivacyLevel;
use crate::url_codec::UrlCodec;

/// Current share URL version; any other version is rejected.
pub const SHARE_VERSION: u32 = 1;

const SHARE: UrlCodec = UrlCodec {
    version: SHARE_VERSION,
    kind: "share",
};

impl Channel {
    /// Encode the channel as a share URL rooted at `host`.
    ///
    /// Returns `(url, password)`; the password is empty for Public channels.
    pub fn share_url<R: RngCore + CryptoRng>(
        &self,
        host: &str,
        max_uses: u16,
        rng: &mut R,
    ) -> CryptoResult<(String, Zeroizing<String>)> {
        SHARE.encode(self, host, max_uses, rng)
    }
}

/// Decode a share URL, returning the channel and its max-uses value.
pub fn decode_share_url(url: &str, password: &str) -> CryptoResult<(Channel, u16)> {
    SHARE.decode(url, password)
}

/// Privacy level of a share URL, without decoding it.
pub fn share_url_level(url: &str) -> CryptoResult<PrivacyLevel> {
    SHARE.level(url)
}
