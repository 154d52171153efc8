//! mixcrypt-broadcast: multicast broadcast channels
//!
//! A [`Channel`] is an immutable descriptor: name, description, a random salt
//! and secret, and the hash of the admin's RSA public key. Its reception ID is
//! derived from those fields, so a decoded or unmarshalled channel can always
//! be checked against the ID it claims.
//!
//! - `reception`: reception ID derivation
//! - `channel`: symmetric and asymmetric envelopes, signing, JSON form
//! - `share` / `invite`: URL distribution at Public, Private or Secret level
//! - `export`: password-wrapped, tag-framed private key export

pub mod channel;
pub mod export;
pub mod invite;
pub mod level;
pub mod password;
pub mod reception;
pub mod share;
mod url_codec;

pub use channel::{calculate_key_size, Channel, DESCRIPTION_MAX_CHARS, NAME_MAX_CHARS};
pub use export::{export_private_key, import_private_key};
pub use invite::{decode_invite_url, invite_url_level, INVITE_VERSION};
pub use level::{AdminLevel, Options, PrivacyLevel};
pub use reception::{new_channel_id, new_id_from_rsa, new_symmetric_reception_id};
pub use share::{decode_share_url, share_url_level, SHARE_VERSION};
