//! mixcrypt-group: cryptographic core of group messaging
//!
//! - `membership`: leader plus sorted participants, and the membership digest
//! - `keys`: preimages, group ID and group key
//! - `epoch`: five-minute key rotation counter
//! - `crypt`: per-epoch KDF key, per-recipient fingerprint, MAC, encryption
//! - `message`: internal and public message formats, message IDs
//! - `group`: [`Group`], sealing and opening per-recipient messages

pub mod crypt;
pub mod epoch;
pub mod group;
pub mod keys;
pub mod membership;
pub mod message;

pub use crypt::{new_kdf_key, new_key_fingerprint, new_mac, CryptKey};
pub use epoch::{compute_epoch, EPOCH_PERIOD};
pub use group::{Group, SealedMessage};
pub use keys::{new_id, new_key, GroupKey, IdPreimage, KeyPreimage};
pub use membership::{Member, Membership};
pub use message::{GroupMessageId, InternalMessage, PublicMessage};
