//! mixcrypt-core: shared building blocks for the mixcrypt crates
//!
//! - `id`: 33-byte typed identifiers (32 content bytes ‖ 1 type byte)
//! - `error`: the error enum surfaced by every primitive and protocol crate
//! - `config`: TOML policy configuration (Argon2id costs, key TTL, share host)
//! - `logging`: tracing subscriber setup for embedding applications and tests

pub mod config;
pub mod error;
pub mod id;
pub mod logging;

pub use config::MixConfig;
pub use error::{CryptoError, CryptoResult};
pub use id::{Id, IdType, ID_LEN};
