//! Key derivation: Argon2id password → key-encryption key

use argon2::{Algorithm, Argon2, Params, Version};
use secrecy::{ExposeSecret, ExposeSecretMut, SecretBox, SecretString};

use mixcrypt_core::config::KdfConfig;
use mixcrypt_core::{CryptoError, CryptoResult};

use crate::KEY_SIZE;

/// Salt length for password-derived keys
pub const KDF_SALT_LEN: usize = 16;

/// Serialized parameter length: `time u32 LE | memory u32 LE | threads u8`
pub const KDF_PARAMS_LEN: usize = 9;

/// A 256-bit key-encryption key derived from a password via Argon2id.
pub type Kek = SecretBox<[u8; KEY_SIZE]>;

/// Ceilings on decoded parameters, so an untrusted export cannot demand
/// unbounded work before the password is checked.
pub const MAX_TIME_COST: u32 = 16;
/// 1 GiB
pub const MAX_MEM_COST_KIB: u32 = 1 << 20;
pub const MAX_PARALLELISM: u8 = 16;

/// Argon2id parameters, carried alongside the ciphertext they protect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Time cost / iterations
    pub time_cost: u32,
    /// Memory cost in KiB
    pub mem_cost_kib: u32,
    /// Parallelism
    pub parallelism: u8,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::from(&KdfConfig::default())
    }
}

impl From<&KdfConfig> for KdfParams {
    fn from(config: &KdfConfig) -> Self {
        Self {
            time_cost: config.time_cost,
            mem_cost_kib: config.mem_cost_kib,
            parallelism: config.parallelism,
        }
    }
}

impl KdfParams {
    pub fn to_bytes(&self) -> [u8; KDF_PARAMS_LEN] {
        let mut out = [0u8; KDF_PARAMS_LEN];
        out[..4].copy_from_slice(&self.time_cost.to_le_bytes());
        out[4..8].copy_from_slice(&self.mem_cost_kib.to_le_bytes());
        out[8] = self.parallelism;
        out
    }

    pub fn from_bytes(data: &[u8]) -> CryptoResult<Self> {
        let Ok(raw) = <[u8; KDF_PARAMS_LEN]>::try_from(data) else {
            return Err(CryptoError::invalid_length(
                "KDF parameters",
                KDF_PARAMS_LEN,
                data.len(),
            ));
        };
        Ok(Self {
            time_cost: u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]),
            mem_cost_kib: u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]),
            parallelism: raw[8],
        })
    }

    /// Reject parameters above the policy ceilings.
    pub fn check_bounds(&self) -> CryptoResult<()> {
        if self.time_cost > MAX_TIME_COST
            || self.mem_cost_kib > MAX_MEM_COST_KIB
            || self.parallelism > MAX_PARALLELISM
        {
            return Err(CryptoError::Kdf(format!(
                "Argon2id params exceed limits: t={} m={}KiB p={}",
                self.time_cost, self.mem_cost_kib, self.parallelism
            )));
        }
        Ok(())
    }
}

/// Derive a 256-bit key-encryption key from a password and salt using Argon2id.
///
/// The salt is random and stored next to the wrapped data; it is not secret.
pub fn derive_kek(
    password: &SecretString,
    salt: &[u8; KDF_SALT_LEN],
    params: &KdfParams,
) -> CryptoResult<Kek> {
    params.check_bounds()?;
    let argon2_params = Params::new(
        params.mem_cost_kib,
        params.time_cost,
        u32::from(params.parallelism),
        Some(KEY_SIZE),
    )
    .map_err(|e| CryptoError::Kdf(format!("invalid Argon2id params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = Kek::new(Box::new([0u8; KEY_SIZE]));
    argon2
        .hash_password_into(password.expose_secret().as_bytes(), salt, key.expose_secret_mut())
        .map_err(|e| CryptoError::Kdf(format!("Argon2id failed: {e}")))?;

    Ok(key)
}
