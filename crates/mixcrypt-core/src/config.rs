use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level policy configuration (loaded from mixcrypt.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MixConfig {
    pub kdf: KdfConfig,
    pub channel: ChannelConfig,
    pub e2e: E2eConfig,
    pub log: LogConfig,
}

impl MixConfig {
    /// Load configuration from a TOML file. Absent sections take their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("parsing config: {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded mixcrypt config");
        Ok(config)
    }
}

/// Argon2id cost parameters for password-wrapped key export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfConfig {
    /// Time cost / iterations (default: 3)
    pub time_cost: u32,
    /// Memory cost in KiB (default: 65536 = 64 MiB)
    pub mem_cost_kib: u32,
    /// Parallelism (default: 4)
    pub parallelism: u8,
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            time_cost: 3,
            mem_cost_kib: 65536,
            parallelism: 4,
        }
    }
}

/// Broadcast channel defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// RSA modulus size for newly created channels
    pub rsa_key_bits: usize,
    /// Outer payload size of a single mixnet packet in bytes
    pub packet_payload_len: usize,
    /// Scheme and host prefix for share/invite URLs
    pub share_host: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            rsa_key_bits: 4096,
            packet_payload_len: 509,
            share_host: "https://mixcrypt.example/channel".into(),
        }
    }
}

/// E2E re-keying policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct E2eConfig {
    /// Multiplier applied to the TTL to get the hard key-use limit
    pub ttl_scalar: f64,
    /// Minimum number of keys beyond the TTL before re-keying is forced
    pub min_num_keys: u16,
    /// Lower bound of the TTL range (inclusive)
    pub ttl_min: u16,
    /// Upper bound of the TTL range (exclusive)
    pub ttl_max: u16,
}

impl Default for E2eConfig {
    fn default() -> Self {
        Self {
            ttl_scalar: 1.2,
            min_num_keys: 10,
            ttl_min: 1000,
            ttl_max: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level or EnvFilter directive (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}
