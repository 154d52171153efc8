//! Session key usage limits
//!
//! Each session picks a deterministic TTL from its key so both parties agree
//! on when to re-key without negotiating:
//! ```text
//! ttl      = (H(key) as a 256-bit BE integer) mod (max − min) + min
//! num_keys = max(⌈scalar · ttl⌉, ttl + min_num_keys)
//! ```

use mixcrypt_core::config::E2eConfig;
use mixcrypt_core::{CryptoError, CryptoResult};
use mixcrypt_crypto::{hash, LargeInt};

/// Scaling policy applied on top of the TTL
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TtlParams {
    pub scalar: f64,
    pub min_num_keys: u16,
}

impl From<&E2eConfig> for TtlParams {
    fn from(config: &E2eConfig) -> Self {
        Self {
            scalar: config.ttl_scalar,
            min_num_keys: config.min_num_keys,
        }
    }
}

impl Default for TtlParams {
    fn default() -> Self {
        Self::from(&E2eConfig::default())
    }
}

/// A session's TTL and the hard limit of keys used before re-keying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyTtl {
    pub ttl: u16,
    pub num_keys: u32,
}

/// Derive the TTL for `key` within `[min, max)`.
pub fn generate_key_ttl(key: &LargeInt, min: u16, max: u16, params: &TtlParams) -> CryptoResult<KeyTtl> {
    if max <= min {
        return Err(CryptoError::InvalidTtlRange { min, max });
    }
    let digest = hash(&key.bytes());
    let spread = u64::from(max - min);
    // Horner reduction; spread < 2^16 keeps every step well inside u64
    let offset = digest
        .iter()
        .fold(0u64, |acc, &b| ((acc << 8) | u64::from(b)) % spread);
    let Ok(ttl) = u16::try_from(offset + u64::from(min)) else {
        unreachable!("ttl is below max, which is a u16");
    };

    let scaled = (params.scalar * f64::from(ttl)).ceil();
    let scaled = if scaled.is_finite() && scaled > 0.0 {
        scaled.min(f64::from(u32::MAX)) as u32
    } else {
        0
    };
    let num_keys = scaled.max(u32::from(ttl) + u32::from(params.min_num_keys));

    Ok(KeyTtl { ttl, num_keys })
}

/// [`generate_key_ttl`] using the configured range and policy.
pub fn generate_key_ttl_from_config(key: &LargeInt, config: &E2eConfig) -> CryptoResult<KeyTtl> {
    generate_key_ttl(key, config.ttl_min, config.ttl_max, &TtlParams::from(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixcrypt_crypto::CyclicGroup;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    #[test]
    fn test_invalid_range() {
        let key = LargeInt::from_u64(1);
        assert!(matches!(
            generate_key_ttl(&key, 10, 10, &TtlParams::default()),
            Err(CryptoError::InvalidTtlRange { min: 10, max: 10 })
        ));
        assert!(generate_key_ttl(&key, 20, 10, &TtlParams::default()).is_err());
    }

    #[test]
    fn test_ttl_reduces_whole_digest() {
        // 997 is prime, so a group over it gives an independent `mod` to compare against
        let modulus = CyclicGroup::new(LargeInt::from_u64(997), LargeInt::from_u64(2)).unwrap();
        let mut rng = StdRng::seed_from_u64(997);
        for _ in 0..64 {
            let mut raw = [0u8; 32];
            rng.fill_bytes(&mut raw);
            let key = LargeInt::from_bytes(&raw);
            let digest = LargeInt::from_bytes(&hash(&key.bytes()));
            let expected = modulus.mul(&digest, &LargeInt::from_u64(1));

            let ttl = generate_key_ttl(&key, 3, 1000, &TtlParams::default()).unwrap();
            assert_eq!(
                LargeInt::from_u64(u64::from(ttl.ttl - 3)).bytes(),
                expected.bytes()
            );
        }
    }

    #[test]
    fn test_num_keys_floor() {
        let params = TtlParams {
            scalar: 1.0,
            min_num_keys: 10,
        };
        let ttl = generate_key_ttl(&LargeInt::from_u64(42), 100, 200, &params).unwrap();
        assert_eq!(ttl.num_keys, u32::from(ttl.ttl) + 10);
    }

    #[test]
    fn test_num_keys_scaled() {
        let params = TtlParams {
            scalar: 2.0,
            min_num_keys: 1,
        };
        let ttl = generate_key_ttl(&LargeInt::from_u64(42), 100, 200, &params).unwrap();
        assert_eq!(ttl.num_keys, 2 * u32::from(ttl.ttl));
    }

    #[test]
    fn test_from_config() {
        let config = E2eConfig::default();
        let ttl = generate_key_ttl_from_config(&LargeInt::from_u64(5), &config).unwrap();
        assert!((config.ttl_min..config.ttl_max).contains(&ttl.ttl));
    }

    #[test]
    fn test_ttl_spread_is_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut buckets = [0u32; 10];
        for _ in 0..5000 {
            let mut raw = [0u8; 32];
            rng.fill_bytes(&mut raw);
            let ttl = generate_key_ttl(&LargeInt::from_bytes(&raw), 0, 1000, &TtlParams::default()).unwrap();
            buckets[usize::from(ttl.ttl / 100)] += 1;
        }
        // Expected 500 per bucket
        assert!(buckets.iter().all(|&n| (350..650).contains(&n)), "{buckets:?}");
    }

    proptest! {
        #[test]
        fn ttl_stays_in_range(key in any::<[u8; 32]>(), min in 0u16..1000, width in 1u16..1000) {
            let max = min + width;
            let ttl = generate_key_ttl(&LargeInt::from_bytes(&key), min, max, &TtlParams::default()).unwrap();
            prop_assert!(ttl.ttl >= min && ttl.ttl < max);
            prop_assert!(ttl.num_keys >= u32::from(ttl.ttl));
        }
    }
}
