//! Reading from an injected CSPRNG
//!
//! Every operation that needs randomness takes the generator as a parameter;
//! a failed or short read surfaces as [`CryptoError::Rng`] rather than a panic.

use rand::{CryptoRng, RngCore};

use mixcrypt_core::{CryptoError, CryptoResult};

/// Fill `buf` completely from `rng`.
pub fn fill_random<R: RngCore + CryptoRng>(rng: &mut R, buf: &mut [u8]) -> CryptoResult<()> {
    rng.try_fill_bytes(buf).map_err(|e| {
        tracing::warn!(len = buf.len(), "CSPRNG read failed: {e}");
        CryptoError::Rng(format!("reading {} random bytes: {e}", buf.len()))
    })
}

/// Draw `N` random bytes.
pub fn random_array<const N: usize, R: RngCore + CryptoRng>(
    rng: &mut R,
) -> CryptoResult<[u8; N]> {
    let mut out = [0u8; N];
    fill_random(rng, &mut out)?;
    Ok(out)
}


#[cfg(test)]
mod tests {
    use super::testing::FailingRng;
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_array_is_seeded() {
        let a: [u8; 32] = random_array(&mut StdRng::seed_from_u64(7)).unwrap();
        let b: [u8; 32] = random_array(&mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_failing_rng_is_an_error() {
        let result: CryptoResult<[u8; 32]> = random_array(&mut FailingRng);
        assert!(matches!(result, Err(CryptoError::Rng(_))));
    }
}
