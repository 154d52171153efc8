//! Diffie–Hellman in a prime-order cyclic group
//!
//! The default group is the 2048-bit MODP group of RFC 3526 with generator 2.
//! Group elements travel as minimal big-endian byte strings ([`LargeInt::bytes`]).

use std::sync::LazyLock;

use ::rsa::BigUint;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

use mixcrypt_core::{CryptoError, CryptoResult};

use crate::rng::fill_random;

/// Default length of a freshly drawn private exponent in bytes
pub const PRIVATE_KEY_LEN: usize = 32;

const MODP_2048_PRIME: &[u8] = b"\
FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD1\
29024E088A67CC74020BBEA63B139B22514A08798E3404DD\
EF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245\
E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED\
EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3D\
C2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F\
83655D23DCA3AD961C62F356208552BB9ED529077096966D\
670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B\
E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9\
DE2BCBF6955817183995497CEA956AE515D2261898FA0510\
15728E5A8AACAA68FFFFFFFFFFFFFFFF";

static MODP_2048: LazyLock<CyclicGroup> = LazyLock::new(|| {
    let Some(prime) = BigUint::parse_bytes(MODP_2048_PRIME, 16) else {
        unreachable!("RFC 3526 prime is valid hex");
    };
    CyclicGroup {
        prime_len: prime.bits().div_ceil(8),
        prime,
        generator: BigUint::from(2u32),
    }
});

/// An arbitrary-precision non-negative integer (group element or exponent).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LargeInt(BigUint);

impl LargeInt {
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(BigUint::from_bytes_be(data))
    }

    pub fn from_u64(v: u64) -> Self {
        Self(BigUint::from(v))
    }

    /// Minimal big-endian encoding; zero encodes as the empty string.
    pub fn bytes(&self) -> Vec<u8> {
        if self.is_zero() {
            return Vec::new();
        }
        self.0.to_bytes_be()
    }

    /// Big-endian encoding left-padded with zeros to `len` bytes.
    ///
    /// Values wider than `len` are returned unpadded.
    pub fn left_padded(&self, len: usize) -> Vec<u8> {
        let raw = self.bytes();
        if raw.len() >= len {
            return raw;
        }
        let mut out = vec![0u8; len - raw.len()];
        out.extend_from_slice(&raw);
        out
    }

    pub fn is_zero(&self) -> bool {
        self.0.bits() == 0
    }

    pub fn bit_len(&self) -> usize {
        self.0.bits()
    }
}

impl std::fmt::Debug for LargeInt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Group elements can be private exponents; show size only
        write!(f, "LargeInt({} bits)", self.bit_len())
    }
}

impl From<BigUint> for LargeInt {
    fn from(v: BigUint) -> Self {
        Self(v)
    }
}

/// A multiplicative group modulo a safe prime.
#[derive(Clone)]
pub struct CyclicGroup {
    prime: BigUint,
    generator: BigUint,
    prime_len: usize,
}

impl std::fmt::Debug for CyclicGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CyclicGroup")
            .field("prime_bits", &self.prime.bits())
            .field("generator", &self.generator.to_string())
            .finish()
    }
}

impl CyclicGroup {
    /// The RFC 3526 2048-bit MODP group.
    pub fn modp_2048() -> &'static CyclicGroup {
        &MODP_2048
    }

    /// Build a group from an explicit prime and generator (`1 < g < p`).
    pub fn new(prime: LargeInt, generator: LargeInt) -> CryptoResult<Self> {
        let three = BigUint::from(3u32);
        if prime.0 < three {
            return Err(CryptoError::malformed("group prime must be at least 3"));
        }
        if generator.0 <= BigUint::from(1u32) || generator.0 >= prime.0 {
            return Err(CryptoError::malformed("group generator out of range"));
        }
        Ok(Self {
            prime_len: prime.0.bits().div_ceil(8),
            prime: prime.0,
            generator: generator.0,
        })
    }

    /// Byte length of the prime; the width of a padded group element.
    pub fn prime_len(&self) -> usize {
        self.prime_len
    }

    pub fn prime(&self) -> LargeInt {
        LargeInt(self.prime.clone())
    }

    /// True for `1 < x < p`.
    pub fn contains(&self, x: &LargeInt) -> bool {
        x.0 > BigUint::from(1u32) && x.0 < self.prime
    }

    /// `base^exponent mod p`
    pub fn exp(&self, base: &LargeInt, exponent: &LargeInt) -> LargeInt {
        LargeInt(base.0.modpow(&exponent.0, &self.prime))
    }

    /// `g^exponent mod p`
    pub fn exp_g(&self, exponent: &LargeInt) -> LargeInt {
        LargeInt(self.generator.modpow(&exponent.0, &self.prime))
    }

    /// `a·b mod p`
    pub fn mul(&self, a: &LargeInt, b: &LargeInt) -> LargeInt {
        LargeInt((&a.0 * &b.0) % &self.prime)
    }

    /// Multiplicative inverse, `a^(p−2) mod p`.
    pub fn inverse(&self, a: &LargeInt) -> CryptoResult<LargeInt> {
        if (&a.0 % &self.prime).bits() == 0 {
            return Err(CryptoError::malformed("zero has no inverse"));
        }
        let exponent = &self.prime - &BigUint::from(2u32);
        Ok(LargeInt(a.0.modpow(&exponent, &self.prime)))
    }

    /// Draw a private exponent of `len` random bytes, forced into `[2, p−2]`.
    pub fn random_private_key<R: RngCore + CryptoRng>(
        &self,
        len: usize,
        rng: &mut R,
    ) -> CryptoResult<LargeInt> {
        let mut raw = vec![0u8; len];
        fill_random(rng, &mut raw)?;
        let value = BigUint::from_bytes_be(&raw);
        raw.zeroize();

        let range = &self.prime - &BigUint::from(3u32);
        Ok(LargeInt((value % range) + BigUint::from(2u32)))
    }

    /// `g^private mod p`
    pub fn public_key(&self, private: &LargeInt) -> LargeInt {
        self.exp_g(private)
    }

    /// `partner_public^own_private mod p`, rejecting out-of-group partner keys.
    pub fn diffie_hellman(
        &self,
        own_private: &LargeInt,
        partner_public: &LargeInt,
    ) -> CryptoResult<LargeInt> {
        if !self.contains(partner_public) {
            return Err(CryptoError::malformed("partner public key is not in the group"));
        }
        Ok(self.exp(partner_public, own_private))
    }
}
