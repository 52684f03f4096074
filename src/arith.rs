//! Arbitrary-precision arithmetic behind a narrow interface.
//!
//! The key-agreement code never touches a big-integer library directly. It asks an
//! [`Arithmetic`] provider for modular exponentiation and a probabilistic primality
//! verdict, and a [`RandomArithmetic`] provider additionally for uniform random
//! integers from a cryptographic source. [`NumBigintArithmetic`] is the provider
//! backed by `num-bigint-dig`.
//!
//! Validation and session key derivation only need [`Arithmetic`], so they run on a
//! provider that holds no RNG and never touches OS entropy.
//!
//! `num-bigint-dig`'s `modpow` is not constant time. Key generation and derivation
//! therefore leak timing information about private exponents to a local observer.

use log::trace;
use num_bigint_dig::prime::probably_prime;
use num_bigint_dig::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::error::{Error, Result};

/// Deterministic operations the key-agreement core needs from a big-integer library.
pub trait Arithmetic {
    /// `base^exp mod modulus`.
    fn mod_pow(&self, base: &BigUint, exp: &BigUint, modulus: &BigUint) -> Result<BigUint>;

    /// Probabilistic primality test. A composite passes with probability at most
    /// `4^-rounds`.
    fn is_probable_prime(&self, n: &BigUint, rounds: usize) -> bool;
}

/// An [`Arithmetic`] provider that can also draw random integers.
pub trait RandomArithmetic: Arithmetic {
    /// Uniform random integer in the inclusive range `[low, high]`.
    fn random_in_range(&mut self, low: &BigUint, high: &BigUint) -> Result<BigUint>;

    /// Uniform random odd integer of exactly `bits` bits.
    fn random_bits(&mut self, bits: usize) -> Result<BigUint> {
        if bits < 2 {
            return Err(Error::Arithmetic("random odd integer needs at least 2 bits"));
        }
        let low = BigUint::one() << (bits - 1);
        let high = (BigUint::one() << bits) - BigUint::one();
        let candidate = self.random_in_range(&low, &high)?;
        // `high` is odd, so bumping an even candidate stays in range.
        Ok(if candidate.is_even() {
            candidate + BigUint::one()
        } else {
            candidate
        })
    }
}

/// [`Arithmetic`] backed by `num-bigint-dig`, with a cryptographic RNG when `R` is one.
///
/// Primality uses `num-bigint-dig`'s Baillie-PSW style test: `rounds` Miller-Rabin
/// bases followed by a strong Lucas test. Its Miller-Rabin bases come from an RNG
/// seeded by the candidate itself, not from `R`.
#[derive(Debug)]
pub struct NumBigintArithmetic<R = ChaCha20Rng> {
    rng: R,
}

impl NumBigintArithmetic<ChaCha20Rng> {
    /// Seed from OS entropy, or from `seed` for reproducible runs in tests.
    pub fn from_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha20Rng::seed_from_u64(s),
            None => ChaCha20Rng::from_entropy(),
        };
        NumBigintArithmetic { rng }
    }
}

impl Default for NumBigintArithmetic<ChaCha20Rng> {
    fn default() -> Self {
        Self::from_seed(None)
    }
}

impl NumBigintArithmetic<()> {
    /// Provider for validation and derivation only. Holds no RNG, so it cannot
    /// generate parameters or keys.
    pub fn without_rng() -> Self {
        NumBigintArithmetic { rng: () }
    }
}

impl<R: RngCore + CryptoRng> NumBigintArithmetic<R> {
    /// Draw randomness from a caller-supplied cryptographic RNG.
    pub fn with_rng(rng: R) -> Self {
        NumBigintArithmetic { rng }
    }
}

impl<R> Arithmetic for NumBigintArithmetic<R> {
    fn mod_pow(&self, base: &BigUint, exp: &BigUint, modulus: &BigUint) -> Result<BigUint> {
        if modulus.is_zero() {
            return Err(Error::Arithmetic("modular exponentiation with zero modulus"));
        }
        Ok(base.modpow(exp, modulus))
    }

    fn is_probable_prime(&self, n: &BigUint, rounds: usize) -> bool {
        let verdict = probably_prime(n, rounds);
        trace!("primality test on {}-bit value: {}", n.bits(), verdict);
        verdict
    }
}

impl<R: RngCore + CryptoRng> RandomArithmetic for NumBigintArithmetic<R> {
    fn random_in_range(&mut self, low: &BigUint, high: &BigUint) -> Result<BigUint> {
        if low > high {
            return Err(Error::Arithmetic("empty random range"));
        }
        // gen_biguint_range excludes its upper bound
        let upper = high + BigUint::one();
        Ok(self.rng.gen_biguint_range(low, &upper))
    }
}
