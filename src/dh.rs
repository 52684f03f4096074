//! Finite-field Diffie-Hellman key agreement.
//!
//! The protocol flow between two parties:
//!
//! 1. one side generates `(q, p, g)` and sends it over
//! 2. the receiver validates the parameters
//! 3. both sides generate a key pair and exchange public keys
//! 4. each side validates the peer public key
//! 5. each side derives the session key; the two values are identical
//!
//! ```no_run
//! use ffc_dh::dh::DiffieHellman;
//!
//! let mut alice = DiffieHellman::new();
//! let mut bob = DiffieHellman::new();
//!
//! let params = alice.generate_parameters(2048)?;
//! let (q, p, g) = (params.q(), params.p(), params.g());
//! bob.validate_parameters(q, p, g)?;
//!
//! let a = alice.generate_keypair(q, p, g)?;
//! let b = bob.generate_keypair(q, p, g)?;
//!
//! alice.validate_public_key(b.public_key(), q, p)?;
//! bob.validate_public_key(a.public_key(), q, p)?;
//!
//! let za = alice.generate_session_key(b.public_key(), a.private_key(), p)?;
//! let zb = bob.generate_session_key(a.public_key(), b.private_key(), p)?;
//! assert_eq!(za, zb);
//! # Ok::<(), ffc_dh::Error>(())
//! ```

pub mod keys;
pub mod params;
pub mod strength;
mod validate;

#[cfg(test)]
pub(crate) mod tests;

pub use keys::{KeyPair, PrivateKey, PublicKey, SessionKey};
pub use params::DomainParameters;
pub use strength::{StrengthEntry, StrengthTable};

use num_bigint_dig::BigUint;

use crate::arith::{Arithmetic, NumBigintArithmetic, RandomArithmetic};
use crate::error::Result;

/// Tunables for parameter generation and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhConfig {
    /// Supported modulus sizes and their subgroup sizes.
    pub strength: StrengthTable,
    /// Miller-Rabin rounds per primality test; error bound is `4^-rounds`.
    pub primality_rounds: usize,
    /// Cap on candidates tried by each prime search (for `q`, then for `p`).
    pub max_prime_candidates: u64,
    /// Cap on `h` values tried while looking for a generator.
    pub max_generator_candidates: u64,
}

impl Default for DhConfig {
    fn default() -> Self {
        DhConfig {
            strength: StrengthTable::default(),
            primality_rounds: 64,
            max_prime_candidates: 1_000_000,
            max_generator_candidates: 10_000,
        }
    }
}

/// One party's view of the key agreement.
///
/// Holds configuration and an arithmetic provider, nothing else. Parameters and keys
/// are returned as values and passed back in explicitly. Generation needs a provider
/// with an RNG; validation and derivation work with any [`Arithmetic`].
#[derive(Debug)]
pub struct DiffieHellman<A = NumBigintArithmetic> {
    config: DhConfig,
    arith: A,
}

impl DiffieHellman<NumBigintArithmetic> {
    /// Default configuration, randomness from OS entropy.
    pub fn new() -> Self {
        Self::with_arithmetic(DhConfig::default(), NumBigintArithmetic::from_seed(None))
    }

    /// `Some(seed)` gives a reproducible run. Only for tests and demos.
    pub fn with_config(config: DhConfig, seed: Option<u64>) -> Self {
        Self::with_arithmetic(config, NumBigintArithmetic::from_seed(seed))
    }
}

impl Default for DiffieHellman<NumBigintArithmetic> {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffieHellman<NumBigintArithmetic<()>> {
    /// A party that only validates and derives. Never reads OS entropy.
    pub fn verifier(config: DhConfig) -> Self {
        Self::with_arithmetic(config, NumBigintArithmetic::without_rng())
    }
}

impl<A: Arithmetic> DiffieHellman<A> {
    /// Use a caller-supplied arithmetic provider.
    pub fn with_arithmetic(config: DhConfig, arith: A) -> Self {
        DiffieHellman { config, arith }
    }

    /// The configuration this party was built with.
    pub fn config(&self) -> &DhConfig {
        &self.config
    }

    /// Check a received `(q, p, g)`; `Ok(())` means it is safe to generate keys under it.
    pub fn validate_parameters(&self, q: &BigUint, p: &BigUint, g: &BigUint) -> Result<()> {
        validate::validate_parameters(&self.arith, &self.config, q, p, g)
    }

    /// [`validate_parameters`](Self::validate_parameters) on a decoded parameter set.
    pub fn validate_domain(&self, params: &DomainParameters) -> Result<()> {
        self.validate_parameters(params.q(), params.p(), params.g())
    }

    /// Check a peer public key for range and subgroup membership.
    ///
    /// Fails with `PreconditionViolation` when `q < 2`.
    pub fn validate_public_key(&self, key: &PublicKey, q: &BigUint, p: &BigUint) -> Result<()> {
        validate::validate_public_key(&self.arith, key, q, p)
    }

    /// Combine a validated peer public key with our own private key.
    pub fn generate_session_key(
        &self,
        peer_public: &PublicKey,
        own_private: &PrivateKey,
        p: &BigUint,
    ) -> Result<SessionKey> {
        keys::derive_session_key(&self.arith, peer_public, own_private, p)
    }
}

impl<A: RandomArithmetic> DiffieHellman<A> {
    /// Generate `(q, p, g)` with `p` exactly `min_p_bits` long.
    ///
    /// Fails with `InvalidParameterRequest` for sizes outside the strength table and
    /// with `ResourceExhausted` if a search hits its candidate cap.
    pub fn generate_parameters(&mut self, min_p_bits: usize) -> Result<DomainParameters> {
        params::generate(&mut self.arith, &self.config, min_p_bits)
    }

    /// Generate a key pair under parameters that have already been validated.
    pub fn generate_keypair(&mut self, q: &BigUint, p: &BigUint, g: &BigUint) -> Result<KeyPair> {
        keys::generate_keypair(&mut self.arith, q, p, g)
    }
}

/// [`DiffieHellman::generate_parameters`] with the default configuration and OS entropy.
pub fn generate_parameters(min_p_bits: usize) -> Result<DomainParameters> {
    DiffieHellman::new().generate_parameters(min_p_bits)
}

/// [`DiffieHellman::validate_parameters`] with the default configuration. No randomness.
pub fn validate_parameters(q: &BigUint, p: &BigUint, g: &BigUint) -> Result<()> {
    DiffieHellman::verifier(DhConfig::default()).validate_parameters(q, p, g)
}

/// [`DiffieHellman::generate_keypair`] with OS entropy.
pub fn generate_keypair(q: &BigUint, p: &BigUint, g: &BigUint) -> Result<KeyPair> {
    DiffieHellman::new().generate_keypair(q, p, g)
}

/// [`DiffieHellman::validate_public_key`]. No randomness.
pub fn validate_public_key(key: &PublicKey, q: &BigUint, p: &BigUint) -> Result<()> {
    DiffieHellman::verifier(DhConfig::default()).validate_public_key(key, q, p)
}

/// [`DiffieHellman::generate_session_key`]. Pure function of its inputs.
pub fn generate_session_key(
    peer_public: &PublicKey,
    own_private: &PrivateKey,
    p: &BigUint,
) -> Result<SessionKey> {
    DiffieHellman::verifier(DhConfig::default())
        .generate_session_key(peer_public, own_private, p)
}
