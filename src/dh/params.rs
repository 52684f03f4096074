//! FFC domain parameter generation.
//!
//! Builds `(q, p, g)` the way finite-field DH groups are constructed in NIST
//! SP 800-56A: a prime subgroup order `q`, a prime modulus `p = c*q + 1` of the
//! requested length, and a generator `g = h^((p-1)/q) mod p` of the order-`q`
//! subgroup.
//!
//! Every search here terminates with probability 1 but has no deterministic bound.
//! The [`DhConfig`] candidate caps turn a pathological run into
//! [`Error::ResourceExhausted`] instead of a hang.

use std::fmt;

use log::{debug, trace};
use num_bigint_dig::BigUint;
use num_traits::One;

use crate::arith::RandomArithmetic;
use crate::dh::DhConfig;
use crate::error::{Error, Result};

/// The public `(q, p, g)` triple shared by both parties.
///
/// Values built with [`DomainParameters::from_parts`] (for example after decoding
/// them off the wire) are untrusted until they pass parameter validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainParameters {
    q: BigUint,
    p: BigUint,
    g: BigUint,
}

impl DomainParameters {
    /// Assemble parameters without checking them.
    pub fn from_parts(q: BigUint, p: BigUint, g: BigUint) -> Self {
        DomainParameters { q, p, g }
    }

    /// Order of the subgroup generated by `g`.
    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// The prime modulus.
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// Generator of the order-`q` subgroup.
    pub fn g(&self) -> &BigUint {
        &self.g
    }

    /// Byte length of `p`, which is also the encoded length of a shared secret.
    pub fn modulus_len(&self) -> usize {
        (self.p.bits() + 7) / 8
    }

    pub fn into_parts(self) -> (BigUint, BigUint, BigUint) {
        (self.q, self.p, self.g)
    }
}

impl fmt::Display for DomainParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FFC group (p: {} bits, q: {} bits)",
            self.p.bits(),
            self.q.bits()
        )
    }
}

/// Generate fresh domain parameters with a modulus of exactly `p_bits` bits.
pub(crate) fn generate<A: RandomArithmetic>(
    arith: &mut A,
    config: &DhConfig,
    p_bits: usize,
) -> Result<DomainParameters> {
    let q_bits = config.strength.subgroup_bits(p_bits)?;
    debug!(
        "generating domain parameters: {}-bit modulus, {}-bit subgroup",
        p_bits, q_bits
    );

    let q = find_subgroup_order(arith, config, q_bits)?;
    let p = find_modulus(arith, config, &q, p_bits)?;
    let g = find_generator(arith, config, &q, &p)?;

    Ok(DomainParameters { q, p, g })
}

fn find_subgroup_order<A: RandomArithmetic>(
    arith: &mut A,
    config: &DhConfig,
    q_bits: usize,
) -> Result<BigUint> {
    for attempt in 1..=config.max_prime_candidates {
        let candidate = arith.random_bits(q_bits)?;
        if arith.is_probable_prime(&candidate, config.primality_rounds) {
            debug!("found {}-bit q after {} candidates", q_bits, attempt);
            return Ok(candidate);
        }
    }
    Err(Error::ResourceExhausted {
        search: "subgroup order",
        attempts: config.max_prime_candidates,
    })
}

/// Search `p = 2k*q + 1` with `k` drawn so that `p` lands in `[2^(L-1), 2^L)`.
fn find_modulus<A: RandomArithmetic>(
    arith: &mut A,
    config: &DhConfig,
    q: &BigUint,
    p_bits: usize,
) -> Result<BigUint> {
    let one = BigUint::one();
    let two_q: BigUint = q << 1;

    // smallest k with 2kq + 1 >= 2^(L-1), largest k with 2kq + 1 <= 2^L - 1
    let low = (&one << (p_bits - 1)) - &one;
    let high = (&one << p_bits) - BigUint::from(2u32);
    let k_min = ((low + &two_q - &one) / &two_q).max(one.clone());
    let k_max = high / &two_q;
    if k_min > k_max {
        return Err(Error::Arithmetic("subgroup order too large for requested modulus"));
    }

    for attempt in 1..=config.max_prime_candidates {
        let k = arith.random_in_range(&k_min, &k_max)?;
        let candidate = &k * &two_q + &one;
        if candidate.bits() != p_bits {
            trace!("modulus candidate has {} bits, retrying", candidate.bits());
            continue;
        }
        if arith.is_probable_prime(&candidate, config.primality_rounds) {
            debug!("found {}-bit p after {} candidates", p_bits, attempt);
            return Ok(candidate);
        }
    }
    Err(Error::ResourceExhausted {
        search: "modulus",
        attempts: config.max_prime_candidates,
    })
}

fn find_generator<A: RandomArithmetic>(
    arith: &mut A,
    config: &DhConfig,
    q: &BigUint,
    p: &BigUint,
) -> Result<BigUint> {
    let one = BigUint::one();
    let p_minus_one = p - &one;
    let cofactor = &p_minus_one / q;
    let low = BigUint::from(2u32);
    let high = &p_minus_one - &one;

    for attempt in 1..=config.max_generator_candidates {
        let h = arith.random_in_range(&low, &high)?;
        let g = arith.mod_pow(&h, &cofactor, p)?;
        if g != one {
            debug!("found generator after {} candidates", attempt);
            return Ok(g);
        }
        trace!("generator candidate collapsed to 1, retrying");
    }
    Err(Error::ResourceExhausted {
        search: "generator",
        attempts: config.max_generator_candidates,
    })
}
