//! Checks applied to values received from a peer before they are trusted.
//!
//! Both validators fail fast on the first violated check and never try to repair
//! their input.

use log::{debug, warn};
use num_bigint_dig::BigUint;
use num_integer::Integer;
use num_traits::One;

use crate::arith::Arithmetic;
use crate::dh::keys::PublicKey;
use crate::dh::DhConfig;
use crate::error::{Error, ParameterFault, PublicKeyFault, Result};

/// Validate a `(q, p, g)` tuple. Checks run in this order:
///
/// 1. `q` and `p` are prime
/// 2. `p` is at least the configured floor long
/// 3. `q` divides `p - 1`
/// 4. `1 < g < p - 1`
/// 5. `g^q mod p == 1`
/// 6. `g != 1`
pub(crate) fn validate_parameters<A: Arithmetic>(
    arith: &A,
    config: &DhConfig,
    q: &BigUint,
    p: &BigUint,
    g: &BigUint,
) -> Result<()> {
    let reject = |fault: ParameterFault| {
        warn!("rejecting domain parameters: {}", fault);
        Err(Error::InvalidDomainParameters(fault))
    };

    if !arith.is_probable_prime(q, config.primality_rounds) {
        return reject(ParameterFault::QNotPrime);
    }
    if !arith.is_probable_prime(p, config.primality_rounds) {
        return reject(ParameterFault::PNotPrime);
    }

    let min = config.strength.floor_bits();
    if p.bits() < min {
        return reject(ParameterFault::ModulusTooShort { bits: p.bits(), min });
    }

    let one = BigUint::one();
    let p_minus_one = p - &one;
    if !p_minus_one.is_multiple_of(q) {
        return reject(ParameterFault::SubgroupOrderMismatch);
    }

    if g <= &one || g >= &p_minus_one {
        return reject(ParameterFault::GeneratorOutOfRange);
    }

    if arith.mod_pow(g, q, p)? != one {
        return reject(ParameterFault::GeneratorNotInSubgroup);
    }

    if g.is_one() {
        return reject(ParameterFault::GeneratorIsIdentity);
    }

    debug!(
        "domain parameters accepted ({}-bit p, {}-bit q)",
        p.bits(),
        q.bits()
    );
    Ok(())
}

/// Validate a peer public key: `2 <= K <= p - 2` and `K^q mod p == 1`.
///
/// Without this check a malicious peer can send an element of a small subgroup and
/// confine the shared secret to a handful of guessable values.
///
/// `q < 2` is a caller error: `K^0` and `K^1` make the subgroup test meaningless.
/// For `p < 5` the range `[2, p - 2]` is empty, so every key is out of range.
pub(crate) fn validate_public_key<A: Arithmetic>(
    arith: &A,
    key: &PublicKey,
    q: &BigUint,
    p: &BigUint,
) -> Result<()> {
    let two = BigUint::from(2u32);
    if q < &two {
        return Err(Error::PreconditionViolation("subgroup order too small"));
    }

    let k = key.value();
    if p < &BigUint::from(5u32) || k < &two || k > &(p - &two) {
        warn!("rejecting peer public key: {}", PublicKeyFault::OutOfRange);
        return Err(Error::InvalidPublicKey(PublicKeyFault::OutOfRange));
    }
    if !arith.mod_pow(k, q, p)?.is_one() {
        warn!("rejecting peer public key: {}", PublicKeyFault::NotInSubgroup);
        return Err(Error::InvalidPublicKey(PublicKeyFault::NotInSubgroup));
    }

    debug!("peer public key accepted ({} bits)", k.bits());
    Ok(())
}
