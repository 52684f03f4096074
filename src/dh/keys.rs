//! Key pairs and shared-secret derivation.
//!
//! Private keys and session keys are wiped when dropped, print as `[redacted]`,
//! and have no byte encoding for the wire. Only [`PublicKey`] crosses a trust
//! boundary.

use std::fmt;

use log::debug;
use num_bigint_dig::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::arith::{Arithmetic, RandomArithmetic};
use crate::error::{Error, Result};

/// Secret exponent `k` in `[1, q - 1]`.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(BigUint);

impl PrivateKey {
    pub(crate) fn value(&self) -> &BigUint {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey([redacted])")
    }
}

/// Public value `K = g^k mod p`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicKey(BigUint);

impl PublicKey {
    /// The integer `K`. Not validated unless it came from [`generate_keypair`].
    ///
    /// [`generate_keypair`]: crate::dh::generate_keypair
    pub fn value(&self) -> &BigUint {
        &self.0
    }

    /// Consume the key and return `K`.
    pub fn into_inner(self) -> BigUint {
        self.0
    }
}

impl From<BigUint> for PublicKey {
    fn from(value: BigUint) -> Self {
        PublicKey(value)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0.to_bytes_be()))
    }
}

/// A private exponent and its public value, bound to one set of domain parameters.
#[derive(Debug)]
pub struct KeyPair {
    private: PrivateKey,
    public: PublicKey,
}

impl KeyPair {
    /// The secret exponent `k`.
    pub fn private_key(&self) -> &PrivateKey {
        &self.private
    }

    /// The value to send to the peer.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }
}

/// Shared secret `Z = K_peer^k mod p`.
///
/// Both parties compute the same value. It is meant for a single exchange and
/// should be dropped as soon as the symmetric key has been derived from it.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SessionKey {
    value: BigUint,
    len: usize,
}

impl SessionKey {
    /// Fixed-length big-endian encoding, left-padded to the byte length of `p`.
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        let raw = Zeroizing::new(self.value.to_bytes_be());
        let mut out = Zeroizing::new(vec![0u8; self.len]);
        let offset = self.len.saturating_sub(raw.len());
        out[offset..].copy_from_slice(&raw[raw.len().saturating_sub(self.len)..]);
        out
    }

    /// Encoded length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Never true for a key produced by session key derivation.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl ConstantTimeEq for SessionKey {
    /// Compares the padded encodings. Only the lengths, which are public, may
    /// short-circuit.
    fn ct_eq(&self, other: &Self) -> Choice {
        if self.len != other.len {
            return Choice::from(0);
        }
        self.to_bytes().as_slice().ct_eq(other.to_bytes().as_slice())
    }
}

impl PartialEq for SessionKey {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for SessionKey {}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionKey({} bytes, [redacted])", self.len)
    }
}

/// Draw `k` uniformly from `[1, q - 1]` and compute `K = g^k mod p`.
///
/// Only the cheap structural preconditions are checked here. Primality is the
/// caller's job (validate the parameters once, then generate as many keys as needed).
pub(crate) fn generate_keypair<A: RandomArithmetic>(
    arith: &mut A,
    q: &BigUint,
    p: &BigUint,
    g: &BigUint,
) -> Result<KeyPair> {
    let one = BigUint::one();
    if p < &BigUint::from(5u32) {
        return Err(Error::PreconditionViolation("modulus too small"));
    }
    if q < &BigUint::from(2u32) {
        return Err(Error::PreconditionViolation("subgroup order too small"));
    }
    let p_minus_one = p - &one;
    if !p_minus_one.is_multiple_of(q) {
        return Err(Error::PreconditionViolation("q does not divide p - 1"));
    }
    if g <= &one || g >= &p_minus_one {
        return Err(Error::PreconditionViolation("generator out of range"));
    }

    let k = arith.random_in_range(&one, &(q - &one))?;
    let public = arith.mod_pow(g, &k, p)?;
    debug!("generated key pair ({}-bit public value)", public.bits());

    Ok(KeyPair {
        private: PrivateKey(k),
        public: PublicKey(public),
    })
}

/// `Z = peer^own mod p`. Pure: no randomness, no state.
pub(crate) fn derive_session_key<A: Arithmetic>(
    arith: &A,
    peer: &PublicKey,
    own: &PrivateKey,
    p: &BigUint,
) -> Result<SessionKey> {
    if p < &BigUint::from(5u32) {
        return Err(Error::PreconditionViolation("modulus too small"));
    }
    if own.value().is_zero() {
        return Err(Error::PreconditionViolation("private key is zero"));
    }

    let value = arith.mod_pow(peer.value(), own.value(), p)?;
    if value <= BigUint::one() {
        // unreachable for a validated peer key and an in-range private key
        return Err(Error::PreconditionViolation("shared secret degenerated"));
    }

    Ok(SessionKey {
        value,
        len: (p.bits() + 7) / 8,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::NumBigintArithmetic;
    use crate::dh::tests::small_params;

    #[test]
    fn test_keypair_ranges() {
        let params = small_params();
        let mut arith = NumBigintArithmetic::from_seed(Some(100));
        for _ in 0..20 {
            let kp = generate_keypair(&mut arith, params.q(), params.p(), params.g()).unwrap();
            let k = kp.private_key().value();
            assert!(!k.is_zero() && k < params.q());
            assert_eq!(kp.public_key().value(), &params.g().modpow(k, params.p()));
        }
    }

    #[test]
    fn test_keypair_rejects_structurally_broken_parameters() {
        let params = small_params();
        let mut arith = NumBigintArithmetic::from_seed(Some(100));
        let (q, p, g) = (params.q(), params.p(), params.g());
        let one = BigUint::one();

        let cases = [
            (q.clone(), BigUint::from(3u32), g.clone()),
            (one.clone(), p.clone(), g.clone()),
            (q + &one, p.clone(), g.clone()),
            (q.clone(), p.clone(), one.clone()),
            (q.clone(), p.clone(), p - &one),
        ];
        for (q, p, g) in cases.iter() {
            assert!(matches!(
                generate_keypair(&mut arith, q, p, g),
                Err(Error::PreconditionViolation(_))
            ));
        }
    }

    #[test]
    fn test_both_sides_derive_the_same_secret() {
        let params = small_params();
        let mut arith = NumBigintArithmetic::from_seed(Some(7));
        let alice = generate_keypair(&mut arith, params.q(), params.p(), params.g()).unwrap();
        let bob = generate_keypair(&mut arith, params.q(), params.p(), params.g()).unwrap();

        let alice_secret =
            derive_session_key(&arith, bob.public_key(), alice.private_key(), params.p()).unwrap();
        let bob_secret =
            derive_session_key(&arith, alice.public_key(), bob.private_key(), params.p()).unwrap();

        assert_eq!(alice_secret, bob_secret, "Diffie-Hellman secrets must match");
        assert_eq!(alice_secret.len(), params.modulus_len());
        assert_eq!(alice_secret.to_bytes().len(), params.modulus_len());
    }

    #[test]
    fn test_session_key_encoding_is_left_padded() {
        let key = SessionKey {
            value: BigUint::from(0x0102u32),
            len: 4,
        };
        assert_eq!(&key.to_bytes()[..], &[0u8, 0, 1, 2][..]);
    }

    #[test]
    fn test_degenerate_secret_is_rejected() {
        let params = small_params();
        let arith = NumBigintArithmetic::from_seed(Some(7));
        let own = PrivateKey(BigUint::from(5u32));
        let result = derive_session_key(&arith, &PublicKey::from(BigUint::one()), &own, params.p());
        assert!(matches!(result, Err(Error::PreconditionViolation(_))));

        let zero = PrivateKey(BigUint::zero());
        let peer = PublicKey::from(params.g().clone());
        assert!(derive_session_key(&arith, &peer, &zero, params.p()).is_err());
    }

    #[test]
    fn test_session_keys_compare_in_constant_time() {
        let key = |v: u32, len: usize| SessionKey {
            value: BigUint::from(v),
            len,
        };
        assert!(bool::from(key(0x0102, 4).ct_eq(&key(0x0102, 4))));
        assert!(!bool::from(key(0x0102, 4).ct_eq(&key(0x0103, 4))));
        // same integer, different padded length
        assert!(!bool::from(key(0x0102, 4).ct_eq(&key(0x0102, 8))));
        assert_eq!(key(7, 2), key(7, 2));
        assert_ne!(key(7, 2), key(8, 2));
    }

    #[test]
    fn test_secrets_are_redacted_in_debug_output() {
        let params = small_params();
        let mut arith = NumBigintArithmetic::from_seed(Some(9));
        let kp = generate_keypair(&mut arith, params.q(), params.p(), params.g()).unwrap();
        let rendered = format!("{:?}", kp);
        assert!(rendered.contains("[redacted]"));
        assert!(!rendered.contains(&kp.private_key().value().to_string()));
    }

    #[test]
    fn test_public_key_displays_as_hex() {
        let key = PublicKey::from(BigUint::from(0xabcdu32));
        assert_eq!(key.to_string(), "abcd");
    }
}
