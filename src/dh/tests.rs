use std::sync::OnceLock;

use num_bigint_dig::BigUint;
use num_traits::{Num, One, Zero};

use crate::cipher::{ChaChaStreamCipher, SymmetricCipher};
use crate::dh::{
    self, DhConfig, DiffieHellman, DomainParameters, KeyPair, PublicKey, SessionKey,
    StrengthEntry, StrengthTable,
};
use crate::error::{Error, ParameterFault, PublicKeyFault};

// RFC 3526 group 14: safe prime p, q = (p - 1) / 2, g = 2
const MODP_2048_HEX: &str = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7EDEE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3BE39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF6955817183995497CEA956AE515D2261898FA051015728E5A8AACAA68FFFFFFFFFFFFFFFF";

/// 512-bit modulus, 160-bit subgroup. Far too small for real use, fast enough for
/// unoptimized test builds.
pub(crate) fn small_config() -> DhConfig {
    DhConfig {
        strength: StrengthTable::new(
            512,
            1024,
            vec![StrengthEntry {
                min_p_bits: 512,
                q_bits: 160,
            }],
        )
        .unwrap(),
        primality_rounds: 32,
        ..DhConfig::default()
    }
}

pub(crate) fn small_params() -> DomainParameters {
    static PARAMS: OnceLock<DomainParameters> = OnceLock::new();
    PARAMS
        .get_or_init(|| {
            DiffieHellman::with_config(small_config(), Some(42))
                .generate_parameters(512)
                .unwrap()
        })
        .clone()
}

/// Alice's and Bob's session keys for one exchange over [`small_params`].
pub(crate) fn session_pair(seed: u64) -> (SessionKey, SessionKey) {
    let params = small_params();
    let mut alice = DiffieHellman::with_config(small_config(), Some(seed));
    let mut bob = DiffieHellman::with_config(small_config(), Some(seed + 1_000));
    let a = keypair(&mut alice, &params);
    let b = keypair(&mut bob, &params);
    let za = alice
        .generate_session_key(b.public_key(), a.private_key(), params.p())
        .unwrap();
    let zb = bob
        .generate_session_key(a.public_key(), b.private_key(), params.p())
        .unwrap();
    (za, zb)
}

fn keypair(party: &mut DiffieHellman, params: &DomainParameters) -> KeyPair {
    party
        .generate_keypair(params.q(), params.p(), params.g())
        .unwrap()
}

fn modp_2048() -> DomainParameters {
    let p = BigUint::from_str_radix(MODP_2048_HEX, 16).unwrap();
    let q = (&p - BigUint::one()) >> 1;
    DomainParameters::from_parts(q, p, BigUint::from(2u32))
}

#[test]
fn test_generated_parameters_always_validate() {
    for seed in 0..5 {
        let mut dh = DiffieHellman::with_config(small_config(), Some(seed));
        let params = dh.generate_parameters(512).unwrap();
        dh.validate_domain(&params)
            .unwrap_or_else(|e| panic!("seed {}: {}", seed, e));
    }
}

#[test]
fn test_default_strength_parameters_validate() {
    let mut dh = DiffieHellman::with_config(DhConfig::default(), Some(2048));
    let params = dh.generate_parameters(2048).unwrap();
    assert_eq!(params.p().bits(), 2048);
    assert_eq!(params.q().bits(), 256);
    dh.validate_parameters(params.q(), params.p(), params.g())
        .unwrap();
}

#[test]
fn test_below_minimum_request_is_rejected() {
    assert!(matches!(
        dh::generate_parameters(1024),
        Err(Error::InvalidParameterRequest {
            requested: 1024,
            ..
        })
    ));
}

#[test]
fn test_published_group_validates() {
    let group = modp_2048();
    let dh = DiffieHellman::new();
    dh.validate_domain(&group).unwrap();
}

#[test]
fn test_published_group_too_short_for_a_higher_floor() {
    let group = modp_2048();
    let config = DhConfig {
        strength: StrengthTable::new(
            3072,
            16384,
            vec![StrengthEntry {
                min_p_bits: 3072,
                q_bits: 256,
            }],
        )
        .unwrap(),
        ..DhConfig::default()
    };
    let dh = DiffieHellman::with_config(config, None);
    assert!(matches!(
        dh.validate_domain(&group),
        Err(Error::InvalidDomainParameters(
            ParameterFault::ModulusTooShort {
                bits: 2048,
                min: 3072
            }
        ))
    ));
}

#[test]
fn test_keypairs_are_in_range_and_pass_validation() {
    let params = small_params();
    let mut dh = DiffieHellman::with_config(small_config(), Some(8));
    for _ in 0..10 {
        let kp = keypair(&mut dh, &params);
        let k = kp.private_key().value();
        assert!(!k.is_zero());
        assert!(k < params.q());
        dh.validate_public_key(kp.public_key(), params.q(), params.p())
            .unwrap();
    }
}

#[test]
fn test_full_exchange_agrees() {
    let params = small_params();
    let mut alice = DiffieHellman::with_config(small_config(), Some(1));
    let mut bob = DiffieHellman::with_config(small_config(), Some(2));

    bob.validate_domain(&params).unwrap();

    let a = keypair(&mut alice, &params);
    let b = keypair(&mut bob, &params);
    assert_ne!(a.public_key(), b.public_key());

    alice
        .validate_public_key(b.public_key(), params.q(), params.p())
        .unwrap();
    bob.validate_public_key(a.public_key(), params.q(), params.p())
        .unwrap();

    let za = alice
        .generate_session_key(b.public_key(), a.private_key(), params.p())
        .unwrap();
    let zb = bob
        .generate_session_key(a.public_key(), b.private_key(), params.p())
        .unwrap();
    assert_eq!(za, zb);
}

#[test]
fn test_convenience_functions_agree() {
    let params = small_params();
    let (q, p, g) = (params.q(), params.p(), params.g());
    let a = dh::generate_keypair(q, p, g).unwrap();
    let b = dh::generate_keypair(q, p, g).unwrap();
    dh::validate_public_key(a.public_key(), q, p).unwrap();
    dh::validate_public_key(b.public_key(), q, p).unwrap();
    assert_eq!(
        dh::generate_session_key(b.public_key(), a.private_key(), p).unwrap(),
        dh::generate_session_key(a.public_key(), b.private_key(), p).unwrap()
    );
}

#[test]
fn test_verifier_validates_and_derives_without_an_rng() {
    let params = small_params();
    let (q, p, g) = (params.q(), params.p(), params.g());
    let mut alice = DiffieHellman::with_config(small_config(), Some(51));
    let mut bob = DiffieHellman::with_config(small_config(), Some(52));
    let a = alice.generate_keypair(q, p, g).unwrap();
    let b = bob.generate_keypair(q, p, g).unwrap();

    let verifier = DiffieHellman::verifier(small_config());
    verifier.validate_domain(&params).unwrap();
    verifier.validate_public_key(b.public_key(), q, p).unwrap();
    assert_eq!(
        verifier
            .generate_session_key(b.public_key(), a.private_key(), p)
            .unwrap(),
        bob.generate_session_key(a.public_key(), b.private_key(), p)
            .unwrap()
    );
    assert_eq!(
        dh::generate_session_key(b.public_key(), a.private_key(), p).unwrap(),
        verifier
            .generate_session_key(b.public_key(), a.private_key(), p)
            .unwrap()
    );
}

#[test]
fn test_every_single_field_mutation_is_rejected() {
    let params = small_params();
    let dh = DiffieHellman::with_config(small_config(), None);
    let one = BigUint::one();
    let (q, p, g) = (params.q(), params.p(), params.g());

    let mutations = [
        (q + &one, p.clone(), g.clone()),
        (q.clone(), p + &one, g.clone()),
        (q.clone(), p.clone(), g + &one),
        (q * BigUint::from(3u32), p.clone(), g.clone()),
    ];
    for (mq, mp, mg) in mutations.iter() {
        assert!(matches!(
            dh.validate_parameters(mq, mp, mg),
            Err(Error::InvalidDomainParameters(_))
        ));
    }
}

#[test]
fn test_bad_peer_keys_are_rejected() {
    let params = small_params();
    let dh = DiffieHellman::with_config(small_config(), None);
    let (q, p) = (params.q(), params.p());

    for k in [BigUint::zero(), BigUint::one(), p - BigUint::one()] {
        assert!(matches!(
            dh.validate_public_key(&PublicKey::from(k), q, p),
            Err(Error::InvalidPublicKey(PublicKeyFault::OutOfRange))
        ));
    }

    // -g has order 2q because q is odd
    let outside = (params.g() * (p - BigUint::one())) % p;
    assert!(matches!(
        dh.validate_public_key(&PublicKey::from(outside), q, p),
        Err(Error::InvalidPublicKey(PublicKeyFault::NotInSubgroup))
    ));
}

#[test]
fn test_session_key_encrypts_and_eavesdropper_fails() {
    let params = small_params();
    let mut alice = DiffieHellman::with_config(small_config(), Some(21));
    let mut bob = DiffieHellman::with_config(small_config(), Some(22));
    let mut eve = DiffieHellman::with_config(small_config(), Some(23));

    let a = keypair(&mut alice, &params);
    let b = keypair(&mut bob, &params);
    let e = keypair(&mut eve, &params);

    let za = alice
        .generate_session_key(b.public_key(), a.private_key(), params.p())
        .unwrap();
    let zb = bob
        .generate_session_key(a.public_key(), b.private_key(), params.p())
        .unwrap();
    // Eve saw both public keys but only holds her own private key
    let ze = eve
        .generate_session_key(a.public_key(), e.private_key(), params.p())
        .unwrap();
    assert_ne!(ze, za);

    let cipher = ChaChaStreamCipher::new();
    let ct = cipher.encrypt(&za, b"Encrypt me!").unwrap();
    assert_eq!(cipher.decrypt(&zb, &ct).unwrap(), b"Encrypt me!");
    assert_ne!(cipher.decrypt(&ze, &ct).unwrap(), b"Encrypt me!");
}

#[test]
fn test_exchange_over_the_wire() {
    let mut alice = DiffieHellman::with_config(small_config(), Some(31));
    let mut bob = DiffieHellman::with_config(small_config(), Some(32));

    let params = small_params();
    let on_the_wire = params.to_bytes().unwrap();

    let received = DomainParameters::from_bytes(&on_the_wire).unwrap();
    bob.validate_domain(&received).unwrap();

    let a = keypair(&mut alice, &params);
    let b = keypair(&mut bob, &received);

    let a_pub = PublicKey::from_bytes(&a.public_key().to_bytes().unwrap()).unwrap();
    let b_pub = PublicKey::from_bytes(&b.public_key().to_bytes().unwrap()).unwrap();
    bob.validate_public_key(&a_pub, received.q(), received.p())
        .unwrap();
    alice
        .validate_public_key(&b_pub, params.q(), params.p())
        .unwrap();

    assert_eq!(
        alice
            .generate_session_key(&b_pub, a.private_key(), params.p())
            .unwrap(),
        bob.generate_session_key(&a_pub, b.private_key(), received.p())
            .unwrap()
    );
}

#[test]
fn test_values_are_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DomainParameters>();
    assert_send_sync::<PublicKey>();
    assert_send_sync::<KeyPair>();
    assert_send_sync::<SessionKey>();

    let params = small_params();
    let (za, zb) = session_pair(40);
    std::thread::scope(|s| {
        for seed in 0..4 {
            let params = &params;
            s.spawn(move || {
                let dh = DiffieHellman::with_config(small_config(), Some(seed));
                dh.validate_domain(params).unwrap();
            });
        }
        s.spawn(|| assert_eq!(za, zb));
    });
}
