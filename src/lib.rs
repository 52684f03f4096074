//! Finite-field Diffie-Hellman key agreement over a prime-order subgroup.
//!
//! - [`dh`]: domain parameter generation and validation, key pairs, session keys
//! - [`arith`]: the big-integer operations the protocol needs, behind one trait
//! - [`wire`]: byte encoding for the values that travel between parties
//! - [`cipher`]: symmetric encryption keyed by a negotiated session key

pub mod arith;
pub mod cipher;
pub mod dh;
pub mod error;
pub mod wire;

pub use arith::{Arithmetic, NumBigintArithmetic, RandomArithmetic};
pub use cipher::{ChaChaStreamCipher, SymmetricCipher};
pub use dh::{
    generate_keypair, generate_parameters, generate_session_key, validate_parameters,
    validate_public_key, DhConfig, DiffieHellman, DomainParameters, KeyPair, PrivateKey,
    PublicKey, SessionKey, StrengthEntry, StrengthTable,
};
pub use error::{Error, ParameterFault, PublicKeyFault, Result};
