use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The check that rejected a `(q, p, g)` tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterFault {
    QNotPrime,
    PNotPrime,
    ModulusTooShort { bits: usize, min: usize },
    SubgroupOrderMismatch,
    GeneratorOutOfRange,
    GeneratorNotInSubgroup,
    GeneratorIsIdentity,
}

impl std::fmt::Display for ParameterFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterFault::QNotPrime => write!(f, "q is not prime"),
            ParameterFault::PNotPrime => write!(f, "p is not prime"),
            ParameterFault::ModulusTooShort { bits, min } => {
                write!(f, "p has {} bits, at least {} required", bits, min)
            }
            ParameterFault::SubgroupOrderMismatch => write!(f, "q does not divide p - 1"),
            ParameterFault::GeneratorOutOfRange => write!(f, "g is outside (1, p - 1)"),
            ParameterFault::GeneratorNotInSubgroup => write!(f, "g^q mod p != 1"),
            ParameterFault::GeneratorIsIdentity => write!(f, "g == 1"),
        }
    }
}

/// The check that rejected a peer public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicKeyFault {
    /// Outside `[2, p - 2]`.
    OutOfRange,
    /// `K^q mod p != 1`.
    NotInSubgroup,
}

impl std::fmt::Display for PublicKeyFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublicKeyFault::OutOfRange => write!(f, "public key is outside [2, p - 2]"),
            PublicKeyFault::NotInSubgroup => {
                write!(f, "public key is not in the order-q subgroup")
            }
        }
    }
}

/// Every failure the crate reports.
#[derive(Error, Debug)]
pub enum Error {
    /// Requested modulus length is outside the strength table.
    #[error("invalid parameter request for {requested}-bit modulus: {reason}")]
    InvalidParameterRequest {
        requested: usize,
        reason: &'static str,
    },

    /// A received `(q, p, g)` failed validation.
    #[error("invalid domain parameters: {0}")]
    InvalidDomainParameters(ParameterFault),

    /// A peer public key failed validation.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(PublicKeyFault),

    /// The caller passed inputs the operation is not defined for.
    #[error("precondition violated: {0}")]
    PreconditionViolation(&'static str),

    /// A bounded candidate search ran out of attempts.
    #[error("{search} search gave up after {attempts} candidates")]
    ResourceExhausted { search: &'static str, attempts: u64 },

    #[error("arithmetic error: {0}")]
    Arithmetic(&'static str),

    /// Bytes that do not follow the wire format.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),
}
