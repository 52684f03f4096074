//! Encoding for the values that cross the untrusted channel.
//!
//! Only domain parameters and public keys have an encoding. Private keys and
//! session keys deliberately do not.
//!
//! Format:
//!
//! ```text
//! integer    = len:u32 (big-endian) || magnitude[len] (big-endian, no leading zeros)
//! parameters = integer(q) || integer(p) || integer(g)
//! public key = integer(K)
//! ```
//!
//! Zero is encoded with `len = 0`. Decoding checks framing only; the result still has
//! to go through parameter or public key validation.

use num_bigint_dig::BigUint;
use num_traits::Zero;

use crate::dh::{DomainParameters, PublicKey};
use crate::error::{Error, Result};

/// Longest accepted magnitude: 2048 bytes, i.e. a 16384-bit integer.
pub const MAX_INTEGER_LEN: usize = 2048;

const LEN_PREFIX: usize = 4;

/// Append the length-prefixed big-endian encoding of `value` to `out`.
///
/// Integers longer than [`MAX_INTEGER_LEN`] bytes are refused, so anything this
/// writes [`decode_integer`] will read back.
pub fn encode_integer(value: &BigUint, out: &mut Vec<u8>) -> Result<()> {
    let magnitude = if value.is_zero() {
        Vec::new()
    } else {
        value.to_bytes_be()
    };
    if magnitude.len() > MAX_INTEGER_LEN {
        return Err(Error::MalformedEncoding(format!(
            "integer of {} bytes exceeds the {} byte limit",
            magnitude.len(),
            MAX_INTEGER_LEN
        )));
    }
    // fits: MAX_INTEGER_LEN is far below u32::MAX
    out.extend_from_slice(&(magnitude.len() as u32).to_be_bytes());
    out.extend_from_slice(&magnitude);
    Ok(())
}

/// Decode one integer from the front of `input`, returning it with the unread rest.
pub fn decode_integer(input: &[u8]) -> Result<(BigUint, &[u8])> {
    if input.len() < LEN_PREFIX {
        return Err(Error::MalformedEncoding(format!(
            "need {} length bytes, have {}",
            LEN_PREFIX,
            input.len()
        )));
    }
    let (prefix, rest) = input.split_at(LEN_PREFIX);
    let len = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;

    if len > MAX_INTEGER_LEN {
        return Err(Error::MalformedEncoding(format!(
            "integer of {} bytes exceeds the {} byte limit",
            len, MAX_INTEGER_LEN
        )));
    }
    if rest.len() < len {
        return Err(Error::MalformedEncoding(format!(
            "integer declares {} bytes, only {} remain",
            len,
            rest.len()
        )));
    }

    let (magnitude, rest) = rest.split_at(len);
    if magnitude.first() == Some(&0) {
        return Err(Error::MalformedEncoding(
            "integer has a leading zero byte".to_string(),
        ));
    }
    Ok((BigUint::from_bytes_be(magnitude), rest))
}

fn expect_end(rest: &[u8]) -> Result<()> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(Error::MalformedEncoding(format!(
            "{} trailing bytes",
            rest.len()
        )))
    }
}

impl DomainParameters {
    /// Encode `q || p || g`. Fails if any of them is over [`MAX_INTEGER_LEN`] bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        encode_integer(self.q(), &mut out)?;
        encode_integer(self.p(), &mut out)?;
        encode_integer(self.g(), &mut out)?;
        Ok(out)
    }

    /// Decode `q || p || g`. The result is unvalidated.
    pub fn from_bytes(input: &[u8]) -> Result<Self> {
        let (q, rest) = decode_integer(input)?;
        let (p, rest) = decode_integer(rest)?;
        let (g, rest) = decode_integer(rest)?;
        expect_end(rest)?;
        Ok(DomainParameters::from_parts(q, p, g))
    }
}

impl PublicKey {
    /// Encode `K`. Fails if it is over [`MAX_INTEGER_LEN`] bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        encode_integer(self.value(), &mut out)?;
        Ok(out)
    }

    /// Decode a peer public key. The result is unvalidated.
    pub fn from_bytes(input: &[u8]) -> Result<Self> {
        let (value, rest) = decode_integer(input)?;
        expect_end(rest)?;
        Ok(PublicKey::from(value))
    }
}
