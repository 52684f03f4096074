//! Modulus / subgroup size pairing.
//!
//! The default table follows NIST SP 800-57 Part 1 (Table 2) for the modulus sizes,
//! with the subgroup order never smaller than 256 bits.

use crate::error::{Error, Result};

/// One row of a [`StrengthTable`]: moduli of at least `min_p_bits` bits use a
/// subgroup order of `q_bits` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrengthEntry {
    pub min_p_bits: usize,
    pub q_bits: usize,
}

/// Supported modulus sizes and the subgroup size each one gets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrengthTable {
    floor_bits: usize,
    max_bits: usize,
    entries: Vec<StrengthEntry>,
}

impl Default for StrengthTable {
    fn default() -> Self {
        StrengthTable {
            floor_bits: 2048,
            max_bits: 16384,
            entries: vec![
                StrengthEntry {
                    min_p_bits: 2048,
                    q_bits: 256,
                },
                StrengthEntry {
                    min_p_bits: 3072,
                    q_bits: 256,
                },
                StrengthEntry {
                    min_p_bits: 7680,
                    q_bits: 384,
                },
                StrengthEntry {
                    min_p_bits: 15360,
                    q_bits: 512,
                },
            ],
        }
    }
}

impl StrengthTable {
    /// Build a custom table. `entries` must be sorted by `min_p_bits`, the first
    /// entry must cover `floor_bits`, and every subgroup must be strictly smaller
    /// than the moduli it is paired with.
    pub fn new(floor_bits: usize, max_bits: usize, entries: Vec<StrengthEntry>) -> Result<Self> {
        let reject = |reason| {
            Err(Error::InvalidParameterRequest {
                requested: floor_bits,
                reason,
            })
        };

        let first = match entries.first() {
            Some(e) => e,
            None => return reject("strength table has no entries"),
        };
        if first.min_p_bits > floor_bits {
            return reject("first strength entry starts above the floor");
        }
        if max_bits < floor_bits {
            return reject("strength table ceiling is below its floor");
        }
        if entries.windows(2).any(|w| w[0].min_p_bits >= w[1].min_p_bits) {
            return reject("strength entries are not sorted by modulus size");
        }
        // q needs at least two bits, and p = c*q + 1 with even c needs p > 2q
        if entries
            .iter()
            .any(|e| e.q_bits < 2 || e.q_bits + 1 >= e.min_p_bits.max(floor_bits))
        {
            return reject("subgroup order is not smaller than the modulus");
        }

        Ok(StrengthTable {
            floor_bits,
            max_bits,
            entries,
        })
    }

    /// Smallest modulus length accepted for generation and validation.
    pub fn floor_bits(&self) -> usize {
        self.floor_bits
    }

    /// Largest modulus length accepted for generation.
    pub fn max_bits(&self) -> usize {
        self.max_bits
    }

    /// Entries sorted by `min_p_bits`.
    pub fn entries(&self) -> &[StrengthEntry] {
        &self.entries
    }

    /// Subgroup bit length for a modulus of `p_bits` bits.
    pub fn subgroup_bits(&self, p_bits: usize) -> Result<usize> {
        if p_bits < self.floor_bits {
            return Err(Error::InvalidParameterRequest {
                requested: p_bits,
                reason: "below the minimum supported modulus length",
            });
        }
        if p_bits > self.max_bits {
            return Err(Error::InvalidParameterRequest {
                requested: p_bits,
                reason: "above the maximum supported modulus length",
            });
        }
        self.entries
            .iter()
            .rev()
            .find(|e| e.min_p_bits <= p_bits)
            .map(|e| e.q_bits)
            .ok_or(Error::InvalidParameterRequest {
                requested: p_bits,
                reason: "no strength entry covers this modulus length",
            })
    }
}
