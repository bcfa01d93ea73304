//! Verification of a (prime, generator) pair, reported as a bitmask of OpenSSL-style
//! `DH_check` codes. Results are memoised per pair for the life of the [`PrimeContext`].

use super::PrimeContext;
use crate::bignum::rem_u32;
use log::{debug, trace};
use num_bigint_dig::BigUint;
use std::collections::HashMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::sync::{Mutex, PoisonError};

/// Bitmask describing what is wrong with a DH prime/generator pair. Zero means nothing
/// was detected; a non-zero value is a warning, never an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VerifyError(u8);

impl VerifyError {
    pub const NONE: VerifyError = VerifyError(0);
    /// The prime failed the primality pipeline.
    pub const P_NOT_PRIME: VerifyError = VerifyError(1);
    /// `(p - 1) / 2` is not prime.
    pub const P_NOT_SAFE_PRIME: VerifyError = VerifyError(2);
    /// The generator is not one whose suitability can be checked (only 2 and 5 are).
    pub const UNABLE_TO_CHECK_GENERATOR: VerifyError = VerifyError(4);
    /// The prime is not in the residue class the generator requires.
    pub const NOT_SUITABLE_GENERATOR: VerifyError = VerifyError(8);

    pub const fn from_bits(bits: u8) -> Self {
        VerifyError(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: VerifyError) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for VerifyError {
    type Output = VerifyError;

    fn bitor(self, rhs: VerifyError) -> VerifyError {
        VerifyError(self.0 | rhs.0)
    }
}

impl BitOrAssign for VerifyError {
    fn bitor_assign(&mut self, rhs: VerifyError) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of a memoised verification: (hex of the generator bytes, hex of the prime).
pub type CheckKey = (String, String);

/// Memo of verification results. Grows without bound; entries are never removed.
#[derive(Debug, Default)]
pub struct PrimeCheckCache {
    entries: Mutex<HashMap<CheckKey, VerifyError>>,
}

impl PrimeCheckCache {
    pub fn get(&self, key: &CheckKey) -> Option<VerifyError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
    }

    pub fn insert(&self, key: CheckKey, code: VerifyError) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, code);
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PrimeContext {
    /// Classifies `prime` with the generator given as raw bytes.
    ///
    /// Only the exact byte strings `[0x02]` and `[0x05]` count as checkable generators.
    /// The result is memoised, so repeated queries for the same pair (from one object or
    /// many) agree and cost one lookup.
    pub fn check_prime(&self, prime: &BigUint, generator: &[u8]) -> VerifyError {
        let key = (hex::encode(generator), prime.to_str_radix(16));
        if let Some(code) = self.checks().get(&key) {
            trace!("prime check cache hit for generator {}: {}", key.0, code);
            return code;
        }

        let code = self.classify(prime, generator);
        debug!(
            "prime check for {}-bit prime, generator {}: {}",
            prime.bits(),
            key.0,
            code
        );
        self.checks().insert(key, code);
        code
    }

    fn classify(&self, prime: &BigUint, generator: &[u8]) -> VerifyError {
        if !self.is_probable_prime(prime) {
            let generator_code = match generator {
                // Checkable, and bound to fail against a composite.
                [0x02] | [0x05] => VerifyError::NOT_SUITABLE_GENERATOR,
                _ => VerifyError::UNABLE_TO_CHECK_GENERATOR,
            };
            return VerifyError::P_NOT_PRIME | generator_code;
        }

        let mut code = VerifyError::NONE;
        if !self.miller_rabin(&(prime >> 1)) {
            code |= VerifyError::P_NOT_SAFE_PRIME;
        }

        match generator {
            [0x02] => {
                if rem_u32(prime, 24) != 11 {
                    code |= VerifyError::NOT_SUITABLE_GENERATOR;
                }
            }
            [0x05] => {
                let rem = rem_u32(prime, 10);
                if rem != 3 && rem != 7 {
                    code |= VerifyError::NOT_SUITABLE_GENERATOR;
                }
            }
            _ => code |= VerifyError::UNABLE_TO_CHECK_GENERATOR,
        }
        code
    }
}
