//! Small-prime table and trial division.
//!
//! The table holds every prime below [`SIEVE_LIMIT`] and is produced by a sieve of
//! Eratosthenes over a packed bit vector. It is computed lazily on first use and never
//! changes afterwards.

use crate::bignum::{be_digits, rem_digits};
use bitvec::prelude::*;
use num_bigint_dig::BigUint;
use num_traits::ToPrimitive;
use once_cell::sync::OnceCell;

/// Exclusive upper bound of the small-prime table.
pub const SIEVE_LIMIT: usize = 0x100000;

/// Lazily built table of the primes below a fixed bound.
#[derive(Debug)]
pub struct SmallPrimes {
    limit: usize,
    primes: OnceCell<Vec<u32>>,
}

impl SmallPrimes {
    pub fn new() -> Self {
        Self::with_limit(SIEVE_LIMIT)
    }

    /// Table of primes below `limit` (clamped to fit `u32`).
    pub fn with_limit(limit: usize) -> Self {
        SmallPrimes {
            limit: limit.min(u32::MAX as usize),
            primes: OnceCell::new(),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The primes, ascending. The first call builds the table; concurrent first calls
    /// block until the single build finishes.
    pub fn primes(&self) -> &[u32] {
        self.primes.get_or_init(|| {
            let primes = primes_below(self.limit);
            log::debug!("built small-prime table: {} primes below {:#x}", primes.len(), self.limit);
            primes
        })
    }

    /// Trial division. Walks the table in ascending order; at the first prime `p` dividing
    /// `n` the answer is `n == p`. Passes when no table prime divides `n`.
    pub fn test(&self, n: &BigUint) -> bool {
        let digits = be_digits(n);
        let small = n.to_u32();
        for &p in self.primes() {
            if rem_digits(&digits, p) == 0 {
                return small == Some(p);
            }
        }
        true
    }
}

impl Default for SmallPrimes {
    fn default() -> Self {
        Self::new()
    }
}

fn primes_below(limit: usize) -> Vec<u32> {
    if limit < 3 {
        return Vec::new();
    }
    let mut composite = bitvec![usize, Lsb0; 0; limit];
    let mut primes = Vec::new();
    for i in 2..limit {
        if composite[i] {
            continue;
        }
        primes.push(i as u32);
        if i <= (limit - 1) / i {
            for j in (i * i..limit).step_by(i) {
                composite.set(j, true);
            }
        }
    }
    primes
}
