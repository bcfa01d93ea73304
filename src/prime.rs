//! Primality testing, safe-prime generation and DH prime verification.
//!
//! All three share two pieces of state: the small-prime sieve table and the memo of
//! verification results. Both live in a [`PrimeContext`], which callers construct and
//! share explicitly (usually behind an `Arc`). [`PrimeContext::shared`] hands out a
//! lazily created process-wide instance for callers that don't care.

pub mod check;
pub mod generate;
pub mod primality;
pub mod sieve;

pub use check::{PrimeCheckCache, VerifyError};
pub use generate::{PrimeGenConfig, FALLBACK_PRIME_CHECKABLE, FALLBACK_PRIME_OTHER};
pub use primality::{fermat_test, miller_rabin};
pub use sieve::{SmallPrimes, SIEVE_LIMIT};

use once_cell::sync::Lazy;
use std::sync::Arc;

/// Default number of Miller-Rabin rounds. `num-bigint-dig` follows them with a Lucas test.
pub const MILLER_RABIN_ROUNDS: usize = 40;

static SHARED: Lazy<Arc<PrimeContext>> = Lazy::new(|| Arc::new(PrimeContext::new()));

/// Shared state for the prime pipeline: the sieve table and the verification memo.
///
/// `PrimeContext` is `Send + Sync`. The sieve is built at most once, on first use; the
/// memo is guarded by a mutex and never evicts.
#[derive(Debug)]
pub struct PrimeContext {
    small_primes: SmallPrimes,
    checks: PrimeCheckCache,
    rounds: usize,
}

impl PrimeContext {
    pub fn new() -> Self {
        Self::with_rounds(MILLER_RABIN_ROUNDS)
    }

    /// A context running `rounds` Miller-Rabin rounds per probabilistic test.
    pub fn with_rounds(rounds: usize) -> Self {
        PrimeContext {
            small_primes: SmallPrimes::new(),
            checks: PrimeCheckCache::default(),
            rounds,
        }
    }

    /// The process-wide context used by the convenience constructors.
    pub fn shared() -> Arc<PrimeContext> {
        Arc::clone(&SHARED)
    }

    pub fn small_primes(&self) -> &SmallPrimes {
        &self.small_primes
    }

    pub fn checks(&self) -> &PrimeCheckCache {
        &self.checks
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }
}

impl Default for PrimeContext {
    fn default() -> Self {
        Self::new()
    }
}
