//! The three-stage probable-prime predicate: trial division, a base-2 Fermat test in the
//! Montgomery domain, then Miller-Rabin.

use super::PrimeContext;
use crate::bignum::MontgomeryContext;
use num_bigint_dig::{prime::probably_prime, BigUint};
use num_integer::Integer;
use num_traits::One;

/// Base-2 Fermat test: `2^(n-1) mod n == 1`, computed in the Montgomery domain of `n`.
///
/// Cheap early rejection only; base-2 pseudoprimes such as 341 pass. Even `n` fail.
pub fn fermat_test(n: &BigUint) -> bool {
    let ctx = match MontgomeryContext::new(n) {
        Ok(ctx) => ctx,
        Err(_) => return false,
    };
    if n.is_one() {
        return false;
    }
    let two = ctx.to_montgomery(&BigUint::from(2u32));
    let exponent = n - &BigUint::one();
    ctx.from_montgomery(&ctx.pow(&two, &exponent)).is_one()
}

/// Miller-Rabin with `rounds` random bases (plus the Lucas test `num-bigint-dig` appends).
pub fn miller_rabin(n: &BigUint, rounds: usize) -> bool {
    probably_prime(n, rounds)
}

impl PrimeContext {
    /// Trial division against the small-prime table.
    pub fn sieve_test(&self, n: &BigUint) -> bool {
        self.small_primes().test(n)
    }

    /// Miller-Rabin with this context's round count.
    pub fn miller_rabin(&self, n: &BigUint) -> bool {
        miller_rabin(n, self.rounds())
    }

    /// Whether `n` is accepted as a prime DH modulus candidate.
    ///
    /// Even numbers (2 included) are rejected outright. Otherwise `n` must pass trial
    /// division, the Fermat test and Miller-Rabin, in that order.
    pub fn is_probable_prime(&self, n: &BigUint) -> bool {
        if n.is_even() {
            return false;
        }
        self.sieve_test(n) && fermat_test(n) && self.miller_rabin(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prime::SmallPrimes;

    fn context() -> PrimeContext {
        PrimeContext::with_rounds(20)
    }

    #[test]
    fn test_fermat_accepts_primes() {
        for p in [3u64, 5, 0x8c7b, 0x8c27, 2_147_483_647, 0xdb10_e7f6_1adc_c193] {
            assert!(fermat_test(&BigUint::from(p)), "{:#x}", p);
        }
    }

    #[test]
    fn test_fermat_rejects_composites_and_evens() {
        for c in [1u64, 9, 15, 1_000_001] {
            assert!(!fermat_test(&BigUint::from(c)), "{}", c);
        }
        for e in [0u64, 2, 4, 1 << 40] {
            assert!(!fermat_test(&BigUint::from(e)), "{}", e);
        }
    }

    #[test]
    fn test_fermat_pseudoprimes_slip_through() {
        // 341 = 11 * 31 and the Carmichael number 561 = 3 * 11 * 17 both satisfy
        // 2^(n-1) == 1 mod n.
        assert!(fermat_test(&BigUint::from(341u32)));
        assert!(fermat_test(&BigUint::from(561u32)));

        let ctx = context();
        assert!(!ctx.is_probable_prime(&BigUint::from(341u32)));
        assert!(!ctx.is_probable_prime(&BigUint::from(561u32)));
    }

    #[test]
    fn test_miller_rabin() {
        assert!(miller_rabin(&BigUint::from(0x8c7bu32), 20));
        // 0x8c7b >> 1 = 17981 is the Sophie Germain partner.
        assert!(miller_rabin(&BigUint::from(0x8c7bu32 >> 1), 20));
        assert!(!miller_rabin(&BigUint::from(561u32), 20));
        assert!(!miller_rabin(&BigUint::from(1_048_583u64 * 1_048_589u64), 20));
    }

    #[test]
    fn test_is_probable_prime_pipeline() {
        let ctx = context();
        assert!(ctx.is_probable_prime(&BigUint::from(3u32)));
        assert!(ctx.is_probable_prime(&BigUint::from(0xdb10_e7f6_1adc_c193u64)));
        assert!(!ctx.is_probable_prime(&BigUint::from(2u32)));
        assert!(!ctx.is_probable_prime(&BigUint::from(0xdb10_e7f6_1adc_c194u64)));
        assert!(!ctx.is_probable_prime(&BigUint::from(1u32)));

        // Survives the sieve, caught later.
        let semiprime = BigUint::from(1_048_583u64 * 1_048_589u64);
        assert!(ctx.sieve_test(&semiprime));
        assert!(!ctx.is_probable_prime(&semiprime));
    }

    #[test]
    fn test_small_primes_are_accepted() {
        let ctx = context();
        let table = SmallPrimes::with_limit(200);
        for &p in table.primes().iter().skip(1) {
            assert!(ctx.is_probable_prime(&BigUint::from(p)), "{}", p);
        }
    }
}
