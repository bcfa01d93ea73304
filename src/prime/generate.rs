//! Safe-prime generation for malleable DH groups.
//!
//! Rejection sampling: draw a random odd candidate `p` of the requested size, nudge it onto
//! the residue class the generator needs, and keep it only when both `p` and `p >> 1` pass
//! the full primality pipeline. There is no iteration cap unless one is configured.

use super::PrimeContext;
use crate::bignum::rem_u32;
use crate::error::{Error, Result};
use log::{debug, trace};
use num_bigint_dig::BigUint;
use num_integer::Integer;
use num_traits::One;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Returned for requests below [`MIN_GENERATED_BITS`] when the generator is 2 or 5.
pub const FALLBACK_PRIME_CHECKABLE: u32 = 0x8c7b;

/// Returned for requests below [`MIN_GENERATED_BITS`] with any other generator.
pub const FALLBACK_PRIME_OTHER: u32 = 0x8c27;

/// Smallest size that is actually generated; smaller requests get a fixed fallback prime,
/// as OpenSSL does.
pub const MIN_GENERATED_BITS: usize = 16;

/// Configuration for safe-prime generation.
#[derive(Debug, Clone)]
pub struct PrimeGenConfig {
    /// Requested bit length of the prime.
    pub bits: usize,
    /// Generator the prime must be compatible with. 2 and 5 constrain the residue class.
    pub generator: BigUint,
    /// Optional RNG seed for reproducible runs. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Give up with [`Error::GenerationExhausted`] after this many candidates.
    pub max_attempts: Option<u64>,
}

impl PrimeGenConfig {
    /// `bits`-bit prime for generator 2, entropy-seeded, no attempt cap.
    pub fn new(bits: usize) -> Self {
        PrimeGenConfig {
            bits,
            generator: BigUint::from(2u32),
            seed: None,
            max_attempts: None,
        }
    }
}

/// How a generator constrains candidate primes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GeneratorClass {
    /// `p mod 24 == 11`
    Two,
    /// `p mod 10 == 3`
    Five,
    Other,
}

impl GeneratorClass {
    fn of(generator: &BigUint) -> Self {
        if *generator == BigUint::from(2u32) {
            GeneratorClass::Two
        } else if *generator == BigUint::from(5u32) {
            GeneratorClass::Five
        } else {
            GeneratorClass::Other
        }
    }
}

impl PrimeContext {
    /// Generates a safe prime of `config.bits` bits compatible with `config.generator`.
    ///
    /// Requests below 16 bits return [`FALLBACK_PRIME_CHECKABLE`] for generators 2 and 5
    /// and [`FALLBACK_PRIME_OTHER`] otherwise. Corrections applied to a candidate after it
    /// is drawn can carry it a few units past `bits` bits.
    pub fn find_prime(&self, config: &PrimeGenConfig) -> Result<BigUint> {
        let class = GeneratorClass::of(&config.generator);
        if config.bits < MIN_GENERATED_BITS {
            let fallback = match class {
                GeneratorClass::Two | GeneratorClass::Five => FALLBACK_PRIME_CHECKABLE,
                GeneratorClass::Other => FALLBACK_PRIME_OTHER,
            };
            debug!(
                "{} bits requested, returning fixed prime {:#x}",
                config.bits, fallback
            );
            return Ok(BigUint::from(fallback));
        }

        let mut rng = match config.seed {
            Some(s) => ChaCha20Rng::seed_from_u64(s),
            None => ChaCha20Rng::from_entropy(),
        };

        let one = BigUint::one();
        let two = BigUint::from(2u32);
        let four = BigUint::from(4u32);
        let mut buf = vec![0u8; config.bits.div_ceil(8)];
        let mut attempts: u64 = 0;

        loop {
            if let Some(max) = config.max_attempts {
                if attempts >= max {
                    return Err(Error::GenerationExhausted {
                        bits: config.bits,
                        attempts,
                    });
                }
            }
            attempts += 1;

            rng.fill_bytes(&mut buf);
            let mut num = BigUint::from_bytes_be(&buf);
            let excess = num.bits().saturating_sub(config.bits);
            num = num >> excess;

            if num.is_even() {
                num += &one;
            }
            if rem_u32(&num, 4) & 2 == 0 {
                num += &two;
            }
            // num == 3 mod 4 here, so stepping by 4 walks every class the loops look for.
            match class {
                GeneratorClass::Two => {
                    while rem_u32(&num, 24) != 11 {
                        num += &four;
                    }
                }
                GeneratorClass::Five => {
                    while rem_u32(&num, 10) != 3 {
                        num += &four;
                    }
                }
                GeneratorClass::Other => {}
            }

            let half = &num >> 1;
            if self.sieve_test(&half)
                && self.sieve_test(&num)
                && super::fermat_test(&half)
                && super::fermat_test(&num)
                && self.miller_rabin(&half)
                && self.miller_rabin(&num)
            {
                debug!(
                    "found {}-bit safe prime after {} candidates",
                    num.bits(),
                    attempts
                );
                return Ok(num);
            }
            trace!("candidate {} rejected", attempts);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(bits: usize, generator: u32, seed: u64) -> PrimeGenConfig {
        PrimeGenConfig {
            bits,
            generator: BigUint::from(generator),
            seed: Some(seed),
            max_attempts: None,
        }
    }

    #[test]
    fn test_small_requests_use_fallback() {
        let ctx = PrimeContext::new();
        for bits in [0, 1, 8, 15] {
            for g in [2u32, 5] {
                let p = ctx.find_prime(&config(bits, g, 1)).unwrap();
                assert_eq!(p, BigUint::from(0x8c7bu32));
            }
            for g in [3u32, 7, 11] {
                let p = ctx.find_prime(&config(bits, g, 1)).unwrap();
                assert_eq!(p, BigUint::from(0x8c27u32));
            }
        }
    }

    #[test]
    fn test_generator_two_shape() {
        let ctx = PrimeContext::new();
        for (bits, seed) in [(16, 1), (17, 2), (32, 3), (64, 4), (96, 5)] {
            let p = ctx.find_prime(&config(bits, 2, seed)).unwrap();
            assert_eq!(rem_u32(&p, 24), 11, "{} bits", bits);
            assert!(ctx.is_probable_prime(&p));
            assert!(ctx.miller_rabin(&(&p >> 1)));
        }
    }

    #[test]
    fn test_generator_five_shape() {
        let ctx = PrimeContext::new();
        for (bits, seed) in [(16, 11), (21, 12), (64, 13), (80, 14)] {
            let p = ctx.find_prime(&config(bits, 5, seed)).unwrap();
            let r = rem_u32(&p, 10);
            assert!(r == 3 || r == 7, "{} bits: p mod 10 = {}", bits, r);
            assert!(ctx.is_probable_prime(&p));
            assert!(ctx.miller_rabin(&(&p >> 1)));
        }
    }

    #[test]
    fn test_other_generator_still_safe() {
        let ctx = PrimeContext::new();
        let p = ctx.find_prime(&config(48, 7, 21)).unwrap();
        assert_eq!(rem_u32(&p, 4), 3);
        assert!(ctx.is_probable_prime(&p));
        assert!(ctx.is_probable_prime(&(&p >> 1)));
    }

    #[test]
    fn test_bit_length_bounded_by_request() {
        let ctx = PrimeContext::new();
        for bits in [20, 33, 64, 128] {
            let p = ctx.find_prime(&config(bits, 2, bits as u64)).unwrap();
            // Drawn at <= bits; the +1/+2/+4 corrections can only spill one bit over.
            assert!(p.bits() <= bits + 1, "{} bits requested, got {}", bits, p.bits());
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let ctx = PrimeContext::new();
        let a = ctx.find_prime(&config(64, 2, 99)).unwrap();
        let b = ctx.find_prime(&config(64, 2, 99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_attempt_cap() {
        let ctx = PrimeContext::new();
        let mut cfg = config(512, 2, 5);
        cfg.max_attempts = Some(0);
        match ctx.find_prime(&cfg) {
            Err(Error::GenerationExhausted { bits, attempts }) => {
                assert_eq!(bits, 512);
                assert_eq!(attempts, 0);
            }
            other => panic!("expected GenerationExhausted, got {:?}", other),
        }
    }
}
