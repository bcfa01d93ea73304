//! Montgomery reduction over `BigUint`.
//!
//! For an odd modulus `n` and `R = 2^k` (k a multiple of 64 with `R > n`), a value `a` is
//! represented in the Montgomery domain as `a * R mod n`. Multiplying two such values and
//! applying REDC, `REDC(T) = (T + ((T mod R) * n' mod R) * n) / R`, keeps the product in the
//! domain without ever dividing by `n`; every division is a shift and a mask.

use crate::error::{Error, Result};
use num_bigint_dig::BigUint;
use num_integer::Integer;
use num_traits::One;

const WORD_BITS: usize = 64;

/// Montgomery context for a fixed odd modulus.
#[derive(Debug, Clone)]
pub struct MontgomeryContext {
    modulus: BigUint,
    /// log2(R)
    shift: usize,
    /// R - 1
    mask: BigUint,
    /// -n^-1 mod R
    n_prime: BigUint,
    /// R^2 mod n, used to enter the domain
    r2: BigUint,
    /// R mod n, i.e. 1 in the domain
    one: BigUint,
}

impl MontgomeryContext {
    /// Builds the context for `modulus`, which must be odd.
    pub fn new(modulus: &BigUint) -> Result<Self> {
        if modulus.is_even() {
            return Err(Error::invalid_input(
                "Montgomery reduction requires an odd modulus",
            ));
        }

        let shift = modulus.bits().div_ceil(WORD_BITS).max(1) * WORD_BITS;
        let r = BigUint::one() << shift;
        let mask = &r - &BigUint::one();
        let two = BigUint::from(2u32);

        // Newton iteration for n^-1 mod R: every step doubles the number of correct low
        // bits, starting from inv = 1 which is correct mod 2 for odd n.
        let mut inv = BigUint::one();
        let mut precision = 1;
        while precision < shift {
            let t = (modulus * &inv) & &mask;
            let correction = (&r + &two - t) & &mask;
            inv = (&inv * &correction) & &mask;
            precision *= 2;
        }
        let n_prime = (&r - &inv) & &mask;

        let r2 = (&r * &r) % modulus;
        let one = &r % modulus;

        Ok(MontgomeryContext {
            modulus: modulus.clone(),
            shift,
            mask,
            n_prime,
            r2,
            one,
        })
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// REDC. Requires `t < n * R`, which holds for any product of two domain values.
    fn reduce(&self, t: &BigUint) -> BigUint {
        let m = ((t & &self.mask) * &self.n_prime) & &self.mask;
        let u = (m * &self.modulus + t) >> self.shift;
        if u >= self.modulus {
            u - &self.modulus
        } else {
            u
        }
    }

    /// Enters the domain: `x * R mod n`. `x` need not be reduced.
    pub fn to_montgomery(&self, x: &BigUint) -> BigUint {
        let reduced = x % &self.modulus;
        self.reduce(&(reduced * &self.r2))
    }

    /// Leaves the domain: `x * R^-1 mod n`.
    pub fn from_montgomery(&self, x: &BigUint) -> BigUint {
        self.reduce(x)
    }

    /// Product of two domain values, in the domain.
    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        self.reduce(&(a * b))
    }

    /// `base^exponent` for a domain `base`, result in the domain.
    ///
    /// Left-to-right square-and-multiply over the exponent's bits.
    pub fn pow(&self, base: &BigUint, exponent: &BigUint) -> BigUint {
        let mut acc = self.one.clone();
        let mut started = false;
        for byte in exponent.to_bytes_be() {
            for i in (0..8).rev() {
                let bit = (byte >> i) & 1 == 1;
                if started {
                    acc = self.mul(&acc, &acc);
                }
                if bit {
                    acc = self.mul(&acc, base);
                    started = true;
                }
            }
        }
        acc
    }
}
