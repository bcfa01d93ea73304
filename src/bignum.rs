//! Big-integer glue on top of `num_bigint_dig::BigUint`.
//!
//! The arbitrary-precision arithmetic itself comes from `num-bigint-dig`. This module adds
//! the pieces the Diffie-Hellman core needs on top of it:
//! - a Montgomery ("redc") context for repeated exponentiation under a fixed odd modulus
//! - [`Modulus`], which picks Montgomery for odd moduli and plain `modpow` otherwise
//! - remainder helpers for small (`u32`) moduli, used by the sieve and the congruence checks
//! - fixed-width big-endian encoding

pub mod montgomery;

pub use montgomery::MontgomeryContext;

use crate::error::{Error, Result};
use num_bigint_dig::BigUint;
use num_integer::Integer;
use num_traits::Zero;

/// A modulus prepared for repeated exponentiation.
///
/// Odd moduli go through the Montgomery domain. Even moduli cannot, but a DH object may
/// still be built over one (its verification code then reports it as composite), so they
/// fall back to `BigUint::modpow`.
#[derive(Debug, Clone)]
pub enum Modulus {
    Montgomery(MontgomeryContext),
    Plain(BigUint),
}

impl Modulus {
    /// Prepares `modulus`. Fails for zero.
    pub fn new(modulus: &BigUint) -> Result<Self> {
        if modulus.is_zero() {
            return Err(Error::invalid_input("modulus must be non-zero"));
        }
        if modulus.is_odd() {
            Ok(Modulus::Montgomery(MontgomeryContext::new(modulus)?))
        } else {
            Ok(Modulus::Plain(modulus.clone()))
        }
    }

    /// The modulus as a plain integer.
    pub fn value(&self) -> &BigUint {
        match self {
            Modulus::Montgomery(ctx) => ctx.modulus(),
            Modulus::Plain(m) => m,
        }
    }

    /// `base^exponent mod m`. `base` may be any size; it is reduced first.
    pub fn pow(&self, base: &BigUint, exponent: &BigUint) -> BigUint {
        match self {
            Modulus::Montgomery(ctx) => {
                let base = ctx.to_montgomery(base);
                ctx.from_montgomery(&ctx.pow(&base, exponent))
            }
            Modulus::Plain(m) => base.modpow(exponent, m),
        }
    }
}

/// Splits `n` into big-endian base-2^32 digits, most significant first.
pub(crate) fn be_digits(n: &BigUint) -> Vec<u32> {
    let bytes = n.to_bytes_be();
    let pad = (4 - bytes.len() % 4) % 4;
    let mut padded = vec![0u8; pad];
    padded.extend_from_slice(&bytes);
    padded
        .chunks_exact(4)
        .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Remainder of the number given by `digits` (see [`be_digits`]) modulo a small `m`.
pub(crate) fn rem_digits(digits: &[u32], m: u32) -> u32 {
    let m = u64::from(m);
    // r < m <= 2^32, so r << 32 | d cannot overflow.
    let r = digits
        .iter()
        .fold(0u64, |r, &d| ((r << 32) | u64::from(d)) % m);
    r as u32
}

/// `n mod m` for a small non-zero modulus.
pub fn rem_u32(n: &BigUint, m: u32) -> u32 {
    rem_digits(&be_digits(n), m)
}

/// Big-endian bytes of `n`, left-padded with zeros to at least `len` bytes.
pub fn to_padded_bytes(n: &BigUint, len: usize) -> Vec<u8> {
    let bytes = n.to_bytes_be();
    if bytes.len() >= len {
        return bytes;
    }
    let mut out = vec![0u8; len - bytes.len()];
    out.extend_from_slice(&bytes);
    out
}

/// Number of bytes in the minimal big-endian encoding of `n` (at least one).
pub fn byte_len(n: &BigUint) -> usize {
    n.bits().div_ceil(8).max(1)
}
