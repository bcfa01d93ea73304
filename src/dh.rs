//! Diffie-Hellman over multiplicative groups modulo a prime.
//!
//! Objects come from one of three places:
//! - caller-supplied prime and generator bytes ([`create_diffie_hellman`] with
//!   [`PrimeSource::Bytes`])
//! - a freshly generated safe prime of a given size ([`PrimeSource::Bits`])
//! - a well-known MODP group by name ([`get_diffie_hellman`])
//!
//! The first two are malleable; group objects are locked.

pub mod encoding;
pub mod groups;
pub mod key_exchange;

#[cfg(test)]
mod tests;

pub use encoding::Encoding;
pub use groups::ModpGroup;
pub use key_exchange::{DhConfig, DiffieHellman, KeyState};

use crate::error::Result;
use crate::prime::{PrimeContext, PrimeGenConfig};
use log::debug;
use num_bigint_dig::BigUint;
use std::sync::Arc;

/// Generator used when none is given.
pub const DEFAULT_GENERATOR: [u8; 1] = [0x02];

/// The prime of a new object: given outright, or generated at a bit length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimeSource {
    /// Big-endian prime bytes, used as-is.
    Bytes(Vec<u8>),
    /// Generate a safe prime of this many bits.
    Bits(usize),
}

impl From<&[u8]> for PrimeSource {
    fn from(bytes: &[u8]) -> Self {
        PrimeSource::Bytes(bytes.to_vec())
    }
}

impl From<Vec<u8>> for PrimeSource {
    fn from(bytes: Vec<u8>) -> Self {
        PrimeSource::Bytes(bytes)
    }
}

impl From<usize> for PrimeSource {
    fn from(bits: usize) -> Self {
        PrimeSource::Bits(bits)
    }
}

/// Builds a malleable object from a prime (bytes or a bit length) and an optional
/// generator, which defaults to 2.
pub fn create_diffie_hellman(
    prime: impl Into<PrimeSource>,
    generator: Option<&[u8]>,
) -> Result<DiffieHellman> {
    create_diffie_hellman_with(
        prime,
        generator,
        &DhConfig::default(),
        PrimeContext::shared(),
    )
}

/// [`create_diffie_hellman`] with an explicit configuration and prime context.
pub fn create_diffie_hellman_with(
    prime: impl Into<PrimeSource>,
    generator: Option<&[u8]>,
    config: &DhConfig,
    primes: Arc<PrimeContext>,
) -> Result<DiffieHellman> {
    let generator = generator.unwrap_or(&DEFAULT_GENERATOR[..]);
    let prime = match prime.into() {
        PrimeSource::Bytes(bytes) => bytes,
        PrimeSource::Bits(bits) => {
            let gen_config = PrimeGenConfig {
                bits,
                generator: BigUint::from_bytes_be(generator),
                seed: config.seed,
                max_attempts: config.max_prime_attempts,
            };
            let p = primes.find_prime(&gen_config)?;
            debug!("generated {}-bit prime for a {}-bit request", p.bits(), bits);
            p.to_bytes_be()
        }
    };
    DiffieHellman::with_config(&prime, generator, true, config, primes)
}

/// Builds a malleable object from text-encoded prime and generator.
pub fn create_diffie_hellman_encoded(
    prime: &str,
    prime_encoding: Encoding,
    generator: Option<(&str, Encoding)>,
) -> Result<DiffieHellman> {
    let prime = prime_encoding.decode(prime)?;
    match generator {
        Some((text, encoding)) => {
            let generator = encoding.decode(text)?;
            create_diffie_hellman(prime, Some(generator.as_slice()))
        }
        None => create_diffie_hellman(prime, None),
    }
}

/// Locked object for the MODP group called `name` (`"modp1"`, `"modp14"`, ...).
pub fn get_diffie_hellman(name: &str) -> Result<DiffieHellman> {
    get_diffie_hellman_with(name, &DhConfig::default(), PrimeContext::shared())
}

/// Alias of [`get_diffie_hellman`].
pub fn diffie_hellman_group(name: &str) -> Result<DiffieHellman> {
    get_diffie_hellman(name)
}

pub fn get_diffie_hellman_with(
    name: &str,
    config: &DhConfig,
    primes: Arc<PrimeContext>,
) -> Result<DiffieHellman> {
    let group: ModpGroup = name.parse()?;
    DiffieHellman::from_group_with(group, config, primes)
}
