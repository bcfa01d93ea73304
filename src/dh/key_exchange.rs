//! Diffie-Hellman key exchange object.
//!
//! A [`DiffieHellman`] owns one prime/generator pair and the keys derived against it. It is
//! either *malleable* (built from caller-supplied material: keys may be overridden) or
//! locked (built from a well-known group: key setters are refused).
//!
//! Two quirks are kept for interoperability with Node's `crypto.DiffieHellman`:
//! - private keys are `prime_len` random bytes taken as-is, not reduced into `[1, p-1]`
//! - locked objects report a verification code of 8 without running the check

use crate::bignum::{byte_len, to_padded_bytes, Modulus};
use crate::dh::encoding::Encoding;
use crate::dh::groups::ModpGroup;
use crate::error::{Error, Result};
use crate::prime::{PrimeContext, VerifyError};
use log::debug;
use num_bigint_dig::BigUint;
use once_cell::unsync::OnceCell;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::fmt;
use std::sync::Arc;

/// Configuration for DH objects.
#[derive(Debug, Clone, Default)]
pub struct DhConfig {
    /// Optional RNG seed for reproducible keys and primes. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Cap on prime-generation candidates when the prime is given as a bit length.
    pub max_prime_attempts: Option<u64>,
}

/// Where an object is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    /// Parameters set, no public key yet.
    Ready,
    /// A public key exists.
    KeysGenerated,
}

/// One party's Diffie-Hellman state.
pub struct DiffieHellman {
    prime: BigUint,
    /// Byte length of the prime as supplied; the size of generated private keys.
    prime_len: usize,
    modulus: Modulus,
    generator: BigUint,
    generator_bytes: Vec<u8>,
    private_key: Option<BigUint>,
    public_key: Option<BigUint>,
    malleable: bool,
    prime_code: OnceCell<VerifyError>,
    primes: Arc<PrimeContext>,
    rng: ChaCha20Rng,
}

impl DiffieHellman {
    /// Builds an object over `prime` and `generator` (both big-endian) using the shared
    /// [`PrimeContext`] and an entropy-seeded RNG.
    pub fn new(prime: &[u8], generator: &[u8], malleable: bool) -> Result<Self> {
        Self::with_config(
            prime,
            generator,
            malleable,
            &DhConfig::default(),
            PrimeContext::shared(),
        )
    }

    /// Like [`DiffieHellman::new`] with an explicit configuration and prime context.
    ///
    /// Fails only if `prime` encodes zero.
    pub fn with_config(
        prime: &[u8],
        generator: &[u8],
        malleable: bool,
        config: &DhConfig,
        primes: Arc<PrimeContext>,
    ) -> Result<Self> {
        let prime_value = BigUint::from_bytes_be(prime);
        let modulus = Modulus::new(&prime_value)
            .map_err(|_| Error::invalid_input("Diffie-Hellman prime must be non-zero"))?;

        let prime_code = if malleable {
            OnceCell::new()
        } else {
            OnceCell::from(VerifyError::NOT_SUITABLE_GENERATOR)
        };

        let rng = match config.seed {
            Some(s) => ChaCha20Rng::seed_from_u64(s),
            None => ChaCha20Rng::from_entropy(),
        };

        Ok(DiffieHellman {
            prime: prime_value,
            prime_len: prime.len(),
            modulus,
            generator: BigUint::from_bytes_be(generator),
            generator_bytes: generator.to_vec(),
            private_key: None,
            public_key: None,
            malleable,
            prime_code,
            primes,
            rng,
        })
    }

    /// Locked object for a well-known group.
    pub fn from_group(group: ModpGroup) -> Result<Self> {
        Self::from_group_with(group, &DhConfig::default(), PrimeContext::shared())
    }

    pub fn from_group_with(
        group: ModpGroup,
        config: &DhConfig,
        primes: Arc<PrimeContext>,
    ) -> Result<Self> {
        Self::with_config(group.prime(), group.generator(), false, config, primes)
    }

    pub fn is_malleable(&self) -> bool {
        self.malleable
    }

    pub fn state(&self) -> KeyState {
        if self.public_key.is_some() {
            KeyState::KeysGenerated
        } else {
            KeyState::Ready
        }
    }

    /// Computes `g^priv mod p` and returns it big-endian.
    ///
    /// A private key is drawn (`prime_len` random bytes) only if none exists yet, so calling
    /// this again recomputes the same public key. Use
    /// [`set_private_key`](Self::set_private_key) to change keys.
    pub fn generate_keys(&mut self) -> Vec<u8> {
        let private_key = match self.private_key.take() {
            Some(key) => key,
            None => {
                let mut buf = vec![0u8; self.prime_len];
                self.rng.fill_bytes(&mut buf);
                BigUint::from_bytes_be(&buf)
            }
        };
        let public_key = self.modulus.pow(&self.generator, &private_key);
        let bytes = public_key.to_bytes_be();
        self.private_key = Some(private_key);
        self.public_key = Some(public_key);
        bytes
    }

    /// Shared secret `other^priv mod p`, big-endian and left-padded with zeros to the byte
    /// length of the prime.
    pub fn compute_secret(&self, other_public_key: &[u8]) -> Result<Vec<u8>> {
        let private_key = self.private_key.as_ref().ok_or(Error::MissingPrivateKey)?;
        let other = BigUint::from_bytes_be(other_public_key);
        let secret = self.modulus.pow(&other, private_key);
        Ok(to_padded_bytes(&secret, byte_len(&self.prime)))
    }

    /// [`compute_secret`](Self::compute_secret) with text input and output.
    pub fn compute_secret_encoded(
        &self,
        other_public_key: &str,
        input: Encoding,
        output: Encoding,
    ) -> Result<String> {
        let other = input.decode(other_public_key)?;
        Ok(output.encode(&self.compute_secret(&other)?))
    }

    /// Overrides the public key. Malleable objects only; the value is not range-checked.
    pub fn set_public_key(&mut self, key: &[u8]) -> Result<()> {
        self.ensure_malleable("setPublicKey")?;
        self.public_key = Some(BigUint::from_bytes_be(key));
        Ok(())
    }

    /// Overrides the private key. Malleable objects only; the value is not range-checked.
    pub fn set_private_key(&mut self, key: &[u8]) -> Result<()> {
        self.ensure_malleable("setPrivateKey")?;
        self.private_key = Some(BigUint::from_bytes_be(key));
        Ok(())
    }

    pub fn set_public_key_encoded(&mut self, key: &str, encoding: Encoding) -> Result<()> {
        self.ensure_malleable("setPublicKey")?;
        let bytes = encoding.decode(key)?;
        self.set_public_key(&bytes)
    }

    pub fn set_private_key_encoded(&mut self, key: &str, encoding: Encoding) -> Result<()> {
        self.ensure_malleable("setPrivateKey")?;
        let bytes = encoding.decode(key)?;
        self.set_private_key(&bytes)
    }

    /// Replaces the generator. Keys already derived are left alone. A malleable object
    /// forgets its cached verification code; a locked one keeps reporting 8.
    pub fn set_generator(&mut self, generator: &[u8]) {
        self.generator = BigUint::from_bytes_be(generator);
        self.generator_bytes = generator.to_vec();
        if self.malleable {
            self.prime_code = OnceCell::new();
        }
    }

    fn ensure_malleable(&self, operation: &'static str) -> Result<()> {
        if self.malleable {
            Ok(())
        } else {
            debug!("{} refused on a well-known group", operation);
            Err(Error::NotPermitted(
                "keys of a well-known group cannot be overridden",
            ))
        }
    }

    pub fn prime(&self) -> Vec<u8> {
        self.prime.to_bytes_be()
    }

    pub fn generator(&self) -> Vec<u8> {
        self.generator.to_bytes_be()
    }

    pub fn public_key(&self) -> Result<Vec<u8>> {
        self.public_key
            .as_ref()
            .map(BigUint::to_bytes_be)
            .ok_or(Error::MissingPublicKey)
    }

    pub fn private_key(&self) -> Result<Vec<u8>> {
        self.private_key
            .as_ref()
            .map(BigUint::to_bytes_be)
            .ok_or(Error::MissingPrivateKey)
    }

    pub fn prime_encoded(&self, encoding: Encoding) -> String {
        encoding.encode(&self.prime())
    }

    pub fn generator_encoded(&self, encoding: Encoding) -> String {
        encoding.encode(&self.generator())
    }

    pub fn public_key_encoded(&self, encoding: Encoding) -> Result<String> {
        Ok(encoding.encode(&self.public_key()?))
    }

    pub fn private_key_encoded(&self, encoding: Encoding) -> Result<String> {
        Ok(encoding.encode(&self.private_key()?))
    }

    /// Verification code of this object's prime/generator pair.
    ///
    /// Computed on first access through the [`PrimeContext`] memo and cached on the object.
    /// Locked objects were given 8 at construction and never run the check.
    pub fn verify_error(&self) -> VerifyError {
        *self
            .prime_code
            .get_or_init(|| self.primes.check_prime(&self.prime, &self.generator_bytes))
    }
}

impl fmt::Debug for DiffieHellman {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffieHellman")
            .field("prime_bits", &self.prime.bits())
            .field("generator", &self.generator)
            .field("malleable", &self.malleable)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
