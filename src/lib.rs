//! Diffie-Hellman key exchange over prime fields.
//!
//! - [`prime`]: probable-prime pipeline, safe-prime generation and DH parameter verification
//! - [`dh`]: the key-exchange object, MODP groups and text encodings
//! - [`bignum`]: Montgomery exponentiation and small-modulus helpers over `BigUint`

pub mod bignum;
pub mod dh;
pub mod error;
pub mod prime;

pub use dh::{
    create_diffie_hellman, create_diffie_hellman_encoded, diffie_hellman_group,
    get_diffie_hellman, DhConfig, DiffieHellman, Encoding, ModpGroup, PrimeSource,
};
pub use error::{Error, Result};
pub use prime::{PrimeContext, PrimeGenConfig, VerifyError};
