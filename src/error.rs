use thiserror::Error;

/// Errors produced by the Diffie-Hellman primitives.
#[derive(Debug, Error)]
pub enum Error {
    /// Input that cannot be turned into a usable value (zero modulus, bad length, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation refused by the object's policy, e.g. overriding keys of a well-known group
    #[error("Operation not permitted: {0}")]
    NotPermitted(&'static str),

    /// A secret was requested before any private key exists
    #[error("Invalid state: no private key has been set or generated")]
    MissingPrivateKey,

    /// A public key was requested before any public key exists
    #[error("Invalid state: no public key has been set or generated")]
    MissingPublicKey,

    /// Prime generation hit its configured attempt cap
    #[error("Prime generation did not converge: {attempts} candidates of {bits} bits rejected")]
    GenerationExhausted { bits: usize, attempts: u64 },

    /// Group name not present in the MODP table
    #[error("Unknown Diffie-Hellman group: {0}")]
    UnknownGroup(String),

    /// Text encoding name not recognised
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    #[error("Invalid hex input: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("Invalid base64 input: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl Error {
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }
}

/// Result type for all fallible operations in this crate
pub type Result<T> = std::result::Result<T, Error>;
