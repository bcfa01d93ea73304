//! Text encodings for keys, primes and generators at the API boundary.

use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;
use std::str::FromStr;

/// How a byte string is rendered as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// One char per byte (latin1), the way Node's "binary" encoding works.
    #[default]
    Binary,
    /// Lowercase hex.
    Hex,
    /// Standard padded base64.
    Base64,
}

impl Encoding {
    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Binary => bytes.iter().map(|&b| char::from(b)).collect(),
            Encoding::Hex => hex::encode(bytes),
            Encoding::Base64 => STANDARD.encode(bytes),
        }
    }

    /// Decodes `text`. In `Binary`, chars above U+00FF keep only their low byte.
    pub fn decode(self, text: &str) -> Result<Vec<u8>> {
        match self {
            Encoding::Binary => Ok(text.chars().map(|c| (u32::from(c) & 0xff) as u8).collect()),
            Encoding::Hex => Ok(hex::decode(text)?),
            Encoding::Base64 => Ok(STANDARD.decode(text)?),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Encoding::Binary => "binary",
            Encoding::Hex => "hex",
            Encoding::Base64 => "base64",
        }
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "binary" | "latin1" => Ok(Encoding::Binary),
            "hex" => Ok(Encoding::Hex),
            "base64" => Ok(Encoding::Base64),
            other => Err(Error::UnknownEncoding(other.to_string())),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
