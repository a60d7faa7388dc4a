//! Supported password digest algorithms.
//!
//! [`AlgorithmId`] is a closed set of identifiers. Each hashing variant maps
//! to a concrete digest implementation through a static lookup table; the
//! `None` variant marks clear-text (unencoded) secrets.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::Digest;
use warden_core::WardenError;

/// Identifies the algorithm a secret was encoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmId {
    /// No encoding: the stored value is the (truncated) clear text.
    None,
    /// MD5.
    Md5,
    /// SHA-1.
    Sha1,
    /// SHA-224.
    Sha224,
    /// SHA-256.
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
}

/// Computes the lowercase hex digest of its input.
type DigestFn = fn(&[u8]) -> String;

fn md5_hex(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

fn sha_hex<D: Digest>(data: &[u8]) -> String {
    hex::encode(D::digest(data))
}

/// Every hashing algorithm and its implementation. `md5` and `sha1` are
/// always present.
const DIGESTS: [(AlgorithmId, DigestFn); 6] = [
    (AlgorithmId::Md5, md5_hex as DigestFn),
    (AlgorithmId::Sha1, sha_hex::<sha1::Sha1> as DigestFn),
    (AlgorithmId::Sha224, sha_hex::<sha2::Sha224> as DigestFn),
    (AlgorithmId::Sha256, sha_hex::<sha2::Sha256> as DigestFn),
    (AlgorithmId::Sha384, sha_hex::<sha2::Sha384> as DigestFn),
    (AlgorithmId::Sha512, sha_hex::<sha2::Sha512> as DigestFn),
];

impl AlgorithmId {
    /// Returns the canonical lowercase name (e.g. `"sha1"`).
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Returns `true` for every variant except [`AlgorithmId::None`].
    pub const fn is_hashing(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Returns `true` if this algorithm has a digest implementation.
    pub fn is_supported(self) -> bool {
        self.digest_fn().is_some()
    }

    /// Computes the lowercase hex digest of `data`, or `None` for
    /// [`AlgorithmId::None`].
    pub fn digest_hex(self, data: &[u8]) -> Option<String> {
        self.digest_fn().map(|digest| digest(data))
    }

    fn digest_fn(self) -> Option<DigestFn> {
        DIGESTS
            .iter()
            .find(|(id, _)| *id == self)
            .map(|(_, digest)| *digest)
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmId {
    type Err = WardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "md5" => Ok(Self::Md5),
            "sha1" => Ok(Self::Sha1),
            "sha224" => Ok(Self::Sha224),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            other => Err(WardenError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Returns the set of digest algorithms available for encoding.
///
/// Never contains [`AlgorithmId::None`]; always contains `md5` and `sha1`.
pub fn supported_algorithms() -> BTreeSet<AlgorithmId> {
    DIGESTS.iter().map(|(id, _)| *id).collect()
}

/// Converts a number written in `from_radix` digits to `to_radix` digits.
///
/// Characters that are not valid digits in `from_radix` are skipped.
/// The conversion is exact for inputs of any length, and the output uses
/// lowercase letters with no leading zeros (`"0"` for an all-zero input).
///
/// # Panics
///
/// Panics if either radix is outside `2..=36`.
pub fn convert_base(input: &str, from_radix: u32, to_radix: u32) -> String {
    assert!((2..=36).contains(&from_radix), "from_radix out of range");
    assert!((2..=36).contains(&to_radix), "to_radix out of range");

    let mut digits: Vec<u32> = input
        .chars()
        .filter_map(|c| c.to_digit(from_radix))
        .collect();

    let mut start = digits.iter().position(|&d| d != 0).unwrap_or(digits.len());
    let mut out = Vec::with_capacity(digits.len());

    // Schoolbook long division: each pass divides the remaining number by
    // `to_radix` in place and yields one output digit.
    while start < digits.len() {
        let mut remainder = 0;
        for digit in &mut digits[start..] {
            let acc = remainder * from_radix + *digit;
            *digit = acc / to_radix;
            remainder = acc % to_radix;
        }
        out.push(remainder);
        while start < digits.len() && digits[start] == 0 {
            start += 1;
        }
    }

    if out.is_empty() {
        return "0".to_string();
    }
    out.iter()
        .rev()
        .filter_map(|&d| char::from_digit(d, to_radix))
        .collect()
}
