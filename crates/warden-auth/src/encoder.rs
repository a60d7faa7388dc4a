//! Password encoding policy.
//!
//! [`PasswordEncoder`] turns a clear-text secret into a storable
//! [`EncodedSecret`] according to the current [`EncodingPolicy`]. Every
//! encoded secret records the algorithm and salt it was produced with, so
//! the policy can change over time without invalidating stored
//! credentials: verification always re-derives with the *stored* algorithm
//! and salt (see [`EncodedSecret::matches`]).
//!
//! # Encoding rules
//!
//! 1. A secret that is empty after trimming yields an empty record
//!    (`value` and `salt` are `None`, algorithm `none`). This is not an error.
//! 2. When encoding is disabled, or the caller asks for algorithm `none`,
//!    the value is the clear text truncated to 64 characters.
//! 3. An explicitly requested algorithm must be supported, otherwise
//!    [`WardenError::UnsupportedAlgorithm`] is returned.
//! 4. A non-blank caller salt is used verbatim; otherwise a fresh salt is
//!    generated when the policy asks for one.
//! 5. The value is `base36(hex(digest(secret + salt)))` truncated to 64
//!    characters.

use std::collections::BTreeSet;
use std::sync::RwLock;

use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use warden_core::{PasswordSettings, WardenError, WardenResult};

use crate::algorithm::{self, convert_base, AlgorithmId};

/// Maximum length of a stored value (encoded or clear text).
pub const MAX_VALUE_LENGTH: usize = 64;

/// Maximum length of a generated salt.
pub const SALT_LENGTH: usize = 50;

/// The stored, non-reversible representation of a password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedSecret {
    /// The encoded value, the truncated clear text for algorithm `none`,
    /// or `None` when no password was provided.
    pub value: Option<String>,
    /// The salt mixed into the digest, if any.
    pub salt: Option<String>,
    /// The algorithm used to produce `value`.
    pub algorithm: AlgorithmId,
}

impl EncodedSecret {
    /// The record produced for a blank password.
    pub const fn empty() -> Self {
        Self {
            value: None,
            salt: None,
            algorithm: AlgorithmId::None,
        }
    }

    /// A clear-text record holding at most [`MAX_VALUE_LENGTH`] characters.
    pub fn cleartext(secret: &str) -> Self {
        Self {
            value: Some(truncate(secret, MAX_VALUE_LENGTH)),
            salt: None,
            algorithm: AlgorithmId::None,
        }
    }

    /// Returns `true` if this record stores a clear-text password.
    pub const fn is_cleartext(&self) -> bool {
        self.value.is_some() && !self.algorithm.is_hashing()
    }

    /// Checks a clear-text candidate against this record.
    ///
    /// Re-derives with the stored algorithm and salt, independent of any
    /// current policy, and compares in constant time. A record without a
    /// value never matches.
    pub fn matches(&self, candidate: &str) -> bool {
        let Some(expected) = self.value.as_deref() else {
            return false;
        };
        let derived = if self.algorithm.is_hashing() {
            match hash_secret(self.algorithm, candidate, self.salt.as_deref()) {
                Some(derived) => derived,
                None => return false,
            }
        } else {
            truncate(candidate, MAX_VALUE_LENGTH)
        };
        constant_time_eq(derived.as_bytes(), expected.as_bytes())
    }
}

/// The active configuration governing how new secrets are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingPolicy {
    /// Whether new secrets are encoded at all.
    pub enabled: bool,
    /// The digest algorithm for new secrets.
    pub algorithm: AlgorithmId,
    /// Whether a random salt is generated for new secrets.
    pub use_salt: bool,
}

impl Default for EncodingPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            algorithm: AlgorithmId::Sha1,
            use_salt: true,
        }
    }
}

/// Encodes secrets according to a shared, runtime-adjustable policy.
///
/// The policy is guarded by a lock; every encode call works from a single
/// snapshot, so a concurrent [`set_policy`](Self::set_policy) is observed
/// either entirely or not at all.
#[derive(Debug, Default)]
pub struct PasswordEncoder {
    policy: RwLock<EncodingPolicy>,
}

impl PasswordEncoder {
    /// Creates an encoder with the default policy (`sha1`, salted, enabled).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an encoder with the given policy.
    ///
    /// Fails if the policy's algorithm is not a supported digest.
    pub fn with_policy(policy: EncodingPolicy) -> WardenResult<Self> {
        if !policy.algorithm.is_supported() {
            return Err(WardenError::UnsupportedAlgorithm(policy.algorithm.to_string()));
        }
        Ok(Self {
            policy: RwLock::new(policy),
        })
    }

    /// Creates an encoder from startup settings.
    pub fn from_settings(settings: &PasswordSettings) -> WardenResult<Self> {
        let algorithm: AlgorithmId = settings.algorithm.trim().parse()?;
        Self::with_policy(EncodingPolicy {
            enabled: settings.encrypt_passwords,
            algorithm,
            use_salt: settings.use_salt,
        })
    }

    /// Returns the set of algorithms accepted by [`set_policy`](Self::set_policy)
    /// and by explicit encode requests.
    pub fn supported_algorithms() -> BTreeSet<AlgorithmId> {
        algorithm::supported_algorithms()
    }

    /// Returns a snapshot of the current policy.
    pub fn policy(&self) -> EncodingPolicy {
        *self.policy.read().expect("password policy lock poisoned")
    }

    /// Changes the algorithm and salt usage for new secrets.
    ///
    /// Returns `false` and leaves the policy untouched when `algorithm` is
    /// not a supported digest. The `enabled` flag is not affected.
    pub fn set_policy(&self, algorithm: &str, use_salt: bool) -> bool {
        let parsed = algorithm
            .parse::<AlgorithmId>()
            .ok()
            .filter(|id| id.is_supported());
        let Some(algorithm_id) = parsed else {
            tracing::warn!(algorithm, "rejected unsupported password algorithm");
            return false;
        };

        let mut policy = self.policy.write().expect("password policy lock poisoned");
        policy.algorithm = algorithm_id;
        policy.use_salt = use_salt;
        tracing::info!(algorithm = %algorithm_id, use_salt, "password encoding policy changed");
        true
    }

    /// Encodes `secret`.
    ///
    /// `salt` re-uses a previously stored salt; `algorithm` overrides the
    /// policy algorithm (pass `"none"` to store clear text). See the module
    /// documentation for the full rules.
    pub fn encode(
        &self,
        secret: &str,
        salt: Option<&str>,
        algorithm: Option<&str>,
    ) -> WardenResult<EncodedSecret> {
        if secret.trim().is_empty() {
            return Ok(EncodedSecret::empty());
        }

        let policy = self.policy();
        let requested = algorithm.filter(|name| !name.trim().is_empty());

        if !policy.enabled || requested == Some("none") {
            return Ok(EncodedSecret::cleartext(secret));
        }

        let algorithm_id = match requested {
            Some(name) => {
                let id: AlgorithmId = name.parse()?;
                if !id.is_supported() {
                    return Err(WardenError::UnsupportedAlgorithm(name.to_string()));
                }
                id
            }
            None => policy.algorithm,
        };

        let salt = match salt.filter(|s| !s.trim().is_empty()) {
            Some(given) => Some(given.to_string()),
            None if policy.use_salt => Some(generate_salt()),
            None => None,
        };

        let value = hash_secret(algorithm_id, secret, salt.as_deref());
        tracing::debug!(algorithm = %algorithm_id, salted = salt.is_some(), "encoded secret");

        Ok(EncodedSecret {
            value,
            salt,
            algorithm: algorithm_id,
        })
    }

    /// Returns `true` if `stored` was produced under a different policy than
    /// the current one and should be re-encoded on the next opportunity.
    ///
    /// Always `false` while encoding is disabled or when nothing is stored.
    pub fn needs_rehash(&self, stored: &EncodedSecret) -> bool {
        let policy = self.policy();
        if !policy.enabled || stored.value.is_none() {
            return false;
        }
        stored.algorithm != policy.algorithm || stored.salt.is_some() != policy.use_salt
    }
}

/// Generates a fresh salt from the operating system's CSPRNG.
///
/// A random token and the current Unix timestamp are concatenated and
/// re-encoded in base 36, truncated to [`SALT_LENGTH`] characters.
pub fn generate_salt() -> String {
    let mut token = [0u8; 20];
    OsRng.fill_bytes(&mut token);
    let raw = format!("{}{}", hex::encode(token), Utc::now().timestamp());
    truncate(&convert_base(&raw, 16, 36), SALT_LENGTH)
}

/// Digests `secret + salt` and re-encodes the hex digest in base 36.
///
/// Returns `None` for [`AlgorithmId::None`].
fn hash_secret(algorithm: AlgorithmId, secret: &str, salt: Option<&str>) -> Option<String> {
    let mut input = String::with_capacity(secret.len() + salt.map_or(0, str::len));
    input.push_str(secret);
    input.push_str(salt.unwrap_or_default());

    let hex_digest = algorithm.digest_hex(input.as_bytes())?;
    Some(truncate(&convert_base(&hex_digest, 16, 36), MAX_VALUE_LENGTH))
}

fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

/// Constant-time byte comparison to prevent timing attacks.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
