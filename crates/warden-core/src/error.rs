//! Core error types for warden.
//!
//! [`WardenError`] covers every failure the password policy, the credential
//! verifier and their collaborators can report. None of them is fatal: the
//! caller can always re-prompt for credentials, pick another algorithm, or
//! fix its configuration and retry.

use thiserror::Error;

/// The primary error type for warden.
#[derive(Error, Debug)]
pub enum WardenError {
    // ── Password policy ──────────────────────────────────────────────

    /// The named algorithm is not in the supported set.
    #[error("Unsupported password algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A bulk re-encryption was requested while encryption is switched off.
    #[error("Password encryption is disabled")]
    EncryptionDisabled,

    // ── Access ───────────────────────────────────────────────────────

    /// The acting identity lacks the permission required for the operation.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    // ── Repository ───────────────────────────────────────────────────

    /// A record the operation depends on does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A storage integrity constraint was violated.
    #[error("Integrity error: {0}")]
    IntegrityError(String),

    /// The bootstrap administrator cannot be created because its login is
    /// already taken by an identity outside the administrators group.
    #[error("Bootstrap conflict: {0}")]
    BootstrapConflict(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl WardenError {
    /// Returns a short, stable identifier for this error kind.
    ///
    /// Used as a structured log field and as the CLI failure reason.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            Self::EncryptionDisabled => "encryption_disabled",
            Self::PermissionDenied(_) => "permission_denied",
            Self::NotFound(_) => "not_found",
            Self::IntegrityError(_) => "integrity_error",
            Self::BootstrapConflict(_) => "bootstrap_conflict",
            Self::ConfigurationError(_) => "configuration_error",
            Self::SerializationError(_) => "serialization_error",
            Self::IoError(_) => "io_error",
        }
    }
}

impl From<serde_json::Error> for WardenError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// A convenience type alias for `Result<T, WardenError>`.
pub type WardenResult<T> = Result<T, WardenError>;
