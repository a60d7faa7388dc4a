//! # warden
//!
//! Password encoding and credential verification.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient access.
//! You can depend on `warden` to get everything, or depend on individual
//! crates for finer-grained control.

/// Settings, logging, and error types.
pub use warden_core as core;

/// Password encoding, bootstrap credential, and authentication.
pub use warden_auth as auth;

/// Management commands (CLI).
#[cfg(feature = "cli")]
pub use warden_cli as cli;

/// Re-exports of third-party crates used in public APIs.
pub mod reexports {
    pub use async_trait;
    pub use serde;
    pub use serde_json;
    pub use tokio;
    pub use tracing;
}

/// The most commonly used types.
///
/// ```rust
/// use warden::prelude::*;
///
/// let encoder = PasswordEncoder::new();
/// let encoded = encoder.encode("hunter2", None, None).unwrap();
/// assert!(encoded.matches("hunter2"));
/// ```
pub mod prelude {
    pub use warden_auth::{
        AlgorithmId, Authenticator, EncodedSecret, EncodingPolicy, Identity,
        IdentityRepository, InMemoryRepository, PasswordEncoder,
    };
    pub use warden_core::{Settings, WardenError, WardenResult};
}
