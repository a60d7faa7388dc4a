//! # warden-auth
//!
//! Password encoding and credential verification for warden.
//!
//! - **Digest algorithms** and exact base conversion (`algorithm`)
//! - **Password encoding** under a runtime-switchable policy (`encoder`)
//! - **Bootstrap credential** for first sign-in (`bootstrap`)
//! - **Identity storage** abstraction and an in-memory store (`repository`)
//! - **Authentication** and administrator provisioning (`verifier`)
//!
//! ## Design Principles
//!
//! Every stored secret records the algorithm and salt it was produced with,
//! so verification never depends on the current policy. All traits are
//! `Send + Sync` to enable safe concurrent access.

pub mod algorithm;
pub mod bootstrap;
pub mod encoder;
pub mod repository;
pub mod verifier;

// Re-exports for convenience
pub use algorithm::{convert_base, supported_algorithms, AlgorithmId};
pub use bootstrap::{DefaultAdmin, DefaultAdminCredential};
pub use encoder::{generate_salt, EncodedSecret, EncodingPolicy, PasswordEncoder};
pub use repository::{
    Group, Identity, IdentityRepository, InMemoryRepository, RecordId, ADMIN_GROUP_CODE,
    ADMIN_GROUP_TITLE, ADMIN_PERMISSION,
};
pub use verifier::{
    Authenticator, EncryptionReport, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME,
};
