//! # warden-core
//!
//! Core types shared by every warden crate: the error enum, the settings
//! model and its loaders, and tracing setup.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Password policy and bootstrap configuration
//! - [`settings_loader`] - TOML/JSON/environment loading
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{WardenError, WardenResult};
pub use settings::{DefaultAdminSettings, PasswordSettings, Settings, SETTINGS};
