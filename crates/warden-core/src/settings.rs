//! Settings for warden.
//!
//! [`Settings`] holds the startup configuration: the password encoding
//! policy, an optional bootstrap administrator, and logging preferences.
//! [`LazySettings`] is a globally-accessible, lazily-initialized instance
//! for embedders that prefer a process-wide configuration.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Password encoding configuration applied at process start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordSettings {
    /// Whether new passwords are stored encoded. When `false` they are kept
    /// as (truncated) clear text.
    pub encrypt_passwords: bool,
    /// The digest algorithm used for new passwords (e.g. "sha1", "sha256").
    pub algorithm: String,
    /// Whether a random salt is generated for each new password.
    pub use_salt: bool,
}

impl Default for PasswordSettings {
    fn default() -> Self {
        Self {
            encrypt_passwords: true,
            algorithm: "sha1".to_string(),
            use_salt: true,
        }
    }
}

/// A bootstrap administrator login that is never persisted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultAdminSettings {
    /// The login name accepted by the bootstrap path.
    pub username: String,
    /// The clear-text password accepted by the bootstrap path.
    pub password: String,
}

impl fmt::Debug for DefaultAdminSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultAdminSettings")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// The complete set of warden settings.
///
/// # Examples
///
/// ```
/// use warden_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert_eq!(settings.password.algorithm, "sha1");
/// assert!(settings.password.use_salt);
/// assert!(settings.default_admin.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,
    /// The log level filter (e.g. "info", "debug", "warden_auth=trace").
    pub log_level: String,
    /// Password encoding policy.
    pub password: PasswordSettings,
    /// Optional bootstrap administrator credential.
    pub default_admin: Option<DefaultAdminSettings>,
    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            password: PasswordSettings::default(),
            default_admin: None,
            extra: HashMap::new(),
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup, then use
/// [`get`](LazySettings::get) to read the settings.
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called exactly once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: Settings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns a reference to the configured settings.
    ///
    /// # Panics
    ///
    /// Panics if settings have not been configured.
    pub fn get(&self) -> &Settings {
        self.inner
            .get()
            .expect("Settings have not been configured. Call SETTINGS.configure() first.")
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
pub static SETTINGS: LazySettings = LazySettings::new();
