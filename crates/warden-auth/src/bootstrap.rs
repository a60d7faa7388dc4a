//! Bootstrap administrator credential.
//!
//! A process-lifetime login that is never persisted. It lets an operator
//! sign in before any real identity exists in the backing store. The
//! credential can be set at most once: the first writer wins.

use std::fmt;
use std::sync::RwLock;

use crate::encoder::constant_time_eq;

/// A bootstrap username/password pair, compared as clear text.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DefaultAdminCredential {
    /// The login name.
    pub username: String,
    /// The clear-text password.
    pub password: String,
}

impl DefaultAdminCredential {
    /// Returns `true` when both fields are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for DefaultAdminCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultAdminCredential")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Write-once holder for the bootstrap credential.
#[derive(Debug, Default)]
pub struct DefaultAdmin {
    credential: RwLock<DefaultAdminCredential>,
}

impl DefaultAdmin {
    /// Creates an empty holder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the credential unless either field was already set.
    ///
    /// Returns `false` (and changes nothing) on every call after the first
    /// one that set a non-empty field.
    pub fn set(&self, username: &str, password: &str) -> bool {
        let mut credential = self
            .credential
            .write()
            .expect("default admin lock poisoned");
        if !credential.username.is_empty() || !credential.password.is_empty() {
            tracing::warn!("default admin already configured; ignoring new credential");
            return false;
        }
        credential.username = username.to_string();
        credential.password = password.to_string();
        tracing::info!(username, "default admin configured");
        true
    }

    /// Returns `true` once both username and password are set.
    pub fn is_set(&self) -> bool {
        self.credential
            .read()
            .expect("default admin lock poisoned")
            .is_complete()
    }

    /// Returns `true` only if a complete credential is set and both fields
    /// match exactly.
    pub fn check(&self, username: &str, password: &str) -> bool {
        let credential = self.credential.read().expect("default admin lock poisoned");
        credential.is_complete()
            && credential.username == username
            && constant_time_eq(credential.password.as_bytes(), password.as_bytes())
    }

    /// Returns a copy of the credential if it is complete.
    pub fn credential(&self) -> Option<DefaultAdminCredential> {
        let credential = self.credential.read().expect("default admin lock poisoned");
        credential.is_complete().then(|| credential.clone())
    }
}
