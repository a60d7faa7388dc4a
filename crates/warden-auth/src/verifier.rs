//! Credential verification.
//!
//! [`Authenticator`] decides which comparison path a login attempt takes:
//!
//! 1. If a bootstrap credential is set and the attempt matches it exactly,
//!    an administrator identity is returned, created on first use.
//! 2. Otherwise the [`IdentityRepository`] compares the submitted password
//!    against the stored, self-describing [`EncodedSecret`].
//!
//! "No such identity" and "wrong password" are not distinguished: both
//! yield `Ok(None)`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::Instrument;
use warden_core::logging::auth_span;
use warden_core::{Settings, WardenError, WardenResult};

use crate::algorithm::AlgorithmId;
use crate::bootstrap::DefaultAdmin;
use crate::encoder::PasswordEncoder;
use crate::repository::{Identity, IdentityRepository};

/// Login of the administrator created by the bootstrap path.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Password of the administrator created by the bootstrap path.
pub const DEFAULT_ADMIN_PASSWORD: &str = "password";

/// Outcome of [`Authenticator::encrypt_all_passwords`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionReport {
    /// Algorithm the secrets were encoded with.
    pub algorithm: AlgorithmId,
    /// Whether a salt was generated for each secret.
    pub use_salt: bool,
    /// Logins whose clear-text secret was replaced.
    pub encrypted: Vec<String>,
    /// Logins whose update failed; their secrets are still clear text.
    pub failed: Vec<String>,
}

/// Verifies credentials against the bootstrap credential and a repository.
///
/// Holds shared handles to the process-wide encoder and bootstrap state, so
/// cloning an `Authenticator` shares both.
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
    encoder: Arc<PasswordEncoder>,
    default_admin: Arc<DefaultAdmin>,
}

impl Authenticator {
    /// Creates an authenticator around a shared encoder.
    pub fn new(encoder: Arc<PasswordEncoder>) -> Self {
        Self {
            encoder,
            default_admin: Arc::new(DefaultAdmin::new()),
        }
    }

    /// Builds the encoder and bootstrap credential from startup settings.
    pub fn from_settings(settings: &Settings) -> WardenResult<Self> {
        let encoder = PasswordEncoder::from_settings(&settings.password)?;
        let authenticator = Self::new(Arc::new(encoder));
        if let Some(admin) = &settings.default_admin {
            authenticator.set_default_admin(&admin.username, &admin.password);
        }
        Ok(authenticator)
    }

    /// Returns the shared encoder.
    pub const fn encoder(&self) -> &Arc<PasswordEncoder> {
        &self.encoder
    }

    /// Sets the bootstrap credential. First writer wins; later calls return
    /// `false` and change nothing.
    pub fn set_default_admin(&self, username: &str, password: &str) -> bool {
        self.default_admin.set(username, password)
    }

    /// Returns `true` if a complete bootstrap credential is set and matches.
    pub fn check_default_admin(&self, username: &str, password: &str) -> bool {
        self.default_admin.check(username, password)
    }

    /// Returns `true` if a complete bootstrap credential is set.
    pub fn has_default_admin(&self) -> bool {
        self.default_admin.is_set()
    }

    /// Authenticates `identity` with the clear-text `secret`.
    pub async fn authenticate(
        &self,
        identity: &str,
        secret: &str,
        repository: &dyn IdentityRepository,
    ) -> WardenResult<Option<Identity>> {
        async {
            if self.check_default_admin(identity, secret) {
                tracing::debug!("bootstrap credential accepted");
                return self.find_or_create_administrator(repository).await.map(Some);
            }

            let found = repository
                .find_by_email_and_encoded_password(identity, secret)
                .await?;
            if found.is_some() {
                tracing::debug!("credentials accepted");
            } else {
                tracing::debug!("credentials rejected");
            }
            Ok(found)
        }
        .instrument(auth_span(identity))
        .await
    }

    /// Returns an administrator, creating the admin group and an `admin`
    /// identity with password `password` if none exists.
    pub async fn find_or_create_administrator(
        &self,
        repository: &dyn IdentityRepository,
    ) -> WardenResult<Identity> {
        self.find_or_create_administrator_with(
            repository,
            DEFAULT_ADMIN_USERNAME,
            DEFAULT_ADMIN_PASSWORD,
        )
        .await
    }

    /// Like [`find_or_create_administrator`](Self::find_or_create_administrator)
    /// with an explicit login and password for the identity it may create.
    ///
    /// The password passes through the encoder; an existing administrator
    /// is returned untouched. When no administrator exists and `username`
    /// is already taken, fails with [`WardenError::BootstrapConflict`]
    /// without creating anything.
    pub async fn find_or_create_administrator_with(
        &self,
        repository: &dyn IdentityRepository,
        username: &str,
        password: &str,
    ) -> WardenResult<Identity> {
        let secret = self.encoder.encode(password, None, None)?;
        repository.upsert_administrator(username, secret).await
    }

    /// Re-encodes every clear-text secret with the current policy.
    ///
    /// Only members of the admin group may run this. Fails with
    /// [`WardenError::EncryptionDisabled`] while encoding is switched off.
    /// A failed update does not stop the run; the login is listed in
    /// [`EncryptionReport::failed`] and the remaining secrets are processed.
    pub async fn encrypt_all_passwords(
        &self,
        actor: &Identity,
        repository: &dyn IdentityRepository,
    ) -> WardenResult<EncryptionReport> {
        let is_admin = repository
            .find_admin_group()
            .await?
            .is_some_and(|group| actor.is_member_of(&group));
        if !is_admin {
            return Err(WardenError::PermissionDenied(
                "administrator rights are required to encrypt passwords".to_string(),
            ));
        }

        let policy = self.encoder.policy();
        if !policy.enabled {
            return Err(WardenError::EncryptionDisabled);
        }

        let mut report = EncryptionReport {
            algorithm: policy.algorithm,
            use_salt: policy.use_salt,
            encrypted: Vec::new(),
            failed: Vec::new(),
        };

        for member in repository.find_cleartext_members().await? {
            let Some(clear) = member.secret.value.as_deref() else {
                continue;
            };
            let secret = self.encoder.encode(clear, None, None)?;
            match repository.update_secret(member.id, secret).await {
                Ok(()) => {
                    tracing::info!(identity_id = member.id, "encrypted clear-text password");
                    report.encrypted.push(member.email);
                }
                Err(e) => {
                    tracing::warn!(
                        identity_id = member.id,
                        code = e.code(),
                        "failed to encrypt clear-text password: {e}"
                    );
                    report.failed.push(member.email);
                }
            }
        }

        if !report.failed.is_empty() {
            tracing::warn!(
                encrypted = report.encrypted.len(),
                failed = report.failed.len(),
                "password encryption finished with failures"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{EncodedSecret, EncodingPolicy};
    use crate::repository::{Group, InMemoryRepository, RecordId, ADMIN_PERMISSION};
    use warden_core::DefaultAdminSettings;

    fn setup() -> (Authenticator, InMemoryRepository) {
        let authenticator = Authenticator::default();
        let repo = InMemoryRepository::new(Arc::clone(authenticator.encoder()));
        (authenticator, repo)
    }

    // ── Bootstrap credential ────────────────────────────────────────

    #[test]
    fn test_default_admin_first_writer_wins() {
        let authenticator = Authenticator::default();
        assert!(!authenticator.has_default_admin());
        assert!(authenticator.set_default_admin("a", "b"));
        assert!(!authenticator.set_default_admin("c", "d"));
        assert!(authenticator.check_default_admin("a", "b"));
        assert!(!authenticator.check_default_admin("c", "d"));
        assert!(authenticator.has_default_admin());
    }

    #[test]
    fn test_clones_share_bootstrap_state() {
        let authenticator = Authenticator::default();
        let clone = authenticator.clone();
        assert!(clone.set_default_admin("a", "b"));
        assert!(authenticator.check_default_admin("a", "b"));
    }

    #[test]
    fn test_from_settings() {
        let mut settings = Settings::default();
        settings.password.algorithm = "sha256".into();
        settings.default_admin = Some(DefaultAdminSettings {
            username: "root".into(),
            password: "toor".into(),
        });
        let authenticator = Authenticator::from_settings(&settings).unwrap();
        assert_eq!(authenticator.encoder().policy().algorithm, AlgorithmId::Sha256);
        assert!(authenticator.check_default_admin("root", "toor"));
    }

    #[test]
    fn test_from_settings_bad_algorithm() {
        let mut settings = Settings::default();
        settings.password.algorithm = "bogus".into();
        let err = Authenticator::from_settings(&settings).unwrap_err();
        assert!(matches!(err, WardenError::UnsupportedAlgorithm(_)));
    }

    // ── authenticate ────────────────────────────────────────────────

    #[tokio::test]
    async fn test_authenticate_without_bootstrap_and_empty_repository() {
        let (authenticator, repo) = setup();
        let result = authenticator
            .authenticate("admin", "password", &repo)
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(repo.identities().await.is_empty());
    }

    #[tokio::test]
    async fn test_authenticate_stored_identity() {
        let (authenticator, repo) = setup();
        repo.add_identity("alice@example.com", "hunter2", &[]).await.unwrap();

        let ok = authenticator
            .authenticate("alice@example.com", "hunter2", &repo)
            .await
            .unwrap();
        assert_eq!(ok.unwrap().email, "alice@example.com");

        let bad = authenticator
            .authenticate("alice@example.com", "wrong", &repo)
            .await
            .unwrap();
        assert!(bad.is_none());
    }

    #[tokio::test]
    async fn test_authenticate_bootstrap_creates_administrator() {
        let (authenticator, repo) = setup();
        authenticator.set_default_admin("ops", "letmein");

        let admin = authenticator
            .authenticate("ops", "letmein", &repo)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.email, DEFAULT_ADMIN_USERNAME);
        let group = repo.find_admin_group().await.unwrap().unwrap();
        assert!(admin.is_member_of(&group));
        assert!(group.has_permission(ADMIN_PERMISSION));

        // The created administrator can also log in through the repository path.
        let direct = authenticator
            .authenticate(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD, &repo)
            .await
            .unwrap();
        assert_eq!(direct.map(|identity| identity.id), Some(admin.id));
    }

    #[tokio::test]
    async fn test_authenticate_bootstrap_is_idempotent() {
        let (authenticator, repo) = setup();
        authenticator.set_default_admin("ops", "letmein");
        let first = authenticator.authenticate("ops", "letmein", &repo).await.unwrap();
        let second = authenticator.authenticate("ops", "letmein", &repo).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(repo.identities().await.len(), 1);
    }

    #[tokio::test]
    async fn test_authenticate_bootstrap_wrong_password_falls_through() {
        let (authenticator, repo) = setup();
        authenticator.set_default_admin("ops", "letmein");
        let result = authenticator.authenticate("ops", "nope", &repo).await.unwrap();
        assert!(result.is_none());
        assert!(repo.identities().await.is_empty());
    }

    #[tokio::test]
    async fn test_authenticate_bootstrap_with_taken_admin_login() {
        let (authenticator, repo) = setup();
        repo.add_identity(DEFAULT_ADMIN_USERNAME, "whatever", &[]).await.unwrap();
        authenticator.set_default_admin("ops", "letmein");

        let err = authenticator
            .authenticate("ops", "letmein", &repo)
            .await
            .unwrap_err();
        assert!(matches!(err, WardenError::BootstrapConflict(_)));
        assert!(repo.groups().await.is_empty());
        assert!(repo.find_admin_group().await.unwrap().is_none());

        // An explicit, free login still provisions an administrator.
        let admin = authenticator
            .find_or_create_administrator_with(&repo, "root@example.com", "s3cret")
            .await
            .unwrap();
        assert_eq!(admin.email, "root@example.com");
        assert_eq!(repo.groups().await.len(), 1);
    }

    // ── find_or_create_administrator ────────────────────────────────

    #[tokio::test]
    async fn test_find_or_create_administrator_encodes_password() {
        let (authenticator, repo) = setup();
        let admin = authenticator
            .find_or_create_administrator_with(&repo, "root@example.com", "s3cret")
            .await
            .unwrap();
        assert_eq!(admin.secret.algorithm, AlgorithmId::Sha1);
        assert!(admin.secret.salt.is_some());
        assert!(admin.secret.matches("s3cret"));
    }

    // ── encrypt_all_passwords ───────────────────────────────────────

    #[tokio::test]
    async fn test_encrypt_all_passwords() {
        let (authenticator, repo) = setup();
        let admin = authenticator.find_or_create_administrator(&repo).await.unwrap();
        repo.add_identity_with_secret("legacy@example.com", EncodedSecret::cleartext("plain"), &[])
            .await
            .unwrap();

        let report = authenticator.encrypt_all_passwords(&admin, &repo).await.unwrap();
        assert_eq!(report.algorithm, AlgorithmId::Sha1);
        assert!(report.use_salt);
        assert_eq!(report.encrypted, vec!["legacy@example.com".to_string()]);

        let migrated = authenticator
            .authenticate("legacy@example.com", "plain", &repo)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(migrated.secret.algorithm, AlgorithmId::Sha1);

        let again = authenticator.encrypt_all_passwords(&admin, &repo).await.unwrap();
        assert!(again.encrypted.is_empty());
    }

    /// Delegates to an in-memory store but refuses to update one login.
    struct RefusingRepository {
        inner: InMemoryRepository,
        refuse: String,
    }

    #[async_trait::async_trait]
    impl IdentityRepository for RefusingRepository {
        async fn find_by_email_and_encoded_password(
            &self,
            email: &str,
            clear_password: &str,
        ) -> WardenResult<Option<Identity>> {
            self.inner
                .find_by_email_and_encoded_password(email, clear_password)
                .await
        }

        async fn find_by_email(&self, email: &str) -> WardenResult<Option<Identity>> {
            self.inner.find_by_email(email).await
        }

        async fn find_admin_group(&self) -> WardenResult<Option<Group>> {
            self.inner.find_admin_group().await
        }

        async fn create_admin_group(&self) -> WardenResult<Group> {
            self.inner.create_admin_group().await
        }

        async fn find_member_of_group(&self, group: &Group) -> WardenResult<Option<Identity>> {
            self.inner.find_member_of_group(group).await
        }

        async fn create_member(
            &self,
            username: &str,
            secret: EncodedSecret,
            group: &Group,
        ) -> WardenResult<Identity> {
            self.inner.create_member(username, secret, group).await
        }

        async fn find_cleartext_members(&self) -> WardenResult<Vec<Identity>> {
            self.inner.find_cleartext_members().await
        }

        async fn update_secret(&self, identity_id: RecordId, secret: EncodedSecret) -> WardenResult<()> {
            let target = self.inner.get(identity_id).await;
            if target.is_some_and(|identity| identity.email == self.refuse) {
                return Err(WardenError::IntegrityError("row locked".to_string()));
            }
            self.inner.update_secret(identity_id, secret).await
        }
    }

    #[tokio::test]
    async fn test_encrypt_all_passwords_reports_failed_updates() {
        let authenticator = Authenticator::default();
        let repo = RefusingRepository {
            inner: InMemoryRepository::new(Arc::clone(authenticator.encoder())),
            refuse: "b@example.com".to_string(),
        };
        let admin = authenticator.find_or_create_administrator(&repo).await.unwrap();
        for email in ["a@example.com", "b@example.com", "c@example.com"] {
            repo.inner
                .add_identity_with_secret(email, EncodedSecret::cleartext("plain"), &[])
                .await
                .unwrap();
        }

        let report = authenticator.encrypt_all_passwords(&admin, &repo).await.unwrap();
        assert_eq!(
            report.encrypted,
            vec!["a@example.com".to_string(), "c@example.com".to_string()]
        );
        assert_eq!(report.failed, vec!["b@example.com".to_string()]);

        let remaining = repo.find_cleartext_members().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].email, "b@example.com");
    }

    #[tokio::test]
    async fn test_encrypt_all_passwords_requires_admin() {
        let (authenticator, repo) = setup();
        let user = repo.add_identity("user@example.com", "pw", &[]).await.unwrap();
        let err = authenticator
            .encrypt_all_passwords(&user, &repo)
            .await
            .unwrap_err();
        assert!(matches!(err, WardenError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_encrypt_all_passwords_disabled() {
        let encoder = PasswordEncoder::with_policy(EncodingPolicy {
            enabled: false,
            ..EncodingPolicy::default()
        })
        .unwrap();
        let authenticator = Authenticator::new(Arc::new(encoder));
        let repo = InMemoryRepository::new(Arc::clone(authenticator.encoder()));
        let admin = authenticator.find_or_create_administrator(&repo).await.unwrap();

        let err = authenticator
            .encrypt_all_passwords(&admin, &repo)
            .await
            .unwrap_err();
        assert!(matches!(err, WardenError::EncryptionDisabled));
    }
}
