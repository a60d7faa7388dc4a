//! Identity storage collaborator.
//!
//! The credential verifier never queries storage directly. It talks to an
//! [`IdentityRepository`], which owns identities, groups, and the
//! comparison of a submitted password against the stored
//! [`EncodedSecret`]. [`InMemoryRepository`] is a complete implementation
//! for tests, tooling, and embedders without a database.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use warden_core::{WardenError, WardenResult};

use crate::encoder::{EncodedSecret, PasswordEncoder};

/// Permission code that marks a group as administrators.
pub const ADMIN_PERMISSION: &str = "ADMIN";

/// Title of the group created by the administrator bootstrap.
pub const ADMIN_GROUP_TITLE: &str = "Administrators";

/// Code of the group created by the administrator bootstrap.
pub const ADMIN_GROUP_CODE: &str = "administrators";

/// Primary key of a stored record.
pub type RecordId = u64;

/// A group of identities with shared permission codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Primary key.
    pub id: RecordId,
    /// Human-readable title (e.g. "Administrators").
    pub title: String,
    /// Machine-readable code (e.g. "administrators").
    pub code: String,
    /// Permission codes granted to members (e.g. "ADMIN").
    pub permissions: BTreeSet<String>,
}

impl Group {
    /// Returns `true` if this group grants the given permission code.
    pub fn has_permission(&self, code: &str) -> bool {
        self.permissions.contains(code)
    }
}

/// A stored identity with its encoded credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Primary key.
    pub id: RecordId,
    /// Login name, usually an e-mail address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub surname: String,
    /// The stored credential.
    pub secret: EncodedSecret,
    /// Ids of the groups this identity belongs to.
    pub groups: Vec<RecordId>,
}

impl Identity {
    /// Returns `true` if this identity belongs to `group`.
    pub fn is_member_of(&self, group: &Group) -> bool {
        self.groups.contains(&group.id)
    }

    /// Returns "first surname", trimmed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.surname)
            .trim()
            .to_string()
    }
}

/// Storage operations the credential verifier depends on.
///
/// Implementations must be `Send + Sync` so one repository can serve
/// concurrent authentication attempts.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Finds the identity with login `email` whose stored secret matches
    /// `clear_password`.
    ///
    /// Implementations re-derive with the stored algorithm and salt (see
    /// [`EncodedSecret::matches`]). An unknown login and a wrong password
    /// both yield `Ok(None)`.
    async fn find_by_email_and_encoded_password(
        &self,
        email: &str,
        clear_password: &str,
    ) -> WardenResult<Option<Identity>>;

    /// Finds the identity with login `email`, regardless of its secret.
    async fn find_by_email(&self, email: &str) -> WardenResult<Option<Identity>>;

    /// Returns the first group granted [`ADMIN_PERMISSION`], if any.
    async fn find_admin_group(&self) -> WardenResult<Option<Group>>;

    /// Creates the administrators group and grants it [`ADMIN_PERMISSION`].
    async fn create_admin_group(&self) -> WardenResult<Group>;

    /// Returns the first member of `group`, if any.
    async fn find_member_of_group(&self, group: &Group) -> WardenResult<Option<Identity>>;

    /// Creates an identity with the given login and secret inside `group`.
    async fn create_member(
        &self,
        username: &str,
        secret: EncodedSecret,
        group: &Group,
    ) -> WardenResult<Identity>;

    /// Returns an existing administrator, creating the admin group and a
    /// member holding `secret` as needed.
    ///
    /// Fails with [`WardenError::BootstrapConflict`] when no administrator
    /// exists and `username` already belongs to another identity. Nothing
    /// is written in that case.
    ///
    /// The default implementation composes the primitives above;
    /// implementations backed by a transactional store should override it
    /// so concurrent callers cannot create two administrators.
    async fn upsert_administrator(
        &self,
        username: &str,
        secret: EncodedSecret,
    ) -> WardenResult<Identity> {
        let existing_group = self.find_admin_group().await?;
        if let Some(group) = &existing_group {
            if let Some(member) = self.find_member_of_group(group).await? {
                return Ok(member);
            }
        }
        if self.find_by_email(username).await?.is_some() {
            return Err(bootstrap_conflict(username));
        }
        let group = match existing_group {
            Some(group) => group,
            None => self.create_admin_group().await?,
        };
        self.create_member(username, secret, &group).await
    }

    /// Returns every identity whose secret is stored as clear text.
    async fn find_cleartext_members(&self) -> WardenResult<Vec<Identity>>;

    /// Replaces the stored secret of the identity with the given id.
    async fn update_secret(&self, identity_id: RecordId, secret: EncodedSecret) -> WardenResult<()>;
}

fn bootstrap_conflict(username: &str) -> WardenError {
    WardenError::BootstrapConflict(format!(
        "login '{username}' belongs to an identity outside the administrators group"
    ))
}

#[derive(Debug, Default)]
struct Store {
    last_id: RecordId,
    groups: Vec<Group>,
    identities: Vec<Identity>,
}

impl Store {
    fn next_id(&mut self) -> RecordId {
        self.last_id += 1;
        self.last_id
    }

    fn admin_group(&self) -> Option<&Group> {
        self.groups
            .iter()
            .find(|group| group.has_permission(ADMIN_PERMISSION))
    }

    fn find_by_email(&self, email: &str) -> Option<&Identity> {
        self.identities.iter().find(|identity| identity.email == email)
    }

    fn first_member_of(&self, group_id: RecordId) -> Option<&Identity> {
        self.identities
            .iter()
            .find(|identity| identity.groups.contains(&group_id))
    }

    fn insert_group(&mut self, title: &str, code: &str, permissions: &[&str]) -> Group {
        let group = Group {
            id: self.next_id(),
            title: title.to_string(),
            code: code.to_string(),
            permissions: permissions.iter().map(ToString::to_string).collect(),
        };
        self.groups.push(group.clone());
        group
    }

    fn insert_identity(
        &mut self,
        email: &str,
        first_name: &str,
        surname: &str,
        secret: EncodedSecret,
        groups: Vec<RecordId>,
    ) -> WardenResult<Identity> {
        if self.find_by_email(email).is_some() {
            return Err(WardenError::IntegrityError(format!(
                "an identity with login '{email}' already exists"
            )));
        }
        if let Some(missing) = groups
            .iter()
            .find(|id| !self.groups.iter().any(|group| group.id == **id))
        {
            return Err(WardenError::NotFound(format!("group {missing}")));
        }
        let identity = Identity {
            id: self.next_id(),
            email: email.to_string(),
            first_name: first_name.to_string(),
            surname: surname.to_string(),
            secret,
            groups,
        };
        self.identities.push(identity.clone());
        Ok(identity)
    }
}

/// An [`IdentityRepository`] kept entirely in memory.
///
/// All state sits behind one async `RwLock`, so
/// [`upsert_administrator`](IdentityRepository::upsert_administrator) runs
/// as a single critical section.
#[derive(Debug)]
pub struct InMemoryRepository {
    encoder: Arc<PasswordEncoder>,
    store: RwLock<Store>,
}

impl InMemoryRepository {
    /// Creates an empty repository that encodes new passwords with `encoder`.
    pub fn new(encoder: Arc<PasswordEncoder>) -> Self {
        Self {
            encoder,
            store: RwLock::new(Store::default()),
        }
    }

    /// Adds a group with the given permission codes.
    pub async fn add_group(&self, title: &str, code: &str, permissions: &[&str]) -> Group {
        self.store.write().await.insert_group(title, code, permissions)
    }

    /// Adds an identity, encoding `password` with the current policy.
    pub async fn add_identity(
        &self,
        email: &str,
        password: &str,
        groups: &[&Group],
    ) -> WardenResult<Identity> {
        let secret = self.encoder.encode(password, None, None)?;
        self.add_identity_with_secret(email, secret, groups).await
    }

    /// Adds an identity with an already encoded secret.
    pub async fn add_identity_with_secret(
        &self,
        email: &str,
        secret: EncodedSecret,
        groups: &[&Group],
    ) -> WardenResult<Identity> {
        let group_ids = groups.iter().map(|group| group.id).collect();
        self.store
            .write()
            .await
            .insert_identity(email, "", "", secret, group_ids)
    }

    /// Returns the identity with the given id.
    pub async fn get(&self, id: RecordId) -> Option<Identity> {
        self.store
            .read()
            .await
            .identities
            .iter()
            .find(|identity| identity.id == id)
            .cloned()
    }

    /// Returns every stored identity.
    pub async fn identities(&self) -> Vec<Identity> {
        self.store.read().await.identities.clone()
    }

    /// Returns every stored group.
    pub async fn groups(&self) -> Vec<Group> {
        self.store.read().await.groups.clone()
    }
}

#[async_trait]
#[allow(clippy::significant_drop_tightening)]
impl IdentityRepository for InMemoryRepository {
    async fn find_by_email_and_encoded_password(
        &self,
        email: &str,
        clear_password: &str,
    ) -> WardenResult<Option<Identity>> {
        let store = self.store.read().await;
        Ok(store
            .identities
            .iter()
            .find(|identity| identity.email == email && identity.secret.matches(clear_password))
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> WardenResult<Option<Identity>> {
        Ok(self.store.read().await.find_by_email(email).cloned())
    }

    async fn find_admin_group(&self) -> WardenResult<Option<Group>> {
        Ok(self.store.read().await.admin_group().cloned())
    }

    async fn create_admin_group(&self) -> WardenResult<Group> {
        Ok(self.store.write().await.insert_group(
            ADMIN_GROUP_TITLE,
            ADMIN_GROUP_CODE,
            &[ADMIN_PERMISSION],
        ))
    }

    async fn find_member_of_group(&self, group: &Group) -> WardenResult<Option<Identity>> {
        Ok(self.store.read().await.first_member_of(group.id).cloned())
    }

    async fn create_member(
        &self,
        username: &str,
        secret: EncodedSecret,
        group: &Group,
    ) -> WardenResult<Identity> {
        self.store
            .write()
            .await
            .insert_identity(username, "Admin", "Admin", secret, vec![group.id])
    }

    async fn upsert_administrator(
        &self,
        username: &str,
        secret: EncodedSecret,
    ) -> WardenResult<Identity> {
        let mut store = self.store.write().await;

        let existing_group = store.admin_group().map(|group| group.id);
        if let Some(member) = existing_group.and_then(|id| store.first_member_of(id)) {
            return Ok(member.clone());
        }
        if store.find_by_email(username).is_some() {
            tracing::warn!(username, "bootstrap administrator login already taken");
            return Err(bootstrap_conflict(username));
        }

        let group_id = match existing_group {
            Some(id) => id,
            None => {
                tracing::info!("creating administrators group");
                store
                    .insert_group(ADMIN_GROUP_TITLE, ADMIN_GROUP_CODE, &[ADMIN_PERMISSION])
                    .id
            }
        };

        tracing::info!(username, "creating bootstrap administrator");
        store.insert_identity(username, "Admin", "Admin", secret, vec![group_id])
    }

    async fn find_cleartext_members(&self) -> WardenResult<Vec<Identity>> {
        let store = self.store.read().await;
        Ok(store
            .identities
            .iter()
            .filter(|identity| identity.secret.is_cleartext())
            .cloned()
            .collect())
    }

    async fn update_secret(&self, identity_id: RecordId, secret: EncodedSecret) -> WardenResult<()> {
        let mut store = self.store.write().await;
        let identity = store
            .identities
            .iter_mut()
            .find(|identity| identity.id == identity_id)
            .ok_or_else(|| WardenError::NotFound(format!("identity {identity_id}")))?;
        identity.secret = secret;
        Ok(())
    }
}
