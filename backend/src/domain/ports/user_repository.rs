//! Port abstraction for user account persistence and its errors.

use async_trait::async_trait;

use crate::domain::{Email, GroupId, PasswordHash, Profile, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the e-mail address.
        DuplicateEmail { email: String } => "email {email} is already registered",
    }
}

/// Storage for user accounts, their credentials and the per-user group index.
///
/// The group index (`User::groups`) is a denormalised view of group rosters.
/// Writers update it after the group itself has been saved, so callers must
/// tolerate entries that briefly disagree with the rosters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. Fails with
    /// [`UserPersistenceError::DuplicateEmail`] when the e-mail is taken.
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch every user whose id is listed. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError>;

    /// Fetch a user together with the stored password hash.
    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, PasswordHash)>, UserPersistenceError>;

    /// Replace the editable profile fields. Returns `false` when no such user
    /// exists.
    async fn update_profile(
        &self,
        id: &UserId,
        profile: &Profile,
    ) -> Result<bool, UserPersistenceError>;

    /// Add `group` to the user's group index if absent.
    async fn add_group(&self, id: &UserId, group: &GroupId) -> Result<(), UserPersistenceError>;

    /// Remove `group` from the user's group index if present.
    async fn remove_group(&self, id: &UserId, group: &GroupId)
    -> Result<(), UserPersistenceError>;

    /// Remove `group` from every user's group index.
    async fn remove_group_from_all(&self, group: &GroupId) -> Result<u64, UserPersistenceError>;
}
