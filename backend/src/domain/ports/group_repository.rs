//! Port for group persistence.
//!
//! Groups are stored as whole documents: the roster and the pending join
//! requests travel with the group row, and every update replaces them in a
//! single revision-checked write.

use async_trait::async_trait;

use crate::domain::{Group, GroupId, InviteCode};

use super::define_port_error;

define_port_error! {
    /// Errors raised by group repository adapters.
    pub enum GroupPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "group repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "group repository query failed: {message}",
        /// Another group already uses the invite code.
        DuplicateInviteCode { code: String } => "invite code {code} is already in use",
        /// Optimistic concurrency check failed.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "revision mismatch: expected {expected}, found {actual}",
        /// The group vanished between load and save.
        Missing { id: String } => "group {id} no longer exists",
        /// A stored row does not describe a valid group.
        Corrupt { message: String } => "stored group is invalid: {message}",
    }
}

/// Port for group storage and retrieval.
///
/// # Revision Semantics
///
/// - New groups start at revision 1.
/// - Callers bump the revision on the aggregate before saving and pass the
///   revision they loaded as `expected_revision`.
/// - A save whose `expected_revision` no longer matches fails with
///   [`GroupPersistenceError::RevisionMismatch`] and writes nothing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Insert a new group. Fails with
    /// [`GroupPersistenceError::DuplicateInviteCode`] on a code collision.
    async fn insert(&self, group: &Group) -> Result<(), GroupPersistenceError>;

    async fn find_by_id(&self, id: &GroupId) -> Result<Option<Group>, GroupPersistenceError>;

    /// Exact-match lookup by invite code.
    async fn find_by_invite_code(
        &self,
        code: &InviteCode,
    ) -> Result<Option<Group>, GroupPersistenceError>;

    /// Every group ordered by name.
    async fn list_all(&self) -> Result<Vec<Group>, GroupPersistenceError>;

    /// Groups awaiting moderation, newest first.
    async fn list_pending(&self) -> Result<Vec<Group>, GroupPersistenceError>;

    async fn count_pending(&self) -> Result<u64, GroupPersistenceError>;

    /// Replace the stored group if its revision still equals
    /// `expected_revision`.
    async fn save(&self, group: &Group, expected_revision: u32)
    -> Result<(), GroupPersistenceError>;

    /// Delete a group. Returns `false` when it did not exist.
    async fn delete(&self, id: &GroupId) -> Result<bool, GroupPersistenceError>;
}
