//! Driving port for creating, editing and deleting groups.

use async_trait::async_trait;

use crate::domain::{Error, Group, GroupDetails, GroupId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupCommand: Send + Sync {
    /// Create a group owned by `actor` with a freshly generated invite code.
    async fn create(&self, actor: &UserId, details: GroupDetails) -> Result<Group, Error>;

    /// Replace the descriptive fields of a group.
    async fn update(
        &self,
        actor: &UserId,
        group: &GroupId,
        details: GroupDetails,
    ) -> Result<Group, Error>;

    /// Delete a group, then detach its recipes and drop it from user indexes.
    async fn delete(&self, actor: &UserId, group: &GroupId) -> Result<(), Error>;
}
