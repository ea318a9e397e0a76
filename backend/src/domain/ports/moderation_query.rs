//! Driving port for the admin moderation queues.

use async_trait::async_trait;

use crate::domain::{Error, Group, Recipe, UserId};

/// Number of items waiting in each moderation queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModerationCounts {
    pub pending_groups: u64,
    pub pending_recipes: u64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModerationQuery: Send + Sync {
    /// Groups awaiting moderation, newest first.
    async fn pending_groups(&self, actor: &UserId) -> Result<Vec<Group>, Error>;

    /// Recipes awaiting moderation, newest first.
    async fn pending_recipes(&self, actor: &UserId) -> Result<Vec<Recipe>, Error>;

    async fn counts(&self, actor: &UserId) -> Result<ModerationCounts, Error>;
}
