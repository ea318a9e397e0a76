//! Driving port for admin moderation decisions.

use async_trait::async_trait;

use crate::domain::{Error, Group, GroupId, Recipe, RecipeId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModerationCommand: Send + Sync {
    async fn approve_group(&self, actor: &UserId, group: &GroupId) -> Result<Group, Error>;

    async fn reject_group(
        &self,
        actor: &UserId,
        group: &GroupId,
        reason: Option<String>,
    ) -> Result<Group, Error>;

    async fn approve_recipe(&self, actor: &UserId, recipe: &RecipeId) -> Result<Recipe, Error>;

    async fn reject_recipe(
        &self,
        actor: &UserId,
        recipe: &RecipeId,
        reason: Option<String>,
    ) -> Result<Recipe, Error>;
}
