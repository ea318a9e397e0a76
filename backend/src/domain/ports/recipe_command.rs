//! Driving port for recipe mutations.

use async_trait::async_trait;

use crate::domain::{Error, Recipe, RecipeContent, RecipeId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeCommand: Send + Sync {
    async fn create(&self, actor: &UserId, content: RecipeContent) -> Result<Recipe, Error>;

    async fn update(
        &self,
        actor: &UserId,
        recipe: &RecipeId,
        content: RecipeContent,
    ) -> Result<Recipe, Error>;

    async fn delete(&self, actor: &UserId, recipe: &RecipeId) -> Result<(), Error>;
}
