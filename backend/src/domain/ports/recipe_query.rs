//! Driving port for reading recipes.

use async_trait::async_trait;

use crate::domain::{Error, Recipe, RecipeFilter, RecipeId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeQuery: Send + Sync {
    /// Recipes visible to `viewer` that match `filter`, newest first.
    async fn list(&self, viewer: &UserId, filter: RecipeFilter) -> Result<Vec<Recipe>, Error>;

    async fn get(&self, viewer: &UserId, recipe: &RecipeId) -> Result<Recipe, Error>;
}
