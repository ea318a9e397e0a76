//! Port for recipe persistence.

use async_trait::async_trait;

use crate::domain::{GroupId, Recipe, RecipeId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by recipe repository adapters.
    pub enum RecipePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "recipe repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "recipe repository query failed: {message}",
        /// Optimistic concurrency check failed.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "revision mismatch: expected {expected}, found {actual}",
        /// The recipe vanished between load and save.
        Missing { id: String } => "recipe {id} no longer exists",
        /// A stored row does not describe a valid recipe.
        Corrupt { message: String } => "stored recipe is invalid: {message}",
    }
}

/// Port for recipe storage and retrieval.
///
/// Listing methods return recipes newest first. Revisions follow the same
/// compare-and-swap contract as [`super::GroupRepository`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    async fn insert(&self, recipe: &Recipe) -> Result<(), RecipePersistenceError>;

    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>, RecipePersistenceError>;

    async fn list_all(&self) -> Result<Vec<Recipe>, RecipePersistenceError>;

    async fn list_by_group(&self, group: &GroupId) -> Result<Vec<Recipe>, RecipePersistenceError>;

    async fn list_pending(&self) -> Result<Vec<Recipe>, RecipePersistenceError>;

    async fn count_pending(&self) -> Result<u64, RecipePersistenceError>;

    async fn save(
        &self,
        recipe: &Recipe,
        expected_revision: u32,
    ) -> Result<(), RecipePersistenceError>;

    /// Delete a recipe. Returns `false` when it did not exist.
    async fn delete(&self, id: &RecipeId) -> Result<bool, RecipePersistenceError>;

    /// Clear the group reference on every recipe attached to `group`.
    async fn detach_group(&self, group: &GroupId) -> Result<u64, RecipePersistenceError>;
}
