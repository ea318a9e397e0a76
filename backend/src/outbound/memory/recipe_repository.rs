use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{RecipePersistenceError, RecipeRepository};
use crate::domain::{GroupId, Moderated, ModerationStatus, Recipe, RecipeId};

use super::lock;

#[derive(Debug, Default)]
pub struct InMemoryRecipeRepository {
    recipes: Mutex<HashMap<RecipeId, Recipe>>,
}

impl InMemoryRecipeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matching recipes, newest first.
    fn select(&self, keep: impl Fn(&Recipe) -> bool) -> Vec<Recipe> {
        let mut selected: Vec<Recipe> = lock(&self.recipes)
            .values()
            .filter(|recipe| keep(recipe))
            .cloned()
            .collect();
        selected.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        selected
    }
}

fn is_pending(recipe: &Recipe) -> bool {
    recipe.moderation().status() == ModerationStatus::Pending
}

#[async_trait]
impl RecipeRepository for InMemoryRecipeRepository {
    async fn insert(&self, recipe: &Recipe) -> Result<(), RecipePersistenceError> {
        lock(&self.recipes).insert(recipe.id().clone(), recipe.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>, RecipePersistenceError> {
        Ok(lock(&self.recipes).get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Recipe>, RecipePersistenceError> {
        Ok(self.select(|_| true))
    }

    async fn list_by_group(&self, group: &GroupId) -> Result<Vec<Recipe>, RecipePersistenceError> {
        Ok(self.select(|recipe| recipe.group() == Some(group)))
    }

    async fn list_pending(&self) -> Result<Vec<Recipe>, RecipePersistenceError> {
        Ok(self.select(is_pending))
    }

    async fn count_pending(&self) -> Result<u64, RecipePersistenceError> {
        Ok(lock(&self.recipes)
            .values()
            .filter(|recipe| is_pending(recipe))
            .count() as u64)
    }

    async fn save(
        &self,
        recipe: &Recipe,
        expected_revision: u32,
    ) -> Result<(), RecipePersistenceError> {
        let mut recipes = lock(&self.recipes);
        let Some(stored) = recipes.get_mut(recipe.id()) else {
            return Err(RecipePersistenceError::missing(recipe.id().to_string()));
        };
        if stored.revision() != expected_revision {
            return Err(RecipePersistenceError::revision_mismatch(
                expected_revision,
                stored.revision(),
            ));
        }
        *stored = recipe.clone();
        Ok(())
    }

    async fn delete(&self, id: &RecipeId) -> Result<bool, RecipePersistenceError> {
        Ok(lock(&self.recipes).remove(id).is_some())
    }

    async fn detach_group(&self, group: &GroupId) -> Result<u64, RecipePersistenceError> {
        let mut detached = 0;
        for recipe in lock(&self.recipes).values_mut() {
            if recipe.group() == Some(group) {
                recipe.detach_group();
                detached += 1;
            }
        }
        Ok(detached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_fixtures::{recipe, user};
    use crate::domain::UserRole;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn detach_clears_only_matching_group() {
        let repo = InMemoryRecipeRepository::new();
        let author = user("Ada", UserRole::Member);
        let doomed = GroupId::random();
        let kept = GroupId::random();
        let in_doomed = recipe("Ragu", &author, Some(&doomed));
        let in_kept = recipe("Pesto", &author, Some(&kept));
        repo.insert(&in_doomed).await.expect("insert");
        repo.insert(&in_kept).await.expect("insert");

        assert_eq!(repo.detach_group(&doomed).await.expect("detach"), 1);
        let orphan = repo
            .find_by_id(in_doomed.id())
            .await
            .expect("find")
            .expect("present");
        assert_eq!(orphan.group(), None);
        assert_eq!(repo.list_by_group(&kept).await.expect("list").len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn pending_count_tracks_moderation() {
        let repo = InMemoryRecipeRepository::new();
        let author = user("Ada", UserRole::Member);
        let admin = user("Root", UserRole::Admin);
        repo.insert(&recipe("Ragu", &author, None))
            .await
            .expect("insert");
        repo.insert(&recipe("Pesto", &admin, None))
            .await
            .expect("insert");
        assert_eq!(repo.count_pending().await.expect("count"), 1);
    }
}
