//! Recipe domain service implementing [`RecipeCommand`] and [`RecipeQuery`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::moderation::Moderated;
use super::policy::{RecipeAction, evaluate_recipe};
use super::ports::{GroupRepository, RecipeCommand, RecipeQuery, RecipeRepository, UserRepository};
use super::search::{RecipeFilter, recipe_listed_for};
use super::service_support::{
    load_recipe, load_recipe_group, map_group_error, map_recipe_error, persist_recipe,
    resolve_actor,
};
use super::{Actor, Error, Group, GroupId, Recipe, RecipeContent, RecipeId, UserId};

#[derive(Clone)]
pub struct RecipeService<U, G, R> {
    users: Arc<U>,
    groups: Arc<G>,
    recipes: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<U, G, R> RecipeService<U, G, R> {
    pub fn new(users: Arc<U>, groups: Arc<G>, recipes: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            groups,
            recipes,
            clock,
        }
    }
}

impl<U, G, R> RecipeService<U, G, R>
where
    U: UserRepository,
    G: GroupRepository,
    R: RecipeRepository,
{
    /// Posting into a group requires membership. Admins may post anywhere.
    async fn check_group_target(&self, actor: &Actor, group: &GroupId) -> Result<(), Error> {
        let group = self
            .groups
            .find_by_id(group)
            .await
            .map_err(map_group_error)?
            .ok_or_else(|| Error::not_found("group not found"))?;
        if actor.is_admin() || group.is_member(actor.id()) {
            Ok(())
        } else {
            Err(Error::forbidden(
                "only group members can post recipes to this group",
            ))
        }
    }

    async fn load_for(
        &self,
        actor: &Actor,
        recipe: &RecipeId,
        action: RecipeAction,
    ) -> Result<Recipe, Error> {
        let recipe = load_recipe(self.recipes.as_ref(), recipe).await?;
        let group = load_recipe_group(self.groups.as_ref(), &recipe).await?;
        evaluate_recipe(actor, &recipe, group.as_ref(), action).into_result()?;
        Ok(recipe)
    }
}

#[async_trait]
impl<U, G, R> RecipeCommand for RecipeService<U, G, R>
where
    U: UserRepository,
    G: GroupRepository,
    R: RecipeRepository,
{
    async fn create(&self, actor: &UserId, content: RecipeContent) -> Result<Recipe, Error> {
        let actor = resolve_actor(self.users.as_ref(), actor).await?;
        if let Some(group) = content.group.as_ref() {
            self.check_group_target(&actor, group).await?;
        }

        let recipe = Recipe::create(RecipeId::random(), content, &actor, self.clock.utc());
        self.recipes
            .insert(&recipe)
            .await
            .map_err(map_recipe_error)?;
        info!(
            recipe_id = %recipe.id(),
            user_id = %actor.id(),
            status = %recipe.moderation().status(),
            "recipe created"
        );
        Ok(recipe)
    }

    async fn update(
        &self,
        actor: &UserId,
        recipe: &RecipeId,
        content: RecipeContent,
    ) -> Result<Recipe, Error> {
        let actor = resolve_actor(self.users.as_ref(), actor).await?;
        let mut recipe = self.load_for(&actor, recipe, RecipeAction::Update).await?;
        let moved_to = content
            .group
            .as_ref()
            .filter(|group| recipe.group() != Some(*group));
        if let Some(group) = moved_to {
            self.check_group_target(&actor, group).await?;
        }

        recipe.update_content(content);
        persist_recipe(self.recipes.as_ref(), &mut recipe, self.clock.utc()).await?;
        info!(recipe_id = %recipe.id(), user_id = %actor.id(), "recipe updated");
        Ok(recipe)
    }

    async fn delete(&self, actor: &UserId, recipe: &RecipeId) -> Result<(), Error> {
        let actor = resolve_actor(self.users.as_ref(), actor).await?;
        self.load_for(&actor, recipe, RecipeAction::Delete).await?;
        if !self
            .recipes
            .delete(recipe)
            .await
            .map_err(map_recipe_error)?
        {
            return Err(Error::not_found("recipe not found"));
        }
        info!(recipe_id = %recipe, user_id = %actor.id(), "recipe deleted");
        Ok(())
    }
}

#[async_trait]
impl<U, G, R> RecipeQuery for RecipeService<U, G, R>
where
    U: UserRepository,
    G: GroupRepository,
    R: RecipeRepository,
{
    async fn list(&self, viewer: &UserId, filter: RecipeFilter) -> Result<Vec<Recipe>, Error> {
        let actor = resolve_actor(self.users.as_ref(), viewer).await?;
        let groups: HashMap<GroupId, Group> = self
            .groups
            .list_all()
            .await
            .map_err(map_group_error)?
            .into_iter()
            .map(|group| (group.id().clone(), group))
            .collect();
        let recipes = self
            .recipes
            .list_all()
            .await
            .map_err(map_recipe_error)?;

        Ok(recipes
            .into_iter()
            .filter(|recipe| filter.matches(recipe))
            .filter(|recipe| {
                let group = recipe.group().and_then(|id| groups.get(id));
                recipe_listed_for(&actor, recipe, group)
            })
            .collect())
    }

    async fn get(&self, viewer: &UserId, recipe: &RecipeId) -> Result<Recipe, Error> {
        let actor = resolve_actor(self.users.as_ref(), viewer).await?;
        self.load_for(&actor, recipe, RecipeAction::View).await
    }
}
