//! Admin moderation queues and decisions.
//!
//! Implements [`ModerationCommand`] and [`ModerationQuery`]. Every entry
//! point resolves the caller first and refuses non-admins before touching
//! the queues, so outsiders cannot probe whether an item exists.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::moderation::Moderated;
use super::ports::{
    GroupRepository, ModerationCommand, ModerationCounts, ModerationQuery, RecipeRepository,
    UserRepository,
};
use super::service_support::{
    load_group, load_recipe, map_group_error, map_recipe_error, persist_group, persist_recipe,
    resolve_actor,
};
use super::{Actor, Error, Group, GroupId, Recipe, RecipeId, UserId};

enum Verdict {
    Approve,
    Reject(Option<String>),
}

#[derive(Clone)]
pub struct ModerationService<U, G, R> {
    users: Arc<U>,
    groups: Arc<G>,
    recipes: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<U, G, R> ModerationService<U, G, R> {
    pub fn new(users: Arc<U>, groups: Arc<G>, recipes: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            groups,
            recipes,
            clock,
        }
    }
}

impl<U, G, R> ModerationService<U, G, R>
where
    U: UserRepository,
    G: GroupRepository,
    R: RecipeRepository,
{
    async fn moderator(&self, id: &UserId) -> Result<Actor, Error> {
        let actor = resolve_actor(self.users.as_ref(), id).await?;
        if actor.is_admin() {
            Ok(actor)
        } else {
            Err(Error::forbidden("only administrators can moderate content"))
        }
    }

    async fn decide_group(
        &self,
        actor: &UserId,
        group: &GroupId,
        verdict: Verdict,
    ) -> Result<Group, Error> {
        let moderator = self.moderator(actor).await?;
        let mut group = load_group(self.groups.as_ref(), group).await?;
        let now = self.clock.utc();
        match &verdict {
            Verdict::Approve => group.approve(&moderator, now)?,
            Verdict::Reject(reason) => group.reject(&moderator, reason.as_deref(), now)?,
        }
        persist_group(self.groups.as_ref(), &mut group, now).await?;
        info!(
            group_id = %group.id(),
            moderator = %moderator.id(),
            status = %group.moderation().status(),
            "group moderated"
        );
        Ok(group)
    }

    async fn decide_recipe(
        &self,
        actor: &UserId,
        recipe: &RecipeId,
        verdict: Verdict,
    ) -> Result<Recipe, Error> {
        let moderator = self.moderator(actor).await?;
        let mut recipe = load_recipe(self.recipes.as_ref(), recipe).await?;
        let now = self.clock.utc();
        match &verdict {
            Verdict::Approve => recipe.approve(&moderator, now)?,
            Verdict::Reject(reason) => recipe.reject(&moderator, reason.as_deref(), now)?,
        }
        persist_recipe(self.recipes.as_ref(), &mut recipe, now).await?;
        info!(
            recipe_id = %recipe.id(),
            moderator = %moderator.id(),
            status = %recipe.moderation().status(),
            "recipe moderated"
        );
        Ok(recipe)
    }
}

#[async_trait]
impl<U, G, R> ModerationCommand for ModerationService<U, G, R>
where
    U: UserRepository,
    G: GroupRepository,
    R: RecipeRepository,
{
    async fn approve_group(&self, actor: &UserId, group: &GroupId) -> Result<Group, Error> {
        self.decide_group(actor, group, Verdict::Approve).await
    }

    async fn reject_group(
        &self,
        actor: &UserId,
        group: &GroupId,
        reason: Option<String>,
    ) -> Result<Group, Error> {
        self.decide_group(actor, group, Verdict::Reject(reason)).await
    }

    async fn approve_recipe(&self, actor: &UserId, recipe: &RecipeId) -> Result<Recipe, Error> {
        self.decide_recipe(actor, recipe, Verdict::Approve).await
    }

    async fn reject_recipe(
        &self,
        actor: &UserId,
        recipe: &RecipeId,
        reason: Option<String>,
    ) -> Result<Recipe, Error> {
        self.decide_recipe(actor, recipe, Verdict::Reject(reason)).await
    }
}

#[async_trait]
impl<U, G, R> ModerationQuery for ModerationService<U, G, R>
where
    U: UserRepository,
    G: GroupRepository,
    R: RecipeRepository,
{
    async fn pending_groups(&self, actor: &UserId) -> Result<Vec<Group>, Error> {
        self.moderator(actor).await?;
        self.groups.list_pending().await.map_err(map_group_error)
    }

    async fn pending_recipes(&self, actor: &UserId) -> Result<Vec<Recipe>, Error> {
        self.moderator(actor).await?;
        self.recipes.list_pending().await.map_err(map_recipe_error)
    }

    async fn counts(&self, actor: &UserId) -> Result<ModerationCounts, Error> {
        self.moderator(actor).await?;
        let pending_groups = self
            .groups
            .count_pending()
            .await
            .map_err(map_group_error)?;
        let pending_recipes = self
            .recipes
            .count_pending()
            .await
            .map_err(map_recipe_error)?;
        Ok(ModerationCounts {
            pending_groups,
            pending_recipes,
        })
    }
}
