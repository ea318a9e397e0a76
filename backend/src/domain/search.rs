//! Listing visibility and text search over groups and recipes.

use super::fields::{FieldError, FieldIssue};
use super::moderation::Moderated;
use super::policy::{RecipeAction, evaluate_recipe};
use super::{Actor, Category, Difficulty, Group, GroupId, Recipe};

/// Maximum number of groups returned by a search.
pub const GROUP_SEARCH_LIMIT: usize = 20;

/// Non-empty, case-folded search text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn new(raw: &str) -> Result<Self, FieldError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FieldError::new("q", FieldIssue::Missing));
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// Case-insensitive substring match.
    pub fn matches(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.0)
    }
}

/// Whether `group` shows up in listings and searches for `actor`.
///
/// Admins see everything. Members keep seeing their groups whatever the
/// moderation state. Everyone else sees approved public groups.
pub fn group_listed_for(actor: &Actor, group: &Group) -> bool {
    actor.is_admin()
        || group.is_member(actor.id())
        || (group.moderation().is_approved() && !group.is_private())
}

/// Whether `recipe` shows up in listings for `actor`.
///
/// Authors see their own recipes in any state; everyone else only sees
/// approved recipes they are allowed to read.
pub fn recipe_listed_for(actor: &Actor, recipe: &Recipe, group: Option<&Group>) -> bool {
    if actor.is_admin() || recipe.author() == actor.id() {
        return true;
    }
    recipe.moderation().is_approved()
        && evaluate_recipe(actor, recipe, group, RecipeAction::View).is_allowed()
}

/// Optional filters applied to recipe listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub query: Option<SearchQuery>,
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    pub group: Option<GroupId>,
}

impl RecipeFilter {
    pub fn matches(&self, recipe: &Recipe) -> bool {
        let content = recipe.content();
        self.query.as_ref().is_none_or(|q| q.matches(&content.title))
            && self.category.is_none_or(|category| category == content.category)
            && self
                .difficulty
                .is_none_or(|difficulty| difficulty == content.difficulty)
            && self
                .group
                .as_ref()
                .is_none_or(|group| content.group.as_ref() == Some(group))
    }
}
