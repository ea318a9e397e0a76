//! Recipe aggregate.
//!
//! A recipe is owned by its author. It may be attached to a group, in which
//! case the group's roster also decides who can read it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::fields::{FieldError, FieldIssue, ImageUrl, bounded_text};
use super::moderation::{Moderated, ModerationState};
use super::{Actor, GroupId, RecipeId, UserId};

pub const RECIPE_TITLE_MIN: usize = 3;
pub const RECIPE_TITLE_MAX: usize = 100;
pub const RECIPE_DESCRIPTION_MIN: usize = 10;
pub const RECIPE_DESCRIPTION_MAX: usize = 500;
pub const MAX_INGREDIENTS: usize = 50;
pub const MAX_STEPS: usize = 50;
pub const MAX_TAGS: usize = 20;
pub const TAG_MAX: usize = 30;
/// Upper bound for prep and cook times: one week in minutes.
pub const MAX_MINUTES: u32 = 10_080;
pub const MAX_SERVINGS: u32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Breakfast,
    Lunch,
    Dinner,
    Dessert,
    Snack,
    Drink,
    Other,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Dessert => "dessert",
            Self::Snack => "snack",
            Self::Drink => "drink",
            Self::Other => "other",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        [
            Self::Breakfast,
            Self::Lunch,
            Self::Dinner,
            Self::Dessert,
            Self::Snack,
            Self::Drink,
            Self::Other,
        ]
        .into_iter()
        .find(|candidate| candidate.as_str() == raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Ingredient {
    #[schema(example = "Flour")]
    pub name: String,
    #[schema(example = "200")]
    pub quantity: String,
    #[schema(example = "g")]
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Step {
    #[schema(example = 1)]
    pub number: u32,
    #[schema(example = "Preheat the oven to 180C.")]
    pub description: String,
}

/// Unvalidated recipe content as supplied by a client.
#[derive(Debug, Clone, Default)]
pub struct RecipeFields {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<Step>,
    pub prep_time: u32,
    pub cook_time: u32,
    pub servings: u32,
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    pub tags: Vec<String>,
    pub image: Option<String>,
    pub group: Option<GroupId>,
    pub is_private: bool,
}

/// Validated recipe content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeContent {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<Step>,
    pub prep_time: u32,
    pub cook_time: u32,
    pub servings: u32,
    pub category: Category,
    pub difficulty: Difficulty,
    pub tags: Vec<String>,
    pub image: Option<ImageUrl>,
    pub group: Option<GroupId>,
    pub is_private: bool,
}

fn clean_ingredients(raw: Vec<Ingredient>) -> Result<Vec<Ingredient>, FieldError> {
    if raw.is_empty() {
        return Err(FieldError::new("ingredients", FieldIssue::TooFew { min: 1 }));
    }
    if raw.len() > MAX_INGREDIENTS {
        return Err(FieldError::new(
            "ingredients",
            FieldIssue::TooMany {
                max: MAX_INGREDIENTS,
            },
        ));
    }
    raw.into_iter()
        .map(|ingredient| {
            let name = ingredient.name.trim();
            if name.is_empty() {
                return Err(FieldError::new("ingredients.name", FieldIssue::Missing));
            }
            Ok(Ingredient {
                name: name.to_owned(),
                quantity: ingredient.quantity.trim().to_owned(),
                unit: ingredient.unit.trim().to_owned(),
            })
        })
        .collect()
}

fn clean_steps(raw: Vec<Step>) -> Result<Vec<Step>, FieldError> {
    if raw.is_empty() {
        return Err(FieldError::new("steps", FieldIssue::TooFew { min: 1 }));
    }
    if raw.len() > MAX_STEPS {
        return Err(FieldError::new("steps", FieldIssue::TooMany { max: MAX_STEPS }));
    }
    raw.into_iter()
        .zip(1_u32..)
        .map(|(step, expected)| {
            if step.number != expected {
                return Err(FieldError::new(
                    "steps.number",
                    FieldIssue::Malformed {
                        expected: "numbered consecutively from 1",
                    },
                ));
            }
            let description = step.description.trim();
            if description.is_empty() {
                return Err(FieldError::new("steps.description", FieldIssue::Missing));
            }
            Ok(Step {
                number: step.number,
                description: description.to_owned(),
            })
        })
        .collect()
}

fn within(field: &'static str, value: u32, min: u32, max: u32) -> Result<(), FieldError> {
    if value < min {
        return Err(FieldError::new(field, FieldIssue::BelowMinimum { min }));
    }
    if value > max {
        return Err(FieldError::new(field, FieldIssue::AboveMaximum { max }));
    }
    Ok(())
}

fn clean_tags(raw: Vec<String>) -> Result<Vec<String>, FieldError> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw {
        let normalized = tag.trim().to_lowercase();
        if normalized.is_empty() || tags.contains(&normalized) {
            continue;
        }
        if normalized.chars().count() > TAG_MAX {
            return Err(FieldError::new("tags", FieldIssue::TooLong { max: TAG_MAX }));
        }
        tags.push(normalized);
    }
    if tags.len() > MAX_TAGS {
        return Err(FieldError::new("tags", FieldIssue::TooMany { max: MAX_TAGS }));
    }
    Ok(tags)
}

impl TryFrom<RecipeFields> for RecipeContent {
    type Error = FieldError;

    fn try_from(fields: RecipeFields) -> Result<Self, Self::Error> {
        let title = bounded_text("title", &fields.title, RECIPE_TITLE_MIN, RECIPE_TITLE_MAX)?;
        let description = bounded_text(
            "description",
            &fields.description,
            RECIPE_DESCRIPTION_MIN,
            RECIPE_DESCRIPTION_MAX,
        )?;
        within("prepTime", fields.prep_time, 1, MAX_MINUTES)?;
        within("cookTime", fields.cook_time, 0, MAX_MINUTES)?;
        within("servings", fields.servings, 1, MAX_SERVINGS)?;
        let category = fields
            .category
            .ok_or_else(|| FieldError::new("category", FieldIssue::Missing))?;
        let difficulty = fields
            .difficulty
            .ok_or_else(|| FieldError::new("difficulty", FieldIssue::Missing))?;

        Ok(Self {
            title,
            description,
            ingredients: clean_ingredients(fields.ingredients)?,
            steps: clean_steps(fields.steps)?,
            prep_time: fields.prep_time,
            cook_time: fields.cook_time,
            servings: fields.servings,
            category,
            difficulty,
            tags: clean_tags(fields.tags)?,
            image: ImageUrl::parse_optional("image", fields.image.as_deref())?,
            group: fields.group,
            is_private: fields.is_private,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    id: RecipeId,
    content: RecipeContent,
    author: UserId,
    moderation: ModerationState,
    revision: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Recipe {
    pub fn create(id: RecipeId, content: RecipeContent, author: &Actor, now: DateTime<Utc>) -> Self {
        Self {
            id,
            content,
            author: author.id().clone(),
            moderation: ModerationState::initial(author, now),
            revision: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &RecipeId {
        &self.id
    }

    pub fn content(&self) -> &RecipeContent {
        &self.content
    }

    pub fn title(&self) -> &str {
        self.content.title.as_str()
    }

    pub fn author(&self) -> &UserId {
        &self.author
    }

    pub fn group(&self) -> Option<&GroupId> {
        self.content.group.as_ref()
    }

    pub fn is_private(&self) -> bool {
        self.content.is_private
    }

    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replace the editable content. Author and moderation state are kept.
    pub fn update_content(&mut self, content: RecipeContent) {
        self.content = content;
    }

    /// Drop the reference to a deleted group.
    pub fn detach_group(&mut self) {
        self.content.group = None;
    }

    /// Bump the revision ahead of a write and return the revision the store
    /// must still hold.
    pub fn advance_revision(&mut self, now: DateTime<Utc>) -> u32 {
        let expected = self.revision;
        self.revision = expected.saturating_add(1);
        self.updated_at = now;
        expected
    }
}

impl Moderated for Recipe {
    fn moderation(&self) -> &ModerationState {
        &self.moderation
    }

    fn set_moderation(&mut self, state: ModerationState) {
        self.moderation = state;
    }
}

/// Raw recipe state as stored by persistence adapters.
#[derive(Debug, Clone)]
pub struct RecipeRecord {
    pub id: RecipeId,
    pub content: RecipeContent,
    pub author: UserId,
    pub moderation: ModerationState,
    pub revision: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RecipeRecord> for Recipe {
    fn from(record: RecipeRecord) -> Self {
        Self {
            id: record.id,
            content: record.content,
            author: record.author,
            moderation: record.moderation,
            revision: record.revision,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<&Recipe> for RecipeRecord {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id.clone(),
            content: recipe.content.clone(),
            author: recipe.author.clone(),
            moderation: recipe.moderation.clone(),
            revision: recipe.revision,
            created_at: recipe.created_at,
            updated_at: recipe.updated_at,
        }
    }
}

#[cfg(test)]
mod tests;
