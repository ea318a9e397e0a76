//! Request and response payloads for the recipe endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Category, Difficulty, Error, Ingredient, Moderated, Recipe, RecipeContent, RecipeFields,
    RecipeFilter, SearchQuery, Step,
};
use crate::inbound::http::moderation::ModerationFields;
use crate::inbound::http::validation::{
    FieldName, parse_category, parse_difficulty, parse_group_id,
};

/// Body for creating or replacing a recipe.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRequest {
    #[schema(example = "Weeknight lasagne")]
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub prep_time: u32,
    #[serde(default)]
    pub cook_time: u32,
    #[serde(default)]
    pub servings: u32,
    #[serde(default)]
    #[schema(value_type = Option<Category>)]
    pub category: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Difficulty>)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    #[schema(format = "uuid")]
    pub group: Option<String>,
    #[serde(default)]
    pub is_private: bool,
}

impl TryFrom<RecipeRequest> for RecipeContent {
    type Error = Error;

    fn try_from(value: RecipeRequest) -> Result<Self, Self::Error> {
        let category = value.category.as_deref().map(parse_category).transpose()?;
        let difficulty = value
            .difficulty
            .as_deref()
            .map(parse_difficulty)
            .transpose()?;
        let group = value
            .group
            .as_deref()
            .map(|raw| parse_group_id(raw, FieldName::new("group")))
            .transpose()?;
        let fields = RecipeFields {
            title: value.title,
            description: value.description,
            ingredients: value.ingredients,
            steps: value.steps,
            prep_time: value.prep_time,
            cook_time: value.cook_time,
            servings: value.servings,
            category,
            difficulty,
            tags: value.tags,
            image: value.image,
            group,
            is_private: value.is_private,
        };
        RecipeContent::try_from(fields).map_err(Error::from)
    }
}

/// Query string accepted by `GET /api/v1/recipes`.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeListQuery {
    /// Case-insensitive title substring.
    pub q: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    /// Restrict to recipes shared with this group.
    pub group: Option<String>,
}

impl TryFrom<RecipeListQuery> for RecipeFilter {
    type Error = Error;

    fn try_from(value: RecipeListQuery) -> Result<Self, Self::Error> {
        let query = value
            .q
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(SearchQuery::new)
            .transpose()?;
        Ok(Self {
            query,
            category: value.category.as_deref().map(parse_category).transpose()?,
            difficulty: value
                .difficulty
                .as_deref()
                .map(parse_difficulty)
                .transpose()?,
            group: value
                .group
                .as_deref()
                .map(|raw| parse_group_id(raw, FieldName::new("group")))
                .transpose()?,
        })
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResponse {
    #[schema(format = "uuid")]
    pub id: String,
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
    pub image: Option<String>,
    #[schema(format = "uuid")]
    pub author: String,
    #[schema(format = "uuid")]
    pub group: Option<String>,
    pub is_private: bool,
    #[serde(flatten)]
    pub moderation: ModerationFields,
    pub revision: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Recipe> for RecipeResponse {
    fn from(recipe: Recipe) -> Self {
        let moderation = ModerationFields::from(recipe.moderation());
        let content = recipe.content();
        Self {
            id: recipe.id().to_string(),
            title: content.title.clone(),
            description: content.description.clone(),
            ingredients: content.ingredients.clone(),
            steps: content.steps.clone(),
            prep_time: content.prep_time,
            cook_time: content.cook_time,
            servings: content.servings,
            category: content.category,
            difficulty: content.difficulty,
            tags: content.tags.clone(),
            image: content.image.as_ref().map(ToString::to_string),
            author: recipe.author().to_string(),
            group: recipe.group().map(ToString::to_string),
            is_private: content.is_private,
            moderation,
            revision: recipe.revision(),
            created_at: recipe.created_at(),
            updated_at: recipe.updated_at(),
        }
    }
}
