//! Internal Diesel row structs and their translation to domain aggregates.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Reads go through the domain's validating
//! constructors, so a row that no longer satisfies the aggregate invariants
//! surfaces as a corrupt-record error instead of a half-built entity.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Category, Difficulty, Email, Group, GroupId, GroupRecord, Ingredient, JoinRequest, Membership,
    ModerationState, ModerationStatus, PasswordHash, Profile, Recipe, RecipeContent, RecipeFields,
    RecipeId, RecipeRecord, Step, User, UserId, UserRole,
};

use super::diesel_helpers::{cast_revision, cast_revision_for_db};
use super::schema::{groups, recipes, users};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub name: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub group_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub name: &'a str,
    pub bio: Option<&'a str>,
    pub profile_picture: Option<&'a str>,
    pub group_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewUserRow<'a> {
    pub fn new(user: &'a User, hash: &'a PasswordHash) -> Self {
        Self {
            id: *user.id().as_uuid(),
            email: user.email().as_ref(),
            password_hash: hash.as_str(),
            role: user.role().as_str(),
            name: user.name().as_ref(),
            bio: user.profile().bio.as_deref(),
            profile_picture: user.profile().profile_picture.as_ref().map(AsRef::as_ref),
            group_ids: user.groups().iter().map(|id| *id.as_uuid()).collect(),
            created_at: user.created_at(),
            updated_at: user.created_at(),
        }
    }
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProfileUpdate<'a> {
    pub name: &'a str,
    pub bio: Option<&'a str>,
    pub profile_picture: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> ProfileUpdate<'a> {
    pub fn new(profile: &'a Profile, updated_at: DateTime<Utc>) -> Self {
        Self {
            name: profile.name.as_ref(),
            bio: profile.bio.as_deref(),
            profile_picture: profile.profile_picture.as_ref().map(AsRef::as_ref),
            updated_at,
        }
    }
}

impl UserRow {
    /// Rebuild the domain user, reporting the first invalid column.
    pub fn into_user(self) -> Result<(User, PasswordHash), String> {
        let email = Email::new(&self.email).map_err(|err| err.to_string())?;
        let role = UserRole::parse(&self.role).ok_or_else(|| format!("unknown role {}", self.role))?;
        let profile = Profile::try_from_parts(
            &self.name,
            self.bio.as_deref(),
            self.profile_picture.as_deref(),
        )
        .map_err(|err| err.to_string())?;
        let user = User::new(
            UserId::from_uuid(self.id),
            email,
            role,
            profile,
            self.created_at,
        )
        .with_groups(self.group_ids.into_iter().map(GroupId::from_uuid));
        Ok((user, PasswordHash::new(self.password_hash)))
    }
}

// ---------------------------------------------------------------------------
// Moderation columns shared by groups and recipes
// ---------------------------------------------------------------------------

struct ModerationColumns {
    status: &'static str,
    moderated_by: Option<Uuid>,
    moderated_at: Option<DateTime<Utc>>,
    rejection_reason: Option<String>,
}

fn flatten_moderation(state: &ModerationState) -> ModerationColumns {
    ModerationColumns {
        status: state.status().as_str(),
        moderated_by: state.moderated_by().map(|id| *id.as_uuid()),
        moderated_at: state.moderated_at(),
        rejection_reason: state.rejection_reason().map(str::to_owned),
    }
}

fn rebuild_moderation(
    status: &str,
    moderated_by: Option<Uuid>,
    moderated_at: Option<DateTime<Utc>>,
    rejection_reason: Option<String>,
) -> Result<ModerationState, String> {
    let status =
        ModerationStatus::parse(status).ok_or_else(|| format!("unknown moderation status {status}"))?;
    ModerationState::from_parts(
        status,
        moderated_by.map(UserId::from_uuid),
        moderated_at,
        rejection_reason,
    )
    .map_err(|err| err.to_string())
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct GroupRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub is_private: bool,
    pub invite_code: String,
    pub creator_id: Uuid,
    pub members: serde_json::Value,
    pub pending_requests: serde_json::Value,
    pub moderation_status: String,
    pub moderated_by: Option<Uuid>,
    pub moderated_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GroupRow {
    pub fn from_group(group: &Group) -> Result<Self, String> {
        let record = GroupRecord::from(group);
        let moderation = flatten_moderation(&record.moderation);
        Ok(Self {
            id: *record.id.as_uuid(),
            name: record.name,
            description: record.description,
            image: record.image,
            is_private: record.is_private,
            invite_code: record.invite_code,
            creator_id: *record.creator.as_uuid(),
            members: serde_json::to_value(&record.members).map_err(|err| err.to_string())?,
            pending_requests: serde_json::to_value(&record.pending_requests)
                .map_err(|err| err.to_string())?,
            moderation_status: moderation.status.to_owned(),
            moderated_by: moderation.moderated_by,
            moderated_at: moderation.moderated_at,
            rejection_reason: moderation.rejection_reason,
            revision: cast_revision_for_db(record.revision),
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    pub fn into_group(self) -> Result<Group, String> {
        let members: Vec<Membership> =
            serde_json::from_value(self.members).map_err(|err| format!("members: {err}"))?;
        let pending_requests: Vec<JoinRequest> = serde_json::from_value(self.pending_requests)
            .map_err(|err| format!("pending requests: {err}"))?;
        let moderation = rebuild_moderation(
            &self.moderation_status,
            self.moderated_by,
            self.moderated_at,
            self.rejection_reason,
        )?;
        Group::try_from(GroupRecord {
            id: GroupId::from_uuid(self.id),
            name: self.name,
            description: self.description,
            image: self.image,
            is_private: self.is_private,
            invite_code: self.invite_code,
            creator: UserId::from_uuid(self.creator_id),
            members,
            pending_requests,
            moderation,
            revision: cast_revision(self.revision),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
        .map_err(|err| err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Recipes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct RecipeRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub ingredients: serde_json::Value,
    pub steps: serde_json::Value,
    pub prep_time: i32,
    pub cook_time: i32,
    pub servings: i32,
    pub category: String,
    pub difficulty: String,
    pub tags: Vec<String>,
    pub image: Option<String>,
    pub is_private: bool,
    pub moderation_status: String,
    pub moderated_by: Option<Uuid>,
    pub moderated_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn count_for_db(value: u32) -> Result<i32, String> {
    i32::try_from(value).map_err(|_| format!("{value} does not fit the column"))
}

fn count_from_db(value: i32) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("negative count {value}"))
}

impl RecipeRow {
    pub fn from_recipe(recipe: &Recipe) -> Result<Self, String> {
        let RecipeRecord {
            id,
            content,
            author,
            moderation,
            revision,
            created_at,
            updated_at,
        } = RecipeRecord::from(recipe);
        let moderation = flatten_moderation(&moderation);
        Ok(Self {
            id: *id.as_uuid(),
            author_id: *author.as_uuid(),
            group_id: content.group.as_ref().map(|group| *group.as_uuid()),
            title: content.title,
            description: content.description,
            ingredients: serde_json::to_value(&content.ingredients)
                .map_err(|err| err.to_string())?,
            steps: serde_json::to_value(&content.steps).map_err(|err| err.to_string())?,
            prep_time: count_for_db(content.prep_time)?,
            cook_time: count_for_db(content.cook_time)?,
            servings: count_for_db(content.servings)?,
            category: content.category.as_str().to_owned(),
            difficulty: content.difficulty.as_str().to_owned(),
            tags: content.tags,
            image: content.image.as_ref().map(ToString::to_string),
            is_private: content.is_private,
            moderation_status: moderation.status.to_owned(),
            moderated_by: moderation.moderated_by,
            moderated_at: moderation.moderated_at,
            rejection_reason: moderation.rejection_reason,
            revision: cast_revision_for_db(revision),
            created_at,
            updated_at,
        })
    }

    pub fn into_recipe(self) -> Result<Recipe, String> {
        let ingredients: Vec<Ingredient> =
            serde_json::from_value(self.ingredients).map_err(|err| format!("ingredients: {err}"))?;
        let steps: Vec<Step> =
            serde_json::from_value(self.steps).map_err(|err| format!("steps: {err}"))?;
        let category = Category::parse(&self.category)
            .ok_or_else(|| format!("unknown category {}", self.category))?;
        let difficulty = Difficulty::parse(&self.difficulty)
            .ok_or_else(|| format!("unknown difficulty {}", self.difficulty))?;
        let content = RecipeContent::try_from(RecipeFields {
            title: self.title,
            description: self.description,
            ingredients,
            steps,
            prep_time: count_from_db(self.prep_time)?,
            cook_time: count_from_db(self.cook_time)?,
            servings: count_from_db(self.servings)?,
            category: Some(category),
            difficulty: Some(difficulty),
            tags: self.tags,
            image: self.image,
            group: self.group_id.map(GroupId::from_uuid),
            is_private: self.is_private,
        })
        .map_err(|err| err.to_string())?;
        let moderation = rebuild_moderation(
            &self.moderation_status,
            self.moderated_by,
            self.moderated_at,
            self.rejection_reason,
        )?;

        Ok(Recipe::from(RecipeRecord {
            id: RecipeId::from_uuid(self.id),
            content,
            author: UserId::from_uuid(self.author_id),
            moderation,
            revision: cast_revision(self.revision),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }))
    }
}
