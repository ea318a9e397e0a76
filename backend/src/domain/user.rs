//! User account data model.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::fields::{FieldError, FieldIssue, ImageUrl, bounded_text};
use super::{GroupId, UserId};

/// Minimum allowed length for a user name.
pub const USER_NAME_MIN: usize = 2;
/// Maximum allowed length for a user name.
pub const USER_NAME_MAX: usize = 50;
/// Maximum allowed length for a profile biography.
pub const BIO_MAX: usize = 300;

/// Name shown next to recipes and group memberships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserName(String);

impl UserName {
    pub fn new(raw: &str) -> Result<Self, FieldError> {
        bounded_text("name", raw, USER_NAME_MIN, USER_NAME_MAX).map(Self)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Lower-cased e-mail address used as the login identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    pub fn new(raw: &str) -> Result<Self, FieldError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(FieldError::new("email", FieldIssue::Missing));
        }
        if !email_regex().is_match(&normalized) {
            return Err(FieldError::new(
                "email",
                FieldIssue::Malformed {
                    expected: "a valid e-mail address",
                },
            ));
        }
        Ok(Self(normalized))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// System-wide role. Admins moderate content and bypass group permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Member,
    Admin,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "member" => Some(Self::Member),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Editable profile fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: UserName,
    pub bio: Option<String>,
    pub profile_picture: Option<ImageUrl>,
}

impl Profile {
    /// Validate raw profile input.
    pub fn try_from_parts(
        name: &str,
        bio: Option<&str>,
        profile_picture: Option<&str>,
    ) -> Result<Self, FieldError> {
        let name = UserName::new(name)?;
        let bio = match bio.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) if value.chars().count() > BIO_MAX => {
                return Err(FieldError::new("bio", FieldIssue::TooLong { max: BIO_MAX }));
            }
            other => other.map(str::to_owned),
        };
        let profile_picture = ImageUrl::parse_optional("profilePicture", profile_picture)?;
        Ok(Self {
            name,
            bio,
            profile_picture,
        })
    }
}

/// Registered account.
///
/// ## Invariants
/// - `email` is unique across users; the store enforces it.
/// - `groups` holds each group id at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: Email,
    role: UserRole,
    profile: Profile,
    groups: Vec<GroupId>,
    created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        id: UserId,
        email: Email,
        role: UserRole,
        profile: Profile,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            role,
            profile,
            groups: Vec::new(),
            created_at,
        }
    }

    /// Replace the group index, dropping duplicates while keeping order.
    pub fn with_groups(mut self, groups: impl IntoIterator<Item = GroupId>) -> Self {
        self.groups.clear();
        for group in groups {
            self.add_group(group);
        }
        self
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn name(&self) -> &UserName {
        &self.profile.name
    }

    pub fn groups(&self) -> &[GroupId] {
        &self.groups
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn set_profile(&mut self, profile: Profile) {
        self.profile = profile;
    }

    /// Record membership of `group`. Returns `false` when already present.
    pub fn add_group(&mut self, group: GroupId) -> bool {
        if self.groups.contains(&group) {
            return false;
        }
        self.groups.push(group);
        true
    }

    /// Forget membership of `group`. Returns `false` when it was absent.
    pub fn remove_group(&mut self, group: &GroupId) -> bool {
        let before = self.groups.len();
        self.groups.retain(|candidate| candidate != group);
        before != self.groups.len()
    }
}
