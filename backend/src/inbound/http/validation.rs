//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{
    Category, Difficulty, Error, GroupId, IdentifierError, InviteCode, RecipeId, UserId,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn invalid(field: FieldName, code: ErrorCode, message: String, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

fn parse_identifier<T>(
    raw: &str,
    field: FieldName,
    parse: impl FnOnce(&str) -> Result<T, IdentifierError>,
) -> Result<T, Error> {
    parse(raw).map_err(|_| {
        invalid(
            field,
            ErrorCode::InvalidUuid,
            format!("{} must be a valid UUID", field.as_str()),
            raw,
        )
    })
}

pub(crate) fn parse_user_id(raw: &str, field: FieldName) -> Result<UserId, Error> {
    parse_identifier(raw, field, |value| UserId::new(value))
}

pub(crate) fn parse_group_id(raw: &str, field: FieldName) -> Result<GroupId, Error> {
    parse_identifier(raw, field, |value| GroupId::new(value))
}

pub(crate) fn parse_recipe_id(raw: &str, field: FieldName) -> Result<RecipeId, Error> {
    parse_identifier(raw, field, |value| RecipeId::new(value))
}

pub(crate) fn parse_invite_code(raw: &str) -> Result<InviteCode, Error> {
    InviteCode::parse(raw).map_err(Error::from)
}

pub(crate) fn parse_category(raw: &str) -> Result<Category, Error> {
    Category::parse(raw.trim()).ok_or_else(|| {
        invalid(
            FieldName::new("category"),
            ErrorCode::InvalidValue,
            format!("unknown category: {raw}"),
            raw,
        )
    })
}

pub(crate) fn parse_difficulty(raw: &str) -> Result<Difficulty, Error> {
    Difficulty::parse(raw.trim()).ok_or_else(|| {
        invalid(
            FieldName::new("difficulty"),
            ErrorCode::InvalidValue,
            format!("unknown difficulty: {raw}"),
            raw,
        )
    })
}
