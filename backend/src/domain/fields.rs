//! Field-level validation shared by the cookbook aggregates.
//!
//! Each failure names the offending field and a stable code so adapters can
//! point users at the input that needs fixing.

use std::fmt;

use url::Url;

use super::Error;

/// Reason a single field failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldIssue {
    Missing,
    TooShort { min: usize },
    TooLong { max: usize },
    TooFew { min: usize },
    TooMany { max: usize },
    BelowMinimum { min: u32 },
    AboveMaximum { max: u32 },
    Malformed { expected: &'static str },
}

impl FieldIssue {
    fn code(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::TooShort { .. } => "too_short",
            Self::TooLong { .. } => "too_long",
            Self::TooFew { .. } => "too_few",
            Self::TooMany { .. } => "too_many",
            Self::BelowMinimum { .. } => "below_minimum",
            Self::AboveMaximum { .. } => "above_maximum",
            Self::Malformed { .. } => "malformed",
        }
    }
}

/// Validation failure for one named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    field: &'static str,
    issue: FieldIssue,
}

impl FieldError {
    pub fn new(field: &'static str, issue: FieldIssue) -> Self {
        Self { field, issue }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn issue(&self) -> &FieldIssue {
        &self.issue
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field;
        match &self.issue {
            FieldIssue::Missing => write!(f, "{field} is required"),
            FieldIssue::TooShort { min } => {
                write!(f, "{field} must be at least {min} characters")
            }
            FieldIssue::TooLong { max } => write!(f, "{field} must be at most {max} characters"),
            FieldIssue::TooFew { min } => write!(f, "{field} must contain at least {min} entries"),
            FieldIssue::TooMany { max } => write!(f, "{field} must contain at most {max} entries"),
            FieldIssue::BelowMinimum { min } => write!(f, "{field} must be at least {min}"),
            FieldIssue::AboveMaximum { max } => write!(f, "{field} must be at most {max}"),
            FieldIssue::Malformed { expected } => write!(f, "{field} must be {expected}"),
        }
    }
}

impl std::error::Error for FieldError {}

impl From<FieldError> for Error {
    fn from(value: FieldError) -> Self {
        Error::validation(value.field, value.issue.code(), value.to_string())
    }
}

/// Trim `raw` and check its character count lies within `min..=max`.
pub(crate) fn bounded_text(
    field: &'static str,
    raw: &str,
    min: usize,
    max: usize,
) -> Result<String, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new(field, FieldIssue::Missing));
    }
    let length = trimmed.chars().count();
    if length < min {
        return Err(FieldError::new(field, FieldIssue::TooShort { min }));
    }
    if length > max {
        return Err(FieldError::new(field, FieldIssue::TooLong { max }));
    }
    Ok(trimmed.to_owned())
}

/// Absolute `http`/`https` URL used for group, recipe and profile images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrl(String);

impl ImageUrl {
    pub fn parse(field: &'static str, raw: &str) -> Result<Self, FieldError> {
        let malformed = || FieldError::new(field, FieldIssue::Malformed { expected: "an http(s) URL" });
        let parsed = Url::parse(raw.trim()).map_err(|_| malformed())?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(malformed());
        }
        Ok(Self(parsed.into()))
    }

    /// Parse an optional URL, treating blank input as absent.
    pub fn parse_optional(field: &'static str, raw: Option<&str>) -> Result<Option<Self>, FieldError> {
        match raw.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => Self::parse(field, value).map(Some),
            None => Ok(None),
        }
    }
}

impl AsRef<str> for ImageUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ImageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
