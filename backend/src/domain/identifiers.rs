//! UUID-backed identifiers for the cookbook aggregates.
//!
//! Each identifier keeps the parsed UUID alongside its canonical string so it
//! can be borrowed as `&str` without re-formatting.

use std::fmt;

use uuid::Uuid;

/// Errors raised when parsing an identifier from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    Empty { kind: &'static str },
    Invalid { kind: &'static str },
}

impl fmt::Display for IdentifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { kind } => write!(f, "{kind} id must not be empty"),
            Self::Invalid { kind } => write!(f, "{kind} id must be a valid UUID"),
        }
    }
}

impl std::error::Error for IdentifierError {}

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Uuid, String);

        impl $name {
            /// Validate and construct the identifier from borrowed input.
            pub fn new(id: impl AsRef<str>) -> Result<Self, IdentifierError> {
                Self::from_owned(id.as_ref().to_owned())
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self::from_uuid(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid, uuid.to_string())
            }

            fn from_owned(id: String) -> Result<Self, IdentifierError> {
                if id.is_empty() {
                    return Err(IdentifierError::Empty { kind: $kind });
                }
                if id.trim() != id {
                    return Err(IdentifierError::Invalid { kind: $kind });
                }
                let parsed =
                    Uuid::parse_str(&id).map_err(|_| IdentifierError::Invalid { kind: $kind })?;
                Ok(Self(parsed, id))
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.1.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_ref())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.1
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::from_owned(value)
            }
        }
    };
}

uuid_identifier!(
    /// Stable user identifier.
    UserId,
    "user"
);
uuid_identifier!(
    /// Stable group identifier.
    GroupId,
    "group"
);
uuid_identifier!(
    /// Stable recipe identifier.
    RecipeId,
    "recipe"
);
