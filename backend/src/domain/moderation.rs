//! Moderation state shared by groups and recipes.
//!
//! Content starts `Pending` unless an admin created it. Admins move it to
//! `Approved` or `Rejected`; nothing moves it back to `Pending`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Actor, Error, UserId};

/// Reason recorded when an admin rejects content without giving one.
pub const DEFAULT_REJECTION_REASON: &str = "Does not comply with the platform policies";

/// Flat status tag used by listings and storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ModerationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Moderation outcome with the moderator stamp carried by each decided state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationState {
    Pending,
    Approved {
        by: UserId,
        at: DateTime<Utc>,
    },
    Rejected {
        by: UserId,
        at: DateTime<Utc>,
        reason: String,
    },
}

/// Stored moderation columns that do not describe a valid state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("inconsistent moderation record: {0}")]
pub struct ModerationRecordError(&'static str);

impl ModerationState {
    /// State for freshly created content.
    ///
    /// Admin-created content is approved on the spot and stamped with the
    /// creating admin.
    pub fn initial(creator: &Actor, now: DateTime<Utc>) -> Self {
        if creator.is_admin() {
            Self::Approved {
                by: creator.id().clone(),
                at: now,
            }
        } else {
            Self::Pending
        }
    }

    pub fn status(&self) -> ModerationStatus {
        match self {
            Self::Pending => ModerationStatus::Pending,
            Self::Approved { .. } => ModerationStatus::Approved,
            Self::Rejected { .. } => ModerationStatus::Rejected,
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved { .. })
    }

    pub fn moderated_by(&self) -> Option<&UserId> {
        match self {
            Self::Pending => None,
            Self::Approved { by, .. } | Self::Rejected { by, .. } => Some(by),
        }
    }

    pub fn moderated_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Pending => None,
            Self::Approved { at, .. } | Self::Rejected { at, .. } => Some(*at),
        }
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            Self::Rejected { reason, .. } => Some(reason.as_str()),
            _ => None,
        }
    }

    /// Rebuild a state from its flattened storage columns.
    pub fn from_parts(
        status: ModerationStatus,
        moderated_by: Option<UserId>,
        moderated_at: Option<DateTime<Utc>>,
        rejection_reason: Option<String>,
    ) -> Result<Self, ModerationRecordError> {
        match (status, moderated_by, moderated_at) {
            (ModerationStatus::Pending, _, _) => Ok(Self::Pending),
            (ModerationStatus::Approved, Some(by), Some(at)) => Ok(Self::Approved { by, at }),
            (ModerationStatus::Rejected, Some(by), Some(at)) => Ok(Self::Rejected {
                by,
                at,
                reason: rejection_reason.unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_owned()),
            }),
            _ => Err(ModerationRecordError("decided state lacks moderator stamp")),
        }
    }
}

fn require_admin(moderator: &Actor) -> Result<(), Error> {
    if moderator.is_admin() {
        Ok(())
    } else {
        Err(Error::forbidden("only administrators can moderate content"))
    }
}

/// Content that passes through the moderation gate.
pub trait Moderated {
    fn moderation(&self) -> &ModerationState;

    fn set_moderation(&mut self, state: ModerationState);

    /// Approve the content, clearing any earlier rejection reason.
    fn approve(&mut self, moderator: &Actor, now: DateTime<Utc>) -> Result<(), Error> {
        require_admin(moderator)?;
        self.set_moderation(ModerationState::Approved {
            by: moderator.id().clone(),
            at: now,
        });
        Ok(())
    }

    /// Reject the content. A missing or blank reason falls back to
    /// [`DEFAULT_REJECTION_REASON`].
    fn reject(
        &mut self,
        moderator: &Actor,
        reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        require_admin(moderator)?;
        let reason = reason
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_REJECTION_REASON)
            .to_owned();
        self.set_moderation(ModerationState::Rejected {
            by: moderator.id().clone(),
            at: now,
            reason,
        });
        Ok(())
    }
}
