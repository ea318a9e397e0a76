//! Group aggregate: details, membership roster, join requests and moderation.
//!
//! Every mutation of the embedded roster happens on a fully loaded `Group`
//! and is persisted in one revision-checked write, so the roster invariants
//! hold no matter how requests interleave.
//!
//! ## Invariants
//! - Exactly one member holds [`MemberRole::Owner`], and it is the creator.
//! - A user appears at most once in `members`, at most once in
//!   `pending_requests`, and never in both.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::fields::{FieldError, FieldIssue, ImageUrl, bounded_text};
use super::moderation::{Moderated, ModerationState};
use super::{Actor, Error, GroupId, UserId};

pub const GROUP_NAME_MIN: usize = 3;
pub const GROUP_NAME_MAX: usize = 50;
pub const GROUP_DESCRIPTION_MIN: usize = 10;
pub const GROUP_DESCRIPTION_MAX: usize = 300;
/// Number of characters in a generated invite code.
pub const INVITE_CODE_LEN: usize = 8;
/// Alphabet invite codes are drawn from.
pub const INVITE_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Shareable code that lets users find and join a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InviteCode(String);

impl InviteCode {
    /// Validate a code supplied by a client or read from storage. Codes are
    /// case-insensitive and stored upper-cased.
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        let normalised = raw.trim().to_ascii_uppercase();
        if normalised.is_empty() {
            return Err(FieldError::new("inviteCode", FieldIssue::Missing));
        }
        let well_formed = normalised.len() == INVITE_CODE_LEN
            && normalised.bytes().all(|byte| INVITE_CODE_ALPHABET.contains(&byte));
        if !well_formed {
            return Err(FieldError::new(
                "inviteCode",
                FieldIssue::Malformed {
                    expected: "8 letters or digits",
                },
            ));
        }
        Ok(Self(normalised))
    }

    /// Build a fresh code. `pick(n)` must return an index below `n`; it is
    /// reduced modulo the alphabet size regardless.
    pub fn generate_with(mut pick: impl FnMut(usize) -> usize) -> Self {
        let code = (0..INVITE_CODE_LEN)
            .map(|_| {
                let index = pick(INVITE_CODE_ALPHABET.len()) % INVITE_CODE_ALPHABET.len();
                char::from(INVITE_CODE_ALPHABET[index])
            })
            .collect();
        Self(code)
    }
}

impl AsRef<str> for InviteCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for InviteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role a member holds inside one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Admin,
    Member,
}

impl MemberRole {
    /// Owners and group admins manage details, requests and roles.
    pub fn can_manage(self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }
}

/// Roles that can be granted through a role change. Ownership is never
/// granted or transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssignableRole {
    Admin,
    Member,
}

impl AssignableRole {
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        match raw.trim() {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            _ => Err(FieldError::new(
                "role",
                FieldIssue::Malformed {
                    expected: "either admin or member",
                },
            )),
        }
    }
}

impl From<AssignableRole> for MemberRole {
    fn from(value: AssignableRole) -> Self {
        match value {
            AssignableRole::Admin => Self::Admin,
            AssignableRole::Member => Self::Member,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub user: UserId,
    pub role: MemberRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub user: UserId,
    pub requested_at: DateTime<Utc>,
}

/// What happened when a user asked to join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JoinOutcome {
    /// Public group: the user is now a member.
    Joined,
    /// Private group: the request awaits a manager's decision.
    Requested,
}

/// Editable descriptive fields of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDetails {
    pub name: String,
    pub description: String,
    pub image: Option<ImageUrl>,
    pub is_private: bool,
}

impl GroupDetails {
    pub fn try_from_parts(
        name: &str,
        description: &str,
        image: Option<&str>,
        is_private: bool,
    ) -> Result<Self, FieldError> {
        Ok(Self {
            name: bounded_text("name", name, GROUP_NAME_MIN, GROUP_NAME_MAX)?,
            description: bounded_text(
                "description",
                description,
                GROUP_DESCRIPTION_MIN,
                GROUP_DESCRIPTION_MAX,
            )?,
            image: ImageUrl::parse_optional("image", image)?,
            is_private,
        })
    }
}

/// Roster violations reported by the membership workflow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MembershipError {
    #[error("user is already a member of this group")]
    AlreadyMember,
    #[error("a join request for this user is already pending")]
    AlreadyRequested,
    #[error("no pending join request for this user")]
    RequestNotFound,
    #[error("user is not a member of this group")]
    MemberNotFound,
    #[error("the group owner cannot be removed or demoted")]
    SoleOwner,
}

impl From<MembershipError> for Error {
    fn from(value: MembershipError) -> Self {
        let message = value.to_string();
        match value {
            MembershipError::AlreadyMember | MembershipError::AlreadyRequested => {
                Error::conflict(message)
            }
            MembershipError::RequestNotFound | MembershipError::MemberNotFound => {
                Error::not_found(message)
            }
            MembershipError::SoleOwner => Error::domain_invariant(message),
        }
    }
}

/// Recipe-sharing group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    id: GroupId,
    details: GroupDetails,
    invite_code: InviteCode,
    creator: UserId,
    members: Vec<Membership>,
    pending_requests: Vec<JoinRequest>,
    moderation: ModerationState,
    revision: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Group {
    /// Create a group owned by `creator`, at revision 1.
    pub fn create(
        id: GroupId,
        details: GroupDetails,
        invite_code: InviteCode,
        creator: &Actor,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            details,
            invite_code,
            creator: creator.id().clone(),
            members: vec![Membership {
                user: creator.id().clone(),
                role: MemberRole::Owner,
            }],
            pending_requests: Vec::new(),
            moderation: ModerationState::initial(creator, now),
            revision: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &GroupId {
        &self.id
    }

    pub fn details(&self) -> &GroupDetails {
        &self.details
    }

    pub fn name(&self) -> &str {
        self.details.name.as_str()
    }

    pub fn is_private(&self) -> bool {
        self.details.is_private
    }

    pub fn invite_code(&self) -> &InviteCode {
        &self.invite_code
    }

    pub fn creator(&self) -> &UserId {
        &self.creator
    }

    pub fn members(&self) -> &[Membership] {
        &self.members
    }

    pub fn pending_requests(&self) -> &[JoinRequest] {
        &self.pending_requests
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

    pub fn member_role(&self, user: &UserId) -> Option<MemberRole> {
        self.members
            .iter()
            .find(|membership| &membership.user == user)
            .map(|membership| membership.role)
    }

    pub fn is_member(&self, user: &UserId) -> bool {
        self.member_role(user).is_some()
    }

    pub fn has_pending_request(&self, user: &UserId) -> bool {
        self.pending_requests.iter().any(|request| &request.user == user)
    }

    /// Bump the revision ahead of a write and return the revision the store
    /// must still hold for the write to succeed.
    pub fn advance_revision(&mut self, now: DateTime<Utc>) -> u32 {
        let expected = self.revision;
        self.revision = expected.saturating_add(1);
        self.updated_at = now;
        expected
    }

    pub fn update_details(&mut self, details: GroupDetails) {
        self.details = details;
    }

    /// Join a public group directly, or queue a request for a private one.
    pub fn request_join(
        &mut self,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> Result<JoinOutcome, MembershipError> {
        if self.is_member(user) {
            return Err(MembershipError::AlreadyMember);
        }
        if self.has_pending_request(user) {
            return Err(MembershipError::AlreadyRequested);
        }
        if self.details.is_private {
            self.pending_requests.push(JoinRequest {
                user: user.clone(),
                requested_at: now,
            });
            Ok(JoinOutcome::Requested)
        } else {
            self.members.push(Membership {
                user: user.clone(),
                role: MemberRole::Member,
            });
            Ok(JoinOutcome::Joined)
        }
    }

    fn take_request(&mut self, user: &UserId) -> Result<JoinRequest, MembershipError> {
        let index = self
            .pending_requests
            .iter()
            .position(|request| &request.user == user)
            .ok_or(MembershipError::RequestNotFound)?;
        Ok(self.pending_requests.remove(index))
    }

    /// Move a pending requester into the roster as a plain member.
    pub fn approve_request(&mut self, user: &UserId) -> Result<(), MembershipError> {
        let request = self.take_request(user)?;
        self.members.push(Membership {
            user: request.user,
            role: MemberRole::Member,
        });
        Ok(())
    }

    pub fn reject_request(&mut self, user: &UserId) -> Result<(), MembershipError> {
        self.take_request(user).map(drop)
    }

    pub fn change_member_role(
        &mut self,
        user: &UserId,
        role: AssignableRole,
    ) -> Result<(), MembershipError> {
        let membership = self
            .members
            .iter_mut()
            .find(|membership| &membership.user == user)
            .ok_or(MembershipError::MemberNotFound)?;
        if membership.role == MemberRole::Owner {
            return Err(MembershipError::SoleOwner);
        }
        membership.role = role.into();
        Ok(())
    }

    pub fn remove_member(&mut self, user: &UserId) -> Result<(), MembershipError> {
        match self.member_role(user) {
            None => Err(MembershipError::MemberNotFound),
            Some(MemberRole::Owner) => Err(MembershipError::SoleOwner),
            Some(_) => {
                self.members.retain(|membership| &membership.user != user);
                Ok(())
            }
        }
    }
}

impl Moderated for Group {
    fn moderation(&self) -> &ModerationState {
        &self.moderation
    }

    fn set_moderation(&mut self, state: ModerationState) {
        self.moderation = state;
    }
}

/// Raw group state as stored by persistence adapters.
#[derive(Debug, Clone)]
pub struct GroupRecord {
    pub id: GroupId,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub is_private: bool,
    pub invite_code: String,
    pub creator: UserId,
    pub members: Vec<Membership>,
    pub pending_requests: Vec<JoinRequest>,
    pub moderation: ModerationState,
    pub revision: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored group state that breaks an aggregate invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupRecordError {
    #[error("invalid stored field: {0}")]
    Field(#[from] FieldError),
    #[error("expected exactly one owner, found {count}")]
    OwnerCount { count: usize },
    #[error("owner is not the group creator")]
    OwnerNotCreator,
    #[error("user {user} appears more than once in the roster")]
    DuplicateMember { user: UserId },
    #[error("user {user} has more than one pending request")]
    DuplicateRequest { user: UserId },
    #[error("user {user} is both a member and a pending requester")]
    MemberAlsoPending { user: UserId },
}

impl TryFrom<GroupRecord> for Group {
    type Error = GroupRecordError;

    fn try_from(record: GroupRecord) -> Result<Self, Self::Error> {
        let owners: Vec<&Membership> = record
            .members
            .iter()
            .filter(|membership| membership.role == MemberRole::Owner)
            .collect();
        match owners.as_slice() {
            [owner] if owner.user == record.creator => {}
            [_] => return Err(GroupRecordError::OwnerNotCreator),
            other => return Err(GroupRecordError::OwnerCount { count: other.len() }),
        }

        let mut seen_members = HashSet::new();
        for membership in &record.members {
            if !seen_members.insert(&membership.user) {
                return Err(GroupRecordError::DuplicateMember {
                    user: membership.user.clone(),
                });
            }
        }
        let mut seen_requests = HashSet::new();
        for request in &record.pending_requests {
            if seen_members.contains(&request.user) {
                return Err(GroupRecordError::MemberAlsoPending {
                    user: request.user.clone(),
                });
            }
            if !seen_requests.insert(&request.user) {
                return Err(GroupRecordError::DuplicateRequest {
                    user: request.user.clone(),
                });
            }
        }

        let details = GroupDetails::try_from_parts(
            &record.name,
            &record.description,
            record.image.as_deref(),
            record.is_private,
        )?;
        let invite_code = InviteCode::parse(&record.invite_code)?;

        Ok(Self {
            id: record.id,
            details,
            invite_code,
            creator: record.creator,
            members: record.members,
            pending_requests: record.pending_requests,
            moderation: record.moderation,
            revision: record.revision,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl From<&Group> for GroupRecord {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id.clone(),
            name: group.details.name.clone(),
            description: group.details.description.clone(),
            image: group.details.image.as_ref().map(ToString::to_string),
            is_private: group.details.is_private,
            invite_code: group.invite_code.to_string(),
            creator: group.creator.clone(),
            members: group.members.clone(),
            pending_requests: group.pending_requests.clone(),
            moderation: group.moderation.clone(),
            revision: group.revision,
            created_at: group.created_at,
            updated_at: group.updated_at,
        }
    }
}
