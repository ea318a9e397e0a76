//! Access policy for groups and recipes.
//!
//! Every permission decision in the service layer goes through this module.
//! The evaluators are pure: they look only at the actor and the loaded
//! entities, never at storage.
//!
//! Rules, highest priority first:
//! 1. System admins may do anything.
//! 2. Deleting a group is reserved to its creator; other group mutations need
//!    an owner or admin membership. Members may always remove themselves.
//! 3. Only the author may update or delete a recipe.
//! 4. Private or unapproved groups are hidden from non-members.
//! 5. Private recipes, recipes in private groups and unapproved recipes are
//!    hidden from everyone but the author and members of the recipe's group.

use super::moderation::Moderated;
use super::{Actor, Error, Group, Recipe, UserId};

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(&'static str),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Turn a denial into a [`ErrorCode::Forbidden`](super::ErrorCode::Forbidden) error.
    pub fn into_result(self) -> Result<(), Error> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(reason) => Err(Error::forbidden(reason)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupAction<'a> {
    View,
    Update,
    Delete,
    /// Approve or reject join requests, change roles, see pending requests.
    ManageMembers,
    RemoveMember(&'a UserId),
    /// Read the invite preview; private groups qualify, unapproved ones do not.
    PreviewInvite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeAction {
    View,
    Update,
    Delete,
}

fn is_manager(actor: &Actor, group: &Group) -> bool {
    group
        .member_role(actor.id())
        .is_some_and(|role| role.can_manage())
}

pub fn evaluate_group(actor: &Actor, group: &Group, action: GroupAction<'_>) -> Decision {
    if actor.is_admin() {
        return Decision::Allow;
    }
    match action {
        GroupAction::Delete if group.creator() == actor.id() => Decision::Allow,
        GroupAction::Delete => Decision::Deny("only the group creator can delete this group"),
        GroupAction::Update | GroupAction::ManageMembers if is_manager(actor, group) => {
            Decision::Allow
        }
        GroupAction::Update | GroupAction::ManageMembers => {
            Decision::Deny("only group owners and admins can manage this group")
        }
        GroupAction::RemoveMember(target) if target == actor.id() || is_manager(actor, group) => {
            Decision::Allow
        }
        GroupAction::RemoveMember(_) => {
            Decision::Deny("only group owners and admins can remove other members")
        }
        GroupAction::View | GroupAction::PreviewInvite if group.is_member(actor.id()) => {
            Decision::Allow
        }
        GroupAction::PreviewInvite if group.moderation().is_approved() => Decision::Allow,
        GroupAction::PreviewInvite => Decision::Deny("this group has not been approved"),
        GroupAction::View if group.is_private() => Decision::Deny("this group is private"),
        GroupAction::View if !group.moderation().is_approved() => {
            Decision::Deny("this group has not been approved")
        }
        GroupAction::View => Decision::Allow,
    }
}

/// Evaluate a recipe action. `group` is the recipe's group if it still
/// exists; a dangling reference is passed as `None`.
pub fn evaluate_recipe(
    actor: &Actor,
    recipe: &Recipe,
    group: Option<&Group>,
    action: RecipeAction,
) -> Decision {
    if actor.is_admin() {
        return Decision::Allow;
    }
    let is_author = recipe.author() == actor.id();
    match action {
        RecipeAction::Update | RecipeAction::Delete if is_author => Decision::Allow,
        RecipeAction::Update | RecipeAction::Delete => {
            Decision::Deny("only the author can modify this recipe")
        }
        RecipeAction::View => {
            if is_author || group.is_some_and(|group| group.is_member(actor.id())) {
                return Decision::Allow;
            }
            if recipe.is_private() {
                return Decision::Deny("this recipe is private");
            }
            if group.is_some_and(Group::is_private) {
                return Decision::Deny("this recipe belongs to a private group");
            }
            if !recipe.moderation().is_approved() {
                return Decision::Deny("this recipe has not been approved");
            }
            Decision::Allow
        }
    }
}
