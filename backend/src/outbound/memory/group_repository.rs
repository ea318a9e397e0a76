use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{GroupPersistenceError, GroupRepository};
use crate::domain::{Group, GroupId, InviteCode, Moderated, ModerationStatus};

use super::lock;

#[derive(Debug, Default)]
pub struct InMemoryGroupRepository {
    groups: Mutex<HashMap<GroupId, Group>>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn pending(&self) -> Vec<Group> {
        let mut pending: Vec<Group> = lock(&self.groups)
            .values()
            .filter(|group| group.moderation().status() == ModerationStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        pending
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn insert(&self, group: &Group) -> Result<(), GroupPersistenceError> {
        let mut groups = lock(&self.groups);
        if groups
            .values()
            .any(|existing| existing.invite_code() == group.invite_code())
        {
            return Err(GroupPersistenceError::duplicate_invite_code(
                group.invite_code().as_ref(),
            ));
        }
        groups.insert(group.id().clone(), group.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &GroupId) -> Result<Option<Group>, GroupPersistenceError> {
        Ok(lock(&self.groups).get(id).cloned())
    }

    async fn find_by_invite_code(
        &self,
        code: &InviteCode,
    ) -> Result<Option<Group>, GroupPersistenceError> {
        Ok(lock(&self.groups)
            .values()
            .find(|group| group.invite_code() == code)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Group>, GroupPersistenceError> {
        let mut all: Vec<Group> = lock(&self.groups).values().cloned().collect();
        all.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(b.id())));
        Ok(all)
    }

    async fn list_pending(&self) -> Result<Vec<Group>, GroupPersistenceError> {
        Ok(self.pending())
    }

    async fn count_pending(&self) -> Result<u64, GroupPersistenceError> {
        Ok(self.pending().len() as u64)
    }

    async fn save(&self, group: &Group, expected_revision: u32) -> Result<(), GroupPersistenceError> {
        let mut groups = lock(&self.groups);
        let Some(stored) = groups.get_mut(group.id()) else {
            return Err(GroupPersistenceError::missing(group.id().to_string()));
        };
        if stored.revision() != expected_revision {
            return Err(GroupPersistenceError::revision_mismatch(
                expected_revision,
                stored.revision(),
            ));
        }
        *stored = group.clone();
        Ok(())
    }

    async fn delete(&self, id: &GroupId) -> Result<bool, GroupPersistenceError> {
        Ok(lock(&self.groups).remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_fixtures::{fixture_timestamp, group, user};
    use crate::domain::UserRole;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn stale_save_is_rejected() {
        let repo = InMemoryGroupRepository::new();
        let owner = user("Ada", UserRole::Member);
        let original = group("Family", &owner, true);
        repo.insert(&original).await.expect("insert");

        let mut first = original.clone();
        let expected = first.advance_revision(fixture_timestamp());
        repo.save(&first, expected).await.expect("first writer wins");

        let mut second = original;
        let expected = second.advance_revision(fixture_timestamp());
        let error = repo.save(&second, expected).await.expect_err("stale");
        assert_eq!(error, GroupPersistenceError::revision_mismatch(1_u32, 2_u32));
    }

    #[rstest]
    #[tokio::test]
    async fn invite_codes_are_unique() {
        let repo = InMemoryGroupRepository::new();
        let owner = user("Ada", UserRole::Member);
        repo.insert(&group("Family", &owner, true))
            .await
            .expect("insert");

        let error = repo
            .insert(&group("Friends", &owner, false))
            .await
            .expect_err("same fixture code");
        assert!(matches!(
            error,
            GroupPersistenceError::DuplicateInviteCode { .. }
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn saving_deleted_group_reports_missing() {
        let repo = InMemoryGroupRepository::new();
        let owner = user("Ada", UserRole::Member);
        let ghost = group("Family", &owner, true);
        let error = repo.save(&ghost, 1).await.expect_err("never stored");
        assert!(matches!(error, GroupPersistenceError::Missing { .. }));
    }
}
