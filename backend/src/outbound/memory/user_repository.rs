use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, GroupId, PasswordHash, Profile, User, UserId};

use super::lock;

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, (User, PasswordHash)>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut users = lock(&self.users);
        if users
            .values()
            .any(|(existing, _)| existing.email() == user.email())
        {
            return Err(UserPersistenceError::duplicate_email(user.email().as_ref()));
        }
        users.insert(user.id().clone(), (user.clone(), password_hash.clone()));
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(lock(&self.users).get(id).map(|(user, _)| user.clone()))
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        let users = lock(&self.users);
        Ok(ids
            .iter()
            .filter_map(|id| users.get(id).map(|(user, _)| user.clone()))
            .collect())
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, PasswordHash)>, UserPersistenceError> {
        Ok(lock(&self.users)
            .values()
            .find(|(user, _)| user.email() == email)
            .cloned())
    }

    async fn update_profile(
        &self,
        id: &UserId,
        profile: &Profile,
    ) -> Result<bool, UserPersistenceError> {
        let mut users = lock(&self.users);
        let Some((user, _)) = users.get_mut(id) else {
            return Ok(false);
        };
        user.set_profile(profile.clone());
        Ok(true)
    }

    async fn add_group(&self, id: &UserId, group: &GroupId) -> Result<(), UserPersistenceError> {
        if let Some((user, _)) = lock(&self.users).get_mut(id) {
            user.add_group(group.clone());
        }
        Ok(())
    }

    async fn remove_group(
        &self,
        id: &UserId,
        group: &GroupId,
    ) -> Result<(), UserPersistenceError> {
        if let Some((user, _)) = lock(&self.users).get_mut(id) {
            user.remove_group(group);
        }
        Ok(())
    }

    async fn remove_group_from_all(&self, group: &GroupId) -> Result<u64, UserPersistenceError> {
        let mut removed = 0;
        for (user, _) in lock(&self.users).values_mut() {
            if user.remove_group(group) {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
