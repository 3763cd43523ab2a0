use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Process-local user store.
///
/// Enforces the same uniqueness rules as the PostgreSQL schema. Used by tests
/// and for running the service without a database.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn conflicts(existing: &User, candidate: &User) -> bool {
    existing.id != candidate.id
        && (existing.username == candidate.username || existing.email == candidate.email)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.id) || users.values().any(|u| conflicts(u, &user)) {
            return Err(UserError::UserAlreadyExists);
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| &u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<User>, i64), UserError> {
        let users = self.users.read().await;

        let mut all: Vec<&User> = users.values().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let page = all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();

        Ok((page, users.len() as i64))
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id.to_string()));
        }
        if users.values().any(|u| conflicts(u, &user)) {
            return Err(UserError::UserAlreadyExists);
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        self.users
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(UserError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use auth::Role;
    use chrono::Duration;
    use chrono::Utc;

    use super::*;

    fn user(username: &str, email: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            username: Username::new(username.to_string()).unwrap(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            password_hash: "hash".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            role: Role::User,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_lookups_return_none_when_absent() {
        let repository = InMemoryUserRepository::new();

        assert!(repository.find_by_id(&UserId::new()).await.unwrap().is_none());
        assert!(repository
            .find_by_username(&Username::new("ghost".to_string()).unwrap())
            .await
            .unwrap()
            .is_none());
        assert!(repository
            .find_by_email(&EmailAddress::new("ghost@x.com".to_string()).unwrap())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_create_enforces_uniqueness() {
        let repository = InMemoryUserRepository::new();
        repository.create(user("alice", "alice@x.com")).await.unwrap();

        assert!(matches!(
            repository.create(user("alice", "other@x.com")).await,
            Err(UserError::UserAlreadyExists)
        ));
        assert!(matches!(
            repository.create(user("other", "alice@x.com")).await,
            Err(UserError::UserAlreadyExists)
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_user() {
        let repository = InMemoryUserRepository::new();
        let ghost = user("ghost", "ghost@x.com");

        assert!(matches!(
            repository.delete(&ghost.id).await,
            Err(UserError::NotFound(_))
        ));
        assert!(matches!(
            repository.update(ghost).await,
            Err(UserError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let repository = InMemoryUserRepository::new();

        let mut older = user("older", "older@x.com");
        older.created_at = Utc::now() - Duration::hours(1);
        let newer = user("newer", "newer@x.com");

        repository.create(older).await.unwrap();
        repository.create(newer).await.unwrap();

        let (page, total) = repository.list(0, 1).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].username.as_str(), "newer");

        let (page, _) = repository.list(1, 10).await.unwrap();
        assert_eq!(page[0].username.as_str(), "older");
    }
}
