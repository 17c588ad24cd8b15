use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::model::UserDocument;
use crate::error::AppError;

/// Document storage for users. Emails are unique across the store.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> Result<Vec<UserDocument>, AppError>;

    async fn get(&self, id: &str) -> Result<Option<UserDocument>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserDocument>, AppError>;

    /// Fails with [`AppError::EmailInUse`] if another user owns the email.
    async fn insert(&self, user: &UserDocument) -> Result<(), AppError>;

    /// Overwrite an existing user, moving the email claim if it changed.
    async fn replace(&self, user: &UserDocument) -> Result<(), AppError>;
}

/// Process-local store, used with `--in-memory` and in tests.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, UserDocument>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(users: &HashMap<String, UserDocument>, email: &str, id: &str) -> bool {
    users
        .values()
        .any(|other| other.email == email && other.id != id)
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list(&self) -> Result<Vec<UserDocument>, AppError> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn get(&self, id: &str) -> Result<Option<UserDocument>, AppError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserDocument>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn insert(&self, user: &UserDocument) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, &user.id) {
            return Err(AppError::EmailInUse);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn replace(&self, user: &UserDocument) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(AppError::UserNotFound);
        }
        if email_taken(&users, &user.email, &user.id) {
            return Err(AppError::EmailInUse);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::users::model::NewUser;

    fn document(email: &str) -> UserDocument {
        UserDocument::create(
            NewUser {
                name: "Test".into(),
                email: email.into(),
                password: "pw".into(),
                age: None,
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = MemoryUserStore::new();
        let user = document("a@example.com");

        store.insert(&user).await.unwrap();

        assert_eq!(store.get(&user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(store.find_by_email("a@example.com").await.unwrap(), Some(user));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryUserStore::new();
        store.insert(&document("a@example.com")).await.unwrap();

        let result = store.insert(&document("a@example.com")).await;

        assert!(matches!(result, Err(AppError::EmailInUse)));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_replace() {
        let store = MemoryUserStore::new();
        let mut first = document("a@example.com");
        let second = document("b@example.com");
        store.insert(&first).await.unwrap();
        store.insert(&second).await.unwrap();

        first.email = "b@example.com".into();
        assert!(matches!(store.replace(&first).await, Err(AppError::EmailInUse)));

        first.email = "c@example.com".into();
        store.replace(&first).await.unwrap();
        assert_eq!(store.find_by_email("a@example.com").await.unwrap(), None);

        let ghost = document("ghost@example.com");
        assert!(matches!(store.replace(&ghost).await, Err(AppError::UserNotFound)));
    }
}
