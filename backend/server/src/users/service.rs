use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use super::{
    model::{NewUser, User, UserDocument, UserPatch},
    store::UserStore,
};
use crate::error::AppError;

pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn fetch_all_users(&self) -> Result<Vec<User>, AppError> {
        let mut users = self
            .store
            .list()
            .await
            .inspect_err(|e| error!(error = %e, "Error fetching all users"))?;

        if users.is_empty() {
            warn!("No users found in database");
            return Err(AppError::NoUsers);
        }

        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        info!(count = users.len(), "Fetched all users");

        Ok(users.iter().map(UserDocument::view).collect())
    }

    pub async fn fetch_user(&self, user_id: &str) -> Result<User, AppError> {
        let user = self
            .store
            .get(user_id)
            .await
            .inspect_err(|e| error!(user_id, error = %e, "Error fetching user data"))?;

        let Some(user) = user else {
            warn!(user_id, "User not found");
            return Err(AppError::UserNotFound);
        };

        info!(user_id, "Fetched user data");
        Ok(user.view())
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let new_user = new_user
            .validate()
            .inspect_err(|e| warn!(error = %e, "Rejected user payload"))?;
        let email = new_user.email.clone();

        let result: Result<UserDocument, AppError> = async {
            if self.store.find_by_email(&email).await?.is_some() {
                warn!(email, "Attempted to create user with existing email");
                return Err(AppError::EmailInUse);
            }

            let user = UserDocument::create(new_user, Utc::now());
            self.store.insert(&user).await?;
            Ok(user)
        }
        .await;

        let user = result.inspect_err(|e| error!(email, error = %e, "Error creating user"))?;

        info!(user_id = user.id, email, "User created successfully");
        Ok(user.view())
    }

    pub async fn update_user(&self, user_id: &str, patch: UserPatch) -> Result<User, AppError> {
        let patch = patch
            .validate()
            .inspect_err(|e| warn!(user_id, error = %e, "Rejected user update"))?;
        let fields = patch.fields();

        let result: Result<UserDocument, AppError> = async {
            let Some(mut user) = self.store.get(user_id).await? else {
                warn!(user_id, "User not found for update");
                return Err(AppError::UserNotFound);
            };

            user.apply(patch, Utc::now());
            self.store.replace(&user).await?;
            Ok(user)
        }
        .await;

        let user = result.inspect_err(|e| error!(user_id, error = %e, "Error updating user"))?;

        info!(user_id, updated_fields = ?fields, "User updated successfully");
        Ok(user.view())
    }
}
