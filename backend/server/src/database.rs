//! # Redis
//!
//! Document store for users.
//!
//! ## Layout
//!
//! - `users` hash: user id -> JSON document (password included)
//! - `user_emails` hash: normalized email -> user id
//!
//! Both keys can carry a prefix, see [`RedisUserStore::with_prefix`].
//!
//! ## Uniqueness
//!
//! An email is claimed with `HSETNX` on `user_emails` before the document is
//! written, so two concurrent signups with the same email cannot both win.
//!
//! - A failed document write releases a claim it just made
//! - Changing an email claims the new one, writes the document, then releases
//!   the old one
//! - A claim whose owner has no document, or whose owner's document carries a
//!   different email, is stale and gets taken over by the next claimant
//!
//! ## Notes
//!
//! - `HVALS` gives no order; callers sort by `created_at`
//! - No indexes beyond the email hash, lookups by id are O(1)
use async_trait::async_trait;
use redis::{
    AsyncCommands, Client, RedisError,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use tracing::{error, info, warn};

use crate::{
    error::AppError,
    users::{UserDocument, UserStore},
};

const USERS_KEY: &str = "users";
const EMAILS_KEY: &str = "user_emails";

pub async fn init_redis(redis_url: &str) -> Result<ConnectionManager, RedisError> {
    let config = ConnectionManagerConfig::new().set_number_of_retries(3);

    let client = Client::open(redis_url)?;
    let connection_manager = client.get_connection_manager_with_config(config).await?;

    info!("Database has connected successfully");

    Ok(connection_manager)
}

#[derive(Clone)]
pub struct RedisUserStore {
    connection: ConnectionManager,
    users_key: String,
    emails_key: String,
}

impl RedisUserStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self::with_prefix(connection, "")
    }

    pub fn with_prefix(connection: ConnectionManager, prefix: &str) -> Self {
        Self {
            connection,
            users_key: format!("{prefix}{USERS_KEY}"),
            emails_key: format!("{prefix}{EMAILS_KEY}"),
        }
    }

    pub async fn connect(redis_url: &str) -> Result<Self, RedisError> {
        Ok(Self::new(init_redis(redis_url).await?))
    }

    /// Returns `true` when this call made the claim and `false` when `id`
    /// already held it.
    async fn claim_email(&self, email: &str, id: &str) -> Result<bool, AppError> {
        let mut connection = self.connection.clone();

        loop {
            let claimed: bool = connection.hset_nx(&self.emails_key, email, id).await?;
            if claimed {
                return Ok(true);
            }

            let owner: Option<String> = connection.hget(&self.emails_key, email).await?;
            let Some(owner) = owner else {
                // released between the two commands
                continue;
            };
            if owner == id {
                return Ok(false);
            }

            let owner_email = self.get(&owner).await?.map(|user| user.email);
            if owner_email.as_deref() == Some(email) {
                return Err(AppError::EmailInUse);
            }

            warn!(email, owner = %owner, "Taking over stale email claim");
            let _: () = connection.hset(&self.emails_key, email, id).await?;
            return Ok(true);
        }
    }

    async fn release_email(&self, email: &str, id: &str) {
        let mut connection = self.connection.clone();

        let released: Result<(), RedisError> = async {
            let owner: Option<String> = connection.hget(&self.emails_key, email).await?;
            if owner.as_deref() == Some(id) {
                let _: () = connection.hdel(&self.emails_key, email).await?;
            }
            Ok(())
        }
        .await;

        if let Err(e) = released {
            error!(email, user_id = id, error = %e, "Failed to release email claim");
        }
    }

    async fn write(&self, user: &UserDocument, document: String) -> Result<(), RedisError> {
        let mut connection = self.connection.clone();
        connection.hset(&self.users_key, &user.id, document).await
    }
}

#[async_trait]
impl UserStore for RedisUserStore {
    async fn list(&self) -> Result<Vec<UserDocument>, AppError> {
        let mut connection = self.connection.clone();
        let documents: Vec<String> = connection.hvals(&self.users_key).await?;

        documents
            .iter()
            .map(|document| serde_json::from_str(document).map_err(AppError::from))
            .collect()
    }

    async fn get(&self, id: &str) -> Result<Option<UserDocument>, AppError> {
        let mut connection = self.connection.clone();
        let document: Option<String> = connection.hget(&self.users_key, id).await?;

        Ok(document
            .map(|document| serde_json::from_str(&document))
            .transpose()?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserDocument>, AppError> {
        let mut connection = self.connection.clone();
        let id: Option<String> = connection.hget(&self.emails_key, email).await?;

        let Some(id) = id else {
            return Ok(None);
        };

        // a stale claim does not count as a match
        Ok(self.get(&id).await?.filter(|user| user.email == email))
    }

    async fn insert(&self, user: &UserDocument) -> Result<(), AppError> {
        let document = serde_json::to_string(user)?;

        let claimed = self.claim_email(&user.email, &user.id).await?;
        if let Err(e) = self.write(user, document).await {
            if claimed {
                self.release_email(&user.email, &user.id).await;
            }
            return Err(e.into());
        }

        Ok(())
    }

    async fn replace(&self, user: &UserDocument) -> Result<(), AppError> {
        let document = serde_json::to_string(user)?;
        let previous = self.get(&user.id).await?.ok_or(AppError::UserNotFound)?;
        let moved = previous.email != user.email;

        let claimed = moved && self.claim_email(&user.email, &user.id).await?;
        if let Err(e) = self.write(user, document).await {
            if claimed {
                self.release_email(&user.email, &user.id).await;
            }
            return Err(e.into());
        }

        if moved {
            self.release_email(&previous.email, &user.id).await;
        }

        Ok(())
    }
}
