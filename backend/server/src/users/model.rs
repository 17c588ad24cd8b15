use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// A user exactly as persisted, password included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDocument {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub age: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserDocument {
    pub fn create(new_user: NewUser, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: new_user.name,
            email: new_user.email,
            password: new_user.password,
            age: new_user.age,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: UserPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(password) = patch.password {
            self.password = password;
        }
        if let Some(age) = patch.age {
            self.age = Some(age);
        }
        self.updated_at = now;
    }

    pub fn view(&self) -> User {
        User {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            age: self.age,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// The public shape of a user. Never carries the password.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub age: Option<u32>,
}

impl NewUser {
    /// Trim the name, trim and lowercase the email, reject missing fields.
    pub fn validate(self) -> Result<Self, AppError> {
        Ok(Self {
            name: normalize_name(&self.name)?,
            email: normalize_email(&self.email)?,
            password: check_password(self.password)?,
            age: self.age,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub age: Option<u32>,
}

impl UserPatch {
    pub fn validate(self) -> Result<Self, AppError> {
        Ok(Self {
            name: self.name.as_deref().map(normalize_name).transpose()?,
            email: self.email.as_deref().map(normalize_email).transpose()?,
            password: self.password.map(check_password).transpose()?,
            age: self.age,
        })
    }

    pub fn fields(&self) -> Vec<&'static str> {
        [
            ("name", self.name.is_some()),
            ("email", self.email.is_some()),
            ("password", self.password.is_some()),
            ("age", self.age.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, present)| present.then_some(field))
        .collect()
    }
}

fn normalize_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".into()));
    }
    Ok(name.to_string())
}

fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::Validation("email is required".into()));
    }
    if !email.contains('@') {
        return Err(AppError::Validation(format!("`{email}` is not a valid email")));
    }
    Ok(email)
}

fn check_password(password: String) -> Result<String, AppError> {
    if password.is_empty() {
        return Err(AppError::Validation("password is required".into()));
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str, email: &str, password: &str) -> NewUser {
        NewUser {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            age: None,
        }
    }

    #[test]
    fn test_new_user_normalized() {
        let user = new_user("  Ada Lovelace ", " Ada@Example.COM ", "secret")
            .validate()
            .unwrap();

        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(user.email, "ada@example.com");
    }

    #[test]
    fn test_new_user_required_fields() {
        assert!(matches!(
            new_user("   ", "a@b.c", "pw").validate(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            new_user("Ada", "", "pw").validate(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            new_user("Ada", "not-an-email", "pw").validate(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            new_user("Ada", "a@b.c", "").validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_view_hides_password() {
        let document = UserDocument::create(new_user("Ada", "ada@example.com", "secret"), Utc::now());

        let json = serde_json::to_value(document.view()).unwrap();

        assert!(json.get("password").is_none());
        assert_eq!(json["_id"], document.id.as_str());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("age").is_none());
    }

    #[test]
    fn test_patch_apply() {
        let created = Utc::now();
        let mut document = UserDocument::create(new_user("Ada", "ada@example.com", "secret"), created);
        let patch = UserPatch {
            email: Some(" NEW@example.com".into()),
            age: Some(36),
            ..UserPatch::default()
        }
        .validate()
        .unwrap();

        assert_eq!(patch.fields(), vec!["email", "age"]);

        let later = created + chrono::Duration::seconds(5);
        document.apply(patch, later);

        assert_eq!(document.name, "Ada");
        assert_eq!(document.email, "new@example.com");
        assert_eq!(document.age, Some(36));
        assert_eq!(document.created_at, created);
        assert_eq!(document.updated_at, later);
    }
}
