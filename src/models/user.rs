use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::trim_owned;
use crate::pagination::PageParams;

/// Columns that are safe to hand to clients. Never includes the password hash or the
/// stored refresh token.
pub const PUBLIC_USER_COLUMNS: &str = "id, email, profile, created_at, updated_at";

/// A user row as read for authentication purposes.
#[derive(Debug, FromRow)]
pub struct UserCredentials {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub profile: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserCredentials> for PublicUser {
    fn from(user: UserCredentials) -> Self {
        PublicUser {
            id: user.id,
            email: user.email,
            profile: user.profile,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Safe projection of a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    /// Free-form profile document, `{ "name": ..., "avatar": ... }` at minimum.
    pub profile: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tells an absent key (`None`) apart from an explicit `null` (`Some(None)`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial profile document. Only the keys that are present overwrite stored ones.
///
/// `avatar: null` clears the avatar; leaving the key out keeps it.
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct ProfilePatch {
    #[validate(length(min = 3, message = "Min 3 Character"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[validate(length(max = 2048, message = "Avatar URL is too long"))]
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub avatar: Option<Option<String>>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.avatar.is_none()
    }
}

/// Body of `PUT /profile/{id}` and `PUT /users`.
///
/// A flat `name` is accepted as shorthand for `profile.name`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 3, message = "Min 3 Character"))]
    pub name: Option<String>,
    #[validate]
    pub profile: Option<ProfilePatch>,
}

impl ProfileUpdate {
    /// Folds the shorthand `name` into the profile patch. Returns `None` when no profile
    /// key was supplied at all.
    pub fn profile_patch(&self) -> Option<ProfilePatch> {
        let mut patch = self.profile.clone().unwrap_or_default();
        if patch.name.is_none() {
            patch.name = self.name.clone();
        }
        (!patch.is_empty()).then_some(patch)
    }

    /// Trims names so that validation sees what gets stored.
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.map(trim_owned),
            profile: self.profile.map(|patch| ProfilePatch {
                name: patch.name.map(trim_owned),
                ..patch
            }),
            ..self
        }
    }

    pub fn normalized_email(&self) -> Option<String> {
        self.email.as_deref().map(|e| e.trim().to_lowercase())
    }
}

/// Query string of `GET /users`.
#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    /// Case-insensitive match on the email address.
    pub search: Option<String>,
    pub sort: Option<String>,
}

impl UserListQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams::sanitize(self.page.as_deref(), self.limit.as_deref())
    }
}
