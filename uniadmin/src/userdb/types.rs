use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::errors::UserError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            other => Err(UserError::InvalidRole(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UserError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A user account as seen outside the storage layer. Carries no password material.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user together with its password digest, only handed to the credential verifier.
#[derive(Debug, Clone, FromRow)]
pub struct StoredCredential {
    #[sqlx(flatten)]
    pub user: User,
    pub password: String,
}

impl StoredCredential {
    /// Drops the digest once the password has been checked.
    pub fn into_user(self) -> User {
        self.user
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Changes applied by an update. `password_hash: None` keeps the current password.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub password_hash: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert!(matches!(
            "Admin".parse::<Role>(),
            Err(UserError::InvalidRole(_))
        ));
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_matches_storage_format() {
        // Given both roles
        for role in [Role::Admin, Role::User] {
            // Then the JSON form equals the stored column text
            let json = serde_json::to_value(role).unwrap();
            assert_eq!(json, serde_json::Value::String(role.to_string()));
        }
    }

    #[test]
    fn test_role_default_is_least_privilege() {
        assert_eq!(Role::default(), Role::User);
    }
}
