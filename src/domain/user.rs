//! User domain entity and related types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl User {
    pub fn new(id: Uuid, name: String, email: String, password_hash: String) -> Self {
        Self {
            id,
            name,
            email,
            password_hash,
        }
    }

    /// Display name given to accounts created on first login: the local part
    /// of the email address.
    pub fn default_name(email: &str) -> String {
        email.split('@').next().unwrap_or_default().to_string()
    }
}

/// Signed-in user as exposed to clients
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionUser {
    #[schema(example = "410544b2-4001-4271-9855-fec4b6a6442a")]
    pub id: Uuid,
    #[schema(example = "User")]
    pub name: String,
    #[schema(example = "user@nextmail.com")]
    pub email: String,
}

impl From<User> for SessionUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_name_is_local_part() {
        assert_eq!(User::default_name("jane.doe@example.com"), "jane.doe");
        assert_eq!(User::default_name("no-at-sign"), "no-at-sign");
        assert_eq!(User::default_name("@example.com"), "");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new(
            Uuid::new_v4(),
            "Jane".to_string(),
            "jane@example.com".to_string(),
            "$argon2id$secret".to_string(),
        );
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
    }
}
