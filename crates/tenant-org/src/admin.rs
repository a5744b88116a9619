//! Administrator identity
//!
//! Every organization is owned by exactly one administrator. Administrators
//! are created by the organization create saga and removed by the delete
//! saga; they never exist on their own in a healthy system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An organization administrator with a hashed secret.
///
/// The password hash is a PHC-format string. It is never serialized and is
/// redacted from `Debug` output.
#[derive(Clone, Serialize, Deserialize)]
pub struct Administrator {
    /// Store-assigned identifier
    pub id: Uuid,

    /// Login email (unique across administrators)
    pub email: String,

    /// Salted one-way hash of the secret
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// When the administrator was created
    pub created_at: DateTime<Utc>,
}

impl Administrator {
    /// Creates a new administrator record with a fresh UUID v7.
    ///
    /// # Arguments
    ///
    /// * `email` - Login email
    /// * `password_hash` - Already-hashed secret
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}

impl std::fmt::Debug for Administrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Administrator")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_hash() {
        let admin = Administrator::new("a@x.com", "$argon2id$v=19$secret-material");
        let rendered = format!("{:?}", admin);

        assert!(rendered.contains("a@x.com"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("secret-material"));
    }

    #[test]
    fn test_hash_is_not_serialized() {
        let admin = Administrator::new("a@x.com", "$argon2id$v=19$secret-material");
        let json = serde_json::to_value(&admin).unwrap();

        assert_eq!(json["email"], "a@x.com");
        assert!(json.get("password_hash").is_none());
    }
}
