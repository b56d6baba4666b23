//! Resource owner (end-user) domain type.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account status of a resource owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// The account is active and may be issued tokens.
    Active,
    /// The account is disabled; refresh and password grants must fail.
    Inactive,
}

/// A resource owner as seen by the token endpoint.
///
/// Only identity, status and the claims surfaced into id tokens live here;
/// credential verification happens behind [`crate::storage::UserStorage`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,

    /// Login name.
    pub username: String,

    /// Account status.
    pub status: UserStatus,

    /// Display name, surfaced into id tokens when legacy claims are enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Email address, surfaced into id tokens when legacy claims are enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl User {
    /// Returns `true` if the account may be issued tokens.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_active() {
        let mut user = User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            status: UserStatus::Active,
            name: Some("Alice".to_string()),
            email: None,
        };
        assert!(user.is_active());

        user.status = UserStatus::Inactive;
        assert!(!user.is_active());
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&UserStatus::Inactive).unwrap();
        assert_eq!(json, "\"inactive\"");
    }
}
