//! User storage trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::AuthResult;
use crate::types::User;

/// Storage operations for resource owners.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Find a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<User>>;

    /// Find a user by login name.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>>;

    /// Verify a user's password.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the password matches
    /// - `Ok(false)` otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn verify_password(&self, id: Uuid, password: &str) -> AuthResult<bool>;
}
