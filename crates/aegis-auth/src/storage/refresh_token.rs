//! Refresh token storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::RefreshTokenRecord;

/// Storage operations for refresh token records.
///
/// Records are keyed by the SHA-256 hash of the token value; plaintext never
/// reaches the store.
#[async_trait]
pub trait RefreshTokenStorage: Send + Sync {
    /// Persist a new refresh token record.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn create(&self, record: &RefreshTokenRecord) -> AuthResult<()>;

    /// Find a record by the SHA-256 hash of the presented token.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshTokenRecord>>;

    /// Clear a record's validity flag (rotation or revocation).
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn invalidate(&self, token_hash: &str) -> AuthResult<()>;
}
