//! Grant storage trait.
//!
//! Grants are looked up by the per-flow handle that identifies them (an
//! authorization code, an auth_req_id, a device code). Code consumption is a
//! storage operation so that concurrent redemptions of the same code race on
//! the store, not in this crate.

use async_trait::async_trait;
use uuid::Uuid;

use crate::AuthResult;
use crate::types::Grant;

/// Storage operations for authorization grants.
#[async_trait]
pub trait GrantStorage: Send + Sync {
    /// Persist a new grant.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn create(&self, grant: &Grant) -> AuthResult<()>;

    /// Update an existing grant (e.g. the tokens-delivered latch).
    ///
    /// # Errors
    ///
    /// Returns an error if the grant doesn't exist or the operation fails.
    async fn update(&self, grant: &Grant) -> AuthResult<()>;

    /// Find a grant by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<Grant>>;

    /// Find a grant by its authorization code.
    ///
    /// Returns `None` once the code has been consumed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_code(&self, code: &str) -> AuthResult<Option<Grant>>;

    /// Consume an authorization code, making it single-use.
    ///
    /// The store is the sole arbiter of the race between two redemptions of
    /// the same code: exactly one call returns `true`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn consume_code(&self, code: &str) -> AuthResult<bool>;

    /// Remove every grant and token associated with an authorization code.
    ///
    /// Called when a code lookup misses, so a replayed code revokes whatever
    /// tokens its first redemption produced. Returns the number of grants
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn remove_all_by_code(&self, code: &str) -> AuthResult<u64>;

    /// Find a granted CIBA authorization by its auth_req_id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_auth_req_id(&self, auth_req_id: &str) -> AuthResult<Option<Grant>>;

    /// Find a granted device authorization by its device code.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_device_code(&self, device_code: &str) -> AuthResult<Option<Grant>>;

    /// Detach a device code from its grant after token delivery, so a repeat
    /// poll no longer resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn remove_device_code(&self, device_code: &str) -> AuthResult<()>;
}
