//! Client storage trait.
//!
//! Defines the interface for OAuth client lookup at the token endpoint.
//! Implementations are provided by storage backends.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Client;

/// Storage operations for OAuth 2.0 clients.
///
/// The token endpoint only reads client registrations and verifies secrets;
/// registration management lives elsewhere.
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Find a client by its OAuth client_id.
    ///
    /// Returns `None` if the client doesn't exist or is not active.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>>;

    /// Verify a client secret.
    ///
    /// Compares the provided secret against the stored hash.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the secret matches
    /// - `Ok(false)` if the secret doesn't match or the client has no secret
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn verify_secret(&self, client_id: &str, secret: &str) -> AuthResult<bool>;
}
