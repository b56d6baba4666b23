//! Pending backchannel authorization cache.
//!
//! CIBA and device authorizations that the end-user has not yet approved
//! live here, keyed by auth_req_id or device code respectively. The record
//! carries the last-access instant used for slow_down pacing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::AuthResult;

/// State of a pending backchannel authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingStatus {
    /// Waiting for the end-user to approve or deny.
    Pending,
    /// The end-user denied the request.
    Denied,
    /// The request expired before a decision was made.
    Expired,
}

/// A backchannel authorization awaiting end-user action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAuthorization {
    /// Client that initiated the request.
    pub client_id: String,

    /// Current state of the request.
    pub status: PendingStatus,

    /// Instant of the most recent token endpoint poll.
    /// None until the first poll; pacing then treats it as "now".
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub last_poll: Option<OffsetDateTime>,

    /// When the request itself expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// Cache of pending backchannel authorizations, keyed by the flow's handle
/// (auth_req_id for CIBA, device code for the device flow).
#[async_trait]
pub trait BackchannelCache: Send + Sync {
    /// Fetch the pending record for a key.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache operation fails.
    async fn get(&self, key: &str) -> AuthResult<Option<PendingAuthorization>>;

    /// Store the record for a key, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache operation fails.
    async fn put(&self, key: &str, record: &PendingAuthorization) -> AuthResult<()>;
}
