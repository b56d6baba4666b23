//! Security event audit logging.
//!
//! Every token request produces exactly one [`OAuth2AuditLog`] record,
//! flushed by the endpoint's finalize step whether the request succeeded or
//! failed. The sink is fire-and-forget; delivery failures are logged, never
//! surfaced to the client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::info;

/// Audit record for a token endpoint request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuth2AuditLog {
    /// Remote address the request arrived from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    /// The audited action, e.g. "TOKEN_REQUEST".
    pub action: String,

    /// Client that made the request, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Username from the request, where the flow carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Requested scope string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Whether the request produced tokens.
    pub success: bool,

    /// When the record was created.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl OAuth2AuditLog {
    /// Creates a new record for the given action, not yet successful.
    #[must_use]
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            ip: None,
            action: action.into(),
            client_id: None,
            username: None,
            scope: None,
            success: false,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    /// Marks the request as successful.
    pub fn mark_success(&mut self) {
        self.success = true;
    }
}

/// Destination for audit records.
///
/// Implementations must not block token issuance; a failed write is the
/// sink's problem.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Deliver one audit record.
    async fn record(&self, entry: &OAuth2AuditLog);
}

/// Default sink emitting structured `tracing` events at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, entry: &OAuth2AuditLog) {
        info!(
            action = %entry.action,
            client_id = entry.client_id.as_deref().unwrap_or("-"),
            username = entry.username.as_deref().unwrap_or("-"),
            scope = entry.scope.as_deref().unwrap_or("-"),
            ip = entry.ip.as_deref().unwrap_or("-"),
            success = entry.success,
            "audit"
        );
    }
}
