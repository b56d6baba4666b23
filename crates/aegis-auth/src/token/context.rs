//! Per-request execution context.
//!
//! One [`ExecutionContext`] is created per token request after client
//! authentication and is threaded `&mut` through the grant processors. It
//! carries everything the pipeline accumulates: proof-of-possession material
//! from headers, the audit record, and the claim transforms registered for
//! this request.

use crate::audit::OAuth2AuditLog;
use crate::token::transforms::TokenTransforms;
use crate::types::Client;

/// State accumulated while processing one token request.
#[derive(Debug)]
pub struct ExecutionContext {
    /// The authenticated client.
    pub client: Client,

    /// RFC 7638 thumbprint of the DPoP proof key, when a proof was sent.
    pub dpop_jkt: Option<String>,

    /// SHA-256 fingerprint of the client certificate, when one was sent.
    pub cert_fingerprint: Option<String>,

    /// Token binding hash from the `Sec-Token-Binding` header.
    pub token_binding_hash: Option<String>,

    /// The request's audit record, flushed once by the endpoint.
    pub audit: OAuth2AuditLog,

    /// Claim transforms registered for this request.
    pub transforms: TokenTransforms,
}

impl ExecutionContext {
    /// Creates a context for an authenticated client.
    #[must_use]
    pub fn new(client: Client, audit: OAuth2AuditLog) -> Self {
        Self {
            client,
            dpop_jkt: None,
            cert_fingerprint: None,
            token_binding_hash: None,
            audit,
            transforms: TokenTransforms::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GrantType;

    #[test]
    fn test_new_context() {
        let client = Client {
            client_id: "client-1".to_string(),
            client_secret: None,
            name: "Client".to_string(),
            grant_types: vec![GrantType::ClientCredentials],
            scopes: vec![],
            confidential: false,
            active: true,
            access_token_lifetime: None,
            refresh_token_lifetime: None,
            pkce_required: None,
            backchannel_token_delivery_mode: None,
            id_token_token_binding_cnf: false,
        };

        let ctx = ExecutionContext::new(client, OAuth2AuditLog::new("TOKEN_REQUEST"));
        assert!(ctx.dpop_jkt.is_none());
        assert!(ctx.cert_fingerprint.is_none());
        assert_eq!(ctx.audit.action, "TOKEN_REQUEST");
    }
}
