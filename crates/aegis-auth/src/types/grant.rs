//! Authorization grant domain types.
//!
//! A [`Grant`] records an approved authorization: which client, which user
//! (if any), which scopes, plus the per-flow data that locates it (an
//! authorization code, an auth_req_id, a device code). Grant processors load
//! one, narrow the requested scope against it, and mint tokens from it.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AuthError;
use crate::oauth::pkce::PkceChallengeMethod;
use crate::types::client::GrantType;
use crate::AuthResult;

/// Per-flow data attached to a grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GrantVariant {
    /// Authorization code flow: the single-use code plus its PKCE challenge.
    AuthorizationCode {
        /// The authorization code value.
        code: String,
        /// PKCE challenge stored at authorization time.
        #[serde(skip_serializing_if = "Option::is_none")]
        code_challenge: Option<String>,
        /// PKCE challenge method stored at authorization time.
        #[serde(skip_serializing_if = "Option::is_none")]
        code_challenge_method: Option<PkceChallengeMethod>,
    },
    /// Client credentials flow: no user, created fresh per request.
    ClientCredentials,
    /// Resource owner password credentials flow.
    Password,
    /// CIBA flow: keyed by auth_req_id, delivers tokens at most once.
    Ciba {
        /// Backchannel authentication request identifier.
        auth_req_id: String,
        /// Set once tokens have been pulled; a second pull is rejected.
        tokens_delivered: bool,
    },
    /// Device authorization flow: keyed by device code.
    DeviceCode {
        /// The device code being polled.
        device_code: String,
    },
}

/// An approved authorization from which tokens are minted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grant {
    /// Unique grant identifier; refresh token records point back to this.
    pub id: Uuid,

    /// The flow that created this grant.
    pub grant_type: GrantType,

    /// Client the grant belongs to.
    pub client_id: String,

    /// Resource owner (None for client credentials).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,

    /// Scopes approved at authorization time.
    pub scopes: Vec<String>,

    /// Session identifier bound to the grant, surfaced as `sid` in tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// OIDC nonce from the authorization request, echoed into the id token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// When the grant was approved.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Per-flow data.
    pub variant: GrantVariant,
}

impl Grant {
    /// Creates a fresh grant for the client credentials flow.
    #[must_use]
    pub fn client_credentials(client_id: impl Into<String>, scopes: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            grant_type: GrantType::ClientCredentials,
            client_id: client_id.into(),
            user_id: None,
            scopes,
            session_id: None,
            nonce: None,
            created_at: OffsetDateTime::now_utc(),
            variant: GrantVariant::ClientCredentials,
        }
    }

    /// Creates a grant for a successfully authenticated password grant.
    #[must_use]
    pub fn password(client_id: impl Into<String>, user_id: Uuid, scopes: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            grant_type: GrantType::Password,
            client_id: client_id.into(),
            user_id: Some(user_id),
            scopes,
            session_id: None,
            nonce: None,
            created_at: OffsetDateTime::now_utc(),
            variant: GrantVariant::Password,
        }
    }

    /// Returns the authorization code if this grant came from the code flow.
    #[must_use]
    pub fn authorization_code(&self) -> Option<&str> {
        match &self.variant {
            GrantVariant::AuthorizationCode { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Returns whether a backchannel grant has already delivered its tokens.
    #[must_use]
    pub fn tokens_delivered(&self) -> bool {
        matches!(
            self.variant,
            GrantVariant::Ciba {
                tokens_delivered: true,
                ..
            }
        )
    }

    /// Marks a CIBA grant's tokens as delivered.
    pub fn mark_tokens_delivered(&mut self) {
        if let GrantVariant::Ciba {
            tokens_delivered, ..
        } = &mut self.variant
        {
            *tokens_delivered = true;
        }
    }

    /// Narrows a requested scope string against the scopes approved on this grant.
    ///
    /// `None` or an empty string yields the full granted set. Requesting any
    /// scope outside the granted set fails with `invalid_scope`; requesting a
    /// subset yields exactly that subset.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidScope` when the request widens the grant.
    pub fn check_scopes_policy(&self, requested: Option<&str>) -> AuthResult<String> {
        let requested = requested.map(str::trim).filter(|s| !s.is_empty());

        let Some(requested) = requested else {
            return Ok(self.scopes.join(" "));
        };

        let mut effective = Vec::new();
        for scope in requested.split_whitespace() {
            if !self.scopes.iter().any(|granted| granted == scope) {
                return Err(AuthError::invalid_scope(format!(
                    "Scope '{scope}' was not granted"
                )));
            }
            if !effective.contains(&scope) {
                effective.push(scope);
            }
        }
        Ok(effective.join(" "))
    }

    /// Returns `true` if the effective scope set includes `openid`.
    #[must_use]
    pub fn has_openid_scope(&self) -> bool {
        self.scopes.iter().any(|s| s == "openid")
    }

    /// Returns `true` if the grant carries the `offline_access` scope.
    #[must_use]
    pub fn has_offline_access_scope(&self) -> bool {
        self.scopes.iter().any(|s| s == "offline_access")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_grant(scopes: &[&str]) -> Grant {
        Grant {
            id: Uuid::new_v4(),
            grant_type: GrantType::AuthorizationCode,
            client_id: "test-client".to_string(),
            user_id: Some(Uuid::new_v4()),
            scopes: scopes.iter().map(|s| (*s).to_string()).collect(),
            session_id: None,
            nonce: None,
            created_at: OffsetDateTime::now_utc(),
            variant: GrantVariant::AuthorizationCode {
                code: "abc123".to_string(),
                code_challenge: None,
                code_challenge_method: None,
            },
        }
    }

    #[test]
    fn test_scopes_policy_defaults_to_granted() {
        let grant = make_grant(&["openid", "profile", "email"]);
        assert_eq!(
            grant.check_scopes_policy(None).unwrap(),
            "openid profile email"
        );
        assert_eq!(
            grant.check_scopes_policy(Some("")).unwrap(),
            "openid profile email"
        );
        assert_eq!(
            grant.check_scopes_policy(Some("   ")).unwrap(),
            "openid profile email"
        );
    }

    #[test]
    fn test_scopes_policy_narrows() {
        let grant = make_grant(&["openid", "profile", "email"]);
        assert_eq!(
            grant.check_scopes_policy(Some("openid email")).unwrap(),
            "openid email"
        );
    }

    #[test]
    fn test_scopes_policy_rejects_widening() {
        let grant = make_grant(&["openid"]);
        let err = grant.check_scopes_policy(Some("openid admin")).unwrap_err();
        assert!(matches!(err, AuthError::InvalidScope { .. }));
    }

    #[test]
    fn test_scopes_policy_dedupes() {
        let grant = make_grant(&["openid", "profile"]);
        assert_eq!(
            grant.check_scopes_policy(Some("openid openid")).unwrap(),
            "openid"
        );
    }

    #[test]
    fn test_delivered_latch() {
        let mut grant = make_grant(&["openid"]);
        grant.variant = GrantVariant::Ciba {
            auth_req_id: "req-1".to_string(),
            tokens_delivered: false,
        };
        assert!(!grant.tokens_delivered());

        grant.mark_tokens_delivered();
        assert!(grant.tokens_delivered());
    }

    #[test]
    fn test_authorization_code_accessor() {
        let grant = make_grant(&["openid"]);
        assert_eq!(grant.authorization_code(), Some("abc123"));

        let cc = Grant::client_credentials("client", vec!["api".to_string()]);
        assert_eq!(cc.authorization_code(), None);
        assert_eq!(cc.user_id, None);
    }

    #[test]
    fn test_scope_predicates() {
        let grant = make_grant(&["openid", "offline_access"]);
        assert!(grant.has_openid_scope());
        assert!(grant.has_offline_access_scope());

        let grant = make_grant(&["api"]);
        assert!(!grant.has_openid_scope());
        assert!(!grant.has_offline_access_scope());
    }
}
