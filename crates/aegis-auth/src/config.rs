//! Token endpoint configuration.
//!
//! Controls token lifetimes, refresh token rotation behavior, backchannel
//! polling pacing, and the compatibility switches carried over from earlier
//! deployments.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the token-issuance core.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// issuer = "https://id.example.com"
/// access_token_lifetime = "1h"
/// refresh_token_lifetime = "90d"
/// backchannel_polling_interval = "5s"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Server issuer URL (used in token `iss` claim).
    pub issuer: String,

    /// Default audience for access tokens.
    pub audience: String,

    /// Access token lifetime.
    /// Shorter lifetimes are more secure but require more frequent refresh.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// ID token lifetime.
    #[serde(with = "humantime_serde")]
    pub id_token_lifetime: Duration,

    /// Refresh token lifetime.
    /// Can be longer since refresh tokens require client authentication.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,

    /// Minimum interval between backchannel (CIBA/device) polls.
    /// Polling faster than this yields `slow_down`.
    #[serde(with = "humantime_serde")]
    pub backchannel_polling_interval: Duration,

    /// Require PKCE on every authorization code exchange, even when the
    /// grant stored no challenge.
    pub require_pkce: bool,

    /// Only issue refresh tokens when the grant carries `offline_access`.
    pub force_offline_access_scope: bool,

    /// Re-check that the grant's user still exists and is active before
    /// minting a refresh token.
    pub check_user_presence_on_refresh: bool,

    /// Do not rotate refresh tokens: the presented token is returned as-is.
    pub skip_refresh_token_rotation: bool,

    /// When rotating, give the replacement token a full fresh lifetime
    /// instead of inheriting the old token's expiry instant.
    pub refresh_token_extend_lifetime_on_rotation: bool,

    /// Issue id tokens from refresh/client_credentials/password grants when
    /// the scope contains `openid` (pre-OIDC-certification behavior).
    pub openid_scope_backward_compatibility: bool,

    /// Inline user claims (name, email) into id tokens.
    pub legacy_id_token_claims: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "http://localhost:8080".to_string(),
            audience: "http://localhost:8080".to_string(),
            access_token_lifetime: Duration::from_secs(3600), // 1 hour
            id_token_lifetime: Duration::from_secs(3600),
            refresh_token_lifetime: Duration::from_secs(90 * 24 * 3600), // 90 days
            backchannel_polling_interval: Duration::from_secs(5),
            require_pkce: false,
            force_offline_access_scope: false,
            check_user_presence_on_refresh: false,
            skip_refresh_token_rotation: false,
            refresh_token_extend_lifetime_on_rotation: false,
            openid_scope_backward_compatibility: false,
            legacy_id_token_claims: false,
        }
    }
}

impl AuthConfig {
    /// Sets the issuer.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the audience.
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    /// Sets the access token lifetime.
    #[must_use]
    pub fn with_access_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.access_token_lifetime = lifetime;
        self
    }

    /// Sets the refresh token lifetime.
    #[must_use]
    pub fn with_refresh_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.refresh_token_lifetime = lifetime;
        self
    }

    /// Sets the backchannel polling interval.
    #[must_use]
    pub fn with_backchannel_polling_interval(mut self, interval: Duration) -> Self {
        self.backchannel_polling_interval = interval;
        self
    }

    /// Makes PKCE mandatory on code exchanges.
    #[must_use]
    pub fn with_require_pkce(mut self, require: bool) -> Self {
        self.require_pkce = require;
        self
    }

    /// Gates refresh tokens on the `offline_access` scope.
    #[must_use]
    pub fn with_force_offline_access_scope(mut self, force: bool) -> Self {
        self.force_offline_access_scope = force;
        self
    }

    /// Enables the user presence check on refresh.
    #[must_use]
    pub fn with_check_user_presence_on_refresh(mut self, check: bool) -> Self {
        self.check_user_presence_on_refresh = check;
        self
    }

    /// Disables refresh token rotation.
    #[must_use]
    pub fn with_skip_refresh_token_rotation(mut self, skip: bool) -> Self {
        self.skip_refresh_token_rotation = skip;
        self
    }

    /// Gives rotated refresh tokens a full fresh lifetime.
    #[must_use]
    pub fn with_refresh_token_extend_lifetime_on_rotation(mut self, extend: bool) -> Self {
        self.refresh_token_extend_lifetime_on_rotation = extend;
        self
    }

    /// Enables pre-certification openid scope behavior.
    #[must_use]
    pub fn with_openid_scope_backward_compatibility(mut self, enabled: bool) -> Self {
        self.openid_scope_backward_compatibility = enabled;
        self
    }

    /// Enables inlined user claims in id tokens.
    #[must_use]
    pub fn with_legacy_id_token_claims(mut self, enabled: bool) -> Self {
        self.legacy_id_token_claims = enabled;
        self
    }
}
