//! Token endpoint wire types.
//!
//! This module provides types for the OAuth 2.0 token endpoint,
//! including request parsing, response generation, and error handling.
//!
//! # Supported Grant Types
//!
//! - `authorization_code` - Exchange authorization code for tokens
//! - `refresh_token` - Refresh an access token
//! - `client_credentials` - Machine-to-machine authentication
//! - `password` - Resource Owner Password Credentials (legacy)
//! - `urn:openid:params:grant-type:ciba` - Backchannel authentication polling
//! - `urn:ietf:params:oauth:grant-type:device_code` - Device flow polling

use serde::{Deserialize, Serialize};
use std::fmt;

/// Token request parameters.
///
/// This structure handles all supported grant types. Different fields
/// are required depending on the `grant_type`:
///
/// - `authorization_code`: code, (optional) code_verifier
/// - `refresh_token`: refresh_token, (optional) scope
/// - `client_credentials`: (optional) scope
/// - `password`: username, password
/// - CIBA: auth_req_id
/// - device_code: device_code
///
/// # Client Authentication
///
/// Clients authenticate using one of:
/// - HTTP Basic Auth header (not in this struct)
/// - `client_id` + `client_secret` in body
/// - `client_id` only (public clients)
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    /// OAuth 2.0 grant type parameter value.
    pub grant_type: String,

    /// Authorization code (for authorization_code grant).
    #[serde(default)]
    pub code: Option<String>,

    /// Redirect URI (must match authorization request).
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// PKCE code verifier (for authorization_code grant).
    #[serde(default)]
    pub code_verifier: Option<String>,

    /// Client ID (for public clients or client_secret_post).
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret (for client_secret_post authentication).
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Refresh token (for refresh_token grant).
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Requested scope (must be a subset of the granted scope).
    #[serde(default)]
    pub scope: Option<String>,

    /// Username (for password grant - Resource Owner Password Credentials).
    #[serde(default)]
    pub username: Option<String>,

    /// Password (for password grant - Resource Owner Password Credentials).
    #[serde(default)]
    pub password: Option<String>,

    /// Backchannel authentication request id (for CIBA grant).
    #[serde(default)]
    pub auth_req_id: Option<String>,

    /// Device code (for device authorization grant).
    #[serde(default)]
    pub device_code: Option<String>,

    /// Session id to bind to the grant (password grant).
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Successful token response.
///
/// Returned when a token request succeeds. Contains the access token
/// and optionally a refresh token, an id token, and the effective scope.
///
/// # Example Response
///
/// ```json
/// {
///   "access_token": "eyJhbG...",
///   "token_type": "Bearer",
///   "expires_in": 3600,
///   "scope": "openid profile",
///   "refresh_token": "abc123..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    /// The access token (JWT).
    pub access_token: String,

    /// Token type: "Bearer", or "DPoP" for sender-constrained tokens.
    pub token_type: String,

    /// Access token lifetime in seconds, when the token declares expiry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,

    /// Effective scopes after narrowing (space-separated).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Refresh token (if minted or carried over).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// ID token (if minted).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl TokenResponse {
    /// Creates a new token response with required fields.
    #[must_use]
    pub fn new(access_token: String, token_type: impl Into<String>, expires_in: Option<u64>) -> Self {
        Self {
            access_token,
            token_type: token_type.into(),
            expires_in,
            scope: None,
            refresh_token: None,
            id_token: None,
        }
    }

    /// Sets the effective scope.
    #[must_use]
    pub fn with_scope(mut self, scope: String) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, token: String) -> Self {
        self.refresh_token = Some(token);
        self
    }

    /// Sets the ID token.
    #[must_use]
    pub fn with_id_token(mut self, token: String) -> Self {
        self.id_token = Some(token);
        self
    }
}

/// Token error response.
///
/// Returned when a token request fails. Contains an error code and
/// optional description.
///
/// # Example Response
///
/// ```json
/// {
///   "error": "invalid_grant",
///   "error_description": "Authorization code expired"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct TokenError {
    /// OAuth 2.0 error code.
    pub error: TokenErrorCode,

    /// Human-readable error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl TokenError {
    /// Creates a new token error.
    #[must_use]
    pub fn new(error: TokenErrorCode) -> Self {
        Self {
            error,
            error_description: None,
        }
    }

    /// Creates a new token error with description.
    #[must_use]
    pub fn with_description(error: TokenErrorCode, description: impl Into<String>) -> Self {
        Self {
            error,
            error_description: Some(description.into()),
        }
    }
}

/// OAuth 2.0 token error codes.
///
/// The RFC 6749 §5.2 set plus the DPoP (RFC 9449), CIBA and device flow
/// (RFC 8628 §3.5) polling codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenErrorCode {
    /// The request is missing a required parameter, includes an unsupported
    /// parameter value, includes a parameter more than once, or is otherwise
    /// malformed.
    InvalidRequest,

    /// Client authentication failed (unknown client, no client authentication
    /// included, or unsupported authentication method).
    InvalidClient,

    /// The provided authorization grant or refresh token is invalid, expired,
    /// revoked, or was issued to another client.
    InvalidGrant,

    /// The authenticated client is not authorized to use this authorization
    /// grant type.
    UnauthorizedClient,

    /// The authorization grant type is not supported by the authorization server.
    UnsupportedGrantType,

    /// The requested scope is invalid, unknown, malformed, or exceeds the scope
    /// granted by the resource owner.
    InvalidScope,

    /// The DPoP proof header is malformed or carries an unusable key.
    InvalidDpopProof,

    /// The backchannel authorization is still awaiting end-user action.
    AuthorizationPending,

    /// The client polled faster than the required interval.
    SlowDown,

    /// The end-user denied the backchannel authorization request.
    AccessDenied,

    /// The auth_req_id or device_code has expired or is unknown.
    ExpiredToken,
}

impl TokenErrorCode {
    /// Returns the string representation of the error code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::InvalidGrant => "invalid_grant",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::InvalidScope => "invalid_scope",
            Self::InvalidDpopProof => "invalid_dpop_proof",
            Self::AuthorizationPending => "authorization_pending",
            Self::SlowDown => "slow_down",
            Self::AccessDenied => "access_denied",
            Self::ExpiredToken => "expired_token",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidClient => 401,
            _ => 400,
        }
    }
}

impl fmt::Display for TokenErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
