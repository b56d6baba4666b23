//! Token endpoint error types.
//!
//! This module defines all error types that can occur while processing a
//! token request, together with their OAuth 2.0 error codes and HTTP
//! status mappings.

use std::fmt;

/// Errors that can occur during token issuance.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request is missing a required parameter or is otherwise malformed.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of why the request is invalid.
        message: String,
    },

    /// The client credentials are invalid or the client is not registered.
    #[error("Invalid client: {message}")]
    InvalidClient {
        /// Description of why the client is invalid.
        message: String,
    },

    /// The authorization grant or refresh token is invalid, expired, or revoked.
    #[error("Invalid grant: {message}")]
    InvalidGrant {
        /// Description of why the grant is invalid.
        message: String,
    },

    /// The authenticated client is not registered for the requested grant type.
    #[error("Unauthorized client: {message}")]
    UnauthorizedClient {
        /// Description of why the client is not authorized.
        message: String,
    },

    /// The authorization server does not support the requested grant type.
    #[error("Unsupported grant type: {grant_type}")]
    UnsupportedGrantType {
        /// The unsupported grant type.
        grant_type: String,
    },

    /// The requested scope is invalid, unknown, or exceeds the granted scope.
    #[error("Invalid scope: {message}")]
    InvalidScope {
        /// Description of why the scope is invalid.
        message: String,
    },

    /// The DPoP proof header could not be parsed or carries an unusable key.
    #[error("Invalid DPoP proof: {message}")]
    InvalidDpopProof {
        /// Description of why the proof is invalid.
        message: String,
    },

    /// The backchannel authorization request is still pending end-user action.
    #[error("Authorization pending")]
    AuthorizationPending,

    /// The client is polling the backchannel grant faster than the allowed interval.
    #[error("Slow down")]
    SlowDown,

    /// The end-user denied the backchannel authorization request.
    #[error("Access denied: {message}")]
    AccessDenied {
        /// Description of why access was denied.
        message: String,
    },

    /// The backchannel request identifier is expired or unknown.
    #[error("Expired token: {message}")]
    ExpiredToken {
        /// Description of why the identifier is no longer usable.
        message: String,
    },

    /// An error occurred while storing or retrieving auth data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// The auth configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidClient` error.
    #[must_use]
    pub fn invalid_client(message: impl Into<String>) -> Self {
        Self::InvalidClient {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidGrant` error.
    #[must_use]
    pub fn invalid_grant(message: impl Into<String>) -> Self {
        Self::InvalidGrant {
            message: message.into(),
        }
    }

    /// Creates a new `UnauthorizedClient` error.
    #[must_use]
    pub fn unauthorized_client(message: impl Into<String>) -> Self {
        Self::UnauthorizedClient {
            message: message.into(),
        }
    }

    /// Creates a new `UnsupportedGrantType` error.
    #[must_use]
    pub fn unsupported_grant_type(grant_type: impl Into<String>) -> Self {
        Self::UnsupportedGrantType {
            grant_type: grant_type.into(),
        }
    }

    /// Creates a new `InvalidScope` error.
    #[must_use]
    pub fn invalid_scope(message: impl Into<String>) -> Self {
        Self::InvalidScope {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidDpopProof` error.
    #[must_use]
    pub fn invalid_dpop_proof(message: impl Into<String>) -> Self {
        Self::InvalidDpopProof {
            message: message.into(),
        }
    }

    /// Creates a new `AccessDenied` error.
    #[must_use]
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    /// Creates a new `ExpiredToken` error.
    #[must_use]
    pub fn expired_token(message: impl Into<String>) -> Self {
        Self::ExpiredToken {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !self.is_server_error()
    }

    /// Returns `true` if this is a server error (5xx category).
    ///
    /// Server errors never carry a structured OAuth error body; the endpoint
    /// answers with a bare 500.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Configuration { .. } | Self::Internal { .. }
        )
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRequest { .. } => ErrorCategory::Validation,
            Self::InvalidClient { .. } => ErrorCategory::Authentication,
            Self::InvalidGrant { .. } => ErrorCategory::Authentication,
            Self::UnauthorizedClient { .. } => ErrorCategory::Authorization,
            Self::UnsupportedGrantType { .. } => ErrorCategory::Validation,
            Self::InvalidScope { .. } => ErrorCategory::Authorization,
            Self::InvalidDpopProof { .. } => ErrorCategory::Authentication,
            Self::AuthorizationPending => ErrorCategory::Backchannel,
            Self::SlowDown => ErrorCategory::Backchannel,
            Self::AccessDenied { .. } => ErrorCategory::Authorization,
            Self::ExpiredToken { .. } => ErrorCategory::Backchannel,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the OAuth 2.0 error code for this error.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request",
            Self::InvalidClient { .. } => "invalid_client",
            Self::InvalidGrant { .. } => "invalid_grant",
            Self::UnauthorizedClient { .. } => "unauthorized_client",
            Self::UnsupportedGrantType { .. } => "unsupported_grant_type",
            Self::InvalidScope { .. } => "invalid_scope",
            Self::InvalidDpopProof { .. } => "invalid_dpop_proof",
            Self::AuthorizationPending => "authorization_pending",
            Self::SlowDown => "slow_down",
            Self::AccessDenied { .. } => "access_denied",
            Self::ExpiredToken { .. } => "expired_token",
            Self::Storage { .. } => "server_error",
            Self::Configuration { .. } => "server_error",
            Self::Internal { .. } => "server_error",
        }
    }

    /// Returns the HTTP status code for this error at the token endpoint.
    ///
    /// Only `invalid_client` answers 401 (RFC 6749 §5.2); every other
    /// structured error is 400, and server errors are 500.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidClient { .. } => 401,
            _ if self.is_server_error() => 500,
            _ => 400,
        }
    }
}

/// Categories of token endpoint errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Authentication-related errors (identity verification).
    Authentication,
    /// Authorization-related errors (permission checks).
    Authorization,
    /// Request validation errors.
    Validation,
    /// CIBA / device backchannel polling outcomes.
    Backchannel,
    /// Infrastructure/storage errors.
    Infrastructure,
    /// Configuration errors.
    Configuration,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Authorization => write!(f, "authorization"),
            Self::Validation => write!(f, "validation"),
            Self::Backchannel => write!(f, "backchannel"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::invalid_client("client not found");
        assert_eq!(err.to_string(), "Invalid client: client not found");

        let err = AuthError::invalid_grant("expired authorization code");
        assert_eq!(err.to_string(), "Invalid grant: expired authorization code");

        let err = AuthError::AuthorizationPending;
        assert_eq!(err.to_string(), "Authorization pending");

        let err = AuthError::invalid_dpop_proof("malformed header");
        assert_eq!(err.to_string(), "Invalid DPoP proof: malformed header");
    }

    #[test]
    fn test_error_predicates() {
        let err = AuthError::invalid_client("test");
        assert!(err.is_client_error());
        assert!(!err.is_server_error());

        let err = AuthError::SlowDown;
        assert!(err.is_client_error());

        let err = AuthError::storage("database down");
        assert!(!err.is_client_error());
        assert!(err.is_server_error());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            AuthError::invalid_client("test").category(),
            ErrorCategory::Authentication
        );
        assert_eq!(
            AuthError::unauthorized_client("test").category(),
            ErrorCategory::Authorization
        );
        assert_eq!(AuthError::SlowDown.category(), ErrorCategory::Backchannel);
        assert_eq!(
            AuthError::storage("test").category(),
            ErrorCategory::Infrastructure
        );
    }

    #[test]
    fn test_oauth_error_code() {
        assert_eq!(
            AuthError::invalid_client("test").oauth_error_code(),
            "invalid_client"
        );
        assert_eq!(
            AuthError::invalid_grant("test").oauth_error_code(),
            "invalid_grant"
        );
        assert_eq!(
            AuthError::invalid_dpop_proof("test").oauth_error_code(),
            "invalid_dpop_proof"
        );
        assert_eq!(
            AuthError::AuthorizationPending.oauth_error_code(),
            "authorization_pending"
        );
        assert_eq!(AuthError::SlowDown.oauth_error_code(), "slow_down");
        assert_eq!(
            AuthError::expired_token("test").oauth_error_code(),
            "expired_token"
        );
        assert_eq!(
            AuthError::unsupported_grant_type("test").oauth_error_code(),
            "unsupported_grant_type"
        );
    }

    #[test]
    fn test_http_status() {
        assert_eq!(AuthError::invalid_client("test").http_status(), 401);
        assert_eq!(AuthError::invalid_grant("test").http_status(), 400);
        assert_eq!(AuthError::AuthorizationPending.http_status(), 400);
        assert_eq!(AuthError::SlowDown.http_status(), 400);
        assert_eq!(AuthError::access_denied("test").http_status(), 400);
        assert_eq!(AuthError::internal("test").http_status(), 500);
    }
}
