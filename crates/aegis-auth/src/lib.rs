//! # aegis-auth
//!
//! Token-issuance core of the Aegis authorization server.
//!
//! This crate provides:
//! - OAuth 2.0 / OpenID Connect token endpoint grant processors
//! - Authorization code exchange with PKCE and replay revocation
//! - Refresh token rotation with configurable policy
//! - CIBA and device flow polling with slow_down pacing
//! - DPoP proof parsing and sender-constrained access tokens
//! - Security event audit logging
//!
//! ## Overview
//!
//! The endpoint is split into a wire layer ([`http`], [`oauth`]) and the
//! grant processors ([`token`]). Storage is abstracted behind async traits
//! ([`storage`]); this crate ships no backends of its own.
//!
//! ## Modules
//!
//! - [`config`] - Token endpoint configuration and policy switches
//! - [`oauth`] - Wire types, PKCE, DPoP, client authentication
//! - [`token`] - JWT minting, claim transforms, grant processors
//! - [`audit`] - Security event audit logging
//! - [`storage`] - Storage traits for auth-related data
//! - [`types`] - Clients, users, grants and issued tokens
//! - [`http`] - Axum HTTP handler for the token endpoint

pub mod audit;
pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod storage;
pub mod token;
pub mod types;

pub use audit::{AuditSink, OAuth2AuditLog, TracingAuditSink};
pub use config::AuthConfig;
pub use error::{AuthError, ErrorCategory};
pub use http::{TokenState, token_handler};
pub use oauth::{
    ClientAuth, PkceChallengeMethod, PkceError, TokenError, TokenErrorCode, TokenRequest,
    TokenResponse, authenticate_client, extract_client_auth, extract_dpop_jkt,
};
pub use storage::{
    BackchannelCache, ClientStorage, GrantStorage, PendingAuthorization, PendingStatus,
    RefreshTokenStorage, UserStorage,
};
pub use token::{
    ClaimsMap, ClaimsTransform, ExecutionContext, JwtError, JwtService, PasswordAuthenticator,
    TokenService, TokenTransforms, UpdateTokenHook,
};
pub use types::{
    AccessToken, BackchannelTokenDeliveryMode, Client, ClientValidationError, Grant, GrantType,
    GrantVariant, IdToken, RefreshTokenRecord, TokenType, User, UserStatus,
};

/// Type alias for token-issuance results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use aegis_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::audit::{AuditSink, OAuth2AuditLog, TracingAuditSink};
    pub use crate::config::AuthConfig;
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::http::{TokenState, token_handler};
    pub use crate::oauth::{
        TokenError, TokenErrorCode, TokenRequest, TokenResponse, extract_dpop_jkt,
    };
    pub use crate::storage::{
        BackchannelCache, ClientStorage, GrantStorage, PendingAuthorization, PendingStatus,
        RefreshTokenStorage, UserStorage,
    };
    pub use crate::token::{
        ExecutionContext, JwtService, PasswordAuthenticator, TokenService, UpdateTokenHook,
    };
    pub use crate::types::{
        Client, Grant, GrantType, GrantVariant, RefreshTokenRecord, User, UserStatus,
    };
}
