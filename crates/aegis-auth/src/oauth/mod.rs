//! OAuth 2.0 wire-level types and checks.
//!
//! - [`token`] - Token endpoint request/response/error types
//! - [`pkce`] - PKCE challenge and verifier handling
//! - [`dpop`] - DPoP proof parsing and JWK thumbprints
//! - [`client_auth`] - Client authentication extraction

pub mod client_auth;
pub mod dpop;
pub mod pkce;
pub mod token;

pub use client_auth::{ClientAuth, authenticate_client, extract_client_auth};
pub use dpop::extract_dpop_jkt;
pub use pkce::{PkceChallengeMethod, PkceError};
pub use token::{TokenError, TokenErrorCode, TokenRequest, TokenResponse};
