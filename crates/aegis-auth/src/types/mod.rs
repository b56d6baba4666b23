//! Domain types for the token-issuance core.
//!
//! - [`client`] - OAuth 2.0 client registrations and grant types
//! - [`user`] - Resource owners (end-users)
//! - [`grant`] - Authorization grants and their per-flow data
//! - [`token`] - Issued token representations

pub mod client;
pub mod grant;
pub mod token;
pub mod user;

pub use client::{BackchannelTokenDeliveryMode, Client, ClientValidationError, GrantType};
pub use grant::{Grant, GrantVariant};
pub use token::{AccessToken, IdToken, RefreshTokenRecord, TokenType};
pub use user::{User, UserStatus};
