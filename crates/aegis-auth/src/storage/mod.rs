//! Storage traits for token-issuance data.
//!
//! This module defines storage interfaces for:
//!
//! - OAuth client registrations
//! - Authorization grants (codes, CIBA, device flows)
//! - Refresh token records
//! - Pending backchannel authorization records
//! - Resource owners
//!
//! Implementations are provided by storage backends; the core crate ships
//! none (tests use in-memory mocks).

pub mod cache;
pub mod client;
pub mod grant;
pub mod refresh_token;
pub mod user;

pub use cache::{BackchannelCache, PendingAuthorization, PendingStatus};
pub use client::ClientStorage;
pub use grant::GrantStorage;
pub use refresh_token::RefreshTokenStorage;
pub use user::UserStorage;
