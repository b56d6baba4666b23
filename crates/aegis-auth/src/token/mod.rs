//! Token minting and grant processing.
//!
//! - [`jwt`] - JWT signing/verification over claim maps
//! - [`transforms`] - pre-/post-signing claim transforms
//! - [`context`] - per-request execution context
//! - [`backchannel`] - CIBA/device polling state machine
//! - [`service`] - the grant processors behind the token endpoint

pub mod backchannel;
pub mod context;
pub mod jwt;
pub mod service;
pub mod transforms;

pub use backchannel::{PollDecision, evaluate_poll, pending_error};
pub use context::ExecutionContext;
pub use jwt::{ClaimsMap, JwtError, JwtService};
pub use service::{PasswordAuthenticator, TokenService, UpdateTokenHook};
pub use transforms::{ClaimsTransform, TokenTransforms};
