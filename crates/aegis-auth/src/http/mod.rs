//! HTTP surface for the token endpoint.

pub mod token;

pub use token::{TokenState, token_handler};
