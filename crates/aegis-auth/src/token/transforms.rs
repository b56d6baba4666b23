//! Claim transforms.
//!
//! Ordered callback lists applied to token claim maps at exactly two points:
//! before signing, and (for id tokens) after signing. A post-signing
//! transform mutates the claim map after the first signature exists, which
//! forces a re-sign of the id token.

use std::sync::Arc;

use crate::token::jwt::ClaimsMap;

/// A single claim mutation.
pub type ClaimsTransform = Arc<dyn Fn(&mut ClaimsMap) + Send + Sync>;

/// Ordered pre-/post-signing claim transforms for one request.
#[derive(Default, Clone)]
pub struct TokenTransforms {
    pre_signing: Vec<ClaimsTransform>,
    post_signing: Vec<ClaimsTransform>,
}

impl TokenTransforms {
    /// Registers a transform applied before signing.
    pub fn push_pre(&mut self, transform: ClaimsTransform) {
        self.pre_signing.push(transform);
    }

    /// Registers a transform applied after signing (id tokens only).
    pub fn push_post(&mut self, transform: ClaimsTransform) {
        self.post_signing.push(transform);
    }

    /// Applies every pre-signing transform in registration order.
    pub fn apply_pre(&self, claims: &mut ClaimsMap) {
        for transform in &self.pre_signing {
            transform(claims);
        }
    }

    /// Applies every post-signing transform in registration order.
    ///
    /// Returns `true` when at least one transform ran, i.e. the caller must
    /// re-sign.
    pub fn apply_post(&self, claims: &mut ClaimsMap) -> bool {
        for transform in &self.post_signing {
            transform(claims);
        }
        !self.post_signing.is_empty()
    }
}

impl std::fmt::Debug for TokenTransforms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenTransforms")
            .field("pre_signing", &self.pre_signing.len())
            .field("post_signing", &self.post_signing.len())
            .finish()
    }
}
