//! Issued token domain types.
//!
//! # Security
//!
//! - Refresh tokens are stored as SHA-256 hashes, never plaintext
//! - Access and id tokens are signed JWTs and are not persisted here

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// The `token_type` advertised in the token response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    /// Plain bearer token.
    Bearer,
    /// Sender-constrained token bound to a DPoP key.
    #[serde(rename = "DPoP")]
    DPoP,
}

impl TokenType {
    /// Returns the token_type response value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bearer => "Bearer",
            Self::DPoP => "DPoP",
        }
    }
}

/// A freshly minted access token.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// The signed JWT returned to the client.
    pub code: String,

    /// Bearer or DPoP, depending on proof-of-possession binding.
    pub token_type: TokenType,

    /// When the token was minted.
    pub issued_at: OffsetDateTime,

    /// When the token expires (None = no declared expiry).
    pub expires_at: Option<OffsetDateTime>,
}

impl AccessToken {
    /// Remaining lifetime in whole seconds, when the token declares expiry.
    #[must_use]
    pub fn expires_in(&self) -> Option<u64> {
        self.expires_at.map(|exp| {
            let secs = (exp - self.issued_at).whole_seconds();
            u64::try_from(secs).unwrap_or(0)
        })
    }
}

/// A freshly minted OpenID Connect id token.
#[derive(Debug, Clone)]
pub struct IdToken {
    /// The signed JWT returned to the client.
    pub code: String,
}

/// Refresh token record as persisted.
///
/// The token itself is never stored. Only a SHA-256 hash is persisted,
/// similar to password storage. When validating a refresh token:
///
/// 1. Hash the incoming token
/// 2. Look up by hash
/// 3. Validate the client, validity flag and expiration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRecord {
    /// Unique identifier for this refresh token record.
    pub id: Uuid,

    /// SHA-256 hash of the actual token value.
    /// The plaintext token is returned to the client but never stored.
    pub token_hash: String,

    /// The grant this token was minted from.
    pub grant_id: Uuid,

    /// Client ID that this token was issued to.
    pub client_id: String,

    /// Cleared when the token is rotated away or revoked.
    pub valid: bool,

    /// When this token was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When this token expires (None = no expiration).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub expires_at: Option<OffsetDateTime>,
}

impl RefreshTokenRecord {
    /// Returns `true` if this token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|exp| OffsetDateTime::now_utc() > exp)
            .unwrap_or(false)
    }

    /// Returns `true` if this token is usable (valid flag set and not expired).
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.valid && !self.is_expired()
    }

    /// Hash a token value using SHA-256.
    ///
    /// This is used both when storing new tokens and when looking up
    /// tokens for validation.
    #[must_use]
    pub fn hash_token(token: &str) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Generate a cryptographically secure random token.
    ///
    /// Returns a 256-bit random value encoded as base64url (43 characters).
    #[must_use]
    pub fn generate_token() -> String {
        use base64::Engine;
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;

        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn create_test_record(expires_at: Option<OffsetDateTime>, valid: bool) -> RefreshTokenRecord {
        RefreshTokenRecord {
            id: Uuid::new_v4(),
            token_hash: RefreshTokenRecord::hash_token("test-token"),
            grant_id: Uuid::new_v4(),
            client_id: "test-client".to_string(),
            valid,
            created_at: OffsetDateTime::now_utc(),
            expires_at,
        }
    }

    #[test]
    fn test_hash_token() {
        let token = "test-token-value";
        let hash = RefreshTokenRecord::hash_token(token);

        // SHA-256 produces 64 hex characters
        assert_eq!(hash.len(), 64);

        // Same input produces same hash
        assert_eq!(hash, RefreshTokenRecord::hash_token(token));

        // Different input produces different hash
        assert_ne!(hash, RefreshTokenRecord::hash_token("different-token"));
    }

    #[test]
    fn test_generate_token() {
        let token = RefreshTokenRecord::generate_token();

        // 32 bytes base64url encoded = 43 characters
        assert_eq!(token.len(), 43);

        // Should be URL-safe base64
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_generate_token_uniqueness() {
        let tokens: Vec<String> = (0..100)
            .map(|_| RefreshTokenRecord::generate_token())
            .collect();

        let mut unique = tokens.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(tokens.len(), unique.len());
    }

    #[test]
    fn test_is_expired() {
        let now = OffsetDateTime::now_utc();

        // Not expired (no expiration)
        assert!(!create_test_record(None, true).is_expired());

        // Not expired (future expiration)
        assert!(!create_test_record(Some(now + Duration::hours(1)), true).is_expired());

        // Expired
        assert!(create_test_record(Some(now - Duration::minutes(1)), true).is_expired());
    }

    #[test]
    fn test_is_usable() {
        let now = OffsetDateTime::now_utc();

        assert!(create_test_record(Some(now + Duration::hours(1)), true).is_usable());
        assert!(!create_test_record(Some(now + Duration::hours(1)), false).is_usable());
        assert!(!create_test_record(Some(now - Duration::minutes(1)), true).is_usable());
    }

    #[test]
    fn test_access_token_expires_in() {
        let now = OffsetDateTime::now_utc();
        let token = AccessToken {
            code: "jwt".to_string(),
            token_type: TokenType::Bearer,
            issued_at: now,
            expires_at: Some(now + Duration::seconds(300)),
        };
        assert_eq!(token.expires_in(), Some(300));

        let token = AccessToken {
            code: "jwt".to_string(),
            token_type: TokenType::Bearer,
            issued_at: now,
            expires_at: None,
        };
        assert_eq!(token.expires_in(), None);
    }

    #[test]
    fn test_token_type_as_str() {
        assert_eq!(TokenType::Bearer.as_str(), "Bearer");
        assert_eq!(TokenType::DPoP.as_str(), "DPoP");
    }

    #[test]
    fn test_record_serialization() {
        let now = OffsetDateTime::now_utc();
        let record = create_test_record(Some(now + Duration::hours(1)), true);

        let json = serde_json::to_string(&record).unwrap();
        let deserialized: RefreshTokenRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(record.id, deserialized.id);
        assert_eq!(record.token_hash, deserialized.token_hash);
        assert_eq!(record.grant_id, deserialized.grant_id);
        assert_eq!(record.valid, deserialized.valid);
    }
}
