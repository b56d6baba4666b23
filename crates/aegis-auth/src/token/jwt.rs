//! JWT signing for access and id tokens.
//!
//! Tokens are built as plain claim maps so that registered claim transforms
//! can mutate them before (and, for id tokens, after) signing. HS256 keys
//! come straight from configuration; RS256 keys are loaded from PEM material.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde_json::{Map, Value};

/// Claim set of a token under construction.
pub type ClaimsMap = Map<String, Value>;

/// Errors that can occur during JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    EncodingError {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode a token.
    #[error("Failed to decode token: {message}")]
    DecodingError {
        /// Description of the decoding error.
        message: String,
    },

    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The token signature is invalid.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Invalid key format or data.
    #[error("Invalid key: {message}")]
    InvalidKey {
        /// Description of why the key is invalid.
        message: String,
    },
}

impl JwtError {
    /// Creates a new `EncodingError`.
    #[must_use]
    pub fn encoding_error(message: impl Into<String>) -> Self {
        Self::EncodingError {
            message: message.into(),
        }
    }

    /// Creates a new `DecodingError`.
    #[must_use]
    pub fn decoding_error(message: impl Into<String>) -> Self {
        Self::DecodingError {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidKey` error.
    #[must_use]
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
                Self::invalid_key(err.to_string())
            }
            _ => Self::decoding_error(err.to_string()),
        }
    }
}

/// JWT signing/verification service.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    issuer: String,
}

impl JwtService {
    /// Creates a service signing with HS256 and a shared secret.
    #[must_use]
    pub fn new_hmac(secret: &[u8], issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            issuer: issuer.into(),
        }
    }

    /// Creates a service signing with RS256 from PEM key material.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::InvalidKey` when either PEM fails to parse.
    pub fn from_rsa_pem(
        private_pem: &[u8],
        public_pem: &[u8],
        issuer: impl Into<String>,
    ) -> Result<Self, JwtError> {
        Ok(Self {
            encoding_key: EncodingKey::from_rsa_pem(private_pem)
                .map_err(|e| JwtError::invalid_key(e.to_string()))?,
            decoding_key: DecodingKey::from_rsa_pem(public_pem)
                .map_err(|e| JwtError::invalid_key(e.to_string()))?,
            algorithm: Algorithm::RS256,
            issuer: issuer.into(),
        })
    }

    /// Returns the configured issuer.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Signs a claim map into a compact JWT.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` when signing fails.
    pub fn encode_claims(&self, claims: &ClaimsMap) -> Result<String, JwtError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map_err(|e| JwtError::encoding_error(e.to_string()))
    }

    /// Verifies a compact JWT and returns its claim map.
    ///
    /// Expiry is not enforced here; minted tokens may deliberately carry no
    /// `exp` claim.
    ///
    /// # Errors
    ///
    /// Returns a `JwtError` when the signature or structure is invalid.
    pub fn decode_claims(&self, token: &str) -> Result<ClaimsMap, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<ClaimsMap>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_service() -> JwtService {
        JwtService::new_hmac(b"test-secret-key-material", "https://id.example.com")
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let service = test_service();

        let mut claims = ClaimsMap::new();
        claims.insert("iss".to_string(), json!("https://id.example.com"));
        claims.insert("sub".to_string(), json!("user-123"));
        claims.insert("scope".to_string(), json!("openid profile"));

        let token = service.encode_claims(&claims).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let decoded = service.decode_claims(&token).unwrap();
        assert_eq!(decoded.get("sub"), Some(&json!("user-123")));
        assert_eq!(decoded.get("scope"), Some(&json!("openid profile")));
    }

    #[test]
    fn test_decode_without_exp_claim() {
        let service = test_service();

        let mut claims = ClaimsMap::new();
        claims.insert("sub".to_string(), json!("user-123"));

        let token = service.encode_claims(&claims).unwrap();
        assert!(service.decode_claims(&token).is_ok());
    }

    #[test]
    fn test_decode_rejects_tampered_token() {
        let service = test_service();

        let mut claims = ClaimsMap::new();
        claims.insert("sub".to_string(), json!("user-123"));
        let token = service.encode_claims(&claims).unwrap();

        let mut tampered = token.clone();
        tampered.truncate(token.len() - 4);
        tampered.push_str("AAAA");

        assert!(service.decode_claims(&tampered).is_err());
    }

    #[test]
    fn test_decode_rejects_foreign_key() {
        let service = test_service();
        let other = JwtService::new_hmac(b"another-secret", "https://id.example.com");

        let mut claims = ClaimsMap::new();
        claims.insert("sub".to_string(), json!("user-123"));
        let token = other.encode_claims(&claims).unwrap();

        assert!(service.decode_claims(&token).is_err());
    }
}
