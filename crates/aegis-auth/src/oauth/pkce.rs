//! PKCE (Proof Key for Code Exchange) implementation
//!
//! Implements RFC 7636 with both registered methods, `plain` and `S256`.
//! The challenge method is stored with the grant at authorization time and
//! replayed during code exchange.
//!
//! Exchange-time verification is deliberately oracle-free: a missing
//! challenge, a missing verifier, and a mismatched verifier all produce the
//! same `invalid_grant` error with the same description.
//!
//! # Example
//!
//! ```
//! use aegis_auth::oauth::pkce::{PkceChallenge, PkceChallengeMethod, PkceVerifier};
//!
//! // Client generates a verifier and challenge
//! let verifier = PkceVerifier::generate();
//! let challenge = PkceChallenge::from_verifier(&verifier, PkceChallengeMethod::S256);
//!
//! // Server stores the challenge, later verifies with the verifier from the
//! // token request
//! assert!(challenge.verify(&verifier, PkceChallengeMethod::S256).is_ok());
//! ```

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::AuthError;
use crate::AuthResult;

/// The constant error surfaced for every exchange-time PKCE failure.
const PKCE_FAILED: &str = "PKCE verification failed";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during PKCE operations.
#[derive(Debug, thiserror::Error)]
pub enum PkceError {
    /// Verifier length is outside the valid range (43-128 characters).
    #[error("Invalid verifier length: must be 43-128 characters, got {0}")]
    InvalidVerifierLength(usize),

    /// Verifier contains invalid characters.
    #[error("Invalid verifier characters: must be URL-safe base64 ([A-Za-z0-9-._~])")]
    InvalidVerifierCharacters,

    /// Unsupported challenge method.
    #[error("Unsupported challenge method: {0}")]
    UnsupportedMethod(String),

    /// PKCE verification failed (verifier doesn't match challenge).
    #[error("PKCE verification failed: verifier does not match challenge")]
    VerificationFailed,
}

// =============================================================================
// PKCE Challenge Method
// =============================================================================

/// PKCE challenge method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PkceChallengeMethod {
    /// The verifier is the challenge.
    #[serde(rename = "plain")]
    Plain,
    /// SHA-256 hash of the verifier, base64url encoded.
    S256,
}

impl PkceChallengeMethod {
    /// Parse challenge method from string.
    ///
    /// # Errors
    ///
    /// Returns `PkceError::UnsupportedMethod` for anything but "plain"/"S256".
    pub fn parse(method: &str) -> Result<Self, PkceError> {
        match method {
            "plain" => Ok(Self::Plain),
            "S256" => Ok(Self::S256),
            other => Err(PkceError::UnsupportedMethod(other.to_string())),
        }
    }

    /// Get the method as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::S256 => "S256",
        }
    }
}

impl std::fmt::Display for PkceChallengeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for PkceChallengeMethod {
    fn default() -> Self {
        Self::S256
    }
}

// =============================================================================
// PKCE Verifier
// =============================================================================

/// PKCE code verifier.
///
/// A high-entropy cryptographic random string using the unreserved characters
/// `[A-Z] / [a-z] / [0-9] / "-" / "." / "_" / "~"`, with a minimum length of
/// 43 characters and a maximum length of 128 characters (RFC 7636 §4.1).
#[derive(Debug, Clone)]
pub struct PkceVerifier(String);

impl PkceVerifier {
    /// Create a new verifier from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Length is not between 43 and 128 characters
    /// - Contains characters other than `[A-Za-z0-9-._~]`
    pub fn new(verifier: String) -> Result<Self, PkceError> {
        let len = verifier.len();

        // RFC 7636: verifier must be 43-128 characters
        if !(43..=128).contains(&len) {
            return Err(PkceError::InvalidVerifierLength(len));
        }

        if !verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_' || c == '~')
        {
            return Err(PkceError::InvalidVerifierCharacters);
        }

        Ok(Self(verifier))
    }

    /// Generate a cryptographically random verifier.
    ///
    /// Generates 32 random bytes and encodes them as base64url (43 characters).
    #[must_use]
    pub fn generate() -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        // `gen` is a reserved keyword in Rust 2024, so we use r#gen
        let bytes: [u8; 32] = rng.r#gen();
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Get the verifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PkceVerifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// PKCE Challenge
// =============================================================================

/// PKCE code challenge.
///
/// For S256 the challenge is `BASE64URL(SHA256(ASCII(code_verifier)))`
/// (RFC 7636 §4.2); for plain it is the verifier itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceChallenge(String);

impl PkceChallenge {
    /// Create a challenge from a verifier with the given method.
    #[must_use]
    pub fn from_verifier(verifier: &PkceVerifier, method: PkceChallengeMethod) -> Self {
        Self(compute_challenge(verifier.as_str(), method))
    }

    /// Wrap a raw challenge string received from the client.
    #[must_use]
    pub fn new(challenge: String) -> Self {
        Self(challenge)
    }

    /// Verify that a verifier matches this challenge under the given method.
    ///
    /// # Errors
    ///
    /// Returns `PkceError::VerificationFailed` if the verifier doesn't match.
    pub fn verify(
        &self,
        verifier: &PkceVerifier,
        method: PkceChallengeMethod,
    ) -> Result<(), PkceError> {
        if self.0 == compute_challenge(verifier.as_str(), method) {
            Ok(())
        } else {
            Err(PkceError::VerificationFailed)
        }
    }

    /// Get the challenge as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Derives the challenge for a raw verifier string.
#[must_use]
pub fn compute_challenge(verifier: &str, method: PkceChallengeMethod) -> String {
    match method {
        PkceChallengeMethod::Plain => verifier.to_string(),
        PkceChallengeMethod::S256 => {
            let mut hasher = Sha256::new();
            hasher.update(verifier.as_bytes());
            URL_SAFE_NO_PAD.encode(hasher.finalize())
        }
    }
}

// =============================================================================
// Exchange-time verification
// =============================================================================

/// Verifies the PKCE exchange for an authorization code redemption.
///
/// When the grant stored no challenge and the request carries no verifier the
/// check passes, unless `pkce_required` makes the absence itself an error.
/// Every failure mode returns the same `invalid_grant` error so that a probing
/// client learns nothing about which side was absent or wrong.
///
/// # Errors
///
/// Returns `AuthError::InvalidGrant` on any mismatch or one-sided absence.
pub fn verify_exchange(
    challenge: Option<&str>,
    method: Option<PkceChallengeMethod>,
    verifier: Option<&str>,
    pkce_required: bool,
) -> AuthResult<()> {
    match (challenge, verifier) {
        (None, None) => {
            if pkce_required {
                Err(AuthError::invalid_grant(PKCE_FAILED))
            } else {
                Ok(())
            }
        }
        (Some(challenge), Some(verifier)) => {
            let method = method.unwrap_or_default();
            if challenge == compute_challenge(verifier, method) {
                Ok(())
            } else {
                Err(AuthError::invalid_grant(PKCE_FAILED))
            }
        }
        // One side missing: same error as a mismatch.
        _ => Err(AuthError::invalid_grant(PKCE_FAILED)),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verifier_generation() {
        let verifier = PkceVerifier::generate();
        let len = verifier.as_str().len();
        assert!((43..=128).contains(&len));

        assert!(
            verifier
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_verifier_validation_length() {
        assert!(matches!(
            PkceVerifier::new("a".repeat(42)),
            Err(PkceError::InvalidVerifierLength(42))
        ));
        assert!(PkceVerifier::new("a".repeat(43)).is_ok());
        assert!(PkceVerifier::new("a".repeat(128)).is_ok());
        assert!(matches!(
            PkceVerifier::new("a".repeat(129)),
            Err(PkceError::InvalidVerifierLength(129))
        ));
    }

    #[test]
    fn test_verifier_validation_characters() {
        let valid = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-._~"
            .chars()
            .cycle()
            .take(64)
            .collect::<String>();
        assert!(PkceVerifier::new(valid).is_ok());

        let invalid = "abcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()ZZ".to_string();
        assert!(matches!(
            PkceVerifier::new(invalid),
            Err(PkceError::InvalidVerifierCharacters)
        ));
    }

    #[test]
    fn test_challenge_s256_roundtrip() {
        let verifier = PkceVerifier::generate();
        let challenge = PkceChallenge::from_verifier(&verifier, PkceChallengeMethod::S256);

        // SHA-256 produces 32 bytes, base64url encoded = 43 characters
        assert_eq!(challenge.as_str().len(), 43);
        assert!(challenge.verify(&verifier, PkceChallengeMethod::S256).is_ok());

        let other = PkceVerifier::generate();
        assert!(matches!(
            challenge.verify(&other, PkceChallengeMethod::S256),
            Err(PkceError::VerificationFailed)
        ));
    }

    #[test]
    fn test_challenge_plain_roundtrip() {
        let verifier = PkceVerifier::generate();
        let challenge = PkceChallenge::from_verifier(&verifier, PkceChallengeMethod::Plain);

        assert_eq!(challenge.as_str(), verifier.as_str());
        assert!(
            challenge
                .verify(&verifier, PkceChallengeMethod::Plain)
                .is_ok()
        );
    }

    #[test]
    fn test_challenge_method_parse() {
        assert_eq!(
            PkceChallengeMethod::parse("S256").unwrap(),
            PkceChallengeMethod::S256
        );
        assert_eq!(
            PkceChallengeMethod::parse("plain").unwrap(),
            PkceChallengeMethod::Plain
        );
        assert!(matches!(
            PkceChallengeMethod::parse("S512"),
            Err(PkceError::UnsupportedMethod(_))
        ));
    }

    #[test]
    fn test_rfc7636_appendix_b_test_vector() {
        // Test vector from RFC 7636 Appendix B
        let verifier =
            PkceVerifier::new("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk".to_string()).unwrap();

        let challenge = PkceChallenge::from_verifier(&verifier, PkceChallengeMethod::S256);
        assert_eq!(
            challenge.as_str(),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_verify_exchange_absent_both_sides() {
        assert!(verify_exchange(None, None, None, false).is_ok());

        // Mandatory PKCE turns the absence into a failure
        let err = verify_exchange(None, None, None, true).unwrap_err();
        assert!(matches!(err, AuthError::InvalidGrant { .. }));
    }

    #[test]
    fn test_verify_exchange_matching() {
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        let challenge = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";

        assert!(
            verify_exchange(
                Some(challenge),
                Some(PkceChallengeMethod::S256),
                Some(verifier),
                false
            )
            .is_ok()
        );

        assert!(
            verify_exchange(
                Some(verifier),
                Some(PkceChallengeMethod::Plain),
                Some(verifier),
                false
            )
            .is_ok()
        );
    }

    #[test]
    fn test_verify_exchange_constant_error() {
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        let challenge = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";

        // Mismatch, missing verifier, and missing challenge all surface the
        // identical error message.
        let mismatch = verify_exchange(
            Some(challenge),
            Some(PkceChallengeMethod::S256),
            Some("wrong-verifier-wrong-verifier-wrong-verifier"),
            false,
        )
        .unwrap_err();
        let no_verifier =
            verify_exchange(Some(challenge), Some(PkceChallengeMethod::S256), None, false)
                .unwrap_err();
        let no_challenge = verify_exchange(None, None, Some(verifier), false).unwrap_err();

        assert_eq!(mismatch.to_string(), no_verifier.to_string());
        assert_eq!(no_verifier.to_string(), no_challenge.to_string());
    }

    #[test]
    fn test_verify_exchange_defaults_to_s256() {
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        let challenge = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";

        // Stored method missing: S256 assumed
        assert!(verify_exchange(Some(challenge), None, Some(verifier), false).is_ok());
    }

    #[test]
    fn test_method_serde() {
        let json = serde_json::to_string(&PkceChallengeMethod::Plain).unwrap();
        assert_eq!(json, "\"plain\"");
        let json = serde_json::to_string(&PkceChallengeMethod::S256).unwrap();
        assert_eq!(json, "\"S256\"");
    }
}
