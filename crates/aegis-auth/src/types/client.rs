//! OAuth 2.0 Client domain types.
//!
//! This module defines the `Client` struct and related types for OAuth 2.0
//! client registrations as seen by the token endpoint.

use serde::{Deserialize, Serialize};

// =============================================================================
// Grant Type
// =============================================================================

/// OAuth 2.0 grant types.
///
/// Defines the authorization flows a client is allowed to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Authorization Code flow (with PKCE for public clients).
    AuthorizationCode,
    /// Client Credentials flow (confidential clients only).
    ClientCredentials,
    /// Refresh Token flow.
    RefreshToken,
    /// Resource Owner Password Credentials flow.
    /// WARNING: This grant type is considered legacy and should only be used
    /// for trusted first-party applications or migration scenarios.
    Password,
    /// OpenID Connect Client-Initiated Backchannel Authentication.
    #[serde(rename = "urn:openid:params:grant-type:ciba")]
    Ciba,
    /// OAuth 2.0 Device Authorization Grant (RFC 8628).
    #[serde(rename = "urn:ietf:params:oauth:grant-type:device_code")]
    DeviceCode,
}

impl GrantType {
    /// Returns the OAuth 2.0 grant_type parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::ClientCredentials => "client_credentials",
            Self::RefreshToken => "refresh_token",
            Self::Password => "password",
            Self::Ciba => "urn:openid:params:grant-type:ciba",
            Self::DeviceCode => "urn:ietf:params:oauth:grant-type:device_code",
        }
    }

    /// Parses a grant_type parameter value.
    ///
    /// Returns `None` for unknown values; the caller decides how to reject them.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "authorization_code" => Some(Self::AuthorizationCode),
            "client_credentials" => Some(Self::ClientCredentials),
            "refresh_token" => Some(Self::RefreshToken),
            "password" => Some(Self::Password),
            "urn:openid:params:grant-type:ciba" => Some(Self::Ciba),
            "urn:ietf:params:oauth:grant-type:device_code" => Some(Self::DeviceCode),
            _ => None,
        }
    }
}

impl std::fmt::Display for GrantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Backchannel Token Delivery Mode
// =============================================================================

/// CIBA token delivery modes.
///
/// Only `poll` and `ping` clients pull tokens from the token endpoint;
/// `push` clients receive them directly at their notification endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackchannelTokenDeliveryMode {
    /// Client polls the token endpoint with the auth_req_id.
    Poll,
    /// Client is notified, then polls the token endpoint.
    Ping,
    /// Tokens are pushed to the client's notification endpoint.
    Push,
}

impl BackchannelTokenDeliveryMode {
    /// Returns the registered delivery mode value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Poll => "poll",
            Self::Ping => "ping",
            Self::Push => "push",
        }
    }

    /// Returns `true` if this mode allows pulling tokens from the token endpoint.
    #[must_use]
    pub fn allows_token_endpoint_delivery(&self) -> bool {
        matches!(self, Self::Poll | Self::Ping)
    }
}

// =============================================================================
// Client
// =============================================================================

/// OAuth 2.0 Client registration.
///
/// Represents the subset of a client registration the token endpoint needs:
/// credentials, permitted flows and scopes, and token lifetime overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Unique client identifier used in OAuth flows.
    pub client_id: String,

    /// Hashed client secret (for confidential clients).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Human-readable display name.
    pub name: String,

    /// OAuth 2.0 grant types this client is allowed to use.
    pub grant_types: Vec<GrantType>,

    /// OAuth scopes this client is allowed to request.
    /// Empty list means all scopes are allowed.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Whether this is a confidential client (has client secret).
    pub confidential: bool,

    /// Whether this client is currently active and can be used.
    pub active: bool,

    /// Access token lifetime in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_lifetime: Option<i64>,

    /// Refresh token lifetime in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token_lifetime: Option<i64>,

    /// Whether PKCE is required for authorization code flow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pkce_required: Option<bool>,

    /// CIBA token delivery mode (None for clients without backchannel flows).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backchannel_token_delivery_mode: Option<BackchannelTokenDeliveryMode>,

    /// Whether the client negotiates id-token token binding (`cnf` claim).
    #[serde(default)]
    pub id_token_token_binding_cnf: bool,
}

impl Client {
    /// Validates the client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client configuration is invalid.
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if self.client_id.is_empty() {
            return Err(ClientValidationError::EmptyClientId);
        }

        if self.grant_types.is_empty() {
            return Err(ClientValidationError::NoGrantTypes);
        }

        // Public clients cannot use client_credentials
        if !self.confidential && self.grant_types.contains(&GrantType::ClientCredentials) {
            return Err(ClientValidationError::PublicClientCredentials);
        }

        // Confidential clients must have a client secret
        if self.confidential && self.client_secret.is_none() {
            return Err(ClientValidationError::MissingSecret);
        }

        // CIBA clients must declare a delivery mode
        if self.grant_types.contains(&GrantType::Ciba)
            && self.backchannel_token_delivery_mode.is_none()
        {
            return Err(ClientValidationError::MissingDeliveryMode);
        }

        Ok(())
    }

    /// Checks if the given scope is allowed for this client.
    ///
    /// An empty scopes list means all scopes are allowed.
    #[must_use]
    pub fn is_scope_allowed(&self, scope: &str) -> bool {
        self.scopes.is_empty() || self.scopes.iter().any(|allowed| allowed == scope)
    }

    /// Checks if the given grant type is allowed for this client.
    #[must_use]
    pub fn is_grant_type_allowed(&self, grant_type: GrantType) -> bool {
        self.grant_types.contains(&grant_type)
    }

    /// Returns whether PKCE is required for this client.
    ///
    /// PKCE is always required for public clients. For confidential clients,
    /// it depends on the `pkce_required` setting (defaults to false).
    #[must_use]
    pub fn requires_pkce(&self) -> bool {
        if !self.confidential {
            true
        } else {
            self.pkce_required.unwrap_or(false)
        }
    }

    /// Returns the access token lifetime in seconds.
    ///
    /// Defaults to 3600 (1 hour) if not specified.
    #[must_use]
    pub fn access_token_lifetime_secs(&self) -> i64 {
        self.access_token_lifetime.unwrap_or(3600)
    }

    /// Returns the refresh token lifetime in seconds.
    ///
    /// Defaults to 2592000 (30 days) if not specified.
    #[must_use]
    pub fn refresh_token_lifetime_secs(&self) -> i64 {
        self.refresh_token_lifetime.unwrap_or(2_592_000)
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Errors that can occur during client validation.
#[derive(Debug, thiserror::Error)]
pub enum ClientValidationError {
    /// Client ID cannot be empty.
    #[error("Client ID cannot be empty")]
    EmptyClientId,

    /// At least one grant type is required.
    #[error("At least one grant type is required")]
    NoGrantTypes,

    /// Public clients cannot use client_credentials grant.
    #[error("Public clients cannot use client_credentials grant")]
    PublicClientCredentials,

    /// Confidential clients require a client secret.
    #[error("Confidential clients require a client secret")]
    MissingSecret,

    /// CIBA clients require a backchannel token delivery mode.
    #[error("CIBA clients require a backchannel token delivery mode")]
    MissingDeliveryMode,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn make_valid_public_client() -> Client {
        Client {
            client_id: "test-client".to_string(),
            client_secret: None,
            name: "Test Client".to_string(),
            grant_types: vec![GrantType::AuthorizationCode],
            scopes: vec![],
            confidential: false,
            active: true,
            access_token_lifetime: None,
            refresh_token_lifetime: None,
            pkce_required: None,
            backchannel_token_delivery_mode: None,
            id_token_token_binding_cnf: false,
        }
    }

    fn make_valid_confidential_client() -> Client {
        Client {
            client_id: "test-confidential".to_string(),
            client_secret: Some("$2b$12$hash".to_string()),
            name: "Confidential Client".to_string(),
            grant_types: vec![GrantType::ClientCredentials, GrantType::RefreshToken],
            scopes: vec!["read".to_string(), "write".to_string()],
            confidential: true,
            active: true,
            access_token_lifetime: Some(1800),
            refresh_token_lifetime: Some(86400),
            pkce_required: Some(false),
            backchannel_token_delivery_mode: None,
            id_token_token_binding_cnf: false,
        }
    }

    #[test]
    fn test_valid_clients() {
        assert!(make_valid_public_client().validate().is_ok());
        assert!(make_valid_confidential_client().validate().is_ok());
    }

    #[test]
    fn test_empty_client_id() {
        let mut client = make_valid_public_client();
        client.client_id = String::new();
        assert!(matches!(
            client.validate(),
            Err(ClientValidationError::EmptyClientId)
        ));
    }

    #[test]
    fn test_no_grant_types() {
        let mut client = make_valid_public_client();
        client.grant_types = vec![];
        assert!(matches!(
            client.validate(),
            Err(ClientValidationError::NoGrantTypes)
        ));
    }

    #[test]
    fn test_public_client_with_client_credentials() {
        let mut client = make_valid_public_client();
        client.grant_types.push(GrantType::ClientCredentials);
        assert!(matches!(
            client.validate(),
            Err(ClientValidationError::PublicClientCredentials)
        ));
    }

    #[test]
    fn test_confidential_without_secret() {
        let mut client = make_valid_confidential_client();
        client.client_secret = None;
        assert!(matches!(
            client.validate(),
            Err(ClientValidationError::MissingSecret)
        ));
    }

    #[test]
    fn test_ciba_without_delivery_mode() {
        let mut client = make_valid_confidential_client();
        client.grant_types.push(GrantType::Ciba);
        assert!(matches!(
            client.validate(),
            Err(ClientValidationError::MissingDeliveryMode)
        ));

        client.backchannel_token_delivery_mode = Some(BackchannelTokenDeliveryMode::Poll);
        assert!(client.validate().is_ok());
    }

    #[test]
    fn test_scope_allowed() {
        let client = make_valid_public_client();
        // Empty scopes list means all scopes allowed
        assert!(client.is_scope_allowed("anything"));

        let client = make_valid_confidential_client();
        assert!(client.is_scope_allowed("read"));
        assert!(client.is_scope_allowed("write"));
        assert!(!client.is_scope_allowed("admin"));
    }

    #[test]
    fn test_grant_type_allowed() {
        let client = make_valid_confidential_client();
        assert!(client.is_grant_type_allowed(GrantType::ClientCredentials));
        assert!(client.is_grant_type_allowed(GrantType::RefreshToken));
        assert!(!client.is_grant_type_allowed(GrantType::AuthorizationCode));
    }

    #[test]
    fn test_requires_pkce() {
        let client = make_valid_public_client();
        // Public clients always require PKCE
        assert!(client.requires_pkce());

        let mut client = make_valid_confidential_client();
        client.pkce_required = None;
        assert!(!client.requires_pkce());

        client.pkce_required = Some(true);
        assert!(client.requires_pkce());
    }

    #[test]
    fn test_token_lifetimes() {
        let mut client = make_valid_public_client();

        // Default values
        assert_eq!(client.access_token_lifetime_secs(), 3600);
        assert_eq!(client.refresh_token_lifetime_secs(), 2_592_000);

        // Custom values
        client.access_token_lifetime = Some(1800);
        client.refresh_token_lifetime = Some(86400);
        assert_eq!(client.access_token_lifetime_secs(), 1800);
        assert_eq!(client.refresh_token_lifetime_secs(), 86400);
    }

    #[test]
    fn test_grant_type_parse_roundtrip() {
        for gt in [
            GrantType::AuthorizationCode,
            GrantType::ClientCredentials,
            GrantType::RefreshToken,
            GrantType::Password,
            GrantType::Ciba,
            GrantType::DeviceCode,
        ] {
            assert_eq!(GrantType::parse(gt.as_str()), Some(gt));
        }
        assert_eq!(GrantType::parse("implicit"), None);
        assert_eq!(GrantType::parse(""), None);
    }

    #[test]
    fn test_delivery_mode_token_endpoint() {
        assert!(BackchannelTokenDeliveryMode::Poll.allows_token_endpoint_delivery());
        assert!(BackchannelTokenDeliveryMode::Ping.allows_token_endpoint_delivery());
        assert!(!BackchannelTokenDeliveryMode::Push.allows_token_endpoint_delivery());
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut client = make_valid_confidential_client();
        client.grant_types.push(GrantType::Ciba);
        client.backchannel_token_delivery_mode = Some(BackchannelTokenDeliveryMode::Ping);

        let json = serde_json::to_string(&client).unwrap();
        assert!(json.contains("urn:openid:params:grant-type:ciba"));

        let parsed: Client = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.client_id, client.client_id);
        assert_eq!(parsed.grant_types, client.grant_types);
        assert_eq!(
            parsed.backchannel_token_delivery_mode,
            Some(BackchannelTokenDeliveryMode::Ping)
        );
    }
}
