//! Client authentication for the token endpoint.
//!
//! Clients authenticate using one of:
//! - HTTP Basic Auth header: `Authorization: Basic <base64(client_id:client_secret)>`
//! - Request body: `client_id` and `client_secret` parameters
//! - Public client: just `client_id` (authorization_code with PKCE)

use std::sync::Arc;

use axum::http::HeaderMap;
use base64::Engine;

use crate::error::AuthError;
use crate::oauth::token::TokenRequest;
use crate::storage::ClientStorage;
use crate::types::Client;
use crate::AuthResult;

/// Client authentication credentials extracted from the request.
#[derive(Debug)]
pub enum ClientAuth {
    /// HTTP Basic authentication.
    Basic {
        /// Client identifier from the Basic credentials.
        client_id: String,
        /// Client secret from the Basic credentials.
        client_secret: String,
    },
    /// Client credentials in request body.
    Body {
        /// Client identifier from the form body.
        client_id: String,
        /// Client secret from the form body.
        client_secret: String,
    },
    /// Public client (no secret).
    Public {
        /// Client identifier from the form body.
        client_id: String,
    },
    /// No client credentials provided.
    None,
}

impl ClientAuth {
    /// Returns the client_id carried by these credentials, if any.
    #[must_use]
    pub fn client_id(&self) -> Option<&str> {
        match self {
            Self::Basic { client_id, .. }
            | Self::Body { client_id, .. }
            | Self::Public { client_id } => Some(client_id),
            Self::None => None,
        }
    }
}

/// Extract client authentication from headers and request body.
#[must_use]
pub fn extract_client_auth(headers: &HeaderMap, request: &TokenRequest) -> ClientAuth {
    // Try HTTP Basic Auth first
    if let Some(auth_header) = headers.get("authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(basic_creds) = auth_str.strip_prefix("Basic ") {
                if let Ok(decoded) =
                    base64::engine::general_purpose::STANDARD.decode(basic_creds.trim())
                {
                    if let Ok(creds_str) = String::from_utf8(decoded) {
                        if let Some((client_id, client_secret)) = creds_str.split_once(':') {
                            return ClientAuth::Basic {
                                client_id: client_id.to_string(),
                                client_secret: client_secret.to_string(),
                            };
                        }
                    }
                }
            }
        }
    }

    // Try client_id + client_secret in body
    if let (Some(client_id), Some(client_secret)) =
        (request.client_id.as_ref(), request.client_secret.as_ref())
    {
        return ClientAuth::Body {
            client_id: client_id.clone(),
            client_secret: client_secret.clone(),
        };
    }

    // Public client (client_id only)
    if let Some(client_id) = request.client_id.as_ref() {
        return ClientAuth::Public {
            client_id: client_id.clone(),
        };
    }

    ClientAuth::None
}

/// Authenticate the client based on provided credentials.
///
/// # Errors
///
/// Returns `AuthError::InvalidClient` when no credentials were provided, the
/// client is unknown or inactive, or the secret does not verify.
pub async fn authenticate_client(
    client_storage: &Arc<dyn ClientStorage>,
    auth: ClientAuth,
) -> AuthResult<Client> {
    let (client_id, secret) = match auth {
        ClientAuth::Basic {
            client_id,
            client_secret,
        }
        | ClientAuth::Body {
            client_id,
            client_secret,
        } => (client_id, Some(client_secret)),
        ClientAuth::Public { client_id } => (client_id, None),
        ClientAuth::None => {
            return Err(AuthError::invalid_client("No client credentials provided"));
        }
    };

    let client = client_storage
        .find_by_client_id(&client_id)
        .await?
        .ok_or_else(|| AuthError::invalid_client("Unknown client"))?;

    if !client.active {
        return Err(AuthError::invalid_client("Client is inactive"));
    }

    // Verify secret for confidential clients
    if client.confidential {
        let provided_secret = secret.ok_or_else(|| {
            AuthError::invalid_client("Client secret required for confidential client")
        })?;

        // Verify using storage (allows for hashed secrets)
        let valid = client_storage
            .verify_secret(&client_id, &provided_secret)
            .await?;

        if !valid {
            return Err(AuthError::invalid_client("Invalid client secret"));
        }
    }

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_request(grant_type: &str) -> TokenRequest {
        TokenRequest {
            grant_type: grant_type.to_string(),
            code: None,
            redirect_uri: None,
            code_verifier: None,
            client_id: None,
            client_secret: None,
            refresh_token: None,
            scope: None,
            username: None,
            password: None,
            auth_req_id: None,
            device_code: None,
            session_id: None,
        }
    }

    #[test]
    fn test_extract_basic_auth() {
        let mut headers = HeaderMap::new();
        // Basic auth for "client_id:client_secret"
        let encoded = base64::engine::general_purpose::STANDARD.encode("test-client:test-secret");
        headers.insert("authorization", format!("Basic {encoded}").parse().unwrap());

        let request = empty_request("client_credentials");

        match extract_client_auth(&headers, &request) {
            ClientAuth::Basic {
                client_id,
                client_secret,
            } => {
                assert_eq!(client_id, "test-client");
                assert_eq!(client_secret, "test-secret");
            }
            other => panic!("Expected Basic auth, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_body_auth() {
        let headers = HeaderMap::new();
        let mut request = empty_request("client_credentials");
        request.client_id = Some("test-client".to_string());
        request.client_secret = Some("test-secret".to_string());

        match extract_client_auth(&headers, &request) {
            ClientAuth::Body {
                client_id,
                client_secret,
            } => {
                assert_eq!(client_id, "test-client");
                assert_eq!(client_secret, "test-secret");
            }
            other => panic!("Expected Body auth, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_public_client() {
        let headers = HeaderMap::new();
        let mut request = empty_request("authorization_code");
        request.client_id = Some("public-client".to_string());

        match extract_client_auth(&headers, &request) {
            ClientAuth::Public { client_id } => {
                assert_eq!(client_id, "public-client");
            }
            other => panic!("Expected Public auth, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_none() {
        let headers = HeaderMap::new();
        let request = empty_request("client_credentials");
        assert!(matches!(
            extract_client_auth(&headers, &request),
            ClientAuth::None
        ));
    }

    #[test]
    fn test_basic_auth_wins_over_body() {
        let mut headers = HeaderMap::new();
        let encoded = base64::engine::general_purpose::STANDARD.encode("header-client:s1");
        headers.insert("authorization", format!("Basic {encoded}").parse().unwrap());

        let mut request = empty_request("client_credentials");
        request.client_id = Some("body-client".to_string());
        request.client_secret = Some("s2".to_string());

        let auth = extract_client_auth(&headers, &request);
        assert_eq!(auth.client_id(), Some("header-client"));
    }
}
