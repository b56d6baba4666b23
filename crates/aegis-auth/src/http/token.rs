//! Token endpoint handler.
//!
//! Wires the HTTP surface to [`TokenService`]: extracts proof-of-possession
//! material from headers, authenticates the client, runs the grant processor
//! and finalizes the response. Finalization is the single exit path — it
//! flushes exactly one audit record and stamps the no-store cache headers on
//! success and failure alike. Server-side failures answer a bare 500 with no
//! OAuth error body.

use std::sync::Arc;

use axum::Form;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
use tracing::{debug, error};

use crate::AuthResult;
use crate::audit::{AuditSink, OAuth2AuditLog};
use crate::error::AuthError;
use crate::oauth::client_auth::{authenticate_client, extract_client_auth};
use crate::oauth::dpop::extract_dpop_jkt;
use crate::oauth::token::{TokenError, TokenErrorCode, TokenRequest, TokenResponse};
use crate::storage::ClientStorage;
use crate::token::context::ExecutionContext;
use crate::token::service::TokenService;

/// Shared state for the token endpoint.
#[derive(Clone)]
pub struct TokenState {
    /// The grant processors.
    pub token_service: Arc<TokenService>,
    /// Client registration lookup for authentication.
    pub client_storage: Arc<dyn ClientStorage>,
    /// Destination for audit records.
    pub audit_sink: Arc<dyn AuditSink>,
}

/// `POST /oauth2/token`
///
/// Accepts `application/x-www-form-urlencoded` token requests for every
/// supported grant type.
pub async fn token_handler(
    State(state): State<TokenState>,
    headers: HeaderMap,
    Form(request): Form<TokenRequest>,
) -> Response {
    let mut audit = OAuth2AuditLog::new("TOKEN_REQUEST");
    audit.ip = client_ip(&headers);
    audit.client_id = request.client_id.clone();
    audit.username = request.username.clone();
    audit.scope = request.scope.clone();

    let result = process_request(&state, &headers, &request, &mut audit).await;
    finalize(result, audit, state.audit_sink.as_ref()).await
}

async fn process_request(
    state: &TokenState,
    headers: &HeaderMap,
    request: &TokenRequest,
    audit: &mut OAuth2AuditLog,
) -> AuthResult<TokenResponse> {
    // The DPoP proof is parsed before anything else so a malformed proof is
    // answered with its own error code regardless of grant or credentials.
    let dpop_jkt = match headers.get("dpop") {
        Some(value) => {
            let proof = value
                .to_str()
                .map_err(|_| AuthError::invalid_dpop_proof("DPoP header is not valid UTF-8"))?;
            Some(extract_dpop_jkt(proof)?)
        }
        None => None,
    };

    let auth = extract_client_auth(headers, request);
    let client = authenticate_client(&state.client_storage, auth).await?;
    audit.client_id = Some(client.client_id.clone());

    let mut ctx = ExecutionContext::new(client, audit.clone());
    ctx.dpop_jkt = dpop_jkt;
    ctx.cert_fingerprint = cert_fingerprint(headers);
    ctx.token_binding_hash = token_binding_hash(headers);

    let result = state.token_service.process(request, &mut ctx).await;
    *audit = ctx.audit;
    result
}

/// Single exit path for the endpoint.
///
/// Flushes the audit record exactly once, then renders the result with
/// no-store cache headers.
async fn finalize(
    result: AuthResult<TokenResponse>,
    audit: OAuth2AuditLog,
    sink: &dyn AuditSink,
) -> Response {
    sink.record(&audit).await;

    let response = match result {
        Ok(response) => (StatusCode::OK, axum::Json(response)).into_response(),
        Err(err) => match token_error(&err) {
            Some(body) => {
                debug!(
                    error = %err,
                    code = err.oauth_error_code(),
                    category = %err.category(),
                    "token request rejected"
                );
                let status =
                    StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::BAD_REQUEST);
                (status, axum::Json(body)).into_response()
            }
            None => {
                error!(error = %err, "token request failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        },
    };

    with_no_store_headers(response)
}

/// Maps an error to its OAuth error body.
///
/// Server-side errors map to `None`: they surface as a bare 500 instead of a
/// structured body.
fn token_error(err: &AuthError) -> Option<TokenError> {
    use TokenErrorCode as Code;

    let (code, description) = match err {
        AuthError::InvalidRequest { message } => (Code::InvalidRequest, Some(message.clone())),
        AuthError::InvalidClient { message } => (Code::InvalidClient, Some(message.clone())),
        AuthError::InvalidGrant { message } => (Code::InvalidGrant, Some(message.clone())),
        AuthError::UnauthorizedClient { message } => {
            (Code::UnauthorizedClient, Some(message.clone()))
        }
        AuthError::UnsupportedGrantType { grant_type } => (
            Code::UnsupportedGrantType,
            Some(format!("Unsupported grant type: {grant_type}")),
        ),
        AuthError::InvalidScope { message } => (Code::InvalidScope, Some(message.clone())),
        AuthError::InvalidDpopProof { message } => (Code::InvalidDpopProof, Some(message.clone())),
        AuthError::AuthorizationPending => (Code::AuthorizationPending, None),
        AuthError::SlowDown => (Code::SlowDown, None),
        AuthError::AccessDenied { message } => (Code::AccessDenied, Some(message.clone())),
        AuthError::ExpiredToken { message } => (Code::ExpiredToken, Some(message.clone())),
        AuthError::Storage { .. } | AuthError::Configuration { .. } | AuthError::Internal { .. } => {
            return None;
        }
    };

    Some(match description {
        Some(description) => TokenError::with_description(code, description),
        None => TokenError::new(code),
    })
}

/// RFC 6749 §5.1: token responses must not be cached.
fn with_no_store_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    response
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}

/// SHA-256 fingerprint of the client certificate forwarded by the TLS
/// terminator in `X-ClientCert`, base64url encoded (the `x5t#S256` format).
fn cert_fingerprint(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("x-clientcert")?.to_str().ok()?;
    let body: String = value
        .replace("-----BEGIN CERTIFICATE-----", "")
        .replace("-----END CERTIFICATE-----", "")
        .split_whitespace()
        .collect();
    let der = STANDARD.decode(body).ok()?;

    let mut hasher = Sha256::new();
    hasher.update(&der);
    Some(URL_SAFE_NO_PAD.encode(hasher.finalize()))
}

/// SHA-256 of the `Sec-Token-Binding` header value, base64url encoded.
fn token_binding_hash(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("sec-token-binding")?.to_str().ok()?;
    if value.is_empty() {
        return None;
    }

    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    Some(URL_SAFE_NO_PAD.encode(hasher.finalize()))
}
