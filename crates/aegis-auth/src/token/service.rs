//! Grant processors for the token endpoint.
//!
//! [`TokenService::process`] is the single entry point: it parses the grant
//! type, validates the per-flow parameters, checks the client's grant type
//! registration and dispatches to one processor per flow. Every processor
//! ends in the same place, a [`TokenResponse`] assembled from freshly minted
//! tokens, or an [`AuthError`] the endpoint turns into an OAuth error body.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use time::{Duration, OffsetDateTime};
use tracing::warn;
use uuid::Uuid;

use crate::AuthResult;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::oauth::pkce;
use crate::oauth::token::{TokenRequest, TokenResponse};
use crate::storage::{BackchannelCache, GrantStorage, RefreshTokenStorage, UserStorage};
use crate::token::backchannel::pending_error;
use crate::token::context::ExecutionContext;
use crate::token::jwt::{ClaimsMap, JwtService};
use crate::token::transforms::ClaimsTransform;
use crate::types::{
    AccessToken, Client, Grant, GrantType, GrantVariant, IdToken, RefreshTokenRecord, TokenType,
    User,
};

/// Pluggable credential verification for the password grant.
///
/// When none is registered, [`crate::storage::UserStorage`] is consulted
/// directly.
#[async_trait]
pub trait PasswordAuthenticator: Send + Sync {
    /// Verify a username/password pair.
    ///
    /// Returns the authenticated user, or `None` when the credentials do not
    /// match any account.
    ///
    /// # Errors
    ///
    /// Returns an error if the authentication backend fails.
    async fn authenticate(&self, username: &str, password: &str) -> AuthResult<Option<User>>;
}

/// Deployment hook consulted while minting tokens.
pub trait UpdateTokenHook: Send + Sync {
    /// Override the refresh token lifetime for a client, in seconds.
    ///
    /// Non-positive and `None` answers fall through to the client and server
    /// configuration.
    fn refresh_token_lifetime_secs(&self, _client: &Client) -> Option<i64> {
        None
    }

    /// A transform applied to id token claims after the first signature.
    ///
    /// Registering one forces the id token to be re-signed.
    fn id_token_post_transform(&self) -> Option<ClaimsTransform> {
        None
    }
}

/// The token-issuance core.
///
/// Holds the signing service, the storage backends and the policy
/// configuration. One instance serves every request; per-request state lives
/// in [`ExecutionContext`].
pub struct TokenService {
    jwt: Arc<JwtService>,
    grants: Arc<dyn GrantStorage>,
    refresh_tokens: Arc<dyn RefreshTokenStorage>,
    users: Arc<dyn UserStorage>,
    ciba_requests: Arc<dyn BackchannelCache>,
    device_requests: Arc<dyn BackchannelCache>,
    password_authenticator: Option<Arc<dyn PasswordAuthenticator>>,
    update_token_hook: Option<Arc<dyn UpdateTokenHook>>,
    config: AuthConfig,
}

impl TokenService {
    /// Creates a service over the given backends.
    #[must_use]
    pub fn new(
        jwt: Arc<JwtService>,
        grants: Arc<dyn GrantStorage>,
        refresh_tokens: Arc<dyn RefreshTokenStorage>,
        users: Arc<dyn UserStorage>,
        ciba_requests: Arc<dyn BackchannelCache>,
        device_requests: Arc<dyn BackchannelCache>,
        config: AuthConfig,
    ) -> Self {
        Self {
            jwt,
            grants,
            refresh_tokens,
            users,
            ciba_requests,
            device_requests,
            password_authenticator: None,
            update_token_hook: None,
            config,
        }
    }

    /// Registers a password grant authenticator.
    #[must_use]
    pub fn with_password_authenticator(
        mut self,
        authenticator: Arc<dyn PasswordAuthenticator>,
    ) -> Self {
        self.password_authenticator = Some(authenticator);
        self
    }

    /// Registers an update-token hook.
    #[must_use]
    pub fn with_update_token_hook(mut self, hook: Arc<dyn UpdateTokenHook>) -> Self {
        self.update_token_hook = Some(hook);
        self
    }

    /// Processes one token request for an already-authenticated client.
    ///
    /// On success the context's audit record is marked successful; the caller
    /// flushes it either way.
    ///
    /// # Errors
    ///
    /// Returns the `AuthError` the endpoint maps into an OAuth error body.
    pub async fn process(
        &self,
        request: &TokenRequest,
        ctx: &mut ExecutionContext,
    ) -> AuthResult<TokenResponse> {
        let grant_type = GrantType::parse(&request.grant_type)
            .ok_or_else(|| AuthError::unsupported_grant_type(request.grant_type.clone()))?;

        validate_params(grant_type, request)?;

        ctx.audit.client_id = Some(ctx.client.client_id.clone());
        ctx.audit.username = request.username.clone();
        ctx.audit.scope = request.scope.clone();

        if !ctx.client.is_grant_type_allowed(grant_type) {
            return Err(AuthError::unauthorized_client(format!(
                "Client is not registered for grant type '{grant_type}'"
            )));
        }

        if let Some(hook) = &self.update_token_hook {
            if let Some(transform) = hook.id_token_post_transform() {
                ctx.transforms.push_post(transform);
            }
        }

        let response = match grant_type {
            GrantType::AuthorizationCode => self.process_authorization_code(request, ctx).await?,
            GrantType::RefreshToken => self.process_refresh_token(request, ctx).await?,
            GrantType::ClientCredentials => self.process_client_credentials(request, ctx).await?,
            GrantType::Password => self.process_password(request, ctx).await?,
            GrantType::Ciba => self.process_ciba(request, ctx).await?,
            GrantType::DeviceCode => self.process_device_code(request, ctx).await?,
        };

        ctx.audit.mark_success();
        Ok(response)
    }

    // -------------------------------------------------------------------------
    // Grant processors
    // -------------------------------------------------------------------------

    async fn process_authorization_code(
        &self,
        request: &TokenRequest,
        ctx: &ExecutionContext,
    ) -> AuthResult<TokenResponse> {
        let Some(code) = request.code.as_deref() else {
            return Err(AuthError::invalid_request("Missing required parameter: code"));
        };

        let Some(grant) = self.grants.find_by_code(code).await? else {
            // A code that once existed has been consumed: a replay revokes
            // whatever the first redemption produced.
            let removed = self.grants.remove_all_by_code(code).await?;
            if removed > 0 {
                warn!(removed, "authorization code replay, revoked derived grants");
            }
            return Err(AuthError::invalid_grant("Invalid authorization code"));
        };

        if grant.client_id != ctx.client.client_id {
            return Err(AuthError::invalid_grant(
                "Authorization code was issued to another client",
            ));
        }

        let (challenge, method) = match &grant.variant {
            GrantVariant::AuthorizationCode {
                code_challenge,
                code_challenge_method,
                ..
            } => (code_challenge.as_deref(), *code_challenge_method),
            _ => return Err(AuthError::invalid_grant("Invalid authorization code")),
        };

        pkce::verify_exchange(
            challenge,
            method,
            request.code_verifier.as_deref(),
            self.config.require_pkce,
        )?;

        if !self.grants.consume_code(code).await? {
            let removed = self.grants.remove_all_by_code(code).await?;
            if removed > 0 {
                warn!(removed, "authorization code replay, revoked derived grants");
            }
            return Err(AuthError::invalid_grant("Invalid authorization code"));
        }

        let scope = grant.check_scopes_policy(request.scope.as_deref())?;

        let access_token = self.mint_access_token(&grant, ctx, &scope)?;
        let id_token = if scope_contains(&scope, "openid") {
            Some(self.mint_id_token(&grant, ctx).await?)
        } else {
            None
        };
        let refresh_token = self
            .create_refresh_token(&grant, ctx, Some(self.refresh_token_expires_at(&ctx.client)))
            .await?;

        Ok(build_response(access_token, &scope, refresh_token, id_token))
    }

    async fn process_refresh_token(
        &self,
        request: &TokenRequest,
        ctx: &ExecutionContext,
    ) -> AuthResult<TokenResponse> {
        let Some(presented) = request.refresh_token.as_deref() else {
            return Err(AuthError::invalid_request(
                "Missing required parameter: refresh_token",
            ));
        };

        let hash = RefreshTokenRecord::hash_token(presented);
        let Some(record) = self.refresh_tokens.find_by_hash(&hash).await? else {
            return Err(AuthError::invalid_grant("Unknown refresh token"));
        };

        if record.client_id != ctx.client.client_id {
            return Err(AuthError::invalid_grant(
                "Refresh token was issued to another client",
            ));
        }

        if !record.is_usable() {
            return Err(AuthError::invalid_grant(
                "Refresh token is expired or revoked",
            ));
        }

        let Some(grant) = self.grants.find_by_id(record.grant_id).await? else {
            return Err(AuthError::invalid_grant("Grant no longer exists"));
        };

        if self.config.check_user_presence_on_refresh {
            if let Some(user_id) = grant.user_id {
                self.check_user(user_id).await?;
            }
        }

        let scope = grant.check_scopes_policy(request.scope.as_deref())?;

        let access_token = self.mint_access_token(&grant, ctx, &scope)?;
        let id_token = if scope_contains(&scope, "openid")
            && self.config.openid_scope_backward_compatibility
        {
            Some(self.mint_id_token(&grant, ctx).await?)
        } else {
            None
        };

        let refresh_token = if self.config.skip_refresh_token_rotation {
            Some(presented.to_string())
        } else {
            let expires_at = if self.config.refresh_token_extend_lifetime_on_rotation {
                Some(self.refresh_token_expires_at(&ctx.client))
            } else {
                // Rotation without extension: the replacement inherits the
                // presented token's expiry instant.
                record.expires_at
            };
            let minted = self.create_refresh_token(&grant, ctx, expires_at).await?;
            if minted.is_some() {
                self.refresh_tokens.invalidate(&record.token_hash).await?;
            }
            minted
        };

        Ok(build_response(access_token, &scope, refresh_token, id_token))
    }

    async fn process_client_credentials(
        &self,
        request: &TokenRequest,
        ctx: &ExecutionContext,
    ) -> AuthResult<TokenResponse> {
        if !ctx.client.confidential {
            return Err(AuthError::unauthorized_client(
                "Public clients cannot use the client_credentials grant",
            ));
        }

        let scopes = self.resolve_requested_scopes(&ctx.client, request.scope.as_deref())?;
        let grant = Grant::client_credentials(&ctx.client.client_id, scopes);
        self.grants.create(&grant).await?;

        let scope = grant.scopes.join(" ");
        let access_token = self.mint_access_token(&grant, ctx, &scope)?;
        let id_token = if scope_contains(&scope, "openid")
            && self.config.openid_scope_backward_compatibility
        {
            Some(self.mint_id_token(&grant, ctx).await?)
        } else {
            None
        };
        let refresh_token = self
            .create_refresh_token(&grant, ctx, Some(self.refresh_token_expires_at(&ctx.client)))
            .await?;

        Ok(build_response(access_token, &scope, refresh_token, id_token))
    }

    async fn process_password(
        &self,
        request: &TokenRequest,
        ctx: &ExecutionContext,
    ) -> AuthResult<TokenResponse> {
        let (Some(username), Some(password)) =
            (request.username.as_deref(), request.password.as_deref())
        else {
            return Err(AuthError::invalid_request(
                "Missing required parameter: username/password",
            ));
        };

        let user = match &self.password_authenticator {
            Some(authenticator) => authenticator.authenticate(username, password).await?,
            None => match self.users.find_by_username(username).await? {
                Some(user) if self.users.verify_password(user.id, password).await? => Some(user),
                _ => None,
            },
        };

        // Unknown user, wrong password and disabled account are
        // indistinguishable to the caller.
        let Some(user) = user else {
            return Err(AuthError::invalid_client("Invalid user."));
        };
        if !user.is_active() {
            return Err(AuthError::invalid_client("Invalid user."));
        }

        let scopes = self.resolve_requested_scopes(&ctx.client, request.scope.as_deref())?;
        let mut grant = Grant::password(&ctx.client.client_id, user.id, scopes);
        grant.session_id = request.session_id.clone();
        self.grants.create(&grant).await?;

        let scope = grant.scopes.join(" ");
        let access_token = self.mint_access_token(&grant, ctx, &scope)?;
        let id_token = if scope_contains(&scope, "openid")
            && self.config.openid_scope_backward_compatibility
        {
            Some(self.mint_id_token(&grant, ctx).await?)
        } else {
            None
        };
        let refresh_token = self
            .create_refresh_token(&grant, ctx, Some(self.refresh_token_expires_at(&ctx.client)))
            .await?;

        Ok(build_response(access_token, &scope, refresh_token, id_token))
    }

    async fn process_ciba(
        &self,
        request: &TokenRequest,
        ctx: &ExecutionContext,
    ) -> AuthResult<TokenResponse> {
        let Some(auth_req_id) = request.auth_req_id.as_deref() else {
            return Err(AuthError::invalid_request(
                "Missing required parameter: auth_req_id",
            ));
        };

        if let Some(mut grant) = self.grants.find_by_auth_req_id(auth_req_id).await? {
            if grant.client_id != ctx.client.client_id {
                return Err(AuthError::invalid_grant(
                    "The auth_req_id was issued to another client",
                ));
            }

            let polling_allowed = ctx
                .client
                .backchannel_token_delivery_mode
                .is_some_and(|mode| mode.allows_token_endpoint_delivery());
            if !polling_allowed {
                return Err(AuthError::unauthorized_client(
                    "Client token delivery mode does not permit polling the token endpoint",
                ));
            }

            if grant.tokens_delivered() {
                return Err(AuthError::invalid_grant(
                    "Tokens have already been delivered for this auth_req_id",
                ));
            }

            let scope = grant.check_scopes_policy(request.scope.as_deref())?;
            let access_token = self.mint_access_token(&grant, ctx, &scope)?;
            let id_token = self.mint_id_token(&grant, ctx).await?;
            let refresh_token = self
                .create_refresh_token(
                    &grant,
                    ctx,
                    Some(self.refresh_token_expires_at(&ctx.client)),
                )
                .await?;

            grant.mark_tokens_delivered();
            self.grants.update(&grant).await?;

            return Ok(build_response(
                access_token,
                &scope,
                refresh_token,
                Some(id_token),
            ));
        }

        self.pending_backchannel(&self.ciba_requests, auth_req_id, ctx, "auth_req_id")
            .await
    }

    async fn process_device_code(
        &self,
        request: &TokenRequest,
        ctx: &ExecutionContext,
    ) -> AuthResult<TokenResponse> {
        let Some(device_code) = request.device_code.as_deref() else {
            return Err(AuthError::invalid_request(
                "Missing required parameter: device_code",
            ));
        };

        if let Some(grant) = self.grants.find_by_device_code(device_code).await? {
            if grant.client_id != ctx.client.client_id {
                return Err(AuthError::invalid_grant(
                    "The device_code was issued to another client",
                ));
            }

            let scope = grant.check_scopes_policy(request.scope.as_deref())?;
            let access_token = self.mint_access_token(&grant, ctx, &scope)?;
            let id_token = self.mint_id_token(&grant, ctx).await?;
            let refresh_token = self
                .create_refresh_token(
                    &grant,
                    ctx,
                    Some(self.refresh_token_expires_at(&ctx.client)),
                )
                .await?;

            // The handle is single-use: a repeat poll must not resolve.
            self.grants.remove_device_code(device_code).await?;

            return Ok(build_response(
                access_token,
                &scope,
                refresh_token,
                Some(id_token),
            ));
        }

        self.pending_backchannel(&self.device_requests, device_code, ctx, "device_code")
            .await
    }

    /// Answers a backchannel poll whose handle resolved to a pending record
    /// rather than a grant.
    async fn pending_backchannel(
        &self,
        cache: &Arc<dyn BackchannelCache>,
        key: &str,
        ctx: &ExecutionContext,
        kind: &str,
    ) -> AuthResult<TokenResponse> {
        let Some(mut record) = cache.get(key).await? else {
            return Err(AuthError::expired_token(format!(
                "Unable to find grant object by {kind}"
            )));
        };

        if record.client_id != ctx.client.client_id {
            return Err(AuthError::invalid_grant(format!(
                "The {kind} was issued to another client",
            )));
        }

        let err = pending_error(
            &mut record,
            OffsetDateTime::now_utc(),
            self.polling_interval(),
        );
        cache.put(key, &record).await?;
        Err(err)
    }

    // -------------------------------------------------------------------------
    // Token minting
    // -------------------------------------------------------------------------

    fn mint_access_token(
        &self,
        grant: &Grant,
        ctx: &ExecutionContext,
        scope: &str,
    ) -> AuthResult<AccessToken> {
        let issued_at = OffsetDateTime::now_utc();
        let lifetime = ctx
            .client
            .access_token_lifetime
            .unwrap_or_else(|| secs_i64(self.config.access_token_lifetime));
        let expires_at = issued_at + Duration::seconds(lifetime);

        let mut claims = ClaimsMap::new();
        claims.insert("iss".to_string(), json!(self.jwt.issuer()));
        claims.insert("aud".to_string(), json!(self.config.audience));
        let sub = grant
            .user_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| grant.client_id.clone());
        claims.insert("sub".to_string(), json!(sub));
        claims.insert("client_id".to_string(), json!(grant.client_id));
        claims.insert("jti".to_string(), json!(Uuid::new_v4().to_string()));
        claims.insert("iat".to_string(), json!(issued_at.unix_timestamp()));
        claims.insert("exp".to_string(), json!(expires_at.unix_timestamp()));
        if !scope.is_empty() {
            claims.insert("scope".to_string(), json!(scope));
        }
        if let Some(sid) = &grant.session_id {
            claims.insert("sid".to_string(), json!(sid));
        }

        // Sender constraint: a DPoP proof wins over a client certificate.
        let token_type = if let Some(jkt) = &ctx.dpop_jkt {
            claims.insert("cnf".to_string(), json!({ "jkt": jkt }));
            TokenType::DPoP
        } else if let Some(fingerprint) = &ctx.cert_fingerprint {
            claims.insert("cnf".to_string(), json!({ "x5t#S256": fingerprint }));
            TokenType::Bearer
        } else {
            TokenType::Bearer
        };

        ctx.transforms.apply_pre(&mut claims);

        let code = self
            .jwt
            .encode_claims(&claims)
            .map_err(|e| AuthError::internal(format!("Failed to sign access token: {e}")))?;

        Ok(AccessToken {
            code,
            token_type,
            issued_at,
            expires_at: Some(expires_at),
        })
    }

    async fn mint_id_token(&self, grant: &Grant, ctx: &ExecutionContext) -> AuthResult<IdToken> {
        let issued_at = OffsetDateTime::now_utc();
        let expires_at = issued_at + self.config.id_token_lifetime;

        let mut claims = ClaimsMap::new();
        claims.insert("iss".to_string(), json!(self.jwt.issuer()));
        claims.insert("aud".to_string(), json!(ctx.client.client_id));
        let sub = grant
            .user_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| grant.client_id.clone());
        claims.insert("sub".to_string(), json!(sub));
        claims.insert("iat".to_string(), json!(issued_at.unix_timestamp()));
        claims.insert("exp".to_string(), json!(expires_at.unix_timestamp()));
        if let Some(nonce) = &grant.nonce {
            claims.insert("nonce".to_string(), json!(nonce));
        }
        if let Some(sid) = &grant.session_id {
            claims.insert("sid".to_string(), json!(sid));
        }
        if ctx.client.id_token_token_binding_cnf {
            if let Some(tbh) = &ctx.token_binding_hash {
                claims.insert("cnf".to_string(), json!({ "tbh": tbh }));
            }
        }

        if self.config.legacy_id_token_claims {
            if let Some(user_id) = grant.user_id {
                if let Some(user) = self.users.find_by_id(user_id).await? {
                    if let Some(name) = &user.name {
                        claims.insert("name".to_string(), json!(name));
                    }
                    if let Some(email) = &user.email {
                        claims.insert("email".to_string(), json!(email));
                    }
                }
            }
        }

        ctx.transforms.apply_pre(&mut claims);

        let mut code = self
            .jwt
            .encode_claims(&claims)
            .map_err(|e| AuthError::internal(format!("Failed to sign id token: {e}")))?;

        if ctx.transforms.apply_post(&mut claims) {
            code = self
                .jwt
                .encode_claims(&claims)
                .map_err(|e| AuthError::internal(format!("Failed to re-sign id token: {e}")))?;
        }

        Ok(IdToken { code })
    }

    // -------------------------------------------------------------------------
    // Refresh token policy
    // -------------------------------------------------------------------------

    fn is_refresh_token_allowed(&self, grant: &Grant, client: &Client) -> bool {
        if !client.is_grant_type_allowed(GrantType::RefreshToken) {
            return false;
        }
        if self.config.force_offline_access_scope && !grant.has_offline_access_scope() {
            return false;
        }
        true
    }

    /// Expiry instant for a freshly minted refresh token.
    ///
    /// Precedence: update-token hook (positive values only), then the client
    /// registration, then server configuration.
    fn refresh_token_expires_at(&self, client: &Client) -> OffsetDateTime {
        let secs = self
            .update_token_hook
            .as_ref()
            .and_then(|hook| hook.refresh_token_lifetime_secs(client))
            .filter(|secs| *secs > 0)
            .or(client.refresh_token_lifetime)
            .unwrap_or_else(|| secs_i64(self.config.refresh_token_lifetime));
        OffsetDateTime::now_utc() + Duration::seconds(secs)
    }

    /// Mints and persists a refresh token when policy permits.
    ///
    /// Returns the plaintext token; only its hash is stored.
    async fn create_refresh_token(
        &self,
        grant: &Grant,
        ctx: &ExecutionContext,
        expires_at: Option<OffsetDateTime>,
    ) -> AuthResult<Option<String>> {
        if !self.is_refresh_token_allowed(grant, &ctx.client) {
            return Ok(None);
        }

        let plaintext = RefreshTokenRecord::generate_token();
        let record = RefreshTokenRecord {
            id: Uuid::new_v4(),
            token_hash: RefreshTokenRecord::hash_token(&plaintext),
            grant_id: grant.id,
            client_id: grant.client_id.clone(),
            valid: true,
            created_at: OffsetDateTime::now_utc(),
            expires_at,
        };
        self.refresh_tokens.create(&record).await?;
        Ok(Some(plaintext))
    }

    async fn check_user(&self, user_id: Uuid) -> AuthResult<()> {
        match self.users.find_by_id(user_id).await? {
            Some(user) if user.is_active() => Ok(()),
            Some(_) => Err(AuthError::invalid_grant("User is not active")),
            None => Err(AuthError::invalid_grant("User is not found")),
        }
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    /// Resolves the requested scope against the client registration for flows
    /// that create a grant on the spot.
    fn resolve_requested_scopes(
        &self,
        client: &Client,
        requested: Option<&str>,
    ) -> AuthResult<Vec<String>> {
        let requested = requested.map(str::trim).filter(|s| !s.is_empty());
        let Some(requested) = requested else {
            return Ok(client.scopes.clone());
        };

        let mut scopes = Vec::new();
        for scope in requested.split_whitespace() {
            if !client.is_scope_allowed(scope) {
                return Err(AuthError::invalid_scope(format!(
                    "Scope '{scope}' is not allowed for this client"
                )));
            }
            if !scopes.iter().any(|s| s == scope) {
                scopes.push(scope.to_string());
            }
        }
        Ok(scopes)
    }

    fn polling_interval(&self) -> Duration {
        Duration::seconds(secs_i64(self.config.backchannel_polling_interval))
    }
}

fn validate_params(grant_type: GrantType, request: &TokenRequest) -> AuthResult<()> {
    let missing =
        |name: &str| AuthError::invalid_request(format!("Missing required parameter: {name}"));
    let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());

    match grant_type {
        GrantType::AuthorizationCode if !present(&request.code) => Err(missing("code")),
        GrantType::RefreshToken if !present(&request.refresh_token) => {
            Err(missing("refresh_token"))
        }
        GrantType::Password if !present(&request.username) => Err(missing("username")),
        GrantType::Password if !present(&request.password) => Err(missing("password")),
        GrantType::Ciba if !present(&request.auth_req_id) => Err(missing("auth_req_id")),
        GrantType::DeviceCode if !present(&request.device_code) => Err(missing("device_code")),
        _ => Ok(()),
    }
}

fn scope_contains(scope: &str, name: &str) -> bool {
    scope.split_whitespace().any(|s| s == name)
}

fn secs_i64(duration: std::time::Duration) -> i64 {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}

fn build_response(
    access_token: AccessToken,
    scope: &str,
    refresh_token: Option<String>,
    id_token: Option<IdToken>,
) -> TokenResponse {
    let expires_in = access_token.expires_in();
    let token_type = access_token.token_type.as_str();
    let mut response = TokenResponse::new(access_token.code, token_type, expires_in);
    if !scope.is_empty() {
        response = response.with_scope(scope.to_string());
    }
    if let Some(token) = refresh_token {
        response = response.with_refresh_token(token);
    }
    if let Some(token) = id_token {
        response = response.with_id_token(token.code);
    }
    response
}
