use serde::Deserialize;
use std::sync::Arc;

use crate::metrics::Metrics;
use crate::store::{StoreError, UserRepository};
use super::password::{hash_password, verify_password};
use super::token::{SessionToken, TokenService};

// ============================================================================
// Authenticator
// ============================================================================
//
// Login: username lookup + password check → signed session token.
// Authorize: token signature and expiry only; the user is not re-read.
//
// Unknown user and wrong password produce the same error, and both paths run
// one password verification.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid input data: {0}")]
    MalformedInput(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("unauthorized")]
    Unauthenticated,

    #[error("could not verify credentials")]
    Backend(#[from] StoreError),

    #[error("could not verify credentials: {0}")]
    Hashing(String),

    #[error("could not issue session token")]
    TokenIssue(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MalformedInput(_) => "malformed_input",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Unauthenticated => "unauthenticated",
            AuthError::Backend(_) | AuthError::Hashing(_) | AuthError::TokenIssue(_) => "error",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn decode(payload: &[u8]) -> Result<Self, AuthError> {
        serde_json::from_slice(payload).map_err(|e| AuthError::MalformedInput(e.to_string()))
    }
}

pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    tokens: TokenService,
    metrics: Arc<Metrics>,
    /// Verified against when the username is unknown.
    dummy_hash: String,
}

impl Authenticator {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: TokenService,
        metrics: Arc<Metrics>,
    ) -> Result<Self, AuthError> {
        let dummy_hash = hash_password("company-service-dummy-password")
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        Ok(Self {
            users,
            tokens,
            metrics,
            dummy_hash,
        })
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<SessionToken, AuthError> {
        let result = self.check_credentials(username, password).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        self.metrics.record_login(outcome);

        match &result {
            Ok(session) => tracing::info!(username, expires_at = %session.expires_at, "Login successful"),
            Err(AuthError::InvalidCredentials) => tracing::info!(username, "Login rejected"),
            Err(e) => tracing::error!(username, error = %e, "Login failed"),
        }
        result
    }

    async fn check_credentials(&self, username: &str, password: &str) -> Result<SessionToken, AuthError> {
        let user = self.users.find_by_username(username).await?;

        let known = user.is_some();
        let hash = user.map_or_else(|| self.dummy_hash.clone(), |u| u.password_hash);
        let password = password.to_string();

        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        if !(known && matches) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(self.tokens.issue(username)?)
    }

    /// Resolve the username carried by a session token.
    pub fn authorize(&self, token: Option<&str>) -> Result<String, AuthError> {
        let token = token.ok_or(AuthError::Unauthenticated)?;

        self.tokens.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected session token");
            AuthError::Unauthenticated
        })
    }
}
