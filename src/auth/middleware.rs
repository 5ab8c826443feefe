//! 令牌认证中间件

use crate::{
    auth::transport::{CredentialTransport, Credentials},
    error::AppError,
    repository::{bounded, AuthorizationRepository},
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

pub const CREDENTIALS_REQUIRED: &str = "credentials required";
pub const INVALID_CREDENTIALS: &str = "invalid credentials";

/// 认证通过的用户（附加到请求扩展）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub username: String,
}

// 实现 FromRequestParts 以便在 handler 中直接提取 Principal
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| AppError::unauthenticated(CREDENTIALS_REQUIRED))
    }
}

/// Verifies presented credentials against the stored authorization.
///
/// Read-only: nothing here ever writes authorization state. Every failure,
/// including a storage failure, rejects the request.
pub struct AuthorizationGate {
    authorizations: Arc<dyn AuthorizationRepository>,
    transport: Box<dyn CredentialTransport>,
    timeout: Duration,
}

impl AuthorizationGate {
    pub fn new(
        authorizations: Arc<dyn AuthorizationRepository>,
        transport: Box<dyn CredentialTransport>,
        timeout: Duration,
    ) -> Self {
        Self {
            authorizations,
            transport,
            timeout,
        }
    }

    /// Extract credentials with the configured transport and verify them.
    pub async fn admit_request(&self, headers: &HeaderMap) -> Result<Principal, AppError> {
        let credentials = self.transport.extract(headers);
        if credentials.is_none() {
            tracing::debug!(transport = self.transport.name(), "No credentials presented");
        }
        self.admit(credentials).await
    }

    pub async fn admit(&self, credentials: Option<Credentials>) -> Result<Principal, AppError> {
        let Credentials { username, token } =
            credentials.ok_or_else(|| AppError::unauthenticated(CREDENTIALS_REQUIRED))?;

        let stored = bounded(self.timeout, self.authorizations.find_authorization(&username))
            .await
            .map_err(|e| {
                tracing::error!(username = %username, error = %e, "Failed to look up authorization");
                AppError::Unauthenticated {
                    message: format!("error verifying token: {}", e),
                    source: Some(e),
                }
            })?;

        match stored {
            Some(auth) if auth.token == token => Ok(Principal { username }),
            _ => {
                tracing::debug!(username = %username, "Rejected invalid token");
                Err(AppError::unauthenticated(INVALID_CREDENTIALS))
            }
        }
    }
}

/// 认证中间件 - 必须认证
pub async fn require_principal(
    State(gate): State<Arc<AuthorizationGate>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let principal = gate.admit_request(req.headers()).await?;

    tracing::Span::current().record("principal", principal.username.as_str());
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::transport::{HeaderTransport, TOKEN_HEADER, USER_HEADER},
        models::auth::Authorization,
        repository::MemoryStore,
    };

    fn gate_with(store: Arc<MemoryStore>) -> AuthorizationGate {
        AuthorizationGate::new(store, Box::new(HeaderTransport), Duration::from_secs(1))
    }

    fn creds(username: &str, token: &str) -> Option<Credentials> {
        Some(Credentials {
            username: username.to_string(),
            token: token.to_string(),
        })
    }

    #[tokio::test]
    async fn test_admits_matching_token() {
        let store = Arc::new(MemoryStore::new());
        store
            .save_authorization(&Authorization::new("alice", "t1"))
            .await
            .unwrap();

        let principal = gate_with(store).admit(creds("alice", "t1")).await.unwrap();
        assert_eq!(principal.username, "alice");
    }

    #[tokio::test]
    async fn test_missing_and_wrong_credentials_share_error_kind() {
        let store = Arc::new(MemoryStore::new());
        store
            .save_authorization(&Authorization::new("alice", "t1"))
            .await
            .unwrap();
        let gate = gate_with(store);

        let missing = gate.admit(None).await.unwrap_err();
        let wrong = gate.admit(creds("alice", "nope")).await.unwrap_err();
        let unknown = gate.admit(creds("mallory", "t1")).await.unwrap_err();

        assert!(missing.is_unauthenticated());
        assert!(wrong.is_unauthenticated());
        assert!(unknown.is_unauthenticated());
        assert_eq!(missing.user_message(), CREDENTIALS_REQUIRED);
        assert_eq!(wrong.user_message(), INVALID_CREDENTIALS);
        assert_eq!(unknown.user_message(), INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn test_admit_request_uses_transport() {
        let store = Arc::new(MemoryStore::new());
        store
            .save_authorization(&Authorization::new("alice", "t1"))
            .await
            .unwrap();
        let gate = gate_with(store);

        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, "alice".parse().unwrap());
        headers.insert(TOKEN_HEADER, "t1".parse().unwrap());
        assert!(gate.admit_request(&headers).await.is_ok());

        assert!(gate.admit_request(&HeaderMap::new()).await.is_err());
    }
}
