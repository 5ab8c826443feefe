//! 认证服务：登录换取令牌

use crate::{
    auth::{PasswordHasher, TokenIssuer},
    error::AppError,
    models::auth::Authorization,
    repository::{bounded, AuthorizationRepository, UserRepository},
};
use std::sync::Arc;
use std::time::Duration;

pub const INVALID_LOGIN: &str = "invalid username/password";

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    authorizations: Arc<dyn AuthorizationRepository>,
    hasher: PasswordHasher,
    timeout: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        authorizations: Arc<dyn AuthorizationRepository>,
        hasher: PasswordHasher,
        timeout: Duration,
    ) -> Self {
        Self {
            users,
            authorizations,
            hasher,
            timeout,
        }
    }

    /// 用户登录
    ///
    /// Unknown user and wrong password produce the same error, so the response
    /// does not reveal which usernames exist. A successful login replaces the
    /// previous token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        if username.is_empty() || password.is_empty() {
            return Err(AppError::unauthenticated(INVALID_LOGIN));
        }

        let user = bounded(self.timeout, self.users.find_user(username)).await?;

        let verified = match &user {
            Some(user) => self.hasher.spawn_verify(&user.password_hash, password).await,
            None => false,
        };

        if !verified {
            tracing::info!(username = %username, "Login failed");
            return Err(AppError::unauthenticated(INVALID_LOGIN));
        }

        let token = TokenIssuer::generate();
        bounded(
            self.timeout,
            self.authorizations
                .save_authorization(&Authorization::new(username, token.as_str())),
        )
        .await?;

        tracing::info!(username = %username, "Login succeeded");
        Ok(token)
    }
}
