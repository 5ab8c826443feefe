//! 用户注册与密码更新

use crate::{
    auth::PasswordHasher,
    error::AppError,
    models::user::User,
    repository::{bounded, UserRepository},
};
use std::sync::Arc;
use std::time::Duration;

/// Creates users and changes their passwords. Whether the caller may do so
/// is decided one layer up by `OwnershipPolicy`.
pub struct UserService {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    timeout: Duration,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: PasswordHasher, timeout: Duration) -> Self {
        Self {
            users,
            hasher,
            timeout,
        }
    }

    /// 注册用户
    ///
    /// The store rejects a taken username atomically, so of two concurrent
    /// registrations exactly one wins and the other gets `AlreadyExists`.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AppError> {
        if username.is_empty() || password.is_empty() {
            return Err(AppError::validation("username and password must be specified"));
        }

        let user = User {
            username: username.to_string(),
            password_hash: self.hasher.spawn_hash(password).await?,
        };

        bounded(self.timeout, self.users.insert_user(&user))
            .await
            .map_err(|e| {
                tracing::warn!(username = %username, error = %e, "Failed to create user");
                AppError::from(e)
            })?;

        tracing::info!(username = %username, "User created");
        Ok(user)
    }

    /// 更新密码
    pub async fn update_password(&self, username: &str, password: &str) -> Result<(), AppError> {
        if password.is_empty() {
            return Err(AppError::validation("password must be specified"));
        }

        if bounded(self.timeout, self.users.find_user(username))
            .await?
            .is_none()
        {
            return Err(AppError::not_found("user"));
        }

        let password_hash = self.hasher.spawn_hash(password).await?;

        // A concurrent delete between lookup and write still reports NotFound
        let updated = bounded(
            self.timeout,
            self.users.update_password(username, &password_hash),
        )
        .await?;
        if !updated {
            return Err(AppError::not_found("user"));
        }

        Ok(())
    }

    /// 初始化管理员账户（若不存在）
    pub async fn ensure_admin(&self, admin: &str, password: &str) -> Result<(), AppError> {
        match self.register(admin, password).await {
            Ok(_) => {
                tracing::info!(username = %admin, "Created admin user");
                Ok(())
            }
            Err(AppError::AlreadyExists(_)) => Err(AppError::AlreadyExists("admin user".to_string())),
            Err(e) => Err(e),
        }
    }
}
