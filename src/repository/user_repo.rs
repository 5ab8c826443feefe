//! User repository (数据库访问层)

use crate::{
    db::PgStore,
    models::user::User,
    repository::{StoreError, UserRepository},
};
use async_trait::async_trait;

/// Map a unique-constraint violation onto `Conflict`, everything else passes through.
pub(crate) fn conflict_on_unique(e: sqlx::Error, what: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Conflict(what.to_string())
        }
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl UserRepository for PgStore {
    /// 根据用户名查找用户
    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT username, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    /// 创建用户，用户名冲突时由主键约束拒绝
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO users (username, password_hash) VALUES ($1, $2)")
            .bind(&user.username)
            .bind(&user.password_hash)
            .execute(&self.db)
            .await
            .map_err(|e| conflict_on_unique(e, "user"))?;

        Ok(())
    }

    /// 更新密码
    async fn update_password(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE username = $1")
            .bind(username)
            .bind(password_hash)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
