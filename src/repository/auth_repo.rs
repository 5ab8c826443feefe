//! Authorization repository (认证数据访问)

use crate::{
    db::PgStore,
    models::auth::Authorization,
    repository::{AuthorizationRepository, StoreError},
};
use async_trait::async_trait;

#[async_trait]
impl AuthorizationRepository for PgStore {
    async fn find_authorization(
        &self,
        username: &str,
    ) -> Result<Option<Authorization>, StoreError> {
        let auth = sqlx::query_as::<_, Authorization>(
            "SELECT username, token FROM authorizations WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        Ok(auth)
    }

    /// 覆盖旧令牌：单条 upsert，不存在无令牌的中间状态
    async fn save_authorization(&self, authorization: &Authorization) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO authorizations (username, token)
            VALUES ($1, $2)
            ON CONFLICT (username) DO UPDATE SET token = EXCLUDED.token
            "#,
        )
        .bind(&authorization.username)
        .bind(&authorization.token)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}
