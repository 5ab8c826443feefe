//! Topic and post repository

use crate::{
    db::PgStore,
    models::content::{Post, Topic},
    repository::{user_repo::conflict_on_unique, ContentRepository, StoreError},
};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
impl ContentRepository for PgStore {
    /// 创建主题，标题冲突时由唯一约束拒绝
    async fn insert_topic(&self, topic: &Topic) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO topics (id, title, closed, created_at) VALUES ($1, $2, $3, $4)")
            .bind(topic.id)
            .bind(&topic.title)
            .bind(topic.closed)
            .bind(topic.created_at)
            .execute(&self.db)
            .await
            .map_err(|e| conflict_on_unique(e, "topic"))?;

        Ok(())
    }

    async fn find_topic(&self, id: Uuid) -> Result<Option<Topic>, StoreError> {
        let topic = sqlx::query_as::<_, Topic>(
            "SELECT id, title, closed, created_at FROM topics WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(topic)
    }

    async fn list_topics(&self) -> Result<Vec<Topic>, StoreError> {
        let topics = sqlx::query_as::<_, Topic>(
            "SELECT id, title, closed, created_at FROM topics ORDER BY created_at, id",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(topics)
    }

    async fn delete_topic(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM topics WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_post(&self, post: &Post) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, topic_id, author, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(post.id)
        .bind(post.topic_id)
        .bind(&post.author)
        .bind(&post.content)
        .bind(post.created_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn list_posts(&self, topic_id: Uuid) -> Result<Vec<Post>, StoreError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, topic_id, author, content, created_at
            FROM posts
            WHERE topic_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(topic_id)
        .fetch_all(&self.db)
        .await?;

        Ok(posts)
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
