//! 主题与帖子服务

use crate::{
    error::AppError,
    models::content::{Post, Topic},
    repository::{bounded, ContentRepository},
};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub struct ContentService {
    content: Arc<dyn ContentRepository>,
    timeout: Duration,
}

impl ContentService {
    pub fn new(content: Arc<dyn ContentRepository>, timeout: Duration) -> Self {
        Self { content, timeout }
    }

    /// 创建主题，标题唯一
    pub async fn create_topic(&self, title: &str) -> Result<Topic, AppError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::validation("title must be specified"));
        }

        let topic = Topic::new(title);
        bounded(self.timeout, self.content.insert_topic(&topic)).await?;

        tracing::info!(topic_id = %topic.id, title = %topic.title, "Topic created");
        Ok(topic)
    }

    pub async fn list_topics(&self) -> Result<Vec<Topic>, AppError> {
        Ok(bounded(self.timeout, self.content.list_topics()).await?)
    }

    pub async fn get_topic(&self, id: Uuid) -> Result<Topic, AppError> {
        bounded(self.timeout, self.content.find_topic(id))
            .await?
            .ok_or_else(|| AppError::not_found("topic"))
    }

    pub async fn delete_topic(&self, id: Uuid) -> Result<(), AppError> {
        if !bounded(self.timeout, self.content.delete_topic(id)).await? {
            return Err(AppError::not_found("topic"));
        }
        tracing::info!(topic_id = %id, "Topic deleted");
        Ok(())
    }

    /// 发帖。topic_id 不做存在性校验
    pub async fn create_post(
        &self,
        topic_id: Uuid,
        author: &str,
        content: &str,
    ) -> Result<Post, AppError> {
        if content.trim().is_empty() {
            return Err(AppError::validation("content must be specified"));
        }

        let post = Post::new(topic_id, author, content);
        bounded(self.timeout, self.content.insert_post(&post)).await?;

        tracing::debug!(post_id = %post.id, topic_id = %topic_id, author = %author, "Post created");
        Ok(post)
    }

    pub async fn list_posts(&self, topic_id: Uuid) -> Result<Vec<Post>, AppError> {
        Ok(bounded(self.timeout, self.content.list_posts(topic_id)).await?)
    }

    /// 删除帖子，与所属主题无关
    pub async fn delete_post(&self, id: Uuid) -> Result<(), AppError> {
        if !bounded(self.timeout, self.content.delete_post(id)).await? {
            return Err(AppError::not_found("post"));
        }
        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStore;

    fn service() -> ContentService {
        ContentService::new(Arc::new(MemoryStore::new()), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_duplicate_topic_title() {
        let service = service();
        service.create_topic("General").await.unwrap();

        let err = service.create_topic("General").await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_empty_inputs_rejected() {
        let service = service();
        assert!(matches!(service.create_topic("  ").await, Err(AppError::Validation(_))));
        assert!(matches!(
            service.create_post(Uuid::new_v4(), "alice", "").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_post_lifecycle() {
        let service = service();
        let topic = service.create_topic("Rust").await.unwrap();

        let post = service.create_post(topic.id, "alice", "hello").await.unwrap();
        assert_eq!(post.author, "alice");

        let posts = service.list_posts(topic.id).await.unwrap();
        assert_eq!(posts.len(), 1);

        service.delete_post(post.id).await.unwrap();
        assert!(matches!(service.delete_post(post.id).await, Err(AppError::NotFound(_))));
        assert!(service.list_posts(topic.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_topic() {
        let service = service();
        let topic = service.create_topic("  Meta ").await.unwrap();
        assert_eq!(topic.title, "Meta");

        let found = service.get_topic(topic.id).await.unwrap();
        assert_eq!(found.id, topic.id);
        assert!(matches!(service.get_topic(Uuid::new_v4()).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_unknown_topic() {
        let service = service();
        let err = service.delete_topic(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
