//! Forum content models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Discussion topic
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Topic {
    pub id: Uuid,
    pub title: String,
    pub closed: bool,
    pub created_at: DateTime<Utc>,
}

impl Topic {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            closed: false,
            created_at: Utc::now(),
        }
    }
}

/// Post under a topic. `author` is a plain username, not a foreign key.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub topic_id: Uuid,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(topic_id: Uuid, author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic_id,
            author: author.into(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Create topic form
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTopicRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "title must be specified"))]
    pub title: String,
}

/// Create post form
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "content must be specified"))]
    pub content: String,
}
