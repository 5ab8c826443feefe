//! Storage ports (数据访问层)
//!
//! The core only talks to these traits. Lookups return `Ok(None)` for "not
//! found" and reserve `Err` for backend failures; updates and deletes return
//! `Ok(false)` when the row is absent.

pub mod auth_repo;
pub mod content_repo;
pub mod memory;
pub mod user_repo;

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::models::{auth::Authorization, content::*, user::User};

pub use memory::MemoryStore;

/// 存储层错误
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique constraint rejected the write; carries the resource kind.
    #[error("{0} already exists")]
    Conflict(String),

    #[error("storage call timed out after {0:?}")]
    Timeout(Duration),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Insert only if no user with that username exists; `Conflict` otherwise.
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;

    async fn update_password(&self, username: &str, password_hash: &str)
        -> Result<bool, StoreError>;
}

#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    async fn find_authorization(&self, username: &str)
        -> Result<Option<Authorization>, StoreError>;

    /// Replace whatever authorization the user had with this one, atomically.
    async fn save_authorization(&self, authorization: &Authorization) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Title uniqueness is enforced here; a taken title yields `Conflict`.
    async fn insert_topic(&self, topic: &Topic) -> Result<(), StoreError>;
    async fn find_topic(&self, id: Uuid) -> Result<Option<Topic>, StoreError>;
    async fn list_topics(&self) -> Result<Vec<Topic>, StoreError>;
    async fn delete_topic(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn insert_post(&self, post: &Post) -> Result<(), StoreError>;
    async fn list_posts(&self, topic_id: Uuid) -> Result<Vec<Post>, StoreError>;
    async fn delete_post(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;
}

/// 存储端口集合，服务层按需取用
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub authorizations: Arc<dyn AuthorizationRepository>,
    pub content: Arc<dyn ContentRepository>,
    pub health: Arc<dyn StoreHealth>,
}

impl Repositories {
    /// Wire every port to one backend.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository + AuthorizationRepository + ContentRepository + StoreHealth + 'static,
    {
        Self {
            users: store.clone(),
            authorizations: store.clone(),
            content: store.clone(),
            health: store,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::new()))
    }
}

/// Run a store call with an upper bound on its duration.
///
/// Dropping the returned future (client went away) drops the inner call too.
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(timeout_ms = limit.as_millis() as u64, "Storage call timed out");
            Err(StoreError::Timeout(limit))
        }
    }
}
