//! In-memory storage adapter
//!
//! Backs the `memory` backend and the test suites. Uniqueness goes through
//! `DashMap::entry`, which holds the shard lock across check and insert.

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

use crate::{
    models::{auth::Authorization, content::*, user::User},
    repository::{
        AuthorizationRepository, ContentRepository, StoreError, StoreHealth, UserRepository,
    },
};

#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
    authorizations: DashMap<String, Authorization>,
    topics: DashMap<Uuid, Topic>,
    topic_titles: DashMap<String, Uuid>,
    posts: DashMap<Uuid, Post>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(username).map(|u| u.clone()))
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        match self.users.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict("user".to_string())),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(())
            }
        }
    }

    async fn update_password(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        match self.users.get_mut(username) {
            Some(mut user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl AuthorizationRepository for MemoryStore {
    async fn find_authorization(
        &self,
        username: &str,
    ) -> Result<Option<Authorization>, StoreError> {
        Ok(self.authorizations.get(username).map(|a| a.clone()))
    }

    async fn save_authorization(&self, authorization: &Authorization) -> Result<(), StoreError> {
        self.authorizations
            .insert(authorization.username.clone(), authorization.clone());
        Ok(())
    }
}

#[async_trait]
impl ContentRepository for MemoryStore {
    async fn insert_topic(&self, topic: &Topic) -> Result<(), StoreError> {
        match self.topic_titles.entry(topic.title.clone()) {
            Entry::Occupied(_) => return Err(StoreError::Conflict("topic".to_string())),
            Entry::Vacant(slot) => {
                slot.insert(topic.id);
            }
        }
        self.topics.insert(topic.id, topic.clone());
        Ok(())
    }

    async fn find_topic(&self, id: Uuid) -> Result<Option<Topic>, StoreError> {
        Ok(self.topics.get(&id).map(|t| t.clone()))
    }

    async fn list_topics(&self) -> Result<Vec<Topic>, StoreError> {
        let mut topics: Vec<Topic> = self.topics.iter().map(|t| t.value().clone()).collect();
        topics.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(topics)
    }

    async fn delete_topic(&self, id: Uuid) -> Result<bool, StoreError> {
        match self.topics.remove(&id) {
            Some((_, topic)) => {
                self.topic_titles.remove_if(&topic.title, |_, owner| *owner == id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_post(&self, post: &Post) -> Result<(), StoreError> {
        self.posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn list_posts(&self, topic_id: Uuid) -> Result<Vec<Post>, StoreError> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|p| p.topic_id == topic_id)
            .map(|p| p.value().clone())
            .collect();
        posts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(posts)
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.posts.remove(&id).is_some())
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
