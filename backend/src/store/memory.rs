use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use super::PostStore;
use crate::{
    error::{StoreError, StoreResult},
    models::{NewPost, Post},
};

/// In-process store with the same ordering and id rules as the database.
#[derive(Default)]
pub struct MemoryPostStore {
    posts: Mutex<Vec<Post>>,
    failure: Option<String>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation fails with `message` as a database error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            posts: Mutex::default(),
            failure: Some(message.into()),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Post>> {
        // A panic while holding the lock cannot leave a half-written post.
        self.posts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self) -> StoreResult<()> {
        match &self.failure {
            Some(message) => Err(StoreError::Query(DieselError::DatabaseError(
                DatabaseErrorKind::UnableToSendCommand,
                Box::new(message.clone()),
            ))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn init_schema(&self) -> StoreResult<()> {
        self.check()
    }

    async fn insert(&self, post: NewPost) -> StoreResult<Post> {
        self.check()?;
        let mut posts = self.lock();
        let id = posts.last().map_or(1, |last| last.id + 1);
        let created = Post {
            id,
            author_name: post.author_name,
            author_email: post.author_email,
            title: post.title,
            content: post.content,
            created_at: Some(Utc::now()),
        };
        posts.push(created.clone());
        Ok(created)
    }

    async fn list_newest_first(&self) -> StoreResult<Vec<Post>> {
        self.check()?;
        let mut posts = self.lock().clone();
        // `None` orders below `Some`, so rows without a timestamp come last.
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }
}
