//! Post storage.
//!
//! [`PgPostStore`] talks to PostgreSQL through the diesel connection pool;
//! [`MemoryPostStore`] keeps posts in process and can be told to fail, which
//! is what the HTTP tests run against.

mod memory;
mod pg;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::{
    error::StoreResult,
    models::{NewPost, Post},
};

pub use memory::MemoryPostStore;
pub use pg::PgPostStore;

pub type SharedStore = Arc<dyn PostStore>;

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Create the `blog_posts` table if it does not exist yet.
    async fn init_schema(&self) -> StoreResult<()>;

    /// Insert one post atomically, returning it with its assigned `id` and
    /// `created_at`.
    async fn insert(&self, post: NewPost) -> StoreResult<Post>;

    /// All posts, newest `created_at` first.
    async fn list_newest_first(&self) -> StoreResult<Vec<Post>>;
}

/// Run schema initialization once at startup.
///
/// Failures are logged and the server keeps running; requests will report
/// database errors until the store becomes reachable. Returns whether the
/// schema is known to be in place.
pub async fn initialize(store: &dyn PostStore) -> bool {
    match store.init_schema().await {
        Ok(()) => {
            info!("'blog_posts' table initialized or already exists");
            true
        }
        Err(e) => {
            error!("Error initializing database table: {e}");
            error!("Check that PostgreSQL is running and reachable with the configured DB_* credentials");
            false
        }
    }
}
