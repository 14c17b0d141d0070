use async_trait::async_trait;
use diesel::prelude::*;

use super::PostStore;
use crate::{
    db::{self, DbPool},
    error::{StoreError, StoreResult},
    models::{NewPost, Post},
    schema::blog_posts,
};

/// PostgreSQL-backed store. Each call checks out its own pooled connection
/// and returns it when the call finishes.
#[derive(Clone)]
pub struct PgPostStore {
    pool: DbPool,
}

impl PgPostStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run `f` on a pooled connection on tokio's blocking thread pool.
    async fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await?
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn init_schema(&self) -> StoreResult<()> {
        self.with_conn(|conn| Ok(db::init_schema(conn)?)).await
    }

    async fn insert(&self, post: NewPost) -> StoreResult<Post> {
        self.with_conn(move |conn| {
            let created = conn.transaction::<_, diesel::result::Error, _>(|conn| {
                diesel::insert_into(blog_posts::table)
                    .values(&post)
                    .returning(Post::as_returning())
                    .get_result(conn)
            })?;
            Ok(created)
        })
        .await
    }

    async fn list_newest_first(&self) -> StoreResult<Vec<Post>> {
        self.with_conn(|conn| {
            blog_posts::table
                .select(Post::as_select())
                .order((
                    blog_posts::created_at.desc().nulls_last(),
                    blog_posts::id.desc(),
                ))
                .load(conn)
                .map_err(StoreError::from)
        })
        .await
    }
}
