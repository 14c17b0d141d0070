use std::time::Duration;

use diesel::{
    prelude::*,
    r2d2::{ConnectionManager, Pool},
    PgConnection,
};

use crate::config::{DatabaseConfig, CONNECT_TIMEOUT_SECS};

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// Idempotent: an existing `blog_posts` table is left untouched. `created_at`
/// stays nullable to match tables created by earlier deployments.
pub const CREATE_BLOG_POSTS: &str = r#"
    CREATE TABLE IF NOT EXISTS blog_posts (
        id SERIAL PRIMARY KEY,
        author_name VARCHAR(255) NOT NULL,
        author_email VARCHAR(255) NOT NULL,
        title VARCHAR(500) NOT NULL,
        content TEXT NOT NULL,
        created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP
    )
"#;

/// Build the bounded connection pool.
///
/// The pool is created without connecting, so an unreachable database shows up
/// as a checkout error on the first request instead of aborting startup.
pub fn get_connection_pool(config: &DatabaseConfig) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(config.connection_string());
    Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .test_on_check_out(true)
        .build_unchecked(manager)
}

pub fn init_schema(conn: &mut PgConnection) -> QueryResult<()> {
    diesel::sql_query(CREATE_BLOG_POSTS).execute(conn)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use diesel::Column;

    use super::CREATE_BLOG_POSTS;
    use crate::schema::blog_posts;

    #[test]
    fn ddl_declares_every_mapped_column() {
        for name in [
            blog_posts::id::NAME,
            blog_posts::author_name::NAME,
            blog_posts::author_email::NAME,
            blog_posts::title::NAME,
            blog_posts::content::NAME,
            blog_posts::created_at::NAME,
        ] {
            assert!(CREATE_BLOG_POSTS.contains(name), "missing column {name}");
        }
    }

    #[test]
    fn ddl_is_create_if_absent_with_nullable_timestamp() {
        assert!(CREATE_BLOG_POSTS.contains("CREATE TABLE IF NOT EXISTS blog_posts"));
        assert!(!CREATE_BLOG_POSTS.contains("OR REPLACE"));
        assert!(CREATE_BLOG_POSTS
            .contains("created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP"));
    }
}
