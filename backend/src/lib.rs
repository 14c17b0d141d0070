//! InkDrop backend: publish blog posts and list them newest first over a
//! small JSON API backed by a single PostgreSQL table.

pub mod config;
pub mod db;
pub mod error;
pub mod handler;
pub mod models;
pub mod schema;
pub mod store;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::store::SharedStore;

/// `GET /`, `GET /posts` and `POST /posts`, open to any origin.
pub fn configure_routes(store: SharedStore) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/", get(handler::health))
        .route("/posts", get(handler::get_posts).post(handler::create_post))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}
