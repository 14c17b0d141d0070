use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::{
    error::ApiError,
    models::{CreatePostRequest, CreatedPost, Post},
    store::SharedStore,
};

pub const HEALTH_STATUS: &str = "InkDrop Backend is humming!";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: HEALTH_STATUS,
    })
}

pub async fn create_post(
    State(store): State<SharedStore>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedPost>), ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;
    let new_post = request.validate()?;

    let post = store.insert(new_post).await.map_err(ApiError::publish)?;
    info!(id = post.id, "Post created: {} by {}", post.title, post.author_name);

    Ok((StatusCode::CREATED, Json(CreatedPost::from(post))))
}

pub async fn get_posts(State(store): State<SharedStore>) -> Result<Json<Vec<Post>>, ApiError> {
    let posts = store.list_newest_first().await.map_err(ApiError::retrieve)?;
    info!("Fetched {} blog posts", posts.len());

    Ok(Json(posts))
}
