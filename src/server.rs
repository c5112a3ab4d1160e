pub mod api;

use axum::{
    http::Uri,
    routing::{get, patch, post},
    Router,
};
use axum_tracing_opentelemetry::middleware::OtelAxumLayer;
use sqlx::PgPool;

mod client;
mod config;
mod error;
mod routes;
use self::routes::*;

pub use config::Config;
pub use error::ServerError;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/videos", post(post_videos))
        .route("/videos/count", post(post_videos_count))
        .route("/videos/:video_id", patch(patch_video))
        .route("/playlists", get(get_playlists))
        .route("/schema", get(get_schema))
        .route("/health", get(get_health))
        .fallback(not_found)
        .layer(OtelAxumLayer::default())
        .with_state(state)
}

async fn not_found(uri: Uri) -> ServerError {
    ServerError::NotFound(uri)
}
