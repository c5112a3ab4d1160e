use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::server::{client::ping, AppState};

#[axum_macros::debug_handler]
pub async fn get_health(State(state): State<AppState>) -> impl IntoResponse {
    match ping(&state.pool).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(err) => {
            tracing::warn!(error = %err, "database did not answer the health check");
            StatusCode::GATEWAY_TIMEOUT
        }
    }
}
