use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use tracing::{info_span, Instrument};

use crate::{
    server::{
        api::videos_request::VideoEditRequest, client::execute, error::ServerError, AppState,
    },
    sql::{validate_video_edit, QueryBuilder},
};

#[axum_macros::debug_handler]
pub async fn patch_video(
    State(state): State<AppState>,
    WithRejection(Path(video_id), _): WithRejection<Path<i64>, ServerError>,
    WithRejection(Json(request), _): WithRejection<Json<VideoEditRequest>, ServerError>,
) -> Result<StatusCode, ServerError> {
    let edit = validate_video_edit(video_id, &request)?;
    let statement = QueryBuilder::build_edit_statement(&edit)?;

    let affected = execute(&state.pool, &statement)
        .instrument(info_span!("edit_video", video_id))
        .await?;

    if affected == 0 {
        return Err(ServerError::VideoNotFound(video_id));
    }

    tracing::info!(video_id, columns = edit.assignments.len(), "video edited");

    Ok(StatusCode::NO_CONTENT)
}
