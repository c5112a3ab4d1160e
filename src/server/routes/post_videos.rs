use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::WithRejection;
use tracing::{info_span, Instrument};

use crate::{
    server::{
        api::{
            videos_request::{Pagination, VideosRequest},
            videos_response::VideosResponse,
        },
        client::{fetch_count, fetch_rows},
        error::ServerError,
        AppState,
    },
    sql::{validate_fetch_request, QueryBuilder},
};

#[axum_macros::debug_handler]
pub async fn post_videos(
    State(state): State<AppState>,
    WithRejection(Query(pagination), _): WithRejection<Query<Pagination>, ServerError>,
    WithRejection(Json(request), _): WithRejection<Json<VideosRequest>, ServerError>,
) -> Result<Json<VideosResponse>, ServerError> {
    let request = validate_fetch_request(&request, &pagination)?;

    let fetch_statement = QueryBuilder::build_fetch_statement(&request)?;
    let count_statement = QueryBuilder::build_count_statement(&request.filters)?;

    let (rows, count) = tokio::try_join!(
        fetch_rows(&state.pool, &fetch_statement).instrument(info_span!("fetch_videos")),
        fetch_count(&state.pool, &count_statement).instrument(info_span!("count_videos")),
    )?;

    Ok(Json(VideosResponse { rows, count }))
}
