use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use tracing::{info_span, Instrument};

use crate::{
    server::{
        api::{videos_request::CountRequest, videos_response::CountResponse},
        client::fetch_count,
        error::ServerError,
        AppState,
    },
    sql::{validate_filters, QueryBuilder},
};

#[axum_macros::debug_handler]
pub async fn post_videos_count(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<CountRequest>, ServerError>,
) -> Result<Json<CountResponse>, ServerError> {
    let filters = validate_filters(&request.filters)?;
    let statement = QueryBuilder::build_count_statement(&filters)?;

    let count = fetch_count(&state.pool, &statement)
        .instrument(info_span!("count_videos"))
        .await?;

    Ok(Json(CountResponse { count }))
}
