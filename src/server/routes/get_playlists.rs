use axum::{extract::State, Json};
use serde_json::Value;
use tracing::{info_span, Instrument};

use crate::{
    server::{
        api::playlists_response::{PlaylistInfo, PlaylistsResponse},
        client::fetch_rows,
        error::ServerError,
        AppState,
    },
    sql::QueryBuilder,
};

#[axum_macros::debug_handler]
pub async fn get_playlists(
    State(state): State<AppState>,
) -> Result<Json<PlaylistsResponse>, ServerError> {
    let statement = QueryBuilder::build_playlists_statement();

    let rows = fetch_rows(&state.pool, &statement)
        .instrument(info_span!("fetch_playlists"))
        .await?;

    let rows = rows
        .into_iter()
        .map(|row| serde_json::from_value::<PlaylistInfo>(Value::Object(row.into_iter().collect())))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(PlaylistsResponse { rows }))
}
