use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::{playlist::PlaylistResponse, submission::WeekQuery},
    error::AppError,
    services::playlist_service,
    state::SharedState,
};

/// Weekly playlist endpoint.
pub fn router() -> Router<SharedState> {
    Router::new().route("/playlist", get(week_playlist))
}

#[utoipa::path(
    get,
    path = "/playlist",
    tag = "submissions",
    params(WeekQuery),
    responses((status = 200, description = "Spotify playlist of the week, when enough albums are in", body = PlaylistResponse))
)]
/// Return the Spotify playlist link of a week.
pub async fn week_playlist(
    State(state): State<SharedState>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<PlaylistResponse>, AppError> {
    let week = query.week.unwrap_or_else(|| state.current_week());
    Ok(Json(playlist_service::week_playlist(&state, week).await?))
}
