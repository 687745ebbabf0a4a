use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::results::{ResultsQuery, StatsResponse, WeekResultsResponse},
    error::AppError,
    services::results_service,
    state::SharedState,
};

/// Read-only scoring endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/results", get(week_results))
        .route("/stats", get(stats))
}

#[utoipa::path(
    get,
    path = "/results",
    tag = "results",
    params(ResultsQuery),
    responses(
        (status = 200, description = "Scores, album breakdown and leaderboard", body = WeekResultsResponse),
        (status = 409, description = "Results open at midday")
    )
)]
/// Return the results of a week, graded against the viewer's picks when given.
pub async fn week_results(
    State(state): State<SharedState>,
    Query(query): Query<ResultsQuery>,
) -> Result<Json<WeekResultsResponse>, AppError> {
    let week = query.week.unwrap_or_else(|| state.current_week());
    let payload = results_service::week_results(&state, week, query.guesser).await?;
    Ok(Json(payload))
}

#[utoipa::path(
    get,
    path = "/stats",
    tag = "results",
    responses((status = 200, description = "Statistics across every week", body = StatsResponse))
)]
/// Return aggregate statistics and leaderboards.
pub async fn stats(State(state): State<SharedState>) -> Result<Json<StatsResponse>, AppError> {
    Ok(Json(results_service::overall(&state).await?))
}
