use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use axum_valid::Valid;

use crate::{
    dto::submission::{
        CreateSubmissionRequest, MembersResponse, SubmissionCreatedResponse,
        SubmissionListResponse, WeekQuery, WeeksResponse,
    },
    error::AppError,
    services::{results_service, submission_service},
    state::SharedState,
};

/// Submission and roster endpoints available to every member.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/submissions", get(list_submissions).post(create_submission))
        .route("/weeks", get(list_weeks))
        .route("/members", get(list_members))
}

#[utoipa::path(
    get,
    path = "/submissions",
    tag = "submissions",
    params(WeekQuery),
    responses(
        (status = 200, description = "Submissions of the week", body = SubmissionListResponse),
        (status = 503, description = "No copy of the game document is readable")
    )
)]
/// List the albums submitted for a week.
pub async fn list_submissions(
    State(state): State<SharedState>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<SubmissionListResponse>, AppError> {
    let week = query.week.unwrap_or_else(|| state.current_week());
    let payload = submission_service::list_submissions(&state, week).await?;
    Ok(Json(payload))
}

#[utoipa::path(
    post,
    path = "/submissions",
    tag = "submissions",
    request_body = CreateSubmissionRequest,
    responses(
        (status = 200, description = "Album recorded", body = SubmissionCreatedResponse),
        (status = 400, description = "Invalid submission"),
        (status = 409, description = "Weekly submission limit reached")
    )
)]
/// Submit an album for a week.
pub async fn create_submission(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateSubmissionRequest>>,
) -> Result<Json<SubmissionCreatedResponse>, AppError> {
    let created = submission_service::add_submission(&state, payload).await?;
    Ok(Json(created))
}

#[utoipa::path(
    get,
    path = "/weeks",
    tag = "submissions",
    responses((status = 200, description = "Current week and weeks with submissions", body = WeeksResponse))
)]
/// List the weeks that have submissions, most recent first.
pub async fn list_weeks(State(state): State<SharedState>) -> Result<Json<WeeksResponse>, AppError> {
    Ok(Json(results_service::list_weeks(&state).await?))
}

#[utoipa::path(
    get,
    path = "/members",
    tag = "submissions",
    responses((status = 200, description = "Team roster", body = MembersResponse))
)]
/// List the team roster.
pub async fn list_members(
    State(state): State<SharedState>,
) -> Result<Json<MembersResponse>, AppError> {
    Ok(Json(submission_service::list_members(&state).await?))
}
