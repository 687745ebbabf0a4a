use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::guess::{
        FinalizeRequest, FinalizedResponse, GuessChangeResponse, GuessRequest,
        GuessSheetResponse, SheetQuery,
    },
    error::AppError,
    services::guess_service,
    state::{SharedState, guess_rules::Selection},
};

/// Guess sheet and guess mutation endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/guesses/sheet", get(guess_sheet))
        .route("/guesses/status", get(guess_status))
        .route("/guesses", post(add_guess))
        .route("/guesses/remove", post(remove_guess))
        .route("/guesses/finalize", post(finalize_guesses))
}

fn selection_of(request: &GuessRequest) -> Selection {
    Selection::new(
        request.album_key.clone(),
        request.guessed_submitter.trim(),
    )
}

#[utoipa::path(
    get,
    path = "/guesses/sheet",
    tag = "guesses",
    params(SheetQuery),
    responses(
        (status = 200, description = "Albums to guess, in random order", body = GuessSheetResponse),
        (status = 409, description = "Guessing opens at midday")
    )
)]
/// Build the guess form of a member, hiding who submitted what.
pub async fn guess_sheet(
    State(state): State<SharedState>,
    Query(query): Query<SheetQuery>,
) -> Result<Json<GuessSheetResponse>, AppError> {
    let session = state.session(query.guesser, query.week);
    Ok(Json(guess_service::guess_sheet(&state, &session).await?))
}

#[utoipa::path(
    get,
    path = "/guesses/status",
    tag = "guesses",
    params(SheetQuery),
    responses((status = 200, description = "Whether the guesser locked their picks", body = FinalizedResponse))
)]
/// Tell whether a member finalized their guesses for a week.
pub async fn guess_status(
    State(state): State<SharedState>,
    Query(query): Query<SheetQuery>,
) -> Result<Json<FinalizedResponse>, AppError> {
    let session = state.session(query.guesser, query.week);
    let finalized = guess_service::is_finalized(&state, &session).await?;
    Ok(Json(FinalizedResponse {
        week: session.week,
        guesser: session.member.trim().to_string(),
        finalized,
    }))
}

#[utoipa::path(
    post,
    path = "/guesses",
    tag = "guesses",
    request_body = GuessRequest,
    responses(
        (status = 200, description = "Pick stored, or already present", body = GuessChangeResponse),
        (status = 409, description = "Guessing opens at midday"),
        (status = 422, description = "A selection rule refused the pick")
    )
)]
/// Add one pick to the member's guesses.
pub async fn add_guess(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<GuessRequest>>,
) -> Result<Json<GuessChangeResponse>, AppError> {
    let selection = selection_of(&payload);
    let session = state.session(payload.guesser, payload.week);
    Ok(Json(guess_service::add_guess(&state, &session, selection).await?))
}

#[utoipa::path(
    post,
    path = "/guesses/remove",
    tag = "guesses",
    request_body = GuessRequest,
    responses(
        (status = 200, description = "Pick removed, or already absent", body = GuessChangeResponse),
        (status = 409, description = "Guessing opens at midday"),
        (status = 422, description = "Guesses are finalized")
    )
)]
/// Remove one pick from the member's guesses.
pub async fn remove_guess(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<GuessRequest>>,
) -> Result<Json<GuessChangeResponse>, AppError> {
    let selection = selection_of(&payload);
    let session = state.session(payload.guesser, payload.week);
    Ok(Json(
        guess_service::remove_guess(&state, &session, selection).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/guesses/finalize",
    tag = "guesses",
    request_body = FinalizeRequest,
    responses(
        (status = 200, description = "Guesses replaced and locked", body = GuessChangeResponse),
        (status = 409, description = "Guessing is closed, or the week has no albums"),
        (status = 422, description = "A selection rule refused the set"),
        (status = 500, description = "The guesses could not be saved")
    )
)]
/// Replace the member's picks with a complete set and lock them.
pub async fn finalize_guesses(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<FinalizeRequest>>,
) -> Result<Json<GuessChangeResponse>, AppError> {
    let session = state.session(payload.guesser, payload.week);
    let selections = payload.selections.into_iter().map(Selection::from).collect();
    Ok(Json(
        guess_service::finalize_guesses(&state, &session, selections).await?,
    ))
}
