use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{delete, post, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::admin::{
        ActionResponse, ChangePasswordRequest, CreateMemberRequest, LoginRequest, LoginResponse,
        WeekActionRequest,
    },
    error::AppError,
    services::admin_service,
    state::{SharedState, week::WeekKey},
};

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Admin endpoints. Only the login route is reachable without a session token.
pub fn router(state: SharedState) -> Router<SharedState> {
    let protected = Router::new()
        .route("/admin/logout", post(logout))
        .route("/admin/members", post(create_member))
        .route("/admin/members/{name}", delete(delete_member))
        .route("/admin/password", put(change_password))
        .route("/admin/weeks/unlock", post(unlock_week))
        .route("/admin/weeks/clear-submissions", post(clear_week_submissions))
        .route("/admin/weeks/clear-guesses", post(clear_week_guesses))
        .route("/admin/weeks/clear", post(clear_week))
        .route_layer(middleware::from_fn_with_state(state, require_admin_token));

    Router::new()
        .route("/admin/login", post(login))
        .merge(protected)
}

fn target_week(state: &SharedState, request: WeekActionRequest) -> WeekKey {
    request.week.unwrap_or_else(|| state.current_week())
}

/// Exchange the admin password for a session token.
#[utoipa::path(
    post,
    path = "/admin/login",
    tag = "admin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = LoginResponse),
        (status = 401, description = "Wrong password")
    )
)]
pub async fn login(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<LoginRequest>>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(admin_service::login(&state, &payload.password).await?))
}

/// Close the current admin session.
#[utoipa::path(
    post,
    path = "/admin/logout",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Token issued by /admin/login")),
    responses((status = 204, description = "Session closed"))
)]
pub async fn logout(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let token = token_from(&headers)?;
    admin_service::logout(&state, token);
    Ok(StatusCode::NO_CONTENT)
}

/// Add a member to the roster.
#[utoipa::path(
    post,
    path = "/admin/members",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Token issued by /admin/login")),
    request_body = CreateMemberRequest,
    responses(
        (status = 200, description = "Member added", body = ActionResponse),
        (status = 409, description = "Member already exists")
    )
)]
pub async fn create_member(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateMemberRequest>>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(admin_service::add_member(&state, &payload.name).await?))
}

/// Remove a member from the roster.
#[utoipa::path(
    delete,
    path = "/admin/members/{name}",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Token issued by /admin/login"),
    ("name" = String, Path, description = "Member to remove")),
    responses(
        (status = 200, description = "Member removed", body = ActionResponse),
        (status = 404, description = "Unknown member")
    )
)]
pub async fn delete_member(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(admin_service::delete_member(&state, &name).await?))
}

/// Replace the admin password.
#[utoipa::path(
    put,
    path = "/admin/password",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Token issued by /admin/login")),
    request_body = ChangePasswordRequest,
    responses((status = 200, description = "Password changed", body = ActionResponse))
)]
pub async fn change_password(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<ChangePasswordRequest>>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(
        admin_service::set_admin_password(&state, &payload.password).await?,
    ))
}

/// Let every member of a week edit their guesses again.
#[utoipa::path(
    post,
    path = "/admin/weeks/unlock",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Token issued by /admin/login")),
    request_body = WeekActionRequest,
    responses((status = 200, description = "Week unlocked", body = ActionResponse))
)]
pub async fn unlock_week(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<WeekActionRequest>>,
) -> Result<Json<ActionResponse>, AppError> {
    let week = target_week(&state, payload);
    Ok(Json(admin_service::unlock_week(&state, week).await?))
}

/// Drop every submission of a week.
#[utoipa::path(
    post,
    path = "/admin/weeks/clear-submissions",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Token issued by /admin/login")),
    request_body = WeekActionRequest,
    responses((status = 200, description = "Submissions cleared", body = ActionResponse))
)]
pub async fn clear_week_submissions(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<WeekActionRequest>>,
) -> Result<Json<ActionResponse>, AppError> {
    let week = target_week(&state, payload);
    Ok(Json(
        admin_service::clear_week_submissions(&state, week).await?,
    ))
}

/// Drop every guess of a week.
#[utoipa::path(
    post,
    path = "/admin/weeks/clear-guesses",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Token issued by /admin/login")),
    request_body = WeekActionRequest,
    responses((status = 200, description = "Guesses cleared", body = ActionResponse))
)]
pub async fn clear_week_guesses(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<WeekActionRequest>>,
) -> Result<Json<ActionResponse>, AppError> {
    let week = target_week(&state, payload);
    Ok(Json(admin_service::clear_week_guesses(&state, week).await?))
}

/// Drop every submission and guess of a week.
#[utoipa::path(
    post,
    path = "/admin/weeks/clear",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Token issued by /admin/login")),
    request_body = WeekActionRequest,
    responses((status = 200, description = "Week cleared", body = ActionResponse))
)]
pub async fn clear_week(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<WeekActionRequest>>,
) -> Result<Json<ActionResponse>, AppError> {
    let week = target_week(&state, payload);
    Ok(Json(admin_service::clear_week(&state, week).await?))
}

fn token_from(headers: &HeaderMap) -> Result<Uuid, AppError> {
    let raw = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized("missing admin token header `X-Admin-Token`".into())
        })?;
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::Unauthorized("invalid admin token".into()))
}

async fn require_admin_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = token_from(req.headers())?;
    if admin_service::is_admin(&state, token) {
        Ok(next.run(req).await)
    } else {
        Err(AppError::Unauthorized(
            "admin session expired or unknown".into(),
        ))
    }
}
