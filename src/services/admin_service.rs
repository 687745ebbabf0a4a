//! Business logic powering the admin REST routes: session tokens, roster
//! management and week maintenance.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::{admin::ActionResponse, admin::LoginResponse, format_timestamp},
    error::ServiceError,
    services::guess_service::normalize_name,
    state::{SharedState, week::WeekKey},
};

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// Check `password` against the stored admin password and open a session.
pub async fn login(state: &SharedState, password: &str) -> Result<LoginResponse, ServiceError> {
    let doc = state.persistence().load().await?;
    if password != doc.admin_password {
        warn!("admin login refused");
        return Err(ServiceError::Unauthorized("invalid admin password".into()));
    }

    purge_expired(state);
    let token = Uuid::new_v4();
    let expires_at = state.now() + state.config().admin_session_ttl;
    state.admin_sessions().insert(token, expires_at);
    info!("admin session opened");

    Ok(LoginResponse {
        token,
        expires_at: format_timestamp(expires_at),
    })
}

/// Close the session identified by `token`. Unknown tokens are ignored.
pub fn logout(state: &SharedState, token: Uuid) {
    if state.admin_sessions().remove(&token).is_some() {
        debug!("admin session closed");
    }
}

/// Whether `token` identifies a live admin session.
pub fn is_admin(state: &SharedState, token: Uuid) -> bool {
    let now = state.now();
    let live = state
        .admin_sessions()
        .get(&token)
        .is_some_and(|expires_at| *expires_at > now);
    if !live {
        state.admin_sessions().remove(&token);
    }
    live
}

fn purge_expired(state: &SharedState) {
    let now = state.now();
    state
        .admin_sessions()
        .retain(|_, expires_at| *expires_at > now);
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Add `name` to the roster; names are unique case-insensitively.
pub async fn add_member(state: &SharedState, name: &str) -> Result<ActionResponse, ServiceError> {
    let name = normalize_name(name)?;
    let mut doc = state.persistence().load().await?;
    if !doc.add_member(&name) {
        return Err(ServiceError::InvalidState(format!(
            "member `{name}` already exists"
        )));
    }

    let outcome = state.persistence().save(doc).await;
    info!(member = %name, success = outcome.success, "member added");
    Ok(ActionResponse::new(format!("member `{name}` added"), Some(1), outcome))
}

/// Remove `name` from the roster. Past submissions and guesses are kept.
pub async fn delete_member(
    state: &SharedState,
    name: &str,
) -> Result<ActionResponse, ServiceError> {
    let name = normalize_name(name)?;
    let mut doc = state.persistence().load().await?;
    if !doc.remove_member(&name) {
        return Err(ServiceError::NotFound(format!("member `{name}` not found")));
    }

    let outcome = state.persistence().save(doc).await;
    info!(member = %name, success = outcome.success, "member removed");
    Ok(ActionResponse::new(format!("member `{name}` removed"), Some(1), outcome))
}

/// Replace the admin password.
pub async fn set_admin_password(
    state: &SharedState,
    password: &str,
) -> Result<ActionResponse, ServiceError> {
    if password.trim().is_empty() {
        return Err(ServiceError::InvalidInput("password must not be blank".into()));
    }
    let mut doc = state.persistence().load().await?;
    doc.admin_password = password.to_string();

    let outcome = state.persistence().save(doc).await;
    info!(success = outcome.success, "admin password changed");
    Ok(ActionResponse::new("admin password changed", None, outcome))
}

// ---------------------------------------------------------------------------
// Week maintenance
// ---------------------------------------------------------------------------

/// Clear the week's finalization record so everybody can edit guesses again.
///
/// Unlocking a week nobody finalized is a successful no-op.
pub async fn unlock_week(
    state: &SharedState,
    week: WeekKey,
) -> Result<ActionResponse, ServiceError> {
    let mut doc = state.persistence().load().await?;
    let unlocked = doc.unlock_week(week);
    if unlocked == 0 {
        return Ok(ActionResponse::unchanged(format!(
            "no finalized guesses for week {week}"
        )));
    }

    let outcome = state.persistence().save(doc).await;
    info!(%week, unlocked, success = outcome.success, "week unlocked");
    Ok(ActionResponse::new(
        format!("week {week} unlocked"),
        Some(unlocked),
        outcome,
    ))
}

/// Drop every submission of the week.
pub async fn clear_week_submissions(
    state: &SharedState,
    week: WeekKey,
) -> Result<ActionResponse, ServiceError> {
    let mut doc = state.persistence().load().await?;
    let cleared = doc.clear_week_submissions(week);

    let outcome = state.persistence().save(doc).await;
    info!(%week, cleared, success = outcome.success, "week submissions cleared");
    Ok(ActionResponse::new(
        format!("submissions of week {week} cleared"),
        Some(cleared),
        outcome,
    ))
}

/// Drop every guess of the week, unlocking it as well.
pub async fn clear_week_guesses(
    state: &SharedState,
    week: WeekKey,
) -> Result<ActionResponse, ServiceError> {
    let mut doc = state.persistence().load().await?;
    let cleared = doc.clear_week_guesses(week);

    let outcome = state.persistence().save(doc).await;
    info!(%week, cleared, success = outcome.success, "week guesses cleared");
    Ok(ActionResponse::new(
        format!("guesses of week {week} cleared"),
        Some(cleared),
        outcome,
    ))
}

/// Drop submissions and guesses of the week in a single write.
pub async fn clear_week(
    state: &SharedState,
    week: WeekKey,
) -> Result<ActionResponse, ServiceError> {
    let mut doc = state.persistence().load().await?;
    let cleared = doc.clear_week_submissions(week) + doc.clear_week_guesses(week);

    let outcome = state.persistence().save(doc).await;
    info!(%week, cleared, success = outcome.success, "week cleared");
    Ok(ActionResponse::new(
        format!("week {week} cleared"),
        Some(cleared),
        outcome,
    ))
}
