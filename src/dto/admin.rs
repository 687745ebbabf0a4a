//! DTO definitions used by the admin REST API and documentation layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::persistence::SaveOutcome,
    dto::validation::{validate_member_name, validate_not_blank},
    state::week::WeekKey,
};

/// Admin login attempt.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub password: String,
}

/// Token to send back in the `X-Admin-Token` header.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: Uuid,
    /// Expiry of the session (RFC 3339).
    pub expires_at: String,
}

/// New roster member.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateMemberRequest {
    #[validate(custom(function = "validate_member_name"))]
    pub name: String,
}

/// Week targeted by an admin maintenance action.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct WeekActionRequest {
    /// Week in `DD/MM/YYYY` form; the current week when omitted.
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "05/01/2024")]
    pub week: Option<WeekKey>,
}

/// New admin password.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ChangePasswordRequest {
    #[validate(custom(function = "validate_not_blank"), length(min = 4, max = 128))]
    pub password: String,
}

/// Generic action acknowledgement used by admin endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    pub message: String,
    /// Rows affected by the action, when meaningful.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected: Option<usize>,
    /// Whether the change reached the shared store.
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResponse {
    pub fn new(message: impl Into<String>, affected: Option<usize>, outcome: SaveOutcome) -> Self {
        Self {
            message: message.into(),
            affected,
            success: outcome.success,
            error: outcome.error,
        }
    }

    /// Acknowledge an action that required no write.
    pub fn unchanged(message: impl Into<String>) -> Self {
        Self::new(message, Some(0), SaveOutcome::ok())
    }
}
