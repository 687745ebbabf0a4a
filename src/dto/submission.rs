//! Payloads of the submission routes.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    dao::models::Submission,
    dto::validation::{validate_link, validate_member_name, validate_not_blank},
    state::week::WeekKey,
};

/// Album submitted by a member for the current week.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateSubmissionRequest {
    #[validate(custom(function = "validate_member_name"))]
    pub submitter: String,
    #[validate(custom(function = "validate_not_blank"), length(max = 200))]
    pub artist: String,
    #[validate(custom(function = "validate_not_blank"), length(max = 200))]
    pub album: String,
    #[serde(default)]
    #[validate(custom(function = "validate_link"))]
    pub url: Option<String>,
}

/// Optional week selector shared by read routes.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WeekQuery {
    /// Week in `DD/MM/YYYY` form; the current week when omitted.
    #[param(value_type = Option<String>)]
    pub week: Option<WeekKey>,
}

/// Stored submission as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionSummary {
    /// Millisecond timestamp identifier, as a string to survive JSON number limits.
    pub id: String,
    pub artist: String,
    pub album: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub submitter: String,
    #[schema(value_type = String, example = "05/01/2024")]
    pub week: WeekKey,
}

impl From<&Submission> for SubmissionSummary {
    fn from(value: &Submission) -> Self {
        Self {
            id: value.id.to_string(),
            artist: value.artist.clone(),
            album: value.album.clone(),
            url: value.url.clone(),
            submitter: value.submitter.clone(),
            week: value.week,
        }
    }
}

/// Submissions of one week.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionListResponse {
    #[schema(value_type = String, example = "05/01/2024")]
    pub week: WeekKey,
    pub submissions: Vec<SubmissionSummary>,
}

/// Result of creating a submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionCreatedResponse {
    pub submission: SubmissionSummary,
    /// Whether the submission reached the shared store.
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Known weeks, most recent first.
#[derive(Debug, Serialize, ToSchema)]
pub struct WeeksResponse {
    #[schema(value_type = String, example = "05/01/2024")]
    pub current: WeekKey,
    #[schema(value_type = Vec<String>)]
    pub weeks: Vec<WeekKey>,
}

/// Team roster.
#[derive(Debug, Serialize, ToSchema)]
pub struct MembersResponse {
    pub members: Vec<String>,
    /// Last write of the shared document (RFC 3339).
    pub last_updated: String,
}
