use tracing::info;

use crate::{
    dao::models::Submission,
    dto::submission::{
        CreateSubmissionRequest, MembersResponse, SubmissionCreatedResponse,
        SubmissionListResponse, SubmissionSummary,
    },
    dto::format_timestamp,
    error::ServiceError,
    services::guess_service::normalize_name,
    state::{SharedState, week::WeekKey},
};

/// How many albums one member may submit per week.
pub const MAX_SUBMISSIONS_PER_WEEK: usize = 2;

fn now_ms(state: &SharedState) -> u64 {
    u64::try_from(state.now().unix_timestamp_nanos() / 1_000_000).unwrap_or_default()
}

fn required(value: &str, field: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidInput(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Record a new album for the submitter in the current week.
///
/// The submitter must be on the roster; the stored name is the roster's
/// spelling, so the weekly cap holds whatever case the client sends.
pub async fn add_submission(
    state: &SharedState,
    request: CreateSubmissionRequest,
) -> Result<SubmissionCreatedResponse, ServiceError> {
    let submitter = normalize_name(&request.submitter)?;
    let artist = required(&request.artist, "artist")?;
    let album = required(&request.album, "album")?;
    let url = request
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string);
    let week = state.current_week();

    let mut doc = state.persistence().load().await?;
    let Some(submitter) = doc.resolve_member(&submitter).map(str::to_string) else {
        return Err(ServiceError::InvalidInput(format!(
            "`{submitter}` is not a team member"
        )));
    };

    let already = doc
        .submissions_for(&week)
        .iter()
        .filter(|submission| submission.submitter.eq_ignore_ascii_case(&submitter))
        .count();
    if already >= MAX_SUBMISSIONS_PER_WEEK {
        return Err(ServiceError::InvalidState(format!(
            "`{submitter}` already submitted {MAX_SUBMISSIONS_PER_WEEK} albums for week {week}"
        )));
    }

    let submission = Submission {
        id: doc.next_submission_id(now_ms(state)),
        artist,
        album,
        url,
        submitter,
        week,
    };
    let summary = SubmissionSummary::from(&submission);
    doc.submissions.entry(week).or_default().push(submission);

    let outcome = state.persistence().save(doc).await;
    info!(
        %week,
        submitter = %summary.submitter,
        success = outcome.success,
        "album submitted"
    );

    Ok(SubmissionCreatedResponse {
        submission: summary,
        success: outcome.success,
        error: outcome.error,
    })
}

/// Submissions of `week`, in submission order.
pub async fn list_submissions(
    state: &SharedState,
    week: WeekKey,
) -> Result<SubmissionListResponse, ServiceError> {
    let doc = state.persistence().load().await?;
    Ok(SubmissionListResponse {
        week,
        submissions: doc
            .submissions_for(&week)
            .iter()
            .map(SubmissionSummary::from)
            .collect(),
    })
}

/// Team roster, in insertion order.
pub async fn list_members(state: &SharedState) -> Result<MembersResponse, ServiceError> {
    let doc = state.persistence().load().await?;
    Ok(MembersResponse {
        members: doc.team_members,
        last_updated: format_timestamp(doc.last_updated),
    })
}
