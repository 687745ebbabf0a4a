use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Album Club Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::submissions::list_submissions,
        crate::routes::submissions::create_submission,
        crate::routes::submissions::list_weeks,
        crate::routes::submissions::list_members,
        crate::routes::playlist::week_playlist,
        crate::routes::guesses::guess_sheet,
        crate::routes::guesses::guess_status,
        crate::routes::guesses::add_guess,
        crate::routes::guesses::remove_guess,
        crate::routes::guesses::finalize_guesses,
        crate::routes::results::week_results,
        crate::routes::results::stats,
        crate::routes::admin::login,
        crate::routes::admin::logout,
        crate::routes::admin::create_member,
        crate::routes::admin::delete_member,
        crate::routes::admin::change_password,
        crate::routes::admin::unlock_week,
        crate::routes::admin::clear_week_submissions,
        crate::routes::admin::clear_week_guesses,
        crate::routes::admin::clear_week,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::submission::CreateSubmissionRequest,
            crate::dto::submission::SubmissionSummary,
            crate::dto::submission::SubmissionListResponse,
            crate::dto::submission::SubmissionCreatedResponse,
            crate::dto::submission::WeeksResponse,
            crate::dto::submission::MembersResponse,
            crate::dto::playlist::PlaylistResponse,
            crate::dto::guess::GuessRequest,
            crate::dto::guess::SelectionInput,
            crate::dto::guess::FinalizeRequest,
            crate::dto::guess::FinalizedResponse,
            crate::dto::guess::GuessChangeResponse,
            crate::dto::guess::SheetAlbum,
            crate::dto::guess::GuessSheetResponse,
            crate::dto::results::PodiumDto,
            crate::dto::results::VerdictDto,
            crate::dto::results::MemberScore,
            crate::dto::results::AlbumResultDto,
            crate::dto::results::WeeklyLeaderboardEntry,
            crate::dto::results::WeekResultsResponse,
            crate::dto::results::MemberStatsDto,
            crate::dto::results::OverallLeaderboardEntry,
            crate::dto::results::WeekLeaderboard,
            crate::dto::results::StatsResponse,
            crate::dto::admin::LoginRequest,
            crate::dto::admin::LoginResponse,
            crate::dto::admin::CreateMemberRequest,
            crate::dto::admin::WeekActionRequest,
            crate::dto::admin::ChangePasswordRequest,
            crate::dto::admin::ActionResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "submissions", description = "Weekly album submissions and roster"),
        (name = "guesses", description = "Guess sheet and guess mutations"),
        (name = "results", description = "Scores, leaderboards and statistics"),
        (name = "admin", description = "Session-protected maintenance operations"),
    )
)]
pub struct ApiDoc;
