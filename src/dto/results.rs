//! Payloads of the results and stats routes.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::state::{
    ranking::{Podium, Ranked},
    scoring::{AlbumResult, AlbumVerdict, MemberStats, OverallStanding, Score, WeeklyStanding},
    week::WeekKey,
};

/// Query of the weekly results route.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResultsQuery {
    /// Week in `DD/MM/YYYY` form; the current week when omitted.
    #[param(value_type = Option<String>)]
    pub week: Option<WeekKey>,
    /// Member whose picks classify the album breakdown.
    pub guesser: Option<String>,
}

fn percent(tenths: u32) -> f64 {
    f64::from(tenths) / 10.0
}

/// Podium styling hint for leaderboard lines.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PodiumDto {
    First,
    Second,
    Third,
}

impl From<Podium> for PodiumDto {
    fn from(value: Podium) -> Self {
        match value {
            Podium::First => PodiumDto::First,
            Podium::Second => PodiumDto::Second,
            Podium::Third => PodiumDto::Third,
        }
    }
}

/// Score of one member for the week.
#[derive(Debug, Serialize, ToSchema)]
pub struct MemberScore {
    pub member: String,
    pub correct: usize,
    pub total: usize,
    pub submissions: usize,
}

impl From<(&String, &Score)> for MemberScore {
    fn from((member, score): (&String, &Score)) -> Self {
        Self {
            member: member.clone(),
            correct: score.correct,
            total: score.total,
            submissions: score.submissions,
        }
    }
}

/// How the viewer did on one album.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerdictDto {
    AllCorrect,
    Partial,
    Incorrect,
    Ungraded,
}

impl From<AlbumVerdict> for VerdictDto {
    fn from(value: AlbumVerdict) -> Self {
        match value {
            AlbumVerdict::AllCorrect => VerdictDto::AllCorrect,
            AlbumVerdict::Partial => VerdictDto::Partial,
            AlbumVerdict::Incorrect => VerdictDto::Incorrect,
            AlbumVerdict::Ungraded => VerdictDto::Ungraded,
        }
    }
}

/// Album breakdown line, with submitters revealed.
#[derive(Debug, Serialize, ToSchema)]
pub struct AlbumResultDto {
    pub album_key: String,
    pub artist: String,
    pub album: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub actual_submitters: Vec<String>,
    pub is_duplicate: bool,
    pub guessed: Vec<String>,
    pub correct: Vec<String>,
    pub incorrect: Vec<String>,
    pub missed: Vec<String>,
    pub verdict: VerdictDto,
}

impl From<AlbumResult> for AlbumResultDto {
    fn from(value: AlbumResult) -> Self {
        Self {
            album_key: value.key,
            artist: value.artist,
            album: value.album,
            url: value.url,
            actual_submitters: value.actual_submitters,
            is_duplicate: value.is_duplicate,
            guessed: value.guessed,
            correct: value.correct,
            incorrect: value.incorrect,
            missed: value.missed,
            verdict: value.verdict.into(),
        }
    }
}

/// Ranked weekly leaderboard line.
#[derive(Debug, Serialize, ToSchema)]
pub struct WeeklyLeaderboardEntry {
    pub member: String,
    pub correct: usize,
    pub total: usize,
    /// Percentage rounded to one decimal place.
    pub percentage: f64,
    pub rank: usize,
    pub tied: bool,
    /// `=N` when tied, `#N` otherwise.
    pub display_rank: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub podium: Option<PodiumDto>,
}

impl From<Ranked<WeeklyStanding>> for WeeklyLeaderboardEntry {
    fn from(value: Ranked<WeeklyStanding>) -> Self {
        let display_rank = value.display_rank();
        let podium = value.podium().map(Into::into);
        Self {
            member: value.entry.member,
            correct: value.entry.correct,
            total: value.entry.total,
            percentage: percent(value.entry.percentage_tenths),
            rank: value.rank,
            tied: value.tied,
            display_rank,
            podium,
        }
    }
}

/// Results of one week.
#[derive(Debug, Serialize, ToSchema)]
pub struct WeekResultsResponse {
    #[schema(value_type = String, example = "05/01/2024")]
    pub week: WeekKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer: Option<String>,
    pub scores: Vec<MemberScore>,
    pub albums: Vec<AlbumResultDto>,
    pub leaderboard: Vec<WeeklyLeaderboardEntry>,
}

/// Aggregate statistics of one member.
#[derive(Debug, Serialize, ToSchema)]
pub struct MemberStatsDto {
    pub member: String,
    pub total_correct: usize,
    pub total_guesses: usize,
    pub total_submissions: usize,
    pub weeks_played: usize,
    pub weeks_submitted: usize,
}

impl From<(&String, &MemberStats)> for MemberStatsDto {
    fn from((member, stats): (&String, &MemberStats)) -> Self {
        Self {
            member: member.clone(),
            total_correct: stats.total_correct,
            total_guesses: stats.total_guesses,
            total_submissions: stats.total_submissions,
            weeks_played: stats.weeks_played,
            weeks_submitted: stats.weeks_submitted,
        }
    }
}

/// Ranked overall leaderboard line.
#[derive(Debug, Serialize, ToSchema)]
pub struct OverallLeaderboardEntry {
    pub member: String,
    pub total_correct: usize,
    pub total_guesses: usize,
    pub total_submissions: usize,
    /// Accuracy rounded to one decimal place.
    pub accuracy: f64,
    pub rank: usize,
    pub tied: bool,
    pub display_rank: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub podium: Option<PodiumDto>,
}

impl From<Ranked<OverallStanding>> for OverallLeaderboardEntry {
    fn from(value: Ranked<OverallStanding>) -> Self {
        let display_rank = value.display_rank();
        let podium = value.podium().map(Into::into);
        let stats = value.entry.stats;
        Self {
            member: value.entry.member,
            total_correct: stats.total_correct,
            total_guesses: stats.total_guesses,
            total_submissions: stats.total_submissions,
            accuracy: percent(value.entry.accuracy_tenths),
            rank: value.rank,
            tied: value.tied,
            display_rank,
            podium,
        }
    }
}

/// Leaderboard of a single past week on the stats page.
#[derive(Debug, Serialize, ToSchema)]
pub struct WeekLeaderboard {
    #[schema(value_type = String, example = "05/01/2024")]
    pub week: WeekKey,
    pub leaderboard: Vec<WeeklyLeaderboardEntry>,
}

/// Statistics across every week.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub members: Vec<MemberStatsDto>,
    pub leaderboard: Vec<OverallLeaderboardEntry>,
    /// Most recent week first.
    pub weeks: Vec<WeekLeaderboard>,
}
