//! Read-only projections: weekly results, overall stats and known weeks.

use crate::{
    dao::models::GameData,
    dto::{
        results::{
            AlbumResultDto, MemberScore, MemberStatsDto, OverallLeaderboardEntry, StatsResponse,
            WeekLeaderboard, WeekResultsResponse, WeeklyLeaderboardEntry,
        },
        submission::WeeksResponse,
    },
    error::ServiceError,
    services::guess_service::ensure_open,
    state::{
        SharedState,
        album::group_submissions,
        scoring::{
            album_results, overall_leaderboard, overall_stats, score_week, weekly_leaderboard,
        },
        week::WeekKey,
    },
};

/// Scores, album breakdown and ranked leaderboard of `week`. Closed before midday.
///
/// The breakdown is classified against `viewer`'s picks; every album is
/// ungraded without a viewer.
pub async fn week_results(
    state: &SharedState,
    week: WeekKey,
    viewer: Option<String>,
) -> Result<WeekResultsResponse, ServiceError> {
    ensure_open(state, "results")?;
    let doc = state.persistence().load().await?;
    let viewer = viewer
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .map(|name| doc.canonical_name(&week, &name));
    Ok(build_week_results(&doc, week, viewer))
}

fn build_week_results(doc: &GameData, week: WeekKey, viewer: Option<String>) -> WeekResultsResponse {
    let submissions = doc.submissions_for(&week);
    let guesses = doc.guesses_for(&week);

    let scores = score_week(&doc.team_members, submissions, guesses);
    let groups = group_submissions(submissions);
    let albums = album_results(&groups, submissions, guesses, viewer.as_deref());

    WeekResultsResponse {
        week,
        viewer,
        scores: scores.iter().map(MemberScore::from).collect(),
        albums: albums.into_iter().map(AlbumResultDto::from).collect(),
        leaderboard: weekly_leaderboard(&scores)
            .into_iter()
            .map(WeeklyLeaderboardEntry::from)
            .collect(),
    }
}

/// Aggregate statistics, overall leaderboard and week-by-week leaderboards.
pub async fn overall(state: &SharedState) -> Result<StatsResponse, ServiceError> {
    let doc = state.persistence().load().await?;
    Ok(build_stats(&doc))
}

fn build_stats(doc: &GameData) -> StatsResponse {
    let stats = overall_stats(doc);

    let weeks = doc
        .weeks()
        .into_iter()
        .map(|week| {
            let scores = score_week(
                &doc.team_members,
                doc.submissions_for(&week),
                doc.guesses_for(&week),
            );
            WeekLeaderboard {
                week,
                leaderboard: weekly_leaderboard(&scores)
                    .into_iter()
                    .map(WeeklyLeaderboardEntry::from)
                    .collect(),
            }
        })
        .collect();

    StatsResponse {
        members: stats
            .iter()
            .filter(|(_, stats)| stats.is_active())
            .map(MemberStatsDto::from)
            .collect(),
        leaderboard: overall_leaderboard(&stats)
            .into_iter()
            .map(OverallLeaderboardEntry::from)
            .collect(),
        weeks,
    }
}

/// Current week and every week that has submissions, most recent first.
pub async fn list_weeks(state: &SharedState) -> Result<WeeksResponse, ServiceError> {
    let doc = state.persistence().load().await?;
    Ok(WeeksResponse {
        current: state.current_week(),
        weeks: doc.weeks(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::{OffsetDateTime, macros::datetime};

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{game_store::MemoryGameStore, models::Guess, persistence::Persistence},
        dto::results::VerdictDto,
        state::{AppState, album::tests::submission, clock::FixedClock},
    };

    fn state_at(now: OffsetDateTime) -> SharedState {
        AppState::with_clock(
            AppConfig::default(),
            Persistence::new(Arc::new(MemoryGameStore::with_data(doc()))),
            Arc::new(FixedClock(now)),
        )
    }

    fn week() -> WeekKey {
        "05/01/2024".parse().unwrap()
    }

    fn doc() -> GameData {
        let mut doc = GameData {
            team_members: vec!["Alice".into(), "Bob".into(), "Carol".into()],
            ..GameData::default()
        };
        doc.submissions.insert(
            week(),
            vec![
                submission(1, "Alice", "X", "A1"),
                submission(2, "Bob", "X", "A1"),
                submission(3, "Carol", "Y", "A2"),
            ],
        );
        doc.guesses.insert(
            week(),
            vec![
                Guess::new("x-a1", "Alice", "Bob", week()),
                Guess::new("y-a2", "Alice", "Carol", week()),
                Guess::new("x-a1", "Bob", "Carol", week()),
                Guess::new("y-a2", "Bob", "Alice", week()),
            ],
        );
        doc
    }

    #[test]
    fn week_results_rank_and_classify() {
        let results = build_week_results(&doc(), week(), Some("Alice".into()));

        assert_eq!(results.scores.len(), 3);
        assert_eq!(results.scores[0].correct, 2);
        assert_eq!(results.scores[0].total, 3);

        let first = &results.leaderboard[0];
        assert_eq!(first.member, "Alice");
        assert_eq!(first.display_rank, "#1");
        assert!((first.percentage - 66.7).abs() < f64::EPSILON);

        let tail = results
            .leaderboard
            .iter()
            .map(|entry| entry.display_rank.as_str())
            .collect::<Vec<_>>();
        assert_eq!(tail, vec!["#1", "=2", "=2"]);

        assert!(matches!(results.albums[0].verdict, VerdictDto::Partial));
        assert!(matches!(results.albums[1].verdict, VerdictDto::AllCorrect));
    }

    #[test]
    fn stats_cover_every_roster_member_and_week() {
        let mut doc = doc();
        doc.team_members.push("Idle".into());
        doc.submissions.insert("29/12/2023".parse().unwrap(), Vec::new());

        let stats = build_stats(&doc);
        let idle = stats
            .members
            .iter()
            .find(|member| member.member == "Idle")
            .unwrap();
        assert_eq!(idle.total_correct, 0);
        assert_eq!(idle.total_guesses, 3);
        assert_eq!(idle.weeks_played, 2);
        assert_eq!(stats.leaderboard.len(), 4);
        assert_eq!(stats.weeks.len(), 2);
        assert_eq!(stats.weeks[0].week, week());
        assert!(stats.weeks[1].leaderboard.is_empty());
    }

    #[tokio::test]
    async fn results_open_at_midday() {
        let morning = state_at(datetime!(2024-01-05 11:59 UTC));
        assert!(matches!(
            week_results(&morning, week(), None).await,
            Err(ServiceError::InvalidState(_))
        ));
        assert!(overall(&morning).await.is_ok());

        let noon = state_at(datetime!(2024-01-05 12:00 UTC));
        assert!(week_results(&noon, week(), None).await.is_ok());
    }

    #[tokio::test]
    async fn viewer_name_matches_any_case() {
        let state = state_at(datetime!(2024-01-05 15:00 UTC));
        let results = week_results(&state, week(), Some(" alice ".into()))
            .await
            .unwrap();
        assert_eq!(results.viewer.as_deref(), Some("Alice"));
        assert!(matches!(results.albums[1].verdict, VerdictDto::AllCorrect));
    }

    #[tokio::test]
    async fn current_week_follows_the_clock() {
        let state = state_at(datetime!(2024-01-06 09:00 UTC));
        let weeks = list_weeks(&state).await.unwrap();
        assert_eq!(weeks.current.to_string(), "12/01/2024");
        assert_eq!(weeks.weeks, vec![week()]);
    }
}
