//! Week scores, per-album verdicts and leaderboards.
//!
//! Everything here is recomputed from the raw submissions and guesses on each
//! query; nothing is cached or persisted.

use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::{
    dao::models::{GameData, Guess, Submission},
    state::{
        album::{AlbumGroup, album_key_for_submission, group_submissions},
        ranking::{Ranked, rank},
    },
};

/// Score of one member for one week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    /// Correctly identified submitters, summed over albums.
    pub correct: usize,
    /// Denominator: every submission of the week, duplicates included.
    pub total: usize,
    /// Submissions this member made during the week.
    pub submissions: usize,
}

/// Album key a guess row refers to, resolving legacy submission-keyed rows.
pub fn resolved_album_key(guess: &Guess, submissions: &[Submission]) -> Option<String> {
    match (&guess.album_key, guess.submission_id) {
        (Some(album_key), _) => Some(album_key.clone()),
        (None, Some(id)) => album_key_for_submission(submissions, id),
        (None, None) => None,
    }
}

/// Distinct names each guesser picked, per album key.
type PicksByAlbum = IndexMap<String, IndexMap<String, Vec<String>>>;

fn picks_by_album(submissions: &[Submission], guesses: &[Guess]) -> PicksByAlbum {
    let mut picks = PicksByAlbum::new();
    for guess in guesses {
        let Some(album_key) = resolved_album_key(guess, submissions) else {
            continue;
        };
        let names = picks
            .entry(album_key)
            .or_default()
            .entry(guess.guesser.clone())
            .or_default();
        if !names.contains(&guess.guessed_submitter) {
            names.push(guess.guessed_submitter.clone());
        }
    }
    picks
}

fn submissions_by(submissions: &[Submission], member: &str) -> usize {
    submissions
        .iter()
        .filter(|submission| submission.submitter == member)
        .count()
}

/// Score every roster member and every guesser for one week.
///
/// Roster members come first in roster order, followed by guessers missing
/// from the roster in order of their first guess.
pub fn score_week(
    members: &[String],
    submissions: &[Submission],
    guesses: &[Guess],
) -> IndexMap<String, Score> {
    let total = submissions.len();
    let fresh = |name: &str| Score {
        correct: 0,
        total,
        submissions: submissions_by(submissions, name),
    };

    let mut scores: IndexMap<String, Score> = IndexMap::new();
    for member in members {
        scores.insert(member.clone(), fresh(member));
    }
    for guess in guesses {
        if !scores.contains_key(&guess.guesser) {
            scores.insert(guess.guesser.clone(), fresh(&guess.guesser));
        }
    }

    let groups = group_submissions(submissions);
    let picks = picks_by_album(submissions, guesses);
    for (album_key, group) in &groups {
        let Some(by_guesser) = picks.get(album_key) else {
            continue;
        };
        let actual = group.distinct_submitters();
        for (guesser, names) in by_guesser {
            let correct = names
                .iter()
                .filter(|name| actual.contains(&name.as_str()))
                .count();
            if let Some(score) = scores.get_mut(guesser) {
                score.correct += correct;
            }
        }
    }

    scores
}

/// How well a guesser did on one album.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumVerdict {
    AllCorrect,
    Partial,
    Incorrect,
    Ungraded,
}

impl AlbumVerdict {
    fn classify(guessed: usize, correct: usize, missed: usize) -> Self {
        if guessed == 0 {
            AlbumVerdict::Ungraded
        } else if missed == 0 {
            AlbumVerdict::AllCorrect
        } else if correct == 0 {
            AlbumVerdict::Incorrect
        } else {
            AlbumVerdict::Partial
        }
    }
}

/// Album breakdown entry as seen by one viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumResult {
    pub key: String,
    pub artist: String,
    pub album: String,
    pub url: Option<String>,
    pub actual_submitters: Vec<String>,
    pub is_duplicate: bool,
    /// Names the viewer picked, without repetition.
    pub guessed: Vec<String>,
    pub correct: Vec<String>,
    pub incorrect: Vec<String>,
    pub missed: Vec<String>,
    pub verdict: AlbumVerdict,
}

/// Classify every album of the week for `viewer`.
///
/// Without a viewer every album is [`AlbumVerdict::Ungraded`].
pub fn album_results(
    groups: &IndexMap<String, AlbumGroup>,
    submissions: &[Submission],
    guesses: &[Guess],
    viewer: Option<&str>,
) -> Vec<AlbumResult> {
    let picks = picks_by_album(submissions, guesses);

    groups
        .values()
        .map(|group| {
            let actual = group
                .distinct_submitters()
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>();
            let guessed = viewer
                .and_then(|viewer| picks.get(&group.key)?.get(viewer))
                .cloned()
                .unwrap_or_default();

            let (correct, incorrect): (Vec<String>, Vec<String>) =
                guessed.iter().cloned().partition(|name| actual.contains(name));
            let missed = actual
                .iter()
                .filter(|name| !guessed.contains(name))
                .cloned()
                .collect::<Vec<_>>();
            let verdict = AlbumVerdict::classify(guessed.len(), correct.len(), missed.len());

            AlbumResult {
                key: group.key.clone(),
                artist: group.artist.clone(),
                album: group.album.clone(),
                url: group.url.clone(),
                is_duplicate: group.is_duplicate(),
                actual_submitters: actual,
                guessed,
                correct,
                incorrect,
                missed,
                verdict,
            }
        })
        .collect()
}

/// Aggregate statistics of one member across every week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemberStats {
    pub total_correct: usize,
    pub total_guesses: usize,
    pub total_submissions: usize,
    pub weeks_played: usize,
    pub weeks_submitted: usize,
}

impl MemberStats {
    /// Whether the member took part in the game at all.
    pub fn is_active(&self) -> bool {
        self.total_guesses > 0 || self.total_submissions > 0
    }
}

/// Per-member aggregate over every week that has a submissions entry.
pub fn overall_stats(data: &GameData) -> IndexMap<String, MemberStats> {
    let mut stats = data
        .team_members
        .iter()
        .map(|member| (member.clone(), MemberStats::default()))
        .collect::<IndexMap<_, _>>();

    for week in data.weeks() {
        let submissions = data.submissions_for(&week);
        let scores = score_week(&data.team_members, submissions, data.guesses_for(&week));
        for (member, entry) in stats.iter_mut() {
            if let Some(score) = scores.get(member) {
                entry.total_correct += score.correct;
                entry.total_guesses += score.total;
                entry.weeks_played += 1;
            }
            let submitted = submissions_by(submissions, member);
            entry.total_submissions += submitted;
            if submitted > 0 {
                entry.weeks_submitted += 1;
            }
        }
    }

    stats
}

/// Ratio as a percentage in tenths of a point, rounded half away from zero.
pub fn percent_tenths(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let tenths = (part * 1000 + whole / 2) / whole;
    u32::try_from(tenths).unwrap_or(u32::MAX)
}

/// Weekly leaderboard line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyStanding {
    pub member: String,
    pub correct: usize,
    pub total: usize,
    pub percentage_tenths: u32,
}

/// Rank members who had anything to guess, by correct answers then percentage.
pub fn weekly_leaderboard(scores: &IndexMap<String, Score>) -> Vec<Ranked<WeeklyStanding>> {
    let mut standings = scores
        .iter()
        .filter(|(_, score)| score.total > 0)
        .map(|(member, score)| WeeklyStanding {
            member: member.clone(),
            correct: score.correct,
            total: score.total,
            percentage_tenths: percent_tenths(score.correct, score.total),
        })
        .collect::<Vec<_>>();

    standings.sort_by(|a, b| {
        b.correct
            .cmp(&a.correct)
            .then_with(|| b.percentage_tenths.cmp(&a.percentage_tenths))
    });

    rank(standings, |entry| {
        (entry.correct, entry.total, entry.percentage_tenths)
    })
}

/// Overall leaderboard line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverallStanding {
    pub member: String,
    pub stats: MemberStats,
    pub accuracy_tenths: u32,
}

/// Rank active members by accuracy then total correct answers.
pub fn overall_leaderboard(
    stats: &IndexMap<String, MemberStats>,
) -> Vec<Ranked<OverallStanding>> {
    let mut standings = stats
        .iter()
        .filter(|(_, stats)| stats.is_active())
        .map(|(member, stats)| OverallStanding {
            member: member.clone(),
            stats: *stats,
            accuracy_tenths: percent_tenths(stats.total_correct, stats.total_guesses),
        })
        .collect::<Vec<_>>();

    standings.sort_by(|a, b| match b.accuracy_tenths.cmp(&a.accuracy_tenths) {
        Ordering::Equal => b.stats.total_correct.cmp(&a.stats.total_correct),
        other => other,
    });

    rank(standings, |entry| {
        (
            entry.stats.total_correct,
            entry.stats.total_guesses,
            entry.accuracy_tenths,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{album::tests::submission, week::WeekKey};

    fn week() -> WeekKey {
        "05/01/2024".parse().unwrap()
    }

    fn members(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn scenario() -> Vec<Submission> {
        vec![
            submission(1, "Alice", "X", "A1"),
            submission(2, "Bob", "X", "A1"),
            submission(3, "Carol", "Y", "A2"),
        ]
    }

    #[test]
    fn duplicate_album_counts_every_matched_submitter() {
        let submissions = scenario();
        let guesses = vec![
            Guess::new("x-a1", "Dave", "Alice", week()),
            Guess::new("x-a1", "Dave", "Bob", week()),
            Guess::new("y-a2", "Dave", "Carol", week()),
        ];

        let scores = score_week(&members(&["Alice", "Bob", "Carol"]), &submissions, &guesses);
        assert_eq!(
            scores["Dave"],
            Score {
                correct: 3,
                total: 3,
                submissions: 0
            }
        );
        assert_eq!(
            scores["Alice"],
            Score {
                correct: 0,
                total: 3,
                submissions: 1
            }
        );
        assert_eq!(
            scores.keys().collect::<Vec<_>>(),
            vec!["Alice", "Bob", "Carol", "Dave"]
        );
    }

    #[test]
    fn duplicate_album_pair_scores_two_of_three() {
        let submissions = scenario();
        let guesses = vec![
            Guess::new("x-a1", "Dave", "Alice", week()),
            Guess::new("x-a1", "Dave", "Bob", week()),
            Guess::new("y-a2", "Dave", "Alice", week()),
        ];

        let scores = score_week(&[], &submissions, &guesses);
        assert_eq!(scores["Dave"].correct, 2);
        assert_eq!(scores["Dave"].total, 3);
    }

    #[test]
    fn legacy_rows_are_resolved_through_the_submission() {
        let submissions = scenario();
        let guesses = vec![Guess {
            album_key: None,
            submission_id: Some(3),
            guesser: "Dave".into(),
            guessed_submitter: "Carol".into(),
            week: week(),
        }];

        let scores = score_week(&[], &submissions, &guesses);
        assert_eq!(scores["Dave"].correct, 1);
    }

    #[test]
    fn repeated_guess_rows_count_once() {
        let submissions = scenario();
        let guesses = vec![
            Guess::new("y-a2", "Dave", "Carol", week()),
            Guess {
                album_key: None,
                submission_id: Some(3),
                guesser: "Dave".into(),
                guessed_submitter: "Carol".into(),
                week: week(),
            },
        ];
        let scores = score_week(&[], &submissions, &guesses);
        assert_eq!(scores["Dave"].correct, 1);
    }

    #[test]
    fn verdicts_for_viewer() {
        let submissions = scenario();
        let groups = group_submissions(&submissions);
        let guesses = vec![
            Guess::new("x-a1", "Dave", "Alice", week()),
            Guess::new("y-a2", "Dave", "Bob", week()),
        ];

        let results = album_results(&groups, &submissions, &guesses, Some("Dave"));
        assert_eq!(results[0].verdict, AlbumVerdict::Partial);
        assert_eq!(results[0].correct, vec!["Alice"]);
        assert_eq!(results[0].missed, vec!["Bob"]);
        assert!(results[0].is_duplicate);
        assert_eq!(results[1].verdict, AlbumVerdict::Incorrect);
        assert_eq!(results[1].incorrect, vec!["Bob"]);

        let anonymous = album_results(&groups, &submissions, &guesses, None);
        assert!(
            anonymous
                .iter()
                .all(|result| result.verdict == AlbumVerdict::Ungraded)
        );
    }

    #[test]
    fn extra_wrong_pick_on_covered_album_is_all_correct() {
        let submissions = vec![
            submission(1, "Alice", "X", "A1"),
            submission(2, "Bob", "X", "A1"),
            submission(3, "Carol", "Y", "A2"),
        ];
        let groups = group_submissions(&submissions);
        let guesses = vec![
            Guess::new("y-a2", "Dave", "Carol", week()),
            Guess::new("y-a2", "Dave", "Alice", week()),
        ];
        let results = album_results(&groups, &submissions, &guesses, Some("Dave"));
        assert_eq!(results[0].verdict, AlbumVerdict::Ungraded);
        assert_eq!(results[1].verdict, AlbumVerdict::AllCorrect);
        assert_eq!(results[1].incorrect, vec!["Alice"]);
    }

    #[test]
    fn overall_stats_sum_every_week() {
        let mut data = GameData {
            team_members: members(&["Alice", "Bob"]),
            ..GameData::default()
        };
        let first: WeekKey = "05/01/2024".parse().unwrap();
        let second: WeekKey = "12/01/2024".parse().unwrap();
        data.submissions.insert(
            first,
            vec![
                submission(1, "Alice", "X", "A1"),
                submission(2, "Bob", "Y", "A2"),
            ],
        );
        data.submissions
            .insert(second, vec![submission(3, "Alice", "Z", "A3")]);
        data.guesses.insert(
            first,
            vec![
                Guess::new("y-a2", "Alice", "Bob", first),
                Guess::new("x-a1", "Bob", "Bob", first),
            ],
        );

        let stats = overall_stats(&data);
        assert_eq!(
            stats["Alice"],
            MemberStats {
                total_correct: 1,
                total_guesses: 3,
                total_submissions: 2,
                weeks_played: 2,
                weeks_submitted: 2,
            }
        );
        assert_eq!(stats["Bob"].total_correct, 0);
        assert_eq!(stats["Bob"].weeks_submitted, 1);
    }

    #[test]
    fn percentages_round_to_one_decimal() {
        assert_eq!(percent_tenths(2, 3), 667);
        assert_eq!(percent_tenths(1, 3), 333);
        assert_eq!(percent_tenths(3, 3), 1000);
        assert_eq!(percent_tenths(0, 0), 0);
    }

    #[test]
    fn weekly_leaderboard_orders_and_ranks() {
        let mut scores = IndexMap::new();
        for (name, correct) in [("Carol", 1), ("Alice", 3), ("Bob", 3), ("Dave", 0)] {
            scores.insert(
                name.to_string(),
                Score {
                    correct,
                    total: 4,
                    submissions: 1,
                },
            );
        }
        scores.insert(
            "Nobody".into(),
            Score {
                correct: 0,
                total: 0,
                submissions: 0,
            },
        );

        let board = weekly_leaderboard(&scores);
        let lines = board
            .iter()
            .map(|r| (r.entry.member.as_str(), r.display_rank()))
            .collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                ("Alice", "=1".to_string()),
                ("Bob", "=1".to_string()),
                ("Carol", "#3".to_string()),
                ("Dave", "#4".to_string()),
            ]
        );
    }

    #[test]
    fn overall_leaderboard_prefers_accuracy() {
        let mut stats = IndexMap::new();
        stats.insert(
            "Alice".to_string(),
            MemberStats {
                total_correct: 4,
                total_guesses: 10,
                ..MemberStats::default()
            },
        );
        stats.insert(
            "Bob".to_string(),
            MemberStats {
                total_correct: 3,
                total_guesses: 5,
                ..MemberStats::default()
            },
        );
        stats.insert("Idle".to_string(), MemberStats::default());

        let board = overall_leaderboard(&stats);
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].entry.member, "Bob");
        assert_eq!(board[0].entry.accuracy_tenths, 600);
        assert_eq!(board[1].rank, 2);
    }
}
