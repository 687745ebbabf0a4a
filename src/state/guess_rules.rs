//! Legality rules for a guesser's selections within one week.
//!
//! Every check runs against the selection set a mutation would produce and
//! never touches storage.

use indexmap::IndexMap;
use thiserror::Error;

use crate::{
    dao::models::Guess,
    state::album::{AlbumGroup, max_duplicate_count},
};

/// How many times one person may be picked across all albums of a week.
pub const MAX_SELECTIONS_PER_PERSON: usize = 2;

/// Why a guess mutation was refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GuessRejection {
    #[error("you can only select up to {max} people on one album")]
    DuplicateCapExceeded { album_key: String, max: usize },
    #[error("only one album can have multiple selections")]
    MultiAlbumConflict,
    #[error("you can select each person at most twice; `{person}` is selected {count} times")]
    PersonCapExceeded { person: String, count: usize },
    #[error("select at least one person for each album before finalizing")]
    IncompleteAlbums { missing: Vec<String> },
    #[error("your guesses for this week have been finalized and cannot be changed")]
    GuessesFinalized,
    #[error("album `{album_key}` was not submitted this week")]
    UnknownAlbum { album_key: String },
}

impl GuessRejection {
    /// Stable snake_case name of the rule that failed.
    pub fn rule(&self) -> &'static str {
        match self {
            GuessRejection::DuplicateCapExceeded { .. } => "duplicate_cap_exceeded",
            GuessRejection::MultiAlbumConflict => "multi_album_conflict",
            GuessRejection::PersonCapExceeded { .. } => "person_cap_exceeded",
            GuessRejection::IncompleteAlbums { .. } => "incomplete_albums",
            GuessRejection::GuessesFinalized => "guesses_finalized",
            GuessRejection::UnknownAlbum { .. } => "unknown_album",
        }
    }
}

/// One "this person submitted that album" pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub album_key: String,
    pub guessed_submitter: String,
}

impl Selection {
    pub fn new(album_key: impl Into<String>, guessed_submitter: impl Into<String>) -> Self {
        Self {
            album_key: album_key.into(),
            guessed_submitter: guessed_submitter.into(),
        }
    }
}

/// Picks per album for a single guesser, without repetition.
type SelectionMap<'s> = IndexMap<&'s str, Vec<&'s str>>;

fn insert<'s>(map: &mut SelectionMap<'s>, album_key: &'s str, person: &'s str) {
    let picks = map.entry(album_key).or_default();
    if !picks.contains(&person) {
        picks.push(person);
    }
}

/// Selections `guesser` currently holds in `guesses`, ignoring legacy rows.
fn selections_of<'s>(guesses: &'s [Guess], guesser: &str) -> SelectionMap<'s> {
    let mut map = SelectionMap::new();
    for guess in guesses.iter().filter(|guess| guess.guesser == guesser) {
        if let Some(album_key) = guess.album_key.as_deref() {
            insert(&mut map, album_key, &guess.guessed_submitter);
        }
    }
    map
}

/// Rule set bound to one week's album partition.
pub struct GuessRules<'a> {
    groups: &'a IndexMap<String, AlbumGroup>,
    max_per_album: usize,
}

impl<'a> GuessRules<'a> {
    pub fn new(groups: &'a IndexMap<String, AlbumGroup>) -> Self {
        Self {
            groups,
            max_per_album: max_duplicate_count(groups),
        }
    }

    /// Maximum number of picks allowed on a single album this week.
    pub fn max_per_album(&self) -> usize {
        self.max_per_album
    }

    /// Validate adding `proposed` to `guesser`'s current picks.
    pub fn check_add(
        &self,
        guesses: &[Guess],
        guesser: &str,
        finalized: bool,
        proposed: &Selection,
    ) -> Result<(), GuessRejection> {
        if finalized {
            return Err(GuessRejection::GuessesFinalized);
        }
        self.ensure_known(&proposed.album_key)?;

        let mut picks = selections_of(guesses, guesser);
        insert(
            &mut picks,
            &proposed.album_key,
            &proposed.guessed_submitter,
        );
        self.check_caps(&picks)
    }

    /// Removing a pick can only be refused by the finalized lock.
    pub fn check_remove(&self, finalized: bool) -> Result<(), GuessRejection> {
        if finalized {
            Err(GuessRejection::GuessesFinalized)
        } else {
            Ok(())
        }
    }

    /// Validate a complete replacement set submitted for finalization.
    pub fn check_finalize(&self, selections: &[Selection]) -> Result<(), GuessRejection> {
        let mut picks = SelectionMap::new();
        for selection in selections {
            self.ensure_known(&selection.album_key)?;
            insert(
                &mut picks,
                &selection.album_key,
                &selection.guessed_submitter,
            );
        }

        let missing = self
            .groups
            .keys()
            .filter(|key| picks.get(key.as_str()).is_none_or(|p| p.is_empty()))
            .cloned()
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(GuessRejection::IncompleteAlbums { missing });
        }

        self.check_caps(&picks)
    }

    fn ensure_known(&self, album_key: &str) -> Result<(), GuessRejection> {
        if self.groups.contains_key(album_key) {
            Ok(())
        } else {
            Err(GuessRejection::UnknownAlbum {
                album_key: album_key.to_string(),
            })
        }
    }

    fn check_caps(&self, picks: &SelectionMap<'_>) -> Result<(), GuessRejection> {
        if let Some((album_key, _)) = picks
            .iter()
            .find(|(_, people)| people.len() > self.max_per_album)
        {
            return Err(GuessRejection::DuplicateCapExceeded {
                album_key: album_key.to_string(),
                max: self.max_per_album,
            });
        }

        let multi = picks.values().filter(|people| people.len() > 1).count();
        if multi > 1 {
            return Err(GuessRejection::MultiAlbumConflict);
        }

        let mut per_person: IndexMap<&str, usize> = IndexMap::new();
        for person in picks.values().flatten() {
            *per_person.entry(*person).or_default() += 1;
        }
        if let Some((person, count)) = per_person
            .into_iter()
            .find(|(_, count)| *count > MAX_SELECTIONS_PER_PERSON)
        {
            return Err(GuessRejection::PersonCapExceeded {
                person: person.to_string(),
                count,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        album::{group_submissions, tests::submission},
        week::WeekKey,
    };

    fn week() -> WeekKey {
        "05/01/2024".parse().unwrap()
    }

    fn duplicate_week() -> IndexMap<String, AlbumGroup> {
        group_submissions(&[
            submission(1, "Alice", "X", "A1"),
            submission(2, "Bob", "X", "A1"),
            submission(3, "Carol", "Y", "A2"),
            submission(4, "Dave", "Z", "A3"),
        ])
    }

    fn plain_week() -> IndexMap<String, AlbumGroup> {
        group_submissions(&[
            submission(1, "Alice", "X", "A1"),
            submission(2, "Bob", "Y", "A2"),
            submission(3, "Carol", "Z", "A3"),
        ])
    }

    fn rows(guesser: &str, picks: &[(&str, &str)]) -> Vec<Guess> {
        picks
            .iter()
            .map(|(album, person)| Guess::new(*album, guesser, *person, week()))
            .collect()
    }

    #[test]
    fn single_pick_per_album_without_duplicates() {
        let groups = plain_week();
        let rules = GuessRules::new(&groups);
        assert_eq!(rules.max_per_album(), 1);

        let current = rows("Erin", &[("x-a1", "Alice")]);
        let err = rules
            .check_add(&current, "Erin", false, &Selection::new("x-a1", "Bob"))
            .unwrap_err();
        assert_eq!(
            err,
            GuessRejection::DuplicateCapExceeded {
                album_key: "x-a1".into(),
                max: 1
            }
        );
    }

    #[test]
    fn duplicate_album_allows_multiple_picks_once() {
        let groups = duplicate_week();
        let rules = GuessRules::new(&groups);
        assert_eq!(rules.max_per_album(), 2);

        let current = rows("Erin", &[("x-a1", "Alice")]);
        rules
            .check_add(&current, "Erin", false, &Selection::new("x-a1", "Bob"))
            .unwrap();

        let current = rows("Erin", &[("x-a1", "Alice"), ("x-a1", "Bob")]);
        let err = rules
            .check_add(&current, "Erin", false, &Selection::new("x-a1", "Carol"))
            .unwrap_err();
        assert!(matches!(err, GuessRejection::DuplicateCapExceeded { .. }));
    }

    #[test]
    fn second_multi_pick_album_is_refused() {
        let groups = duplicate_week();
        let rules = GuessRules::new(&groups);

        let current = rows(
            "Erin",
            &[("x-a1", "Alice"), ("x-a1", "Bob"), ("y-a2", "Carol")],
        );
        let err = rules
            .check_add(&current, "Erin", false, &Selection::new("y-a2", "Dave"))
            .unwrap_err();
        assert_eq!(err, GuessRejection::MultiAlbumConflict);
    }

    #[test]
    fn person_may_be_picked_at_most_twice() {
        let groups = duplicate_week();
        let rules = GuessRules::new(&groups);

        let current = rows(
            "Erin",
            &[("x-a1", "Alice"), ("y-a2", "Alice"), ("x-a1", "Bob")],
        );
        let err = rules
            .check_add(&current, "Erin", false, &Selection::new("z-a3", "Alice"))
            .unwrap_err();
        assert_eq!(
            err,
            GuessRejection::PersonCapExceeded {
                person: "Alice".into(),
                count: 3
            }
        );
    }

    #[test]
    fn other_guessers_rows_are_ignored() {
        let groups = plain_week();
        let rules = GuessRules::new(&groups);

        let current = rows("Frank", &[("x-a1", "Alice")]);
        rules
            .check_add(&current, "Erin", false, &Selection::new("x-a1", "Bob"))
            .unwrap();
    }

    #[test]
    fn finalized_guesser_cannot_mutate() {
        let groups = plain_week();
        let rules = GuessRules::new(&groups);
        assert_eq!(
            rules.check_add(&[], "Erin", true, &Selection::new("x-a1", "Alice")),
            Err(GuessRejection::GuessesFinalized)
        );
        assert_eq!(
            rules.check_remove(true),
            Err(GuessRejection::GuessesFinalized)
        );
        assert_eq!(rules.check_remove(false), Ok(()));
    }

    #[test]
    fn unknown_album_is_refused() {
        let groups = plain_week();
        let rules = GuessRules::new(&groups);
        assert_eq!(
            rules.check_add(&[], "Erin", false, &Selection::new("nope", "Alice")),
            Err(GuessRejection::UnknownAlbum {
                album_key: "nope".into()
            })
        );
    }

    #[test]
    fn finalize_requires_every_album() {
        let groups = plain_week();
        let rules = GuessRules::new(&groups);

        let partial = vec![
            Selection::new("x-a1", "Alice"),
            Selection::new("y-a2", "Bob"),
        ];
        assert_eq!(
            rules.check_finalize(&partial),
            Err(GuessRejection::IncompleteAlbums {
                missing: vec!["z-a3".into()]
            })
        );

        let mut complete = partial;
        complete.push(Selection::new("z-a3", "Carol"));
        rules.check_finalize(&complete).unwrap();
    }

    #[test]
    fn finalize_applies_caps_to_the_whole_set() {
        let groups = duplicate_week();
        let rules = GuessRules::new(&groups);

        let selections = vec![
            Selection::new("x-a1", "Alice"),
            Selection::new("x-a1", "Bob"),
            Selection::new("y-a2", "Carol"),
            Selection::new("y-a2", "Dave"),
            Selection::new("z-a3", "Dave"),
        ];
        assert_eq!(
            rules.check_finalize(&selections),
            Err(GuessRejection::MultiAlbumConflict)
        );
    }

    #[test]
    fn repeated_selection_counts_once() {
        let groups = plain_week();
        let rules = GuessRules::new(&groups);
        let selections = vec![
            Selection::new("x-a1", "Alice"),
            Selection::new("x-a1", "Alice"),
            Selection::new("y-a2", "Bob"),
            Selection::new("z-a3", "Carol"),
        ];
        rules.check_finalize(&selections).unwrap();
    }
}
