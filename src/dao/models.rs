use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use time::OffsetDateTime;

use crate::state::week::WeekKey;

/// Admin password applied when the document does not carry one.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

/// The whole shared game document, as persisted by every storage backend.
///
/// Missing keys fall back to their defaults at decode time so the rest of the
/// code never has to deal with absent collections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GameData {
    /// Flat roster of member names (case-insensitive unique).
    pub team_members: Vec<String>,
    /// Album submissions grouped by week.
    pub submissions: IndexMap<WeekKey, Vec<Submission>>,
    /// Guess rows grouped by week.
    pub guesses: IndexMap<WeekKey, Vec<Guess>>,
    /// Guessers who locked their guesses, grouped by week.
    pub finalized_guesses: IndexMap<WeekKey, Vec<String>>,
    /// Password checked by the admin login.
    pub admin_password: String,
    /// Last time the document was written.
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

impl Default for GameData {
    fn default() -> Self {
        Self {
            team_members: Vec::new(),
            submissions: IndexMap::new(),
            guesses: IndexMap::new(),
            finalized_guesses: IndexMap::new(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            last_updated: OffsetDateTime::now_utc(),
        }
    }
}

/// Album submitted by a member for a given week.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Submission {
    /// Millisecond timestamp, unique within the document.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub id: u64,
    pub artist: String,
    pub album: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub submitter: String,
    pub week: WeekKey,
}

/// Single "guesser thinks `guessed_submitter` submitted this album" row.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Guess {
    /// Album identity the guess refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_key: Option<String>,
    /// Older rows referenced a single submission instead of an album.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<u64>,
    pub guesser: String,
    pub guessed_submitter: String,
    pub week: WeekKey,
}

impl Guess {
    /// Build an album-keyed guess row.
    pub fn new(
        album_key: impl Into<String>,
        guesser: impl Into<String>,
        guessed_submitter: impl Into<String>,
        week: WeekKey,
    ) -> Self {
        Self {
            album_key: Some(album_key.into()),
            submission_id: None,
            guesser: guesser.into(),
            guessed_submitter: guessed_submitter.into(),
            week,
        }
    }

    /// Whether this row is exactly the `(album, guesser, guessed)` triple.
    pub fn is_triple(&self, album_key: &str, guesser: &str, guessed_submitter: &str) -> bool {
        self.album_key.as_deref() == Some(album_key)
            && self.guesser == guesser
            && self.guessed_submitter == guessed_submitter
    }
}

impl GameData {
    /// Submissions recorded for `week`.
    pub fn submissions_for(&self, week: &WeekKey) -> &[Submission] {
        self.submissions.get(week).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Guess rows recorded for `week`.
    pub fn guesses_for(&self, week: &WeekKey) -> &[Guess] {
        self.guesses.get(week).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Guessers who finalized `week`.
    pub fn finalized_for(&self, week: &WeekKey) -> &[String] {
        self.finalized_guesses
            .get(week)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_finalized(&self, week: &WeekKey, guesser: &str) -> bool {
        self.finalized_for(week).iter().any(|name| name == guesser)
    }

    /// Lock `guesser` for `week`. Returns `false` when it was already locked.
    pub fn finalize_guesser(&mut self, week: WeekKey, guesser: &str) -> bool {
        let finalized = self.finalized_guesses.entry(week).or_default();
        if finalized.iter().any(|name| name == guesser) {
            return false;
        }
        finalized.push(guesser.to_string());
        true
    }

    /// Clear the finalization record of `week`, returning how many guessers were unlocked.
    pub fn unlock_week(&mut self, week: WeekKey) -> usize {
        let finalized = self.finalized_guesses.entry(week).or_default();
        let count = finalized.len();
        finalized.clear();
        count
    }

    /// Drop every submission of `week`, keeping the week itself listed.
    pub fn clear_week_submissions(&mut self, week: WeekKey) -> usize {
        let submissions = self.submissions.entry(week).or_default();
        let count = submissions.len();
        submissions.clear();
        count
    }

    /// Drop every guess of `week` together with its finalization record.
    pub fn clear_week_guesses(&mut self, week: WeekKey) -> usize {
        let guesses = self.guesses.entry(week).or_default();
        let count = guesses.len();
        guesses.clear();
        self.unlock_week(week);
        count
    }

    /// Append a guess row unless the same triple is already stored.
    pub fn insert_guess(&mut self, guess: Guess) -> bool {
        let rows = self.guesses.entry(guess.week).or_default();
        let Some(album_key) = guess.album_key.as_deref() else {
            return false;
        };
        if rows
            .iter()
            .any(|row| row.is_triple(album_key, &guess.guesser, &guess.guessed_submitter))
        {
            return false;
        }
        rows.push(guess);
        true
    }

    /// Remove the `(album, guesser, guessed)` row of `week`, if present.
    pub fn remove_guess(
        &mut self,
        week: &WeekKey,
        album_key: &str,
        guesser: &str,
        guessed_submitter: &str,
    ) -> bool {
        let Some(rows) = self.guesses.get_mut(week) else {
            return false;
        };
        let before = rows.len();
        rows.retain(|row| !row.is_triple(album_key, guesser, guessed_submitter));
        rows.len() != before
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.resolve_member(name).is_some()
    }

    /// Roster spelling of `name`, matched case-insensitively.
    pub fn resolve_member(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.team_members
            .iter()
            .find(|member| member.to_lowercase() == name)
            .map(String::as_str)
    }

    /// Stored spelling of a person named in `week`.
    ///
    /// Looks at the roster first, then the week's submitters and guessers, so
    /// members removed from the roster keep matching their old rows. Unknown
    /// names come back unchanged.
    pub fn canonical_name(&self, week: &WeekKey, name: &str) -> String {
        if let Some(member) = self.resolve_member(name) {
            return member.to_string();
        }
        let lowered = name.to_lowercase();
        let submitters = self
            .submissions_for(week)
            .iter()
            .map(|submission| submission.submitter.as_str());
        let guessers = self
            .guesses_for(week)
            .iter()
            .map(|guess| guess.guesser.as_str());
        submitters
            .chain(guessers)
            .find(|known| known.to_lowercase() == lowered)
            .unwrap_or(name)
            .to_string()
    }

    /// Add `name` to the roster. Returns `false` when a case-insensitive match exists.
    pub fn add_member(&mut self, name: &str) -> bool {
        if self.has_member(name) {
            return false;
        }
        self.team_members.push(name.to_string());
        true
    }

    /// Remove every roster entry matching `name` case-insensitively.
    pub fn remove_member(&mut self, name: &str) -> bool {
        let name = name.to_lowercase();
        let before = self.team_members.len();
        self.team_members
            .retain(|member| member.to_lowercase() != name);
        self.team_members.len() != before
    }

    /// Time-ordered submission id strictly greater than every stored id.
    pub fn next_submission_id(&self, now_ms: u64) -> u64 {
        let highest = self
            .submissions
            .values()
            .flatten()
            .map(|submission| submission.id)
            .max();
        match highest {
            Some(highest) if highest >= now_ms => highest + 1,
            _ => now_ms,
        }
    }

    /// Weeks that have a submissions entry, most recent first.
    pub fn weeks(&self) -> Vec<WeekKey> {
        let mut weeks = self.submissions.keys().copied().collect::<Vec<_>>();
        weeks.sort_unstable_by(|a, b| b.cmp(a));
        weeks
    }
}

/// Replace `guesser`'s album-keyed rows for `week` with `rows`.
///
/// Rows of other guessers, and legacy submission-keyed rows, are kept as they
/// are in `doc`, which should be the freshest copy available.
pub fn merge_guesses_for_guesser(
    doc: &mut GameData,
    guesser: &str,
    week: WeekKey,
    rows: impl IntoIterator<Item = Guess>,
) {
    let existing = doc.guesses.entry(week).or_default();
    existing.retain(|row| row.guesser != guesser || row.album_key.is_none());
    existing.extend(rows);
}
