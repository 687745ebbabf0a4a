//! Guess mutations for one member and week.
//!
//! Every mutation loads the freshest document, checks it against
//! [`GuessRules`], and writes the whole document back.

use rand::{rng, seq::SliceRandom};
use tracing::{debug, info, warn};

use crate::{
    dao::models::{GameData, Guess, merge_guesses_for_guesser},
    dto::guess::{GuessChangeResponse, GuessSheetResponse, SheetAlbum},
    error::ServiceError,
    state::{
        OPENING_HOUR, SharedState,
        album::group_submissions,
        guess_rules::{GuessRejection, GuessRules, MAX_SELECTIONS_PER_PERSON, Selection},
        session::Session,
        week::WeekKey,
    },
};

pub(crate) fn normalize_name(name: &str) -> Result<String, ServiceError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidInput("name must not be blank".into()));
    }
    Ok(trimmed.to_string())
}

/// Refuse `action` before the club's opening hour.
pub(crate) fn ensure_open(state: &SharedState, action: &str) -> Result<(), ServiceError> {
    if state.is_open() {
        return Ok(());
    }
    Err(ServiceError::InvalidState(format!(
        "{action} opens at {OPENING_HOUR}:00"
    )))
}

/// Stored spelling of the pick's person, so case variants share one cap.
fn canonical_selection(doc: &GameData, week: &WeekKey, selection: Selection) -> Selection {
    let guessed = doc.canonical_name(week, &selection.guessed_submitter);
    Selection::new(selection.album_key, guessed)
}

/// Add `selection` to the session member's picks.
///
/// Adding a pick that is already stored changes nothing and skips the write.
pub async fn add_guess(
    state: &SharedState,
    session: &Session,
    selection: Selection,
) -> Result<GuessChangeResponse, ServiceError> {
    ensure_open(state, "guessing")?;
    let guesser = normalize_name(&session.member)?;
    let week = session.week;
    let mut doc = state.persistence().load().await?;
    let guesser = doc.canonical_name(&week, &guesser);
    let selection = canonical_selection(&doc, &week, selection);

    let groups = group_submissions(doc.submissions_for(&week));
    let rules = GuessRules::new(&groups);
    let finalized = doc.is_finalized(&week, &guesser);
    if finalized {
        return Err(GuessRejection::GuessesFinalized.into());
    }

    let already_stored = doc.guesses_for(&week).iter().any(|row| {
        row.is_triple(&selection.album_key, &guesser, &selection.guessed_submitter)
    });
    if already_stored {
        return Ok(GuessChangeResponse::unchanged());
    }

    rules.check_add(doc.guesses_for(&week), &guesser, finalized, &selection)?;

    doc.insert_guess(Guess::new(
        selection.album_key.clone(),
        guesser.clone(),
        selection.guessed_submitter.clone(),
        week,
    ));
    let outcome = state.persistence().save(doc).await;
    debug!(
        %week,
        %guesser,
        album = %selection.album_key,
        guessed = %selection.guessed_submitter,
        success = outcome.success,
        "guess added"
    );
    Ok(GuessChangeResponse::saved(outcome))
}

/// Remove one pick of the session member. Removing an absent pick is a no-op.
pub async fn remove_guess(
    state: &SharedState,
    session: &Session,
    selection: Selection,
) -> Result<GuessChangeResponse, ServiceError> {
    ensure_open(state, "guessing")?;
    let guesser = normalize_name(&session.member)?;
    let week = session.week;
    let mut doc = state.persistence().load().await?;
    let guesser = doc.canonical_name(&week, &guesser);
    let selection = canonical_selection(&doc, &week, selection);

    let groups = group_submissions(doc.submissions_for(&week));
    GuessRules::new(&groups).check_remove(doc.is_finalized(&week, &guesser))?;

    if !doc.remove_guess(
        &week,
        &selection.album_key,
        &guesser,
        &selection.guessed_submitter,
    ) {
        return Ok(GuessChangeResponse::unchanged());
    }

    let outcome = state.persistence().save(doc).await;
    debug!(
        %week,
        %guesser,
        album = %selection.album_key,
        guessed = %selection.guessed_submitter,
        success = outcome.success,
        "guess removed"
    );
    Ok(GuessChangeResponse::saved(outcome))
}

fn dedup(selections: Vec<Selection>) -> Vec<Selection> {
    let mut unique: Vec<Selection> = Vec::with_capacity(selections.len());
    for selection in selections {
        if !unique.contains(&selection) {
            unique.push(selection);
        }
    }
    unique
}

/// Replace the session member's picks with `selections` and lock them.
///
/// The replacement is merged into a freshly loaded document so concurrent
/// writes to other members' rows survive. Locking is a second write; if
/// either write does not reach the shared store the call fails with
/// [`ServiceError::SaveFailed`].
pub async fn finalize_guesses(
    state: &SharedState,
    session: &Session,
    selections: Vec<Selection>,
) -> Result<GuessChangeResponse, ServiceError> {
    ensure_open(state, "guessing")?;
    let guesser = normalize_name(&session.member)?;
    let week = session.week;
    let persistence = state.persistence();

    let mut doc = persistence.load().await?;
    let guesser = doc.canonical_name(&week, &guesser);
    if doc.is_finalized(&week, &guesser) {
        return Ok(GuessChangeResponse::unchanged());
    }

    let groups = group_submissions(doc.submissions_for(&week));
    if groups.is_empty() {
        return Err(ServiceError::InvalidState(format!(
            "week {week} has no albums to guess"
        )));
    }
    let selections = dedup(
        selections
            .into_iter()
            .map(|selection| canonical_selection(&doc, &week, selection))
            .collect(),
    );
    GuessRules::new(&groups).check_finalize(&selections)?;

    let rows = selections
        .into_iter()
        .map(|selection| {
            Guess::new(
                selection.album_key,
                guesser.clone(),
                selection.guessed_submitter,
                week,
            )
        })
        .collect::<Vec<_>>();
    merge_guesses_for_guesser(&mut doc, &guesser, week, rows);

    let outcome = persistence.save(doc).await;
    if !outcome.success {
        warn!(%week, %guesser, error = ?outcome.error, "failed to save finalized guesses");
        return Err(ServiceError::SaveFailed(
            outcome.error.unwrap_or_else(|| "guesses were not saved".into()),
        ));
    }

    let mut doc = persistence.load().await?;
    doc.finalize_guesser(week, &guesser);
    let outcome = persistence.save(doc).await;
    if !outcome.success {
        warn!(%week, %guesser, error = ?outcome.error, "failed to lock guesses");
        return Err(ServiceError::SaveFailed(
            outcome.error.unwrap_or_else(|| "guesses were not locked".into()),
        ));
    }

    info!(%week, %guesser, "guesses finalized");
    Ok(GuessChangeResponse::saved(outcome))
}

/// Whether the session member locked their picks.
pub async fn is_finalized(state: &SharedState, session: &Session) -> Result<bool, ServiceError> {
    let guesser = normalize_name(&session.member)?;
    let doc = state.persistence().load().await?;
    let guesser = doc.canonical_name(&session.week, &guesser);
    Ok(doc.is_finalized(&session.week, &guesser))
}

/// Build the guess form of the session member.
pub async fn guess_sheet(
    state: &SharedState,
    session: &Session,
) -> Result<GuessSheetResponse, ServiceError> {
    ensure_open(state, "guessing")?;
    let guesser = normalize_name(&session.member)?;
    let doc = state.persistence().load().await?;
    let guesser = doc.canonical_name(&session.week, &guesser);
    Ok(build_sheet(&doc, session, guesser))
}

fn build_sheet(doc: &GameData, session: &Session, guesser: String) -> GuessSheetResponse {
    let week = session.week;
    let submissions = doc.submissions_for(&week);
    let groups = group_submissions(submissions);
    let rules = GuessRules::new(&groups);

    let mut candidates: Vec<String> = Vec::new();
    for submission in submissions {
        if !candidates.contains(&submission.submitter) {
            candidates.push(submission.submitter.clone());
        }
    }

    let mine = doc
        .guesses_for(&week)
        .iter()
        .filter(|row| row.guesser == guesser)
        .collect::<Vec<_>>();

    let mut albums = groups
        .values()
        .map(|group| {
            let mut selections: Vec<String> = Vec::new();
            for row in &mine {
                if row.album_key.as_deref() == Some(group.key.as_str())
                    && !selections.contains(&row.guessed_submitter)
                {
                    selections.push(row.guessed_submitter.clone());
                }
            }
            SheetAlbum {
                album_key: group.key.clone(),
                artist: group.artist.clone(),
                album: group.album.clone(),
                url: group.url.clone(),
                selections,
            }
        })
        .collect::<Vec<_>>();
    albums.shuffle(&mut rng());

    GuessSheetResponse {
        week,
        has_submitted: candidates.contains(&guesser),
        finalized: doc.is_finalized(&week, &guesser),
        guesser,
        albums,
        candidates,
        max_duplicate_count: rules.max_per_album(),
        has_duplicates: groups.values().any(|group| group.is_duplicate()),
        max_selections_per_person: MAX_SELECTIONS_PER_PERSON,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::album::tests::submission;

    #[test]
    fn sheet_hides_submitters_and_reports_caps() {
        let week: WeekKey = "05/01/2024".parse().unwrap();
        let mut doc = GameData::default();
        doc.submissions.insert(
            week,
            vec![
                submission(1, "Alice", "X", "A1"),
                submission(2, "Bob", "x", "a1"),
                submission(3, "Carol", "Y", "A2"),
            ],
        );
        doc.insert_guess(Guess::new("x-a1", "Alice", "Bob", week));

        let sheet = build_sheet(&doc, &Session::new("Alice", week), "Alice".into());
        assert_eq!(sheet.albums.len(), 2);
        assert_eq!(sheet.candidates, vec!["Alice", "Bob", "Carol"]);
        assert_eq!(sheet.max_duplicate_count, 2);
        assert!(sheet.has_duplicates);
        assert!(sheet.has_submitted);
        assert!(!sheet.finalized);

        let duplicate = sheet
            .albums
            .iter()
            .find(|album| album.album_key == "x-a1")
            .unwrap();
        assert_eq!(duplicate.selections, vec!["Bob"]);
    }

    #[test]
    fn outsider_has_not_submitted() {
        let week: WeekKey = "05/01/2024".parse().unwrap();
        let mut doc = GameData::default();
        doc.submissions
            .insert(week, vec![submission(1, "Alice", "X", "A1")]);
        let sheet = build_sheet(&doc, &Session::new("Dave", week), "Dave".into());
        assert!(!sheet.has_submitted);
        assert_eq!(sheet.max_duplicate_count, 1);
        assert!(!sheet.has_duplicates);
    }

    #[test]
    fn blank_names_are_refused() {
        assert!(matches!(
            normalize_name("  "),
            Err(ServiceError::InvalidInput(_))
        ));
        assert_eq!(normalize_name(" Dave ").unwrap(), "Dave");
    }
}
