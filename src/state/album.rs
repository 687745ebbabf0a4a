//! Grouping of raw submissions into albums.

use indexmap::IndexMap;

use crate::dao::models::Submission;

/// Album identity shared by every submission of the same artist and title,
/// compared case-insensitively.
pub fn album_key(artist: &str, album: &str) -> String {
    format!("{}-{}", artist.to_lowercase(), album.to_lowercase())
}

/// Logical album made of one or more submissions sharing an [`album_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumGroup {
    pub key: String,
    /// Artist as typed by the first submitter.
    pub artist: String,
    /// Title as typed by the first submitter.
    pub album: String,
    /// First non-empty link provided for the album.
    pub url: Option<String>,
    pub submissions: Vec<Submission>,
    /// Submitter of every submission in the group, in submission order.
    pub actual_submitters: Vec<String>,
}

impl AlbumGroup {
    fn new(key: String, first: &Submission) -> Self {
        Self {
            key,
            artist: first.artist.clone(),
            album: first.album.clone(),
            url: None,
            submissions: Vec::new(),
            actual_submitters: Vec::new(),
        }
    }

    fn push(&mut self, submission: &Submission) {
        if self.url.is_none() {
            self.url = submission
                .url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string);
        }
        self.actual_submitters.push(submission.submitter.clone());
        self.submissions.push(submission.clone());
    }

    /// Submitters without repetition, in order of first submission.
    pub fn distinct_submitters(&self) -> Vec<&str> {
        let mut distinct: Vec<&str> = Vec::with_capacity(self.actual_submitters.len());
        for name in &self.actual_submitters {
            if !distinct.contains(&name.as_str()) {
                distinct.push(name);
            }
        }
        distinct
    }

    /// Whether more than one member submitted this album.
    pub fn is_duplicate(&self) -> bool {
        self.distinct_submitters().len() > 1
    }
}

/// Partition `submissions` into album groups, keyed by album identity in
/// order of first appearance.
pub fn group_submissions(submissions: &[Submission]) -> IndexMap<String, AlbumGroup> {
    let mut groups: IndexMap<String, AlbumGroup> = IndexMap::new();
    for submission in submissions {
        let key = album_key(&submission.artist, &submission.album);
        groups
            .entry(key.clone())
            .or_insert_with(|| AlbumGroup::new(key, submission))
            .push(submission);
    }
    groups
}

/// Largest number of distinct submitters sharing one album, never below 1.
pub fn max_duplicate_count(groups: &IndexMap<String, AlbumGroup>) -> usize {
    groups
        .values()
        .map(|group| group.distinct_submitters().len())
        .max()
        .unwrap_or(1)
        .max(1)
}

/// Album key of the submission with `id`, used to resolve legacy guess rows.
pub fn album_key_for_submission(submissions: &[Submission], id: u64) -> Option<String> {
    submissions
        .iter()
        .find(|submission| submission.id == id)
        .map(|submission| album_key(&submission.artist, &submission.album))
}
