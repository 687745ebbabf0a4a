//! Weekly Spotify playlist built from the submitted album links.

use tracing::debug;

use crate::{
    dao::models::Submission,
    dto::playlist::PlaylistResponse,
    error::ServiceError,
    state::{SharedState, week::WeekKey},
};

/// Submissions a week needs before its playlist is offered.
pub const PLAYLIST_THRESHOLD: usize = 6;

const CREATE_URL: &str = "https://open.spotify.com/playlist/create?uri=";
const ALBUM_MARKER: &str = "album/";

/// Album id of a Spotify link, e.g. `https://open.spotify.com/album/4LH4d3cOWNNsVw41Gqt2kv?si=x`.
pub fn spotify_album_id(url: &str) -> Option<&str> {
    if !url.contains("spotify.com") {
        return None;
    }
    url.match_indices(ALBUM_MARKER).find_map(|(at, marker)| {
        let rest = &url[at + marker.len()..];
        let end = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        (end > 0).then(|| &rest[..end])
    })
}

/// Distinct Spotify album ids of `submissions`, in submission order.
pub fn album_ids(submissions: &[Submission]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in submissions
        .iter()
        .filter_map(|submission| submission.url.as_deref())
        .filter_map(spotify_album_id)
    {
        if !ids.iter().any(|known| known == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

/// Link creating a playlist of `ids`, or `None` without any id.
pub fn playlist_url(ids: &[String]) -> Option<String> {
    if ids.is_empty() {
        return None;
    }
    let uris = ids
        .iter()
        .map(|id| format!("spotify:album:{id}"))
        .collect::<Vec<_>>()
        .join(",");
    Some(format!("{CREATE_URL}{uris}"))
}

fn build_playlist(week: WeekKey, submissions: &[Submission]) -> PlaylistResponse {
    let submission_count = submissions.len();
    let available = submission_count >= PLAYLIST_THRESHOLD;
    let album_ids = if available {
        album_ids(submissions)
    } else {
        Vec::new()
    };

    PlaylistResponse {
        week,
        submission_count,
        required: PLAYLIST_THRESHOLD,
        available,
        url: playlist_url(&album_ids),
        album_ids,
    }
}

/// Playlist of `week`, offered once enough albums are in.
pub async fn week_playlist(
    state: &SharedState,
    week: WeekKey,
) -> Result<PlaylistResponse, ServiceError> {
    let doc = state.persistence().load().await?;
    let playlist = build_playlist(week, doc.submissions_for(&week));
    debug!(%week, available = playlist.available, albums = playlist.album_ids.len(), "playlist built");
    Ok(playlist)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week() -> WeekKey {
        "05/01/2024".parse().unwrap()
    }

    fn linked(id: u64, url: &str) -> Submission {
        Submission {
            id,
            artist: format!("Artist {id}"),
            album: format!("Album {id}"),
            url: Some(url.into()),
            submitter: "Alice".into(),
            week: week(),
        }
    }

    #[test]
    fn extracts_album_ids_from_spotify_links() {
        assert_eq!(
            spotify_album_id("https://open.spotify.com/album/4LH4d3cOWNNsVw41Gqt2kv?si=abc"),
            Some("4LH4d3cOWNNsVw41Gqt2kv")
        );
        assert_eq!(
            spotify_album_id("https://open.spotify.com/intl-fr/album/1A2b3C"),
            Some("1A2b3C")
        );
        assert_eq!(spotify_album_id("https://open.spotify.com/track/1A2b3C"), None);
        assert_eq!(spotify_album_id("https://open.spotify.com/album/"), None);
        assert_eq!(spotify_album_id("https://music.apple.com/album/xyz123"), None);
    }

    #[test]
    fn playlist_needs_six_submissions() {
        let five = (1..=5)
            .map(|id| linked(id, &format!("https://open.spotify.com/album/id{id}")))
            .collect::<Vec<_>>();
        let playlist = build_playlist(week(), &five);
        assert!(!playlist.available);
        assert_eq!(playlist.submission_count, 5);
        assert!(playlist.album_ids.is_empty());
        assert_eq!(playlist.url, None);

        let mut six = five;
        six.push(linked(6, "https://open.spotify.com/album/id6"));
        let playlist = build_playlist(week(), &six);
        assert!(playlist.available);
        assert_eq!(playlist.album_ids.len(), 6);
        assert_eq!(
            playlist.url.as_deref(),
            Some(
                "https://open.spotify.com/playlist/create?uri=spotify:album:id1,spotify:album:id2,\
                 spotify:album:id3,spotify:album:id4,spotify:album:id5,spotify:album:id6"
            )
        );
    }

    #[test]
    fn links_outside_spotify_are_skipped() {
        let mut submissions = vec![
            linked(1, "https://open.spotify.com/album/abc"),
            linked(2, "https://example.com/album/zzz"),
            linked(3, "https://open.spotify.com/album/abc?si=1"),
        ];
        submissions.extend((4..=6).map(|id| Submission {
            url: None,
            ..linked(id, "")
        }));

        let playlist = build_playlist(week(), &submissions);
        assert!(playlist.available);
        assert_eq!(playlist.album_ids, vec!["abc"]);
        assert_eq!(
            playlist.url.as_deref(),
            Some("https://open.spotify.com/playlist/create?uri=spotify:album:abc")
        );
    }

    #[test]
    fn no_spotify_links_means_no_url() {
        let submissions = (1..=6)
            .map(|id| linked(id, "https://bandcamp.com/album/x"))
            .collect::<Vec<_>>();
        let playlist = build_playlist(week(), &submissions);
        assert!(playlist.available);
        assert_eq!(playlist.url, None);
    }
}
