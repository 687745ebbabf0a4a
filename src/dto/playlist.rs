//! Payload of the weekly playlist route.

use serde::Serialize;
use utoipa::ToSchema;

use crate::state::week::WeekKey;

/// Spotify playlist link gathering the week's albums.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlaylistResponse {
    #[schema(value_type = String, example = "05/01/2024")]
    pub week: WeekKey,
    pub submission_count: usize,
    /// Submissions needed before the playlist is offered.
    pub required: usize,
    pub available: bool,
    /// Spotify album ids, in submission order. Empty until available.
    pub album_ids: Vec<String>,
    /// Link creating the playlist; absent when no submission links to Spotify.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
