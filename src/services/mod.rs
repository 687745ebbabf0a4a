/// Admin sessions, roster management and week maintenance.
pub mod admin_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Guess mutations and the guess sheet.
pub mod guess_service;
/// Health check service.
pub mod health_service;
/// Weekly results, leaderboards and overall stats.
pub mod results_service;
/// Weekly Spotify playlist.
pub mod playlist_service;
/// Background health polling of the document store.
pub mod storage_supervisor;
/// Album submissions and roster listing.
pub mod submission_service;
