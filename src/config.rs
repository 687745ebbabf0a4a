//! Application-level configuration loading: listen port, storage locations and admin sessions.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use time::{UtcOffset, macros::format_description};
use tracing::{info, warn};

#[cfg(feature = "gist-store")]
pub use crate::dao::game_store::gist::GistConfig;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "ALBUM_CLUB_CONFIG_PATH";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/album-game-data.json";
const DEFAULT_ADMIN_SESSION_TTL: Duration = Duration::from_secs(8 * 60 * 60);
const DEFAULT_HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(30);
/// Environment variable holding the club's UTC offset, e.g. `+01:00`.
const UTC_OFFSET_ENV: &str = "ALBUM_CLUB_UTC_OFFSET";

/// Remote gist settings, kept as plain data when the gist backend is not compiled in.
#[cfg(not(feature = "gist-store"))]
#[derive(Debug, Clone, Deserialize)]
pub struct GistConfig {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub gist_id: Option<String>,
    pub token: String,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    pub port: u16,
    /// Local JSON copy of the game document.
    pub data_path: PathBuf,
    pub admin_session_ttl: Duration,
    pub health_poll_interval: Duration,
    /// Offset of the club's local time. Weeks roll over and guessing opens on it.
    pub utc_offset: UtcOffset,
    /// Remote document store, when configured.
    pub gist: Option<GistConfig>,
}

impl AppConfig {
    /// Load the configuration file, falling back to built-in defaults, then apply
    /// environment overrides.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded configuration file");
                    raw.into()
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };
        config.with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(port) = env::var("PORT").ok().and_then(|raw| raw.parse().ok()) {
            self.port = port;
        }
        if let Ok(raw) = env::var(UTC_OFFSET_ENV) {
            match parse_utc_offset(&raw) {
                Some(offset) => self.utc_offset = offset,
                None => warn!(value = %raw, "ignoring malformed {UTC_OFFSET_ENV}"),
            }
        }
        if let Some(gist) = gist_from_env() {
            info!(gist_id = ?gist.gist_id, "using gist configuration from environment");
            self.gist = Some(gist);
        }
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            admin_session_ttl: DEFAULT_ADMIN_SESSION_TTL,
            health_poll_interval: DEFAULT_HEALTH_POLL_INTERVAL,
            utc_offset: UtcOffset::UTC,
            gist: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    port: Option<u16>,
    data_path: Option<PathBuf>,
    admin_session_ttl_secs: Option<u64>,
    health_poll_interval_secs: Option<u64>,
    utc_offset: Option<String>,
    gist: Option<GistConfig>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            port: value.port.unwrap_or(defaults.port),
            data_path: value.data_path.unwrap_or(defaults.data_path),
            admin_session_ttl: value
                .admin_session_ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.admin_session_ttl),
            health_poll_interval: value
                .health_poll_interval_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.health_poll_interval),
            utc_offset: value
                .utc_offset
                .and_then(|raw| {
                    let parsed = parse_utc_offset(&raw);
                    if parsed.is_none() {
                        warn!(value = %raw, "ignoring malformed utc_offset");
                    }
                    parsed
                })
                .unwrap_or(defaults.utc_offset),
            gist: value.gist,
        }
    }
}

#[cfg(feature = "gist-store")]
fn gist_from_env() -> Option<GistConfig> {
    GistConfig::from_env().ok()
}

#[cfg(not(feature = "gist-store"))]
fn gist_from_env() -> Option<GistConfig> {
    Some(GistConfig {
        api_base_url: env::var("GIST_API_URL").ok(),
        gist_id: env::var("GIST_ID").ok(),
        token: env::var("GIST_TOKEN").ok()?,
        filename: env::var("GIST_FILENAME").ok(),
    })
}

/// Parse an offset written as `+HH:MM` or `-HH:MM`.
fn parse_utc_offset(raw: &str) -> Option<UtcOffset> {
    UtcOffset::parse(
        raw.trim(),
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .ok()
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
