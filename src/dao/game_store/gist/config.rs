use serde::Deserialize;

use super::error::{GistDaoError, GistResult};

/// Public GitHub REST endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
/// File written when the gist does not name one yet.
pub const DEFAULT_FILENAME: &str = "album-game-data.json";

/// Runtime configuration describing which gist holds the game document.
#[derive(Debug, Clone, Deserialize)]
pub struct GistConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Gist holding the document; a new private gist is created when unset.
    #[serde(default)]
    pub gist_id: Option<String>,
    pub token: String,
    /// File inside the gist; the first file is used when unset.
    #[serde(default)]
    pub filename: Option<String>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl GistConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            api_base_url: default_api_base_url(),
            gist_id: None,
            token: token.into(),
            filename: None,
        }
    }

    pub fn with_gist_id(mut self, gist_id: impl Into<String>) -> Self {
        self.gist_id = Some(gist_id.into());
        self
    }

    /// Point the store at another API host (GitHub Enterprise, test servers).
    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Build a configuration by reading the expected environment variables.
    ///
    /// Only `GIST_TOKEN` is required.
    pub fn from_env() -> GistResult<Self> {
        let token = std::env::var("GIST_TOKEN")
            .map_err(|_| GistDaoError::MissingEnvVar { var: "GIST_TOKEN" })?;

        let mut config = Self::new(token);
        if let Ok(gist_id) = std::env::var("GIST_ID") {
            config = config.with_gist_id(gist_id);
        }
        if let Ok(api_base_url) = std::env::var("GIST_API_URL") {
            config = config.with_api_base_url(api_base_url);
        }
        if let Ok(filename) = std::env::var("GIST_FILENAME") {
            config = config.with_filename(filename);
        }
        Ok(config)
    }

    /// Configured gist id, ignoring blank values.
    pub fn gist_id(&self) -> Option<&str> {
        self.gist_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn has_token(&self) -> bool {
        !self.token.trim().is_empty()
    }

    /// File the document is written to when the gist is created.
    pub fn filename_or_default(&self) -> &str {
        self.filename.as_deref().unwrap_or(DEFAULT_FILENAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_gist_id_counts_as_missing() {
        let config = GistConfig::new("secret").with_gist_id("  ");
        assert_eq!(config.gist_id(), None);
        assert!(config.has_token());
        assert_eq!(config.filename_or_default(), DEFAULT_FILENAME);
    }

    #[test]
    fn reads_optional_fields() {
        let config: GistConfig =
            serde_json::from_str(r#"{"token": "secret", "filename": "club.json"}"#).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.gist_id(), None);
        assert_eq!(config.filename_or_default(), "club.json");
    }
}
