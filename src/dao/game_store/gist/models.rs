use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Subset of `GET /gists/{id}` the store relies on.
#[derive(Debug, Deserialize)]
pub struct GistResponse {
    #[serde(default)]
    pub files: IndexMap<String, GistFile>,
}

#[derive(Debug, Deserialize)]
pub struct GistFile {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub truncated: bool,
    #[serde(default)]
    pub raw_url: Option<String>,
}

/// Body of `PATCH /gists/{id}`.
#[derive(Debug, Serialize)]
pub struct GistUpdate<'a> {
    pub files: IndexMap<&'a str, GistFileUpdate>,
}

#[derive(Debug, Serialize)]
pub struct GistFileUpdate {
    pub content: String,
}

impl<'a> GistUpdate<'a> {
    pub fn single(filename: &'a str, content: String) -> Self {
        let mut files = IndexMap::new();
        files.insert(filename, GistFileUpdate { content });
        Self { files }
    }
}

/// Body of `POST /gists`.
#[derive(Debug, Serialize)]
pub struct GistCreate<'a> {
    pub description: &'a str,
    pub public: bool,
    pub files: IndexMap<&'a str, GistFileUpdate>,
}

impl<'a> GistCreate<'a> {
    /// Private gist holding `content` as its only file.
    pub fn private(description: &'a str, filename: &'a str, content: String) -> Self {
        let mut files = IndexMap::new();
        files.insert(filename, GistFileUpdate { content });
        Self {
            description,
            public: false,
            files,
        }
    }
}

/// Subset of the `POST /gists` response.
#[derive(Debug, Deserialize)]
pub struct GistCreated {
    pub id: String,
}
