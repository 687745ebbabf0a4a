//! Error types shared by the gist storage implementation.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`GistDaoError`] failures.
pub type GistResult<T> = Result<T, GistDaoError>;

/// Failures that can occur while talking to the gist API.
#[derive(Debug, Error)]
pub enum GistDaoError {
    /// Required environment variable is missing.
    #[error("missing gist environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// The store was opened without a gist id.
    #[error("no gist id configured")]
    MissingGistId,
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build gist client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent.
    #[error("failed to send gist request to `{url}`")]
    RequestSend {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The API answered with an unexpected status code.
    #[error("unexpected gist response status {status} for `{url}`")]
    RequestStatus { url: String, status: StatusCode },
    /// Response payload could not be read or parsed.
    #[error("failed to decode gist response for `{url}`")]
    DecodeResponse {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The gist holds no file to read the document from.
    #[error("gist `{gist_id}` has no file `{filename}`")]
    MissingFile { gist_id: String, filename: String },
    /// The file content is not a valid game document.
    #[error("failed to parse game document from gist file `{filename}`")]
    DeserializeDocument {
        filename: String,
        #[source]
        source: serde_json::Error,
    },
    /// The document could not be encoded for upload.
    #[error("failed to encode game document")]
    SerializeDocument {
        #[source]
        source: serde_json::Error,
    },
}
