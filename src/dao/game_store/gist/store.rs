use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode, header};
use tracing::{debug, info};

use crate::dao::{game_store::GameStore, models::GameData, storage::StorageResult};

use super::{
    config::{DEFAULT_FILENAME, GistConfig},
    error::{GistDaoError, GistResult},
    models::{GistCreate, GistCreated, GistResponse, GistUpdate},
};

const DESCRIPTION: &str = "Album Game Data";
const ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Game document stored as one file of a GitHub gist.
#[derive(Clone)]
pub struct GistGameStore {
    client: Client,
    gist_url: Arc<str>,
    gist_id: Arc<str>,
    token: Arc<str>,
    filename: Option<Arc<str>>,
}

impl GistGameStore {
    /// Build the HTTP client for the configured gist.
    pub fn connect(config: GistConfig) -> GistResult<Self> {
        let gist_id = config
            .gist_id()
            .ok_or(GistDaoError::MissingGistId)?
            .to_string();
        let gist_url = Arc::<str>::from(format!(
            "{}/gists/{gist_id}",
            config.api_base_url.trim_end_matches('/'),
        ));

        Ok(Self {
            client: build_client()?,
            gist_url,
            gist_id: Arc::from(gist_id),
            token: Arc::from(config.token),
            filename: config.filename.map(Arc::from),
        })
    }

    /// Create a private gist seeded with `data` and open a store on it.
    ///
    /// The configured gist id, if any, is ignored.
    pub async fn create(config: GistConfig, data: &GameData) -> GistResult<Self> {
        let client = build_client()?;
        let filename = config.filename_or_default().to_string();
        let content = serde_json::to_string_pretty(data)
            .map_err(|source| GistDaoError::SerializeDocument { source })?;

        let url = format!("{}/gists", config.api_base_url.trim_end_matches('/'));
        let response = authorized(&client, Method::POST, &url, &config.token)
            .json(&GistCreate::private(DESCRIPTION, &filename, content))
            .send()
            .await
            .map_err(|source| GistDaoError::RequestSend {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(GistDaoError::RequestStatus {
                url,
                status: response.status(),
            });
        }
        let created = response
            .json::<GistCreated>()
            .await
            .map_err(|source| GistDaoError::DecodeResponse { url, source })?;
        info!(gist = %created.id, file = %filename, "created gist for the game document");

        Self::connect(config.with_gist_id(created.id).with_filename(filename))
    }

    /// Id of the gist behind this store.
    pub fn gist_id(&self) -> &str {
        &self.gist_id
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        authorized(&self.client, method, url, &self.token)
    }

    async fn get_gist(&self) -> GistResult<GistResponse> {
        let url = self.gist_url.to_string();
        let response = self
            .request(Method::GET, &url)
            .send()
            .await
            .map_err(|source| GistDaoError::RequestSend {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(GistDaoError::RequestStatus {
                url,
                status: response.status(),
            });
        }

        response
            .json::<GistResponse>()
            .await
            .map_err(|source| GistDaoError::DecodeResponse { url, source })
    }

    async fn get_raw(&self, url: &str) -> GistResult<String> {
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|source| GistDaoError::RequestSend {
                url: url.to_string(),
                source,
            })?;

        match response.status() {
            status if status.is_success() => {
                response
                    .text()
                    .await
                    .map_err(|source| GistDaoError::DecodeResponse {
                        url: url.to_string(),
                        source,
                    })
            }
            other => Err(GistDaoError::RequestStatus {
                url: url.to_string(),
                status: other,
            }),
        }
    }

    /// File name to read from and write to, given the current gist content.
    fn target_filename(&self, gist: &GistResponse) -> String {
        match (&self.filename, gist.files.keys().next()) {
            (Some(configured), _) => configured.to_string(),
            (None, Some(first)) => first.clone(),
            (None, None) => DEFAULT_FILENAME.to_string(),
        }
    }

    async fn load(&self) -> GistResult<Option<GameData>> {
        let gist = self.get_gist().await?;
        let filename = self.target_filename(&gist);

        let Some(file) = gist.files.get(&filename) else {
            if gist.files.is_empty() {
                return Ok(None);
            }
            return Err(GistDaoError::MissingFile {
                gist_id: self.gist_id.to_string(),
                filename,
            });
        };

        let content = match (&file.raw_url, file.truncated) {
            (Some(raw_url), true) => self.get_raw(raw_url).await?,
            _ => file.content.clone().unwrap_or_default(),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| GistDaoError::DeserializeDocument { filename, source })
    }

    async fn save(&self, data: &GameData) -> GistResult<()> {
        let filename = match &self.filename {
            Some(configured) => configured.to_string(),
            None => self.target_filename(&self.get_gist().await?),
        };
        let content = serde_json::to_string_pretty(data)
            .map_err(|source| GistDaoError::SerializeDocument { source })?;

        let url = self.gist_url.to_string();
        let response = self
            .request(Method::PATCH, &url)
            .json(&GistUpdate::single(&filename, content))
            .send()
            .await
            .map_err(|source| GistDaoError::RequestSend {
                url: url.clone(),
                source,
            })?;

        if response.status().is_success() {
            debug!(gist = %self.gist_id, file = %filename, "game document uploaded");
            Ok(())
        } else {
            Err(GistDaoError::RequestStatus {
                url,
                status: response.status(),
            })
        }
    }
}

fn build_client() -> GistResult<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|source| GistDaoError::ClientBuilder { source })
}

fn authorized(client: &Client, method: Method, url: &str, token: &str) -> reqwest::RequestBuilder {
    client
        .request(method, url)
        .header(header::AUTHORIZATION, format!("token {token}"))
        .header(header::ACCEPT, ACCEPT)
}

impl GameStore for GistGameStore {
    fn fetch(&self) -> BoxFuture<'static, StorageResult<Option<GameData>>> {
        let store = self.clone();
        Box::pin(async move { store.load().await.map_err(Into::into) })
    }

    fn store(&self, data: GameData) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save(&data).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let url = store.gist_url.to_string();
            let response = store
                .request(Method::HEAD, &url)
                .send()
                .await
                .map_err(|source| GistDaoError::RequestSend {
                    url: url.clone(),
                    source,
                })?;

            match response.status() {
                status if status.is_success() => Ok(()),
                StatusCode::NOT_MODIFIED => Ok(()),
                other => Err(GistDaoError::RequestStatus { url, status: other }.into()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Json, Router,
        extract::{Path, State},
        http::{HeaderMap, StatusCode, header::AUTHORIZATION},
        routing::{get, post},
    };
    use serde_json::{Value, json};
    use tokio::{net::TcpListener, sync::Mutex};

    use super::*;

    const GIST_ID: &str = "abc123";
    const TOKEN: &str = "secret";

    #[derive(Clone)]
    struct MockGithub {
        base_url: String,
        document: String,
        truncated: bool,
        patched: Arc<Mutex<Option<Value>>>,
        created: Arc<Mutex<Option<Value>>>,
    }

    fn authorized_header(headers: &HeaderMap) -> bool {
        headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok())
            == Some("token secret")
    }

    async fn show_gist(
        State(mock): State<MockGithub>,
        Path(id): Path<String>,
        headers: HeaderMap,
    ) -> Result<Json<Value>, StatusCode> {
        if id != GIST_ID {
            return Err(StatusCode::NOT_FOUND);
        }
        if !authorized_header(&headers) {
            return Err(StatusCode::UNAUTHORIZED);
        }
        let file = if mock.truncated {
            json!({
                "filename": "album-game-data.json",
                "truncated": true,
                "content": "{\"team",
                "raw_url": format!("{}/raw/album-game-data.json", mock.base_url),
            })
        } else {
            json!({
                "filename": "album-game-data.json",
                "truncated": false,
                "content": mock.document,
            })
        };
        Ok(Json(json!({ "id": id, "files": { "album-game-data.json": file } })))
    }

    async fn raw_file(State(mock): State<MockGithub>) -> String {
        mock.document.clone()
    }

    async fn update_gist(
        State(mock): State<MockGithub>,
        Path(id): Path<String>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> StatusCode {
        if id != GIST_ID || !authorized_header(&headers) {
            return StatusCode::NOT_FOUND;
        }
        *mock.patched.lock().await = Some(body);
        StatusCode::OK
    }

    async fn create_gist(
        State(mock): State<MockGithub>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        if !authorized_header(&headers) {
            return (StatusCode::UNAUTHORIZED, Json(json!({})));
        }
        *mock.created.lock().await = Some(body);
        (StatusCode::CREATED, Json(json!({ "id": GIST_ID })))
    }

    async fn start_mock(document: &GameData, truncated: bool) -> MockGithub {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mock = MockGithub {
            base_url: format!("http://{}", listener.local_addr().unwrap()),
            document: serde_json::to_string(document).unwrap(),
            truncated,
            patched: Arc::default(),
            created: Arc::default(),
        };

        let app = Router::new()
            .route("/gists", post(create_gist))
            .route("/gists/{id}", get(show_gist).patch(update_gist))
            .route("/raw/album-game-data.json", get(raw_file))
            .with_state(mock.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        mock
    }

    fn document(member: &str) -> GameData {
        let mut data = GameData::default();
        data.add_member(member);
        data
    }

    fn store(mock: &MockGithub, gist_id: &str) -> GistGameStore {
        let config = GistConfig::new(TOKEN)
            .with_gist_id(gist_id)
            .with_api_base_url(&mock.base_url);
        GistGameStore::connect(config).unwrap()
    }

    #[tokio::test]
    async fn loads_inline_content() {
        let mock = start_mock(&document("Alice"), false).await;
        let loaded = store(&mock, GIST_ID).load().await.unwrap().unwrap();
        assert_eq!(loaded.team_members, vec!["Alice"]);
    }

    #[tokio::test]
    async fn follows_raw_url_of_truncated_file() {
        let mock = start_mock(&document("Bob"), true).await;
        let loaded = store(&mock, GIST_ID).load().await.unwrap().unwrap();
        assert_eq!(loaded.team_members, vec!["Bob"]);
    }

    #[tokio::test]
    async fn save_patches_the_document_file() {
        let mock = start_mock(&GameData::default(), false).await;
        store(&mock, GIST_ID).save(&document("Carol")).await.unwrap();

        let body = mock.patched.lock().await.clone().unwrap();
        let content = body["files"]["album-game-data.json"]["content"]
            .as_str()
            .unwrap();
        let saved: GameData = serde_json::from_str(content).unwrap();
        assert_eq!(saved.team_members, vec!["Carol"]);
    }

    #[tokio::test]
    async fn health_check_sends_head_to_the_gist() {
        let mock = start_mock(&GameData::default(), false).await;
        assert!(store(&mock, GIST_ID).health_check().await.is_ok());
        assert!(store(&mock, "unknown").health_check().await.is_err());
    }

    #[tokio::test]
    async fn unknown_gist_fails_to_load() {
        let mock = start_mock(&GameData::default(), false).await;
        let err = store(&mock, "unknown").load().await.unwrap_err();
        assert!(matches!(
            err,
            GistDaoError::RequestStatus { status: StatusCode::NOT_FOUND, .. }
        ));
    }

    #[tokio::test]
    async fn create_posts_a_private_gist_and_binds_to_it() {
        let mock = start_mock(&document("Dave"), false).await;
        let config = GistConfig::new(TOKEN).with_api_base_url(&mock.base_url);

        let created = GistGameStore::create(config, &document("Dave")).await.unwrap();
        assert_eq!(created.gist_id(), GIST_ID);

        let body = mock.created.lock().await.clone().unwrap();
        assert_eq!(body["public"], false);
        assert_eq!(body["description"], "Album Game Data");
        assert!(body["files"]["album-game-data.json"]["content"].is_string());

        let loaded = created.load().await.unwrap().unwrap();
        assert_eq!(loaded.team_members, vec!["Dave"]);
    }

    #[test]
    fn connect_requires_a_gist_id() {
        assert!(matches!(
            GistGameStore::connect(GistConfig::new(TOKEN)),
            Err(GistDaoError::MissingGistId)
        ));
    }
}
