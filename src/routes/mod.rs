use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{services::documentation::ApiDoc, state::SharedState};

pub mod admin;
pub mod guesses;
pub mod health;
pub mod playlist;
pub mod results;
pub mod submissions;

/// Compose all route trees with the Swagger UI and bind the shared state.
pub fn router(state: SharedState) -> Router<()> {
    let swagger: Router<SharedState> = SwaggerUi::new("/docs")
        .url("/api-doc/openapi.json", ApiDoc::openapi())
        .into();

    health::router()
        .merge(submissions::router())
        .merge(playlist::router())
        .merge(guesses::router())
        .merge(results::router())
        .merge(admin::router(state.clone()))
        .merge(swagger)
        .with_state(state)
}
