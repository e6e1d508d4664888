//! Kamishibai — HTTP host.
//!
//! Boots playback sessions on headless stages, routes player input to them
//! and serves scenario pack assets.

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod routes;
pub mod state;

use state::AppState;

/// Builds the full application router.
pub fn app(state: AppState) -> Router {
    let packs = ServeDir::new(&state.config.packs_root);

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/sessions", routes::sessions::router())
        .nest_service("/packs", packs)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
