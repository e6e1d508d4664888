//! Routes for playback sessions.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use kamishibai_core::audio::AudioBackend;
use kamishibai_core::command::{Command, PlayerInput};
use kamishibai_core::config::BootOptions;
use kamishibai_core::presentation::Presentation;
use kamishibai_engine::application::boot::{Surfaces, boot};
use kamishibai_engine::application::command_handlers;
use kamishibai_engine::application::query_handlers::{SessionView, session_view};
use kamishibai_engine::application::stage::{HeadlessStage, StageSnapshot};
use kamishibai_engine::domain::commands::SessionCommand;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::{AppState, SessionEntry};

/// Request body for POST /{id}/input.
#[derive(Debug, Deserialize)]
pub struct KeyInputRequest {
    /// Keyboard key name, e.g. `ArrowRight`.
    pub key: String,
}

/// A session view together with what its stage currently shows.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub session: SessionView,
    pub stage: StageSnapshot,
}

/// Response body for GET /{id}/save-keys/{slot}.
#[derive(Debug, Serialize)]
pub struct SaveKeyResponse {
    pub slot: u32,
    pub key: String,
}

async fn respond(entry: &SessionEntry) -> SessionResponse {
    let session = entry.session.lock().await;
    SessionResponse {
        session: session_view(&session),
        stage: entry.stage.snapshot(),
    }
}

async fn dispatch(
    state: &AppState,
    session_id: Uuid,
    input: PlayerInput,
) -> Result<Json<SessionResponse>, ApiError> {
    let entry = state.session(session_id).await?;
    let command = SessionCommand::new(session_id, input);

    info!(
        correlation_id = %command.correlation_id,
        command_type = command.command_type(),
        "handling session command"
    );

    let mut session = entry.session.lock().await;
    let view = command_handlers::handle_input(&command, &mut session).await?;

    Ok(Json(SessionResponse {
        session: view,
        stage: entry.stage.snapshot(),
    }))
}

/// POST /
#[instrument(skip(state, options), fields(scenario = ?options.scenario))]
async fn create_session(
    State(state): State<AppState>,
    Json(options): Json<BootOptions>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    options.validate_remote()?;

    let stage = Arc::new(HeadlessStage::new());
    let surfaces = Surfaces {
        presentation: Arc::clone(&stage) as Arc<dyn Presentation>,
        audio: Arc::clone(&stage) as Arc<dyn AudioBackend>,
    };

    let session = boot(
        &state.config,
        &options,
        state.source.as_ref(),
        surfaces,
        Arc::clone(&state.clock),
    )
    .await?;

    let entry = state.insert(SessionEntry::new(session, stage)).await;
    let response = respond(&entry).await;
    info!(session_id = %response.session.session_id, "session created");

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /{id}
#[instrument(skip(state))]
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let entry = state.session(session_id).await?;
    Ok(Json(respond(&entry).await))
}

/// POST /{id}/start
#[instrument(skip(state))]
async fn start(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    dispatch(&state, session_id, PlayerInput::Start).await
}

/// POST /{id}/advance
#[instrument(skip(state))]
async fn advance(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    dispatch(&state, session_id, PlayerInput::Advance).await
}

/// POST /{id}/back
#[instrument(skip(state))]
async fn back(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    dispatch(&state, session_id, PlayerInput::Back).await
}

/// POST /{id}/input
#[instrument(skip(state, request), fields(key = %request.key))]
async fn key_input(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<KeyInputRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    if let Some(input) = PlayerInput::from_key(&request.key) {
        return dispatch(&state, session_id, input).await;
    }
    debug!("key ignored");
    let entry = state.session(session_id).await?;
    Ok(Json(respond(&entry).await))
}

/// GET /{id}/save-keys/{slot}
#[instrument(skip(state))]
async fn save_key(
    State(state): State<AppState>,
    Path((session_id, slot)): Path<(Uuid, u32)>,
) -> Result<Json<SaveKeyResponse>, ApiError> {
    let entry = state.session(session_id).await?;
    let key = entry.session.lock().await.save_key(slot)?;
    Ok(Json(SaveKeyResponse { slot, key }))
}

/// DELETE /{id}
#[instrument(skip(state))]
async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.remove(session_id).await?;
    info!("session deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for playback sessions.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session))
        .route("/{id}", get(get_session).delete(delete_session))
        .route("/{id}/start", post(start))
        .route("/{id}/advance", post(advance))
        .route("/{id}/back", post(back))
        .route("/{id}/input", post(key_input))
        .route("/{id}/save-keys/{slot}", get(save_key))
}
