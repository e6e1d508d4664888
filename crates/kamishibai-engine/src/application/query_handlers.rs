//! Query handlers for playback sessions.
//!
//! This module builds read-only view DTOs from a live session.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::session::PlaybackSession;
use crate::domain::flags::FlagStore;

/// Read-only view of a playback session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    /// The session identifier.
    pub session_id: Uuid,
    /// Scenario pack name.
    pub scenario: String,
    /// Hash of the scene list the session plays.
    pub version_hash: String,
    /// Number of scenes in the scenario.
    pub scene_count: usize,
    /// Index of the current scene.
    pub scene_index: usize,
    /// `id` of the current scene, if it has one.
    pub scene_id: Option<String>,
    /// Zero-based page within the current scene.
    pub page_index: usize,
    pub page_count: usize,
    /// Text of the page on screen.
    pub text: String,
    pub name: String,
    /// Resolved source of the image on screen.
    pub image: String,
    pub flags: FlagStore,
    pub started: bool,
    pub ended: bool,
    pub pending_cues: usize,
    pub created_at: DateTime<Utc>,
    pub last_rendered_at: Option<DateTime<Utc>>,
}

/// Builds the view of `session`.
#[must_use]
pub fn session_view(session: &PlaybackSession) -> SessionView {
    let scene = session.current_scene();
    SessionView {
        session_id: session.id(),
        scenario: session.scenario().name.clone(),
        version_hash: session.scenario().version_hash.clone(),
        scene_count: session.scenario().len(),
        scene_index: session.scene_index(),
        scene_id: scene.and_then(|s| s.id.clone()),
        page_index: session.page_index(),
        page_count: session.pages().len(),
        text: session.current_page().to_owned(),
        name: scene.and_then(|s| s.name.clone()).unwrap_or_default(),
        image: session.current_image().to_owned(),
        flags: session.flags().clone(),
        started: session.is_started(),
        ended: session.is_ended(),
        pending_cues: session.pending_cues(),
        created_at: session.created_at(),
        last_rendered_at: session.last_rendered_at(),
    }
}
