//! Command handlers for playback sessions.
//!
//! This module applies session commands to a live session and returns the
//! resulting view.

use kamishibai_core::command::Command;
use kamishibai_core::error::PlayerError;
use tracing::info;

use super::query_handlers::{SessionView, session_view};
use super::session::PlaybackSession;
use crate::domain::commands::SessionCommand;

/// Handles a `SessionCommand`: applies its input to `session` and returns
/// the updated view.
///
/// # Errors
///
/// Returns `PlayerError::Validation` if the command is addressed to a
/// different session.
pub async fn handle_input(
    command: &SessionCommand,
    session: &mut PlaybackSession,
) -> Result<SessionView, PlayerError> {
    if command.session_id != session.id() {
        return Err(PlayerError::Validation(format!(
            "command for session {} applied to session {}",
            command.session_id,
            session.id()
        )));
    }

    session.handle(command.input).await;

    info!(
        correlation_id = %command.correlation_id(),
        session_id = %command.session_id,
        command_type = command.command_type(),
        scene_index = session.scene_index(),
        page_index = session.page_index(),
        "command handled"
    );
    Ok(session_view(session))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use kamishibai_core::audio::AudioBackend;
    use kamishibai_core::command::PlayerInput;
    use kamishibai_core::config::PlayerConfig;
    use kamishibai_core::presentation::Presentation;
    use kamishibai_test_support::{
        FixedClock, RecordingAudio, RecordingPresentation, scenario_from_json,
    };
    use uuid::Uuid;

    use super::*;

    fn session() -> PlaybackSession {
        PlaybackSession::new(
            Uuid::new_v4(),
            Arc::new(scenario_from_json(r#"[{"text":"one"},{"text":"two"}]"#)),
            Arc::new(PlayerConfig::default()),
            Arc::new(RecordingPresentation::new()) as Arc<dyn Presentation>,
            Arc::new(RecordingAudio::new()) as Arc<dyn AudioBackend>,
            Arc::new(FixedClock::epoch()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_input_applies_and_returns_view() {
        // Arrange
        let mut session = session();
        let start = SessionCommand::new(session.id(), PlayerInput::Start);
        let advance = SessionCommand::new(session.id(), PlayerInput::Advance);

        // Act
        handle_input(&start, &mut session).await.unwrap();
        let view = handle_input(&advance, &mut session).await.unwrap();

        // Assert
        assert_eq!(view.scene_index, 1);
        assert_eq!(view.text, "two");
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_input_rejects_foreign_session() {
        // Arrange
        let mut session = session();
        let command = SessionCommand::new(Uuid::new_v4(), PlayerInput::Start);

        // Act
        let result = handle_input(&command, &mut session).await;

        // Assert
        assert!(matches!(result, Err(PlayerError::Validation(_))));
        assert!(!session.is_started());
    }
}
