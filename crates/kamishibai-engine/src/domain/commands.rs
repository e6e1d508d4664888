//! Session commands.

use kamishibai_core::command::{Command, PlayerInput};
use uuid::Uuid;

/// An input addressed to one playback session.
#[derive(Debug, Clone)]
pub struct SessionCommand {
    pub correlation_id: Uuid,
    pub session_id: Uuid,
    pub input: PlayerInput,
}

impl SessionCommand {
    #[must_use]
    pub fn new(session_id: Uuid, input: PlayerInput) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            session_id,
            input,
        }
    }
}

impl Command for SessionCommand {
    fn command_type(&self) -> &'static str {
        self.input.as_str()
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
