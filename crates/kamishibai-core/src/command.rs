//! Command abstractions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trait that all commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> Uuid;
}

/// The inputs a playback session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerInput {
    /// The start control was activated.
    Start,
    /// Next page, or next scene when on the last page.
    Advance,
    /// Previous page, or previous scene when on the first page.
    Back,
}

impl PlayerInput {
    /// Maps a keyboard key name to an input.
    ///
    /// `ArrowRight`, `d` and `D` advance; `ArrowLeft`, `a` and `A` go back.
    /// Every other key is ignored.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowRight" | "d" | "D" => Some(Self::Advance),
            "ArrowLeft" | "a" | "A" => Some(Self::Back),
            _ => None,
        }
    }

    /// Stable name used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "player.start",
            Self::Advance => "player.advance",
            Self::Back => "player.back",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_key_maps_navigation_keys() {
        assert_eq!(PlayerInput::from_key("ArrowRight"), Some(PlayerInput::Advance));
        assert_eq!(PlayerInput::from_key("d"), Some(PlayerInput::Advance));
        assert_eq!(PlayerInput::from_key("D"), Some(PlayerInput::Advance));
        assert_eq!(PlayerInput::from_key("ArrowLeft"), Some(PlayerInput::Back));
        assert_eq!(PlayerInput::from_key("a"), Some(PlayerInput::Back));
        assert_eq!(PlayerInput::from_key("A"), Some(PlayerInput::Back));
    }

    #[test]
    fn test_from_key_ignores_other_keys() {
        assert_eq!(PlayerInput::from_key("Enter"), None);
        assert_eq!(PlayerInput::from_key(" "), None);
        assert_eq!(PlayerInput::from_key("ArrowUp"), None);
    }
}
