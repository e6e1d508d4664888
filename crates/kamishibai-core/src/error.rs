//! Player error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level error type for booting and driving a playback session.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The scene list could not be loaded, parsed, or was empty.
    #[error("scenario unavailable: {0}")]
    ScenarioUnavailable(String),

    /// Required presentation elements are not bound.
    #[error("missing presentation elements: {}", .0.join(", "))]
    MissingElements(Vec<String>),

    /// A playback session was not found.
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    /// Caller input was rejected.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure error (I/O, runtime).
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl PlayerError {
    /// Whether this error stops a session from booting.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ScenarioUnavailable(_) | Self::MissingElements(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_elements_message_lists_every_element() {
        let err = PlayerError::MissingElements(vec![
            "sceneImage".to_owned(),
            "prevButton(or backButton)".to_owned(),
        ]);

        assert_eq!(
            err.to_string(),
            "missing presentation elements: sceneImage, prevButton(or backButton)"
        );
        assert!(err.is_fatal());
    }

    #[test]
    fn test_validation_is_not_fatal() {
        assert!(!PlayerError::Validation("slot out of range".into()).is_fatal());
    }
}
