//! Audio backend abstraction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The four playback channels a scene can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Background music.
    Bgm,
    /// Ambient loop ("room sound").
    Rse,
    /// One-shot sound effects.
    Se,
    /// Character voice.
    Voice,
}

impl Channel {
    /// All channels in a stable order.
    pub const ALL: [Channel; 4] = [Channel::Bgm, Channel::Rse, Channel::Se, Channel::Voice];

    /// Element identifier the channel is bound to.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bgm => "bgm",
            Self::Rse => "rse",
            Self::Se => "se",
            Self::Voice => "voice",
        }
    }
}

/// Failures reported by an audio backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// No playback element is bound for the channel.
    #[error("channel {0} is not bound")]
    Unbound(&'static str),

    /// The platform refused to start playback (autoplay policy).
    #[error("playback blocked: {0}")]
    Blocked(String),

    /// The source could not be loaded.
    #[error("asset unavailable: {0}")]
    AssetUnavailable(String),

    /// The backend cannot clone the channel's element.
    #[error("detached playback unsupported on {0}")]
    CloneUnsupported(&'static str),
}

/// A set of playback elements, one per [`Channel`].
///
/// Mirrors what a media element offers: a source, a volume, a playhead that
/// can be paused and rewound, and detached clones for overlapping one-shots.
pub trait AudioBackend: Send + Sync {
    /// Sets the channel's source.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::Unbound` if the channel has no element.
    fn set_source(&self, channel: Channel, src: &str) -> Result<(), PlaybackError>;

    /// Current volume of the channel element.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::Unbound` if the channel has no element.
    fn volume(&self, channel: Channel) -> Result<f32, PlaybackError>;

    /// Sets the channel element's volume.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::Unbound` if the channel has no element.
    fn set_volume(&self, channel: Channel, volume: f32) -> Result<(), PlaybackError>;

    /// Starts playback from the current position.
    ///
    /// # Errors
    ///
    /// Returns an error if playback could not start.
    fn play(&self, channel: Channel) -> Result<(), PlaybackError>;

    /// Pauses playback.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::Unbound` if the channel has no element.
    fn pause(&self, channel: Channel) -> Result<(), PlaybackError>;

    /// Moves the playhead back to the start.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::Unbound` if the channel has no element.
    fn rewind(&self, channel: Channel) -> Result<(), PlaybackError>;

    /// Plays `src` on an independent clone of the channel's element. The
    /// clone releases its source once playback ends.
    ///
    /// # Errors
    ///
    /// Returns an error if the clone could not be created or started.
    fn play_detached(&self, channel: Channel, src: &str, volume: f32)
    -> Result<(), PlaybackError>;
}
