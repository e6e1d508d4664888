//! Test audio backend — records every call and can be told to fail.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use kamishibai_core::audio::{AudioBackend, Channel, PlaybackError};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioOp {
    SetSource(Channel, String),
    SetVolume(Channel, f32),
    Play(Channel),
    Pause(Channel),
    Rewind(Channel),
    Detached(Channel, String, f32),
}

/// An audio backend that records all calls in order.
///
/// By default every call succeeds and every channel starts at volume 1.0.
/// Channels can be made to refuse playback, and detached clones can be
/// switched off, to exercise the engine's fallbacks.
#[derive(Debug)]
pub struct RecordingAudio {
    ops: Mutex<Vec<AudioOp>>,
    volumes: Mutex<HashMap<Channel, f32>>,
    blocked: HashSet<Channel>,
    clone_unsupported: bool,
}

impl Default for RecordingAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingAudio {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ops: Mutex::new(Vec::new()),
            volumes: Mutex::new(Channel::ALL.iter().map(|c| (*c, 1.0)).collect()),
            blocked: HashSet::new(),
            clone_unsupported: false,
        }
    }

    /// `play` on this channel fails as if blocked by an autoplay policy.
    #[must_use]
    pub fn blocking(mut self, channel: Channel) -> Self {
        self.blocked.insert(channel);
        self
    }

    /// `play_detached` fails on every channel.
    #[must_use]
    pub fn without_clones(mut self) -> Self {
        self.clone_unsupported = true;
        self
    }

    /// Returns a snapshot of all recorded calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn ops(&self) -> Vec<AudioOp> {
        self.ops.lock().unwrap().clone()
    }

    /// Recorded calls that touched `channel`, in order.
    pub fn ops_for(&self, channel: Channel) -> Vec<AudioOp> {
        self.ops()
            .into_iter()
            .filter(|op| match op {
                AudioOp::SetSource(c, _)
                | AudioOp::SetVolume(c, _)
                | AudioOp::Play(c)
                | AudioOp::Pause(c)
                | AudioOp::Rewind(c)
                | AudioOp::Detached(c, _, _) => *c == channel,
            })
            .collect()
    }

    /// Sources assigned to `channel`, in order.
    pub fn sources(&self, channel: Channel) -> Vec<String> {
        self.ops_for(channel)
            .into_iter()
            .filter_map(|op| match op {
                AudioOp::SetSource(_, src) => Some(src),
                _ => None,
            })
            .collect()
    }

    /// Detached clone playbacks as `(channel, src, volume)`.
    pub fn detached(&self) -> Vec<(Channel, String, f32)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                AudioOp::Detached(c, src, volume) => Some((c, src, volume)),
                _ => None,
            })
            .collect()
    }

    /// Current volume of `channel`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn current_volume(&self, channel: Channel) -> f32 {
        self.volumes.lock().unwrap().get(&channel).copied().unwrap_or(1.0)
    }

    /// Forgets every call recorded so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear(&self) {
        self.ops.lock().unwrap().clear();
    }

    fn record(&self, op: AudioOp) {
        self.ops.lock().unwrap().push(op);
    }
}

impl AudioBackend for RecordingAudio {
    fn set_source(&self, channel: Channel, src: &str) -> Result<(), PlaybackError> {
        self.record(AudioOp::SetSource(channel, src.to_owned()));
        Ok(())
    }

    fn volume(&self, channel: Channel) -> Result<f32, PlaybackError> {
        Ok(self.current_volume(channel))
    }

    fn set_volume(&self, channel: Channel, volume: f32) -> Result<(), PlaybackError> {
        self.volumes.lock().unwrap().insert(channel, volume);
        self.record(AudioOp::SetVolume(channel, volume));
        Ok(())
    }

    fn play(&self, channel: Channel) -> Result<(), PlaybackError> {
        self.record(AudioOp::Play(channel));
        if self.blocked.contains(&channel) {
            return Err(PlaybackError::Blocked(channel.as_str().to_owned()));
        }
        Ok(())
    }

    fn pause(&self, channel: Channel) -> Result<(), PlaybackError> {
        self.record(AudioOp::Pause(channel));
        Ok(())
    }

    fn rewind(&self, channel: Channel) -> Result<(), PlaybackError> {
        self.record(AudioOp::Rewind(channel));
        Ok(())
    }

    fn play_detached(&self, channel: Channel, src: &str, volume: f32) -> Result<(), PlaybackError> {
        if self.clone_unsupported {
            return Err(PlaybackError::CloneUnsupported(channel.as_str()));
        }
        self.record(AudioOp::Detached(channel, src.to_owned(), volume));
        Ok(())
    }
}
