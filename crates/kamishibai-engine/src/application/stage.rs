//! Headless stage — an in-memory presentation and audio backend.
//!
//! Used when sessions are driven remotely: the stage keeps whatever the
//! engine last put on screen so a client can fetch it as a snapshot and
//! render it however it likes.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use kamishibai_core::audio::{AudioBackend, Channel, PlaybackError};
use kamishibai_core::presentation::{Element, FadeTransition, Presentation};
use serde::Serialize;
use tracing::warn;

/// Detached playbacks kept in a snapshot.
const DETACHED_HISTORY: usize = 16;

/// State of one audio channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelState {
    pub src: String,
    pub volume: f32,
    pub playing: bool,
    /// Times playback was started from the current source.
    pub starts: u32,
}

impl Default for ChannelState {
    fn default() -> Self {
        Self {
            src: String::new(),
            volume: 1.0,
            playing: false,
            starts: 0,
        }
    }
}

/// A fire-and-forget playback started on a clone of a channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetachedPlayback {
    pub channel: Channel,
    pub src: String,
    pub volume: f32,
}

/// State of the fade layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FadeState {
    pub opacity: f32,
    pub background: String,
    pub transition: FadeTransition,
}

impl Default for FadeState {
    fn default() -> Self {
        Self {
            opacity: 0.0,
            background: "black".to_owned(),
            transition: FadeTransition::Inherit,
        }
    }
}

/// Everything currently on the stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSnapshot {
    pub image: String,
    pub fade: FadeState,
    pub start_visible: bool,
    pub name: String,
    pub text: String,
    pub debug: Option<String>,
    pub alerts: Vec<String>,
    pub channels: BTreeMap<Channel, ChannelState>,
    pub detached: VecDeque<DetachedPlayback>,
}

/// An in-memory stage binding every element, debug panel included.
#[derive(Debug)]
pub struct HeadlessStage {
    bound: HashSet<&'static str>,
    state: Mutex<StageSnapshot>,
}

impl Default for HeadlessStage {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessStage {
    #[must_use]
    pub fn new() -> Self {
        let bound = Element::REQUIRED
            .iter()
            .chain(std::iter::once(&Element::Debug))
            .flat_map(|e| e.ids().iter().copied())
            .collect();
        let state = StageSnapshot {
            channels: Channel::ALL
                .iter()
                .map(|c| (*c, ChannelState::default()))
                .collect(),
            ..StageSnapshot::default()
        };
        Self {
            bound,
            state: Mutex::new(state),
        }
    }

    /// Copy of the current stage.
    #[must_use]
    pub fn snapshot(&self) -> StageSnapshot {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, StageSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_channel<T>(&self, channel: Channel, f: impl FnOnce(&mut ChannelState) -> T) -> T {
        let mut state = self.lock();
        f(state.channels.entry(channel).or_default())
    }
}

impl Presentation for HeadlessStage {
    fn has_element(&self, id: &str) -> bool {
        self.bound.contains(id)
    }

    fn alert(&self, message: &str) {
        warn!(alert = message, "stage alert");
        self.lock().alerts.push(message.to_owned());
    }

    fn set_image(&self, src: &str) {
        src.clone_into(&mut self.lock().image);
    }

    fn set_fade_opacity(&self, opacity: f32) {
        self.lock().fade.opacity = opacity;
    }

    fn set_fade_transition(&self, transition: FadeTransition) {
        self.lock().fade.transition = transition;
    }

    fn set_fade_background(&self, color: &str) {
        color.clone_into(&mut self.lock().fade.background);
    }

    fn set_start_visible(&self, visible: bool) {
        self.lock().start_visible = visible;
    }

    fn set_name(&self, name: &str) {
        name.clone_into(&mut self.lock().name);
    }

    fn set_text(&self, text: &str) {
        text.clone_into(&mut self.lock().text);
    }

    fn set_debug(&self, text: &str) {
        self.lock().debug = Some(text.to_owned());
    }
}

impl AudioBackend for HeadlessStage {
    fn set_source(&self, channel: Channel, src: &str) -> Result<(), PlaybackError> {
        self.with_channel(channel, |c| {
            src.clone_into(&mut c.src);
            c.starts = 0;
        });
        Ok(())
    }

    fn volume(&self, channel: Channel) -> Result<f32, PlaybackError> {
        Ok(self.with_channel(channel, |c| c.volume))
    }

    fn set_volume(&self, channel: Channel, volume: f32) -> Result<(), PlaybackError> {
        self.with_channel(channel, |c| c.volume = volume.clamp(0.0, 1.0));
        Ok(())
    }

    fn play(&self, channel: Channel) -> Result<(), PlaybackError> {
        self.with_channel(channel, |c| {
            if c.src.is_empty() {
                // Nothing loaded yet.
                return Ok(());
            }
            c.playing = true;
            c.starts += 1;
            Ok(())
        })
    }

    fn pause(&self, channel: Channel) -> Result<(), PlaybackError> {
        self.with_channel(channel, |c| c.playing = false);
        Ok(())
    }

    fn rewind(&self, _channel: Channel) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn play_detached(&self, channel: Channel, src: &str, volume: f32) -> Result<(), PlaybackError> {
        if src.is_empty() {
            return Err(PlaybackError::AssetUnavailable(channel.as_str().to_owned()));
        }
        let mut state = self.lock();
        if state.detached.len() == DETACHED_HISTORY {
            state.detached.pop_front();
        }
        state.detached.push_back(DetachedPlayback {
            channel,
            src: src.to_owned(),
            volume: volume.clamp(0.0, 1.0),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use kamishibai_core::presentation::missing_elements;

    use super::*;

    #[test]
    fn test_binds_every_element() {
        let stage = HeadlessStage::new();

        assert!(missing_elements(&stage).is_empty());
        assert!(stage.has_element("debug"));
    }

    #[test]
    fn test_snapshot_reflects_presentation_calls() {
        // Arrange
        let stage = HeadlessStage::new();

        // Act
        stage.set_image("packs/a/1.png");
        stage.set_name("Aki");
        stage.set_text("Hello");
        stage.set_fade_opacity(1.0);

        // Assert
        let snapshot = stage.snapshot();
        assert_eq!(snapshot.image, "packs/a/1.png");
        assert_eq!(snapshot.name, "Aki");
        assert_eq!(snapshot.text, "Hello");
        assert!((snapshot.fade.opacity - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_channel_play_and_pause() {
        let stage = HeadlessStage::new();

        stage.set_source(Channel::Bgm, "packs/a/bgm.mp3").unwrap();
        stage.play(Channel::Bgm).unwrap();
        let playing = stage.snapshot().channels[&Channel::Bgm].clone();
        stage.pause(Channel::Bgm).unwrap();

        assert!(playing.playing);
        assert_eq!(playing.starts, 1);
        assert!(!stage.snapshot().channels[&Channel::Bgm].playing);
    }

    #[test]
    fn test_detached_history_is_bounded() {
        let stage = HeadlessStage::new();

        for i in 0..20 {
            stage
                .play_detached(Channel::Se, &format!("se/{i}.wav"), 0.5)
                .unwrap();
        }

        let detached = stage.snapshot().detached;
        assert_eq!(detached.len(), DETACHED_HISTORY);
        assert_eq!(detached.back().unwrap().src, "se/19.wav");
    }

    #[test]
    fn test_snapshot_serializes_channels_by_name() {
        let stage = HeadlessStage::new();

        let json = serde_json::to_value(stage.snapshot()).unwrap();

        assert!(json["channels"]["bgm"].is_object());
        assert_eq!(json["startVisible"], false);
        assert_eq!(json["fade"]["transition"]["kind"], "inherit");
    }
}
