//! Audio channel control.
//!
//! Playback failures never interrupt a scene: every error from the backend
//! is logged and swallowed here.

use std::sync::Arc;

use kamishibai_core::audio::{AudioBackend, Channel, PlaybackError};
use kamishibai_core::config::PlayerConfig;
use kamishibai_scenario::application::assets::AssetResolver;
use tracing::{debug, warn};

/// Drives the four channels of an [`AudioBackend`] with configured volumes.
#[derive(Clone)]
pub struct AudioChannels {
    backend: Arc<dyn AudioBackend>,
    resolver: AssetResolver,
    config: Arc<PlayerConfig>,
}

impl AudioChannels {
    #[must_use]
    pub fn new(
        backend: Arc<dyn AudioBackend>,
        resolver: AssetResolver,
        config: Arc<PlayerConfig>,
    ) -> Self {
        Self {
            backend,
            resolver,
            config,
        }
    }

    /// Sets every channel to its effective volume.
    pub fn apply_volumes(&self) {
        for channel in Channel::ALL {
            let volume = self.config.effective_volume(channel);
            if let Err(e) = self.backend.set_volume(channel, volume) {
                warn!(channel = channel.as_str(), error = %e, "could not set channel volume");
            }
        }
    }

    /// Plays `reference` on `channel` from the start, replacing whatever the
    /// channel was playing. An empty resolved source is ignored.
    pub fn play(&self, channel: Channel, reference: &str) {
        let src = self.resolver.resolve(Some(reference));
        if src.is_empty() {
            return;
        }
        if let Err(e) = self.restart(channel, &src) {
            warn!(channel = channel.as_str(), src = %src, error = %e, "playback failed");
        }
    }

    fn restart(&self, channel: Channel, src: &str) -> Result<(), PlaybackError> {
        self.backend.pause(channel)?;
        self.backend.rewind(channel)?;
        self.backend.set_source(channel, src)?;
        self.backend
            .set_volume(channel, self.config.effective_volume(channel))?;
        self.backend.play(channel)
    }

    /// Pauses `channel` and rewinds it. The source is kept.
    pub fn stop(&self, channel: Channel) {
        let result = self
            .backend
            .pause(channel)
            .and_then(|()| self.backend.rewind(channel));
        if let Err(e) = result {
            warn!(channel = channel.as_str(), error = %e, "stop failed");
        }
    }

    /// Plays a sound effect. With overlap enabled each call starts a
    /// detached clone so effects layer; if cloning fails, or overlap is off,
    /// the main SE channel is restarted instead.
    pub fn play_se(&self, reference: &str) {
        let src = self.resolver.resolve(Some(reference));
        if src.is_empty() {
            return;
        }
        if self.config.se_overlap {
            let volume = self.config.effective_volume(Channel::Se);
            match self.backend.play_detached(Channel::Se, &src, volume) {
                Ok(()) => return,
                Err(e) => {
                    debug!(src = %src, error = %e, "detached SE unavailable; using main channel");
                }
            }
        }
        self.play(Channel::Se, reference);
    }

    /// Plays a voice line, replacing any line still playing.
    pub fn play_voice(&self, reference: &str) {
        self.play(Channel::Voice, reference);
    }

    /// Routes a cue to the right playback mode for its channel.
    pub fn trigger(&self, channel: Channel, reference: &str) {
        match channel {
            Channel::Se => self.play_se(reference),
            Channel::Voice => self.play_voice(reference),
            Channel::Bgm | Channel::Rse => self.play(channel, reference),
        }
    }

    /// Primes every channel after the first user gesture: a muted
    /// play-pause-rewind, then the previous volume is restored. Failures
    /// are ignored.
    pub fn unlock(&self) {
        for channel in Channel::ALL {
            let previous = self
                .backend
                .volume(channel)
                .unwrap_or_else(|_| self.config.effective_volume(channel));
            let primed = self
                .backend
                .set_volume(channel, 0.0)
                .and_then(|()| self.backend.play(channel))
                .and_then(|()| self.backend.pause(channel))
                .and_then(|()| self.backend.rewind(channel));
            if let Err(e) = primed {
                debug!(channel = channel.as_str(), error = %e, "unlock skipped");
            }
            let _ = self.backend.set_volume(channel, previous);
        }
    }
}
