//! Playback session — the scene cursor and everything it drives.
//!
//! A session owns the flag store, the page cursor and the pending delayed
//! audio cues. Every input is applied through `&mut self`, so callers that
//! share a session must serialise access (the HTTP layer holds it behind a
//! mutex); renders therefore never interleave.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use kamishibai_core::audio::{AudioBackend, Channel};
use kamishibai_core::clock::Clock;
use kamishibai_core::command::PlayerInput;
use kamishibai_core::config::PlayerConfig;
use kamishibai_core::error::PlayerError;
use kamishibai_core::presentation::{Element, Presentation, is_bound};
use kamishibai_scenario::application::assets::AssetResolver;
use kamishibai_scenario::domain::scene::{AudioCue, Scenario, Scene};
use tokio::task::AbortHandle;
use tokio::time::sleep;
use tracing::{debug, info};
use uuid::Uuid;

use super::audio::AudioChannels;
use super::transitions::FadeLayer;
use crate::domain::condition::evaluate;
use crate::domain::flags::FlagStore;
use crate::domain::pager::split_pages;

/// Which page of a scene to land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEntry {
    First,
    Last,
}

/// Result of a render request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The scene at this index is now current.
    Rendered(usize),
    /// No playable scene remains from the requested index on.
    EndOfSequence,
}

/// A single playthrough of a scenario.
pub struct PlaybackSession {
    id: Uuid,
    scenario: Arc<Scenario>,
    config: Arc<PlayerConfig>,
    resolver: AssetResolver,
    presentation: Arc<dyn Presentation>,
    audio: AudioChannels,
    fade: FadeLayer,
    clock: Arc<dyn Clock>,
    flags: FlagStore,
    scene_index: usize,
    page_index: usize,
    pages: Vec<String>,
    started: bool,
    ended: bool,
    current_image: String,
    pending_cues: Vec<AbortHandle>,
    created_at: DateTime<Utc>,
    last_rendered_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("id", &self.id)
            .field("scenario", &self.scenario.name)
            .field("scene_index", &self.scene_index)
            .field("page_index", &self.page_index)
            .field("started", &self.started)
            .field("ended", &self.ended)
            .finish_non_exhaustive()
    }
}

impl PlaybackSession {
    /// Creates an idle session. Nothing is rendered until [`start`].
    ///
    /// Element and scenario checks are the caller's job; see
    /// [`crate::application::boot::boot`].
    ///
    /// [`start`]: Self::start
    #[must_use]
    pub fn new(
        id: Uuid,
        scenario: Arc<Scenario>,
        config: Arc<PlayerConfig>,
        presentation: Arc<dyn Presentation>,
        backend: Arc<dyn AudioBackend>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let resolver = AssetResolver::new(config.packs_root.clone(), scenario.name.clone());
        let audio = AudioChannels::new(backend, resolver.clone(), Arc::clone(&config));
        let fade = FadeLayer::new(Arc::clone(&presentation));
        let created_at = clock.now();
        Self {
            id,
            scenario,
            config,
            resolver,
            presentation,
            audio,
            fade,
            clock,
            flags: FlagStore::new(),
            scene_index: 0,
            page_index: 0,
            pages: vec![String::new()],
            started: false,
            ended: false,
            current_image: String::new(),
            pending_cues: Vec::new(),
            created_at,
            last_rendered_at: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    #[must_use]
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    #[must_use]
    pub fn flags(&self) -> &FlagStore {
        &self.flags
    }

    #[must_use]
    pub fn scene_index(&self) -> usize {
        self.scene_index
    }

    #[must_use]
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    #[must_use]
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    /// Text of the page on screen.
    #[must_use]
    pub fn current_page(&self) -> &str {
        self.pages.get(self.page_index).map_or("", String::as_str)
    }

    /// The scene under the cursor.
    #[must_use]
    pub fn current_scene(&self) -> Option<&Scene> {
        self.scenario.scene(self.scene_index)
    }

    /// Resolved source of the image on screen, `""` before the first one.
    #[must_use]
    pub fn current_image(&self) -> &str {
        &self.current_image
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Whether an advance ran past the last playable scene.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn last_rendered_at(&self) -> Option<DateTime<Utc>> {
        self.last_rendered_at
    }

    /// Delayed audio cues scheduled by the current scene and not yet fired.
    #[must_use]
    pub fn pending_cues(&self) -> usize {
        self.pending_cues.iter().filter(|h| !h.is_finished()).count()
    }

    /// Storage key for a save slot.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::Validation` if the slot is out of range.
    pub fn save_key(&self, slot: u32) -> Result<String, PlayerError> {
        self.config.checked_save_key(slot)
    }

    /// Sets channel volumes and shows the start control.
    pub(crate) fn ready(&self) {
        self.audio.apply_volumes();
        self.presentation.set_start_visible(true);
    }

    /// Applies one input.
    pub async fn handle(&mut self, input: PlayerInput) {
        match input {
            PlayerInput::Start => self.start().await,
            PlayerInput::Advance => self.advance().await,
            PlayerInput::Back => self.back().await,
        }
    }

    /// Unlocks audio, hides the start control and renders the first
    /// playable scene. Only the first call has any effect.
    pub async fn start(&mut self) {
        if self.started {
            debug!(session_id = %self.id, "start ignored; session already started");
            return;
        }
        self.started = true;
        self.audio.unlock();
        self.presentation.set_start_visible(false);
        info!(session_id = %self.id, scenario = %self.scenario.name, "playback started");

        if self.render_scene(0, PageEntry::First).await == RenderOutcome::EndOfSequence {
            self.ended = true;
            info!(session_id = %self.id, "no playable scene; sequence ended");
        }
    }

    /// Next page, or the next playable scene from its first page. Past the
    /// last playable scene the session is marked ended and nothing changes.
    pub async fn advance(&mut self) {
        if !self.started {
            return;
        }
        if self.page_index + 1 < self.pages.len() {
            self.page_index += 1;
            self.show_page();
            return;
        }
        if self.render_scene(self.scene_index + 1, PageEntry::First).await
            == RenderOutcome::EndOfSequence
        {
            if !self.ended {
                info!(session_id = %self.id, "sequence ended");
            }
            self.ended = true;
        }
    }

    /// Previous page, or the previous scene entered on its last page. If
    /// that scene's condition fails, rendering skips forward as usual. A
    /// no-op on the first page of scene 0.
    pub async fn back(&mut self) {
        if !self.started {
            return;
        }
        if self.page_index > 0 {
            self.page_index -= 1;
            self.show_page();
            return;
        }
        if self.scene_index > 0 {
            self.render_scene(self.scene_index - 1, PageEntry::Last).await;
        }
    }

    /// Renders the first scene at or after `index` whose condition holds.
    ///
    /// Skipped scenes are entered on their first page regardless of `entry`.
    /// In order: flag updates, entry delay, fade cover, commit of the
    /// cursor, image, audio, text, effect, fade release, diagnostics.
    pub async fn render_scene(&mut self, index: usize, entry: PageEntry) -> RenderOutcome {
        let scenario = Arc::clone(&self.scenario);
        let mut index = index;
        let mut entry = entry;
        let scene = loop {
            let Some(scene) = scenario.scene(index) else {
                debug!(session_id = %self.id, index, "end of sequence");
                return RenderOutcome::EndOfSequence;
            };
            if evaluate(scene.condition.as_ref(), &self.flags) {
                break scene;
            }
            debug!(session_id = %self.id, scene = scene.label(), index, "condition failed; skipping");
            index += 1;
            entry = PageEntry::First;
        };

        if let Some(updates) = &scene.set {
            self.flags.apply(updates);
        }
        if let Some(delay) = scene.entry_delay() {
            sleep(delay).await;
        }
        if scene.fade {
            self.fade.cover().await;
        } else {
            self.fade.clear();
        }

        self.cancel_pending_cues();
        self.scene_index = index;
        self.ended = false;

        self.show_image(scene);
        self.cue_audio(scene);

        self.pages = split_pages(scene.raw_text(&scenario.texts));
        self.page_index = match entry {
            PageEntry::First => 0,
            PageEntry::Last => self.pages.len().saturating_sub(1),
        };
        self.show_page();

        if let Some(effect) = &scene.fx {
            self.fade.run(effect).await;
        }
        if scene.fade {
            self.fade.release().await;
        }

        self.last_rendered_at = Some(self.clock.now());
        self.write_diagnostics(scene);
        RenderOutcome::Rendered(index)
    }

    fn show_image(&mut self, scene: &Scene) {
        let src = self.resolver.resolve(scene.img.as_deref());
        if !src.is_empty() && src != self.current_image {
            self.presentation.set_image(&src);
            self.current_image = src;
        }
    }

    fn cue_audio(&mut self, scene: &Scene) {
        for (channel, cue) in [(Channel::Bgm, &scene.bgm), (Channel::Rse, &scene.rse)] {
            match cue {
                AudioCue::Keep => {}
                AudioCue::Stop => self.audio.stop(channel),
                AudioCue::Play(reference) => self.audio.play(channel, reference),
            }
        }
        for (channel, cue, delay) in [
            (Channel::Se, &scene.se, scene.se_delay()),
            (Channel::Voice, &scene.voice, scene.voice_delay()),
        ] {
            match (cue, delay) {
                (AudioCue::Keep, _) => {}
                (AudioCue::Stop, _) => self.audio.stop(channel),
                (AudioCue::Play(reference), None) => self.audio.trigger(channel, reference),
                (AudioCue::Play(reference), Some(delay)) => {
                    self.schedule_cue(channel, reference.clone(), delay);
                }
            }
        }
    }

    fn schedule_cue(&mut self, channel: Channel, reference: String, delay: Duration) {
        let audio = self.audio.clone();
        let task = tokio::spawn(async move {
            sleep(delay).await;
            audio.trigger(channel, &reference);
        });
        self.pending_cues.push(task.abort_handle());
    }

    fn cancel_pending_cues(&mut self) {
        for handle in self.pending_cues.drain(..) {
            handle.abort();
        }
    }

    fn show_page(&self) {
        let name = self
            .current_scene()
            .and_then(|s| s.name.as_deref())
            .unwrap_or("");
        self.presentation.set_name(name);
        self.presentation.set_text(self.current_page());
    }

    fn write_diagnostics(&self, scene: &Scene) {
        let flags = self.flags.to_json();
        debug!(
            session_id = %self.id,
            scene = scene.label(),
            index = self.scene_index,
            page = self.page_index + 1,
            pages = self.pages.len(),
            flags = %flags,
            "scene rendered"
        );
        if is_bound(self.presentation.as_ref(), Element::Debug) {
            self.presentation.set_debug(&format!(
                "scene: {}\nindex: {}\npage: {}/{}\nflags: {}",
                scene.label(),
                self.scene_index,
                self.page_index + 1,
                self.pages.len(),
                flags
            ));
        }
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.cancel_pending_cues();
    }
}
