//! Fade-layer transitions.

use std::sync::Arc;
use std::time::Duration;

use kamishibai_core::presentation::{FadeTransition, Presentation};
use kamishibai_scenario::domain::scene::{Effect, Flash, millis};
use tokio::time::sleep;
use tracing::debug;

/// Time the fade layer takes to reach full cover.
pub const FADE_IN: Duration = Duration::from_millis(200);

/// Pause on the new scene before the fade layer is lifted.
pub const FADE_RELEASE: Duration = Duration::from_millis(120);

/// Drives the full-screen fade layer.
#[derive(Clone)]
pub struct FadeLayer {
    presentation: Arc<dyn Presentation>,
}

impl FadeLayer {
    #[must_use]
    pub fn new(presentation: Arc<dyn Presentation>) -> Self {
        Self { presentation }
    }

    /// Covers the stage and waits for the cover to complete.
    pub async fn cover(&self) {
        self.presentation.set_fade_opacity(1.0);
        sleep(FADE_IN).await;
    }

    /// Removes the cover at once.
    pub fn clear(&self) {
        self.presentation.set_fade_opacity(0.0);
    }

    /// Waits briefly, then lifts the cover.
    pub async fn release(&self) {
        sleep(FADE_RELEASE).await;
        self.presentation.set_fade_opacity(0.0);
    }

    /// Runs a scene effect to completion.
    pub async fn run(&self, effect: &Effect) {
        match effect {
            Effect::Flash(flash) => self.flash(flash).await,
            Effect::Unsupported => debug!("ignoring unsupported effect"),
        }
    }

    /// Flashes the layer in a colour: instant reset, optional delay, linear
    /// rise, hold, linear fall. Restores the black cover colour afterwards.
    pub async fn flash(&self, flash: &Flash) {
        let fade_in = millis(flash.fade_in).unwrap_or_default();
        let hold = millis(flash.hold).unwrap_or_default();
        let fade_out = millis(flash.fade_out).unwrap_or_default();

        self.presentation.set_fade_transition(FadeTransition::Disabled);
        self.presentation.set_fade_background(&flash.color);
        self.presentation.set_fade_opacity(0.0);

        if let Some(delay) = millis(flash.delay) {
            sleep(delay).await;
        }

        self.presentation.set_fade_transition(linear(fade_in));
        self.presentation.set_fade_opacity(1.0);
        sleep(fade_in + hold).await;

        self.presentation.set_fade_transition(linear(fade_out));
        self.presentation.set_fade_opacity(0.0);
        sleep(fade_out).await;

        self.presentation.set_fade_transition(FadeTransition::Inherit);
        self.presentation.set_fade_background("black");
    }
}

#[allow(clippy::cast_possible_truncation)]
fn linear(duration: Duration) -> FadeTransition {
    FadeTransition::Linear {
        millis: duration.as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use kamishibai_test_support::{PresentationOp, RecordingPresentation};
    use tokio::time::Instant;

    use super::*;

    fn assert_elapsed(started: Instant, expected: Duration) {
        let elapsed = started.elapsed();
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(5),
            "elapsed {elapsed:?}, expected {expected:?}"
        );
    }

    fn layer() -> (Arc<RecordingPresentation>, FadeLayer) {
        let presentation = Arc::new(RecordingPresentation::new());
        let fade = FadeLayer::new(Arc::clone(&presentation) as Arc<dyn Presentation>);
        (presentation, fade)
    }

    #[tokio::test(start_paused = true)]
    async fn test_cover_waits_for_fade_in() {
        // Arrange
        let (presentation, fade) = layer();
        let started = Instant::now();

        // Act
        fade.cover().await;

        // Assert
        assert_elapsed(started, FADE_IN);
        assert_eq!(presentation.fade_opacities(), vec![1.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_waits_then_clears() {
        let (presentation, fade) = layer();
        let started = Instant::now();

        fade.release().await;

        assert_elapsed(started, FADE_RELEASE);
        assert_eq!(presentation.fade_opacities(), vec![0.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flash_sequence_and_timing() {
        let (presentation, fade) = layer();
        let flash = Flash {
            delay: 50.0,
            color: "red".into(),
            ..Flash::default()
        };
        let started = Instant::now();

        fade.flash(&flash).await;

        assert_elapsed(started, Duration::from_millis(50 + 120 + 60 + 200));
        assert_eq!(
            presentation.ops(),
            vec![
                PresentationOp::FadeTransition(FadeTransition::Disabled),
                PresentationOp::FadeBackground("red".into()),
                PresentationOp::FadeOpacity(0.0),
                PresentationOp::FadeTransition(FadeTransition::Linear { millis: 120 }),
                PresentationOp::FadeOpacity(1.0),
                PresentationOp::FadeTransition(FadeTransition::Linear { millis: 200 }),
                PresentationOp::FadeOpacity(0.0),
                PresentationOp::FadeTransition(FadeTransition::Inherit),
                PresentationOp::FadeBackground("black".into()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsupported_effect_does_nothing() {
        let (presentation, fade) = layer();

        fade.run(&Effect::Unsupported).await;

        assert!(presentation.ops().is_empty());
    }
}
