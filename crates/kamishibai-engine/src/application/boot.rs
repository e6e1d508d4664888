//! Session boot.

use std::sync::Arc;

use kamishibai_core::audio::AudioBackend;
use kamishibai_core::clock::Clock;
use kamishibai_core::config::{BootOptions, PlayerConfig};
use kamishibai_core::error::PlayerError;
use kamishibai_core::presentation::{Presentation, missing_elements};
use kamishibai_scenario::application::loader::{PackRef, ScenarioSource, load_scenario};
use tracing::{error, info};
use uuid::Uuid;

use super::session::PlaybackSession;

/// The surfaces a session renders to.
#[derive(Clone)]
pub struct Surfaces {
    pub presentation: Arc<dyn Presentation>,
    pub audio: Arc<dyn AudioBackend>,
}

/// Boots a session: merges `options` into `config`, loads the scenario,
/// checks the presentation binds every required element, applies channel
/// volumes and shows the start control.
///
/// Fatal failures are also reported to the user through
/// [`Presentation::alert`].
///
/// # Errors
///
/// Returns `PlayerError::ScenarioUnavailable` if the scene list cannot be
/// loaded, or `PlayerError::MissingElements` if required elements are not
/// bound.
pub async fn boot(
    config: &PlayerConfig,
    options: &BootOptions,
    source: &dyn ScenarioSource,
    surfaces: Surfaces,
    clock: Arc<dyn Clock>,
) -> Result<PlaybackSession, PlayerError> {
    let config = config.with_boot_options(options);
    let pack = PackRef::new(config.packs_root.clone(), config.scenario.clone());

    let scenario = match load_scenario(source, &pack).await {
        Ok(scenario) => scenario,
        Err(e) => {
            error!(scenario = %pack.scenario, error = %e, "boot failed");
            surfaces
                .presentation
                .alert(&format!("{e}\n\nlooked in: {}/", pack.dir().display()));
            return Err(e);
        }
    };

    let missing = missing_elements(surfaces.presentation.as_ref());
    if !missing.is_empty() {
        let e = PlayerError::MissingElements(missing);
        error!(error = %e, "boot failed");
        surfaces.presentation.alert(&e.to_string());
        return Err(e);
    }

    let session = PlaybackSession::new(
        Uuid::now_v7(),
        Arc::new(scenario),
        Arc::new(config),
        surfaces.presentation,
        surfaces.audio,
        clock,
    );
    session.ready();
    info!(session_id = %session.id(), scenario = %session.scenario().name, "session booted");
    Ok(session)
}
