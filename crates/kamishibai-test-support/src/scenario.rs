//! Test scenario sources — in-memory `ScenarioSource` implementations.

use async_trait::async_trait;
use kamishibai_core::error::PlayerError;
use kamishibai_scenario::application::loader::{PackRef, ScenarioSource, SceneList};
use kamishibai_scenario::domain::scene::{Scenario, Scene, TextTable};

/// Parses a JSON scene array into a scenario named `test`.
///
/// # Panics
///
/// Panics if `scenes` is not a valid scene array.
#[must_use]
pub fn scenario_from_json(scenes: &str) -> Scenario {
    Scenario {
        name: "test".to_owned(),
        scenes: serde_json::from_str(scenes).unwrap(),
        texts: TextTable::default(),
        version_hash: "test".to_owned(),
    }
}

/// A scenario source serving the same scenes and texts for every pack.
#[derive(Debug, Clone, Default)]
pub struct StaticScenarioSource {
    scenes: Vec<Scene>,
    texts: Option<TextTable>,
}

impl StaticScenarioSource {
    #[must_use]
    pub fn new(scenes: Vec<Scene>) -> Self {
        Self {
            scenes,
            texts: None,
        }
    }

    /// Parses a JSON scene array.
    ///
    /// # Panics
    ///
    /// Panics if `scenes` is not a valid scene array.
    #[must_use]
    pub fn from_json(scenes: &str) -> Self {
        Self::new(serde_json::from_str(scenes).unwrap())
    }

    /// Serves `texts` as the text table; without it the table is unavailable.
    #[must_use]
    pub fn with_texts(mut self, texts: TextTable) -> Self {
        self.texts = Some(texts);
        self
    }
}

#[async_trait]
impl ScenarioSource for StaticScenarioSource {
    async fn load_scenes(&self, _pack: &PackRef) -> Result<SceneList, PlayerError> {
        Ok(SceneList {
            scenes: self.scenes.clone(),
            version_hash: "static".to_owned(),
        })
    }

    async fn load_texts(&self, pack: &PackRef) -> Result<TextTable, PlayerError> {
        self.texts
            .clone()
            .ok_or_else(|| PlayerError::Infrastructure(format!("no text table for {}", pack.scenario)))
    }
}

/// A scenario source that always fails to load scenes.
#[derive(Debug)]
pub struct FailingScenarioSource;

#[async_trait]
impl ScenarioSource for FailingScenarioSource {
    async fn load_scenes(&self, pack: &PackRef) -> Result<SceneList, PlayerError> {
        Err(PlayerError::ScenarioUnavailable(format!(
            "{}/scenario.json: not found",
            pack.dir().display()
        )))
    }

    async fn load_texts(&self, _pack: &PackRef) -> Result<TextTable, PlayerError> {
        Err(PlayerError::Infrastructure("not found".to_owned()))
    }
}
