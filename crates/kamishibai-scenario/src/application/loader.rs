//! Scenario loading.
//!
//! A pack lives at `<packs_root>/<scenario>/` and holds a required scene
//! list (`scenario.json`, `scenario.yaml` or `scenario.yml`) and an optional
//! text table (`text.json`, `text.yaml` or `text.yml`). The scene list is
//! either a bare array or an object with a `scenes` array.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use kamishibai_core::error::PlayerError;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::domain::scene::{Scenario, Scene, TextTable};

const SCENE_FILES: [&str; 3] = ["scenario.json", "scenario.yaml", "scenario.yml"];
const TEXT_FILES: [&str; 3] = ["text.json", "text.yaml", "text.yml"];

/// Location of a scenario pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackRef {
    pub packs_root: String,
    pub scenario: String,
}

impl PackRef {
    #[must_use]
    pub fn new(packs_root: impl Into<String>, scenario: impl Into<String>) -> Self {
        Self {
            packs_root: packs_root.into(),
            scenario: scenario.into(),
        }
    }

    /// The pack directory.
    #[must_use]
    pub fn dir(&self) -> PathBuf {
        Path::new(&self.packs_root).join(&self.scenario)
    }
}

/// A parsed scene list together with the hash of its source.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneList {
    pub scenes: Vec<Scene>,
    pub version_hash: String,
}

/// Where scenario data comes from.
#[async_trait]
pub trait ScenarioSource: Send + Sync {
    /// Loads the scene list of a pack.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::ScenarioUnavailable` if the list cannot be read
    /// or parsed.
    async fn load_scenes(&self, pack: &PackRef) -> Result<SceneList, PlayerError>;

    /// Loads the text table of a pack.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be read or parsed. Callers treat
    /// this as non-fatal.
    async fn load_texts(&self, pack: &PackRef) -> Result<TextTable, PlayerError>;
}

/// Loads a complete scenario. The text table is optional: failures are
/// logged and an empty table is used. The scene list is required and must
/// not be empty.
///
/// # Errors
///
/// Returns `PlayerError::ScenarioUnavailable` when the scene list is
/// missing, malformed, or empty.
pub async fn load_scenario(
    source: &dyn ScenarioSource,
    pack: &PackRef,
) -> Result<Scenario, PlayerError> {
    let texts = match source.load_texts(pack).await {
        Ok(texts) => texts,
        Err(e) => {
            warn!(scenario = %pack.scenario, error = %e, "text table unavailable; continuing without it");
            TextTable::default()
        }
    };

    let list = source.load_scenes(pack).await?;
    if list.scenes.is_empty() {
        return Err(PlayerError::ScenarioUnavailable(format!(
            "scene list for {} is empty",
            pack.dir().display()
        )));
    }

    info!(
        scenario = %pack.scenario,
        scenes = list.scenes.len(),
        texts = texts.len(),
        version_hash = %list.version_hash,
        "scenario loaded"
    );

    Ok(Scenario {
        name: pack.scenario.clone(),
        scenes: list.scenes,
        texts,
        version_hash: list.version_hash,
    })
}

/// Reads packs from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsScenarioSource;

#[async_trait]
impl ScenarioSource for FsScenarioSource {
    async fn load_scenes(&self, pack: &PackRef) -> Result<SceneList, PlayerError> {
        let (path, bytes) = read_first(&pack.dir(), &SCENE_FILES)
            .await
            .map_err(PlayerError::ScenarioUnavailable)?;

        let scenes = parse_scenes(&path, &bytes).map_err(|e| {
            PlayerError::ScenarioUnavailable(format!("{}: {e}", path.display()))
        })?;

        Ok(SceneList {
            scenes,
            version_hash: format!("{:x}", Sha256::digest(&bytes)),
        })
    }

    async fn load_texts(&self, pack: &PackRef) -> Result<TextTable, PlayerError> {
        let (path, bytes) = read_first(&pack.dir(), &TEXT_FILES)
            .await
            .map_err(PlayerError::Infrastructure)?;

        if is_yaml(&path) {
            serde_yaml::from_slice(&bytes)
                .map_err(|e| PlayerError::Validation(format!("{}: {e}", path.display())))
        } else {
            serde_json::from_slice(&bytes)
                .map_err(|e| PlayerError::Validation(format!("{}: {e}", path.display())))
        }
    }
}

/// Reads the first candidate file that exists in `dir`.
async fn read_first(dir: &Path, candidates: &[&str]) -> Result<(PathBuf, Vec<u8>), String> {
    for name in candidates {
        let path = dir.join(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => return Ok((path, bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(format!("{}: {e}", path.display())),
        }
    }
    Err(format!(
        "none of {} found in {}",
        candidates.join(", "),
        dir.display()
    ))
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

fn parse_scenes(path: &Path, bytes: &[u8]) -> Result<Vec<Scene>, String> {
    if is_yaml(path) {
        let value = match serde_yaml::from_slice::<serde_yaml::Value>(bytes).map_err(|e| e.to_string())? {
            serde_yaml::Value::Mapping(mut map) => map
                .remove("scenes")
                .unwrap_or(serde_yaml::Value::Null),
            other => other,
        };
        serde_yaml::from_value(value).map_err(|e| e.to_string())
    } else {
        let value = match serde_json::from_slice::<serde_json::Value>(bytes).map_err(|e| e.to_string())? {
            serde_json::Value::Object(mut map) => {
                map.remove("scenes").unwrap_or(serde_json::Value::Null)
            }
            other => other,
        };
        serde_json::from_value(value).map_err(|e| e.to_string())
    }
}
