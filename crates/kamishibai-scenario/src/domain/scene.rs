//! Scene records and the scenario they form.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use super::condition::Condition;
use super::flag::FlagValue;

/// What a scene asks of one audio channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AudioCue {
    /// Key absent (or an empty string): leave the channel alone.
    #[default]
    Keep,
    /// Explicit `null`: stop the channel.
    Stop,
    /// Play this asset reference.
    Play(String),
}

impl<'de> Deserialize<'de> for AudioCue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<String>::deserialize(deserializer)? {
            None => Self::Stop,
            Some(s) if s.is_empty() => Self::Keep,
            Some(s) => Self::Play(s),
        })
    }
}

/// Parameters of a colour flash over the fade layer. Durations in ms.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Flash {
    pub delay: f64,
    pub color: String,
    #[serde(rename = "in")]
    pub fade_in: f64,
    pub hold: f64,
    #[serde(rename = "out")]
    pub fade_out: f64,
}

impl Default for Flash {
    fn default() -> Self {
        Self {
            delay: 0.0,
            color: "#fff".to_owned(),
            fade_in: 120.0,
            hold: 60.0,
            fade_out: 200.0,
        }
    }
}

/// Transition effect run after a scene's text is shown.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    Flash(Flash),
    /// An effect type this player does not know; ignored.
    #[serde(other)]
    Unsupported,
}

/// One entry of a scenario.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "if")]
    pub condition: Option<Condition>,
    /// Numbers accumulate onto the flag, anything else overwrites it.
    #[serde(default)]
    pub set: Option<BTreeMap<String, FlagValue>>,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub bgm: AudioCue,
    #[serde(default)]
    pub rse: AudioCue,
    #[serde(default)]
    pub se: AudioCue,
    #[serde(default)]
    pub voice: AudioCue,
    #[serde(default)]
    pub se_delay: Option<f64>,
    #[serde(default)]
    pub voice_delay: Option<f64>,
    #[serde(default)]
    pub delay: Option<f64>,
    #[serde(default)]
    pub fade: bool,
    #[serde(default)]
    pub fx: Option<Effect>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub text_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Scene {
    /// Label for diagnostics.
    #[must_use]
    pub fn label(&self) -> &str {
        self.id.as_deref().filter(|id| !id.is_empty()).unwrap_or("(no id)")
    }

    /// Pause before rendering, if positive.
    #[must_use]
    pub fn entry_delay(&self) -> Option<Duration> {
        self.delay.and_then(millis)
    }

    /// Delay before the sound effect fires, if positive.
    #[must_use]
    pub fn se_delay(&self) -> Option<Duration> {
        self.se_delay.and_then(millis)
    }

    /// Delay before the voice fires, if positive.
    #[must_use]
    pub fn voice_delay(&self) -> Option<Duration> {
        self.voice_delay.and_then(millis)
    }

    /// Raw text: inline `text` wins, then the `textId` lookup, then empty.
    #[must_use]
    pub fn raw_text<'a>(&'a self, texts: &'a TextTable) -> &'a str {
        if let Some(text) = &self.text {
            return text;
        }
        self.text_id
            .as_deref()
            .and_then(|id| texts.get(id))
            .unwrap_or("")
    }
}

/// Converts a millisecond count from scene data into a duration.
/// Zero, negative, and non-finite values yield `None`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn millis(ms: f64) -> Option<Duration> {
    (ms.is_finite() && ms > 0.0).then(|| Duration::from_millis(ms.round() as u64))
}

/// Id → raw text lookup supplied next to the scene list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct TextTable(HashMap<String, String>);

impl TextTable {
    #[must_use]
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self(entries)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A loaded scenario pack: immutable for the lifetime of its sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// Pack identifier.
    pub name: String,
    /// Scenes in play order.
    pub scenes: Vec<Scene>,
    /// Text lookup table (possibly empty).
    pub texts: TextTable,
    /// SHA-256 of the scene source, hex encoded.
    pub version_hash: String,
}

impl Scenario {
    #[must_use]
    pub fn scene(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}
