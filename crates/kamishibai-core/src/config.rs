//! Player configuration: defaults, overrides, and boot options.
//!
//! Configuration is layered. [`PlayerConfig::default`] supplies the base,
//! a [`ConfigOverrides`] document (usually a `GAME_CONFIG` JSON file) is
//! merged over it, and the [`BootOptions`] a caller passes when starting a
//! session are merged last.

use serde::{Deserialize, Serialize};

use crate::audio::Channel;
use crate::error::PlayerError;

/// Effective settings for one playback session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerConfig {
    /// Directory (or URL prefix) that holds every scenario pack.
    pub packs_root: String,
    /// Scenario pack identifier, a directory under `packs_root`.
    pub scenario: String,
    /// Prefix for save keys. `None` or empty derives `"<scenario>_"`.
    pub save_key_prefix: Option<String>,
    /// Number of save slots offered.
    pub save_slots: u32,
    /// Master volume applied on top of every channel volume.
    pub volume_master: f64,
    /// Background music volume.
    pub volume_bgm: f64,
    /// Ambient loop volume.
    pub volume_rse: f64,
    /// Sound-effect volume.
    pub volume_se: f64,
    /// Voice volume.
    pub volume_voice: f64,
    /// Play each sound effect on a detached clone so rapid triggers overlap.
    pub se_overlap: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            packs_root: "packs".to_owned(),
            scenario: "demo".to_owned(),
            save_key_prefix: None,
            save_slots: 10,
            volume_master: 1.0,
            volume_bgm: 0.6,
            volume_rse: 0.25,
            volume_se: 0.12,
            volume_voice: 1.0,
            se_overlap: true,
        }
    }
}

impl PlayerConfig {
    /// Returns a copy with every present override applied.
    #[must_use]
    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Self {
        let mut merged = self.clone();
        if let Some(v) = &overrides.packs_root {
            merged.packs_root.clone_from(v);
        }
        if let Some(v) = &overrides.scenario {
            merged.scenario.clone_from(v);
        }
        if let Some(v) = &overrides.save_key_prefix {
            merged.save_key_prefix = Some(v.clone());
        }
        if let Some(v) = overrides.save_slots {
            merged.save_slots = v;
        }
        if let Some(v) = overrides.volume_master {
            merged.volume_master = v;
        }
        if let Some(v) = overrides.volume_bgm {
            merged.volume_bgm = v;
        }
        if let Some(v) = overrides.volume_rse {
            merged.volume_rse = v;
        }
        if let Some(v) = overrides.volume_se {
            merged.volume_se = v;
        }
        if let Some(v) = overrides.volume_voice {
            merged.volume_voice = v;
        }
        if let Some(v) = overrides.se_overlap {
            merged.se_overlap = v;
        }
        merged
    }

    /// Returns a copy with the caller's boot options applied.
    #[must_use]
    pub fn with_boot_options(&self, options: &BootOptions) -> Self {
        self.with_overrides(&ConfigOverrides {
            packs_root: options.packs_root.clone(),
            scenario: options.scenario.clone(),
            save_key_prefix: options.save_key_prefix.clone(),
            ..ConfigOverrides::default()
        })
    }

    /// Configured (unscaled) volume for a channel.
    #[must_use]
    pub fn channel_volume(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Bgm => self.volume_bgm,
            Channel::Rse => self.volume_rse,
            Channel::Se => self.volume_se,
            Channel::Voice => self.volume_voice,
        }
    }

    /// Volume actually handed to the audio backend: master times channel,
    /// both clamped to `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn effective_volume(&self, channel: Channel) -> f32 {
        (clamp01(self.volume_master) * clamp01(self.channel_volume(channel))) as f32
    }

    /// Storage key for a save slot: `prefix + "save_" + slot`.
    #[must_use]
    pub fn save_key(&self, slot: u32) -> String {
        let prefix = match self.save_key_prefix.as_deref() {
            Some(p) if !p.is_empty() => p.to_owned(),
            _ => format!("{}_", self.scenario),
        };
        format!("{prefix}save_{slot}")
    }

    /// Like [`save_key`](Self::save_key), but rejects slots outside
    /// `1..=save_slots`.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::Validation` for an out-of-range slot.
    pub fn checked_save_key(&self, slot: u32) -> Result<String, PlayerError> {
        if slot == 0 || slot > self.save_slots {
            return Err(PlayerError::Validation(format!(
                "save slot {slot} outside 1..={}",
                self.save_slots
            )));
        }
        Ok(self.save_key(slot))
    }
}

/// Partial configuration merged over the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    pub packs_root: Option<String>,
    pub scenario: Option<String>,
    pub save_key_prefix: Option<String>,
    pub save_slots: Option<u32>,
    pub volume_master: Option<f64>,
    pub volume_bgm: Option<f64>,
    pub volume_rse: Option<f64>,
    pub volume_se: Option<f64>,
    pub volume_voice: Option<f64>,
    pub se_overlap: Option<bool>,
}

impl ConfigOverrides {
    /// Parses an overrides document.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::Validation` if the JSON is malformed.
    pub fn from_json(raw: &str) -> Result<Self, PlayerError> {
        serde_json::from_str(raw)
            .map_err(|e| PlayerError::Validation(format!("invalid config overrides: {e}")))
    }
}

/// Options supplied by whoever boots a session. All optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootOptions {
    pub packs_root: Option<String>,
    pub scenario: Option<String>,
    pub save_key_prefix: Option<String>,
}

impl BootOptions {
    /// Checks options received from a remote client. The packs root is a
    /// host setting and may not be chosen remotely; the scenario must name
    /// a single directory under it.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::Validation` if `packs_root` is set or
    /// `scenario` is empty or contains a path separator or `..`.
    pub fn validate_remote(&self) -> Result<(), PlayerError> {
        if self.packs_root.is_some() {
            return Err(PlayerError::Validation(
                "packsRoot cannot be set by clients".to_owned(),
            ));
        }
        if let Some(scenario) = &self.scenario
            && (scenario.is_empty()
                || scenario.contains(['/', '\\'])
                || scenario.contains(".."))
        {
            return Err(PlayerError::Validation(format!(
                "invalid scenario name: {scenario:?}"
            )));
        }
        Ok(())
    }
}

/// Clamps to `[0, 1]`; NaN becomes 0.
#[must_use]
pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_only_present_fields() {
        // Arrange
        let base = PlayerConfig::default();
        let overrides = ConfigOverrides::from_json(r#"{"scenario":"umae","volumeBgm":0.3}"#)
            .unwrap();

        // Act
        let merged = base.with_overrides(&overrides);

        // Assert
        assert_eq!(merged.scenario, "umae");
        assert!((merged.volume_bgm - 0.3).abs() < f64::EPSILON);
        assert_eq!(merged.packs_root, "packs");
        assert!((merged.volume_rse - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_boot_options_win_over_overrides() {
        let base = PlayerConfig::default().with_overrides(&ConfigOverrides {
            scenario: Some("from-file".into()),
            ..ConfigOverrides::default()
        });
        let options = BootOptions {
            scenario: Some("from-boot".into()),
            ..BootOptions::default()
        };

        let merged = base.with_boot_options(&options);

        assert_eq!(merged.scenario, "from-boot");
    }

    #[test]
    fn test_malformed_overrides_are_rejected() {
        let result = ConfigOverrides::from_json("{not json");
        assert!(matches!(result, Err(PlayerError::Validation(_))));
    }

    #[test]
    fn test_save_key_uses_configured_prefix() {
        let config = PlayerConfig {
            save_key_prefix: Some("umae_".into()),
            ..PlayerConfig::default()
        };
        assert_eq!(config.save_key(3), "umae_save_3");
    }

    #[test]
    fn test_save_key_derives_prefix_from_scenario_when_unset_or_empty() {
        let unset = PlayerConfig {
            scenario: "night".into(),
            ..PlayerConfig::default()
        };
        let empty = PlayerConfig {
            save_key_prefix: Some(String::new()),
            ..unset.clone()
        };

        assert_eq!(unset.save_key(1), "night_save_1");
        assert_eq!(empty.save_key(1), "night_save_1");
    }

    #[test]
    fn test_checked_save_key_rejects_out_of_range_slots() {
        let config = PlayerConfig::default();

        assert!(config.checked_save_key(0).is_err());
        assert!(config.checked_save_key(11).is_err());
        assert_eq!(config.checked_save_key(10).unwrap(), "demo_save_10");
    }

    #[test]
    fn test_effective_volume_multiplies_clamped_levels() {
        let config = PlayerConfig {
            volume_master: 0.5,
            volume_bgm: 2.0,
            volume_se: f64::NAN,
            ..PlayerConfig::default()
        };

        assert!((config.effective_volume(Channel::Bgm) - 0.5).abs() < f32::EPSILON);
        assert!(config.effective_volume(Channel::Se).abs() < f32::EPSILON);
    }

    #[test]
    fn test_clamp01_bounds() {
        assert!(clamp01(-1.0).abs() < f64::EPSILON);
        assert!((clamp01(1.5) - 1.0).abs() < f64::EPSILON);
        assert!(clamp01(f64::NAN).abs() < f64::EPSILON);
    }

    #[test]
    fn test_remote_boot_options_reject_packs_root() {
        let options = BootOptions {
            packs_root: Some("/etc".to_owned()),
            ..BootOptions::default()
        };

        assert!(matches!(
            options.validate_remote(),
            Err(PlayerError::Validation(_))
        ));
    }

    #[test]
    fn test_remote_boot_options_reject_path_like_scenarios() {
        for scenario in ["", "../umae", "a/b", "a\\b", ".."] {
            let options = BootOptions {
                scenario: Some(scenario.to_owned()),
                ..BootOptions::default()
            };

            assert!(options.validate_remote().is_err(), "accepted {scenario:?}");
        }
    }

    #[test]
    fn test_remote_boot_options_accept_plain_names() {
        let options = BootOptions {
            scenario: Some("night".to_owned()),
            save_key_prefix: Some("nv_".to_owned()),
            ..BootOptions::default()
        };

        assert!(options.validate_remote().is_ok());
        assert!(BootOptions::default().validate_remote().is_ok());
    }
}
