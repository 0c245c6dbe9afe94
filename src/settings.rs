//! Game settings and tunables
//!
//! Stored as JSON next to the binary. Every field has a default so partial
//! files load cleanly.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::platform::ClipId;

/// Throw feel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrowSettings {
    /// Scales gesture strength into impulse
    pub force_multiplier: f32,
    /// Upward component mixed into the throw direction
    pub loft_bias: f32,
    /// Ball counts as settled below this speed
    pub settle_speed: f32,
    /// Flight time budget (seconds)
    pub max_flight_secs: f32,
    /// Ball rest position relative to the camera anchor
    pub spawn_point: Vec3,
    /// Extra camera-relative offset added to the spawn point
    pub camera_offset: Vec3,
}

impl Default for ThrowSettings {
    fn default() -> Self {
        Self {
            force_multiplier: FORCE_MULTIPLIER,
            loft_bias: LOFT_BIAS,
            settle_speed: SETTLE_SPEED,
            max_flight_secs: MAX_FLIGHT_SECS,
            spawn_point: Vec3::ZERO,
            camera_offset: Vec3::new(0.0, -0.2, -0.5),
        }
    }
}

impl ThrowSettings {
    /// Where the resting ball sits relative to the camera
    pub fn rest_offset(&self) -> Vec3 {
        self.spawn_point + self.camera_offset
    }
}

/// Hoop placement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoopSettings {
    /// Added to the plane hit position
    pub offset: Vec3,
}

impl Default for HoopSettings {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 0.5, 0.0),
        }
    }
}

/// Celebration particles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSettings {
    /// Seconds between play and stop
    pub duration_secs: f32,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            duration_secs: PARTICLE_DURATION_SECS,
        }
    }
}

/// Audio
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
    pub pitch_min: f32,
    pub pitch_max: f32,
    /// Clip table indexed by cue: ground, hoop, score
    pub clips: Vec<ClipId>,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            pitch_min: PITCH_MIN,
            pitch_max: PITCH_MAX,
            clips: vec![ClipId(0), ClipId(1), ClipId(2)],
        }
    }
}

/// All game settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub throw: ThrowSettings,
    pub hoop: HoopSettings,
    pub particles: ParticleSettings,
    pub audio: AudioSettings,
    /// Seed for pitch variation
    pub seed: u64,
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("read settings {}", path.display()))?;
        let settings = serde_json::from_str(&json)
            .with_context(|| format!("parse settings {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings: {e:#}");
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("serialize settings")?;
        fs::write(path, json).with_context(|| format!("write settings {}", path.display()))?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "throw": { "force_multiplier": 0.5 }, "seed": 9 }"#)
                .unwrap();

        assert_eq!(settings.throw.force_multiplier, 0.5);
        assert_eq!(settings.throw.loft_bias, LOFT_BIAS);
        assert_eq!(settings.particles.duration_secs, PARTICLE_DURATION_SECS);
        assert_eq!(settings.audio.clips.len(), 3);
        assert_eq!(settings.seed, 9);
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("ar_hoops_settings_{}.json", std::process::id()));
        let mut settings = Settings::default();
        settings.hoop.offset = Vec3::new(0.0, 1.0, 0.25);
        settings.audio.muted = true;

        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded.hoop.offset, Vec3::new(0.0, 1.0, 0.25));
        assert!(loaded.audio.muted);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Settings::load_or_default(Path::new("/definitely/not/here.json"));
        assert_eq!(settings.throw.max_flight_secs, MAX_FLIGHT_SECS);
        assert!(Settings::load(Path::new("/definitely/not/here.json")).is_err());
    }
}
