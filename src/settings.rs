//! Game settings and preferences
//!
//! Persisted separately from high scores as JSON in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::engine::quality::MAX_TIER;
use crate::error::Result;
use crate::platform::KeyValueStore;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    Medium,
    #[default]
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Starting tier for the adaptive controller
    pub fn initial_tier(&self) -> u8 {
        match self {
            QualityPreset::Low => 2,
            QualityPreset::Medium => 4,
            QualityPreset::High => MAX_TIER,
        }
    }
}

/// Cosmetic toggles handed to a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effects {
    pub screen_shake: bool,
    pub particles: bool,
    pub trails: bool,
}

impl Default for Effects {
    fn default() -> Self {
        Self {
            screen_shake: true,
            particles: true,
            trails: true,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Let frame rate drive the quality tier
    pub adaptive_quality: bool,

    // === Visual Effects ===
    /// Screen shake on hits and explosions
    pub screen_shake: bool,
    /// Player and projectile trails
    pub trails: bool,
    /// Particle effects
    pub particles: bool,

    // === HUD ===
    pub show_fps: bool,

    // === Audio ===
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (minimize shake, flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::High,
            adaptive_quality: true,

            screen_shake: true,
            trails: true,
            particles: true,

            show_fps: false,

            music_volume: 0.5,
            muted: false,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "vibeArcadeSettings";

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    pub fn effects(&self) -> Effects {
        Effects {
            screen_shake: self.effective_screen_shake(),
            particles: self.particles,
            trails: self.trails,
        }
    }

    /// Effective music volume (respects mute)
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.music_volume.clamp(0.0, 1.0)
        }
    }

    /// Load settings, falling back to defaults when absent or unreadable
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from storage");
                    settings
                }
                Err(e) => {
                    log::warn!("Discarding unreadable settings: {e}");
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Failed to read settings: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        let json = serde_json::to_string(self)?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
