//! Data-driven game balance
//!
//! Every balance number lives here so it can be tuned from a JSON document
//! without touching simulation code. Partial documents are accepted; missing
//! fields keep their defaults.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::survivor::EnemyKind;

/// Complete tuning set for both games
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub runner: RunnerTuning,
    pub survivor: SurvivorTuning,
    pub quality: QualityTuning,
}

impl Tuning {
    /// Parse a (possibly partial) tuning document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Vibe Runner balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerTuning {
    /// Scroll speed at distance 0 (world units per step)
    pub base_speed: f32,
    pub max_speed: f32,
    /// Distance over which scroll speed ramps from base to max
    pub speed_ramp_distance: f32,
    /// Distance per difficulty level (patterns unlock by difficulty)
    pub difficulty_unit: f32,
    /// Traveled distance at which the first section is generated
    pub first_section_distance: f32,
    /// How far ahead of the player new sections start
    pub spawn_lead: f32,
    /// Obstacles further than this behind the player are dropped
    pub trailing_window: f32,
    /// Chance of using an authored pattern (when one is unlocked)
    pub pattern_chance: f32,
    /// Extra clearance on top of the player diameter every gap must keep
    pub safety_margin: f32,
    pub corridor: CorridorTuning,
    pub max_health: u32,
    pub invulnerability_steps: u32,
}

impl Default for RunnerTuning {
    fn default() -> Self {
        Self {
            base_speed: 5.0,
            max_speed: 9.5,
            speed_ramp_distance: 25_000.0,
            difficulty_unit: 1_000.0,
            first_section_distance: 40.0,
            spawn_lead: 900.0,
            trailing_window: 600.0,
            pattern_chance: 0.55,
            safety_margin: 16.0,
            corridor: CorridorTuning::default(),
            max_health: 3,
            invulnerability_steps: 90,
        }
    }
}

/// Procedural corridor shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorridorTuning {
    /// Gap height at distance 0
    pub gap_start: f32,
    /// Narrowest gap once fully ramped
    pub gap_min: f32,
    /// Wave amplitude of the corridor center at distance 0
    pub amplitude_start: f32,
    pub amplitude_max: f32,
    /// Distance over which gap and amplitude are interpolated (smoothstep)
    pub ramp_distance: f32,
    pub segment_width: f32,
    pub segment_count: u32,
    /// Phase advance per segment (radians)
    pub wave_frequency: f32,
    /// Minimum wall thickness kept at the world edges
    pub wall_min: f32,
    /// Spacing after the corridor before the next section
    pub post_spacing: f32,
    /// Chance per segment side of trying to add a hazard
    pub hazard_chance: f32,
}

impl Default for CorridorTuning {
    fn default() -> Self {
        Self {
            gap_start: 340.0,
            gap_min: 150.0,
            amplitude_start: 30.0,
            amplitude_max: 170.0,
            ramp_distance: 15_000.0,
            segment_width: 70.0,
            segment_count: 10,
            wave_frequency: 0.55,
            wall_min: 24.0,
            post_spacing: 220.0,
            hazard_chance: 0.35,
        }
    }
}

/// Vibe Survivor balance (all durations in ticks at 60 Hz unless noted)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurvivorTuning {
    pub player_speed: f32,
    pub player_radius: f32,
    pub player_max_health: f32,
    pub invulnerability_ticks: u32,
    pub dash_distance: f32,
    pub dash_cooldown_ticks: u32,
    pub dash_invulnerability_ticks: u32,
    /// Delay between lethal hit and the game-over state flip
    pub game_over_delay_ticks: u32,

    pub spawn_interval_start: f32,
    pub spawn_interval_min: f32,
    /// Interval reduction per elapsed second
    pub spawn_interval_decay: f32,
    pub max_enemies: usize,
    pub spawn_ring_radius: f32,
    /// (kind, unlock time in seconds, weight)
    pub spawn_table: Vec<SpawnEntry>,

    /// Enemy health multiplier gained per elapsed minute before the first boss dies
    pub health_per_minute: f32,
    pub damage_per_minute: f32,
    /// Geometric growth per boss defeated after the first
    pub post_boss_health_growth: f32,
    pub post_boss_damage_growth: f32,

    pub boss_spawn_secs: f32,
    pub boss_respawn_delay_secs: f32,
    pub boss_health: f32,
    pub boss_speed: f32,
    pub boss_damage: f32,
    pub boss_radius: f32,
    pub boss_health_multiplier: f32,
    pub boss_speed_multiplier: f32,
    pub boss_damage_multiplier: f32,
    pub boss_size_multiplier: f32,
    pub boss_defeat_ticks: u32,

    pub xp_base: f32,
    pub xp_growth: f32,
    pub orb_lifetime_ticks: u32,
    pub magnet_radius: f32,
    pub magnet_speed: f32,

    pub crit_chance_per_stack: f32,
    pub crit_multiplier: f32,
    /// Weapon level at which merge pairs combine
    pub merge_level: u32,
}

/// One row of the enemy spawn probability table
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpawnEntry {
    pub kind: EnemyKind,
    pub unlock_secs: f32,
    pub weight: u32,
}

impl Default for SurvivorTuning {
    fn default() -> Self {
        Self {
            player_speed: 3.0,
            player_radius: 15.0,
            player_max_health: 100.0,
            invulnerability_ticks: 60,
            dash_distance: 120.0,
            dash_cooldown_ticks: 90,
            dash_invulnerability_ticks: 20,
            game_over_delay_ticks: 60,

            spawn_interval_start: 90.0,
            spawn_interval_min: 18.0,
            spawn_interval_decay: 0.25,
            max_enemies: 150,
            spawn_ring_radius: 650.0,
            spawn_table: vec![
                SpawnEntry { kind: EnemyKind::Chase, unlock_secs: 0.0, weight: 40 },
                SpawnEntry { kind: EnemyKind::Dodge, unlock_secs: 30.0, weight: 20 },
                SpawnEntry { kind: EnemyKind::Tank, unlock_secs: 60.0, weight: 15 },
                SpawnEntry { kind: EnemyKind::Fly, unlock_secs: 90.0, weight: 15 },
                SpawnEntry { kind: EnemyKind::Teleport, unlock_secs: 150.0, weight: 10 },
            ],

            health_per_minute: 0.35,
            damage_per_minute: 0.2,
            post_boss_health_growth: 1.3,
            post_boss_damage_growth: 1.2,

            boss_spawn_secs: 300.0,
            boss_respawn_delay_secs: 60.0,
            boss_health: 3_000.0,
            boss_speed: 1.2,
            boss_damage: 25.0,
            boss_radius: 60.0,
            boss_health_multiplier: 1.6,
            boss_speed_multiplier: 1.08,
            boss_damage_multiplier: 1.35,
            boss_size_multiplier: 1.1,
            boss_defeat_ticks: 180,

            xp_base: 10.0,
            xp_growth: 1.25,
            orb_lifetime_ticks: 1_800,
            magnet_radius: 100.0,
            magnet_speed: 6.0,

            crit_chance_per_stack: 0.08,
            crit_multiplier: 2.0,
            merge_level: 3,
        }
    }
}

/// Adaptive quality thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityTuning {
    /// Rolling window length (frame samples)
    pub window: usize,
    /// Ticks between threshold checks
    pub check_interval: u32,
    pub low_fps: f32,
    pub high_fps: f32,
    /// Multiplier change per adjustment
    pub step: f32,
    /// Minimum time between adjustments (ms)
    pub cooldown_ms: f64,
    pub particle_floor: f32,
    pub shadow_floor: f32,
    pub trail_floor: f32,
    pub effect_floor: f32,
    /// Below this FPS the monitor may fall back to rendering every other frame
    pub critical_fps: f32,
    /// Consecutive critical checks before frame skipping engages
    pub critical_checks: u32,
    /// No frame skipping during the first part of a session (ms)
    pub frame_skip_grace_ms: f64,
}

impl Default for QualityTuning {
    fn default() -> Self {
        Self {
            window: 60,
            check_interval: 30,
            low_fps: 45.0,
            high_fps: 57.0,
            step: 0.1,
            cooldown_ms: 2_000.0,
            particle_floor: 0.2,
            shadow_floor: 0.0,
            trail_floor: 0.25,
            effect_floor: 0.3,
            critical_fps: 20.0,
            critical_checks: 3,
            frame_skip_grace_ms: 2_000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "runner": { "base_speed": 7.5 } }"#).unwrap();
        assert_eq!(tuning.runner.base_speed, 7.5);
        assert_eq!(tuning.runner.corridor.gap_min, CorridorTuning::default().gap_min);
        assert_eq!(tuning.survivor.spawn_table.len(), 5);
    }

    #[test]
    fn test_round_trip_document() {
        let json = Tuning::default().to_json().unwrap();
        let parsed = Tuning::from_json(&json).unwrap();
        assert_eq!(parsed.survivor.boss_spawn_secs, 300.0);
        assert_eq!(parsed.quality.window, 60);
    }

    #[test]
    fn test_invalid_document_is_error() {
        assert!(Tuning::from_json("{ not json").is_err());
    }
}
