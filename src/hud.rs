//! Read-only stats for the DOM HUD
//!
//! The simulation never touches DOM text. The host reads a snapshot each
//! frame and projects it into whatever elements it owns.

use serde::Serialize;

use crate::engine::game_loop::Phase;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub phase: Phase,
    pub health: f32,
    pub max_health: f32,
    pub level: u32,
    /// Progress toward the next level (0..1)
    pub xp_progress: f32,
    pub elapsed_secs: f32,
    pub distance: f32,
    pub score: u64,
    pub high_score: u64,
    /// Active weapon labels with their levels
    pub weapons: Vec<(String, u32)>,
    pub boss_kills: u32,
    pub fps: f32,
    pub quality_tier: u8,
    /// Upgrade labels waiting for a choice, empty outside level-up
    pub choices: Vec<String>,
}

impl Default for HudSnapshot {
    fn default() -> Self {
        Self {
            phase: Phase::Menu,
            health: 0.0,
            max_health: 0.0,
            level: 1,
            xp_progress: 0.0,
            elapsed_secs: 0.0,
            distance: 0.0,
            score: 0,
            high_score: 0,
            weapons: Vec::new(),
            boss_kills: 0,
            fps: 0.0,
            quality_tier: crate::engine::quality::MAX_TIER,
            choices: Vec::new(),
        }
    }
}

/// `mm:ss` clock for the elapsed-time readout
pub fn format_clock(secs: f32) -> String {
    let total = secs.max(0.0) as u32;
    format!("{:02}:{:02}", total / 60, total % 60)
}
