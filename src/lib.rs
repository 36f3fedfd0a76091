//! Vibe Arcade - shared engine for the Vibe Runner and Vibe Survivor games
//!
//! Core modules:
//! - `engine`: Game loop, fixed timestep, object pools, adaptive quality, camera
//! - `runner`: Endless side-scroller simulation and procedural generation
//! - `survivor`: Top-down horde shooter simulation
//! - `renderer`: Vertex building and the WebGPU presenter
//! - `platform`: Browser/native platform abstraction
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod engine;
pub mod error;
pub mod highscores;
pub mod hud;
pub mod platform;
pub mod renderer;
pub mod runner;
pub mod settings;
pub mod survivor;
pub mod tuning;

pub use error::{GameError, Result};
pub use highscores::HighScore;
pub use settings::{QualityPreset, Settings};

/// Host configuration constants
pub mod consts {
    /// Canvas element the renderer draws into
    pub const CANVAS_ID: &str = "canvas";
    /// `<audio>` element holding the background track
    pub const MUSIC_ID: &str = "music";
    /// Container for the DOM HUD
    pub const HUD_ID: &str = "hud";

    /// Minimum time between idle compaction requests (ms)
    pub const COMPACTION_INTERVAL_MS: f64 = 5_000.0;
}

/// Which game a session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameKind {
    Runner,
    Survivor,
}

impl GameKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Runner => "runner",
            GameKind::Survivor => "survivor",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "runner" | "vibe-runner" => Some(GameKind::Runner),
            "survivor" | "vibe-survivor" => Some(GameKind::Survivor),
            _ => None,
        }
    }

    /// Storage key for this game's high score
    pub fn high_score_key(&self) -> &'static str {
        match self {
            GameKind::Runner => highscores::RUNNER_KEY,
            GameKind::Survivor => highscores::SURVIVOR_KEY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_kind_parse() {
        assert_eq!(GameKind::parse("Runner"), Some(GameKind::Runner));
        assert_eq!(GameKind::parse(" vibe-survivor "), Some(GameKind::Survivor));
        assert_eq!(GameKind::parse("pong"), None);
        assert_ne!(
            GameKind::Runner.high_score_key(),
            GameKind::Survivor.high_score_key()
        );
    }
}
