//! Crate error type
//!
//! The simulation itself never fails; these cover the platform boundary
//! (storage, audio, render surface, tuning documents).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    /// Render target has no size yet (not attached or zero-sized container)
    #[error("render surface not ready ({width}x{height})")]
    SurfaceNotReady { width: u32, height: u32 },
    /// Key/value storage missing or refused the operation
    #[error("storage unavailable: {0}")]
    Storage(String),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Audio playback rejected (e.g. autoplay policy)
    #[error("audio playback failed: {0}")]
    Audio(String),
    #[error("render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, GameError>;
