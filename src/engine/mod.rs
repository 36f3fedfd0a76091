//! Game-agnostic engine pieces shared by both games
//!
//! Loop driving, pooling, quality scaling, camera and contact geometry.
//! Nothing in here knows about runners or survivors.

pub mod camera;
pub mod frame_monitor;
pub mod game_loop;
pub mod geometry;
pub mod particle;
pub mod pool;
pub mod quality;
pub mod timestep;

pub use camera::Camera;
pub use frame_monitor::FrameRateMonitor;
pub use game_loop::{
    FinalStats, FrameInput, FrameOutcome, GameLoop, Phase, Session, StepOutcome, StepPolicy,
    Viewport,
};
pub use pool::{Handle, Pool, Poolable};
pub use quality::{QualityController, QualityProfile};
pub use timestep::FixedTimestep;
