//! WebGPU rendering module
//!
//! Sessions are turned into flat-colored triangle batches on the CPU
//! (`scene`), then uploaded and drawn in one pass (`pipeline`).

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::{FrameBatch, FrameBuilder};
pub use vertex::Vertex;
