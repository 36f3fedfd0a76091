//! Vertex format and palette

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Palette shared by both games
pub mod colors {
    pub const BACKGROUND: [f32; 4] = [0.02, 0.02, 0.06, 1.0];
    pub const GRID: [f32; 4] = [0.12, 0.1, 0.25, 0.5];

    pub const RUNNER_PLAYER: [f32; 4] = [0.0, 0.95, 1.0, 1.0];
    pub const SPIKE: [f32; 4] = [1.0, 0.2, 0.55, 1.0];
    pub const SAW: [f32; 4] = [1.0, 0.55, 0.1, 1.0];
    pub const BLOCK: [f32; 4] = [0.45, 0.3, 0.9, 1.0];
    pub const MOVING_BLOCK: [f32; 4] = [0.7, 0.35, 1.0, 1.0];
    pub const PORTAL_GRAVITY: [f32; 4] = [0.3, 1.0, 0.5, 0.7];
    pub const PORTAL_MODE: [f32; 4] = [1.0, 0.9, 0.2, 0.7];
    pub const WORLD_EDGE: [f32; 4] = [0.35, 0.2, 0.7, 1.0];

    pub const SURVIVOR_PLAYER: [f32; 4] = [0.2, 1.0, 0.6, 1.0];
    pub const CHASE: [f32; 4] = [1.0, 0.3, 0.3, 1.0];
    pub const DODGE: [f32; 4] = [1.0, 0.6, 0.2, 1.0];
    pub const TANK: [f32; 4] = [0.6, 0.2, 0.2, 1.0];
    pub const FLY: [f32; 4] = [0.9, 0.4, 1.0, 1.0];
    pub const TELEPORT: [f32; 4] = [0.3, 0.6, 1.0, 1.0];
    pub const BOSS: [f32; 4] = [1.0, 0.1, 0.4, 1.0];
    pub const PLAYER_SHOT: [f32; 4] = [1.0, 1.0, 0.6, 1.0];
    pub const ENEMY_SHOT: [f32; 4] = [1.0, 0.25, 0.1, 1.0];
    pub const LIGHTNING: [f32; 4] = [0.6, 0.85, 1.0, 1.0];
    pub const EXPLOSION: [f32; 4] = [1.0, 0.6, 0.2, 0.8];
    pub const XP_ORB: [f32; 4] = [0.3, 0.9, 1.0, 1.0];

    pub const HEALTH_BACK: [f32; 4] = [0.15, 0.0, 0.05, 0.8];
    pub const HEALTH_FILL: [f32; 4] = [1.0, 0.15, 0.35, 1.0];
    pub const FLASH: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    pub const DIM: [f32; 4] = [0.0, 0.0, 0.0, 0.55];
}

/// Same color with alpha scaled by `a`
pub fn with_alpha(color: [f32; 4], a: f32) -> [f32; 4] {
    [color[0], color[1], color[2], color[3] * a.clamp(0.0, 1.0)]
}
