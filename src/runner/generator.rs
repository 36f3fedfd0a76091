//! Procedural level generation
//!
//! Content is built in sections ahead of the player. Once traveled distance
//! passes `next_obstacle_distance`, one section is emitted past the
//! build-head: either a hand-authored pattern (chosen at random among those
//! unlocked by difficulty) or a procedural corridor whose gap narrows and
//! whose wave grows with distance.
//!
//! Every placement keeps the corridor open. Side hazards are only added
//! after checking the space left in the gap; when there is not enough room
//! they are skipped, never squeezed in.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::WORLD_HEIGHT;
use super::obstacle::{GravityDir, Obstacle, PlayerMode, Portal, PortalKind, Side};
use super::safety::required_clearance;
use crate::engine::geometry::{Rect, lerp, smoothstep};
use crate::tuning::RunnerTuning;

/// Minimum spacing between consecutive sections
pub const SECTION_GAP: f32 = 150.0;

/// Spike corridor layout
pub const SPIKE_CORRIDOR_COUNT: usize = 10;
pub const SPIKE_CORRIDOR_SPACING: f32 = 80.0;
pub const SPIKE_CORRIDOR_WIDTH: f32 = 40.0;
pub const SPIKE_CORRIDOR_HEIGHT: f32 = 50.0;

/// Hand-authored section layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pattern {
    SpikeCorridor,
    SawGauntlet,
    GravityFlipZone,
    TripleSpike,
    MovingBlockMaze,
    RhythmSpikes,
    SawWave,
    CubeJump,
    ShipSection,
    DualPath,
}

impl Pattern {
    pub const ALL: [Pattern; 10] = [
        Pattern::SpikeCorridor,
        Pattern::SawGauntlet,
        Pattern::GravityFlipZone,
        Pattern::TripleSpike,
        Pattern::MovingBlockMaze,
        Pattern::RhythmSpikes,
        Pattern::SawWave,
        Pattern::CubeJump,
        Pattern::ShipSection,
        Pattern::DualPath,
    ];

    /// Difficulty at which the pattern enters the pool
    pub fn min_difficulty(self) -> f32 {
        match self {
            Pattern::SpikeCorridor => 1.0,
            Pattern::SawGauntlet | Pattern::TripleSpike | Pattern::CubeJump => 2.0,
            Pattern::GravityFlipZone | Pattern::RhythmSpikes => 3.0,
            Pattern::MovingBlockMaze | Pattern::ShipSection => 4.0,
            Pattern::SawWave => 5.0,
            Pattern::DualPath => 6.0,
        }
    }

    /// Distance added to the next generation threshold after this pattern
    pub fn post_spacing(self) -> f32 {
        match self {
            Pattern::SpikeCorridor => 900.0,
            Pattern::SawGauntlet => 800.0,
            Pattern::GravityFlipZone => 1300.0,
            Pattern::TripleSpike => 560.0,
            Pattern::MovingBlockMaze => 760.0,
            Pattern::RhythmSpikes => 880.0,
            Pattern::SawWave => 900.0,
            Pattern::CubeJump => 1100.0,
            Pattern::ShipSection => 1100.0,
            Pattern::DualPath => 760.0,
        }
    }

    pub fn unlocked(difficulty: f32) -> Vec<Pattern> {
        Self::ALL
            .into_iter()
            .filter(|p| difficulty >= p.min_difficulty())
            .collect()
    }
}

/// What the last `update` emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Pattern(Pattern),
    Corridor,
}

/// Generated content owned by the session
#[derive(Debug, Clone, Default)]
pub struct Level {
    pub obstacles: Vec<Obstacle>,
    pub portals: Vec<Portal>,
}

impl Level {
    pub fn clear(&mut self) {
        self.obstacles.clear();
        self.portals.clear();
    }

    /// Drop content that ended more than `window` behind `x`
    pub fn cull_behind(&mut self, x: f32, window: f32) {
        let limit = x - window;
        self.obstacles.retain(|o| o.max_x >= limit);
        self.portals.retain(|p| p.x >= limit);
    }
}

#[derive(Debug, Clone)]
pub struct ProceduralGenerator {
    tuning: RunnerTuning,
    player_radius: f32,
    build_head: f32,
    next_obstacle_distance: f32,
    sections: u32,
}

impl ProceduralGenerator {
    pub fn new(tuning: &RunnerTuning, player_radius: f32) -> Self {
        Self {
            tuning: tuning.clone(),
            player_radius,
            build_head: 0.0,
            next_obstacle_distance: tuning.first_section_distance,
            sections: 0,
        }
    }

    pub fn reset(&mut self) {
        self.build_head = 0.0;
        self.next_obstacle_distance = self.tuning.first_section_distance;
        self.sections = 0;
    }

    pub fn build_head(&self) -> f32 {
        self.build_head
    }

    pub fn next_obstacle_distance(&self) -> f32 {
        self.next_obstacle_distance
    }

    pub fn sections_generated(&self) -> u32 {
        self.sections
    }

    pub fn difficulty(&self, distance: f32) -> f32 {
        distance / self.tuning.difficulty_unit.max(1.0)
    }

    pub fn required_clearance(&self) -> f32 {
        required_clearance(self.player_radius, self.tuning.safety_margin)
    }

    /// Emit a section if `distance` has reached the scheduled threshold
    pub fn update<R: Rng>(
        &mut self,
        distance: f32,
        player_x: f32,
        rng: &mut R,
        level: &mut Level,
    ) -> Option<SectionKind> {
        if distance < self.next_obstacle_distance {
            return None;
        }
        let unlocked = Pattern::unlocked(self.difficulty(distance));
        if !unlocked.is_empty() && rng.random::<f32>() < self.tuning.pattern_chance {
            let pattern = unlocked[rng.random_range(0..unlocked.len())];
            self.generate_pattern(pattern, distance, player_x, rng, level);
            Some(SectionKind::Pattern(pattern))
        } else {
            self.generate_corridor(distance, player_x, rng, level);
            Some(SectionKind::Corridor)
        }
    }

    fn section_start(&self, player_x: f32) -> f32 {
        (self.build_head + SECTION_GAP).max(player_x + self.tuning.spawn_lead)
    }

    /// Build a specific pattern at the next section slot
    pub fn generate_pattern<R: Rng>(
        &mut self,
        pattern: Pattern,
        distance: f32,
        player_x: f32,
        rng: &mut R,
        level: &mut Level,
    ) {
        let start = self.section_start(player_x);
        let before = level.obstacles.len();
        let width = build_pattern(pattern, start, rng, level);
        self.build_head = start + width;
        self.next_obstacle_distance += pattern.post_spacing();
        self.sections += 1;
        log::debug!(
            "Section {}: {:?} at x={:.0} ({} obstacles, difficulty {:.2})",
            self.sections,
            pattern,
            start,
            level.obstacles.len() - before,
            self.difficulty(distance)
        );
    }

    /// Build a procedural corridor at the next section slot
    pub fn generate_corridor<R: Rng>(
        &mut self,
        distance: f32,
        player_x: f32,
        rng: &mut R,
        level: &mut Level,
    ) {
        let c = &self.tuning.corridor;
        let required = self.required_clearance();
        let start = self.section_start(player_x);

        let ramp = smoothstep(0.0, c.ramp_distance, distance);
        let gap = lerp(c.gap_start, c.gap_min, ramp).max(required);
        let amplitude = lerp(c.amplitude_start, c.amplitude_max, ramp);
        let half = gap * 0.5;
        let lowest = c.wall_min + half;
        let highest = (WORLD_HEIGHT - c.wall_min - half).max(lowest);
        // Adjacent segments must share at least `required` of open gap
        let max_shift = (gap - required).max(0.0);
        let phase = rng.random_range(0.0..std::f32::consts::TAU);

        let mut prev_center = WORLD_HEIGHT * 0.5;
        let mut skipped = 0;
        for i in 0..c.segment_count {
            let x = start + i as f32 * c.segment_width;
            let target = WORLD_HEIGHT * 0.5 + amplitude * (phase + i as f32 * c.wave_frequency).sin();
            let center = target
                .clamp(prev_center - max_shift, prev_center + max_shift)
                .clamp(lowest, highest);
            prev_center = center;

            let top_edge = center - half;
            let bottom_edge = center + half;
            level
                .obstacles
                .push(Obstacle::block(Rect::new(x, 0.0, c.segment_width, top_edge)));
            level.obstacles.push(Obstacle::block(Rect::new(
                x,
                bottom_edge,
                c.segment_width,
                WORLD_HEIGHT - bottom_edge,
            )));

            // Side hazards share the room left over after the player's clearance
            let mut available = gap - required;
            for side in [Side::Top, Side::Bottom] {
                if rng.random::<f32>() >= c.hazard_chance {
                    continue;
                }
                let mid = x + c.segment_width * 0.5;
                let edge = match side {
                    Side::Top => top_edge,
                    Side::Bottom => bottom_edge,
                };
                if rng.random_bool(0.3) {
                    let radius = (c.segment_width * 0.25).min(18.0);
                    if radius > available {
                        skipped += 1;
                        continue;
                    }
                    available -= radius;
                    level.obstacles.push(Obstacle::saw(Vec2::new(mid, edge), radius));
                } else {
                    let height = gap * rng.random_range(0.2..0.45);
                    if height > available {
                        skipped += 1;
                        continue;
                    }
                    available -= height;
                    let width = c.segment_width * 0.4;
                    level
                        .obstacles
                        .push(Obstacle::spike_at(mid - width * 0.5, edge, width, height, side));
                }
            }
        }

        let width = c.segment_count as f32 * c.segment_width;
        self.build_head = start + width;
        self.next_obstacle_distance += width + c.post_spacing;
        self.sections += 1;
        log::debug!(
            "Section {}: corridor at x={:.0} gap {:.0} amplitude {:.0} ({} hazards skipped)",
            self.sections,
            start,
            gap,
            amplitude,
            skipped
        );
    }
}

/// Append a pattern's content starting at `x0`. Returns the section width.
fn build_pattern<R: Rng>(pattern: Pattern, x0: f32, rng: &mut R, level: &mut Level) -> f32 {
    let obstacles = &mut level.obstacles;
    let portals = &mut level.portals;
    match pattern {
        Pattern::SpikeCorridor => {
            for i in 0..SPIKE_CORRIDOR_COUNT {
                let side = if i % 2 == 0 { Side::Top } else { Side::Bottom };
                obstacles.push(Obstacle::spike(
                    x0 + i as f32 * SPIKE_CORRIDOR_SPACING,
                    SPIKE_CORRIDOR_WIDTH,
                    SPIKE_CORRIDOR_HEIGHT,
                    side,
                ));
            }
            (SPIKE_CORRIDOR_COUNT - 1) as f32 * SPIKE_CORRIDOR_SPACING + SPIKE_CORRIDOR_WIDTH
        }
        Pattern::SawGauntlet => {
            let radius = 28.0;
            let high_first = rng.random_bool(0.5);
            for i in 0..5 {
                let high = (i % 2 == 0) == high_first;
                let y = if high { 170.0 } else { 430.0 };
                obstacles.push(Obstacle::saw(
                    Vec2::new(x0 + radius + i as f32 * 150.0, y),
                    radius,
                ));
            }
            4.0 * 150.0 + radius * 2.0
        }
        Pattern::TripleSpike => {
            for i in 0..3 {
                obstacles.push(Obstacle::spike(x0 + i as f32 * 40.0, 40.0, 60.0, Side::Bottom));
            }
            for i in 0..3 {
                obstacles.push(Obstacle::spike(
                    x0 + 280.0 + i as f32 * 40.0,
                    40.0,
                    60.0,
                    Side::Top,
                ));
            }
            400.0
        }
        Pattern::CubeJump => {
            portals.push(Portal::new(x0, PortalKind::Gravity(GravityDir::Down)));
            portals.push(Portal::new(x0, PortalKind::Mode(PlayerMode::Cube)));
            for i in 0..4 {
                let x = x0 + 120.0 + i as f32 * 240.0;
                let height = 30.0 + rng.random_range(0.0..15.0);
                obstacles.push(Obstacle::block(Rect::new(x, WORLD_HEIGHT - height, 60.0, height)));
            }
            portals.push(Portal::new(x0 + 960.0, PortalKind::Mode(PlayerMode::Ship)));
            980.0
        }
        Pattern::GravityFlipZone => {
            portals.push(Portal::new(x0, PortalKind::Gravity(GravityDir::Up)));
            for i in 0..6 {
                obstacles.push(Obstacle::spike(x0 + 80.0 + i as f32 * 90.0, 40.0, 45.0, Side::Top));
            }
            portals.push(Portal::new(x0 + 600.0, PortalKind::Gravity(GravityDir::Down)));
            for i in 0..6 {
                obstacles.push(Obstacle::spike(
                    x0 + 680.0 + i as f32 * 90.0,
                    40.0,
                    45.0,
                    Side::Bottom,
                ));
            }
            680.0 + 5.0 * 90.0 + 40.0
        }
        Pattern::RhythmSpikes => {
            for i in 0..8 {
                obstacles.push(Obstacle::pulsing_spike(
                    x0 + i as f32 * 100.0,
                    40.0,
                    70.0,
                    Side::Bottom,
                    0.08,
                    i as f32 * 0.8,
                ));
            }
            7.0 * 100.0 + 40.0
        }
        Pattern::MovingBlockMaze => {
            for i in 0..4 {
                let y = if i % 2 == 0 { 150.0 } else { 310.0 };
                let phase = rng.random_range(0.0..std::f32::consts::TAU);
                obstacles.push(Obstacle::moving_block(
                    Rect::new(x0 + i as f32 * 180.0, y, 50.0, 140.0),
                    60.0,
                    0.04,
                    phase,
                ));
            }
            3.0 * 180.0 + 50.0
        }
        Pattern::ShipSection => {
            portals.push(Portal::new(x0, PortalKind::Mode(PlayerMode::Ship)));
            for i in 0..6 {
                let x = x0 + 100.0 + i as f32 * 160.0;
                let rect = if i % 2 == 0 {
                    Rect::new(x, 0.0, 60.0, 220.0)
                } else {
                    Rect::new(x, WORLD_HEIGHT - 220.0, 60.0, 220.0)
                };
                obstacles.push(Obstacle::block(rect));
            }
            100.0 + 5.0 * 160.0 + 60.0
        }
        Pattern::SawWave => {
            let radius = 24.0;
            for i in 0..9 {
                let y = WORLD_HEIGHT * 0.5 + 160.0 * (i as f32 * 0.7).sin();
                obstacles.push(Obstacle::saw(
                    Vec2::new(x0 + radius + i as f32 * 90.0, y),
                    radius,
                ));
            }
            8.0 * 90.0 + radius * 2.0
        }
        Pattern::DualPath => {
            obstacles.push(Obstacle::block(Rect::new(x0, 270.0, 600.0, 60.0)));
            for x in [100.0, 300.0, 500.0] {
                obstacles.push(Obstacle::spike(x0 + x, 40.0, 60.0, Side::Top));
            }
            for x in [200.0, 400.0] {
                obstacles.push(Obstacle::spike(x0 + x, 40.0, 60.0, Side::Bottom));
            }
            600.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::PLAYER_RADIUS;
    use crate::runner::safety::first_blocked_column;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn generator() -> ProceduralGenerator {
        ProceduralGenerator::new(&RunnerTuning::default(), PLAYER_RADIUS)
    }

    #[test]
    fn test_unlock_thresholds() {
        assert!(Pattern::unlocked(0.99).is_empty());
        assert_eq!(Pattern::unlocked(1.0), vec![Pattern::SpikeCorridor]);
        assert_eq!(Pattern::unlocked(10.0).len(), Pattern::ALL.len());
        for p in Pattern::ALL {
            assert!(p.post_spacing() > 0.0);
        }
    }

    #[test]
    fn test_first_section_is_immediate() {
        let mut g = generator();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut level = Level::default();
        assert!(g.update(0.0, 150.0, &mut rng, &mut level).is_none());
        assert_eq!(
            g.update(40.0, 190.0, &mut rng, &mut level),
            Some(SectionKind::Corridor),
            "nothing is unlocked before difficulty 1"
        );
        assert!(!level.obstacles.is_empty());
        assert!(g.build_head() > 190.0);
    }

    #[test]
    fn test_every_pattern_leaves_room() {
        let mut rng = Pcg32::seed_from_u64(9);
        for pattern in Pattern::ALL {
            let mut g = generator();
            let mut level = Level::default();
            g.generate_pattern(pattern, 10_000.0, 0.0, &mut rng, &mut level);
            let start = level.obstacles.iter().map(|o| o.min_x).fold(f32::INFINITY, f32::min);
            let blocked = first_blocked_column(
                &level.obstacles,
                start,
                g.build_head(),
                4.0,
                g.required_clearance(),
            );
            assert_eq!(blocked, None, "{pattern:?} seals the corridor");
        }
    }

    #[test]
    fn test_corridor_narrows_with_distance() {
        let mut rng = Pcg32::seed_from_u64(3);
        let gap_at = |distance: f32, rng: &mut Pcg32| {
            let mut g = generator();
            let mut level = Level::default();
            g.generate_corridor(distance, 0.0, rng, &mut level);
            // First segment: top wall then bottom wall
            let top = level.obstacles[0].rects[0];
            let bottom = level.obstacles[1].rects[0];
            bottom.y - top.bottom()
        };
        let early = gap_at(0.0, &mut rng);
        let late = gap_at(50_000.0, &mut rng);
        assert!((early - 340.0).abs() < 1e-3);
        assert!((late - 150.0).abs() < 1e-3);
    }

    #[test]
    fn test_cull_behind() {
        let mut level = Level::default();
        level.obstacles.push(Obstacle::spike(0.0, 40.0, 50.0, Side::Top));
        level.obstacles.push(Obstacle::spike(1000.0, 40.0, 50.0, Side::Top));
        level.portals.push(Portal::new(10.0, PortalKind::Mode(PlayerMode::Cube)));
        level.cull_behind(800.0, 600.0);
        assert_eq!(level.obstacles.len(), 1);
        assert!(level.portals.is_empty());
    }
}
