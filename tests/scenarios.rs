//! End-to-end scenarios through the public API

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use vibe_arcade::engine::game_loop::TICK_MS;
use vibe_arcade::engine::geometry::Rect;
use vibe_arcade::engine::{FrameOutcome, GameLoop, Phase, StepPolicy, Viewport};
use vibe_arcade::error::Result;
use vibe_arcade::platform::{KeyValueStore, MemoryStore};
use vibe_arcade::runner::generator::{SPIKE_CORRIDOR_COUNT, SPIKE_CORRIDOR_SPACING};
use vibe_arcade::runner::{
    Level, Obstacle, ObstacleKind, PLAYER_RADIUS, Pattern, ProceduralGenerator, RunnerState, Side,
    WORLD_HEIGHT,
};
use vibe_arcade::survivor::projectile::XpOrb;
use vibe_arcade::survivor::weapon::apply_merges;
use vibe_arcade::survivor::{SurvivorState, Weapon, WeaponKind};
use vibe_arcade::tuning::Tuning;

const VIEWPORT: Viewport = Viewport {
    width: 800,
    height: 600,
};

/// Store whose contents the test can still read after handing it to a loop
#[derive(Clone, Default)]
struct SharedStore(Rc<RefCell<MemoryStore>>);

impl KeyValueStore for SharedStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.0.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.0.borrow_mut().set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.0.borrow_mut().remove(key)
    }
}

#[test]
fn spike_corridor_at_first_unlock() {
    let tuning = Tuning::default();
    let mut generator = ProceduralGenerator::new(&tuning.runner, PLAYER_RADIUS);
    let mut rng = Pcg32::seed_from_u64(11);
    let mut level = Level::default();

    let distance = tuning.runner.difficulty_unit;
    assert_eq!(Pattern::unlocked(generator.difficulty(distance)), vec![Pattern::SpikeCorridor]);

    let threshold_before = generator.next_obstacle_distance();
    generator.generate_pattern(Pattern::SpikeCorridor, distance, 1_150.0, &mut rng, &mut level);

    assert_eq!(level.obstacles.len(), SPIKE_CORRIDOR_COUNT);
    for (i, spike) in level.obstacles.iter().enumerate() {
        assert_eq!(spike.kind, ObstacleKind::Spike);
        let expected = if i % 2 == 0 { Side::Top } else { Side::Bottom };
        assert_eq!(spike.side, Some(expected), "spike {i}");
    }
    for pair in level.obstacles.windows(2) {
        assert!((pair[1].min_x - pair[0].min_x - SPIKE_CORRIDOR_SPACING).abs() < 1e-3);
    }
    assert!(
        (generator.next_obstacle_distance() - threshold_before - Pattern::SpikeCorridor.post_spacing())
            .abs()
            < 1e-3
    );
}

#[test]
fn laser_and_missiles_merge_into_homing_laser() {
    let tuning = Tuning::default();
    let mut weapons = vec![
        Weapon::new(WeaponKind::Basic),
        Weapon::with_level(WeaponKind::Laser, 3),
        Weapon::with_level(WeaponKind::Missiles, 3),
    ];

    let produced = apply_merges(&mut weapons, tuning.survivor.merge_level);

    assert_eq!(produced, vec![WeaponKind::HomingLaser]);
    assert_eq!(weapons.len(), 2);
    assert!(weapons.iter().all(|w| w.kind != WeaponKind::Laser && w.kind != WeaponKind::Missiles));
    let merged = weapons
        .iter()
        .find(|w| w.kind == WeaponKind::HomingLaser)
        .expect("merged weapon present");
    assert_eq!(merged.level, 1);
    assert_eq!(merged.projectile_count(), 4);
}

#[test]
fn runner_game_over_records_high_score_and_restarts() {
    let tuning = Tuning::default();
    let store = SharedStore::default();
    let state = RunnerState::new(&tuning.runner, &tuning.quality, 5, 3);
    let mut lp = GameLoop::new(state, StepPolicy::fixed_60hz(), &tuning.quality)
        .with_high_score("runnerTest", Box::new(store.clone()));

    lp.start();
    assert_eq!(lp.phase(), Phase::Running);

    // Wall the whole world height just ahead of the player
    let x = lp.session().player.pos.x + 30.0;
    lp.session_mut()
        .level
        .obstacles
        .push(Obstacle::block(Rect::new(x, 0.0, 100_000.0, WORLD_HEIGHT)));

    let mut now = 0.0;
    let mut stopped = false;
    for _ in 0..5_000 {
        now += TICK_MS;
        if lp.tick(now, VIEWPORT) == FrameOutcome::Stopped {
            stopped = true;
            break;
        }
    }
    assert!(stopped, "run never ended");
    assert_eq!(lp.phase(), Phase::GameOver);

    let stats = lp.final_stats().cloned().expect("final stats recorded");
    assert!(stats.score > 0);
    assert!(stats.new_high_score);
    assert_eq!(
        store.get("runnerTest").unwrap(),
        Some(stats.score.to_string())
    );

    // Stopped loops ignore further frames
    assert_eq!(lp.tick(now + TICK_MS, VIEWPORT), FrameOutcome::Stopped);

    lp.start();
    assert_eq!(lp.phase(), Phase::Running);
    let session = lp.session();
    assert!(session.alive);
    assert_eq!(session.player.health, session.player.max_health);
    assert_eq!(session.distance, 0.0);
    assert!(lp.final_stats().is_none());
}

#[test]
fn survivor_level_up_freezes_until_chosen() {
    let tuning = Tuning::default();
    let state = SurvivorState::new(&tuning.survivor, &tuning.quality, 5, 9);
    let mut lp = GameLoop::new(state, StepPolicy::PerFrame, &tuning.quality);
    lp.start();

    let need = lp.session().player.xp_to_next(&tuning.survivor);
    let at = lp.session().player.pos;
    lp.session_mut().orbs.spawn(XpOrb {
        pos: at,
        value: need,
        life: 600,
    });

    let mut now = 0.0;
    now += TICK_MS;
    lp.tick(now, VIEWPORT);
    assert_eq!(lp.phase(), Phase::LevelUp);
    assert_eq!(lp.hud().choices.len(), 3);

    // Frozen while the choice is open
    let ticks = lp.session().ticks;
    for _ in 0..10 {
        now += TICK_MS;
        lp.tick(now, VIEWPORT);
    }
    assert_eq!(lp.session().ticks, ticks);

    assert!(lp.session_mut().choose_upgrade(1));
    now += TICK_MS;
    lp.tick(now, VIEWPORT);
    assert_eq!(lp.phase(), Phase::Running);
    now += TICK_MS;
    lp.tick(now, VIEWPORT);
    assert_eq!(lp.session().ticks, ticks + 1);
    assert_eq!(lp.session().player.level, 2);
}

#[test]
fn exit_is_total_and_idempotent() {
    let tuning = Tuning::default();
    let state = SurvivorState::new(&tuning.survivor, &tuning.quality, 5, 4);
    let mut lp = GameLoop::new(state, StepPolicy::PerFrame, &tuning.quality);
    lp.start();
    let mut now = 0.0;
    for _ in 0..600 {
        now += TICK_MS;
        lp.tick(now, VIEWPORT);
    }
    assert!(lp.session().ticks > 0);

    lp.exit();
    lp.exit();
    assert_eq!(lp.phase(), Phase::Menu);
    assert!(!lp.is_running());
    let session = lp.session();
    assert_eq!(session.ticks, 0);
    assert!(session.enemies.is_empty());
    assert_eq!(session.projectiles.active_count(), 0);
    assert_eq!(session.particles.active_count(), 0);
    assert_eq!(session.player.pos, Vec2::ZERO);
    assert_eq!(lp.tick(now + TICK_MS, VIEWPORT), FrameOutcome::Stopped);
}
