//! Level-up choices

use rand::Rng;
use serde::Serialize;

use super::player::{Passive, SurvivorPlayer};
use super::weapon::{MAX_WEAPON_LEVEL, MERGE_RULES, Weapon, WeaponKind, apply_merges};

/// Weapon slots available to the player
pub const MAX_WEAPONS: usize = 6;
/// Choices offered per level-up
pub const CHOICES_PER_LEVEL: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpgradeChoice {
    NewWeapon(WeaponKind),
    WeaponLevel(WeaponKind),
    Passive(Passive),
}

impl UpgradeChoice {
    pub fn label(&self) -> String {
        match self {
            UpgradeChoice::NewWeapon(k) => format!("New: {}", k.label()),
            UpgradeChoice::WeaponLevel(k) => format!("{} +1", k.label()),
            UpgradeChoice::Passive(p) => p.label().to_string(),
        }
    }
}

/// Every upgrade currently applicable to `player`
pub fn candidates(player: &SurvivorPlayer) -> Vec<UpgradeChoice> {
    let mut out = Vec::new();
    if player.weapons.len() < MAX_WEAPONS {
        out.extend(
            WeaponKind::OFFERABLE
                .into_iter()
                .filter(|k| !owns(player, *k) && !merged_away(player, *k))
                .map(UpgradeChoice::NewWeapon),
        );
    }
    out.extend(
        player
            .weapons
            .iter()
            .filter(|w| w.level < MAX_WEAPON_LEVEL)
            .map(|w| UpgradeChoice::WeaponLevel(w.kind)),
    );
    out.extend(
        Passive::ALL
            .into_iter()
            .filter(|p| player.passives.can_add(*p))
            .map(UpgradeChoice::Passive),
    );
    out
}

fn owns(player: &SurvivorPlayer, kind: WeaponKind) -> bool {
    player.weapons.iter().any(|w| w.kind == kind)
}

/// Whether `kind` was consumed by a merge the player already holds
fn merged_away(player: &SurvivorPlayer, kind: WeaponKind) -> bool {
    MERGE_RULES
        .iter()
        .any(|rule| (rule.a == kind || rule.b == kind) && owns(player, rule.result))
}

/// Draw up to `count` distinct choices
pub fn roll_choices<R: Rng>(player: &SurvivorPlayer, count: usize, rng: &mut R) -> Vec<UpgradeChoice> {
    let mut pool = candidates(player);
    let count = count.min(pool.len());
    // Partial Fisher-Yates
    for i in 0..count {
        let j = rng.random_range(i..pool.len());
        pool.swap(i, j);
    }
    pool.truncate(count);
    pool
}

/// Apply a choice, then merge any pair that now qualifies.
/// Returns the merged weapon kinds produced.
pub fn apply_choice(
    player: &mut SurvivorPlayer,
    choice: UpgradeChoice,
    merge_level: u32,
) -> Vec<WeaponKind> {
    match choice {
        UpgradeChoice::NewWeapon(kind) => {
            if player.weapons.len() < MAX_WEAPONS && !owns(player, kind) && !merged_away(player, kind) {
                player.weapons.push(Weapon::new(kind));
            }
        }
        UpgradeChoice::WeaponLevel(kind) => {
            if let Some(w) = player.weapons.iter_mut().find(|w| w.kind == kind) {
                w.level_up();
            }
        }
        UpgradeChoice::Passive(passive) => {
            if player.passives.add(passive) && passive == Passive::MaxHealth {
                player.max_health += 20.0;
                player.heal(20.0);
            }
        }
    }
    apply_merges(&mut player.weapons, merge_level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::SurvivorTuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_rolls_are_distinct() {
        let player = SurvivorPlayer::new(&SurvivorTuning::default());
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..50 {
            let choices = roll_choices(&player, CHOICES_PER_LEVEL, &mut rng);
            assert_eq!(choices.len(), 3);
            assert_ne!(choices[0], choices[1]);
            assert_ne!(choices[1], choices[2]);
            assert_ne!(choices[0], choices[2]);
        }
    }

    #[test]
    fn test_leveling_into_merge() {
        let t = SurvivorTuning::default();
        let mut player = SurvivorPlayer::new(&t);
        apply_choice(&mut player, UpgradeChoice::NewWeapon(WeaponKind::Laser), t.merge_level);
        apply_choice(&mut player, UpgradeChoice::NewWeapon(WeaponKind::Missiles), t.merge_level);
        for _ in 0..2 {
            apply_choice(&mut player, UpgradeChoice::WeaponLevel(WeaponKind::Laser), t.merge_level);
        }
        apply_choice(&mut player, UpgradeChoice::WeaponLevel(WeaponKind::Missiles), t.merge_level);
        let merged = apply_choice(
            &mut player,
            UpgradeChoice::WeaponLevel(WeaponKind::Missiles),
            t.merge_level,
        );
        assert_eq!(merged, vec![WeaponKind::HomingLaser]);
        let kinds: Vec<WeaponKind> = player.weapons.iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![WeaponKind::Basic, WeaponKind::HomingLaser]);
    }

    #[test]
    fn test_merge_sources_not_offered_after_merge() {
        let t = SurvivorTuning::default();
        let mut player = SurvivorPlayer::new(&t);
        player.weapons.push(Weapon::new(WeaponKind::HomingLaser));
        let offered = candidates(&player);
        assert!(!offered.contains(&UpgradeChoice::NewWeapon(WeaponKind::Laser)));
        assert!(!offered.contains(&UpgradeChoice::NewWeapon(WeaponKind::Missiles)));
        assert!(offered.contains(&UpgradeChoice::NewWeapon(WeaponKind::Lightning)));

        apply_choice(&mut player, UpgradeChoice::NewWeapon(WeaponKind::Laser), t.merge_level);
        assert!(player.weapons.iter().all(|w| w.kind != WeaponKind::Laser));
    }

    #[test]
    fn test_max_health_passive_heals() {
        let t = SurvivorTuning::default();
        let mut player = SurvivorPlayer::new(&t);
        player.health = 50.0;
        apply_choice(&mut player, UpgradeChoice::Passive(Passive::MaxHealth), t.merge_level);
        assert_eq!(player.max_health, 120.0);
        assert_eq!(player.health, 70.0);
    }

    #[test]
    fn test_merged_kinds_never_offered_new() {
        let player = SurvivorPlayer::new(&SurvivorTuning::default());
        assert!(candidates(&player).iter().all(|c| !matches!(
            c,
            UpgradeChoice::NewWeapon(k) if k.is_merged()
        )));
    }
}
