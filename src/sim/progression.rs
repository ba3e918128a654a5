//! Stage ladder and spawners
//!
//! Stage is a pure function of score. Everything that scales with
//! difficulty (enemy mix, stats, spawn cadence, bunker strength) reads it
//! through [`current_stage`].

use glam::Vec2;
use rand::Rng;

use super::entities::{BUNKER_PALETTE, Bunker, BunkerTier, Enemy, EnemyKind};
use super::random::RngExt;
use super::state::GameState;
use super::upgrades::UpgradeKind;
use crate::consts::*;
use crate::{clamp, clamp_i32};

/// Stage for a cumulative score
///
/// Stage 2 needs `FIRST_STAGE_SCORE`; each later stage needs a score jump
/// `STAGE_GROWTH` times larger than the previous one, up to `MAX_STAGE`.
pub fn current_stage(score: u64) -> u32 {
    let mut stage = 1;
    let mut delta = FIRST_STAGE_SCORE;
    let mut threshold = delta;

    while stage < MAX_STAGE && score >= threshold {
        stage += 1;
        delta = (delta as f64 * STAGE_GROWTH).floor() as u64;
        threshold += delta;
    }

    stage
}

/// Stage-gated enemy mix
pub fn pick_enemy_kind<R: Rng + ?Sized>(stage: u32, rng: &mut R) -> EnemyKind {
    let roll = rng.unit();
    if stage < 3 {
        return if roll < 0.8 {
            EnemyKind::Scout
        } else {
            EnemyKind::Zigzag
        };
    }
    if stage < 6 {
        return if roll < 0.5 {
            EnemyKind::Scout
        } else if roll < 0.75 {
            EnemyKind::Zigzag
        } else {
            EnemyKind::Diver
        };
    }
    if roll < 0.34 {
        EnemyKind::Scout
    } else if roll < 0.58 {
        EnemyKind::Zigzag
    } else if roll < 0.8 {
        EnemyKind::Diver
    } else {
        EnemyKind::Bruiser
    }
}

/// Chance that a spawned enemy is elite
pub fn elite_chance(stage: u32) -> f32 {
    clamp((stage as f32 - 8.0) * 0.012, 0.0, 0.22)
}

/// Enemies spawned per trigger
pub fn pack_size(stage: u32) -> usize {
    clamp_i32(1 + (stage / 12) as i32, 1, 4) as usize
}

/// Frames until the next spawn trigger
pub fn next_spawn_interval<R: Rng + ?Sized>(stage: u32, rng: &mut R) -> i32 {
    let base = 142.0 - stage as f32 * 1.2;
    clamp_i32(
        rng.irange((base - 18.0) as i32, (base + 14.0) as i32),
        42,
        170,
    )
}

/// Frames until an enemy fires again
pub fn enemy_fire_interval<R: Rng + ?Sized>(stage: u32, rng: &mut R) -> i32 {
    let stage = stage as f32;
    clamp_i32(
        rng.irange((132.0 - stage * 1.5) as i32, (178.0 - stage * 0.4) as i32),
        48,
        176,
    )
}

/// Spawn one enemy just past the leading screen edge
pub fn spawn_enemy(state: &mut GameState) {
    let stage = state.stage();
    let rng = &mut state.rng;
    let kind = pick_enemy_kind(stage, rng);
    let arch = kind.archetype();

    let corridor = state.terrain.corridor_at(WORLD_WIDTH - 12.0);
    let min_y = corridor.ceiling as i32 + 22;
    let max_y = corridor.floor as i32 - 22;
    let y = rng.irange(min_y, max_y.max(min_y + 4));

    let hp_ramp = 0.62 + stage as f32 * 0.065;
    let hp = (arch.hp_base + arch.hp_per_stage * hp_ramp).floor();
    let elite = rng.chance(elite_chance(stage));
    let size_scale = if elite { 1.22 } else { 1.0 };
    let hp = (hp * if elite { 1.42 } else { 1.0 }).floor();
    let fire_base = rng.irange(114, 156) - stage as i32;

    let w = (rng.irange(arch.width.0, arch.width.1) as f32 * size_scale).floor();
    let h = (rng.irange(arch.height.0, arch.height.1) as f32 * size_scale).floor();
    let value = ((arch.score_base + stage as u64 * 8) as f64 * if elite { 1.8 } else { 1.0 })
        .floor() as u64;
    let speed = (rng.frange(arch.speed.0, arch.speed.1) + stage as f32 * 0.022)
        * if elite { 1.04 } else { 1.0 };
    let wobble = rng.frange(0.0, std::f32::consts::TAU);
    let drift = rng.frange(arch.drift.0, arch.drift.1);
    let dive_armed = kind == EnemyKind::Diver && rng.unit() > 0.45;

    state.enemies.push(Enemy {
        kind,
        pos: Vec2::new(WORLD_WIDTH + 24.0, y as f32),
        w,
        h,
        hp,
        max_hp: hp,
        value,
        elite,
        speed,
        wobble,
        drift,
        dive_armed,
        fire_cooldown: clamp_i32(fire_base, 38, 170),
    });
}

/// Fixed 50/35/15 tier roll
pub fn pick_tier<R: Rng + ?Sized>(rng: &mut R) -> BunkerTier {
    let roll = rng.unit();
    if roll < 0.5 {
        BunkerTier::Small
    } else if roll < 0.85 {
        BunkerTier::Medium
    } else {
        BunkerTier::Large
    }
}

/// Try to place a bunker somewhere in columns `[col_min, col_max]`
///
/// Gives up after 80 attempts; columns with shallow floors and spots
/// crowding an existing bunker are rejected.
pub fn spawn_bunker_in_range(
    state: &mut GameState,
    col_min: usize,
    col_max: usize,
    stage: u32,
) -> bool {
    for _ in 0..80 {
        let col = state.rng.irange(col_min as i32, col_max as i32).max(0) as usize;
        let top = state.terrain.floor_top(col);
        let depth = WORLD_HEIGHT - top;
        if depth < 36.0 {
            continue;
        }

        let tier = pick_tier(&mut state.rng);
        let profile = tier.profile();
        let radius = state.rng.irange(profile.radius.0, profile.radius.1);
        let top_i = top as i32;
        let y = state.rng.irange(
            top_i + radius + 8,
            (WORLD_HEIGHT as i32 - radius - 8).min(top_i + (depth * 0.86).floor() as i32),
        );
        let hp = state.rng.irange(profile.hp_base, profile.hp_base + 8)
            + stage as i32 * profile.hp_per_stage;
        let x = col as f32 * CELL_W + CELL_W / 2.0;
        let carries = state.rng.chance(profile.upgrade_chance);

        let reach = radius as f32 * 3.0;
        let overlap = state
            .bunkers
            .iter()
            .any(|b| (b.pos.x - x).abs() < reach && (b.pos.y - y as f32).abs() < reach);
        if overlap {
            continue;
        }

        let upgrade = carries.then(|| UpgradeKind::roll(&mut state.rng));
        let color = BUNKER_PALETTE[state.rng.irange(0, BUNKER_PALETTE.len() as i32 - 1) as usize];
        state.bunkers.push(Bunker {
            pos: Vec2::new(x, y as f32),
            hp: hp as f32,
            max_hp: hp as f32,
            radius: radius as f32,
            tier,
            bounty: profile.bounty_base + stage as u64 * profile.bounty_per_stage,
            upgrade,
            color,
        });
        return true;
    }
    false
}

/// Initial bunker population for a level
///
/// Guarantees at least one bunker carries an upgrade.
pub fn place_bunkers(state: &mut GameState, stage: u32) {
    let count = 8 + stage as usize * 2;
    let col_max = state.terrain.len().saturating_sub(10);
    for _ in 0..count {
        spawn_bunker_in_range(state, 16, col_max, stage);
    }

    if !state.bunkers.is_empty() && !state.bunkers.iter().any(|b| b.upgrade.is_some()) {
        let idx = state.rng.irange(0, state.bunkers.len() as i32 - 1) as usize;
        let kind = UpgradeKind::roll(&mut state.rng);
        state.bunkers[idx].upgrade = Some(kind);
    }
}

/// Top the bunker population back up from the trailing columns
pub fn maintain_bunkers(state: &mut GameState, stage: u32) {
    if state.bunkers.len() >= TARGET_BUNKERS {
        return;
    }
    let len = state.terrain.len();
    let col_min = len.saturating_sub(44).max(18);
    let col_max = len.saturating_sub(8);
    spawn_bunker_in_range(state, col_min, col_max, stage);
}
