//! Player ordnance: bomb drops per mode and the autonomous weapon volley

use glam::Vec2;

use super::entities::{Bomb, BombKind, BombParams, BombPhase, Shot, ShotKind};
use super::random::RngExt;
use super::state::{BombMode, GameState};
use super::upgrades::UpgradeKind;
use crate::audio::AudioCue;
use crate::clamp_i32;
use crate::consts::*;

/// Laser spread per weapon level as (y offset, vy offset)
const SHOT_PATTERNS: [&[(f32, f32)]; 4] = [
    &[(0.0, 0.0)],
    &[(-3.0, -0.16), (3.0, 0.16)],
    &[(-6.0, -0.24), (0.0, 0.0), (6.0, 0.24)],
    &[(-8.0, -0.3), (-2.0, -0.09), (2.0, 0.09), (8.0, 0.3)],
];

/// Vertical drifts of the shard fan
const SHARD_FAN: [f32; 4] = [-0.44, -0.16, 0.16, 0.44];

/// Blast of a full-size standard bomb at the current bomb level
pub fn base_blast(bomb_level: u8) -> f32 {
    BASE_BLAST * (1.0 + (bomb_level.max(1) - 1) as f32 * BLAST_PER_BOMB_LEVEL)
}

/// Materialize launch parameters, filling unset fields from the player
pub fn create_bomb(state: &GameState, params: BombParams) -> Bomb {
    let player = &state.player;
    Bomb {
        kind: params.kind,
        pos: params.pos.unwrap_or(player.pos + Vec2::splat(8.0)),
        vx_world: params
            .vx_world
            .unwrap_or(state.scroll_speed + 2.25 + player.vx * 0.6),
        vy: params.vy,
        blast: params.blast,
        phase: BombPhase::Air,
        runner_timer: 8,
        runner_steps: 0,
    }
}

fn launch(state: &mut GameState, params: BombParams) {
    let bomb = create_bomb(state, params);
    state.bombs_falling.push(bomb);
}

/// Drop a bomb salvo for the selected mode
///
/// Returns false when nothing was dropped (cooldown, empty stock, or the
/// mega gate still closed).
pub fn drop_bombs(state: &mut GameState) -> bool {
    if state.player.bomb_cooldown > 0 || state.is_game_over() {
        return false;
    }
    if !state.config.unlimited_bombs && state.bombs == 0 {
        return false;
    }
    if state.bomb_mode == BombMode::Mega && state.mega_cooldown > 0 {
        let secs = state.mega_cooldown as f32 / FRAMES_PER_SECOND as f32;
        state.show_toast(format!("Mega Cooldown {secs:.1}s"));
        return false;
    }
    if !state.config.unlimited_bombs {
        state.bombs -= 1;
    }

    let b = base_blast(state.upgrades.level(UpgradeKind::Bomb));
    match state.bomb_mode {
        BombMode::Mega => {
            state.player.bomb_cooldown = 26;
            state.mega_cooldown = MEGA_COOLDOWN;
            let vx_world = state.scroll_speed + 2.05 + state.player.vx * 0.55;
            launch(
                state,
                BombParams::new(BombKind::Mega, b * 2.45, 2.2).with_vx_world(vx_world),
            );
            state
                .bomb_queue
                .push(18, BombParams::new(BombKind::Cluster, b * 0.55, 1.5));
            state
                .bomb_queue
                .push(34, BombParams::new(BombKind::Runner, b * 0.7, 1.45));
        }
        BombMode::Cluster => {
            state.player.bomb_cooldown = 18;
            launch(state, BombParams::new(BombKind::Cluster, b * 0.9, 1.65));
            state
                .bomb_queue
                .push(10, BombParams::new(BombKind::Standard, b * 0.52, 1.45));
            state
                .bomb_queue
                .push(20, BombParams::new(BombKind::Standard, b * 0.52, 1.4));
        }
        BombMode::Runner => {
            state.player.bomb_cooldown = 14;
            launch(state, BombParams::new(BombKind::Runner, b * 0.95, 1.6));
            state
                .bomb_queue
                .push(12, BombParams::new(BombKind::Runner, b * 0.55, 1.45));
        }
        BombMode::Standard => {
            state.player.bomb_cooldown = 12;
            launch(state, BombParams::new(BombKind::Standard, b, 1.8));
            state
                .bomb_queue
                .push(9, BombParams::new(BombKind::Standard, b * 0.45, 1.4));
        }
    }

    state.cue(AudioCue::BombDrop);
    true
}

/// Bomblets scattered by a cluster bomb touching down at `pos`
pub fn scatter_bomblets(state: &mut GameState, pos: Vec2, blast: f32) {
    let count = 4 + state.upgrades.level(UpgradeKind::Chain) as usize;
    for _ in 0..count {
        let spread = state.rng.frange(-1.4, 1.6);
        let delay = state.rng.irange(2, 18);
        let at = Vec2::new(
            pos.x + state.rng.frange(-10.0, 10.0),
            pos.y - state.rng.frange(8.0, 20.0),
        );
        let vy = state.rng.frange(0.8, 1.5);
        let scale = state.rng.frange(0.24, 0.35);
        let params = BombParams::new(BombKind::Bomblet, blast * scale, vy)
            .at(at)
            .with_vx_world(state.scroll_speed + 1.1 + spread);
        state.bomb_queue.push(delay, params);
    }
}

/// Fire one autonomous volley
pub fn fire_volley(state: &mut GameState) {
    let weapon = state.upgrades.level(UpgradeKind::Weapon).max(1);
    let rapid = state.upgrades.level(UpgradeKind::Rapid);
    let chain = state.upgrades.level(UpgradeKind::Chain);
    let w = weapon as f32;

    let volley = state.volley_counter;
    state.volley_counter += 1;

    let shot_vx = 9.3 + w * 0.5 + rapid as f32 * 0.25;
    let origin = Vec2::new(
        state.player.pos.x + state.player.w / 2.0 - 2.0,
        state.player.pos.y - 1.0,
    );

    let pattern = SHOT_PATTERNS[(weapon as usize - 1).min(SHOT_PATTERNS.len() - 1)];
    for &(dy, dvy) in pattern {
        let mut shot = Shot::new(
            ShotKind::Laser,
            origin + Vec2::Y * dy,
            Vec2::new(shot_vx, dvy),
        );
        shot.damage = 10.0 + w * 2.0;
        shot.radius = 3.1;
        shot.life = 74;
        state.shots.push(shot);
    }

    if volley % 4 == 0 || weapon >= 3 {
        let mut shot = Shot::new(
            ShotKind::Pulse,
            origin + Vec2::X * 2.0,
            Vec2::new(shot_vx * 0.82, 0.0),
        );
        shot.damage = 16.0 + w * 4.0;
        shot.radius = 5.5;
        shot.life = 84;
        shot.pierce = 2;
        shot.wobble = state.rng.frange(0.0, std::f32::consts::TAU);
        shot.wobble_speed = 0.28;
        shot.split = u32::from(weapon >= 4);
        state.shots.push(shot);
        state.cue(AudioCue::PulseShot);
    } else {
        state.cue(AudioCue::Laser);
    }

    if weapon >= 2 && volley % 5 == 0 {
        let mut shot = Shot::new(
            ShotKind::Rocket,
            origin + Vec2::new(-1.0, -2.0),
            Vec2::new(6.6 + w * 0.45, -0.18),
        );
        shot.damage = 22.0 + w * 5.0;
        shot.radius = 4.2;
        shot.blast_radius = 42.0 + w * 5.0;
        shot.terrain_damage = 30.0 + w * 8.0;
        shot.life = 96;
        shot.homing = 0.045 + w * 0.006;
        state.shots.push(shot);
        state.cue(AudioCue::Rocket);
    }

    if weapon >= 3 && volley % 7 == 0 {
        for drift in SHARD_FAN {
            let mut shot = Shot::new(
                ShotKind::Shard,
                origin + Vec2::new(6.0, drift * 8.0),
                Vec2::new(shot_vx * 0.84, drift * 2.9),
            );
            shot.damage = 8.0 + w * 2.0;
            shot.radius = 2.5;
            shot.life = 54;
            state.shots.push(shot);
        }
    }

    if weapon >= 4 && volley % 11 == 0 {
        let mut shot = Shot::new(
            ShotKind::Blast,
            origin + Vec2::X * 4.0,
            Vec2::new(shot_vx * 0.76, 0.0),
        );
        shot.damage = 34.0 + w * 8.0;
        shot.radius = 7.5;
        shot.life = 62;
        shot.pierce = 3;
        shot.blast_radius = 58.0;
        shot.terrain_damage = 42.0;
        state.shots.push(shot);
        state.cue(AudioCue::BlastShot);
    }

    if chain > 0 && volley % chain_side_period(chain) == 0 {
        for (delay, dy, vy) in [(5, -5.0, -0.18), (9, 5.0, 0.18)] {
            let mut shot = Shot::new(
                ShotKind::Laser,
                origin + Vec2::new(1.0, dy),
                Vec2::new(shot_vx * 0.95, vy),
            );
            shot.damage = 8.0 + chain as f32 * 2.0;
            shot.radius = 2.8;
            shot.life = 50;
            state.shot_queue.push(delay, shot);
        }
    }
}

/// Volleys between chain side shots
pub fn chain_side_period(chain: u8) -> u64 {
    clamp_i32(12 - chain as i32 * 2, 5, 10) as u64
}

/// Frames between volleys
pub fn volley_cooldown(stage: u32, rapid: u8) -> i32 {
    (10 - (stage as f32 * 0.12).floor() as i32 - rapid as i32 * 2).max(4)
}

/// Fan of shards thrown when a splitting pulse shot first connects
pub fn spawn_split_shards(state: &mut GameState, pos: Vec2, power: f32) {
    let count = 4 + state.upgrades.level(UpgradeKind::Chain) as usize;
    for i in 0..count {
        let angle = -0.35 + (i as f32 / (count - 1).max(1) as f32) * 0.9;
        let mut shot = Shot::new(
            ShotKind::Shard,
            pos,
            Vec2::new(6.8 + angle.cos() * 2.3, angle.sin() * 2.6),
        );
        shot.damage = power * 0.42;
        shot.radius = 2.6;
        shot.life = 38;
        state.shots.push(shot);
    }
}
