//! Fixed timestep simulation tick
//!
//! One call advances the run by one frame (1/60 s). Systems run in a fixed
//! order; every pool is iterated back to front so removals never skip an
//! element.

use glam::Vec2;

use super::collision::{
    Margins, drop_touches_player, enemy_touches_player, off_screen, projectile_hits_player,
    shot_hits_enemy,
};
use super::damage::{
    apply_blast_damage, apply_shot_splash, explode_bomb, hit_enemy, pulse_cooldown,
    trigger_pulse_blast, update_combo,
};
use super::effects::{colors, update_ambient};
use super::entities::{BombKind, BombPhase, EnemyKind, EnemyProjectile, ShotKind};
use super::progression::{enemy_fire_interval, maintain_bunkers, next_spawn_interval, pack_size, spawn_enemy};
use super::random::RngExt;
use super::state::{BombMode, GameEvent, GameOverReason, GamePhase, GameState, Player};
use super::upgrades::{UpgradeKind, UpgradeOutcome, upgrade_toast};
use super::weapons::{create_bomb, drop_bombs, fire_volley, scatter_bomblets, spawn_split_shards, volley_cooldown};
use crate::audio::AudioCue;
use crate::clamp;
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held direction flags
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Bomb key held
    pub bomb: bool,
    /// Bomb mode chosen this frame (number keys)
    pub select_mode: Option<BombMode>,
    /// Restart the run (edge)
    pub reset: bool,
    /// Pause toggle (edge)
    pub pause: bool,
    /// Idle/demo mode - the autopilot flies
    pub idle_mode: bool,
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput) {
    if input.reset {
        log::info!("Run reset at score {}", state.score);
        state.reset();
    }

    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            // Nothing to pause once the run is over
            GamePhase::GameOver => {}
        }
    }

    if let Some(mode) = input.select_mode {
        if mode != state.bomb_mode {
            log::debug!("Bomb mode {} -> {}", state.bomb_mode.as_str(), mode.as_str());
            state.bomb_mode = mode;
        }
    }

    match state.phase {
        GamePhase::Paused => return,
        GamePhase::GameOver => {
            update_ambient(state);
            return;
        }
        GamePhase::Playing => {}
    }

    state.time_ticks += 1;

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(state, &mut input);
    }

    update_player(state, &input);
    scroll_world(state);
    update_enemies(state);
    update_shots(state);
    update_enemy_projectiles(state);
    update_upgrade_drops(state);
    update_bombs(state);
    update_ambient(state);
    update_pulse(state);
    update_combo(state);

    if state.score > state.high_score {
        state.high_score = state.score;
        state.emit(GameEvent::HighScore(state.high_score));
    }

    let stage = state.stage();
    if stage != state.last_stage {
        log::info!("Stage {} reached at score {}", stage, state.score);
        state.last_stage = stage;
        state.emit(GameEvent::StageChanged(stage));
    }
}

/// Movement, clamping, cooldowns, bombing and the autonomous volley
fn update_player(state: &mut GameState, input: &TickInput) {
    let stage = state.stage();
    let player = &mut state.player;
    let start_x = player.pos.x;

    if input.left {
        player.pos.x -= player.speed;
    }
    if input.right {
        player.pos.x += player.speed;
    }
    if input.up {
        player.pos.y -= player.speed * 0.9;
    }
    if input.down {
        player.pos.y += player.speed * 0.9;
    }

    player.pos.x = clamp(player.pos.x, player.w / 2.0, WORLD_WIDTH - player.w / 2.0);
    let corridor = state.terrain.corridor_at(player.pos.x);
    player.pos.y = clamp(
        player.pos.y,
        corridor.ceiling + player.h / 2.0 + 4.0,
        corridor.floor - player.h / 2.0 - 4.0,
    );
    player.vx = player.pos.x - start_x;

    if player.bomb_cooldown > 0 {
        player.bomb_cooldown -= 1;
    }
    if player.invuln_timer > 0 {
        player.invuln_timer -= 1;
    }

    if input.bomb {
        drop_bombs(state);
    }

    if state.player.shot_cooldown > 0 {
        state.player.shot_cooldown -= 1;
    } else {
        fire_volley(state);
        state.player.shot_cooldown =
            volley_cooldown(stage, state.upgrades.level(UpgradeKind::Rapid));
    }
}

/// Scroll terrain and bunkers; charge for bunkers that got away
fn scroll_world(state: &mut GameState) {
    let stage = state.stage();
    let speed = state.scroll_speed;
    state.terrain.advance(speed, stage, &mut state.rng);

    for bunker in &mut state.bunkers {
        bunker.pos.x -= speed;
    }
    let before = state.bunkers.len();
    state.bunkers.retain(|b| b.pos.x >= -20.0);
    let escaped = before - state.bunkers.len();
    for _ in 0..escaped {
        state.deduct_score(BUNKER_ESCAPE_PENALTY);
    }

    maintain_bunkers(state, stage);
}

/// Absorb a hit with a shield charge if one is left
fn absorb_with_shield(state: &mut GameState, ring_radius: f32, ring_life: i32) -> bool {
    let Some(left) = state.upgrades.consume_shield() else {
        return false;
    };
    state.spawn_shockwave(state.player.pos, ring_radius, ring_life, colors::SHIELD_RING);
    state.show_toast(if left > 0 { "Shield Hit" } else { "Shield Down" });
    state.cue(AudioCue::Hit);
    true
}

/// Lose a life, ending the run when none are left
fn lose_life(state: &mut GameState, reason: &str) {
    if state.is_game_over() || state.player.is_invulnerable() {
        return;
    }

    state.lives = state.lives.saturating_sub(1);
    let pos = state.player.pos;
    state.spawn_explosion(pos, colors::PLAYER_DEATH, 68);
    state.spawn_shockwave(pos, 84.0, 20, colors::PLAYER_RING);

    if state.lives == 0 {
        state.spawn_final_burst();
        state.cue(AudioCue::GameOver);
        state.end_run(
            GameOverReason::LivesExhausted,
            format!("{reason} No lives left. Press R to retry."),
        );
        return;
    }

    state.cue(AudioCue::LifeLost);
    state.player.invuln_timer = HIT_INVULN;
    state.show_toast(format!("Life Lost - {} left", state.lives));
}

fn update_enemies(state: &mut GameState) {
    let stage = state.stage();

    state.enemy_spawn_timer -= 1;
    if state.enemy_spawn_timer <= 0 {
        for _ in 0..pack_size(stage) {
            spawn_enemy(state);
        }
        state.enemy_spawn_timer = next_spawn_interval(stage, &mut state.rng);
    }

    let scroll = state.scroll_speed;
    let mut i = state.enemies.len();
    while i > 0 {
        i -= 1;
        let player_pos = state.player.pos;

        let enemy = &mut state.enemies[i];
        enemy.pos.x -= enemy.speed + scroll * 0.2;
        enemy.wobble += enemy.drift * 0.04;
        enemy.pos.y += match enemy.kind {
            EnemyKind::Scout => enemy.wobble.sin() * 0.65,
            EnemyKind::Bruiser => (enemy.wobble * 0.6).sin() * 0.22,
            EnemyKind::Diver => (enemy.wobble * 0.9).sin() * 0.45,
            EnemyKind::Zigzag => (enemy.wobble * 1.8).sin() * 1.15,
        };
        if enemy.kind == EnemyKind::Diver
            && enemy.dive_armed
            && enemy.pos.x < WORLD_WIDTH * 0.72
        {
            enemy.pos.y += (player_pos.y - enemy.pos.y) * 0.04;
        }

        let corridor = state.terrain.corridor_at(enemy.pos.x);
        enemy.pos.y = clamp(enemy.pos.y, corridor.ceiling + 14.0, corridor.floor - 14.0);

        if stage >= 9 && enemy.pos.x < WORLD_WIDTH - 70.0 {
            enemy.fire_cooldown -= 1;
            if enemy.fire_cooldown <= 0 {
                let (from, elite) = (enemy.pos, enemy.elite);
                let rng = &mut state.rng;
                let target = player_pos + Vec2::new(rng.frange(-14.0, 14.0), rng.frange(-10.0, 10.0));
                let speed = 1.9 + stage as f32 * 0.04 + if elite { 0.3 } else { 0.0 };
                let dir = (target - from).try_normalize().unwrap_or(Vec2::X);
                state.enemy_projectiles.push(EnemyProjectile {
                    pos: from,
                    vel: dir * speed,
                    life: 220,
                    elite,
                });
                state.enemies[i].fire_cooldown = enemy_fire_interval(stage, &mut state.rng);
            }
        }

        if !state.player.is_invulnerable() && enemy_touches_player(&state.enemies[i], &state.player) {
            let crashed = state.enemies.remove(i);
            if !absorb_with_shield(state, 44.0, 14) {
                lose_life(state, "Hit.");
                state.spawn_explosion(crashed.pos, colors::ENEMY_CRASH, 28);
            }
            state.spawn_explosion(crashed.pos, colors::ENEMY_CRASH, 20);
            continue;
        }

        if state.enemies[i].pos.x < -40.0 {
            state.enemies.remove(i);
        }
    }
}

fn update_shots(state: &mut GameState) {
    for shot in state.shot_queue.drain_due() {
        state.shots.push(shot);
    }

    let mut i = state.shots.len();
    while i > 0 {
        i -= 1;

        let mut shot = state.shots[i];
        shot.life -= 1;
        if shot.life <= 0 {
            state.shots.remove(i);
            continue;
        }

        match shot.kind {
            ShotKind::Pulse => {
                shot.wobble += shot.wobble_speed;
                shot.pos.y += shot.wobble.sin() * 0.75;
            }
            ShotKind::Rocket => {
                let target = state
                    .enemies
                    .iter()
                    .filter(|e| e.pos.x >= shot.pos.x - 10.0)
                    .map(|e| (e.pos.distance(shot.pos), e.pos.y))
                    .filter(|(d, _)| *d < 180.0)
                    .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
                if let Some((_, target_y)) = target {
                    shot.vel.y += clamp((target_y - shot.pos.y) * shot.homing, -0.26, 0.26);
                }
                shot.vel.y *= 0.97;
            }
            _ => {}
        }
        shot.pos += shot.vel;
        state.shots[i] = shot;

        let mut spent = false;
        let mut ei = state.enemies.len();
        while ei > 0 {
            ei -= 1;
            let shot = state.shots[i];
            if !shot_hits_enemy(&shot, &state.enemies[ei]).hit {
                continue;
            }

            state.spawn_float_text(
                shot.pos + Vec2::new(2.0, -4.0),
                format!("{}", shot.damage.floor()),
                colors::HIT_TEXT,
                11.0,
                16,
            );
            hit_enemy(state, ei, shot.damage);

            if shot.kind.detonates() {
                apply_shot_splash(state, &shot, shot.pos, 0.56);
                let color = if shot.kind == ShotKind::Blast { 0xffd882 } else { 0xffb978 };
                state.spawn_explosion(shot.pos, color, 22);
                spent = true;
            } else if shot.kind == ShotKind::Pulse && shot.split > 0 {
                spawn_split_shards(state, shot.pos, shot.damage);
                state.shots[i].split = 0;
            }

            if !spent {
                let live = &mut state.shots[i];
                if live.pierce > 0 {
                    live.pierce -= 1;
                } else {
                    spent = true;
                }
            }
            if spent {
                break;
            }
        }

        let margins = Margins {
            left: 20.0,
            right: 30.0,
            top: 20.0,
            bottom: 20.0,
        };
        if spent || off_screen(state.shots[i].pos, margins) {
            state.shots.remove(i);
        }
    }
}

fn update_enemy_projectiles(state: &mut GameState) {
    let drift = state.scroll_speed * 0.2;
    let mut i = state.enemy_projectiles.len();
    while i > 0 {
        i -= 1;
        let p = &mut state.enemy_projectiles[i];
        p.pos += Vec2::new(p.vel.x - drift, p.vel.y);
        p.life -= 1;

        if !state.player.is_invulnerable() && projectile_hits_player(p, &state.player) {
            state.enemy_projectiles.remove(i);
            if !absorb_with_shield(state, 40.0, 12) {
                lose_life(state, "Shot down.");
            }
            continue;
        }

        let p = &state.enemy_projectiles[i];
        if p.life <= 0 || off_screen(p.pos, Margins::uniform(18.0)) {
            state.enemy_projectiles.remove(i);
        }
    }
}

/// Collect an upgrade: level up or pay the overflow bonus
pub fn collect_upgrade(state: &mut GameState, kind: UpgradeKind) {
    state.cue(AudioCue::Pickup);
    let outcome = state.upgrades.apply(kind);
    match outcome {
        UpgradeOutcome::Overflow(bonus) => state.add_score(bonus),
        UpgradeOutcome::Leveled(level) => {
            if kind == UpgradeKind::Speed {
                state.player.speed = Player::speed_for_level(level);
            }
        }
    }
    log::debug!("Upgrade {:?}: {:?} ({})", kind, outcome, state.upgrades.summary());
    state.show_toast(upgrade_toast(kind, outcome));
}

fn update_upgrade_drops(state: &mut GameState) {
    let magnet = state.upgrades.level(UpgradeKind::Magnet) as f32;
    let scroll = state.scroll_speed;
    let player_pos = state.player.pos;

    let mut i = state.upgrade_drops.len();
    while i > 0 {
        i -= 1;
        let drop = &mut state.upgrade_drops[i];
        drop.pos.x -= scroll * 0.9;
        drop.bob_phase += 0.08;
        drop.pos.y += drop.bob_phase.sin() * 0.45;

        if magnet > 0.0 {
            let pull_radius = 80.0 + magnet * 36.0;
            let to_player = player_pos - drop.pos;
            let dist = to_player.length();
            if dist < pull_radius && dist > 0.001 {
                let pull = (magnet * 0.4 + 0.3) * (1.0 - dist / pull_radius);
                drop.pos += to_player / dist * pull * 6.0;
            }
        }

        if drop_touches_player(drop, &state.player, magnet * 4.0) {
            let drop = state.upgrade_drops.remove(i);
            collect_upgrade(state, drop.kind);
            state.spawn_explosion(drop.pos, colors::PICKUP, 30);
            continue;
        }

        if state.upgrade_drops[i].pos.x < -18.0 {
            state.upgrade_drops.remove(i);
        }
    }
}

fn update_bombs(state: &mut GameState) {
    if state.mega_cooldown > 0 {
        state.mega_cooldown -= 1;
    }
    for params in state.bomb_queue.drain_due() {
        let bomb = create_bomb(state, params);
        state.bombs_falling.push(bomb);
    }

    let scroll = state.scroll_speed;
    let mut i = state.bombs_falling.len();
    while i > 0 {
        i -= 1;
        let mut b = state.bombs_falling[i];

        if b.phase == BombPhase::Runner {
            b.pos.x += b.vx_world + 1.6 - scroll;
            b.runner_timer -= 1;
            if b.runner_timer <= 0 {
                b.runner_timer = 7;
                b.runner_steps += 1;
                let burst = b.blast * (0.33 + (b.runner_steps as f32 * 0.03).min(0.22));
                apply_blast_damage(state, b.pos, burst, 4.0);
                state.spawn_explosion(b.pos, 0xff9c5e, 24);
                state.spawn_shockwave(b.pos, burst * 0.72, 12, 0xffd19f);
            }

            if b.runner_steps >= 6 || b.pos.x > WORLD_WIDTH + 28.0 {
                explode_bomb(state, b.pos, b.blast * 0.85);
                state.bombs_falling.remove(i);
            } else {
                state.bombs_falling[i] = b;
            }
            continue;
        }

        b.vx_world = (scroll * 0.95).max(b.vx_world * 0.997);
        b.vy += BOMB_GRAVITY;
        b.pos.x += b.vx_world - scroll;
        b.pos.y += b.vy;

        let col = state.terrain.column_at_screen_x(b.pos.x);
        let top = state.terrain.floor_top(col);

        if b.pos.y >= top {
            let impact = Vec2::new(b.pos.x, top);
            match b.kind {
                BombKind::Runner => {
                    b.phase = BombPhase::Runner;
                    b.pos.y = top + 4.0;
                    b.runner_timer = 6;
                    b.runner_steps = 0;
                    state.bombs_falling[i] = b;
                    state.spawn_shockwave(impact, 36.0, 10, 0xffd8a5);
                }
                BombKind::Cluster => {
                    state.bombs_falling.remove(i);
                    scatter_bomblets(state, b.pos, b.blast);
                    state.spawn_explosion(impact, 0xffbf6f, 40);
                    state.spawn_shockwave(impact, b.blast * 0.7, 14, 0xffe7bf);
                }
                BombKind::Standard | BombKind::Mega | BombKind::Bomblet => {
                    state.bombs_falling.remove(i);
                    explode_bomb(state, impact, b.blast);
                }
            }
            continue;
        }

        if b.pos.y > WORLD_HEIGHT + 2.0 || b.pos.x < -6.0 {
            state.bombs_falling.remove(i);
        } else {
            state.bombs_falling[i] = b;
        }
    }

    let out_of_bombs = !state.config.unlimited_bombs
        && state.bombs == 0
        && state.bombs_falling.is_empty()
        && state.bomb_queue.is_empty()
        && !state.bunkers.is_empty();
    if out_of_bombs && !state.is_game_over() {
        state.cue(AudioCue::GameOver);
        state.end_run(
            GameOverReason::BombsExhausted,
            "No bombs left. Press R to retry.".to_string(),
        );
    }
}

fn update_pulse(state: &mut GameState) {
    let level = state.upgrades.level(UpgradeKind::Pulse);
    if level == 0 || state.is_game_over() {
        return;
    }
    if state.pulse_cooldown > 0 {
        state.pulse_cooldown -= 1;
        return;
    }
    trigger_pulse_blast(state);
    state.pulse_cooldown = pulse_cooldown(level);
}

/// Demo pilot: hug the corridor centre, chase pickups, bomb bunkers ahead
fn autopilot(state: &GameState, input: &mut TickInput) {
    let player = &state.player;

    // Look a little ahead so the craft starts climbing before a wall arrives
    let ahead = state.terrain.corridor_at(player.pos.x + 36.0);
    let here = state.terrain.corridor_at(player.pos.x);
    let ceiling = ahead.ceiling.max(here.ceiling);
    let floor = ahead.floor.min(here.floor);
    let mut target_y = ceiling + (floor - ceiling) * 0.42;

    // Sidestep the closest incoming bullet
    if let Some(bullet) = state
        .enemy_projectiles
        .iter()
        .filter(|p| (p.pos - player.pos).length() < 70.0)
        .min_by(|a, b| {
            let da = (a.pos - player.pos).length();
            let db = (b.pos - player.pos).length();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
    {
        target_y += if bullet.pos.y > player.pos.y { -30.0 } else { 30.0 };
    }

    let target_x = state
        .upgrade_drops
        .iter()
        .filter(|d| d.pos.x > 0.0 && d.pos.x < WORLD_WIDTH)
        .map(|d| d.pos.x)
        .next()
        .unwrap_or(WORLD_WIDTH * 0.3);

    input.up = player.pos.y > target_y + 6.0;
    input.down = player.pos.y < target_y - 6.0;
    input.left = player.pos.x > target_x + 8.0;
    input.right = player.pos.x < target_x - 8.0;

    // Bombs carry forward, so release a little before the bunker passes under
    input.bomb = state.bunkers.iter().any(|b| {
        let dx = b.pos.x - player.pos.x;
        dx > 20.0 && dx < 170.0
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entities::{Bunker, BunkerTier, Enemy, UpgradeDrop};
    use crate::sim::state::RunConfig;

    fn quiet_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed, RunConfig::default());
        state.drain_events();
        state
    }

    fn scout(pos: Vec2, hp: f32) -> Enemy {
        Enemy {
            kind: EnemyKind::Scout,
            pos,
            w: 20.0,
            h: 10.0,
            hp,
            max_hp: hp,
            value: 56,
            elite: false,
            speed: 0.0,
            wobble: 0.0,
            drift: 0.0,
            dive_armed: false,
            fire_cooldown: 100,
        }
    }

    #[test]
    fn test_tick_pause() {
        let mut state = quiet_state(12345);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.time_ticks, 1);

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause);
        assert_eq!(state.phase, GamePhase::Paused);

        let before = state.player.pos;
        let push = TickInput {
            right: true,
            ..Default::default()
        };
        tick(&mut state, &push);
        assert_eq!(state.time_ticks, 1);
        assert_eq!(state.player.pos, before);

        // Unpause
        tick(&mut state, &pause);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.time_ticks, 2);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = GameState::new(99999, RunConfig::default());
        let mut state2 = GameState::new(99999, RunConfig::default());

        let inputs = [
            TickInput {
                right: true,
                bomb: true,
                ..Default::default()
            },
            TickInput {
                down: true,
                select_mode: Some(BombMode::Cluster),
                ..Default::default()
            },
            TickInput {
                bomb: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for frame in 0..600 {
            let input = &inputs[frame % inputs.len()];
            tick(&mut state1, input);
            tick(&mut state2, input);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.bunkers.len(), state2.bunkers.len());
        assert_eq!(state1.enemies.len(), state2.enemies.len());
        assert_eq!(state1.player.pos, state2.player.pos);
        assert_eq!(state1.terrain.next_index, state2.terrain.next_index);
    }

    #[test]
    fn test_reset_reinitialises_run() {
        let mut state = quiet_state(3);
        state.player.invuln_timer = i32::MAX;
        state.upgrades.apply(UpgradeKind::Chain);
        state.bomb_mode = BombMode::Runner;

        let fly = TickInput {
            right: true,
            bomb: true,
            ..Default::default()
        };
        for _ in 0..400 {
            tick(&mut state, &fly);
        }
        state.score = 500_000;
        state.high_score = 500_000;
        state.lives = 1;
        state.combo = 2.5;
        state.mega_cooldown = 200;
        state.pulse_cooldown = 40;
        assert!(
            !(state.bombs_falling.is_empty()
                && state.enemies.is_empty()
                && state.upgrade_drops.is_empty())
        );
        assert!(state.terrain.next_index > COLS as u64);
        assert_ne!(state.player.pos, Player::spawn_point());
        state.end_run(GameOverReason::LivesExhausted, "gone".into());

        let reset = TickInput {
            reset: true,
            ..Default::default()
        };
        tick(&mut state, &reset);

        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.high_score, 500_000);
        assert_eq!(state.lives, STARTING_LIVES);
        assert_eq!(state.upgrades.level(UpgradeKind::Chain), 0);
        assert_eq!(state.bomb_mode, BombMode::Standard);
        assert!(state.message.is_empty());
        assert!(state.game_over_reason.is_none());

        assert!(state.bombs_falling.is_empty());
        assert!(state.bomb_queue.is_empty());
        assert!(state.enemies.is_empty());
        assert!(state.enemy_projectiles.is_empty());
        assert!(state.upgrade_drops.is_empty());

        assert_eq!(state.terrain.len(), COLS);
        assert_eq!(state.terrain.next_index, COLS as u64);

        // The reset frame itself plays on: one invulnerability frame spent
        assert_eq!(state.player.pos, Player::spawn_point());
        assert_eq!(state.player.invuln_timer, SPAWN_INVULN - 1);

        assert_eq!(state.combo, COMBO_MIN);
        assert_eq!(state.pulse_cooldown, 0);
        assert_eq!(state.mega_cooldown, 0);

        // Only the opening volley of the new run
        let kinds: Vec<ShotKind> = state.shots.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![ShotKind::Laser, ShotKind::Pulse]);
        assert!(state.shot_queue.is_empty());
    }

    #[test]
    fn test_pause_ignored_after_game_over() {
        let mut state = quiet_state(8);
        state.end_run(GameOverReason::LivesExhausted, "done".into());
        tick(
            &mut state,
            &TickInput {
                pause: true,
                ..Default::default()
            },
        );
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_game_over_only_runs_ambient() {
        let mut state = quiet_state(4);
        state.end_run(GameOverReason::LivesExhausted, "done".into());
        state.spawn_explosion(Vec2::new(100.0, 100.0), colors::BOMB_BLAST, 5);
        let pos = state.player.pos;
        let next_index = state.terrain.next_index;

        for _ in 0..60 {
            tick(
                &mut state,
                &TickInput {
                    left: true,
                    bomb: true,
                    ..Default::default()
                },
            );
        }
        assert_eq!(state.player.pos, pos);
        assert_eq!(state.terrain.next_index, next_index);
        assert!(state.bombs_falling.is_empty());
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_mode_selection_edge() {
        let mut state = quiet_state(5);
        tick(
            &mut state,
            &TickInput {
                select_mode: Some(BombMode::Mega),
                ..Default::default()
            },
        );
        assert_eq!(state.bomb_mode, BombMode::Mega);
    }

    #[test]
    fn test_bunker_escape_costs_points() {
        let mut state = quiet_state(6);
        state.score = 100;
        state.bunkers.push(Bunker {
            pos: Vec2::new(-19.9, 500.0),
            hp: 10.0,
            max_hp: 10.0,
            radius: 6.0,
            tier: BunkerTier::Small,
            bounty: 100,
            upgrade: None,
            color: 0xffffff,
        });
        let before = state.bunkers.len();
        scroll_world(&mut state);
        assert_eq!(state.score, 25);
        assert!(state.bunkers.len() <= before);
        assert!(state.bunkers.iter().all(|b| b.pos.x >= -20.0));
    }

    #[test]
    fn test_escape_penalty_saturates() {
        let mut state = quiet_state(6);
        state.score = 30;
        state.bunkers.push(Bunker {
            pos: Vec2::new(-19.95, 500.0),
            hp: 10.0,
            max_hp: 10.0,
            radius: 6.0,
            tier: BunkerTier::Small,
            bounty: 100,
            upgrade: None,
            color: 0xffffff,
        });
        scroll_world(&mut state);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_shield_absorbs_enemy_contact() {
        let mut state = quiet_state(7);
        state.player.invuln_timer = 0;
        state.upgrades.apply(UpgradeKind::Shield);
        state.enemy_spawn_timer = 1000;
        state.enemies.push(scout(state.player.pos, 10.0));

        update_enemies(&mut state);
        assert_eq!(state.lives, STARTING_LIVES);
        assert_eq!(state.upgrades.level(UpgradeKind::Shield), 0);
        assert!(state.enemies.is_empty());
        assert_eq!(state.toast.text, "Shield Down");
        assert!(state.drain_events().contains(&GameEvent::Cue(AudioCue::Hit)));
    }

    #[test]
    fn test_contact_without_shield_costs_a_life() {
        let mut state = quiet_state(8);
        state.player.invuln_timer = 0;
        state.enemy_spawn_timer = 1000;
        state.enemies.push(scout(state.player.pos, 10.0));

        update_enemies(&mut state);
        assert_eq!(state.lives, STARTING_LIVES - 1);
        assert_eq!(state.player.invuln_timer, HIT_INVULN);
        assert_eq!(state.toast.text, "Life Lost - 2 left");
        assert!(state.drain_events().contains(&GameEvent::Cue(AudioCue::LifeLost)));
    }

    #[test]
    fn test_last_life_ends_run() {
        let mut state = quiet_state(9);
        state.player.invuln_timer = 0;
        state.lives = 1;
        state.enemy_projectiles.push(EnemyProjectile {
            pos: state.player.pos,
            vel: Vec2::ZERO,
            life: 100,
            elite: false,
        });
        state.scroll_speed = 0.0;

        update_enemy_projectiles(&mut state);
        assert!(state.is_game_over());
        assert_eq!(state.game_over_reason, Some(GameOverReason::LivesExhausted));
        assert_eq!(state.message, "Shot down. No lives left. Press R to retry.");
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Cue(AudioCue::GameOver)));
        assert!(events.contains(&GameEvent::GameOver(GameOverReason::LivesExhausted)));
    }

    #[test]
    fn test_invulnerable_player_ignores_hits() {
        let mut state = quiet_state(10);
        state.enemy_spawn_timer = 1000;
        state.enemies.push(scout(state.player.pos, 10.0));
        update_enemies(&mut state);
        assert_eq!(state.lives, STARTING_LIVES);
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn test_laser_kills_enemy() {
        let mut state = quiet_state(11);
        let target = Vec2::new(500.0, 200.0);
        state.enemies.push(scout(target, 5.0));
        state.shots.push(crate::sim::entities::Shot::new(
            ShotKind::Laser,
            target - Vec2::X * 4.0,
            Vec2::new(2.0, 0.0),
        ));
        update_shots(&mut state);
        assert!(state.enemies.is_empty());
        assert!(state.shots.is_empty());
        assert_eq!(state.score, 56);
    }

    #[test]
    fn test_pierce_survives_hits() {
        let mut state = quiet_state(12);
        let target = Vec2::new(500.0, 200.0);
        state.enemies.push(scout(target, 100.0));
        let mut shot = crate::sim::entities::Shot::new(ShotKind::Pulse, target, Vec2::ZERO);
        shot.pierce = 2;
        shot.wobble_speed = 0.0;
        state.shots.push(shot);
        update_shots(&mut state);
        assert_eq!(state.shots.len(), 1);
        assert_eq!(state.shots[0].pierce, 1);
        assert_eq!(state.enemies[0].hp, 90.0);
    }

    #[test]
    fn test_pickup_applies_upgrade() {
        let mut state = quiet_state(13);
        state.upgrade_drops.push(UpgradeDrop {
            pos: state.player.pos,
            kind: UpgradeKind::Speed,
            radius: 9.0,
            bob_phase: 0.0,
        });
        state.scroll_speed = 0.0;
        update_upgrade_drops(&mut state);
        assert!(state.upgrade_drops.is_empty());
        assert_eq!(state.upgrades.level(UpgradeKind::Speed), 2);
        assert!((state.player.speed - 5.35).abs() < 1e-5);
        assert_eq!(state.toast.text, "Speed Up S2");
        assert!(state.drain_events().contains(&GameEvent::Cue(AudioCue::Pickup)));
    }

    #[test]
    fn test_maxed_pickup_pays_bonus() {
        let mut state = quiet_state(14);
        state.upgrades.apply(UpgradeKind::Pulse);
        state.upgrades.apply(UpgradeKind::Pulse);
        collect_upgrade(&mut state, UpgradeKind::Pulse);
        assert_eq!(state.score, 140);
        assert_eq!(state.toast.text, "Pulse Max +140");
    }

    #[test]
    fn test_magnet_pulls_drops() {
        let mut state = quiet_state(15);
        state.upgrades.apply(UpgradeKind::Magnet);
        state.scroll_speed = 0.0;
        let start = state.player.pos + Vec2::new(60.0, 0.0);
        state.upgrade_drops.push(UpgradeDrop {
            pos: start,
            kind: UpgradeKind::Bomb,
            radius: 9.0,
            bob_phase: 0.0,
        });
        update_upgrade_drops(&mut state);
        assert!(state.upgrade_drops[0].pos.x < start.x);
    }

    #[test]
    fn test_standard_bomb_detonates_on_floor() {
        let mut state = quiet_state(16);
        state.bunkers.clear();
        state.bomb_queue.clear();
        let col = 60;
        let x = state.terrain.column_center_x(col);
        let top = state.terrain.floor_top(col);
        let params = crate::sim::entities::BombParams::new(BombKind::Standard, 82.0, 1.0)
            .at(Vec2::new(x, top - 1.0))
            .with_vx_world(state.scroll_speed);
        let bomb = create_bomb(&state, params);
        state.bombs_falling.push(bomb);

        update_bombs(&mut state);
        assert!(state.bombs_falling.is_empty());
        assert!(state.terrain.floor_top(col) > top);
        assert!(state.score > 0);
        assert!(state.drain_events().contains(&GameEvent::Cue(AudioCue::Blast)));
    }

    #[test]
    fn test_runner_bursts_then_detonates() {
        let mut state = quiet_state(17);
        state.bunkers.clear();
        state.bomb_queue.clear();
        let col = 20;
        let x = state.terrain.column_center_x(col);
        let top = state.terrain.floor_top(col);
        let params = crate::sim::entities::BombParams::new(BombKind::Runner, 60.0, 1.0)
            .at(Vec2::new(x, top - 1.0))
            .with_vx_world(state.scroll_speed);
        let bomb = create_bomb(&state, params);
        state.bombs_falling.push(bomb);

        update_bombs(&mut state);
        assert_eq!(state.bombs_falling.len(), 1);
        assert_eq!(state.bombs_falling[0].phase, BombPhase::Runner);

        // first burst after 6 frames, then every 7, detonation on the 6th step
        for _ in 0..6 + 7 * 5 {
            update_bombs(&mut state);
        }
        assert!(state.bombs_falling.is_empty());
    }

    #[test]
    fn test_cluster_touchdown_queues_bomblets() {
        let mut state = quiet_state(18);
        state.bomb_queue.clear();
        let col = 30;
        let x = state.terrain.column_center_x(col);
        let top = state.terrain.floor_top(col);
        let params = crate::sim::entities::BombParams::new(BombKind::Cluster, 74.0, 1.0)
            .at(Vec2::new(x, top - 1.0))
            .with_vx_world(state.scroll_speed);
        let bomb = create_bomb(&state, params);
        state.bombs_falling.push(bomb);

        update_bombs(&mut state);
        assert!(state.bombs_falling.is_empty());
        assert_eq!(state.bomb_queue.len(), 4);

        for _ in 0..18 {
            update_bombs(&mut state);
        }
        assert!(state.bomb_queue.is_empty());
    }

    #[test]
    fn test_bomb_exhaustion_ends_limited_run() {
        let config = RunConfig {
            unlimited_bombs: false,
            ..RunConfig::default()
        };
        let mut state = GameState::new(19, config);
        state.bombs = 0;
        assert!(!state.bunkers.is_empty());
        update_bombs(&mut state);
        assert!(state.is_game_over());
        assert_eq!(state.game_over_reason, Some(GameOverReason::BombsExhausted));
        assert_eq!(state.message, "No bombs left. Press R to retry.");
    }

    #[test]
    fn test_unlimited_run_never_runs_dry() {
        let mut state = quiet_state(20);
        state.bombs = 0;
        update_bombs(&mut state);
        assert!(!state.is_game_over());
    }

    #[test]
    fn test_pulse_fires_on_cooldown() {
        let mut state = quiet_state(21);
        state.upgrades.apply(UpgradeKind::Pulse);
        update_pulse(&mut state);
        assert_eq!(state.pulse_cooldown, 215);
        let rings = state.shockwaves.len();
        update_pulse(&mut state);
        assert_eq!(state.pulse_cooldown, 214);
        assert_eq!(state.shockwaves.len(), rings);
    }

    #[test]
    fn test_high_score_event() {
        let mut state = quiet_state(22);
        state.add_score(1_000);
        tick(&mut state, &TickInput::default());
        assert!(state.high_score >= 1_000);
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::HighScore(s) if *s >= 1_000))
        );
    }

    #[test]
    fn test_stage_change_event() {
        let mut state = quiet_state(23);
        state.add_score(FIRST_STAGE_SCORE);
        tick(&mut state, &TickInput::default());
        assert!(state.drain_events().contains(&GameEvent::StageChanged(2)));
        assert_eq!(state.last_stage, 2);
    }

    #[test]
    fn test_player_stays_inside_corridor() {
        let mut state = quiet_state(24);
        let up = TickInput {
            up: true,
            left: true,
            ..Default::default()
        };
        for _ in 0..200 {
            tick(&mut state, &up);
            if state.is_game_over() {
                break;
            }
            let half_w = state.player.w / 2.0;
            assert!(state.player.pos.x >= half_w);
            assert!(state.player.pos.x <= WORLD_WIDTH - half_w);
            assert!(state.player.pos.y > 0.0 && state.player.pos.y < WORLD_HEIGHT);
        }
    }

    #[test]
    fn test_autopilot_plays() {
        let mut state = quiet_state(25);
        let idle = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..1_800 {
            tick(&mut state, &idle);
        }
        assert!(state.score > 0);
        assert!(state.time_ticks > 0);
    }
}
