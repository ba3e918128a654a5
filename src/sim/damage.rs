//! Damage and scoring pipeline
//!
//! Every area impact (bomb detonation, rocket/blast splash, runner bursts,
//! the pulse attack) funnels through here so terrain erosion, bunker kills,
//! enemy kills, score and combo follow one set of rules. All work happens
//! synchronously inside the caller's tick.

use glam::Vec2;

use super::effects::colors;
use super::entities::{Shot, UpgradeDrop};
use super::random::RngExt;
use super::state::GameState;
use super::upgrades::UpgradeKind;
use crate::audio::AudioCue;
use crate::clamp;
use crate::consts::*;

/// Terrain power lost per column of horizontal distance
pub const TERRAIN_FALLOFF_PER_COLUMN: f32 = 0.11;
/// Blast units per column of terrain reach
pub const BLAST_PER_COLUMN: f32 = 14.0;
/// Bunker damage lost per pixel of distance
pub const BUNKER_FALLOFF: f32 = 0.9;

/// Columns on each side of the impact column a blast reaches
#[inline]
pub fn blast_columns(blast: f32) -> i64 {
    (blast / BLAST_PER_COLUMN).ceil() as i64
}

/// Terrain power delivered `distance` columns away from the impact column
pub fn column_power(blast: f32, distance: i64) -> f32 {
    if distance > blast_columns(blast) {
        return 0.0;
    }
    (blast * (1.0 - distance as f32 * TERRAIN_FALLOFF_PER_COLUMN)).max(0.0)
}

/// Outcome of one bunker damage pass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BunkerReport {
    pub destroyed: u32,
    /// Summed bounty of destroyed bunkers
    pub bounty: u64,
    /// Score actually awarded (bounty times combo)
    pub awarded: u64,
}

/// Damage bunkers around an impact and settle score and combo
///
/// Each bunker whose centre lies within `radius + bunker.radius` takes
/// `max(0, power - distance * 0.9)`. Destroyed bunkers drop their upgrade
/// and are removed before returning. The combo bonus applies once to the
/// summed bounty of everything destroyed by this call.
pub fn damage_bunkers(state: &mut GameState, at: Vec2, power: f32, radius: f32) -> BunkerReport {
    let mut report = BunkerReport::default();
    let mut kills = Vec::new();

    for bunker in &mut state.bunkers {
        let dist = bunker.pos.distance(at);
        if dist > radius + bunker.radius {
            continue;
        }
        // Already-dead bunkers are never double counted within a pass
        if bunker.is_destroyed() {
            continue;
        }
        bunker.hp -= (power - dist * BUNKER_FALLOFF).max(0.0);
        if bunker.is_destroyed() {
            report.destroyed += 1;
            report.bounty += bunker.bounty;
            kills.push((bunker.pos, bunker.radius, bunker.color, bunker.bounty, bunker.upgrade));
        }
    }

    for (pos, radius, color, bounty, upgrade) in kills {
        state.spawn_explosion(pos, color, 24 + radius as usize * 2);
        state.spawn_float_text(pos - Vec2::Y * 10.0, format!("+{bounty}"), colors::BOUNTY_TEXT, 13.0, 24);
        if let Some(kind) = upgrade {
            spawn_upgrade_drop(state, pos, kind);
        }
    }

    if report.destroyed > 0 {
        state.combo = (state.combo + report.destroyed as f64 * COMBO_PER_KILL).clamp(COMBO_MIN, COMBO_MAX);
        state.combo_timer = COMBO_WINDOW;
        report.awarded = (report.bounty as f64 * state.combo).floor() as u64;
        state.add_score(report.awarded);
        let label = format!("x{:.1}", state.combo);
        state.spawn_float_text(at - Vec2::Y * 18.0, label, colors::COMBO_TEXT, 15.0, 26);
        log::debug!(
            "{} bunker(s) destroyed, bounty {} at x{:.2} -> +{}",
            report.destroyed,
            report.bounty,
            state.combo,
            report.awarded
        );
    }

    state.bunkers.retain(|b| !b.is_destroyed());
    report
}

pub fn spawn_upgrade_drop(state: &mut GameState, pos: Vec2, kind: UpgradeKind) {
    let bob_phase = state.rng.frange(0.0, std::f32::consts::TAU);
    state.upgrade_drops.push(UpgradeDrop {
        pos,
        kind,
        radius: 9.0,
        bob_phase,
    });
}

/// Apply damage to the enemy at `index`; removes it and pays out on a kill
///
/// Returns true if the enemy died.
pub fn hit_enemy(state: &mut GameState, index: usize, damage: f32) -> bool {
    let Some(enemy) = state.enemies.get_mut(index) else {
        return false;
    };
    enemy.hp -= damage;
    if enemy.hp > 0.0 {
        return false;
    }
    let enemy = state.enemies.remove(index);
    state.add_score(enemy.value);
    state.spawn_explosion(enemy.pos, colors::ENEMY_DEATH, 16);
    state.spawn_float_text(
        enemy.pos - Vec2::Y * 10.0,
        format!("+{}", enemy.value),
        colors::SCORE_TEXT,
        14.0,
        26,
    );
    true
}

/// The area-damage operation shared by bombs, splash and runner bursts
///
/// Erodes floor columns around the impact, scoring `floor(dug * scale)`
/// per column, then hits bunkers with `blast * 2.15` inside `blast * 0.9`
/// and enemies within `blast * 0.82` for `blast * 0.56`.
pub fn apply_blast_damage(state: &mut GameState, at: Vec2, blast: f32, terrain_score_scale: f32) {
    let col = state.terrain.column_at_screen_x(at.x) as i64;
    let reach = blast_columns(blast);

    for i in (col - reach)..=(col + reach) {
        if i < 0 || i >= state.terrain.len() as i64 {
            continue;
        }
        let power = column_power(blast, (i - col).abs());
        if power <= 0.0 {
            continue;
        }
        let dug = state.terrain.dig(i, power);
        state.add_score((dug * terrain_score_scale).floor() as u64);
    }

    damage_bunkers(state, at, blast * 2.15, blast * 0.9);

    let enemy_damage = blast * 0.56;
    for i in (0..state.enemies.len()).rev() {
        let enemy_pos = state.enemies[i].pos;
        if enemy_pos.distance(at) > blast * 0.82 {
            continue;
        }
        state.spawn_float_text(
            enemy_pos - Vec2::Y * 4.0,
            format!("{}", enemy_damage.floor()),
            colors::BLAST_TEXT,
            11.0,
            16,
        );
        hit_enemy(state, i, enemy_damage);
    }
}

/// Bomb detonation: the main blast plus chain sub-blasts
pub fn explode_bomb(state: &mut GameState, at: Vec2, blast: f32) {
    apply_blast_damage(state, at, blast, 8.0);
    state.spawn_explosion(at, colors::BOMB_BLAST, 78);
    state.spawn_shockwave(at, blast * 1.45, 24, colors::BOMB_RING);
    state.cue(AudioCue::Blast);

    let chain = state.upgrades.level(UpgradeKind::Chain);
    if chain == 0 {
        return;
    }
    let chain = chain as f32;
    let count = 1 + chain as usize;
    let cluster_radius = 26.0 + chain * 10.0;
    let sub_blast = blast * (0.32 + chain * 0.08);
    for _ in 0..count {
        let angle = state.rng.frange(0.0, std::f32::consts::TAU);
        let dist = state.rng.frange(8.0, cluster_radius);
        let pos = at + Vec2::new(angle.cos() * dist, angle.sin() * dist * 0.45);
        apply_blast_damage(state, pos, sub_blast, 4.0);
        state.spawn_explosion(pos, colors::CHAIN_BLAST, 26);
        state.spawn_shockwave(pos, sub_blast * 0.9, 14, colors::CHAIN_RING);
    }
}

/// Splash from a detonating rocket or blast shot
pub fn apply_shot_splash(state: &mut GameState, shot: &Shot, at: Vec2, damage_scale: f32) {
    if shot.blast_radius <= 0.0 {
        return;
    }
    let radius = shot.blast_radius;
    for i in (0..state.enemies.len()).rev() {
        let d = state.enemies[i].pos.distance(at);
        if d > radius {
            continue;
        }
        let dmg = (shot.damage * damage_scale * (1.0 - d / radius)).max(4.0);
        hit_enemy(state, i, dmg);
    }
    if shot.terrain_damage > 0.0 {
        apply_blast_damage(state, at, shot.terrain_damage, 2.0);
    }
    state.spawn_shockwave(at, radius * 0.85, 12, 0xffd3a1);
}

/// Radius and power of the pulse attack for a pulse level
pub fn pulse_profile(level: u8) -> (f32, f32) {
    let level = level as f32;
    (72.0 + level * 34.0, 28.0 + level * 18.0)
}

/// Periodic area pulse centred just ahead of the player
///
/// Erodes floor and ceiling with linear falloff, shakes bunkers and hits
/// every enemy inside the radius.
pub fn trigger_pulse_blast(state: &mut GameState) {
    let stage = state.stage();
    let (radius, power) = pulse_profile(state.upgrades.level(UpgradeKind::Pulse));
    let at = state.player.pos + Vec2::X * 10.0;
    let col = state.terrain.column_at_screen_x(at.x) as i64;
    let col_radius = (radius / CELL_W).ceil() as i64;

    for i in (col - col_radius)..=(col + col_radius) {
        if i < 0 || i >= state.terrain.len() as i64 {
            continue;
        }
        let sx = state.terrain.column_center_x(i as usize);
        let falloff = (1.0 - (sx - at.x).abs() / radius).max(0.0);
        if falloff <= 0.0 {
            continue;
        }
        let terrain_power = power * falloff;
        let floor = state.terrain.dig(i, terrain_power);
        let ceiling = state.terrain.dig_ceiling(i, terrain_power * 0.82);
        state.add_score((floor * 4.0).floor() as u64 + (ceiling * 3.0).floor() as u64);
    }

    damage_bunkers(state, at, power * 2.4, radius);

    for i in (0..state.enemies.len()).rev() {
        if state.enemies[i].pos.distance(at) > radius {
            continue;
        }
        let enemy = &mut state.enemies[i];
        enemy.hp -= power * 1.7;
        if enemy.hp <= 0.0 {
            let pos = enemy.pos;
            state.enemies.remove(i);
            state.add_score(48 + stage as u64 * 10);
            state.spawn_explosion(pos, colors::ENEMY_DEATH, 18);
        }
    }

    state.spawn_shockwave(at, radius, 18, colors::PULSE_RING);
    state.spawn_explosion(at, colors::PULSE_BURST, 42);
}

/// Combo decay once its window has elapsed
pub fn update_combo(state: &mut GameState) {
    if state.combo_timer > 0 {
        state.combo_timer -= 1;
    } else {
        state.combo = (state.combo - COMBO_DECAY).max(COMBO_MIN);
    }
}

/// Pulse cooldown for a pulse level
pub fn pulse_cooldown(level: u8) -> i32 {
    clamp(300.0 - level as f32 * 85.0, 120.0, 300.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entities::{Bunker, BunkerTier, Enemy, EnemyKind};
    use crate::sim::state::RunConfig;
    use crate::sim::terrain::{Column, Layer, Terrain};
    use proptest::prelude::*;

    fn bunker_at(pos: Vec2, hp: f32, bounty: u64) -> Bunker {
        Bunker {
            pos,
            hp,
            max_hp: hp,
            radius: 8.0,
            tier: BunkerTier::Medium,
            bounty,
            upgrade: None,
            color: 0xffffff,
        }
    }

    fn enemy_at(pos: Vec2, hp: f32, value: u64) -> Enemy {
        Enemy {
            kind: EnemyKind::Scout,
            pos,
            w: 20.0,
            h: 10.0,
            hp,
            max_hp: hp,
            value,
            elite: false,
            speed: 1.0,
            wobble: 0.0,
            drift: 1.0,
            dive_armed: false,
            fire_cooldown: 100,
        }
    }

    /// A state with flat soft terrain and nothing else in it
    fn empty_state() -> GameState {
        let mut state = GameState::new(1, RunConfig::default());
        let column = Column {
            ceiling: vec![Layer::new(20.0, 0); 3],
            floor: vec![Layer::new(20.0, 0); 10],
        };
        state.terrain = Terrain::from_columns(vec![column; COLS]);
        state.bunkers.clear();
        state.enemies.clear();
        state.upgrade_drops.clear();
        state
    }

    #[test]
    fn test_column_power_attenuation() {
        assert_eq!(blast_columns(82.0), 6);
        assert_eq!(column_power(82.0, 0), 82.0);
        assert!((column_power(82.0, 1) - 82.0 * 0.89).abs() < 1e-3);
        assert!(column_power(82.0, 6) > 0.0);
        assert_eq!(column_power(82.0, 7), 0.0);
    }

    #[test]
    fn test_standard_blast_digs_only_within_reach() {
        let mut state = empty_state();
        let impact_col = 40usize;
        let x = state.terrain.column_center_x(impact_col);
        let y = state.terrain.floor_top(impact_col);
        apply_blast_damage(&mut state, Vec2::new(x, y), 82.0, 8.0);

        let full = 200.0;
        for offset in 0..=6 {
            assert!(state.terrain.column(impact_col + offset).unwrap().floor_height() < full);
            assert!(state.terrain.column(impact_col - offset).unwrap().floor_height() < full);
        }
        assert_eq!(state.terrain.column(impact_col + 7).unwrap().floor_height(), full);
        assert_eq!(state.terrain.column(impact_col - 7).unwrap().floor_height(), full);
        assert!(state.score > 0);
    }

    #[test]
    fn test_bunker_at_zero_distance_takes_full_power() {
        let mut state = empty_state();
        let at = Vec2::new(300.0, 400.0);
        state.bunkers.push(bunker_at(at, 250.0, 100));
        let report = damage_bunkers(&mut state, at, 100.0, 10.0);
        assert_eq!(report.destroyed, 0);
        assert_eq!(state.bunkers[0].hp, 150.0);
    }

    #[test]
    fn test_bunker_outside_combined_radius_is_untouched() {
        let mut state = empty_state();
        state.bunkers.push(bunker_at(Vec2::new(100.0, 100.0), 50.0, 100));
        damage_bunkers(&mut state, Vec2::new(100.0, 119.0), 100.0, 10.0);
        assert_eq!(state.bunkers[0].hp, 50.0);
    }

    #[test]
    fn test_simultaneous_kills_share_one_multiplier() {
        let mut state = empty_state();
        let at = Vec2::new(400.0, 420.0);
        for (i, bounty) in [100, 150, 200].into_iter().enumerate() {
            state
                .bunkers
                .push(bunker_at(at + Vec2::X * i as f32, 10.0, bounty));
        }
        let report = damage_bunkers(&mut state, at, 100.0, 20.0);
        assert_eq!(report.destroyed, 3);
        assert_eq!(report.bounty, 450);
        assert!((state.combo - 1.54).abs() < 1e-9);
        assert_eq!(report.awarded, 693);
        assert_eq!(state.score, 693);
        assert_eq!(state.combo_timer, COMBO_WINDOW);
        assert!(state.bunkers.is_empty());
    }

    #[test]
    fn test_bunker_zeroed_exactly_is_removed_and_drops_its_upgrade() {
        let mut state = empty_state();
        let at = Vec2::new(200.0, 420.0);
        let mut carrier = bunker_at(at, 100.0, 120);
        carrier.upgrade = Some(UpgradeKind::Chain);
        state.bunkers.push(carrier);
        state.bunkers.push(bunker_at(at + Vec2::X * 5.0, 100.0, 120));

        let report = damage_bunkers(&mut state, at, 100.0, 10.0);
        assert_eq!(report.destroyed, 1);
        assert_eq!(state.bunkers.len(), 1);
        assert_eq!(state.upgrade_drops.len(), 1);
        assert_eq!(state.upgrade_drops[0].kind, UpgradeKind::Chain);
    }

    #[test]
    fn test_plain_bunker_kill_drops_nothing() {
        let mut state = empty_state();
        let at = Vec2::new(200.0, 420.0);
        state.bunkers.push(bunker_at(at, 10.0, 120));
        damage_bunkers(&mut state, at, 100.0, 10.0);
        assert!(state.upgrade_drops.is_empty());
    }

    #[test]
    fn test_combo_caps_at_max() {
        let mut state = empty_state();
        state.combo = 4.4;
        let at = Vec2::new(200.0, 420.0);
        state.bunkers.push(bunker_at(at, 1.0, 100));
        damage_bunkers(&mut state, at, 50.0, 10.0);
        assert_eq!(state.combo, COMBO_MAX);
        assert_eq!(state.score, 450);
    }

    #[test]
    fn test_blast_kills_enemy_in_range() {
        let mut state = empty_state();
        let at = Vec2::new(300.0, 200.0);
        state.enemies.push(enemy_at(at + Vec2::X * 30.0, 20.0, 60));
        state.enemies.push(enemy_at(at + Vec2::X * 200.0, 20.0, 60));
        apply_blast_damage(&mut state, at, 82.0, 0.0);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.score, 60);
    }

    #[test]
    fn test_chain_adds_sub_blasts() {
        let mut plain = empty_state();
        let mut chained = empty_state();
        chained.upgrades.apply(UpgradeKind::Chain);
        let at = Vec2::new(400.0, plain.terrain.floor_top(50));
        explode_bomb(&mut plain, at, 82.0);
        explode_bomb(&mut chained, at, 82.0);
        assert!(chained.shockwaves.len() == plain.shockwaves.len() + 2);
        assert!(chained.score >= plain.score);
    }

    #[test]
    fn test_pulse_hits_floor_and_ceiling() {
        let mut state = empty_state();
        state.upgrades.apply(UpgradeKind::Pulse);
        let col = state.terrain.column_at_screen_x(state.player.pos.x + 10.0);
        trigger_pulse_blast(&mut state);
        let column = state.terrain.column(col).unwrap();
        assert!(column.floor_height() < 200.0);
        assert!(column.ceiling_height() < 60.0);
        assert_eq!(pulse_cooldown(1), 215);
        assert_eq!(pulse_cooldown(2), 130);
    }

    #[test]
    fn test_combo_decays_after_window() {
        let mut state = empty_state();
        state.combo = 2.0;
        state.combo_timer = 2;
        update_combo(&mut state);
        update_combo(&mut state);
        assert_eq!(state.combo, 2.0);
        update_combo(&mut state);
        assert!((state.combo - 1.98).abs() < 1e-9);
        for _ in 0..200 {
            update_combo(&mut state);
        }
        assert_eq!(state.combo, COMBO_MIN);
    }

    proptest! {
        #[test]
        fn prop_combo_stays_in_range(start in 1.0f64..4.5, kills in 0u32..30, frames in 0usize..400) {
            let mut state = empty_state();
            state.combo = start;
            let at = Vec2::new(300.0, 420.0);
            for i in 0..kills {
                state.bunkers.push(bunker_at(at + Vec2::X * i as f32 * 0.1, 1.0, 100));
            }
            damage_bunkers(&mut state, at, 100.0, 40.0);
            prop_assert!(state.combo >= COMBO_MIN && state.combo <= COMBO_MAX);
            let mut prev = state.combo;
            for _ in 0..frames {
                update_combo(&mut state);
                prop_assert!(state.combo <= prev);
                prop_assert!(state.combo >= COMBO_MIN);
                prev = state.combo;
            }
        }
    }
}
