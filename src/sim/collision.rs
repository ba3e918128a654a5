//! Overlap tests
//!
//! Every hit in the game is an axis-aligned "reach" test between two centre
//! points: the pair touches when both axis distances fall inside the reach.
//! Each contact pair has its own reach formula, collected here.

use glam::Vec2;

use super::entities::{Enemy, EnemyProjectile, Shot, UpgradeDrop};
use super::state::Player;
use crate::consts::{WORLD_HEIGHT, WORLD_WIDTH};

/// Result of a reach test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub hit: bool,
    /// Axis distances between the two centres
    pub delta: Vec2,
}

impl Contact {
    pub fn miss() -> Self {
        Self {
            hit: false,
            delta: Vec2::ZERO,
        }
    }
}

/// Strict reach test: both axis distances must be below the reach
#[inline]
pub fn within_reach(a: Vec2, b: Vec2, reach: Vec2) -> bool {
    let d = (a - b).abs();
    d.x < reach.x && d.y < reach.y
}

/// Shot against an enemy; touching the reach boundary counts
pub fn shot_hits_enemy(shot: &Shot, enemy: &Enemy) -> Contact {
    let delta = (shot.pos - enemy.pos).abs();
    let reach = Vec2::new(
        enemy.w * 0.55 + shot.radius,
        enemy.h * 0.65 + shot.radius,
    );
    if delta.x > reach.x || delta.y > reach.y {
        return Contact::miss();
    }
    Contact { hit: true, delta }
}

/// Enemy body ramming the player
pub fn enemy_touches_player(enemy: &Enemy, player: &Player) -> bool {
    within_reach(
        enemy.pos,
        player.pos,
        Vec2::new((enemy.w + player.w) * 0.45, (enemy.h + player.h) * 0.55),
    )
}

pub fn projectile_hits_player(projectile: &EnemyProjectile, player: &Player) -> bool {
    within_reach(
        projectile.pos,
        player.pos,
        Vec2::new(player.w * 0.45, player.h * 0.45),
    )
}

/// Pickup reach, widened by `pad` pixels on each axis
pub fn drop_touches_player(drop: &UpgradeDrop, player: &Player, pad: f32) -> bool {
    within_reach(
        drop.pos,
        player.pos,
        Vec2::new(player.w * 0.55 + pad, player.h * 0.55 + pad),
    )
}

/// Screen-exit margins (left, right, top, bottom)
#[derive(Debug, Clone, Copy)]
pub struct Margins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Margins {
    pub const fn uniform(m: f32) -> Self {
        Self {
            left: m,
            right: m,
            top: m,
            bottom: m,
        }
    }
}

/// Whether `pos` has left the screen by more than the margins
pub fn off_screen(pos: Vec2, margins: Margins) -> bool {
    pos.x < -margins.left
        || pos.x > WORLD_WIDTH + margins.right
        || pos.y < -margins.top
        || pos.y > WORLD_HEIGHT + margins.bottom
}
