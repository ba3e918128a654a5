//! Ambient visual effects: particles, shockwaves, floating labels, toasts
//!
//! None of this feeds back into gameplay. The pools keep animating after
//! game over so the final explosion plays out.

use glam::Vec2;

use super::entities::{FloatText, Particle, Shockwave};
use super::random::RngExt;
use super::state::GameState;
use crate::consts::TOAST_FRAMES;

/// Common effect colors (0xRRGGBB)
pub mod colors {
    pub const BOMB_BLAST: u32 = 0xffc866;
    pub const BOMB_RING: u32 = 0xffefb8;
    pub const CHAIN_BLAST: u32 = 0xffb36a;
    pub const CHAIN_RING: u32 = 0xffd8a6;
    pub const ENEMY_DEATH: u32 = 0x9fd5ff;
    pub const ENEMY_CRASH: u32 = 0xff6666;
    pub const PLAYER_DEATH: u32 = 0xff8080;
    pub const PLAYER_RING: u32 = 0xffb0b0;
    pub const SHIELD_RING: u32 = 0x97f7ff;
    pub const SCORE_TEXT: u32 = 0xa6ffbf;
    pub const BOUNTY_TEXT: u32 = 0xffe6a8;
    pub const COMBO_TEXT: u32 = 0xffd0ff;
    pub const HIT_TEXT: u32 = 0x90ecff;
    pub const BLAST_TEXT: u32 = 0xffcf9f;
    pub const PICKUP: u32 = 0x8fffe6;
    pub const PULSE_RING: u32 = 0x9cf4ff;
    pub const PULSE_BURST: u32 = 0xb8f9ff;
}

impl GameState {
    /// Burst of `count` debris particles
    pub fn spawn_explosion(&mut self, pos: Vec2, color: u32, count: usize) {
        for _ in 0..count {
            let a = self.rng.frange(0.0, std::f32::consts::TAU);
            let s = self.rng.frange(0.8, 3.6);
            let life = self.rng.irange(18, 40);
            self.particles.push(Particle {
                pos,
                vel: Vec2::new(a.cos() * s, a.sin() * s - 0.6),
                life,
                color,
            });
        }
    }

    pub fn spawn_shockwave(&mut self, pos: Vec2, max_radius: f32, life: i32, color: u32) {
        self.shockwaves.push(Shockwave {
            pos,
            radius: 8.0,
            max_radius,
            life,
            max_life: life,
            color,
        });
    }

    pub fn spawn_float_text(
        &mut self,
        pos: Vec2,
        text: impl Into<String>,
        color: u32,
        size: f32,
        life: i32,
    ) {
        self.float_texts.push(FloatText {
            pos,
            text: text.into(),
            color,
            size,
            life,
            max_life: life,
        });
    }

    pub fn show_toast(&mut self, text: impl Into<String>) {
        self.toast.text = text.into();
        self.toast.timer = TOAST_FRAMES;
    }

    /// Ring of explosions around the player when the last life goes
    pub fn spawn_final_burst(&mut self) {
        let center = self.player.pos;
        for i in 0..12 {
            let a = std::f32::consts::TAU * i as f32 / 12.0;
            let d = 24.0 + i as f32 * 7.0;
            let pos = center + Vec2::new(a.cos() * d, a.sin() * d * 0.75);
            let color = if i % 2 == 0 { 0xff8459 } else { 0xffd088 };
            self.spawn_explosion(pos, color, 80 - i * 2);
            self.spawn_shockwave(pos, 110.0 + i as f32 * 8.0, 24, 0xffd6a4);
        }
    }
}

/// Advance particles, labels, rings and the toast by one frame
pub fn update_ambient(state: &mut GameState) {
    for p in &mut state.particles {
        p.pos += p.vel;
        p.vel.y += 0.03;
        p.life -= 1;
    }
    state.particles.retain(|p| p.life > 0);

    for t in &mut state.float_texts {
        t.pos.y -= 0.7;
        t.pos.x += ((t.max_life - t.life) as f32 * 0.2).sin() * 0.2;
        t.life -= 1;
    }
    state.float_texts.retain(|t| t.life > 0);

    for s in &mut state.shockwaves {
        s.life -= 1;
        let t = 1.0 - s.life as f32 / s.max_life.max(1) as f32;
        s.radius = 8.0 + (s.max_radius - 8.0) * t;
    }
    state.shockwaves.retain(|s| s.life > 0);

    if state.toast.timer > 0 {
        state.toast.timer -= 1;
    }
    if state.toast.timer <= 0 {
        state.toast.text.clear();
    }
}
