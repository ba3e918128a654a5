//! Entity pools: enemies, bunkers, projectiles, pickups and ambient effects

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::upgrades::UpgradeKind;

/// Bunker paint colors (0xRRGGBB)
pub const BUNKER_PALETTE: [u32; 4] = [0xf6d15c, 0xf48f6f, 0xff5d88, 0x77f0c1];

/// Flying enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Scout,
    Bruiser,
    Diver,
    Zigzag,
}

/// Base stat ranges for an enemy archetype
#[derive(Debug, Clone, Copy)]
pub struct Archetype {
    pub hp_base: f32,
    pub hp_per_stage: f32,
    pub width: (i32, i32),
    pub height: (i32, i32),
    pub speed: (f32, f32),
    pub drift: (f32, f32),
    pub score_base: u64,
}

impl EnemyKind {
    pub fn archetype(self) -> Archetype {
        match self {
            EnemyKind::Scout => Archetype {
                hp_base: 14.0,
                hp_per_stage: 2.0,
                width: (16, 22),
                height: (9, 13),
                speed: (1.1, 2.0),
                drift: (0.6, 1.2),
                score_base: 48,
            },
            EnemyKind::Bruiser => Archetype {
                hp_base: 30.0,
                hp_per_stage: 4.0,
                width: (22, 30),
                height: (12, 16),
                speed: (0.75, 1.35),
                drift: (0.2, 0.45),
                score_base: 92,
            },
            EnemyKind::Diver => Archetype {
                hp_base: 18.0,
                hp_per_stage: 3.0,
                width: (18, 24),
                height: (10, 14),
                speed: (1.2, 1.8),
                drift: (0.35, 0.7),
                score_base: 72,
            },
            EnemyKind::Zigzag => Archetype {
                hp_base: 20.0,
                hp_per_stage: 3.0,
                width: (18, 24),
                height: (10, 14),
                speed: (1.0, 1.6),
                drift: (0.8, 1.4),
                score_base: 78,
            },
        }
    }
}

/// A flying hostile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub w: f32,
    pub h: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Score awarded on kill
    pub value: u64,
    pub elite: bool,
    /// Leftward speed on top of the scroll drift
    pub speed: f32,
    /// Oscillator phase
    pub wobble: f32,
    pub drift: f32,
    /// Divers only dive when armed
    pub dive_armed: bool,
    pub fire_cooldown: i32,
}

/// Bunker size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BunkerTier {
    Small,
    Medium,
    Large,
}

/// Per-tier stat ranges
#[derive(Debug, Clone, Copy)]
pub struct TierProfile {
    pub radius: (i32, i32),
    pub hp_base: i32,
    pub hp_per_stage: i32,
    pub bounty_base: u64,
    pub bounty_per_stage: u64,
    pub upgrade_chance: f32,
}

impl BunkerTier {
    pub fn profile(self) -> TierProfile {
        match self {
            BunkerTier::Small => TierProfile {
                radius: (5, 7),
                hp_base: 20,
                hp_per_stage: 5,
                bounty_base: 120,
                bounty_per_stage: 28,
                upgrade_chance: 0.08,
            },
            BunkerTier::Medium => TierProfile {
                radius: (8, 11),
                hp_base: 34,
                hp_per_stage: 7,
                bounty_base: 185,
                bounty_per_stage: 36,
                upgrade_chance: 0.18,
            },
            BunkerTier::Large => TierProfile {
                radius: (12, 16),
                hp_base: 52,
                hp_per_stage: 10,
                bounty_base: 280,
                bounty_per_stage: 44,
                upgrade_chance: 0.38,
            },
        }
    }
}

/// A ground installation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bunker {
    pub pos: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub radius: f32,
    pub tier: BunkerTier,
    pub bounty: u64,
    pub upgrade: Option<UpgradeKind>,
    pub color: u32,
}

impl Bunker {
    pub fn is_destroyed(&self) -> bool {
        self.hp <= 0.0
    }
}

/// Ordnance variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BombKind {
    Standard,
    Cluster,
    Runner,
    Mega,
    Bomblet,
}

/// Bomb lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BombPhase {
    /// Ballistic fall
    Air,
    /// Skimming along the floor, bursting as it goes
    Runner,
}

/// Launch parameters; unset fields are filled from the player at spawn time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BombParams {
    pub kind: BombKind,
    pub blast: f32,
    pub vy: f32,
    pub pos: Option<Vec2>,
    pub vx_world: Option<f32>,
}

impl BombParams {
    pub fn new(kind: BombKind, blast: f32, vy: f32) -> Self {
        Self {
            kind,
            blast,
            vy,
            pos: None,
            vx_world: None,
        }
    }

    pub fn at(mut self, pos: Vec2) -> Self {
        self.pos = Some(pos);
        self
    }

    pub fn with_vx_world(mut self, vx_world: f32) -> Self {
        self.vx_world = Some(vx_world);
        self
    }
}

/// A falling or running bomb
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bomb {
    pub kind: BombKind,
    pub pos: Vec2,
    /// Horizontal velocity in world space (screen velocity is this minus scroll)
    pub vx_world: f32,
    pub vy: f32,
    pub blast: f32,
    pub phase: BombPhase,
    pub runner_timer: i32,
    pub runner_steps: u32,
}

/// Player projectile kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotKind {
    Laser,
    Pulse,
    Rocket,
    Blast,
    Shard,
}

impl ShotKind {
    /// Whether a hit detonates the shot with splash
    pub fn detonates(self) -> bool {
        matches!(self, ShotKind::Rocket | ShotKind::Blast)
    }
}

/// A player projectile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub kind: ShotKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub radius: f32,
    /// Frames left
    pub life: i32,
    /// Extra hits before the shot is spent
    pub pierce: u32,
    pub blast_radius: f32,
    pub terrain_damage: f32,
    pub wobble: f32,
    pub wobble_speed: f32,
    pub homing: f32,
    /// Pulse shots with split fan out into shards on first hit
    pub split: u32,
}

impl Shot {
    /// Plain laser defaults at `pos`
    pub fn new(kind: ShotKind, pos: Vec2, vel: Vec2) -> Self {
        Self {
            kind,
            pos,
            vel,
            damage: 10.0,
            radius: 3.0,
            life: 80,
            pierce: 0,
            blast_radius: 0.0,
            terrain_damage: 0.0,
            wobble: 0.0,
            wobble_speed: 0.22,
            homing: 0.0,
            split: 0,
        }
    }
}

/// An enemy bullet aimed at a jittered snapshot of the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyProjectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: i32,
    pub elite: bool,
}

/// A pickup released by a destroyed bunker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeDrop {
    pub pos: Vec2,
    pub kind: UpgradeKind,
    pub radius: f32,
    pub bob_phase: f32,
}

/// Debris particle (not gameplay-affecting)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: i32,
    pub color: u32,
}

/// Expanding ring (not gameplay-affecting)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shockwave {
    pub pos: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    pub life: i32,
    pub max_life: i32,
    pub color: u32,
}

/// Floating score/damage label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatText {
    pub pos: Vec2,
    pub text: String,
    pub color: u32,
    pub size: f32,
    pub life: i32,
    pub max_life: i32,
}

/// Short status message
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Toast {
    pub text: String,
    pub timer: i32,
}

impl Toast {
    pub fn is_visible(&self) -> bool {
        self.timer > 0 && !self.text.is_empty()
    }
}
