//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per frame, no wall-clock time
//! - Seeded RNG only, owned by the game state
//! - Stable iteration order (pool order, removal by descending index)
//! - No rendering, audio or file I/O; collaborators get events

pub mod collision;
pub mod damage;
pub mod effects;
pub mod entities;
pub mod progression;
pub mod queue;
pub mod random;
pub mod state;
pub mod terrain;
pub mod tick;
pub mod upgrades;
pub mod weapons;

pub use entities::{Bomb, BombKind, Bunker, Enemy, EnemyKind, Shot, ShotKind, UpgradeDrop};
pub use state::{
    BombMode, GameEvent, GameOverReason, GamePhase, GameState, Player, RunConfig,
};
pub use terrain::Terrain;
pub use tick::{TickInput, tick};
pub use upgrades::{UpgradeKind, Upgrades};
