//! Degradius - a side-scrolling cave bomber
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain, entities, damage, spawner, tick)
//! - `session`: Per-frame driver wiring the simulation to its collaborators
//! - `audio`: Audio cue vocabulary, synthesis recipes and sinks
//! - `hud`: Read-only HUD snapshot
//! - `persistence`: High score storage
//! - `settings`: Run configuration

pub mod audio;
pub mod highscores;
pub mod hud;
pub mod persistence;
pub mod session;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use hud::HudSnapshot;
pub use session::Session;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// World (screen) dimensions in pixels
    pub const WORLD_WIDTH: f32 = 960.0;
    pub const WORLD_HEIGHT: f32 = 540.0;

    /// Width of one terrain column
    pub const CELL_W: f32 = 8.0;
    /// Number of live terrain columns (screen plus two spare)
    pub const COLS: usize = (WORLD_WIDTH as usize) / (CELL_W as usize) + 2;

    /// Frames per second the tuning values assume
    pub const FRAMES_PER_SECOND: u32 = 60;

    /// Global scroll speed scale (the cave crawls)
    pub const SCROLL_SPEED_SCALE: f32 = 1.0 / 6.0;
    pub const BASE_SCROLL_SPEED: f32 = 3.4;
    pub const SCROLL_SPEED_PER_STAGE: f32 = 0.16;

    /// Stage ladder
    pub const MAX_STAGE: u32 = 30;
    pub const FIRST_STAGE_SCORE: u64 = 120_000;
    pub const STAGE_GROWTH: f64 = 1.28;

    /// Combo multiplier bounds and timing
    pub const COMBO_MIN: f64 = 1.0;
    pub const COMBO_MAX: f64 = 4.5;
    pub const COMBO_PER_KILL: f64 = 0.18;
    pub const COMBO_DECAY: f64 = 0.02;
    pub const COMBO_WINDOW: i32 = 210;

    /// Player defaults
    pub const PLAYER_WIDTH: f32 = 34.0;
    pub const PLAYER_HEIGHT: f32 = 16.0;
    pub const PLAYER_BASE_SPEED: f32 = 4.8;
    pub const PLAYER_SPEED_PER_LEVEL: f32 = 0.55;
    pub const SPAWN_INVULN: i32 = 70;
    pub const HIT_INVULN: i32 = 130;
    pub const STARTING_LIVES: u8 = 3;

    /// Bombs
    pub const BASE_BLAST: f32 = 82.0;
    pub const BLAST_PER_BOMB_LEVEL: f32 = 0.22;
    pub const BOMB_GRAVITY: f32 = 0.16;
    pub const MEGA_COOLDOWN: i32 = 720;

    /// Bunker population kept alive by the scroller
    pub const TARGET_BUNKERS: usize = 10;
    pub const BUNKER_ESCAPE_PENALTY: u64 = 75;

    /// Frames a toast stays on screen
    pub const TOAST_FRAMES: i32 = 120;
}

/// Clamp that tolerates an inverted range by favouring `min`
///
/// Corridor bounds can cross in tight spots, and `f32::clamp` panics there.
#[inline]
pub fn clamp(v: f32, min: f32, max: f32) -> f32 {
    v.min(max).max(min)
}

/// Integer flavour of [`clamp`]
#[inline]
pub fn clamp_i32(v: i32, min: i32, max: i32) -> i32 {
    v.min(max).max(min)
}
