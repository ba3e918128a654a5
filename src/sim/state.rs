//! Game state and core simulation types
//!
//! `GameState` is the single owned aggregate the tick driver advances. All
//! subsystems borrow into it; nothing keeps its own copy.

use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::{
    Bomb, BombParams, Bunker, Enemy, EnemyProjectile, FloatText, Particle, Shockwave, Shot, Toast,
    UpgradeDrop,
};
use super::progression::{current_stage, place_bunkers};
use super::queue::DelayQueue;
use super::random::{SimRng, seeded};
use super::terrain::Terrain;
use super::upgrades::{UpgradeKind, Upgrades};
use crate::audio::AudioCue;
use crate::consts::*;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended; only ambient effects keep animating
    GameOver,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    /// Lives reached zero
    LivesExhausted,
    /// Limited-bomb runs: no bombs left, none in flight, bunkers remaining
    BombsExhausted,
}

impl GameOverReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameOverReason::LivesExhausted => "lives exhausted",
            GameOverReason::BombsExhausted => "bombs exhausted",
        }
    }
}

/// Notifications for collaborators outside the simulation, drained per frame
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Fire-and-forget sound cue
    Cue(AudioCue),
    /// High score went up; persist it
    HighScore(u64),
    /// Stage derived from score changed
    StageChanged(u32),
    /// Run ended
    GameOver(GameOverReason),
}

/// Player-selected bomb firing profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BombMode {
    #[default]
    Standard,
    Cluster,
    Mega,
    Runner,
}

impl BombMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BombMode::Standard => "standard",
            BombMode::Cluster => "cluster",
            BombMode::Mega => "mega",
            BombMode::Runner => "runner",
        }
    }

    /// Number-key binding (1-4)
    pub fn from_slot(slot: u8) -> Option<Self> {
        match slot {
            1 => Some(BombMode::Standard),
            2 => Some(BombMode::Cluster),
            3 => Some(BombMode::Mega),
            4 => Some(BombMode::Runner),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown bomb mode '{0}'")]
pub struct ParseBombModeError(pub String);

impl FromStr for BombMode {
    type Err = ParseBombModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" | "std" => Ok(BombMode::Standard),
            "cluster" => Ok(BombMode::Cluster),
            "mega" => Ok(BombMode::Mega),
            "runner" => Ok(BombMode::Runner),
            _ => Err(ParseBombModeError(s.to_string())),
        }
    }
}

/// The player's craft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub w: f32,
    pub h: f32,
    pub speed: f32,
    /// Horizontal displacement last frame (feeds bomb launch velocity)
    pub vx: f32,
    /// Post-hit grace period in frames
    pub invuln_timer: i32,
    /// Frames until the next bomb drop is allowed
    pub bomb_cooldown: i32,
    /// Frames until the next autonomous volley
    pub shot_cooldown: i32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Self::spawn_point(),
            w: PLAYER_WIDTH,
            h: PLAYER_HEIGHT,
            speed: PLAYER_BASE_SPEED,
            vx: 0.0,
            invuln_timer: SPAWN_INVULN,
            bomb_cooldown: 0,
            shot_cooldown: 0,
        }
    }
}

impl Player {
    pub fn spawn_point() -> Vec2 {
        Vec2::new(WORLD_WIDTH * 0.3, WORLD_HEIGHT * 0.45)
    }

    /// Base speed for a speed upgrade level
    pub fn speed_for_level(level: u8) -> f32 {
        PLAYER_BASE_SPEED + (level.max(1) - 1) as f32 * PLAYER_SPEED_PER_LEVEL
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invuln_timer > 0
    }
}

/// Per-run configuration knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// When false, each level grants a finite bomb stock
    pub unlimited_bombs: bool,
    pub starting_lives: u8,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            unlimited_bombs: true,
            starting_lives: STARTING_LIVES,
        }
    }
}

/// Complete run state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: SimRng,
    pub config: RunConfig,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub game_over_reason: Option<GameOverReason>,
    /// Human-readable end-of-run message
    pub message: String,

    pub score: u64,
    /// Loaded from and saved to the score store by the host
    pub high_score: u64,
    pub combo: f64,
    /// Frames before the combo starts decaying
    pub combo_timer: i32,
    pub lives: u8,
    /// Remaining bombs in limited-bomb runs
    pub bombs: u32,
    pub upgrades: Upgrades,
    pub bomb_mode: BombMode,
    pub volley_counter: u64,
    pub mega_cooldown: i32,
    pub pulse_cooldown: i32,
    pub enemy_spawn_timer: i32,
    pub scroll_speed: f32,
    /// Stage seen last tick, to report changes
    pub last_stage: u32,

    pub player: Player,
    pub terrain: Terrain,
    pub bunkers: Vec<Bunker>,
    pub enemies: Vec<Enemy>,
    pub shots: Vec<Shot>,
    pub shot_queue: DelayQueue<Shot>,
    pub enemy_projectiles: Vec<EnemyProjectile>,
    pub upgrade_drops: Vec<UpgradeDrop>,
    pub bombs_falling: Vec<Bomb>,
    pub bomb_queue: DelayQueue<BombParams>,

    /// Visual-only pools
    pub particles: Vec<Particle>,
    pub shockwaves: Vec<Shockwave>,
    pub float_texts: Vec<FloatText>,
    pub toast: Toast,

    /// Pending notifications for the host
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new run with the given seed
    pub fn new(seed: u64, config: RunConfig) -> Self {
        Self::with_rng(seed, seeded(seed), config)
    }

    /// Create a run around an explicit RNG stream
    pub fn with_rng(seed: u64, rng: SimRng, config: RunConfig) -> Self {
        let mut state = Self {
            seed,
            rng,
            config,
            time_ticks: 0,
            phase: GamePhase::Playing,
            game_over_reason: None,
            message: String::new(),
            score: 0,
            high_score: 0,
            combo: COMBO_MIN,
            combo_timer: 0,
            lives: config.starting_lives,
            bombs: 0,
            upgrades: Upgrades::default(),
            bomb_mode: BombMode::Standard,
            volley_counter: 0,
            mega_cooldown: 0,
            pulse_cooldown: 0,
            enemy_spawn_timer: 0,
            scroll_speed: 0.0,
            last_stage: 1,
            player: Player::default(),
            terrain: Terrain::from_columns(Vec::new()),
            bunkers: Vec::new(),
            enemies: Vec::new(),
            shots: Vec::new(),
            shot_queue: DelayQueue::new(),
            enemy_projectiles: Vec::new(),
            upgrade_drops: Vec::new(),
            bombs_falling: Vec::new(),
            bomb_queue: DelayQueue::new(),
            particles: Vec::new(),
            shockwaves: Vec::new(),
            float_texts: Vec::new(),
            toast: Toast::default(),
            events: Vec::new(),
        };
        state.reset();
        state
    }

    /// Current difficulty stage, always derived from score
    #[inline]
    pub fn stage(&self) -> u32 {
        current_stage(self.score)
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Start a fresh run: score, lives, upgrades and the whole world
    ///
    /// The high score and RNG stream carry over.
    pub fn reset(&mut self) {
        self.score = 0;
        self.lives = self.config.starting_lives;
        self.upgrades = Upgrades::default();
        self.bomb_mode = BombMode::Standard;
        self.mega_cooldown = 0;
        self.time_ticks = 0;
        self.phase = GamePhase::Playing;
        self.game_over_reason = None;
        self.events.clear();
        self.init_level();
        self.last_stage = self.stage();
        log::info!(
            "Run started (seed {}, {} bunkers, {} columns)",
            self.seed,
            self.bunkers.len(),
            self.terrain.len()
        );
    }

    /// Regenerate terrain and entities for the current stage
    pub fn init_level(&mut self) {
        let stage = self.stage();
        self.terrain = Terrain::generate(stage, &mut self.rng);
        self.bunkers.clear();
        place_bunkers(self, stage);

        self.bombs_falling.clear();
        self.upgrade_drops.clear();
        self.enemy_projectiles.clear();
        self.float_texts.clear();
        self.shockwaves.clear();
        self.bomb_queue.clear();
        self.shot_queue.clear();
        self.shots.clear();
        self.enemies.clear();
        self.particles.clear();
        self.enemy_spawn_timer = 102;
        self.message.clear();

        self.bombs = if self.config.unlimited_bombs {
            0
        } else {
            42 + stage * 4
        };
        self.scroll_speed = (BASE_SCROLL_SPEED + stage as f32 * SCROLL_SPEED_PER_STAGE)
            * SCROLL_SPEED_SCALE;

        self.player = Player {
            speed: Player::speed_for_level(self.upgrades.level(UpgradeKind::Speed)),
            ..Player::default()
        };
        self.combo = COMBO_MIN;
        self.combo_timer = 0;
        self.pulse_cooldown = 0;
        self.volley_counter = 0;
        self.toast = Toast::default();
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn cue(&mut self, cue: AudioCue) {
        self.events.push(GameEvent::Cue(cue));
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    pub fn deduct_score(&mut self, points: u64) {
        self.score = self.score.saturating_sub(points);
    }

    /// End the run
    pub fn end_run(&mut self, reason: GameOverReason, message: String) {
        if self.is_game_over() {
            return;
        }
        log::info!(
            "Game over ({}): score {}, stage {}",
            reason.as_str(),
            self.score,
            self.stage()
        );
        self.phase = GamePhase::GameOver;
        self.game_over_reason = Some(reason);
        self.message = message;
        self.emit(GameEvent::GameOver(reason));
    }
}
