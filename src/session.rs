//! Per-frame driver
//!
//! Owns the game state and its collaborators: the score store, the cue sink
//! and the leaderboard. Each frame ticks the simulation, routes the drained
//! events and returns a HUD snapshot.

use crate::audio::CueSink;
use crate::highscores::HighScores;
use crate::hud::HudSnapshot;
use crate::persistence::ScoreStore;
use crate::settings::Settings;
use crate::sim::state::{GameEvent, GameOverReason, GameState};
use crate::sim::tick::{TickInput, tick};

/// Minimum frames between two high-score writes
pub const SAVE_INTERVAL: u32 = 60;

/// Outcome of a session, reported by [`Session::finish`]
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub seed: u64,
    pub score: u64,
    pub high_score: u64,
    pub stage: u32,
    pub frames: u64,
    pub reason: Option<GameOverReason>,
    /// Leaderboard rank of the last recorded run
    pub rank: Option<usize>,
}

pub struct Session<S: ScoreStore, C: CueSink> {
    state: GameState,
    store: S,
    sink: C,
    leaderboard: HighScores,
    pending_save: Option<u64>,
    frames_since_save: u32,
    last_rank: Option<usize>,
}

impl<S: ScoreStore, C: CueSink> Session<S, C> {
    /// Start a run, seeding the high score from the store
    pub fn new(settings: &Settings, seed: u64, mut store: S, sink: C) -> Self {
        let mut state = GameState::new(seed, settings.run_config());
        state.high_score = store.load();
        Self {
            state,
            store,
            sink,
            leaderboard: HighScores::new(),
            pending_save: None,
            frames_since_save: SAVE_INTERVAL,
            last_rank: None,
        }
    }

    pub fn with_leaderboard(mut self, leaderboard: HighScores) -> Self {
        self.leaderboard = leaderboard;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sink(&self) -> &C {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut C {
        &mut self.sink
    }

    pub fn leaderboard(&self) -> &HighScores {
        &self.leaderboard
    }

    /// Advance one frame
    pub fn frame(&mut self, input: &TickInput) -> HudSnapshot {
        tick(&mut self.state, input);

        for event in self.state.drain_events() {
            match event {
                GameEvent::Cue(cue) => self.sink.play(cue),
                GameEvent::HighScore(score) => self.pending_save = Some(score),
                GameEvent::StageChanged(stage) => {
                    log::debug!("Stage {} event routed", stage);
                }
                GameEvent::GameOver(reason) => {
                    log::info!("Run over: {}", reason.as_str());
                    self.record_run();
                    self.flush();
                }
            }
        }

        self.frames_since_save = self.frames_since_save.saturating_add(1);
        if self.pending_save.is_some() && self.frames_since_save >= SAVE_INTERVAL {
            self.flush();
        }

        HudSnapshot::from_state(&self.state)
    }

    /// Write any pending high score now
    pub fn flush(&mut self) {
        if let Some(score) = self.pending_save.take() {
            log::debug!("Saving high score {}", score);
            self.store.save(score);
            self.frames_since_save = 0;
        }
    }

    /// Close the session: record an unfinished run and flush the store
    pub fn finish(mut self) -> (RunSummary, HighScores) {
        if !self.state.is_game_over() {
            self.record_run();
        }
        self.flush();

        let summary = RunSummary {
            seed: self.state.seed,
            score: self.state.score,
            high_score: self.state.high_score,
            stage: self.state.stage(),
            frames: self.state.time_ticks,
            reason: self.state.game_over_reason,
            rank: self.last_rank,
        };
        (summary, self.leaderboard)
    }

    fn record_run(&mut self) {
        let rank = self.leaderboard.add_score(
            self.state.score,
            self.state.stage(),
            self.state.time_ticks,
        );
        if let Some(rank) = rank {
            log::info!("Leaderboard rank #{} with {}", rank, self.state.score);
        }
        self.last_rank = rank;
    }
}
