//! HUD snapshot
//!
//! Everything the status bar shows, copied out of the game state once per
//! frame so a host can render or serialize it without touching the sim.

use serde::Serialize;

use crate::consts::FRAMES_PER_SECOND;
use crate::sim::state::{BombMode, GamePhase, GameState};
use crate::sim::upgrades::UpgradeKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeLevel {
    pub kind: UpgradeKind,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub stage: u32,
    pub score: u64,
    pub high_score: u64,
    pub combo: f64,
    /// e.g. `W1 B1 R0 M0 C0 S1 D0 P0`
    pub upgrades: String,
    pub upgrade_levels: Vec<UpgradeLevel>,
    pub lives: u8,
    /// `None` when bombs are unlimited
    pub bombs: Option<u32>,
    pub bomb_mode: BombMode,
    /// Frames until mega bombs are available again
    pub mega_cooldown: i32,
    pub enemies: usize,
    pub toast: Option<String>,
    pub message: Option<String>,
    pub paused: bool,
    pub game_over: bool,
}

impl HudSnapshot {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            stage: state.stage(),
            score: state.score,
            high_score: state.high_score,
            combo: state.combo,
            upgrades: state.upgrades.summary(),
            upgrade_levels: UpgradeKind::ALL
                .iter()
                .map(|&kind| UpgradeLevel {
                    kind,
                    level: state.upgrades.level(kind),
                })
                .collect(),
            lives: state.lives,
            bombs: (!state.config.unlimited_bombs).then_some(state.bombs),
            bomb_mode: state.bomb_mode,
            mega_cooldown: state.mega_cooldown.max(0),
            enemies: state.enemies.len(),
            toast: state
                .toast
                .is_visible()
                .then(|| state.toast.text.clone()),
            message: (!state.message.is_empty()).then(|| state.message.clone()),
            paused: state.phase == GamePhase::Paused,
            game_over: state.phase == GamePhase::GameOver,
        }
    }

    pub fn mega_text(&self) -> String {
        if self.mega_cooldown <= 0 {
            "Mega Ready".to_string()
        } else {
            format!(
                "Mega CD {:.1}s",
                self.mega_cooldown as f32 / FRAMES_PER_SECOND as f32
            )
        }
    }

    pub fn bombs_text(&self) -> String {
        match self.bombs {
            Some(n) => format!("Bombs {}", n),
            None => "Bombs \u{221e}".to_string(),
        }
    }

    /// One-line status bar
    pub fn status_line(&self) -> String {
        format!(
            "Stage {} | Enemies {} | SCORE {} | HI SCORE {} | Combo x{:.1} | Power {} | x{} | Bomb {} | {} | {}",
            self.stage,
            self.enemies,
            self.score,
            self.high_score,
            self.combo,
            self.upgrades,
            self.lives,
            self.bomb_mode.as_str().to_uppercase(),
            self.mega_text(),
            self.bombs_text(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::RunConfig;

    #[test]
    fn test_fresh_run_snapshot() {
        let state = GameState::new(3, RunConfig::default());
        let hud = HudSnapshot::from_state(&state);
        assert_eq!(hud.stage, 1);
        assert_eq!(hud.score, 0);
        assert_eq!(hud.lives, 3);
        assert_eq!(hud.bombs, None);
        assert_eq!(hud.upgrades, "W1 B1 R0 M0 C0 S1 D0 P0");
        assert_eq!(hud.upgrade_levels.len(), 8);
        assert!(!hud.paused && !hud.game_over);
        assert_eq!(hud.mega_text(), "Mega Ready");
        assert_eq!(hud.bombs_text(), "Bombs \u{221e}");
    }

    #[test]
    fn test_limited_bombs_and_cooldown_text() {
        let config = RunConfig {
            unlimited_bombs: false,
            ..RunConfig::default()
        };
        let mut state = GameState::new(3, config);
        state.mega_cooldown = 90;
        let hud = HudSnapshot::from_state(&state);
        assert_eq!(hud.bombs, Some(state.bombs));
        assert_eq!(hud.mega_text(), "Mega CD 1.5s");
        assert!(hud.status_line().contains("Bombs "));
        assert!(hud.status_line().starts_with("Stage 1 | Enemies"));
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameState::new(3, RunConfig::default());
        let json = serde_json::to_string(&HudSnapshot::from_state(&state)).unwrap();
        assert!(json.contains("\"bomb_mode\":\"Standard\""));
        assert!(json.contains("\"bombs\":null"));
    }
}
