//! Upgrade kinds and per-run upgrade levels
//!
//! Every upgrade is a small capped counter. Picking one up at its cap pays
//! out a flat score bonus instead.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::random::RngExt;

/// Upgrade kinds carried by bunkers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    Weapon,
    Bomb,
    Speed,
    Shield,
    Pulse,
    Rapid,
    Magnet,
    Chain,
}

/// Per-kind leveling rules
#[derive(Debug, Clone, Copy)]
pub struct UpgradeRule {
    pub initial: u8,
    pub max: u8,
    /// Score awarded when picked up at max level
    pub overflow_bonus: u64,
    /// HUD tag letter
    pub tag: char,
    pub label: &'static str,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 8] = [
        UpgradeKind::Weapon,
        UpgradeKind::Bomb,
        UpgradeKind::Speed,
        UpgradeKind::Shield,
        UpgradeKind::Pulse,
        UpgradeKind::Rapid,
        UpgradeKind::Magnet,
        UpgradeKind::Chain,
    ];

    /// Drop weights, cumulative order matters for reproducible rolls
    const WEIGHTS: [(UpgradeKind, f32); 8] = [
        (UpgradeKind::Weapon, 0.24),
        (UpgradeKind::Bomb, 0.18),
        (UpgradeKind::Rapid, 0.14),
        (UpgradeKind::Magnet, 0.12),
        (UpgradeKind::Chain, 0.10),
        (UpgradeKind::Speed, 0.08),
        (UpgradeKind::Shield, 0.08),
        (UpgradeKind::Pulse, 0.06),
    ];

    pub fn rule(self) -> UpgradeRule {
        let (initial, max, overflow_bonus, tag, label) = match self {
            UpgradeKind::Weapon => (1, 4, 120, 'W', "Weapon"),
            UpgradeKind::Bomb => (1, 4, 120, 'B', "Bomb"),
            UpgradeKind::Speed => (1, 4, 120, 'S', "Speed"),
            UpgradeKind::Rapid => (0, 3, 120, 'R', "Rapid"),
            UpgradeKind::Magnet => (0, 3, 120, 'M', "Magnet"),
            UpgradeKind::Chain => (0, 3, 120, 'C', "Chain"),
            UpgradeKind::Shield => (0, 2, 140, 'D', "Shield"),
            UpgradeKind::Pulse => (0, 2, 140, 'P', "Pulse"),
        };
        UpgradeRule {
            initial,
            max,
            overflow_bonus,
            tag,
            label,
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Weighted roll over the drop table
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let roll = rng.unit();
        let mut acc = 0.0;
        for (kind, weight) in Self::WEIGHTS {
            acc += weight;
            if roll < acc {
                return kind;
            }
        }
        UpgradeKind::Pulse
    }
}

/// Result of collecting an upgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeOutcome {
    /// Level went up to the contained value
    Leveled(u8),
    /// Already maxed, score bonus paid instead
    Overflow(u64),
}

/// Current upgrade levels for a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upgrades {
    levels: [u8; 8],
}

impl Default for Upgrades {
    fn default() -> Self {
        let mut levels = [0; 8];
        for kind in UpgradeKind::ALL {
            levels[kind.index()] = kind.rule().initial;
        }
        Self { levels }
    }
}

impl Upgrades {
    #[inline]
    pub fn level(&self, kind: UpgradeKind) -> u8 {
        self.levels[kind.index()]
    }

    /// Apply a collected upgrade
    pub fn apply(&mut self, kind: UpgradeKind) -> UpgradeOutcome {
        let rule = kind.rule();
        let level = &mut self.levels[kind.index()];
        if *level < rule.max {
            *level += 1;
            UpgradeOutcome::Leveled(*level)
        } else {
            UpgradeOutcome::Overflow(rule.overflow_bonus)
        }
    }

    /// Spend a shield charge; returns the charges left, or `None` if there were none
    pub fn consume_shield(&mut self) -> Option<u8> {
        let shield = &mut self.levels[UpgradeKind::Shield.index()];
        if *shield == 0 {
            return None;
        }
        *shield -= 1;
        Some(*shield)
    }

    /// Compact HUD line, e.g. `W1 B1 R0 M0 C0 S1 D0 P0`
    pub fn summary(&self) -> String {
        [
            UpgradeKind::Weapon,
            UpgradeKind::Bomb,
            UpgradeKind::Rapid,
            UpgradeKind::Magnet,
            UpgradeKind::Chain,
            UpgradeKind::Speed,
            UpgradeKind::Shield,
            UpgradeKind::Pulse,
        ]
        .iter()
        .map(|k| format!("{}{}", k.rule().tag, self.level(*k)))
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// Toast text for an upgrade pickup
pub fn upgrade_toast(kind: UpgradeKind, outcome: UpgradeOutcome) -> String {
    let rule = kind.rule();
    match (kind, outcome) {
        (UpgradeKind::Shield, UpgradeOutcome::Leveled(2)) => "Double Shield Online".to_string(),
        (UpgradeKind::Shield, UpgradeOutcome::Leveled(_)) => "Shield Online".to_string(),
        (_, UpgradeOutcome::Leveled(level)) => format!("{} Up {}{}", rule.label, rule.tag, level),
        (_, UpgradeOutcome::Overflow(bonus)) => format!("{} Max +{}", rule.label, bonus),
    }
}
