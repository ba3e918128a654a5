//! Countdown queues for "fire now, materialize later" fan-out
//!
//! Multi-drop bomb modes and chained side shots park their payloads here.
//! The tick driver drains each queue once per frame before the pass that
//! consumes it.

use serde::{Deserialize, Serialize};

/// A payload waiting `delay` more frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scheduled<T> {
    pub delay: i32,
    pub payload: T,
}

/// Frame-countdown queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayQueue<T> {
    entries: Vec<Scheduled<T>>,
}

impl<T> Default for DelayQueue<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> DelayQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, delay: i32, payload: T) {
        self.entries.push(Scheduled { delay, payload });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Count every entry down one frame and hand back those that are due,
    /// in the order they were queued
    pub fn drain_due(&mut self) -> Vec<T> {
        let mut due = Vec::new();
        let mut pending = Vec::with_capacity(self.entries.len());
        for mut entry in self.entries.drain(..) {
            entry.delay -= 1;
            if entry.delay > 0 {
                pending.push(entry);
            } else {
                due.push(entry.payload);
            }
        }
        self.entries = pending;
        due
    }

    /// Frames until the soonest entry is due
    pub fn next_due_in(&self) -> Option<i32> {
        self.entries.iter().map(|e| e.delay).min()
    }
}
