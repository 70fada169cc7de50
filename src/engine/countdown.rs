//! Countdown state machine.
//!
//! The machine is pure: it owns no timer and performs no I/O. Every command
//! and every tick returns the [`Effect`]s the caller must carry out, in order.
//! The runner in [`super::runner`] owns the tick source and applies them.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |
//!           +-- tick on last unit --> Running (next item) | Idle
//! Any -> stop -> Idle
//! ```
//!
//! A completed queue is reported through [`Effect::Notify`] with no next item;
//! it is not a resting state of its own.

use serde::{Deserialize, Serialize};

use crate::queue::{ItemFields, TimerItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Idle,
    Running,
    Paused,
}

/// A segment reached zero on its own
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    /// Queue index of the item that completed
    pub index: usize,
    pub completed: ItemFields,
    /// The item right after the completed one, whether or not it is playable
    pub next: Option<ItemFields>,
}

/// Side effects requested by a transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Drop the current tick source, if any
    CancelTicks,
    /// Begin a new periodic tick source
    ScheduleTicks,
    /// Hand a completion to the notification sink
    Notify(Completion),
}

/// Playback context: which item is active, how much of it is left, and
/// whether it is counting.
///
/// `active_index` is `Some` exactly when `status` is running or paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    active_index: Option<usize>,
    remaining: u64,
    status: RunStatus,
}

impl Countdown {
    pub fn new() -> Self {
        Self {
            active_index: None,
            remaining: 0,
            status: RunStatus::Idle,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    /// Seconds left in the active item
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_idle(&self) -> bool {
        self.status == RunStatus::Idle
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin playing `items[index]`, preempting whatever was active.
    ///
    /// Ignored when the index is out of range or the item has zero length.
    pub fn start(&mut self, items: &[TimerItem], index: usize) -> Vec<Effect> {
        let duration = match items.get(index) {
            Some(item) if item.duration() > 0 => item.duration(),
            _ => return Vec::new(),
        };
        self.activate(index, duration);
        vec![Effect::CancelTicks, Effect::ScheduleTicks]
    }

    pub fn pause(&mut self) -> Vec<Effect> {
        if self.status != RunStatus::Running {
            return Vec::new();
        }
        self.status = RunStatus::Paused;
        vec![Effect::CancelTicks]
    }

    pub fn resume(&mut self) -> Vec<Effect> {
        if self.status != RunStatus::Paused {
            return Vec::new();
        }
        self.status = RunStatus::Running;
        vec![Effect::CancelTicks, Effect::ScheduleTicks]
    }

    /// Manual cancellation. Never reports a completion.
    pub fn stop(&mut self) -> Vec<Effect> {
        self.clear();
        vec![Effect::CancelTicks]
    }

    /// Advance by one time unit. Only meaningful while running.
    pub fn tick(&mut self, items: &[TimerItem]) -> Vec<Effect> {
        if self.status != RunStatus::Running {
            return Vec::new();
        }
        if self.remaining > 1 {
            self.remaining -= 1;
            return Vec::new();
        }

        let mut effects = vec![Effect::CancelTicks];
        let Some(index) = self.active_index else {
            self.clear();
            return effects;
        };

        let next_index = index + 1;
        let next = items.get(next_index);
        if let Some(completed) = items.get(index) {
            effects.push(Effect::Notify(Completion {
                index,
                completed: completed.fields,
                next: next.map(|n| n.fields),
            }));
        }

        // A zero-length successor ends the chain instead of being skipped.
        match next {
            Some(item) if item.duration() > 0 => {
                self.activate(next_index, item.duration());
                effects.push(Effect::ScheduleTicks);
            }
            _ => self.clear(),
        }
        effects
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn activate(&mut self, index: usize, duration: u64) {
        self.active_index = Some(index);
        self.remaining = duration;
        self.status = RunStatus::Running;
    }

    fn clear(&mut self) {
        self.active_index = None;
        self.remaining = 0;
        self.status = RunStatus::Idle;
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}
