//! Point-in-time view of the engine for renderers

use serde::{Deserialize, Serialize};

use super::countdown::{Countdown, RunStatus};
use crate::queue::{format_time, Queue, TimerItem};

/// Everything a front-end needs to draw the active timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub status: RunStatus,
    pub active_index: Option<usize>,
    /// 1-based position of the active item, for "Timer N of M"
    pub position: Option<usize>,
    pub queue_len: usize,
    pub remaining: u64,
    pub remaining_display: String,
    pub active_item: Option<TimerItem>,
    /// Fraction of the active item already played, 0.0 ..= 1.0
    pub progress: f64,
}

impl EngineSnapshot {
    pub fn capture(countdown: &Countdown, queue: &Queue) -> Self {
        let active_item = countdown.active_index().and_then(|i| queue.get(i)).copied();
        let remaining = countdown.remaining();
        let progress = match active_item.map(|item| item.duration()) {
            Some(total) if total > 0 => (1.0 - remaining as f64 / total as f64).clamp(0.0, 1.0),
            _ => 0.0,
        };

        Self {
            status: countdown.status(),
            active_index: countdown.active_index(),
            position: countdown.active_index().map(|i| i + 1),
            queue_len: queue.len(),
            remaining,
            remaining_display: format_time(remaining),
            active_item,
            progress,
        }
    }

    pub fn idle(queue: &Queue) -> Self {
        Self::capture(&Countdown::new(), queue)
    }
}
