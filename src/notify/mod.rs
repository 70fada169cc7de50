//! Segment completion notifications
//!
//! The countdown engine hands every natural completion to a
//! [`NotificationSink`]. Sinks are fire-and-forget: they cannot report
//! failure back to the engine.

pub mod alert;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::queue::ItemFields;

pub use alert::{AlertNotifier, Permission};

/// Receiver of "segment completed" signals
pub trait NotificationSink: Send + Sync {
    /// Called once per completed segment, with the item that follows it in
    /// the queue, or `None` when the queue is exhausted
    fn notify(&self, completed: &ItemFields, next: Option<&ItemFields>);
}

/// A user-facing completion message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionNotice {
    pub title: String,
    pub body: String,
    pub completed: ItemFields,
    pub next: Option<ItemFields>,
    pub timestamp: DateTime<Utc>,
}

impl CompletionNotice {
    pub fn new(completed: &ItemFields, next: Option<&ItemFields>) -> Self {
        let body = match next {
            Some(next) => format!("Next: {}", next),
            None => "All timers complete!".to_string(),
        };
        Self {
            title: format!("Timer Complete! ({})", completed),
            body,
            completed: *completed,
            next: next.copied(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_text_names_next_segment() {
        let notice = CompletionNotice::new(
            &ItemFields::new(1, 30, 6.0),
            Some(&ItemFields::new(2, 0, 8.5)),
        );
        assert_eq!(notice.title, "Timer Complete! (1m 30s @ 6 km/h)");
        assert_eq!(notice.body, "Next: 2m 0s @ 8.5 km/h");
    }

    #[test]
    fn notice_text_for_last_segment() {
        let notice = CompletionNotice::new(&ItemFields::new(0, 45, 5.0), None);
        assert_eq!(notice.body, "All timers complete!");
        assert!(notice.next.is_none());
    }
}
