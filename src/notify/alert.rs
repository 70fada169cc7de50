//! Audible and visual completion alerts

use std::io::Write;

use tokio::sync::broadcast;
use tracing::{debug, info};

use super::{CompletionNotice, NotificationSink};
use crate::queue::ItemFields;

const BELL: &[u8] = b"\x07";

/// Whether visual notifications may be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

impl Permission {
    /// One-time permission request made at process start
    pub fn request(deny: bool) -> Self {
        let permission = if deny { Self::Denied } else { Self::Granted };
        info!("Visual notification permission: {:?}", permission);
        permission
    }

    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }
}

/// Sink that rings the terminal bell and, when permitted, publishes a visual
/// notice to log output and to event stream subscribers
#[derive(Debug, Clone)]
pub struct AlertNotifier {
    permission: Permission,
    bell: bool,
    notice_tx: broadcast::Sender<CompletionNotice>,
}

impl AlertNotifier {
    pub fn new(
        permission: Permission,
        bell: bool,
        notice_tx: broadcast::Sender<CompletionNotice>,
    ) -> Self {
        Self {
            permission,
            bell,
            notice_tx,
        }
    }

    fn ring_bell(&self) {
        let mut stderr = std::io::stderr();
        if let Err(e) = stderr.write_all(BELL).and_then(|()| stderr.flush()) {
            debug!("Failed to ring bell: {}", e);
        }
    }
}

impl NotificationSink for AlertNotifier {
    fn notify(&self, completed: &ItemFields, next: Option<&ItemFields>) {
        if self.bell {
            self.ring_bell();
        }

        if !self.permission.is_granted() {
            return;
        }

        let notice = CompletionNotice::new(completed, next);
        info!(body = %notice.body, "{}", notice.title);

        // No subscribers is not an error
        if self.notice_tx.send(notice).is_err() {
            debug!("No event subscribers for completion notice");
        }
    }
}
