//! Countdown engine module
//!
//! `countdown` holds the pure state machine; `runner` wraps it with the single
//! tick source and the notification sink.

pub mod countdown;
pub mod runner;
pub mod snapshot;

// Re-export main types
pub use countdown::{Completion, Countdown, Effect, RunStatus};
pub use runner::Engine;
pub use snapshot::EngineSnapshot;
