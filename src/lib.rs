//! Interval Runner - an interval countdown sequencer for treadmill workouts
//!
//! This library provides an ordered queue of timed segments, a countdown
//! engine that plays them back with pause/resume/stop control, completion
//! notifications, and named presets persisted locally.

pub mod config;
pub mod queue;
pub mod engine;
pub mod notify;
pub mod presets;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use engine::{Engine, EngineSnapshot, RunStatus};
pub use queue::{ItemFields, Queue, TimerItem};
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
