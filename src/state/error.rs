//! Application state errors

use thiserror::Error;

/// Reasons a user intent is refused before it reaches the queue or store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Queue cannot be edited while a workout is running or paused")]
    QueueLocked,

    #[error("Preset name must not be empty")]
    EmptyName,

    #[error("Cannot save a preset from an empty queue")]
    EmptyQueue,

    #[error("Preset '{0}' not found")]
    PresetNotFound(String),
}

pub type Result<T, E = StateError> = std::result::Result<T, E>;
