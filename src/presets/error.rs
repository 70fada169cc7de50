//! Preset storage errors.

use thiserror::Error;

/// Errors raised by the key-value backends. The preset store logs and
/// swallows these; they never reach callers of [`super::PresetStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read/write storage file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode or decode storage JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
