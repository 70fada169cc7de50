//! State management module
//!
//! This module ties the countdown engine and the preset store together and
//! applies the front-end policies around them.

pub mod app_state;
pub mod error;

// Re-export main types
pub use app_state::AppState;
pub use error::StateError;
