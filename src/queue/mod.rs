//! Queue model module
//!
//! This module contains the workout segment types and the ordered queue that
//! the countdown engine plays back.

pub mod item;
pub mod timer_queue;

// Re-export main types
pub use item::{format_time, ItemFields, ItemId, ItemPatch, TimerItem, MAX_MINUTES, MAX_SECONDS};
pub use timer_queue::Queue;
