//! Process-level helpers
//!
//! Anything the binary needs around the server that is not part of the
//! workout model lives here.

pub mod signals;

pub use signals::shutdown_signal;
