//! Per-resource refresh scheduling.
//!
//! Each registered resource gets its own loop: an immediate first refresh,
//! then a once-per-second countdown that fires the refresh when it reaches
//! zero. Countdowns are exposed read-only for display, and a push-driven
//! trigger can force a refresh out of band (resetting the countdown).
//! Refreshes never overlap for the same resource: ticks that fire while one
//! is in flight are dropped, not queued.

pub mod countdown;
pub mod scheduler;

pub use countdown::Countdown;
pub use scheduler::{RefreshFn, RefreshScheduler};
