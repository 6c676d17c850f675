//! Trading-bot operations dashboard synchronization engine.
//!
//! Keeps a local view model continuously consistent with the backend:
//! - per-resource polling with countdowns and bounded concurrency,
//! - resilient fetch with fixed-backoff retry,
//! - deduplicated disconnect alerting,
//! - push events over WebSocket with staggered refresh-now handling,
//! - atomic full-replace table reconciliation,
//! - confirm-gated operator actions with deterministic follow-up refreshes.

pub mod app;
pub mod config;
pub mod error;
pub mod refresh;

pub use app::App;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
