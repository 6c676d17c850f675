//! Core domain types for the dashboard synchronization engine.
//!
//! Defines the resource channels polled by the dashboard, the tagged
//! success/failure envelope every backend endpoint returns, and the
//! view-model row records that reconciliation fully replaces on each pass.

pub mod envelope;
pub mod error;
pub mod resource;
pub mod rows;

pub use envelope::Envelope;
pub use error::{CoreError, CoreResult};
pub use resource::{ChannelCode, Resource};
pub use rows::{
    rows_from_value, AccountSummary, AlertRow, BotStatus, ExcludedCoin, LogRow, PositionRow,
    SignalRow,
};
