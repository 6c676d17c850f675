//! Table reconciliation and rendering.
//!
//! Reconciliation replaces a resource's entire row collection in one atomic
//! step; row-level updates are not supported, so no stable row identity is
//! required across updates. Rendering derives every display attribute
//! (badges, trend colors, marker offsets) from the raw row fields on each
//! call — nothing derived is ever cached or persisted back.

pub mod render;
pub mod tables;

pub use render::{
    render_alerts, render_excluded, render_logs, render_positions, render_signals, BadgeClass,
    PnlCell, RenderedPosition, RenderedSignal, RenderedTable, TrendColor, NO_DATA_SENTINEL,
};
pub use tables::{TableSet, TableUpdate};
