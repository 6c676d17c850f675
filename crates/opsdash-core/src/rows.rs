//! View-model row records.
//!
//! Plain serde records populated entirely by the latest reconciliation.
//! No row holds independently-mutated state; derived display attributes
//! (badges, marker offsets, trend colors) are computed at render time from
//! the raw fields here and are never written back.

use crate::error::CoreResult;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One open position / balance row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRow {
    pub coin: String,
    /// Unrealized profit in percent. `None` when the backend has no quote yet.
    #[serde(default)]
    pub pnl: Option<Decimal>,
    /// Entry price position on the stop..take range bar, in percent.
    #[serde(default)]
    pub entry_pct: Decimal,
    /// Stop marker position, in percent.
    #[serde(default)]
    pub stop_pct: Decimal,
    /// Take-profit marker position, in percent.
    #[serde(default)]
    pub take_pct: Decimal,
    /// Signed trend score; sign drives the directional color.
    #[serde(default)]
    pub trend: Decimal,
    /// Signal strength score (0..100); drives the badge class.
    #[serde(default)]
    pub strength: Decimal,
    /// Signal label text shown inside the badge.
    #[serde(default)]
    pub signal_label: String,
}

/// One buy-signal candidate row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub coin: String,
    #[serde(default)]
    pub trend: Decimal,
    #[serde(default)]
    pub volatility: Decimal,
    #[serde(default)]
    pub volume: Decimal,
    /// Signal strength score (0..100); drives the badge class.
    #[serde(default)]
    pub strength: Decimal,
    /// Whether a golden cross is active. The backend abbreviates this
    /// field to `gc`.
    #[serde(default, alias = "gc")]
    pub golden_cross: bool,
    #[serde(default)]
    pub rsi: Decimal,
    /// Signal label text shown inside the badge.
    #[serde(default)]
    pub signal: String,
}

/// One alert-feed entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRow {
    pub time: String,
    pub message: String,
}

/// One log-feed entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRow {
    pub time: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub coin: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub amount: Option<Decimal>,
}

/// Account summary (single record, not a table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub cash: Decimal,
    pub total: Decimal,
    /// Overall profit percentage; the backend sends it as `pnl`.
    #[serde(default, alias = "pnl")]
    pub pnl_pct: Decimal,
}

/// Bot run status (single record).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotStatus {
    pub running: bool,
    /// Last update timestamp as reported by the backend.
    #[serde(default)]
    pub updated: String,
}

/// One excluded-coin row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedCoin {
    pub coin: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub since: Option<String>,
}

/// Decode a collection of rows from an envelope payload value.
pub fn rows_from_value<T>(value: &Value) -> CoreResult<Vec<T>>
where
    T: serde::de::DeserializeOwned,
{
    Ok(serde_json::from_value(value.clone())?)
}
