//! Resource channels polled by the dashboard.
//!
//! Each resource owns its own refresh interval, countdown, and failure/alert
//! domain. The endpoint paths and payload field names match the backend API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A dashboard resource channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    /// Bot run status (running flag + last update time).
    Status,
    /// Open positions / balances table.
    Positions,
    /// Buy-signal candidate table.
    Signals,
    /// Account summary (cash, total, pnl).
    Account,
    /// Trade/event log feed.
    Logs,
    /// Excluded-coin list.
    ExcludedCoins,
}

impl Resource {
    /// All resource channels, in display order.
    pub const ALL: [Resource; 6] = [
        Resource::Status,
        Resource::Positions,
        Resource::Signals,
        Resource::Account,
        Resource::Logs,
        Resource::ExcludedCoins,
    ];

    /// Stable string key, used for config, logging, and push frames.
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Status => "status",
            Resource::Positions => "positions",
            Resource::Signals => "signals",
            Resource::Account => "account",
            Resource::Logs => "logs",
            Resource::ExcludedCoins => "excluded-coins",
        }
    }

    /// GET endpoint path for refreshing this resource.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Resource::Status => "/api/status",
            Resource::Positions => "/api/balances",
            Resource::Signals => "/api/signals",
            Resource::Account => "/api/account",
            Resource::Logs => "/api/logs",
            Resource::ExcludedCoins => "/api/excluded",
        }
    }

    /// Name of the envelope field carrying this resource's payload.
    pub fn payload_field(&self) -> &'static str {
        match self {
            Resource::Status => "status",
            Resource::Positions => "balances",
            Resource::Signals => "signals",
            Resource::Account => "account",
            Resource::Logs => "logs",
            Resource::ExcludedCoins => "excluded",
        }
    }

    /// Parse a resource from its stable key (push frames, config).
    pub fn from_key(key: &str) -> Option<Resource> {
        Resource::ALL.iter().copied().find(|r| r.as_str() == key)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier for an independent failure/alert domain.
///
/// One channel per resource plus one per action endpoint. An outage on one
/// channel never suppresses alerting on another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelCode(String);

impl ChannelCode {
    /// Channel for a poll resource.
    pub fn resource(resource: Resource) -> Self {
        ChannelCode(resource.as_str().to_string())
    }

    /// Channel for an action endpoint.
    pub fn action(code: &str) -> Self {
        ChannelCode(format!("action:{code}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
