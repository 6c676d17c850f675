//! Atomic full-replace view-model storage.

use crate::render::{
    render_alerts, render_excluded, render_logs, render_positions, render_signals,
    RenderedPosition, RenderedSignal, RenderedTable,
};
use opsdash_core::{
    AccountSummary, AlertRow, BotStatus, ExcludedCoin, LogRow, PositionRow, Resource, SignalRow,
};
use parking_lot::RwLock;
use tracing::debug;

/// One reconciliation payload, keyed by resource.
#[derive(Debug, Clone, PartialEq)]
pub enum TableUpdate {
    Status(BotStatus),
    Positions(Vec<PositionRow>),
    Signals(Vec<SignalRow>),
    Account(AccountSummary),
    Logs(Vec<LogRow>),
    Alerts(Vec<AlertRow>),
    Excluded(Vec<ExcludedCoin>),
}

impl TableUpdate {
    /// The resource this update belongs to. The alert feed rides on the
    /// logs channel for alerting purposes but replaces its own collection.
    pub fn resource(&self) -> Resource {
        match self {
            TableUpdate::Status(_) => Resource::Status,
            TableUpdate::Positions(_) => Resource::Positions,
            TableUpdate::Signals(_) => Resource::Signals,
            TableUpdate::Account(_) => Resource::Account,
            TableUpdate::Logs(_) | TableUpdate::Alerts(_) => Resource::Logs,
            TableUpdate::Excluded(_) => Resource::ExcludedCoins,
        }
    }
}

/// Holds every table's current row collection.
///
/// Each slot is replaced wholesale by `reconcile`; rows are never mutated
/// individually. The single sanctioned local mutation is
/// `remove_excluded`, which drops one row after a restore-coin action
/// without refetching the list.
#[derive(Default)]
pub struct TableSet {
    status: RwLock<Option<BotStatus>>,
    positions: RwLock<Vec<PositionRow>>,
    signals: RwLock<Vec<SignalRow>>,
    account: RwLock<Option<AccountSummary>>,
    logs: RwLock<Vec<LogRow>>,
    alerts: RwLock<Vec<AlertRow>>,
    excluded: RwLock<Vec<ExcludedCoin>>,
}

impl TableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the target collection in one atomic step.
    pub fn reconcile(&self, update: TableUpdate) {
        debug!(resource = %update.resource(), "Reconciling view model");
        match update {
            TableUpdate::Status(status) => *self.status.write() = Some(status),
            TableUpdate::Positions(rows) => *self.positions.write() = rows,
            TableUpdate::Signals(rows) => *self.signals.write() = rows,
            TableUpdate::Account(summary) => *self.account.write() = Some(summary),
            TableUpdate::Logs(rows) => *self.logs.write() = rows,
            TableUpdate::Alerts(rows) => *self.alerts.write() = rows,
            TableUpdate::Excluded(rows) => *self.excluded.write() = rows,
        }
    }

    /// Drop one excluded-coin row locally. Returns whether a row matched.
    pub fn remove_excluded(&self, coin: &str) -> bool {
        let mut excluded = self.excluded.write();
        let before = excluded.len();
        excluded.retain(|row| row.coin != coin);
        let removed = excluded.len() != before;
        if removed {
            debug!(coin, "Excluded-coin row removed locally");
        }
        removed
    }

    // --- Raw snapshots -----------------------------------------------------

    pub fn status(&self) -> Option<BotStatus> {
        self.status.read().clone()
    }

    pub fn account(&self) -> Option<AccountSummary> {
        self.account.read().clone()
    }

    pub fn positions(&self) -> Vec<PositionRow> {
        self.positions.read().clone()
    }

    pub fn signals(&self) -> Vec<SignalRow> {
        self.signals.read().clone()
    }

    pub fn alerts(&self) -> Vec<AlertRow> {
        self.alerts.read().clone()
    }

    pub fn excluded(&self) -> Vec<ExcludedCoin> {
        self.excluded.read().clone()
    }

    // --- Rendered views ----------------------------------------------------

    pub fn render_positions(&self) -> RenderedTable<RenderedPosition> {
        render_positions(&self.positions.read())
    }

    pub fn render_signals(&self) -> RenderedTable<RenderedSignal> {
        render_signals(&self.signals.read())
    }

    pub fn render_alerts(&self) -> RenderedTable<Vec<String>> {
        render_alerts(&self.alerts.read())
    }

    pub fn render_logs(&self) -> RenderedTable<Vec<String>> {
        render_logs(&self.logs.read())
    }

    pub fn render_excluded(&self) -> RenderedTable<Vec<String>> {
        render_excluded(&self.excluded.read())
    }
}
