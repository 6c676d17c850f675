//! Per-resource refresh tasks.
//!
//! Each resource's refresh is one pass through the same pipeline: fetch the
//! envelope through the retry layer, report the transport outcome to the
//! disconnect notifier, then decode the payload and reconcile the tables. A
//! failure at any stage leaves the previous table contents in place.

use opsdash_client::{ApiClient, RetryPolicy};
use opsdash_core::{
    rows_from_value, AccountSummary, AlertRow, BotStatus, ChannelCode, CoreResult, ExcludedCoin,
    LogRow, PositionRow, Resource, SignalRow,
};
use opsdash_notify::{AlertSink, DisconnectNotifier, FetchOutcome};
use opsdash_sched::RefreshFn;
use opsdash_view::{TableSet, TableUpdate};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// Dialog title for a backend-reported refresh error.
const SERVER_ERROR_TITLE: &str = "Server error";

/// Shared collaborators for every resource refresh.
pub struct SyncContext {
    pub api: ApiClient,
    pub policy: RetryPolicy,
    pub notifier: Arc<DisconnectNotifier>,
    pub alerts: Arc<dyn AlertSink>,
    pub tables: Arc<TableSet>,
}

/// Decode one resource's envelope payload into a table update.
pub fn parse_update(resource: Resource, payload: &Value) -> CoreResult<TableUpdate> {
    let update = match resource {
        Resource::Status => TableUpdate::Status(decode::<BotStatus>(payload)?),
        Resource::Positions => TableUpdate::Positions(rows_from_value::<PositionRow>(payload)?),
        Resource::Signals => TableUpdate::Signals(rows_from_value::<SignalRow>(payload)?),
        Resource::Account => TableUpdate::Account(decode::<AccountSummary>(payload)?),
        Resource::Logs => TableUpdate::Logs(rows_from_value::<LogRow>(payload)?),
        Resource::ExcludedCoins => {
            TableUpdate::Excluded(rows_from_value::<ExcludedCoin>(payload)?)
        }
    };
    Ok(update)
}

fn decode<T: serde::de::DeserializeOwned>(payload: &Value) -> CoreResult<T> {
    Ok(serde_json::from_value(payload.clone())?)
}

/// Decode a pushed alert-feed payload.
pub fn parse_alerts(payload: &Value) -> CoreResult<Vec<AlertRow>> {
    rows_from_value(payload)
}

/// Build the refresh task for one resource.
pub fn resource_refresh(ctx: Arc<SyncContext>, resource: Resource) -> RefreshFn {
    Arc::new(move || {
        let ctx = ctx.clone();
        Box::pin(async move {
            run_refresh(&ctx, resource).await;
        })
    })
}

async fn run_refresh(ctx: &SyncContext, resource: Resource) {
    let channel = ChannelCode::resource(resource);

    let envelope = match ctx.api.get_resource(resource, &ctx.policy).await {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(%resource, error = %e, "Refresh failed at transport level");
            ctx.notifier.report_outcome(&channel, FetchOutcome::Failure);
            return;
        }
    };

    // The server answered; any remaining failure is application-level.
    ctx.notifier.report_outcome(&channel, FetchOutcome::Success);

    if !envelope.is_success() {
        let message = envelope
            .message()
            .unwrap_or("The server reported an error.");
        if ctx.notifier.is_quiet(&channel) {
            warn!(%resource, message, "Refresh rejected by server");
        } else {
            ctx.alerts.alert(SERVER_ERROR_TITLE, message);
        }
        return;
    }

    let payload = match envelope.require_payload(resource) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(%resource, error = %e, "Tables unchanged");
            return;
        }
    };

    match parse_update(resource, payload) {
        Ok(update) => ctx.tables.reconcile(update),
        Err(e) => {
            warn!(%resource, error = %e, "Payload decode failed, tables unchanged");
        }
    }
}
