//! Main application orchestration.
//!
//! Wires the HTTP client, disconnect notifier, tables, scheduler, push
//! channel, and action dispatcher, then runs until ctrl-c.

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::refresh::{parse_alerts, resource_refresh, SyncContext};
use opsdash_actions::{ActionDispatcher, HttpTransport};
use opsdash_client::ApiClient;
use opsdash_core::{rows_from_value, PositionRow, Resource};
use opsdash_notify::{AlertSink, ConfirmPrompt, DisconnectNotifier};
use opsdash_push::{staggered_refresh, EventRouter, PushClient};
use opsdash_sched::RefreshScheduler;
use opsdash_view::{TableSet, TableUpdate};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Main application.
pub struct App {
    config: AppConfig,
    ctx: Arc<SyncContext>,
    scheduler: Arc<RefreshScheduler>,
    push: Arc<PushClient>,
    dispatcher: Arc<ActionDispatcher>,
}

impl App {
    pub fn new(
        config: AppConfig,
        alerts: Arc<dyn AlertSink>,
        confirm: Arc<dyn ConfirmPrompt>,
    ) -> AppResult<Self> {
        let api = ApiClient::new(&config.base_url)?;
        let policy = config.retry.policy();
        let tables = Arc::new(TableSet::new());
        let notifier = Arc::new(DisconnectNotifier::new(
            config.notifier.clone(),
            alerts.clone(),
        ));
        let scheduler = Arc::new(RefreshScheduler::new());

        let ctx = Arc::new(SyncContext {
            api: api.clone(),
            policy,
            notifier: notifier.clone(),
            alerts: alerts.clone(),
            tables: tables.clone(),
        });

        let router = Arc::new(EventRouter::new());
        register_push_handlers(&router, &config, &ctx, &scheduler);
        debug!(events = ?router.subscribed_events(), "Push handlers registered");
        let push = Arc::new(PushClient::new(
            config.push.to_push_config(config.push_url.clone()),
            router,
        ));

        let transport = Arc::new(HttpTransport::new(api, policy));
        let dispatcher = Arc::new(ActionDispatcher::new(
            transport,
            notifier,
            alerts,
            confirm,
            scheduler.clone(),
            tables,
        ));

        Ok(Self {
            config,
            ctx,
            scheduler,
            push,
            dispatcher,
        })
    }

    /// Current table contents, for hosts embedding the engine.
    pub fn tables(&self) -> &Arc<TableSet> {
        &self.ctx.tables
    }

    pub fn scheduler(&self) -> &Arc<RefreshScheduler> {
        &self.scheduler
    }

    pub fn actions(&self) -> &Arc<ActionDispatcher> {
        &self.dispatcher
    }

    /// Start all resource loops and the push channel, then run until ctrl-c.
    pub async fn run(&self) -> AppResult<()> {
        for resource in Resource::ALL {
            self.scheduler.register(
                resource,
                self.config.intervals.interval(resource),
                resource_refresh(self.ctx.clone(), resource),
            );
        }

        let push = self.push.clone();
        tokio::spawn(async move {
            if let Err(e) = push.run().await {
                warn!(error = %e, "Push channel stopped");
            }
        });

        info!("Dashboard synchronization engine running");
        tokio::signal::ctrl_c().await?;

        info!("Shutdown requested");
        self.push.shutdown();
        self.scheduler.shutdown();
        Ok(())
    }
}

/// Register the handlers for the push events this client consumes.
fn register_push_handlers(
    router: &EventRouter,
    config: &AppConfig,
    ctx: &Arc<SyncContext>,
    scheduler: &Arc<RefreshScheduler>,
) {
    let alerts = ctx.alerts.clone();
    router.on(
        "notification",
        Arc::new(move |data| {
            let (title, message) = notification_parts(&data);
            alerts.alert(&title, &message);
        }),
    );

    let tables = ctx.tables.clone();
    router.on(
        "positions",
        Arc::new(move |data| match rows_from_value::<PositionRow>(&data) {
            Ok(rows) => tables.reconcile(TableUpdate::Positions(rows)),
            Err(e) => warn!(error = %e, "Malformed pushed positions payload"),
        }),
    );

    let tables = ctx.tables.clone();
    router.on(
        "alerts",
        Arc::new(move |data| match parse_alerts(&data) {
            Ok(rows) => tables.reconcile(TableUpdate::Alerts(rows)),
            Err(e) => warn!(error = %e, "Malformed pushed alerts payload"),
        }),
    );

    let scheduler = scheduler.clone();
    let resources = config.refresh_resources();
    let stagger = config.stagger.clone();
    router.on(
        "refresh_data",
        Arc::new(move |_data| {
            staggered_refresh(&scheduler, &resources, &stagger);
        }),
    );
}

/// Split a `notification` payload into dialog title and message. The backend
/// sends either a bare string or `{ "title": ..., "message": ... }`.
fn notification_parts(data: &Value) -> (String, String) {
    const DEFAULT_TITLE: &str = "Notification";
    match data {
        Value::String(message) => (DEFAULT_TITLE.to_string(), message.clone()),
        Value::Object(fields) => {
            let title = fields
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_TITLE);
            let message = fields
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default();
            (title.to_string(), message.to_string())
        }
        other => (DEFAULT_TITLE.to_string(), other.to_string()),
    }
}
