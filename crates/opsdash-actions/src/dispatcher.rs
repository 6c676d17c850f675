//! Action dispatch pipeline.

use crate::action::Action;
use futures_util::future::BoxFuture;
use opsdash_client::{ApiClient, ClientResult, RetryPolicy};
use opsdash_core::{ChannelCode, Envelope};
use opsdash_notify::{AlertSink, ConfirmPrompt, DisconnectNotifier, FetchOutcome};
use opsdash_sched::RefreshScheduler;
use opsdash_view::TableSet;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Dialog title for a backend-rejected action.
const REJECT_TITLE: &str = "Action failed";
/// Dialog title for a success envelope that carries an operator message.
const NOTICE_TITLE: &str = "Notice";

/// Terminal result of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Backend accepted the action; follow-up refreshes were triggered.
    Applied { message: Option<String> },
    /// Backend returned a non-success envelope; no follow-ups fired.
    Rejected { message: String },
    /// The operator declined the confirm prompt; nothing was sent.
    Declined,
    /// All retry attempts failed at the transport level.
    Unreachable,
}

/// POST seam, so tests can dispatch without a live backend.
pub trait ActionTransport: Send + Sync {
    fn post(&self, path: &str, body: Value) -> BoxFuture<'_, ClientResult<Envelope>>;
}

/// Production transport: [`ApiClient`] with a fixed retry policy.
pub struct HttpTransport {
    client: ApiClient,
    policy: RetryPolicy,
}

impl HttpTransport {
    pub fn new(client: ApiClient, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }
}

impl ActionTransport for HttpTransport {
    fn post(&self, path: &str, body: Value) -> BoxFuture<'_, ClientResult<Envelope>> {
        let path = path.to_string();
        Box::pin(async move { self.client.post_action(&path, body, &self.policy).await })
    }
}

/// Runs the confirm-post-report-refresh pipeline for every action.
pub struct ActionDispatcher {
    transport: Arc<dyn ActionTransport>,
    notifier: Arc<DisconnectNotifier>,
    alerts: Arc<dyn AlertSink>,
    confirm: Arc<dyn ConfirmPrompt>,
    scheduler: Arc<RefreshScheduler>,
    tables: Arc<TableSet>,
}

impl ActionDispatcher {
    pub fn new(
        transport: Arc<dyn ActionTransport>,
        notifier: Arc<DisconnectNotifier>,
        alerts: Arc<dyn AlertSink>,
        confirm: Arc<dyn ConfirmPrompt>,
        scheduler: Arc<RefreshScheduler>,
        tables: Arc<TableSet>,
    ) -> Self {
        Self {
            transport,
            notifier,
            alerts,
            confirm,
            scheduler,
            tables,
        }
    }

    /// Dispatch one action.
    ///
    /// When `confirm_message` is set the operator is prompted first and a
    /// decline aborts before any network traffic. The outcome is reported
    /// on the action's own disconnect channel, so action failures dedup
    /// independently of the poll channels.
    pub async fn dispatch(
        &self,
        action: Action,
        body: Value,
        confirm_message: Option<&str>,
    ) -> DispatchOutcome {
        if let Some(message) = confirm_message {
            if !self.confirm.confirm(message).await {
                info!(action = action.code(), "Action declined by operator");
                return DispatchOutcome::Declined;
            }
        }

        let channel = ChannelCode::action(action.code());
        let coin = body.get("coin").and_then(Value::as_str).map(str::to_string);

        let envelope = match self.transport.post(&action.path(), body).await {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(action = action.code(), error = %e, "Action unreachable");
                self.notifier.report_outcome(&channel, FetchOutcome::Failure);
                return DispatchOutcome::Unreachable;
            }
        };

        self.notifier.report_outcome(&channel, FetchOutcome::Success);

        if !envelope.is_success() {
            let message = envelope
                .message()
                .unwrap_or("The server rejected the request.")
                .to_string();
            warn!(action = action.code(), %message, "Action rejected");
            self.alerts.alert(REJECT_TITLE, &message);
            return DispatchOutcome::Rejected { message };
        }

        let message = envelope.message().map(str::to_string);
        if let Some(text) = &message {
            self.alerts.alert(NOTICE_TITLE, text);
        }

        if action.removes_excluded_row() {
            match &coin {
                Some(coin) => {
                    self.tables.remove_excluded(coin);
                }
                None => warn!(action = action.code(), "No coin in body, row kept"),
            }
        }

        for resource in action.follow_ups() {
            debug!(action = action.code(), %resource, "Follow-up refresh");
            self.scheduler.trigger(*resource);
        }

        DispatchOutcome::Applied { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsdash_core::Resource;
    use opsdash_notify::{NotifierConfig, RecordingDialog};
    use opsdash_view::TableUpdate;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct FakeTransport {
        response: Mutex<Option<Result<Envelope, ()>>>,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl FakeTransport {
        fn returning(raw: &str) -> Arc<Self> {
            let envelope = serde_json::from_str(raw).unwrap();
            Arc::new(Self {
                response: Mutex::new(Some(Ok(envelope))),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn unreachable() -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Some(Err(()))),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    impl ActionTransport for FakeTransport {
        fn post(&self, path: &str, body: Value) -> BoxFuture<'_, ClientResult<Envelope>> {
            self.calls.lock().push((path.to_string(), body));
            let response = self.response.lock().take().unwrap();
            Box::pin(async move {
                response.map_err(|()| opsdash_client::ClientError::Transport {
                    attempts: 3,
                    last: opsdash_client::TransportFailure("connection refused".into()),
                })
            })
        }
    }

    struct Harness {
        dispatcher: ActionDispatcher,
        transport: Arc<FakeTransport>,
        dialog: Arc<RecordingDialog>,
        scheduler: Arc<RefreshScheduler>,
        tables: Arc<TableSet>,
    }

    fn harness(transport: Arc<FakeTransport>, dialog: Arc<RecordingDialog>) -> Harness {
        let scheduler = Arc::new(RefreshScheduler::new());
        let tables = Arc::new(TableSet::new());
        let notifier = Arc::new(DisconnectNotifier::new(
            NotifierConfig::default(),
            dialog.clone(),
        ));
        let dispatcher = ActionDispatcher::new(
            transport.clone(),
            notifier,
            dialog.clone(),
            dialog.clone(),
            scheduler.clone(),
            tables.clone(),
        );
        Harness {
            dispatcher,
            transport,
            dialog,
            scheduler,
            tables,
        }
    }

    fn counting_refresh(calls: Arc<AtomicU32>) -> opsdash_sched::RefreshFn {
        Arc::new(move || {
            let calls = calls.clone();
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        })
    }

    #[tokio::test]
    async fn test_declined_confirm_sends_nothing() {
        let h = harness(
            FakeTransport::returning(r#"{"result": "success"}"#),
            RecordingDialog::declining(),
        );

        let outcome = h
            .dispatcher
            .dispatch(Action::StopBot, json!({}), Some("Stop the bot?"))
            .await;

        assert_eq!(outcome, DispatchOutcome::Declined);
        assert_eq!(h.transport.call_count(), 0);
        assert_eq!(*h.dialog.confirm_count.lock(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_applied_triggers_follow_up_refreshes() {
        let h = harness(
            FakeTransport::returning(r#"{"result": "success"}"#),
            RecordingDialog::accepting(),
        );
        let refreshes = Arc::new(AtomicU32::new(0));
        h.scheduler.register(
            Resource::Positions,
            Duration::from_secs(600),
            counting_refresh(refreshes.clone()),
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(refreshes.load(Ordering::SeqCst), 1, "startup refresh");

        let outcome = h
            .dispatcher
            .dispatch(
                Action::ExcludeCoin,
                json!({"coin": "DOGE"}),
                Some("Exclude DOGE?"),
            )
            .await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(outcome, DispatchOutcome::Applied { message: None });
        assert_eq!(h.transport.call_count(), 1);
        assert_eq!(refreshes.load(Ordering::SeqCst), 2);
        h.scheduler.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_coin_removes_local_row_and_refreshes() {
        let h = harness(
            FakeTransport::returning(r#"{"result": "success"}"#),
            RecordingDialog::accepting(),
        );
        h.tables.reconcile(TableUpdate::Excluded(vec![
            opsdash_core::ExcludedCoin {
                coin: "DOGE".to_string(),
                reason: None,
                since: None,
            },
        ]));
        let refreshes = Arc::new(AtomicU32::new(0));
        h.scheduler.register(
            Resource::Positions,
            Duration::from_secs(600),
            counting_refresh(refreshes.clone()),
        );
        tokio::time::sleep(Duration::from_millis(10)).await;

        let outcome = h
            .dispatcher
            .dispatch(Action::RestoreCoin, json!({"coin": "DOGE"}), None)
            .await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(outcome, DispatchOutcome::Applied { message: None });
        assert!(h.tables.excluded().is_empty());
        assert_eq!(refreshes.load(Ordering::SeqCst), 2);
        h.scheduler.shutdown();
    }

    #[tokio::test]
    async fn test_rejected_surfaces_message_without_follow_ups() {
        let h = harness(
            FakeTransport::returning(r#"{"result": "error", "message": "Bot already running"}"#),
            RecordingDialog::accepting(),
        );

        let outcome = h.dispatcher.dispatch(Action::StartBot, json!({}), None).await;

        assert_eq!(
            outcome,
            DispatchOutcome::Rejected {
                message: "Bot already running".to_string()
            }
        );
        let alerts = h.dialog.alerts.lock();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].0, "Action failed");
        assert_eq!(alerts[0].1, "Bot already running");
    }

    #[tokio::test]
    async fn test_success_with_message_shows_notice() {
        let h = harness(
            FakeTransport::returning(r#"{"result": "success", "message": "Analysis queued"}"#),
            RecordingDialog::accepting(),
        );

        let outcome = h
            .dispatcher
            .dispatch(Action::RunAnalysis, json!({}), None)
            .await;

        assert_eq!(
            outcome,
            DispatchOutcome::Applied {
                message: Some("Analysis queued".to_string())
            }
        );
        let alerts = h.dialog.alerts.lock();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].0, "Notice");
    }

    #[tokio::test]
    async fn test_transport_failure_is_unreachable_and_alerts_once() {
        let dialog = RecordingDialog::accepting();
        let h = harness(FakeTransport::unreachable(), dialog);

        let outcome = h.dispatcher.dispatch(Action::StopBot, json!({}), None).await;

        assert_eq!(outcome, DispatchOutcome::Unreachable);
        // The disconnect notifier owns the alert, keyed to this action's
        // channel.
        let alerts = h.dialog.alerts.lock();
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].1.contains("action:stop-bot"));
    }
}
