//! Deduplicated disconnect signaling.
//!
//! Transition policy per channel:
//! - failure while connected: one alert, flag set;
//! - failure while already disconnected: log only;
//! - success while disconnected: clear flag, log recovery, no alert;
//! - success while connected: no-op.
//!
//! Channels are keyed independently, so an outage on `signals` never
//! suppresses alerting for `status`. Quiet channels log on first failure
//! instead of alerting (the account/log pollers in the source behaved this
//! way while the table pollers alerted).

use crate::dialog::AlertSink;
use opsdash_core::ChannelCode;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Dialog title used for connectivity alerts.
const ALERT_TITLE: &str = "Connection error";

/// Outcome of one logical fetch on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Success,
    Failure,
}

/// Per-channel alerting configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Channels that log on first failure instead of alerting.
    #[serde(default)]
    pub quiet_channels: HashSet<String>,
}

impl NotifierConfig {
    pub fn is_quiet(&self, channel: &ChannelCode) -> bool {
        self.quiet_channels.contains(channel.as_str())
    }
}

/// Collapses repeated transport failures into one alert per outage.
pub struct DisconnectNotifier {
    config: NotifierConfig,
    alerts: Arc<dyn AlertSink>,
    /// Per-channel disconnected flag. Single writer per tick; the mutex
    /// only guards against re-entrant map access.
    disconnected: Mutex<HashMap<ChannelCode, bool>>,
}

impl DisconnectNotifier {
    pub fn new(config: NotifierConfig, alerts: Arc<dyn AlertSink>) -> Self {
        Self {
            config,
            alerts,
            disconnected: Mutex::new(HashMap::new()),
        }
    }

    /// Record the outcome of one logical fetch on `channel`.
    pub fn report_outcome(&self, channel: &ChannelCode, outcome: FetchOutcome) {
        let mut state = self.disconnected.lock();
        let flag = state.entry(channel.clone()).or_insert(false);

        match (outcome, *flag) {
            (FetchOutcome::Failure, false) => {
                *flag = true;
                if self.config.is_quiet(channel) {
                    warn!(%channel, "Channel unreachable (quiet channel, no alert)");
                } else {
                    warn!(%channel, "Channel unreachable, alerting operator");
                    self.alerts.alert(
                        ALERT_TITLE,
                        &format!("Server connection lost on channel '{channel}'. Check the network or the server."),
                    );
                }
            }
            (FetchOutcome::Failure, true) => {
                // Sustained outage: stay silent to avoid an alert storm.
                debug!(%channel, "Channel still unreachable");
            }
            (FetchOutcome::Success, true) => {
                *flag = false;
                info!(%channel, "Channel recovered");
            }
            (FetchOutcome::Success, false) => {}
        }
    }

    /// Whether `channel` is currently marked disconnected.
    pub fn is_disconnected(&self, channel: &ChannelCode) -> bool {
        self.disconnected
            .lock()
            .get(channel)
            .copied()
            .unwrap_or(false)
    }

    /// Whether `channel` is configured quiet (log-only on first failure).
    pub fn is_quiet(&self, channel: &ChannelCode) -> bool {
        self.config.is_quiet(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::RecordingDialog;
    use opsdash_core::Resource;

    fn notifier_with(dialog: Arc<RecordingDialog>, quiet: &[&str]) -> DisconnectNotifier {
        let config = NotifierConfig {
            quiet_channels: quiet.iter().map(|s| s.to_string()).collect(),
        };
        DisconnectNotifier::new(config, dialog)
    }

    #[test]
    fn test_n_failures_emit_exactly_one_alert() {
        let dialog = RecordingDialog::declining();
        let notifier = notifier_with(dialog.clone(), &[]);
        let channel = ChannelCode::resource(Resource::Signals);

        for _ in 0..5 {
            notifier.report_outcome(&channel, FetchOutcome::Failure);
        }

        assert_eq!(dialog.alert_count(), 1);
        assert!(notifier.is_disconnected(&channel));
    }

    #[test]
    fn test_recovery_clears_flag_without_alert() {
        let dialog = RecordingDialog::declining();
        let notifier = notifier_with(dialog.clone(), &[]);
        let channel = ChannelCode::resource(Resource::Status);

        notifier.report_outcome(&channel, FetchOutcome::Failure);
        notifier.report_outcome(&channel, FetchOutcome::Success);

        assert_eq!(dialog.alert_count(), 1);
        assert!(!notifier.is_disconnected(&channel));

        // A fresh outage after recovery alerts again.
        notifier.report_outcome(&channel, FetchOutcome::Failure);
        assert_eq!(dialog.alert_count(), 2);
    }

    #[test]
    fn test_success_without_prior_failure_is_noop() {
        let dialog = RecordingDialog::declining();
        let notifier = notifier_with(dialog.clone(), &[]);
        let channel = ChannelCode::resource(Resource::Account);

        notifier.report_outcome(&channel, FetchOutcome::Success);
        assert_eq!(dialog.alert_count(), 0);
        assert!(!notifier.is_disconnected(&channel));
    }

    #[test]
    fn test_channels_are_independent() {
        let dialog = RecordingDialog::declining();
        let notifier = notifier_with(dialog.clone(), &[]);
        let signals = ChannelCode::resource(Resource::Signals);
        let status = ChannelCode::resource(Resource::Status);

        notifier.report_outcome(&signals, FetchOutcome::Failure);
        notifier.report_outcome(&signals, FetchOutcome::Failure);
        // An outage on signals must not suppress the status alert.
        notifier.report_outcome(&status, FetchOutcome::Failure);

        assert_eq!(dialog.alert_count(), 2);
        let messages: Vec<String> =
            dialog.alerts.lock().iter().map(|(_, m)| m.clone()).collect();
        assert!(messages[0].contains("signals"));
        assert!(messages[1].contains("status"));
    }

    #[test]
    fn test_quiet_channel_never_alerts() {
        let dialog = RecordingDialog::declining();
        let notifier = notifier_with(dialog.clone(), &["account"]);
        let channel = ChannelCode::resource(Resource::Account);

        notifier.report_outcome(&channel, FetchOutcome::Failure);
        notifier.report_outcome(&channel, FetchOutcome::Failure);

        assert_eq!(dialog.alert_count(), 0);
        // The flag still tracks the outage for recovery logging.
        assert!(notifier.is_disconnected(&channel));
    }
}
