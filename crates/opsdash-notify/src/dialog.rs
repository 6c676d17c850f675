//! Operator dialog surfaces.
//!
//! A single alert dialog (title + message) and a single confirm dialog
//! (message + accept/decline), reused across all call sites. The engine only
//! depends on these traits; presentation is up to the host.

use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use std::sync::Arc;

/// The shared alert dialog.
pub trait AlertSink: Send + Sync {
    /// Show a titled alert to the operator.
    fn alert(&self, title: &str, message: &str);
}

/// The shared confirm dialog. Resolves to `true` on accept.
pub trait ConfirmPrompt: Send + Sync {
    fn confirm(&self, message: &str) -> BoxFuture<'_, bool>;
}

/// Log-backed dialog for headless operation.
///
/// Alerts become warn-level log lines; confirmations resolve to a fixed
/// answer (declining by default, so unattended runs never fire destructive
/// actions).
pub struct LogDialog {
    accept_confirms: bool,
}

impl LogDialog {
    pub fn new(accept_confirms: bool) -> Self {
        Self { accept_confirms }
    }
}

impl Default for LogDialog {
    fn default() -> Self {
        Self::new(false)
    }
}

impl AlertSink for LogDialog {
    fn alert(&self, title: &str, message: &str) {
        tracing::warn!(title, message, "Operator alert");
    }
}

impl ConfirmPrompt for LogDialog {
    fn confirm(&self, message: &str) -> BoxFuture<'_, bool> {
        let answer = self.accept_confirms;
        tracing::info!(message, answer, "Confirm prompt auto-answered");
        Box::pin(async move { answer })
    }
}

/// Recording dialog for tests: captures alerts, answers confirms from a
/// preset value, and counts prompts.
#[derive(Default)]
pub struct RecordingDialog {
    pub alerts: Mutex<Vec<(String, String)>>,
    pub confirm_answer: Mutex<bool>,
    pub confirm_count: Mutex<u32>,
}

impl RecordingDialog {
    pub fn accepting() -> Arc<Self> {
        let dialog = Self::default();
        *dialog.confirm_answer.lock() = true;
        Arc::new(dialog)
    }

    pub fn declining() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.lock().len()
    }
}

impl AlertSink for RecordingDialog {
    fn alert(&self, title: &str, message: &str) {
        self.alerts.lock().push((title.to_string(), message.to_string()));
    }
}

impl ConfirmPrompt for RecordingDialog {
    fn confirm(&self, _message: &str) -> BoxFuture<'_, bool> {
        *self.confirm_count.lock() += 1;
        let answer = *self.confirm_answer.lock();
        Box::pin(async move { answer })
    }
}
