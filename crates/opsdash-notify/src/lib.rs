//! Disconnect notification and operator dialog surfaces.
//!
//! The notifier collapses any run of transport failures on one channel into
//! a single user-visible alert, and clears silently on recovery. The dialog
//! traits model the two singleton surfaces (alert, confirm) every call site
//! shares.

pub mod dialog;
pub mod notifier;

pub use dialog::{AlertSink, ConfirmPrompt, LogDialog, RecordingDialog};
pub use notifier::{DisconnectNotifier, FetchOutcome, NotifierConfig};
