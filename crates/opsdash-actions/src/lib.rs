//! Operator action dispatch.
//!
//! Every state-changing operation funnels through [`ActionDispatcher`]: an
//! optional confirm prompt, one POST to the backend, outcome reporting on the
//! action's own channel, and a deterministic set of follow-up refreshes on
//! success. Actions never reconcile tables from their own response payloads;
//! the follow-up refreshes re-read the affected resources instead.

pub mod action;
pub mod dispatcher;

pub use action::Action;
pub use dispatcher::{ActionDispatcher, ActionTransport, DispatchOutcome, HttpTransport};
