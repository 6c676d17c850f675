//! Resilient HTTP fetch layer.
//!
//! Performs one logical request per call, retrying transport-level failures
//! (network error, unparseable body) with a fixed backoff before surfacing a
//! transport error. Well-formed failure envelopes are returned to the caller
//! untouched; envelope semantics are never interpreted here.

pub mod api;
pub mod error;
pub mod retry;

pub use api::ApiClient;
pub use error::{ClientError, ClientResult, TransportFailure};
pub use retry::{fetch_with_retry, RetryPolicy};
