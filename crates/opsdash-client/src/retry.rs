//! Fixed-backoff retry around a single logical request.

use crate::error::{ClientError, ClientResult, TransportFailure};
use opsdash_core::Envelope;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry parameters for one call site.
///
/// Injectable per call site so tests can run deterministically with a zero
/// delay and callers can tune retry pressure per endpoint.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Minimum 1.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(200),
        }
    }
}

/// Run `op` up to `policy.max_attempts` times.
///
/// `op` receives the 1-based attempt number. Any `TransportFailure` is
/// retried after the fixed delay; the last failure is carried in the
/// returned error once attempts are exhausted. A returned `Envelope` ends
/// the loop immediately, whatever its discriminant — failure envelopes are
/// an application-level concern, not a transport one.
pub async fn fetch_with_retry<F, Fut>(mut op: F, policy: &RetryPolicy) -> ClientResult<Envelope>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Envelope, TransportFailure>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last: Option<TransportFailure> = None;

    for attempt in 1..=max_attempts {
        match op(attempt).await {
            Ok(envelope) => {
                if attempt > 1 {
                    debug!(attempt, "Request recovered after retry");
                }
                return Ok(envelope);
            }
            Err(failure) => {
                warn!(attempt, max_attempts, error = %failure, "Transport failure");
                last = Some(failure);
                if attempt < max_attempts {
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    Err(ClientError::Transport {
        attempts: max_attempts,
        last: last.unwrap_or_else(|| TransportFailure("no attempt made".to_string())),
    })
}
