//! Named-event dispatch and staggered refresh.

use crate::message::PushFrame;
use opsdash_core::Resource;
use opsdash_sched::RefreshScheduler;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Handler for one named event. Called synchronously from the dispatch
/// loop, so it must not block; network continuations are spawned detached
/// by the handler itself.
pub type EventHandler = Arc<dyn Fn(Value) + Send + Sync>;

/// Registered handler table; dispatch preserves arrival order.
#[derive(Default)]
pub struct EventRouter {
    handlers: RwLock<HashMap<String, EventHandler>>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a named event, replacing any previous one.
    pub fn on(&self, event: impl Into<String>, handler: EventHandler) {
        self.handlers.write().insert(event.into(), handler);
    }

    /// Dispatch one frame to its handler. Unknown events are dropped with a
    /// trace log; the push channel carries more event names than this
    /// client consumes.
    pub fn dispatch(&self, frame: PushFrame) {
        let handler = self.handlers.read().get(&frame.event).cloned();
        match handler {
            Some(handler) => {
                trace!(event = %frame.event, "Dispatching push event");
                handler(frame.data);
            }
            None => {
                trace!(event = %frame.event, "No handler for push event");
            }
        }
    }

    /// Registered event names, for diagnostics.
    pub fn subscribed_events(&self) -> Vec<String> {
        self.handlers.read().keys().cloned().collect()
    }
}

/// Offsets for the server-initiated "refresh now" broadcast.
///
/// Instead of one immediate full pass, `refresh_data` schedules several
/// passes at fixed offsets so a burst of dependent resources does not
/// recompute at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaggerConfig {
    /// Pass offsets in seconds.
    #[serde(default = "default_offsets_secs")]
    pub offsets_secs: Vec<u64>,
}

fn default_offsets_secs() -> Vec<u64> {
    vec![0, 1, 2]
}

impl Default for StaggerConfig {
    fn default() -> Self {
        Self {
            offsets_secs: default_offsets_secs(),
        }
    }
}

/// Schedule one staggered full-reconciliation pass per offset.
///
/// Each pass triggers every listed resource through the scheduler, which
/// enforces the per-resource in-flight bound, so back-to-back passes can
/// never stack refreshes for one resource.
pub fn staggered_refresh(
    scheduler: &Arc<RefreshScheduler>,
    resources: &[Resource],
    config: &StaggerConfig,
) {
    for &offset_secs in &config.offsets_secs {
        let scheduler = scheduler.clone();
        let resources = resources.to_vec();
        tokio::spawn(async move {
            if offset_secs > 0 {
                tokio::time::sleep(Duration::from_secs(offset_secs)).await;
            }
            debug!(offset_secs, "Staggered refresh pass");
            for resource in resources {
                scheduler.trigger(resource);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    #[test]
    fn test_dispatch_routes_to_registered_handler() {
        let router = EventRouter::new();
        let seen: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_handler = seen.clone();
        router.on(
            "positions",
            Arc::new(move |data| seen_handler.lock().push(data)),
        );
        assert_eq!(router.subscribed_events(), vec!["positions".to_string()]);

        router.dispatch(PushFrame {
            event: "positions".to_string(),
            data: json!([{"coin": "BTC"}]),
        });
        router.dispatch(PushFrame {
            event: "unknown".to_string(),
            data: Value::Null,
        });

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], json!([{"coin": "BTC"}]));
    }

    #[test]
    fn test_dispatch_preserves_arrival_order() {
        let router = EventRouter::new();
        let order: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        for name in ["notification", "alerts"] {
            let order = order.clone();
            router.on(
                name,
                Arc::new(move |data| {
                    order.lock().push(data.as_str().unwrap_or_default().to_string())
                }),
            );
        }

        for (event, tag) in [
            ("notification", "n1"),
            ("alerts", "a1"),
            ("notification", "n2"),
        ] {
            router.dispatch(PushFrame {
                event: event.to_string(),
                data: json!(tag),
            });
        }

        assert_eq!(*order.lock(), vec!["n1", "a1", "n2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_staggered_refresh_spreads_passes() {
        use futures_util::future::BoxFuture;
        use std::sync::atomic::{AtomicU32, Ordering};

        let scheduler = Arc::new(RefreshScheduler::new());
        let calls = Arc::new(AtomicU32::new(0));
        let calls_refresh = calls.clone();
        let refresh: opsdash_sched::RefreshFn = Arc::new(move || {
            let calls = calls_refresh.clone();
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
            }) as BoxFuture<'static, ()>
        });
        // Long interval so only triggers fire during the test window.
        scheduler.register(Resource::Positions, Duration::from_secs(600), refresh);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1, "startup refresh");

        staggered_refresh(
            &scheduler,
            &[Resource::Positions],
            &StaggerConfig::default(),
        );

        // Pass at offset 0 lands right away.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Passes at 1s and 2s land on schedule, not earlier.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        scheduler.shutdown();
    }
}
