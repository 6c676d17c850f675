//! Refresh scheduler.

use crate::countdown::Countdown;
use futures_util::future::BoxFuture;
use opsdash_core::Resource;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// One logical refresh pass for a resource. The returned future settles when
/// the fetch-and-reconcile pass completes (success or failure).
pub type RefreshFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

struct Entry {
    countdown: Arc<Countdown>,
    trigger_tx: mpsc::Sender<()>,
}

/// Owns the per-resource polling loops and their countdowns.
pub struct RefreshScheduler {
    entries: Mutex<HashMap<Resource, Entry>>,
    shutdown: CancellationToken,
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Register a resource and start its loop: one immediate refresh, then
    /// countdown-driven ticks every `interval`. Re-registering a resource
    /// replaces its entry; the old loop stops on the next trigger-channel
    /// closure.
    pub fn register(&self, resource: Resource, interval: Duration, refresh: RefreshFn) {
        let countdown = Arc::new(Countdown::new(interval));
        let (trigger_tx, trigger_rx) = mpsc::channel(8);

        info!(
            %resource,
            interval_secs = countdown.interval_secs(),
            "Registering resource refresh"
        );

        self.entries.lock().insert(
            resource,
            Entry {
                countdown: countdown.clone(),
                trigger_tx,
            },
        );

        tokio::spawn(run_resource_loop(
            resource,
            countdown,
            refresh,
            trigger_rx,
            self.shutdown.child_token(),
        ));
    }

    /// Force a refresh now (push-driven). Resets the countdown; the
    /// in-flight bound still applies. Unknown resources are ignored.
    pub fn trigger(&self, resource: Resource) {
        let entries = self.entries.lock();
        if let Some(entry) = entries.get(&resource) {
            if entry.trigger_tx.try_send(()).is_err() {
                debug!(%resource, "Trigger queue full, refresh already pending");
            }
        } else {
            debug!(%resource, "Trigger for unregistered resource ignored");
        }
    }

    /// Seconds until the next refresh of `resource`, for display.
    pub fn countdown(&self, resource: Resource) -> Option<u64> {
        self.entries
            .lock()
            .get(&resource)
            .map(|e| e.countdown.remaining())
    }

    /// Snapshot of all countdowns, for display.
    pub fn countdowns(&self) -> HashMap<Resource, u64> {
        self.entries
            .lock()
            .iter()
            .map(|(r, e)| (*r, e.countdown.remaining()))
            .collect()
    }

    /// Stop all resource loops.
    pub fn shutdown(&self) {
        info!("RefreshScheduler shutdown requested");
        self.shutdown.cancel();
    }
}

async fn run_resource_loop(
    resource: Resource,
    countdown: Arc<Countdown>,
    refresh: RefreshFn,
    mut trigger_rx: mpsc::Receiver<()>,
    shutdown: CancellationToken,
) {
    let in_flight = Arc::new(AtomicBool::new(false));

    // Immediate refresh at startup.
    spawn_refresh(resource, &in_flight, &refresh);

    let mut tick = tokio::time::interval(Duration::from_secs(1));
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first interval tick completes immediately; consume it so the
    // countdown starts decrementing one second from now.
    tick.tick().await;

    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                debug!(%resource, "Resource loop stopped");
                return;
            }
            _ = tick.tick() => {
                if countdown.tick() {
                    countdown.reset();
                    spawn_refresh(resource, &in_flight, &refresh);
                }
            }
            trigger = trigger_rx.recv() => {
                match trigger {
                    Some(()) => {
                        debug!(%resource, "External refresh trigger");
                        countdown.reset();
                        spawn_refresh(resource, &in_flight, &refresh);
                    }
                    None => {
                        // Entry replaced; this loop is orphaned.
                        debug!(%resource, "Trigger channel closed, loop exiting");
                        return;
                    }
                }
            }
        }
    }
}

/// Start one refresh pass unless one is already pending for this resource.
/// Bounded concurrency = 1: the superseding tick is dropped, not queued.
fn spawn_refresh(resource: Resource, in_flight: &Arc<AtomicBool>, refresh: &RefreshFn) {
    if in_flight
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        debug!(%resource, "Refresh already in flight, tick dropped");
        return;
    }

    let fut = refresh();
    let flag = in_flight.clone();
    tokio::spawn(async move {
        fut.await;
        flag.store(false, Ordering::Release);
    });
}
