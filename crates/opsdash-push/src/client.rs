//! Push channel connection manager.
//!
//! Maintains the WebSocket to the backend's event stream, with automatic
//! reconnection and exponential backoff. A connection failure is never
//! surfaced to the operator from here: the engine simply runs poll-only
//! until the channel comes back, and the Disconnect Notifier reports poll
//! failures on its own terms.

use crate::error::{PushError, PushResult};
use crate::message::PushFrame;
use crate::router::EventRouter;
use futures_util::{SinkExt, StreamExt};
use opsdash_core::Resource;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex as TokioMutex};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Push connection configuration.
#[derive(Debug, Clone)]
pub struct PushConfig {
    /// WebSocket URL of the event stream.
    pub url: String,
    /// Maximum reconnection attempts (0 = infinite).
    pub max_reconnect_attempts: u32,
    /// Base delay for exponential backoff.
    pub reconnect_base_delay_ms: u64,
    /// Maximum delay for exponential backoff.
    pub reconnect_max_delay_ms: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_reconnect_attempts: 0, // Infinite
            reconnect_base_delay_ms: 1000,
            reconnect_max_delay_ms: 60000,
        }
    }
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

/// Push channel connection manager.
pub struct PushClient {
    config: PushConfig,
    router: Arc<EventRouter>,
    state: Arc<RwLock<ConnectionState>>,
    /// Outbound frame sender (for PushEmitter).
    outbound_tx: mpsc::Sender<PushFrame>,
    /// Outbound frame receiver (consumed by the message loop).
    outbound_rx: TokioMutex<mpsc::Receiver<PushFrame>>,
    shutdown_token: CancellationToken,
}

impl PushClient {
    pub fn new(config: PushConfig, router: Arc<EventRouter>) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::channel(64);
        Self {
            config,
            router,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            outbound_tx,
            outbound_rx: TokioMutex::new(outbound_rx),
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Get an emitter for outbound `refresh { type }` requests.
    ///
    /// The emitter can be cloned and shared across tasks; frames queued
    /// while disconnected are delivered after reconnect (or dropped when
    /// the queue fills).
    pub fn emitter(&self) -> PushEmitter {
        PushEmitter {
            tx: self.outbound_tx.clone(),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Signal graceful shutdown.
    pub fn shutdown(&self) {
        info!("PushClient shutdown requested");
        self.shutdown_token.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Connect to the event stream and run the message loop, reconnecting
    /// on failure until shutdown.
    pub async fn run(&self) -> PushResult<()> {
        let mut attempt = 0u32;

        loop {
            if self.is_shutdown() {
                *self.state.write() = ConnectionState::Disconnected;
                return Ok(());
            }

            *self.state.write() = ConnectionState::Connecting;

            match self.try_connect().await {
                Ok(()) => {
                    info!("Push channel closed");
                    attempt = 0;
                }
                Err(e) => {
                    // Degraded to poll-only; no operator alert from here.
                    warn!(?e, "Push channel error, polling continues");
                }
            }

            if self.is_shutdown() {
                *self.state.write() = ConnectionState::Disconnected;
                return Ok(());
            }

            attempt += 1;
            if self.config.max_reconnect_attempts > 0
                && attempt >= self.config.max_reconnect_attempts
            {
                error!(attempt, "Max push reconnection attempts reached");
                *self.state.write() = ConnectionState::Disconnected;
                return Err(PushError::ConnectionFailed(
                    "Max reconnection attempts reached".to_string(),
                ));
            }

            *self.state.write() = ConnectionState::Reconnecting;

            let delay = self.calculate_backoff_delay(attempt);
            debug!(attempt, delay_ms = delay.as_millis(), "Push reconnect backoff");

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = self.shutdown_token.cancelled() => {
                    *self.state.write() = ConnectionState::Disconnected;
                    return Ok(());
                }
            }
        }
    }

    async fn try_connect(&self) -> PushResult<()> {
        info!(url = %self.config.url, "Connecting to push channel");

        let (ws_stream, _response) = connect_async(&self.config.url).await?;
        let (mut write, mut read) = ws_stream.split();

        *self.state.write() = ConnectionState::Connected;
        info!("Push channel connected");

        let mut outbound_rx = self.outbound_rx.lock().await;

        loop {
            tokio::select! {
                () = self.shutdown_token.cancelled() => {
                    info!("Shutdown signal received in push message loop");
                    if let Err(e) = write.send(Message::Close(None)).await {
                        warn!(?e, "Failed to send Close frame during shutdown");
                    }
                    *self.state.write() = ConnectionState::Disconnected;
                    return Ok(());
                }

                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_text_frame(&text);
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = frame
                                .map(|f| (f.code.into(), f.reason.to_string()))
                                .unwrap_or((1000, "Normal close".to_string()));
                            warn!(code, %reason, "Push channel closed by server");
                            return Err(PushError::ConnectionClosed { code, reason });
                        }
                        Some(Err(e)) => {
                            error!(?e, "Push channel read error");
                            return Err(e.into());
                        }
                        None => {
                            warn!("Push channel stream ended");
                            return Ok(());
                        }
                        _ => {}
                    }
                }

                outbound = outbound_rx.recv() => {
                    if let Some(frame) = outbound {
                        let text = frame.to_text()?;
                        write.send(Message::Text(text)).await?;
                        debug!(event = %frame.event, "Outbound push frame sent");
                    }
                }
            }
        }
    }

    /// Parse and dispatch one inbound frame. Malformed frames are logged
    /// and dropped; they must not tear down the connection.
    fn handle_text_frame(&self, text: &str) {
        match PushFrame::parse(text) {
            Ok(frame) => self.router.dispatch(frame),
            Err(e) => {
                warn!(?e, "Malformed push frame dropped");
            }
        }
    }

    fn calculate_backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.config.reconnect_base_delay_ms;
        let max = self.config.reconnect_max_delay_ms;

        // Exponential backoff: base * 2^(attempt-1), capped.
        let exponent = attempt.saturating_sub(1).min(10);
        let delay = base.saturating_mul(1u64 << exponent);
        let delay = delay.min(max);

        // Add jitter (0-1000ms).
        Duration::from_millis(delay + rand_jitter())
    }
}

/// Generate random jitter (0-1000ms).
fn rand_jitter() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    (nanos % 1000) as u64
}

/// Clonable handle for emitting `refresh { type }` requests.
#[derive(Clone)]
pub struct PushEmitter {
    tx: mpsc::Sender<PushFrame>,
}

impl PushEmitter {
    /// Ask the backend to rebroadcast `resource` outside the poll cadence.
    /// Non-blocking; a full queue drops the request with a log line.
    pub fn request_refresh(&self, resource: Resource) {
        let frame = PushFrame::refresh_request(resource);
        if self.tx.try_send(frame).is_err() {
            warn!(%resource, "Push outbound queue full, refresh request dropped");
        }
    }
}
