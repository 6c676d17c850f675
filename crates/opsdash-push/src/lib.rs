//! Push event channel for the dashboard.
//!
//! Subscribes to named real-time events over a WebSocket, dispatches each to
//! its registered handler in arrival order, and supports the server's
//! "refresh now" broadcast by staggering poll refreshes instead of firing
//! them all at once. When the transport is down the engine degrades to
//! poll-only mode; the reconnect loop keeps retrying in the background.

pub mod client;
pub mod error;
pub mod message;
pub mod router;

pub use client::{ConnectionState, PushClient, PushConfig, PushEmitter};
pub use error::{PushError, PushResult};
pub use message::PushFrame;
pub use router::{staggered_refresh, EventHandler, EventRouter, StaggerConfig};

use std::sync::Once;

static INIT_CRYPTO: Once = Once::new();

/// Initialize the TLS crypto provider.
/// Must be called before any WebSocket connections are made.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
