//! Shared application state for the real-time server.
//!
//! [`AppState`] owns the broadcast channel that fans outbound frames out to
//! every connection task, and the [`Dispatcher`] that publishes into it.

use std::sync::Arc;

use sensorcast_db::PersistenceGateway;
use sensorcast_events::ServerFrame;
use tokio::sync::broadcast;

use crate::dispatcher::Dispatcher;

/// Default capacity of the broadcast channel.
///
/// If a subscriber falls behind by more than this many frames it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest frame.
pub const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast sender for outbound frames.
    pub tx: broadcast::Sender<ServerFrame>,
    /// Handles inbound events and publishes their results.
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    /// Create state around `gateway` with the default channel capacity.
    pub fn new(gateway: PersistenceGateway) -> Self {
        Self::with_capacity(gateway, DEFAULT_BROADCAST_CAPACITY)
    }

    /// Create state around `gateway` with a custom channel capacity.
    ///
    /// A capacity of zero is raised to one.
    pub fn with_capacity(gateway: PersistenceGateway, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        let dispatcher = Arc::new(Dispatcher::new(gateway, tx.clone()));
        Self { tx, dispatcher }
    }

    /// Subscribe to the outbound frame channel.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerFrame> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Name of the storage backend.
    pub fn storage(&self) -> &'static str {
        self.dispatcher.gateway().backend_name()
    }
}
