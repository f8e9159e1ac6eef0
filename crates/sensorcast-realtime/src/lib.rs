//! Real-time server for Sensorcast.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws`) carrying the sensor event protocol
//!   in both directions, fanned out via [`tokio::sync::broadcast`]
//! - **Health probe** (`/api/health`)
//!
//! # Architecture
//!
//! Every connection task subscribes to one shared broadcast channel and
//! hands its inbound frames to the [`Dispatcher`]. The dispatcher calls the
//! persistence gateway and publishes each successful outcome to the
//! channel, so every connected client sees it. Failures go back to the
//! originating connection only.

pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, serve, start_server};
pub use state::{AppState, DEFAULT_BROADCAST_CAPACITY};
