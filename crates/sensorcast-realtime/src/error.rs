//! Error types for event dispatch.
//!
//! [`DispatchError`] unifies every way an inbound event can fail. The
//! dispatcher never broadcasts a failure; the connection task converts it
//! into an [`ErrorNotice`] via [`DispatchError::notice`] and sends it back
//! to the originating client only.

use sensorcast_db::GatewayError;
use sensorcast_events::{ErrorNotice, ValidationError};

/// Errors that can occur while handling one inbound event.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The frame was rejected before reaching the gateway.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A gateway operation failed.
    #[error("{event} failed: {source}")]
    Gateway {
        /// Canonical name of the inbound event.
        event: &'static str,
        /// The gateway failure.
        source: GatewayError,
    },

    /// The outbound payload could not be encoded.
    #[error("{event} failed to encode: {source}")]
    Serialization {
        /// Canonical name of the inbound event.
        event: &'static str,
        /// The encoder failure.
        source: serde_json::Error,
    },
}

impl DispatchError {
    /// Name of the inbound event that failed, when it could be identified.
    pub fn event(&self) -> Option<&str> {
        match self {
            Self::Validation(err) => err.event(),
            Self::Gateway { event, .. } | Self::Serialization { event, .. } => Some(*event),
        }
    }

    /// Whether the failure was caused by the client rather than the server.
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Gateway {
                    source: GatewayError::NotFound { .. },
                    ..
                }
        )
    }

    /// Build the notice sent back to the originating connection.
    pub fn notice(&self) -> ErrorNotice {
        let (message, cause) = match self {
            Self::Validation(err) => ("validation failed", err.to_string()),
            Self::Gateway {
                source: source @ GatewayError::NotFound { .. },
                ..
            } => ("sensor not found", source.to_string()),
            Self::Gateway { source, .. } => ("store operation failed", source.to_string()),
            Self::Serialization { source, .. } => ("failed to encode response", source.to_string()),
        };

        ErrorNotice {
            event: self.event().map(str::to_owned),
            message: message.to_owned(),
            cause,
        }
    }
}
