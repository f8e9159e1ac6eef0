//! Wire protocol for the Sensorcast real-time channel.
//!
//! Clients and the server exchange JSON text frames of the form
//! `{"event": <name>, "data": <payload>}`. This crate owns the frame types,
//! the parsing and validation of inbound events, and the naming and payload
//! shape of outbound events.
//!
//! # Modules
//!
//! - [`frame`] -- [`ClientFrame`] and [`ServerFrame`] envelopes
//! - [`inbound`] -- [`InboundEvent`] parsing and [`ValidationError`]
//! - [`outbound`] -- [`OutboundEvent`] names, topics and payloads

pub mod frame;
pub mod inbound;
pub mod outbound;

pub use frame::{ClientFrame, ServerFrame};
pub use inbound::{InboundEvent, InboundKind, ValidationError};
pub use outbound::{ErrorNotice, OutboundEvent, last_reading_topic, readings_topic};
