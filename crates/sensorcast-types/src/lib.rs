//! Shared type definitions for Sensorcast.
//!
//! This crate is the single source of truth for the records and payload
//! contracts used across the workspace. Types defined here flow downstream
//! to `TypeScript` via `ts-rs` for dashboard clients.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for sensor and reading identifiers
//! - [`structs`] -- Stored records ([`Sensor`], [`Reading`])
//! - [`payloads`] -- Inbound payload contracts and their validation rules

pub mod ids;
pub mod payloads;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use ids::{ReadingId, SensorId};
pub use payloads::{CreateSensorPayload, ReadingSubmission, SensorIdPayload, SubmitReadingPayload};
pub use structs::{Reading, Sensor};
