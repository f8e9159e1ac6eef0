//! Data layer for Sensorcast.
//!
//! Sensors and readings are persisted through the [`DocumentStore`] trait,
//! implemented by an in-memory backend and by `PostgreSQL`. The
//! [`PersistenceGateway`] sits on top and owns the sensor-existence check
//! every reading operation goes through.
//!
//! # Architecture
//!
//! ```text
//! Dispatcher
//!     |
//!     +-- PersistenceGateway ----> Arc<dyn DocumentStore>
//!                                     |-- MemoryStore
//!                                     +-- PostgresPool
//!                                           |-- SensorStore  (sensors)
//!                                           +-- ReadingStore (readings)
//! ```
//!
//! # Modules
//!
//! - [`store`] -- The [`DocumentStore`] trait and [`ReadingFilter`]
//! - [`memory`] -- In-memory backend
//! - [`postgres`] -- `PostgreSQL` connection pool, schema bootstrap, backend
//! - [`sensor_store`] -- `sensors` table queries
//! - [`reading_store`] -- `readings` table queries
//! - [`gateway`] -- The persistence gateway
//! - [`seed`] -- Development fixtures
//! - [`error`] -- Shared error types

pub mod error;
pub mod gateway;
pub mod memory;
pub mod postgres;
pub mod reading_store;
pub mod seed;
pub mod sensor_store;
pub mod store;

// Re-export primary types for convenience.
pub use error::DbError;
pub use gateway::{GatewayError, PersistenceGateway};
pub use memory::MemoryStore;
pub use postgres::{PostgresConfig, PostgresPool};
pub use reading_store::{ReadingRow, ReadingStore};
pub use seed::seed_fixtures;
pub use sensor_store::{SensorRow, SensorStore};
pub use store::{DocumentStore, ReadingFilter};
