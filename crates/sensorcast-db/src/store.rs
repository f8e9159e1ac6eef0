//! The document-store seam.
//!
//! [`DocumentStore`] is the single abstraction the persistence gateway
//! depends on. Two backends implement it: [`crate::MemoryStore`] and
//! [`crate::PostgresPool`]. Stores assign identifiers and timestamps; they
//! do not check that a referenced sensor exists, which is the gateway's job.

use sensorcast_types::{Reading, Sensor, SensorId};

use crate::error::DbError;

/// Which readings a query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingFilter {
    /// Every reading of every sensor.
    All,
    /// Readings that reference one sensor.
    Sensor(SensorId),
}

impl ReadingFilter {
    /// Whether `reading` is selected by this filter.
    pub fn matches(self, reading: &Reading) -> bool {
        match self {
            Self::All => true,
            Self::Sensor(id) => reading.belongs_to(id),
        }
    }
}

/// Persistent storage for sensors and readings.
///
/// Listing operations return records in insertion order.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name, reported by the health endpoint.
    fn backend_name(&self) -> &'static str;

    /// Check that the store answers. Must not scale with stored data.
    async fn ping(&self) -> Result<(), DbError>;

    /// Insert a new sensor and return the stored record.
    async fn insert_sensor(&self, name: &str) -> Result<Sensor, DbError>;

    /// Look up a sensor by ID.
    async fn find_sensor(&self, id: SensorId) -> Result<Option<Sensor>, DbError>;

    /// All sensors.
    async fn find_sensors(&self) -> Result<Vec<Sensor>, DbError>;

    /// Insert a reading for `sensor` and return the stored record.
    async fn insert_reading(
        &self,
        sensor: SensorId,
        temperature: f64,
        humidity: Option<f64>,
    ) -> Result<Reading, DbError>;

    /// Readings selected by `filter`.
    async fn find_readings(&self, filter: ReadingFilter) -> Result<Vec<Reading>, DbError>;

    /// The reading of `sensor` with the latest creation timestamp.
    async fn find_latest_reading(&self, sensor: SensorId) -> Result<Option<Reading>, DbError>;

    /// Number of readings selected by `filter`.
    async fn count_readings(&self, filter: ReadingFilter) -> Result<u64, DbError>;
}
