//! In-memory [`DocumentStore`] backend.
//!
//! Records live in insertion-ordered vectors behind a [`tokio::sync::RwLock`].
//! Used for local runs without a database and for every non-ignored test.

use chrono::Utc;
use sensorcast_types::{Reading, ReadingId, Sensor, SensorId};
use tokio::sync::RwLock;

use crate::error::DbError;
use crate::store::{DocumentStore, ReadingFilter};

#[derive(Debug, Default)]
struct Collections {
    sensors: Vec<Sensor>,
    readings: Vec<Reading>,
}

/// A process-local store. Contents are lost on shutdown.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }

    async fn insert_sensor(&self, name: &str) -> Result<Sensor, DbError> {
        let now = Utc::now();
        let sensor = Sensor {
            id: SensorId::new(),
            name: name.to_owned(),
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.sensors.push(sensor.clone());
        Ok(sensor)
    }

    async fn find_sensor(&self, id: SensorId) -> Result<Option<Sensor>, DbError> {
        let inner = self.inner.read().await;
        Ok(inner.sensors.iter().find(|s| s.id == id).cloned())
    }

    async fn find_sensors(&self) -> Result<Vec<Sensor>, DbError> {
        Ok(self.inner.read().await.sensors.clone())
    }

    async fn insert_reading(
        &self,
        sensor: SensorId,
        temperature: f64,
        humidity: Option<f64>,
    ) -> Result<Reading, DbError> {
        let now = Utc::now();
        let reading = Reading {
            id: ReadingId::new(),
            temperature,
            humidity,
            sensor,
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.readings.push(reading.clone());
        Ok(reading)
    }

    async fn find_readings(&self, filter: ReadingFilter) -> Result<Vec<Reading>, DbError> {
        let inner = self.inner.read().await;
        Ok(inner
            .readings
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn find_latest_reading(&self, sensor: SensorId) -> Result<Option<Reading>, DbError> {
        let inner = self.inner.read().await;
        // max_by_key keeps the last maximum, so equal timestamps resolve to
        // the most recently inserted reading.
        Ok(inner
            .readings
            .iter()
            .filter(|r| r.belongs_to(sensor))
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn count_readings(&self, filter: ReadingFilter) -> Result<u64, DbError> {
        let inner = self.inner.read().await;
        let count = inner.readings.iter().filter(|r| filter.matches(r)).count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}
