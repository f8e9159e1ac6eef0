//! The persistence gateway: typed operations over a [`DocumentStore`].
//!
//! The gateway is the single place that decides whether a sensor exists.
//! Every operation addressed to a sensor resolves it through
//! [`PersistenceGateway::get_sensor_by_id`] first, so a reading is never
//! written for, or read from, a sensor the store does not hold.
//!
//! Sensor IDs arrive as the strings clients sent. A string that is not a
//! valid ID cannot match any record and is reported as
//! [`GatewayError::NotFound`], exactly like a well-formed unknown ID.

use std::sync::Arc;

use sensorcast_types::{Reading, Sensor, SensorId};

use crate::error::DbError;
use crate::store::{DocumentStore, ReadingFilter};

/// Errors returned by gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No sensor matches the given ID.
    #[error("Sensor with id {sensor_id} not found")]
    NotFound {
        /// The ID as the caller supplied it.
        sensor_id: String,
    },

    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] DbError),
}

/// Typed persistence operations shared by every connection.
#[derive(Clone)]
pub struct PersistenceGateway {
    store: Arc<dyn DocumentStore>,
}

impl PersistenceGateway {
    /// Wrap a store handle.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Name of the backing store.
    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Create a sensor. Names are not required to be unique.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Store`] if the insert fails.
    pub async fn create_sensor(&self, name: &str) -> Result<Sensor, GatewayError> {
        let sensor = self.store.insert_sensor(name).await?;
        tracing::info!(sensor_id = %sensor.id, name = %sensor.name, "Sensor created");
        Ok(sensor)
    }

    /// Look up a sensor by ID.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if no sensor matches `sensor_id`,
    /// or [`GatewayError::Store`] if the lookup fails.
    pub async fn get_sensor_by_id(&self, sensor_id: &str) -> Result<Sensor, GatewayError> {
        let not_found = || GatewayError::NotFound {
            sensor_id: sensor_id.to_owned(),
        };
        let Ok(id) = sensor_id.parse::<SensorId>() else {
            return Err(not_found());
        };
        self.store.find_sensor(id).await?.ok_or_else(not_found)
    }

    /// All sensors in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Store`] if the scan fails.
    pub async fn get_all_sensors(&self) -> Result<Vec<Sensor>, GatewayError> {
        Ok(self.store.find_sensors().await?)
    }

    /// Store a reading for an existing sensor.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] without writing anything if the
    /// sensor does not exist, or [`GatewayError::Store`] on store failure.
    pub async fn save_reading(
        &self,
        sensor_id: &str,
        temperature: f64,
        humidity: Option<f64>,
    ) -> Result<Reading, GatewayError> {
        let sensor = self.get_sensor_by_id(sensor_id).await?;
        let reading = self
            .store
            .insert_reading(sensor.id, temperature, humidity)
            .await?;
        tracing::debug!(sensor_id = %sensor.id, reading_id = %reading.id, "Reading saved");
        Ok(reading)
    }

    /// All readings of an existing sensor, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if the sensor does not exist, or
    /// [`GatewayError::Store`] on store failure.
    pub async fn get_readings_by_sensor_id(
        &self,
        sensor_id: &str,
    ) -> Result<Vec<Reading>, GatewayError> {
        let sensor = self.get_sensor_by_id(sensor_id).await?;
        Ok(self
            .store
            .find_readings(ReadingFilter::Sensor(sensor.id))
            .await?)
    }

    /// Every reading of every sensor.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Store`] if the scan fails.
    pub async fn get_all_readings(&self) -> Result<Vec<Reading>, GatewayError> {
        Ok(self.store.find_readings(ReadingFilter::All).await?)
    }

    /// The most recent reading of an existing sensor.
    ///
    /// Returns `Ok(None)` when the sensor exists but has no readings.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if the sensor does not exist, or
    /// [`GatewayError::Store`] on store failure.
    pub async fn get_last_reading_for_sensor(
        &self,
        sensor_id: &str,
    ) -> Result<Option<Reading>, GatewayError> {
        let sensor = self.get_sensor_by_id(sensor_id).await?;
        Ok(self.store.find_latest_reading(sensor.id).await?)
    }

    /// Check that the backing store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Store`] if the store does not answer.
    pub async fn ping(&self) -> Result<(), GatewayError> {
        Ok(self.store.ping().await?)
    }

    /// Number of stored readings across all sensors.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Store`] if the count fails.
    pub async fn count_readings(&self) -> Result<u64, GatewayError> {
        Ok(self.store.count_readings(ReadingFilter::All).await?)
    }
}
