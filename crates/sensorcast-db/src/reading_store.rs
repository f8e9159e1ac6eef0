//! Reading persistence on the `readings` table.
//!
//! Readings are append-only. Listing queries order by `(created_at, id)`;
//! since IDs are UUID v7 this matches insertion order even when two rows
//! share a timestamp.

use sensorcast_types::{Reading, ReadingId, SensorId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;
use crate::store::ReadingFilter;

/// Columns selected for every reading query.
const COLUMNS: &str = "id, sensor_id, temperature, humidity, created_at, updated_at";

/// Operations on the `readings` table.
pub struct ReadingStore<'a> {
    pool: &'a PgPool,
}

impl<'a> ReadingStore<'a> {
    /// Create a new reading store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a reading for `sensor`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails, including when
    /// `sensor` does not reference an existing row.
    pub async fn insert(
        &self,
        sensor: SensorId,
        temperature: f64,
        humidity: Option<f64>,
    ) -> Result<ReadingRow, DbError> {
        let row = sqlx::query_as::<_, ReadingRow>(&format!(
            "INSERT INTO readings (id, sensor_id, temperature, humidity)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        ))
        .bind(ReadingId::new().into_inner())
        .bind(sensor.into_inner())
        .bind(temperature)
        .bind(humidity)
        .fetch_one(self.pool)
        .await?;

        tracing::debug!(reading_id = %row.id, sensor_id = %sensor, "Inserted reading");
        Ok(row)
    }

    /// Fetch the readings selected by `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn list(&self, filter: ReadingFilter) -> Result<Vec<ReadingRow>, DbError> {
        let rows = match filter {
            ReadingFilter::All => {
                sqlx::query_as::<_, ReadingRow>(&format!(
                    "SELECT {COLUMNS} FROM readings ORDER BY created_at, id"
                ))
                .fetch_all(self.pool)
                .await?
            }
            ReadingFilter::Sensor(sensor) => {
                sqlx::query_as::<_, ReadingRow>(&format!(
                    "SELECT {COLUMNS} FROM readings
                     WHERE sensor_id = $1
                     ORDER BY created_at, id"
                ))
                .bind(sensor.into_inner())
                .fetch_all(self.pool)
                .await?
            }
        };

        Ok(rows)
    }

    /// Fetch the most recent reading of `sensor`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn latest(&self, sensor: SensorId) -> Result<Option<ReadingRow>, DbError> {
        let row = sqlx::query_as::<_, ReadingRow>(&format!(
            "SELECT {COLUMNS} FROM readings
             WHERE sensor_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        ))
        .bind(sensor.into_inner())
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Count the readings selected by `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn count(&self, filter: ReadingFilter) -> Result<u64, DbError> {
        let count: i64 = match filter {
            ReadingFilter::All => {
                sqlx::query_scalar("SELECT COUNT(*) FROM readings")
                    .fetch_one(self.pool)
                    .await?
            }
            ReadingFilter::Sensor(sensor) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM readings WHERE sensor_id = $1")
                    .bind(sensor.into_inner())
                    .fetch_one(self.pool)
                    .await?
            }
        };

        Ok(u64::try_from(count).unwrap_or(0))
    }
}

/// A row from the `readings` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReadingRow {
    /// Reading ID.
    pub id: Uuid,
    /// Owning sensor.
    pub sensor_id: Uuid,
    /// Measured temperature.
    pub temperature: f64,
    /// Measured relative humidity.
    pub humidity: Option<f64>,
    /// Creation timestamp.
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Last modification timestamp.
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ReadingRow> for Reading {
    fn from(row: ReadingRow) -> Self {
        Self {
            id: ReadingId::from(row.id),
            temperature: row.temperature,
            humidity: row.humidity,
            sensor: SensorId::from(row.sensor_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
