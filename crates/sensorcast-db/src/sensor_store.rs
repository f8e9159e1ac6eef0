//! Sensor persistence on the `sensors` table.

use sensorcast_types::{Sensor, SensorId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;

/// Operations on the `sensors` table.
pub struct SensorStore<'a> {
    pool: &'a PgPool,
}

impl<'a> SensorStore<'a> {
    /// Create a new sensor store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a sensor. The ID is generated here; timestamps come from the
    /// database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn insert(&self, name: &str) -> Result<SensorRow, DbError> {
        let row = sqlx::query_as::<_, SensorRow>(
            r"INSERT INTO sensors (id, name)
              VALUES ($1, $2)
              RETURNING id, name, created_at, updated_at",
        )
        .bind(SensorId::new().into_inner())
        .bind(name)
        .fetch_one(self.pool)
        .await?;

        tracing::debug!(sensor_id = %row.id, "Inserted sensor");
        Ok(row)
    }

    /// Fetch one sensor by ID.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get(&self, id: SensorId) -> Result<Option<SensorRow>, DbError> {
        let row = sqlx::query_as::<_, SensorRow>(
            r"SELECT id, name, created_at, updated_at
              FROM sensors
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Fetch all sensors in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn list(&self) -> Result<Vec<SensorRow>, DbError> {
        let rows = sqlx::query_as::<_, SensorRow>(
            r"SELECT id, name, created_at, updated_at
              FROM sensors
              ORDER BY created_at, id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

/// A row from the `sensors` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SensorRow {
    /// Sensor ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Last modification timestamp.
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<SensorRow> for Sensor {
    fn from(row: SensorRow) -> Self {
        Self {
            id: SensorId::from(row.id),
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
