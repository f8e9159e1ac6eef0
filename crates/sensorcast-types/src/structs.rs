//! Stored records: [`Sensor`] and [`Reading`].
//!
//! Both records serialize with the document-store field names that
//! dashboard clients already consume: `_id` for the identifier,
//! camelCase timestamps, and `sensor` for a reading's owning sensor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{ReadingId, SensorId};

// ---------------------------------------------------------------------------
// Sensor
// ---------------------------------------------------------------------------

/// A named source of readings.
///
/// Created once on an explicit creation request and never updated or
/// deleted afterwards. The store assigns `id`, `created_at` and
/// `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Sensor {
    /// Store-assigned identifier.
    #[serde(rename = "_id")]
    pub id: SensorId,
    /// Display name. Not unique.
    pub name: String,
    /// When the store created the record.
    pub created_at: DateTime<Utc>,
    /// When the store last modified the record.
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// One timestamped temperature/humidity observation tied to one sensor.
///
/// Readings are immutable after creation. Time ordering between readings
/// of the same sensor is established by `created_at` alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Reading {
    /// Store-assigned identifier.
    #[serde(rename = "_id")]
    pub id: ReadingId,
    /// Measured temperature.
    pub temperature: f64,
    /// Measured relative humidity, when the sensor reports one.
    pub humidity: Option<f64>,
    /// The owning sensor.
    pub sensor: SensorId,
    /// When the store created the record.
    pub created_at: DateTime<Utc>,
    /// When the store last modified the record.
    pub updated_at: DateTime<Utc>,
}

impl Reading {
    /// Whether this reading belongs to `sensor`.
    pub fn belongs_to(&self, sensor: SensorId) -> bool {
        self.sensor == sensor
    }
}
