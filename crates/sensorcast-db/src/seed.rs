//! Development fixtures.

use crate::error::DbError;
use crate::store::DocumentStore;

/// Fixture sensors and their `(temperature, humidity)` readings.
const FIXTURES: &[(&str, &[(f64, f64)])] = &[
    ("Sensor 1", &[(25.0, 60.0), (24.0, 58.0)]),
    ("Sensor 2", &[(27.0, 55.0), (27.0, 55.0)]),
];

/// Populate an empty store with the fixture sensors and readings.
///
/// Does nothing if the store already holds any sensor. Returns the number
/// of sensors inserted.
///
/// # Errors
///
/// Returns [`DbError`] if any store operation fails.
pub async fn seed_fixtures(store: &dyn DocumentStore) -> Result<usize, DbError> {
    if !store.find_sensors().await?.is_empty() {
        tracing::debug!("Store already populated, skipping fixtures");
        return Ok(0);
    }

    for (name, readings) in FIXTURES {
        let sensor = store.insert_sensor(name).await?;
        for &(temperature, humidity) in *readings {
            store
                .insert_reading(sensor.id, temperature, Some(humidity))
                .await?;
        }
    }

    tracing::info!(sensors = FIXTURES.len(), "Seeded fixture data");
    Ok(FIXTURES.len())
}
