//! Outbound events emitted by the dispatcher.
//!
//! Sensor-scoped events embed the sensor ID in the event name, which acts
//! as a pseudo-topic: a client interested in one sensor filters frames by
//! name.

use sensorcast_types::{Reading, Sensor};
use serde::Serialize;
use serde_json::{Value, json};

use crate::frame::ServerFrame;

/// Event name announcing a newly created sensor.
pub const NEW_SENSOR: &str = "new-sensor";
/// Event name carrying the full sensor list.
pub const SENSOR_LIST: &str = "sensor-list";
/// Event name carrying every stored reading.
pub const ALL_READINGS: &str = "all-readings";
/// Event name of a failure notice.
pub const ERROR: &str = "error";

/// Topic carrying all readings of one sensor.
pub fn readings_topic(sensor_id: &str) -> String {
    format!("readings-for-sensor-{sensor_id}")
}

/// Topic carrying the latest reading of one sensor.
pub fn last_reading_topic(sensor_id: &str) -> String {
    format!("last-reading-{sensor_id}")
}

/// Payload of an `error` frame, delivered only to the originating connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorNotice {
    /// Inbound event that failed, when it could be identified.
    pub event: Option<String>,
    /// Short summary of the failure.
    pub message: String,
    /// Underlying cause.
    pub cause: String,
}

/// An event the server emits.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    /// All readings of one sensor.
    ReadingsForSensor {
        /// The sensor ID exactly as the client addressed it.
        sensor_id: String,
        /// The sensor's readings in insertion order.
        readings: Vec<Reading>,
    },
    /// A sensor was created.
    NewSensor(Sensor),
    /// Latest reading of one sensor, or `None` if it has none.
    LastReading {
        /// The sensor ID exactly as the client addressed it.
        sensor_id: String,
        /// The most recent reading.
        reading: Option<Reading>,
    },
    /// All sensors.
    SensorList(Vec<Sensor>),
    /// All readings of all sensors.
    AllReadings(Vec<Reading>),
    /// A failure notice.
    Error(ErrorNotice),
}

impl OutboundEvent {
    /// The event name, including the sensor topic where applicable.
    pub fn name(&self) -> String {
        match self {
            Self::ReadingsForSensor { sensor_id, .. } => readings_topic(sensor_id),
            Self::LastReading { sensor_id, .. } => last_reading_topic(sensor_id),
            Self::NewSensor(_) => NEW_SENSOR.to_owned(),
            Self::SensorList(_) => SENSOR_LIST.to_owned(),
            Self::AllReadings(_) => ALL_READINGS.to_owned(),
            Self::Error(_) => ERROR.to_owned(),
        }
    }

    /// The JSON payload.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if a record cannot be encoded.
    pub fn payload(&self) -> Result<Value, serde_json::Error> {
        Ok(match self {
            Self::ReadingsForSensor { readings, .. } | Self::AllReadings(readings) => {
                json!({ "data": serde_json::to_value(readings)? })
            }
            Self::LastReading { reading, .. } => {
                json!({ "data": serde_json::to_value(reading)? })
            }
            Self::NewSensor(sensor) => json!({ "sensor": serde_json::to_value(sensor)? }),
            Self::SensorList(sensors) => json!({ "data": serde_json::to_value(sensors)? }),
            Self::Error(notice) => serde_json::to_value(notice)?,
        })
    }

    /// Convert into a wire frame.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the payload cannot be encoded.
    pub fn into_frame(self) -> Result<ServerFrame, serde_json::Error> {
        Ok(ServerFrame {
            event: self.name(),
            data: self.payload()?,
        })
    }
}
