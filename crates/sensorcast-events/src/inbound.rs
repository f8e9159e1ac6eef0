//! Inbound events and their validation.
//!
//! [`InboundEvent::parse`] is the validation boundary: a frame either
//! becomes a fully-typed event or a [`ValidationError`], and nothing past
//! this point ever sees a missing or mistyped field.

use sensorcast_types::{
    CreateSensorPayload, ReadingSubmission, SensorIdPayload, SubmitReadingPayload,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::ValidationErrors;

use crate::frame::ClientFrame;

/// The inbound event names a client may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InboundKind {
    /// `submit-reading`
    SubmitReading,
    /// `create-sensor`
    CreateSensor,
    /// `get-last-reading`
    GetLastReading,
    /// `get-readings-for-sensor`
    GetReadingsForSensor,
    /// `list-sensors`
    ListSensors,
    /// `list-all-readings`
    ListAllReadings,
}

impl InboundKind {
    /// Canonical event name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::SubmitReading => "submit-reading",
            Self::CreateSensor => "create-sensor",
            Self::GetLastReading => "get-last-reading",
            Self::GetReadingsForSensor => "get-readings-for-sensor",
            Self::ListSensors => "list-sensors",
            Self::ListAllReadings => "list-all-readings",
        }
    }

    /// Resolve an event name, accepting the legacy camelCase names too.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "submit-reading" | "saveSensorData" => Some(Self::SubmitReading),
            "create-sensor" | "createSensor" => Some(Self::CreateSensor),
            "get-last-reading" | "getLastSensorData" => Some(Self::GetLastReading),
            "get-readings-for-sensor" | "getSensorDataList" | "getAllSensorDataBySensorId" => {
                Some(Self::GetReadingsForSensor)
            }
            "list-sensors" | "getAllSensors" => Some(Self::ListSensors),
            "list-all-readings" | "getAllSensorData" => Some(Self::ListAllReadings),
            _ => None,
        }
    }
}

/// A validated inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Persist a reading and re-broadcast the sensor's readings.
    SubmitReading(ReadingSubmission),
    /// Create a sensor and announce it.
    CreateSensor {
        /// Display name of the new sensor.
        name: String,
    },
    /// Broadcast the most recent reading of a sensor.
    GetLastReading {
        /// Identifier of the addressed sensor, as sent by the client.
        sensor_id: String,
    },
    /// Broadcast all readings of a sensor.
    GetReadingsForSensor {
        /// Identifier of the addressed sensor, as sent by the client.
        sensor_id: String,
    },
    /// Broadcast all sensors.
    ListSensors,
    /// Broadcast all readings of all sensors.
    ListAllReadings,
}

/// Reasons an inbound frame is rejected before dispatch.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The text frame is not a JSON event envelope.
    #[error("malformed frame: {0}")]
    MalformedFrame(#[source] serde_json::Error),

    /// The event name is not part of the protocol.
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// A payload field has the wrong JSON type.
    #[error("invalid payload for {event}: {source}")]
    InvalidPayload {
        /// Canonical name of the rejected event.
        event: &'static str,
        /// The underlying decode error.
        source: serde_json::Error,
    },

    /// A payload field is missing or violates a rule.
    #[error("validation failed for {event}: {source}")]
    Rejected {
        /// Canonical name of the rejected event.
        event: &'static str,
        /// The collected rule violations.
        source: ValidationErrors,
    },
}

impl ValidationError {
    /// The event name the rejected frame carried, when one was readable.
    pub fn event(&self) -> Option<&str> {
        match self {
            Self::MalformedFrame(_) => None,
            Self::UnknownEvent(name) => Some(name.as_str()),
            Self::InvalidPayload { event, .. } | Self::Rejected { event, .. } => Some(*event),
        }
    }
}

impl InboundEvent {
    /// Parse and validate a raw text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the frame is not valid JSON, names an
    /// unknown event, or carries an invalid payload.
    pub fn from_text(text: &str) -> Result<Self, ValidationError> {
        let frame: ClientFrame =
            serde_json::from_str(text).map_err(ValidationError::MalformedFrame)?;
        Self::parse(frame)
    }

    /// Validate a decoded frame.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the event is unknown or its payload
    /// fails validation.
    pub fn parse(frame: ClientFrame) -> Result<Self, ValidationError> {
        let kind = InboundKind::from_name(&frame.event)
            .ok_or_else(|| ValidationError::UnknownEvent(frame.event.clone()))?;
        let event = kind.name();

        match kind {
            InboundKind::SubmitReading => {
                let payload: SubmitReadingPayload = decode(event, frame.data)?;
                payload
                    .into_submission()
                    .map(Self::SubmitReading)
                    .map_err(|source| ValidationError::Rejected { event, source })
            }
            InboundKind::CreateSensor => {
                let payload: CreateSensorPayload = decode(event, frame.data)?;
                payload
                    .into_name()
                    .map(|name| Self::CreateSensor { name })
                    .map_err(|source| ValidationError::Rejected { event, source })
            }
            InboundKind::GetLastReading => {
                let sensor_id = decode_sensor_id(event, frame.data)?;
                Ok(Self::GetLastReading { sensor_id })
            }
            InboundKind::GetReadingsForSensor => {
                let sensor_id = decode_sensor_id(event, frame.data)?;
                Ok(Self::GetReadingsForSensor { sensor_id })
            }
            InboundKind::ListSensors => Ok(Self::ListSensors),
            InboundKind::ListAllReadings => Ok(Self::ListAllReadings),
        }
    }

    /// The kind of this event.
    pub const fn kind(&self) -> InboundKind {
        match self {
            Self::SubmitReading(_) => InboundKind::SubmitReading,
            Self::CreateSensor { .. } => InboundKind::CreateSensor,
            Self::GetLastReading { .. } => InboundKind::GetLastReading,
            Self::GetReadingsForSensor { .. } => InboundKind::GetReadingsForSensor,
            Self::ListSensors => InboundKind::ListSensors,
            Self::ListAllReadings => InboundKind::ListAllReadings,
        }
    }
}

/// Decode an object payload. A missing or `null` payload decodes as `{}`
/// so that required fields are reported by the validator.
fn decode<T: DeserializeOwned>(
    event: &'static str,
    data: Option<Value>,
) -> Result<T, ValidationError> {
    let value = match data {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(value) => value,
    };
    serde_json::from_value(value).map_err(|source| ValidationError::InvalidPayload { event, source })
}

/// Decode a sensor ID given either as `{"sensorId": ...}` or as a bare string.
fn decode_sensor_id(
    event: &'static str,
    data: Option<Value>,
) -> Result<String, ValidationError> {
    let payload = match data {
        Some(Value::String(id)) => SensorIdPayload::from_id(id),
        other => decode::<SensorIdPayload>(event, other)?,
    };
    payload
        .into_sensor_id()
        .map_err(|source| ValidationError::Rejected { event, source })
}
