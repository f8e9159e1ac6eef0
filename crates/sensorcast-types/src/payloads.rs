//! Inbound payload contracts and their validation rules.
//!
//! Every field is deserialized as an [`Option`] so that a missing field
//! reaches the validator instead of failing inside serde. A field with the
//! wrong JSON type still fails during deserialization; both cases are
//! rejected before any store access.
//!
//! | Payload | Rules |
//! |---|---|
//! | [`SubmitReadingPayload`] | `temperature` required, `humidity` required, `sensorId` required and non-empty |
//! | [`CreateSensorPayload`] | `name` required and non-empty |
//! | [`SensorIdPayload`] | `sensorId` required and non-empty |
//!
//! Unknown fields are ignored.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::{Validate, ValidationErrors};

/// Payload of the `submit-reading` event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SubmitReadingPayload {
    /// Measured temperature.
    #[validate(required(message = "temperature is required"))]
    pub temperature: Option<f64>,
    /// Measured relative humidity.
    #[validate(required(message = "humidity is required"))]
    pub humidity: Option<f64>,
    /// Identifier of the sensor the reading belongs to.
    #[validate(
        required(message = "sensorId is required"),
        length(min = 1, message = "sensorId must not be empty")
    )]
    pub sensor_id: Option<String>,
}

/// Payload of the `create-sensor` event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CreateSensorPayload {
    /// Display name for the new sensor.
    #[validate(
        required(message = "name is required"),
        length(min = 1, message = "name must not be empty")
    )]
    pub name: Option<String>,
}

/// Payload of the events that only address a sensor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SensorIdPayload {
    /// Identifier of the addressed sensor.
    #[validate(
        required(message = "sensorId is required"),
        length(min = 1, message = "sensorId must not be empty")
    )]
    pub sensor_id: Option<String>,
}

/// A reading submission that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingSubmission {
    /// Identifier of the target sensor, as sent by the client.
    pub sensor_id: String,
    /// Measured temperature.
    pub temperature: f64,
    /// Measured relative humidity.
    pub humidity: f64,
}

impl SubmitReadingPayload {
    /// Validate the payload and convert it into a [`ReadingSubmission`].
    ///
    /// # Errors
    ///
    /// Returns the collected [`ValidationErrors`] when any rule fails.
    pub fn into_submission(self) -> Result<ReadingSubmission, ValidationErrors> {
        self.validate()?;
        match (self.sensor_id, self.temperature, self.humidity) {
            (Some(sensor_id), Some(temperature), Some(humidity)) => Ok(ReadingSubmission {
                sensor_id,
                temperature,
                humidity,
            }),
            _ => Err(ValidationErrors::new()),
        }
    }
}

impl CreateSensorPayload {
    /// Validate the payload and return the sensor name.
    ///
    /// # Errors
    ///
    /// Returns the collected [`ValidationErrors`] when any rule fails.
    pub fn into_name(self) -> Result<String, ValidationErrors> {
        self.validate()?;
        self.name.ok_or_else(ValidationErrors::new)
    }
}

impl SensorIdPayload {
    /// Build a payload from a bare sensor ID string.
    pub fn from_id(sensor_id: impl Into<String>) -> Self {
        Self {
            sensor_id: Some(sensor_id.into()),
        }
    }

    /// Validate the payload and return the sensor ID.
    ///
    /// # Errors
    ///
    /// Returns the collected [`ValidationErrors`] when any rule fails.
    pub fn into_sensor_id(self) -> Result<String, ValidationErrors> {
        self.validate()?;
        self.sensor_id.ok_or_else(ValidationErrors::new)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn complete_submission_passes() {
        let payload: SubmitReadingPayload = serde_json::from_str(
            r#"{"temperature": 25, "humidity": 60, "sensorId": "66b74d18"}"#,
        )
        .unwrap();
        let submission = payload.into_submission().unwrap();
        assert_eq!(submission.sensor_id, "66b74d18");
        assert!((submission.temperature - 25.0).abs() < f64::EPSILON);
        assert!((submission.humidity - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_temperature_is_rejected() {
        let payload: SubmitReadingPayload =
            serde_json::from_str(r#"{"humidity": 60, "sensorId": "abc"}"#).unwrap();
        let errors = payload.into_submission().unwrap_err();
        assert!(errors.field_errors().contains_key("temperature"));
    }

    #[test]
    fn missing_humidity_is_rejected() {
        let payload: SubmitReadingPayload =
            serde_json::from_str(r#"{"temperature": 20, "sensorId": "abc"}"#).unwrap();
        let errors = payload.into_submission().unwrap_err();
        assert!(errors.field_errors().contains_key("humidity"));
    }

    #[test]
    fn empty_sensor_id_is_rejected() {
        let payload: SubmitReadingPayload =
            serde_json::from_str(r#"{"temperature": 20, "humidity": 40, "sensorId": ""}"#)
                .unwrap();
        let errors = payload.into_submission().unwrap_err();
        assert!(errors.to_string().contains("sensorId must not be empty"));
    }

    #[test]
    fn string_temperature_fails_deserialization() {
        let parsed = serde_json::from_str::<SubmitReadingPayload>(
            r#"{"temperature": "hot", "humidity": 40, "sensorId": "abc"}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let payload: CreateSensorPayload =
            serde_json::from_str(r#"{"name": "Greenhouse", "owner": "nobody"}"#).unwrap();
        assert_eq!(payload.into_name().unwrap(), "Greenhouse");
    }

    #[test]
    fn empty_sensor_name_is_rejected() {
        let payload = CreateSensorPayload {
            name: Some(String::new()),
        };
        assert!(payload.into_name().is_err());
        assert!(CreateSensorPayload::default().into_name().is_err());
    }

    #[test]
    fn sensor_id_payload_from_bare_id() {
        let payload = SensorIdPayload::from_id("abc");
        assert_eq!(payload.into_sensor_id().unwrap(), "abc");
        assert!(SensorIdPayload::default().into_sensor_id().is_err());
    }
}
