//! The event dispatcher.
//!
//! Maps each validated inbound event to one gateway call sequence and one
//! outbound broadcast. The dispatcher holds no per-connection or
//! per-sensor state; everything lives in the store. Failures are returned
//! to the caller and never broadcast.

use sensorcast_db::{GatewayError, PersistenceGateway};
use sensorcast_events::{InboundEvent, OutboundEvent, ServerFrame};
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::DispatchError;

/// Routes inbound events to the gateway and broadcasts the results.
pub struct Dispatcher {
    gateway: PersistenceGateway,
    tx: broadcast::Sender<ServerFrame>,
}

impl Dispatcher {
    /// Create a dispatcher publishing into `tx`.
    pub const fn new(gateway: PersistenceGateway, tx: broadcast::Sender<ServerFrame>) -> Self {
        Self { gateway, tx }
    }

    /// The gateway this dispatcher calls.
    pub const fn gateway(&self) -> &PersistenceGateway {
        &self.gateway
    }

    /// Parse, validate and dispatch a raw text frame.
    ///
    /// Returns the number of subscribers the resulting frame reached.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Validation`] without touching the store if
    /// the frame is invalid, otherwise see [`Dispatcher::dispatch`].
    pub async fn dispatch_text(&self, text: &str) -> Result<usize, DispatchError> {
        let event = InboundEvent::from_text(text)?;
        self.dispatch(event).await
    }

    /// Dispatch a validated event and broadcast its outcome.
    ///
    /// Returns the number of subscribers the resulting frame reached.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Gateway`] if a gateway operation fails and
    /// [`DispatchError::Serialization`] if the outcome cannot be encoded.
    /// Nothing is broadcast in either case.
    pub async fn dispatch(&self, event: InboundEvent) -> Result<usize, DispatchError> {
        let name = event.kind().name();

        let outbound = self
            .handle(event)
            .await
            .map_err(|source| DispatchError::Gateway {
                event: name,
                source,
            })?;

        let frame = outbound
            .into_frame()
            .map_err(|source| DispatchError::Serialization {
                event: name,
                source,
            })?;

        let topic = frame.event.clone();
        let receivers = self.publish(frame);
        debug!(inbound = name, outbound = %topic, receivers, "Event dispatched");
        Ok(receivers)
    }

    /// Publish a frame to all connected clients.
    ///
    /// Returns the number of receivers that got the frame. No connected
    /// clients yields 0, which is not an error.
    pub fn publish(&self, frame: ServerFrame) -> usize {
        self.tx.send(frame).unwrap_or(0)
    }

    async fn handle(&self, event: InboundEvent) -> Result<OutboundEvent, GatewayError> {
        let gw = &self.gateway;
        Ok(match event {
            InboundEvent::SubmitReading(submission) => {
                gw.save_reading(
                    &submission.sensor_id,
                    submission.temperature,
                    Some(submission.humidity),
                )
                .await?;
                // Re-broadcast the sensor's full reading set, not just the new item.
                let readings = gw.get_readings_by_sensor_id(&submission.sensor_id).await?;
                OutboundEvent::ReadingsForSensor {
                    sensor_id: submission.sensor_id,
                    readings,
                }
            }
            InboundEvent::CreateSensor { name } => {
                OutboundEvent::NewSensor(gw.create_sensor(&name).await?)
            }
            InboundEvent::GetLastReading { sensor_id } => {
                let reading = gw.get_last_reading_for_sensor(&sensor_id).await?;
                OutboundEvent::LastReading { sensor_id, reading }
            }
            InboundEvent::GetReadingsForSensor { sensor_id } => {
                let readings = gw.get_readings_by_sensor_id(&sensor_id).await?;
                OutboundEvent::ReadingsForSensor {
                    sensor_id,
                    readings,
                }
            }
            InboundEvent::ListSensors => OutboundEvent::SensorList(gw.get_all_sensors().await?),
            InboundEvent::ListAllReadings => {
                OutboundEvent::AllReadings(gw.get_all_readings().await?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::indexing_slicing)]

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use sensorcast_db::{DbError, DocumentStore, MemoryStore, ReadingFilter};
    use sensorcast_types::{Reading, Sensor, SensorId};
    use serde_json::json;
    use tokio::sync::broadcast::error::TryRecvError;

    /// Counts every store call and optionally fails all of them.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingStore {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn touch(&self) -> Result<(), DbError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(DbError::Postgres(sqlx::Error::PoolClosed))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait::async_trait]
    impl DocumentStore for CountingStore {
        fn backend_name(&self) -> &'static str {
            "counting"
        }

        async fn ping(&self) -> Result<(), DbError> {
            self.touch()
        }

        async fn insert_sensor(&self, name: &str) -> Result<Sensor, DbError> {
            self.touch()?;
            self.inner.insert_sensor(name).await
        }

        async fn find_sensor(&self, id: SensorId) -> Result<Option<Sensor>, DbError> {
            self.touch()?;
            self.inner.find_sensor(id).await
        }

        async fn find_sensors(&self) -> Result<Vec<Sensor>, DbError> {
            self.touch()?;
            self.inner.find_sensors().await
        }

        async fn insert_reading(
            &self,
            sensor: SensorId,
            temperature: f64,
            humidity: Option<f64>,
        ) -> Result<Reading, DbError> {
            self.touch()?;
            self.inner.insert_reading(sensor, temperature, humidity).await
        }

        async fn find_readings(&self, filter: ReadingFilter) -> Result<Vec<Reading>, DbError> {
            self.touch()?;
            self.inner.find_readings(filter).await
        }

        async fn find_latest_reading(
            &self,
            sensor: SensorId,
        ) -> Result<Option<Reading>, DbError> {
            self.touch()?;
            self.inner.find_latest_reading(sensor).await
        }

        async fn count_readings(&self, filter: ReadingFilter) -> Result<u64, DbError> {
            self.touch()?;
            self.inner.count_readings(filter).await
        }
    }

    fn setup(store: Arc<CountingStore>) -> (Dispatcher, broadcast::Receiver<ServerFrame>) {
        let (tx, rx) = broadcast::channel(16);
        let dispatcher = Dispatcher::new(PersistenceGateway::new(store), tx);
        (dispatcher, rx)
    }

    fn frame(event: &str, data: serde_json::Value) -> String {
        json!({ "event": event, "data": data }).to_string()
    }

    #[tokio::test]
    async fn submit_reading_broadcasts_full_sensor_readings() {
        let store = Arc::new(CountingStore::default());
        let (dispatcher, mut rx) = setup(Arc::clone(&store));
        let sensor = dispatcher.gateway().create_sensor("A").await.unwrap();
        let id = sensor.id.to_string();
        dispatcher
            .gateway()
            .save_reading(&id, 20.0, Some(40.0))
            .await
            .unwrap();

        let receivers = dispatcher
            .dispatch_text(&frame(
                "submit-reading",
                json!({ "temperature": 25, "humidity": 60, "sensorId": id }),
            ))
            .await
            .unwrap();
        assert_eq!(receivers, 1);

        let out = rx.recv().await.unwrap();
        assert_eq!(out.event, format!("readings-for-sensor-{id}"));
        let readings = out.data["data"].as_array().unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[1]["temperature"].as_f64(), Some(25.0));
        assert_eq!(readings[1]["sensor"], id.as_str());
    }

    #[tokio::test]
    async fn invalid_payload_never_reaches_the_store() {
        let store = Arc::new(CountingStore::default());
        let (dispatcher, mut rx) = setup(Arc::clone(&store));

        let err = dispatcher
            .dispatch_text(&frame(
                "submit-reading",
                json!({ "humidity": 60, "sensorId": "abc" }),
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Validation(_)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn unknown_sensor_is_reported_not_broadcast() {
        let store = Arc::new(CountingStore::default());
        let (dispatcher, mut rx) = setup(Arc::clone(&store));
        let missing = SensorId::new().to_string();

        let err = dispatcher
            .dispatch_text(&frame(
                "submit-reading",
                json!({ "temperature": 25, "humidity": 60, "sensorId": missing }),
            ))
            .await
            .unwrap_err();

        assert!(err.is_client_error());
        assert_eq!(
            err.notice().cause,
            format!("Sensor with id {missing} not found")
        );
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(
            store.inner.count_readings(ReadingFilter::All).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn readings_stay_with_their_sensor() {
        let store = Arc::new(CountingStore::default());
        let (dispatcher, mut rx) = setup(Arc::clone(&store));
        let a = dispatcher.gateway().create_sensor("A").await.unwrap();
        let b = dispatcher.gateway().create_sensor("B").await.unwrap();

        dispatcher
            .dispatch_text(&frame(
                "submit-reading",
                json!({ "temperature": 25, "humidity": 60, "sensorId": a.id.to_string() }),
            ))
            .await
            .unwrap();
        let _ = rx.recv().await.unwrap();

        dispatcher
            .dispatch_text(r#"{"event": "list-all-readings"}"#)
            .await
            .unwrap();
        let all = rx.recv().await.unwrap();
        assert_eq!(all.event, "all-readings");
        let readings = all.data["data"].as_array().unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0]["sensor"], a.id.to_string().as_str());

        dispatcher
            .dispatch_text(&frame("get-readings-for-sensor", json!(b.id.to_string())))
            .await
            .unwrap();
        let for_b = rx.recv().await.unwrap();
        assert_eq!(for_b.event, format!("readings-for-sensor-{}", b.id));
        assert_eq!(for_b.data["data"], json!([]));
    }

    #[tokio::test]
    async fn create_sensor_announces_it() {
        let store = Arc::new(CountingStore::default());
        let (dispatcher, mut rx) = setup(store);

        dispatcher
            .dispatch_text(&frame("create-sensor", json!({ "name": "Cellar" })))
            .await
            .unwrap();
        let out = rx.recv().await.unwrap();
        assert_eq!(out.event, "new-sensor");
        assert_eq!(out.data["sensor"]["name"], "Cellar");

        dispatcher
            .dispatch_text(r#"{"event": "list-sensors"}"#)
            .await
            .unwrap();
        let list = rx.recv().await.unwrap();
        assert_eq!(list.event, "sensor-list");
        assert_eq!(list.data["data"][0]["name"], "Cellar");
    }

    #[tokio::test]
    async fn last_reading_of_empty_sensor_broadcasts_null() {
        let store = Arc::new(CountingStore::default());
        let (dispatcher, mut rx) = setup(store);
        let sensor = dispatcher.gateway().create_sensor("A").await.unwrap();
        let id = sensor.id.to_string();

        dispatcher
            .dispatch_text(&frame("get-last-reading", json!({ "sensorId": id })))
            .await
            .unwrap();
        let out = rx.recv().await.unwrap();
        assert_eq!(out.event, format!("last-reading-{id}"));
        assert!(out.data["data"].is_null());
    }

    #[tokio::test]
    async fn store_failure_is_returned_not_broadcast() {
        let store = Arc::new(CountingStore::failing());
        let (dispatcher, mut rx) = setup(store);

        let err = dispatcher
            .dispatch_text(r#"{"event": "list-sensors"}"#)
            .await
            .unwrap_err();
        assert!(!err.is_client_error());
        assert_eq!(err.event(), Some("list-sensors"));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }
}
