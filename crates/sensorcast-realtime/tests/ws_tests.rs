//! Integration tests for the `WebSocket` transport.
//!
//! Each test runs the real server on an ephemeral port and talks to it
//! with `tokio-tungstenite` clients.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use sensorcast_db::{MemoryStore, PersistenceGateway};
use sensorcast_realtime::state::AppState;
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

struct TestServer {
    state: Arc<AppState>,
    url: String,
    stop: oneshot::Sender<()>,
    handle: tokio::task::JoinHandle<Result<(), sensorcast_realtime::ServerError>>,
}

impl TestServer {
    async fn start() -> Self {
        let gateway = PersistenceGateway::new(Arc::new(MemoryStore::new()));
        let state = Arc::new(AppState::new(gateway));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}/ws", listener.local_addr().unwrap());
        let (stop, stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(sensorcast_realtime::serve(
            listener,
            Arc::clone(&state),
            async move {
                let _ = stop_rx.await;
            },
        ));

        Self {
            state,
            url,
            stop,
            handle,
        }
    }

    async fn connect(&self) -> Client {
        let (client, _) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .unwrap();
        client
    }

    /// Wait until `n` connection tasks have subscribed to the channel.
    async fn wait_for_subscribers(&self, n: usize) {
        tokio::time::timeout(RECV_TIMEOUT, async {
            while self.state.subscriber_count() < n {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }

    async fn stop(self, clients: Vec<Client>) {
        for mut client in clients {
            let _ = client.close(None).await;
        }
        self.stop.send(()).unwrap();
        self.handle.await.unwrap().unwrap();
    }
}

async fn send_json(client: &mut Client, value: &Value) {
    client
        .send(Message::text(value.to_string()))
        .await
        .unwrap();
}

/// Next text frame as JSON, skipping control frames.
async fn next_frame(client: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(RECV_TIMEOUT, client.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// True if no text frame arrives within `wait`.
async fn stays_silent(client: &mut Client, wait: Duration) -> bool {
    tokio::time::timeout(wait, async {
        loop {
            match client.next().await {
                Some(Ok(Message::Text(_))) | None => return,
                _ => {}
            }
        }
    })
    .await
    .is_err()
}

#[tokio::test]
async fn rejection_goes_to_sender_only_and_connection_survives() {
    let server = TestServer::start().await;
    let sensor = server
        .state
        .dispatcher
        .gateway()
        .create_sensor("Greenhouse")
        .await
        .unwrap();
    let id = sensor.id.to_string();

    let mut a = server.connect().await;
    let mut b = server.connect().await;
    server.wait_for_subscribers(2).await;

    send_json(
        &mut a,
        &json!({ "event": "submit-reading", "data": { "sensorId": id, "humidity": 60.0 } }),
    )
    .await;

    let error = next_frame(&mut a).await;
    assert_eq!(error["event"], "error");
    assert_eq!(error["data"]["event"], "submit-reading");
    assert_eq!(error["data"]["message"], "validation failed");
    assert!(
        error["data"]["cause"]
            .as_str()
            .unwrap()
            .contains("temperature")
    );

    assert!(stays_silent(&mut b, Duration::from_millis(300)).await);

    send_json(
        &mut a,
        &json!({
            "event": "submit-reading",
            "data": { "sensorId": id, "temperature": 25.0, "humidity": 60.0 }
        }),
    )
    .await;

    let topic = format!("readings-for-sensor-{id}");
    for client in [&mut a, &mut b] {
        let frame = next_frame(client).await;
        assert_eq!(frame["event"], topic.as_str());
        let readings = frame["data"]["data"].as_array().unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0]["sensor"], id.as_str());
        assert_eq!(readings[0]["temperature"], json!(25.0));
    }

    server.stop(vec![a, b]).await;
}

#[tokio::test]
async fn unknown_event_is_rejected_with_its_name() {
    let server = TestServer::start().await;
    let mut a = server.connect().await;
    server.wait_for_subscribers(1).await;

    send_json(&mut a, &json!({ "event": "reboot-sensor", "data": {} })).await;

    let error = next_frame(&mut a).await;
    assert_eq!(error["event"], "error");
    assert_eq!(error["data"]["event"], "reboot-sensor");

    a.send(Message::text("not json")).await.unwrap();
    let error = next_frame(&mut a).await;
    assert_eq!(error["event"], "error");
    assert_eq!(error["data"]["message"], "validation failed");

    server.stop(vec![a]).await;
}

#[tokio::test]
async fn ping_is_answered_and_binary_is_ignored() {
    let server = TestServer::start().await;
    let mut a = server.connect().await;
    server.wait_for_subscribers(1).await;

    a.send(Message::binary(vec![0xde, 0xad])).await.unwrap();
    a.send(Message::Ping(vec![7, 7].into())).await.unwrap();

    let reply = tokio::time::timeout(RECV_TIMEOUT, a.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(
        matches!(&reply, Message::Pong(payload) if payload.to_vec() == vec![7, 7]),
        "expected pong, got {reply:?}"
    );

    send_json(&mut a, &json!({ "event": "list-sensors" })).await;
    let frame = next_frame(&mut a).await;
    assert_eq!(frame["event"], "sensor-list");
    assert_eq!(frame["data"]["data"], json!([]));

    server.stop(vec![a]).await;
}
