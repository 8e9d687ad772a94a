// Integration tests for `TelemetryStream` against an in-process WebSocket server.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use futures_util::SinkExt;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use teledash_api::{ReconnectPolicy, StreamState, TelemetryStream};

const FRAME_A: &str =
    r#"{"Speed":120,"Throttle":0.8,"Steer":0.1,"Brake":0,"Clutch":0,"Gear":3,"RPM":9000}"#;
const FRAME_B: &str =
    r#"{"Speed":250,"Throttle":1.0,"Steer":0.0,"Brake":0,"Clutch":0,"Gear":8,"RPM":11800}"#;

/// Accept one connection, send `frames`, then close from the server side.
async fn serve_once(frames: Vec<&'static str>) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        for frame in frames {
            ws.send(Message::text(frame)).await.unwrap();
        }
        let _ = ws.close(None).await;
    });

    Url::parse(&format!("ws://{addr}/ws")).unwrap()
}

async fn wait_closed(stream: &TelemetryStream) {
    tokio::time::timeout(Duration::from_secs(5), stream.closed())
        .await
        .expect("stream did not close in time");
}

#[tokio::test]
async fn test_last_frame_wins() {
    let url = serve_once(vec![FRAME_A, FRAME_B]).await;
    let stream = TelemetryStream::open(url, ReconnectPolicy::Never);

    wait_closed(&stream).await;

    let latest = stream.latest().unwrap();
    assert_eq!(latest.speed, 250);
    assert_eq!(latest.gear, 8);
    assert_eq!(stream.dropped_frames(), 0);
}

#[tokio::test]
async fn test_undecodable_frames_are_dropped() {
    let url = serve_once(vec![
        FRAME_A,
        "CarTelemetry/Speed 120 | Gear 3",
        r#"{"LapDistance": 412.5}"#,
    ])
    .await;
    let stream = TelemetryStream::open(url, ReconnectPolicy::Never);

    wait_closed(&stream).await;

    assert_eq!(stream.latest().unwrap().speed, 120);
    assert_eq!(stream.dropped_frames(), 2);
}

#[tokio::test]
async fn test_server_close_without_reconnect_is_terminal() {
    let url = serve_once(vec![]).await;
    let stream = TelemetryStream::open(url, ReconnectPolicy::Never);

    wait_closed(&stream).await;

    assert_eq!(stream.state(), StreamState::Closed);
    assert!(stream.latest().is_none());
    assert!(stream.close_reason().is_some());
}

#[tokio::test]
async fn test_connect_failure_closes_stream() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = Url::parse(&format!("ws://{addr}/ws")).unwrap();
    let stream = TelemetryStream::open(url, ReconnectPolicy::Never);

    wait_closed(&stream).await;
    assert!(stream.close_reason().unwrap().contains("WebSocket"));
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // Server holds the connection open until the client closes it.
    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        ws.send(Message::text(FRAME_A)).await.unwrap();
        let mut closes = 0;
        while let Some(Ok(msg)) = futures_util::StreamExt::next(&mut ws).await {
            if msg.is_close() {
                closes += 1;
            }
        }
        closes
    });

    let url = Url::parse(&format!("ws://{addr}/ws")).unwrap();
    let stream = TelemetryStream::open(url, ReconnectPolicy::Never);

    let mut rx = stream.subscribe();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(Option::is_some))
        .await
        .unwrap()
        .unwrap();

    stream.close();
    stream.close();
    assert_eq!(stream.state(), StreamState::Closed);
    drop(stream);

    let closes = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(closes, 1);
}
