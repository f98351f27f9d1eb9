use super::*;
use crate::services::grid::Pixel;
use crate::state::test_helpers;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio::time::{Duration, timeout};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type ClientStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn open(addr: SocketAddr) -> ClientStream {
    let (stream, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("ws connect should succeed");
    stream
}

async fn next_event(stream: &mut ClientStream) -> Event {
    let fut = async {
        loop {
            let msg = stream
                .next()
                .await
                .expect("stream ended")
                .expect("ws error");
            if let WsMessage::Text(text) = msg {
                return serde_json::from_str::<Event>(text.as_str()).expect("valid event json");
            }
        }
    };
    timeout(Duration::from_secs(2), fut).await.expect("event receive timed out")
}

async fn assert_no_event(stream: &mut ClientStream) {
    assert!(
        timeout(Duration::from_millis(100), stream.next()).await.is_err(),
        "expected no event"
    );
}

async fn put(addr: SocketAddr, token: &str, x: u32, y: u32, color: u8) -> reqwest::Response {
    reqwest::get(format!("http://{addr}/put-pixel?token={token}&x={x}&y={y}&color={color}"))
        .await
        .expect("http request should succeed")
}

#[tokio::test]
async fn connect_receives_initial_snapshot() {
    let state = test_helpers::test_app_state(4, 1000);
    state.grid.write().await.set(1, 2, 3, "alice");
    let addr = test_helpers::spawn_server(state).await;

    let mut stream = open(addr).await;
    assert_eq!(
        next_event(&mut stream).await,
        Event::Initial { size: 4, cells: vec![Pixel { x: 1, y: 2, color: 3, owner: "alice".into() }] }
    );
    assert_no_event(&mut stream).await;
}

#[tokio::test]
async fn placement_reaches_every_viewer() {
    let state = test_helpers::test_app_state(4, 1000);
    let token = test_helpers::seed_session(&state, "alice").await;
    let addr = test_helpers::spawn_server(state).await;

    let mut a = open(addr).await;
    let mut b = open(addr).await;
    assert!(matches!(next_event(&mut a).await, Event::Initial { .. }));
    assert!(matches!(next_event(&mut b).await, Event::Initial { .. }));

    let resp = put(addr, &token, 2, 3, 7).await;
    assert_eq!(resp.text().await.unwrap(), "success");

    let expected = Event::Update(Pixel { x: 2, y: 3, color: 7, owner: "alice".into() });
    assert_eq!(next_event(&mut a).await, expected);
    assert_eq!(next_event(&mut b).await, expected);
}

#[tokio::test]
async fn rejected_placement_sends_nothing() {
    let state = test_helpers::test_app_state(4, 1000);
    let addr = test_helpers::spawn_server(state).await;

    let mut stream = open(addr).await;
    next_event(&mut stream).await;

    let resp = put(addr, "bogus", 0, 0, 0).await;
    assert_eq!(resp.status(), axum::http::StatusCode::BAD_REQUEST);
    assert_no_event(&mut stream).await;
}

#[tokio::test]
async fn reconnect_gets_fresh_snapshot() {
    let state = test_helpers::test_app_state(4, 0);
    let token = test_helpers::seed_session(&state, "alice").await;
    let addr = test_helpers::spawn_server(state).await;

    let mut first = open(addr).await;
    next_event(&mut first).await;
    put(addr, &token, 0, 0, 1).await;
    next_event(&mut first).await;
    first.close(None).await.unwrap();

    put(addr, &token, 1, 1, 2).await;

    let mut second = open(addr).await;
    let Event::Initial { mut cells, .. } = next_event(&mut second).await else {
        panic!("expected initial");
    };
    cells.sort_by_key(|p| (p.x, p.y));
    assert_eq!(cells.len(), 2);
    assert_eq!((cells[0].x, cells[0].color), (0, 1));
    assert_eq!((cells[1].x, cells[1].color), (1, 2));
}

#[tokio::test]
async fn close_unsubscribes_viewer() {
    let state = test_helpers::test_app_state(4, 1000);
    let addr = test_helpers::spawn_server(state.clone()).await;

    let mut stream = open(addr).await;
    next_event(&mut stream).await;
    assert_eq!(state.broadcaster.client_count().await, 1);

    stream.send(WsMessage::Close(None)).await.unwrap();

    let drained = timeout(Duration::from_secs(2), async {
        while state.broadcaster.client_count().await > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(drained.is_ok(), "viewer should be unsubscribed after close");
}
