//! True end-to-end coverage for the WebSocket server adapter: a real
//! `tokio::net::TcpListener` serving a `launart_axum`-built router, and a
//! real `tokio-tungstenite` client connecting over the wire. Unit tests
//! elsewhere exercise `build_router`/`drive_websocket` in isolation
//! (oneshot requests, no live socket); this is the one place the whole
//! chain - accept, upgrade, echo, close - runs over an actual connection.

use futures_util::{SinkExt, StreamExt};
use launart_axum::build_router;
use launart_transport::{Registrar, ServerRouter, WebsocketEndpoint};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::protocol::Message;

async fn spawn_server(router: Arc<ServerRouter>) -> std::net::SocketAddr {
    let app = build_router(router).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn round_trip_frame_delivery_over_a_live_socket() {
    let transport = Registrar::new()
        .declare_websocket(WebsocketEndpoint::new("/ws"))
        .on_received(Arc::new(|io, packet| {
            Box::pin(async move {
                io.send(packet).await.ok();
            })
        }))
        .build();
    let router = Arc::new(ServerRouter::new(vec![transport]));
    let addr = spawn_server(router).await;

    let url = format!("ws://{addr}/ws");
    let (mut socket, _response) = tokio_tungstenite::connect_async(url).await.unwrap();

    socket.send(Message::Text("hello".into())).await.unwrap();
    let reply = socket.next().await.unwrap().unwrap();
    assert_eq!(reply, Message::Text("hello".into()));

    socket.close(None).await.unwrap();
}

#[tokio::test]
async fn connect_and_close_callbacks_fire_around_the_live_session() {
    let connected = Arc::new(tokio::sync::Notify::new());
    let closed = Arc::new(tokio::sync::Notify::new());
    let connected_tx = connected.clone();
    let closed_tx = closed.clone();

    let transport = Registrar::new()
        .declare_websocket(WebsocketEndpoint::new("/ws"))
        .on_connect(Arc::new(move |_io| {
            let connected_tx = connected_tx.clone();
            Box::pin(async move { connected_tx.notify_one() })
        }))
        .on_close(Arc::new(move |_io| {
            let closed_tx = closed_tx.clone();
            Box::pin(async move { closed_tx.notify_one() })
        }))
        .build();
    let router = Arc::new(ServerRouter::new(vec![transport]));
    let addr = spawn_server(router).await;

    let url = format!("ws://{addr}/ws");
    let (mut socket, _response) = tokio_tungstenite::connect_async(url).await.unwrap();
    connected.notified().await;

    socket.close(None).await.unwrap();
    closed.notified().await;
}
