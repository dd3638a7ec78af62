//! `tokio-tungstenite`-backed WebSocket client transport.

#![cfg(feature = "websocket")]

use crate::error::TransportError;
use crate::io::{HttpRequestInfo, Packet, WebsocketIO};
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A client-side `WebsocketIO` backed by a live `tokio-tungstenite`
/// connection, split into an independently-lockable sink and source so
/// `send`/`receive` can run concurrently from `&self`.
pub struct TungsteniteClientIO {
    sink: Mutex<SplitSink<WsStream, Message>>,
    source: Mutex<SplitStream<WsStream>>,
    closed: AtomicBool,
    request: HttpRequestInfo,
}

/// Opens a WebSocket client connection to `url`. Serves as the connection
/// factory a `WebsocketClientRider` captures at construction.
pub async fn connect_websocket(url: &str) -> Result<TungsteniteClientIO, TransportError> {
    let (stream, _response) = connect_async(url).await?;
    let (sink, source) = stream.split();
    Ok(TungsteniteClientIO {
        sink: Mutex::new(sink),
        source: Mutex::new(source),
        closed: AtomicBool::new(false),
        request: HttpRequestInfo { method: "GET".into(), path: url.to_string(), ..Default::default() },
    })
}

#[async_trait]
impl WebsocketIO for TungsteniteClientIO {
    async fn receive(&self) -> Result<Packet, TransportError> {
        let mut source = self.source.lock().await;
        loop {
            match source.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Packet::Text(text)),
                Some(Ok(Message::Binary(bin))) => return Ok(Packet::Binary(bin)),
                Some(Ok(Message::Ping(payload))) => {
                    drop(source);
                    let _ = self.sink.lock().await.send(Message::Pong(payload)).await;
                    source = self.source.lock().await;
                }
                Some(Ok(Message::Pong(_))) => continue,
                Some(Ok(Message::Close(_))) => {
                    self.closed.store(true, Ordering::SeqCst);
                    return Err(TransportError::ConnectionClosed);
                }
                Some(Ok(Message::Frame(_))) => return Err(TransportError::UnexpectedFrame),
                Some(Err(_)) => {
                    self.closed.store(true, Ordering::SeqCst);
                    return Err(TransportError::ConnectionClosed);
                }
                None => {
                    self.closed.store(true, Ordering::SeqCst);
                    return Err(TransportError::ConnectionClosed);
                }
            }
        }
    }

    async fn send(&self, packet: Packet) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::ConnectionClosed);
        }
        let message = match packet {
            Packet::Text(text) => Message::Text(text),
            Packet::Binary(bin) => Message::Binary(bin),
        };
        self.sink.lock().await.send(message).await.map_err(TransportError::from)
    }

    async fn accept(&self) -> Result<(), TransportError> {
        // The client side of the handshake is already complete by the
        // time `connect_websocket` returns; accepting is a no-op here.
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.sink.lock().await.send(Message::Close(None)).await.ok();
        self.sink.lock().await.close().await.ok();
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn request(&self) -> &HttpRequestInfo {
        &self.request
    }
}
