//! Concrete `ServerRequestIO`/`WebsocketIO` implementations wrapping
//! `axum`'s request and `WebSocket` types.

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use launart_transport::{HttpRequestInfo, Packet, ServerRequestIO, TransportError, WebsocketIO};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

pub struct AxumServerRequestIO {
    info: HttpRequestInfo,
    body: Bytes,
}

impl AxumServerRequestIO {
    pub fn new(info: HttpRequestInfo, body: Bytes) -> Self {
        Self { info, body }
    }
}

#[async_trait]
impl ServerRequestIO for AxumServerRequestIO {
    async fn read(&self) -> Result<Bytes, TransportError> {
        Ok(self.body.clone())
    }

    fn request(&self) -> &HttpRequestInfo {
        &self.info
    }
}

pub struct AxumWebsocketIO {
    sender: Mutex<SplitSink<WebSocket, Message>>,
    receiver: Mutex<SplitStream<WebSocket>>,
    closed: AtomicBool,
    request: HttpRequestInfo,
}

impl AxumWebsocketIO {
    pub fn new(socket: WebSocket, request: HttpRequestInfo) -> Self {
        let (sender, receiver) = socket.split();
        Self { sender: Mutex::new(sender), receiver: Mutex::new(receiver), closed: AtomicBool::new(false), request }
    }
}

#[async_trait]
impl WebsocketIO for AxumWebsocketIO {
    async fn receive(&self) -> Result<Packet, TransportError> {
        let mut receiver = self.receiver.lock().await;
        loop {
            match receiver.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Packet::Text(text)),
                Some(Ok(Message::Binary(bin))) => return Ok(Packet::Binary(bin)),
                // axum answers Ping with Pong internally; nothing to do here.
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                Some(Ok(Message::Close(_))) => {
                    self.closed.store(true, Ordering::SeqCst);
                    return Err(TransportError::ConnectionClosed);
                }
                Some(Err(_)) | None => {
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
        self.sender.lock().await.send(message).await.map_err(|err| TransportError::SendFailed(err.to_string()))
    }

    async fn accept(&self) -> Result<(), TransportError> {
        // The upgrade already completed by the time axum hands us a
        // `WebSocket`; accepting here would be redundant.
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.sender.lock().await.close().await.ok();
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn request(&self) -> &HttpRequestInfo {
        &self.request
    }
}
