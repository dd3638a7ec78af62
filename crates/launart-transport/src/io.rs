//! HTTP/WS I/O contracts.
//!
//! These contracts stand in for one `ReadonlyIO`/`PacketIO` pair with a polymorphic
//! `extra(sig) -> T`. Rust has no single return type for that, so the
//! contract is split by direction (server request vs. client response) and
//! `extra` becomes a concrete accessor (`request()`/`response()`) per side,
//! with `headers()`/`cookies()` as default methods layered over it.

use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;

/// A frame exchanged over a WebSocket. `Binary` carries raw bytes; `Text`
/// carries a frame already known to be valid UTF-8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Packet {
    Text(String),
    Binary(Vec<u8>),
}

impl Packet {
    /// JSON-encodes `value` into a text frame, per §4.8 "any other value is
    /// JSON-encoded".
    pub fn json(value: &impl serde::Serialize) -> Result<Self, TransportError> {
        Ok(Packet::Text(serde_json::to_string(value)?))
    }
}

impl From<String> for Packet {
    fn from(value: String) -> Self {
        Packet::Text(value)
    }
}

impl From<Vec<u8>> for Packet {
    fn from(value: Vec<u8>) -> Self {
        Packet::Binary(value)
    }
}

/// The request metadata a server-side `ReadonlyIO` exposes via `extra`.
#[derive(Clone, Debug, Default)]
pub struct HttpRequestInfo {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
    pub remote_addr: Option<String>,
}

/// The response metadata a client-side `ReadonlyIO` exposes via `extra`.
#[derive(Clone, Debug, Default)]
pub struct HttpResponseInfo {
    pub status: u16,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
}

/// Server-side `ReadonlyIO`: wraps one incoming HTTP request.
#[async_trait]
pub trait ServerRequestIO: Send + Sync {
    async fn read(&self) -> Result<Bytes, TransportError>;
    fn request(&self) -> &HttpRequestInfo;

    fn headers(&self) -> &HashMap<String, String> {
        &self.request().headers
    }

    fn cookies(&self) -> &HashMap<String, String> {
        &self.request().cookies
    }
}

/// Client-side `ReadonlyIO`: wraps one received HTTP response.
#[async_trait]
pub trait ClientResponseIO: Send + Sync {
    async fn read(&self) -> Result<Bytes, TransportError>;
    fn response(&self) -> &HttpResponseInfo;

    fn headers(&self) -> &HashMap<String, String> {
        &self.response().headers
    }

    fn cookies(&self) -> &HashMap<String, String> {
        &self.response().cookies
    }
}

/// `PacketIO`: the WebSocket read/write/lifecycle contract shared by
/// server- and client-side sockets.
#[async_trait]
pub trait WebsocketIO: Send + Sync {
    /// Fails with `ConnectionClosed` once the peer has closed the socket,
    /// or `UnexpectedFrame` on a frame type this contract does not model.
    async fn receive(&self) -> Result<Packet, TransportError>;

    async fn send(&self, packet: Packet) -> Result<(), TransportError>;

    /// Issues the accept signal. Idempotent if already accepted.
    async fn accept(&self) -> Result<(), TransportError>;

    /// Closes the socket. A no-op if already closed.
    async fn close(&self) -> Result<(), TransportError>;

    fn is_closed(&self) -> bool;

    fn request(&self) -> &HttpRequestInfo;
}

/// A lazy, finite sequence of payloads from `io`, terminating the moment
/// `receive()` reports the socket closed. Non-closure errors stop the
/// sequence too; the caller already observed the error from `receive()`
/// if it cared to call it directly instead.
pub fn packets<'a>(
    io: &'a (dyn WebsocketIO + 'a),
) -> impl futures_util::Stream<Item = Packet> + 'a {
    futures_util::stream::unfold(io, |io| async move {
        match io.receive().await {
            Ok(packet) => Some((packet, io)),
            Err(_) => None,
        }
    })
}

/// Body normalization rules. `Custom`
/// is the escape hatch for a backend's already-native response type
/// ("an already-native response -> passthrough"); adapters that don't
/// recognize the boxed value inside fail with `UnsupportedResponse`.
pub enum ResponseBody {
    Bytes(Vec<u8>),
    Text(String),
    Json(serde_json::Value),
    File(std::path::PathBuf),
    Custom(Box<dyn std::any::Any + Send>),
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseBody::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            ResponseBody::Text(t) => write!(f, "Text({t:?})"),
            ResponseBody::Json(v) => write!(f, "Json({v})"),
            ResponseBody::File(p) => write!(f, "File({p:?})"),
            ResponseBody::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// The `status`/`headers`/`cookies`/`cookie_expires` descriptor a handler
/// may attach alongside its body.
#[derive(Clone, Debug, Default)]
pub struct ResponseDescriptor {
    pub status: Option<u16>,
    pub headers: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
    pub cookie_expires: Option<i64>,
}

/// What an `HttpEndpoint` handler returns: a body plus its descriptor.
#[derive(Debug)]
pub struct HttpResponse {
    pub body: ResponseBody,
    pub descriptor: ResponseDescriptor,
}

impl HttpResponse {
    pub fn text(body: impl Into<String>) -> Self {
        Self { body: ResponseBody::Text(body.into()), descriptor: ResponseDescriptor::default() }
    }

    pub fn json(value: serde_json::Value) -> Self {
        Self { body: ResponseBody::Json(value), descriptor: ResponseDescriptor::default() }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.descriptor.status = Some(status);
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.descriptor.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_cookie(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.descriptor.cookies.insert(key.into(), value.into());
        self
    }
}
