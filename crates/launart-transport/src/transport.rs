//! `Transport`, `Registrar`, and the per-signature handler/callback
//! tables, including `trigger_callbacks`-style concurrent dispatch.
//!
//! One alternative design mutates a class dictionary at class-definition time so that
//! subclassing a Transport refines its tables. Here a `Registrar` builds an
//! immutable `Transport` value once, and `Transport::compose` folds several
//! base `Transport`s plus one's own registrations into a single merged
//! value, eagerly, at construction time.

use crate::io::{HttpResponse, Packet, ServerRequestIO, WebsocketIO};
use crate::signature::{HttpEndpoint, WebsocketEndpoint};
use futures_util::future::BoxFuture;
use log::error;
use std::collections::HashMap;
use std::sync::Arc;

pub type HttpHandler =
    Arc<dyn Fn(Arc<dyn ServerRequestIO>) -> BoxFuture<'static, HttpResponse> + Send + Sync>;
pub type WebsocketConnectCallback =
    Arc<dyn Fn(Arc<dyn WebsocketIO>) -> BoxFuture<'static, ()> + Send + Sync>;
pub type WebsocketReceivedCallback =
    Arc<dyn Fn(Arc<dyn WebsocketIO>, Packet) -> BoxFuture<'static, ()> + Send + Sync>;
pub type WebsocketCloseCallback =
    Arc<dyn Fn(Arc<dyn WebsocketIO>) -> BoxFuture<'static, ()> + Send + Sync>;
pub type WebsocketReconnectHandler = Arc<dyn Fn() -> BoxFuture<'static, bool> + Send + Sync>;

/// A value carrying three per-class tables:
/// `handlers` (one per `HttpEndpoint`), `callbacks` (zero or more per
/// WebSocket event), and `declares` (routes with no body of their own,
/// mounted by a router adapter).
#[derive(Clone, Default)]
pub struct Transport {
    http_handlers: HashMap<HttpEndpoint, HttpHandler>,
    ws_declares: Vec<WebsocketEndpoint>,
    ws_connect: Vec<WebsocketConnectCallback>,
    ws_received: Vec<WebsocketReceivedCallback>,
    ws_close: Vec<WebsocketCloseCallback>,
    ws_reconnect: Option<WebsocketReconnectHandler>,
}

impl Transport {
    pub fn get_handler(&self, endpoint: &HttpEndpoint) -> Option<&HttpHandler> {
        self.http_handlers.get(endpoint)
    }

    pub fn iter_handlers(&self) -> impl Iterator<Item = (&HttpEndpoint, &HttpHandler)> {
        self.http_handlers.iter()
    }

    pub fn declares(&self) -> &[WebsocketEndpoint] {
        &self.ws_declares
    }

    pub fn connect_callbacks(&self) -> &[WebsocketConnectCallback] {
        &self.ws_connect
    }

    pub fn received_callbacks(&self) -> &[WebsocketReceivedCallback] {
        &self.ws_received
    }

    pub fn close_callbacks(&self) -> &[WebsocketCloseCallback] {
        &self.ws_close
    }

    pub fn has_reconnect_handler(&self) -> bool {
        self.ws_reconnect.is_some()
    }

    /// Asks this transport's `WebsocketReconnect` handler whether it wants
    /// to remain subscribed for the next cycle. A transport with no
    /// handler has no opinion and is dropped.
    pub async fn ask_reconnect(&self) -> bool {
        match &self.ws_reconnect {
            Some(handler) => handler().await,
            None => false,
        }
    }

    /// Folds `bases` (in order) then `own` into one merged `Transport`:
    /// handlers overridden in base-to-derived order, callbacks and
    /// declares appended.
    pub fn compose(bases: impl IntoIterator<Item = Transport>, own: Transport) -> Transport {
        let mut merged = Transport::default();
        for base in bases.into_iter().chain(std::iter::once(own)) {
            merged.http_handlers.extend(base.http_handlers);
            merged.ws_declares.extend(base.ws_declares);
            merged.ws_connect.extend(base.ws_connect);
            merged.ws_received.extend(base.ws_received);
            merged.ws_close.extend(base.ws_close);
            if base.ws_reconnect.is_some() {
                merged.ws_reconnect = base.ws_reconnect;
            }
        }
        merged
    }
}

/// Builder that accumulates `{handlers, callbacks, declares}` and produces
/// one immutable `Transport`.
#[derive(Default)]
pub struct Registrar {
    transport: Transport,
}

impl Registrar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn http(mut self, endpoint: HttpEndpoint, handler: HttpHandler) -> Self {
        self.transport.http_handlers.insert(endpoint, handler);
        self
    }

    pub fn declare_websocket(mut self, endpoint: WebsocketEndpoint) -> Self {
        self.transport.ws_declares.push(endpoint);
        self
    }

    pub fn on_connect(mut self, callback: WebsocketConnectCallback) -> Self {
        self.transport.ws_connect.push(callback);
        self
    }

    pub fn on_received(mut self, callback: WebsocketReceivedCallback) -> Self {
        self.transport.ws_received.push(callback);
        self
    }

    pub fn on_close(mut self, callback: WebsocketCloseCallback) -> Self {
        self.transport.ws_close.push(callback);
        self
    }

    pub fn on_reconnect(mut self, handler: WebsocketReconnectHandler) -> Self {
        self.transport.ws_reconnect = Some(handler);
        self
    }

    pub fn build(self) -> Transport {
        self.transport
    }
}

/// Runs every subscribed transport's `Connect` callback against `io`,
/// concurrently, logging (never propagating) a callback that panics -
/// logging each non-fatal exception rather than propagating it.
pub async fn fire_connect(transports: &[Transport], io: Arc<dyn WebsocketIO>) {
    let mut set = tokio::task::JoinSet::new();
    for transport in transports {
        for callback in transport.connect_callbacks() {
            let callback = callback.clone();
            let io = io.clone();
            set.spawn(async move { callback(io).await });
        }
    }
    while let Some(result) = set.join_next().await {
        if let Err(err) = result {
            error!("websocket connect callback panicked: {err}");
        }
    }
}

pub async fn fire_received(transports: &[Transport], io: Arc<dyn WebsocketIO>, packet: Packet) {
    let mut set = tokio::task::JoinSet::new();
    for transport in transports {
        for callback in transport.received_callbacks() {
            let callback = callback.clone();
            let io = io.clone();
            let packet = packet.clone();
            set.spawn(async move { callback(io, packet).await });
        }
    }
    while let Some(result) = set.join_next().await {
        if let Err(err) = result {
            error!("websocket received callback panicked: {err}");
        }
    }
}

pub async fn fire_close(transports: &[Transport], io: Arc<dyn WebsocketIO>) {
    let mut set = tokio::task::JoinSet::new();
    for transport in transports {
        for callback in transport.close_callbacks() {
            let callback = callback.clone();
            let io = io.clone();
            set.spawn(async move { callback(io).await });
        }
    }
    while let Some(result) = set.join_next().await {
        if let Err(err) = result {
            error!("websocket close callback panicked: {err}");
        }
    }
}
