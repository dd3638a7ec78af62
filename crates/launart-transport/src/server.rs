//! Server-side rider plumbing shared by router adapters: the merged
//! transport table a router consults, plus
//! the connection registry backing P6 (no-leak on close).
//!
//! The actual HTTP/WS binding (turning these into `axum::Router` routes)
//! is backend-specific and lives in `launart-axum`; this module holds
//! everything an adapter needs that isn't tied to a concrete framework.

use crate::io::WebsocketIO;
use crate::signature::{HttpEndpoint, WebsocketEndpoint};
use crate::transport::{fire_close, fire_connect, fire_received, Transport};
use std::sync::Arc;

/// The merged set of `Transport`s mounted on one server router. Route
/// listing here is framework-agnostic; a concrete adapter (`launart-axum`)
/// owns its own `ConnectionRegistry` keyed by whatever value it needs per
/// in-flight request (P6 no-leak lives there, close to the framework
/// types it wraps).
pub struct ServerRouter {
    transports: Vec<Transport>,
}

impl ServerRouter {
    pub fn new(transports: Vec<Transport>) -> Self {
        Self { transports }
    }

    pub fn transports(&self) -> &[Transport] {
        &self.transports
    }

    /// Every distinct `HttpEndpoint` declared (by a handler) or requested
    /// as a bare route across all mounted transports, each paired with
    /// the transport index that owns its handler. Duplicate paths across
    /// transports are a `DuplicateRoute` error - the router accepts only
    /// the first declaration - the router accepts only the first.
    pub fn http_routes(&self) -> Result<Vec<HttpEndpoint>, crate::error::TransportError> {
        let mut seen = std::collections::HashSet::new();
        let mut routes = Vec::new();
        for transport in &self.transports {
            for (endpoint, _handler) in transport.iter_handlers() {
                if !seen.insert(endpoint.path.clone()) {
                    return Err(crate::error::TransportError::DuplicateRoute(endpoint.path.clone()));
                }
                routes.push(endpoint.clone());
            }
        }
        Ok(routes)
    }

    pub fn websocket_routes(&self) -> Result<Vec<WebsocketEndpoint>, crate::error::TransportError> {
        let mut seen = std::collections::HashSet::new();
        let mut routes = Vec::new();
        for transport in &self.transports {
            for endpoint in transport.declares() {
                if !seen.insert(endpoint.path.clone()) {
                    return Err(crate::error::TransportError::DuplicateRoute(endpoint.path.clone()));
                }
                routes.push(endpoint.clone());
            }
        }
        Ok(routes)
    }

    /// Runs the full WebSocket request pipeline for one accepted socket:
    /// fire `Connect`, loop receiving and firing `Received`, then fire
    /// `Close` once the peer disconnects.
    pub async fn drive_websocket(&self, io: Arc<dyn WebsocketIO>) {
        fire_connect(&self.transports, io.clone()).await;
        loop {
            match io.receive().await {
                Ok(packet) => fire_received(&self.transports, io.clone(), packet).await,
                Err(_) => break,
            }
        }
        fire_close(&self.transports, io.clone()).await;
    }
}
