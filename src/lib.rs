//! # launart
//!
//! The launch-and-transport runtime: a dependency-aware component
//! lifecycle manager (`Launart`) built over `launart-core`'s primitives
//! and `launart-interfaces`' `Launchable`/`Service` contracts, plus a
//! unified HTTP/WebSocket transport layer (`launart-transport`, with the
//! `axum` server binding in the optional `launart-axum` crate).
//!
//! This is the single facade crate a consumer depends on directly.

mod error;
mod manager;

pub use error::ManagerError;
pub use manager::Launart;

pub use launart_core::{Config, CoreError, ManagerStage, ManagerStatus};
pub use launart_interfaces::{
    resolve_priority_bindings, ExportInterface, InterfaceError, LaunchError, LaunchStage,
    Launchable, ManagerHandle, ManagerHandleExt, Priority, PriorityLevel, Service,
};
pub use launart_transport::{
    packets, random_id, ClientResponseIO, ConnectFactory, ConnectionHandle, ConnectionRegistry,
    HttpEndpoint, HttpHandler, HttpMethod, HttpRequestInfo, HttpResponse, HttpResponseInfo,
    Packet, Registrar, ResponseBody, ResponseDescriptor, ServerRequestIO, ServerRouter,
    Transport, TransportError, WebsocketClientRider, WebsocketCloseCallback,
    WebsocketConnectCallback, WebsocketEndpoint, WebsocketIO,
    WebsocketReceivedCallback, WebsocketReconnectHandler,
};

#[cfg(feature = "websocket")]
pub use launart_transport::{connect_websocket, TungsteniteClientIO};
