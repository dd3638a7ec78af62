//! # launart-transport
//!
//! The `Transport`/`Registrar` handler-and-callback tables, the
//! `TransportRider` connection holders (client and server), the HTTP/WS
//! I/O contracts, and the `tokio-tungstenite`-backed WebSocket client
//! transport with its reconnect loop.

pub mod error;
pub mod http_client;
pub mod io;
pub mod registry;
pub mod rider;
pub mod server;
pub mod signature;
pub mod transport;
#[cfg(feature = "websocket")]
pub mod websocket;

pub use error::TransportError;
pub use io::{
    packets, ClientResponseIO, HttpRequestInfo, HttpResponse, HttpResponseInfo, Packet,
    ResponseBody, ResponseDescriptor, ServerRequestIO, WebsocketIO,
};
pub use registry::{random_id, ConnectionHandle, ConnectionRegistry};
pub use rider::{ConnectFactory, WebsocketClientRider};
pub use server::ServerRouter;
pub use signature::{HttpEndpoint, HttpMethod, WebsocketEndpoint};
pub use transport::{
    HttpHandler, Registrar, Transport, WebsocketCloseCallback, WebsocketConnectCallback,
    WebsocketReceivedCallback, WebsocketReconnectHandler,
};

#[cfg(feature = "websocket")]
pub use websocket::{connect_websocket, TungsteniteClientIO};
