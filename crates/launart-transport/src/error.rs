use thiserror::Error;

/// Errors arising from the transport layer: connection setup, wire framing,
/// and the registry that dispatches frames to `Transport`s.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("not connected")]
    NotConnected,

    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("connection closed while a frame was expected")]
    ConnectionClosed,

    #[error("unexpected frame type received")]
    UnexpectedFrame,

    #[error("no handler registered for this signature")]
    NoHandler,

    #[error("duplicate route: `{0}` is already declared on this router")]
    DuplicateRoute(String),

    #[error("rider.io() called after use(transport) switched to autoreceive")]
    TakenOver,

    #[error("handler returned a body type the adapter cannot encode")]
    UnsupportedResponse,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "websocket")]
    #[error("websocket protocol error: {0}")]
    WebSocket(String),
}

#[cfg(feature = "websocket")]
impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as E;
        match err {
            E::ConnectionClosed | E::AlreadyClosed => TransportError::ConnectionClosed,
            E::Io(io_err) => TransportError::Io(io_err),
            other => TransportError::WebSocket(other.to_string()),
        }
    }
}
