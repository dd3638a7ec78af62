//! `TransportRider`: the connection lifecycle holder that dispatches
//! received frames to subscribed `Transport`s' callbacks.
//!
//! Awaiting the rider (driving `_start_conn` through
//! `__await__`) has no Rust equivalent; `ensure_connected`/`io` are the
//! explicit async methods that replace it.

use crate::error::TransportError;
use crate::io::WebsocketIO;
use crate::transport::{fire_close, fire_connect, fire_received, Transport};
use futures_util::future::BoxFuture;
use launart_core::ConnectionStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// An async "open this connection" closure captured at construction.
pub type ConnectFactory =
    Arc<dyn Fn() -> BoxFuture<'static, Result<Arc<dyn WebsocketIO>, TransportError>> + Send + Sync>;

/// The client-side WebSocket rider: owns the connect factory, the current
/// connection's status, and the set of `Transport`s subscribed to its
/// events once `use_transport` switches it into autoreceive mode.
pub struct WebsocketClientRider {
    factory: ConnectFactory,
    status: ConnectionStatus,
    io_slot: Mutex<Option<Arc<dyn WebsocketIO>>>,
    transports: Mutex<Vec<Transport>>,
    autoreceive: AtomicBool,
    manage_task: Mutex<Option<JoinHandle<()>>>,
}

impl WebsocketClientRider {
    pub fn new(factory: ConnectFactory) -> Arc<Self> {
        Arc::new(Self {
            factory,
            status: ConnectionStatus::new(),
            io_slot: Mutex::new(None),
            transports: Mutex::new(Vec::new()),
            autoreceive: AtomicBool::new(false),
            manage_task: Mutex::new(None),
        })
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn is_autoreceiving(&self) -> bool {
        self.autoreceive.load(Ordering::SeqCst)
    }

    /// `io()`: the active connection, provided autoreceive is not in
    /// effect. Opens a fresh connection if none is live yet.
    pub async fn io(&self) -> Result<Arc<dyn WebsocketIO>, TransportError> {
        if self.autoreceive.load(Ordering::SeqCst) {
            return Err(TransportError::TakenOver);
        }
        if let Some(io) = self.io_slot.lock().await.clone() {
            if !io.is_closed() {
                return Ok(io);
            }
        }
        self.open().await
    }

    async fn open(&self) -> Result<Arc<dyn WebsocketIO>, TransportError> {
        match (self.factory)().await {
            Ok(io) => {
                self.status.update(Some(true), Some(true));
                *self.io_slot.lock().await = Some(io.clone());
                Ok(io)
            }
            Err(err) => {
                self.status.update(Some(false), Some(false));
                Err(err)
            }
        }
    }

    /// `use(transport)`: registers `transport` and, the first time this
    /// is called, spawns `connection_manage()`.
    pub async fn use_transport(self: &Arc<Self>, transport: Transport) {
        self.transports.lock().await.push(transport);
        let was_running = self.autoreceive.swap(true, Ordering::SeqCst);
        if !was_running {
            let rider = self.clone();
            let handle = tokio::spawn(async move { rider.connection_manage().await });
            *self.manage_task.lock().await = Some(handle);
        }
    }

    /// Waits for a running `connection_manage` loop to finish. A no-op if
    /// none is running (or it already finished).
    pub async fn join_manage_task(&self) {
        let handle = self.manage_task.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Step-by-step: ensure the connection, fire `Connect`,
    /// receive until closed firing `Received` per payload, fire `Close`,
    /// then poll each transport's `WebsocketReconnect` handler (if any)
    /// and keep only those answering `true`. Exits once no transport
    /// remains subscribed.
    async fn connection_manage(self: Arc<Self>) {
        loop {
            let snapshot = self.transports.lock().await.clone();
            if snapshot.is_empty() {
                break;
            }

            let io = match self.open().await {
                Ok(io) => io,
                Err(_) => {
                    if !self.collect_reconnect_decisions(&snapshot).await {
                        break;
                    }
                    continue;
                }
            };

            fire_connect(&snapshot, io.clone()).await;

            loop {
                match io.receive().await {
                    Ok(packet) => fire_received(&snapshot, io.clone(), packet).await,
                    Err(_) => break,
                }
            }

            fire_close(&snapshot, io.clone()).await;
            self.status.update(Some(false), None);
            *self.io_slot.lock().await = None;

            if !self.collect_reconnect_decisions(&snapshot).await {
                break;
            }
        }
        self.autoreceive.store(false, Ordering::SeqCst);
    }

    /// Transports without a `WebsocketReconnect` handler have no opinion
    /// and are dropped; transports whose handler answers `true` remain
    /// subscribed for the next cycle.
    async fn collect_reconnect_decisions(&self, snapshot: &[Transport]) -> bool {
        let mut retained = Vec::new();
        for transport in snapshot {
            if transport.has_reconnect_handler() && transport.ask_reconnect().await {
                retained.push(transport.clone());
            }
        }
        let mut transports = self.transports.lock().await;
        *transports = retained;
        !transports.is_empty()
    }
}
