//! A single `Launchable` that serves a WebSocket echo endpoint on
//! `127.0.0.1:8080/ws` for as long as the manager is blocking, then shuts
//! the listener down cleanly on Ctrl-C.
//!
//! Run with `cargo run --example websocket_echo_service`, then connect
//! with any WebSocket client and send text frames - each one comes back
//! unchanged.

use async_trait::async_trait;
use launart::{
    HttpResponse, LaunchError, LaunchStage, Launchable, Launart, ManagerHandle, Registrar,
    ServerRouter, WebsocketEndpoint,
};
use launart_core::LaunchableStatus;
use std::collections::HashSet;
use std::sync::Arc;

struct EchoServer {
    status: LaunchableStatus,
}

impl EchoServer {
    fn new() -> Arc<Self> {
        Arc::new(Self { status: LaunchableStatus::new() })
    }
}

#[async_trait]
impl Launchable for EchoServer {
    fn id(&self) -> &str {
        "echo_server"
    }

    fn required(&self) -> &HashSet<String> {
        static EMPTY: std::sync::OnceLock<HashSet<String>> = std::sync::OnceLock::new();
        EMPTY.get_or_init(HashSet::new)
    }

    fn declared_stages(&self) -> &HashSet<LaunchStage> {
        static STAGES: std::sync::OnceLock<HashSet<LaunchStage>> = std::sync::OnceLock::new();
        STAGES.get_or_init(|| [LaunchStage::Prepare, LaunchStage::Blocking, LaunchStage::Cleanup].into())
    }

    fn status(&self) -> &LaunchableStatus {
        &self.status
    }

    async fn launch(&self, manager: &dyn ManagerHandle) -> Result<(), LaunchError> {
        self.status.set_prepare()?;

        let transport = Registrar::new()
            .declare_websocket(WebsocketEndpoint::new("/ws"))
            .on_received(Arc::new(|io, packet| {
                Box::pin(async move {
                    if let Err(err) = io.send(packet).await {
                        log::warn!("echo_server: failed to echo frame: {err}");
                    }
                })
            }))
            .http(
                launart::HttpEndpoint::new("/healthz"),
                Arc::new(|_io| Box::pin(async { HttpResponse::text("ok") })),
            )
            .build();

        let router = Arc::new(ServerRouter::new(vec![transport]));
        let app = launart_axum::build_router(router)?;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
        println!("echo_server: listening on ws://127.0.0.1:8080/ws");

        self.status.set_blocking()?;

        let shutdown_signal = async {
            manager.wait_for_cleanup().await;
        };
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        self.status.set_cleanup()?;
        println!("echo_server: listener closed");
        self.status.set_finished()?;
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let manager = Launart::new();
    manager.add_launchable(EchoServer::new()).expect("add echo_server");

    println!("websocket_echo_service: press Ctrl-C to shut down");
    if let Err(err) = manager.launch_blocking().await {
        eprintln!("manager exited with an error: {err}");
    }
}
