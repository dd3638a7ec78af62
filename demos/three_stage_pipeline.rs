//! Three launchables in a linear dependency chain (`ingest` -> `transform`
//! -> `publish`), each running through the full prepare/blocking/cleanup
//! lifecycle. Demonstrates the gating pattern `on_require_prepared`/
//! `on_require_exited` callers are expected to implement themselves: each
//! downstream stage waits on a `Notify` its upstream neighbor fires from
//! those hooks, so the printed order always follows the dependency chain
//! even though all three tasks are spawned concurrently.
//!
//! Run with `cargo run --example three_stage_pipeline`, then press Ctrl-C
//! to trigger the graceful shutdown path.

use async_trait::async_trait;
use launart::{LaunchError, LaunchStage, Launchable, Launart, ManagerHandle};
use launart_core::LaunchableStatus;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

struct Stage {
    id: &'static str,
    required: HashSet<String>,
    status: LaunchableStatus,
    prepared_gate: Arc<Notify>,
    exited_gate: Arc<Notify>,
}

impl Stage {
    fn new(id: &'static str, required: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            id,
            required: required.iter().map(|s| s.to_string()).collect(),
            status: LaunchableStatus::new(),
            prepared_gate: Arc::new(Notify::new()),
            exited_gate: Arc::new(Notify::new()),
        })
    }
}

#[async_trait]
impl Launchable for Stage {
    fn id(&self) -> &str {
        self.id
    }

    fn required(&self) -> &HashSet<String> {
        &self.required
    }

    fn declared_stages(&self) -> &HashSet<LaunchStage> {
        static STAGES: std::sync::OnceLock<HashSet<LaunchStage>> = std::sync::OnceLock::new();
        STAGES.get_or_init(|| [LaunchStage::Prepare, LaunchStage::Blocking, LaunchStage::Cleanup].into())
    }

    fn status(&self) -> &LaunchableStatus {
        &self.status
    }

    async fn launch(&self, manager: &dyn ManagerHandle) -> Result<(), LaunchError> {
        if !self.required.is_empty() {
            self.prepared_gate.notified().await;
        }
        println!("[{}] preparing", self.id);
        self.status.set_prepare()?;
        self.status.set_blocking()?;
        println!("[{}] blocking (doing work)", self.id);

        manager.wait_for_cleanup().await;

        if !self.required.is_empty() {
            self.exited_gate.notified().await;
        }
        println!("[{}] cleaning up", self.id);
        self.status.set_cleanup()?;
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.status.set_finished()?;
        println!("[{}] finished", self.id);
        Ok(())
    }

    async fn on_require_prepared(&self, ids: &HashSet<String>) {
        if !ids.is_empty() {
            self.prepared_gate.notify_one();
        }
    }

    async fn on_require_exited(&self, ids: &HashSet<String>) {
        if !ids.is_empty() {
            self.exited_gate.notify_one();
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let ingest = Stage::new("ingest", &[]);
    let transform = Stage::new("transform", &["ingest"]);
    let publish = Stage::new("publish", &["transform"]);

    let manager = Launart::new();
    manager.add_launchable(ingest).expect("add ingest");
    manager.add_launchable(transform).expect("add transform");
    manager.add_launchable(publish).expect("add publish");

    println!("three_stage_pipeline: press Ctrl-C to shut down");
    if let Err(err) = manager.launch_blocking().await {
        eprintln!("manager exited with an error: {err}");
    }
}
