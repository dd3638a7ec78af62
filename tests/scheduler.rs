//! End-to-end scheduling through the public `launart` facade. The
//! `Launart` crate's own unit tests already cover a linear chain's
//! prepare/cleanup ordering; this covers a diamond dependency (two
//! independent middle layers converging on one downstream node) and the
//! boundary behavior of removing a still-required component before launch.

use async_trait::async_trait;
use launart::{LaunchError, LaunchStage, Launchable, Launart, ManagerError, ManagerHandle};
use launart_core::LaunchableStatus;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

struct Node {
    id: &'static str,
    required: HashSet<String>,
    status: LaunchableStatus,
    prepared_gate: Arc<Notify>,
    exited_gate: Arc<Notify>,
    /// How many upstream ids this node's `launch()` must see acknowledged
    /// via `on_require_prepared` before it may call `set_prepare`.
    expected_prepare_deps: usize,
    /// How many *dependents* (other nodes requiring this one) must have
    /// exited, acknowledged via `on_require_exited`, before this node may
    /// call `set_cleanup`.
    expected_exit_dependents: usize,
    order: Arc<Mutex<Vec<String>>>,
}

impl Node {
    fn new(
        id: &'static str,
        required: &[&str],
        expected_prepare_deps: usize,
        expected_exit_dependents: usize,
        order: Arc<Mutex<Vec<String>>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            required: required.iter().map(|s| s.to_string()).collect(),
            status: LaunchableStatus::new(),
            prepared_gate: Arc::new(Notify::new()),
            exited_gate: Arc::new(Notify::new()),
            expected_prepare_deps,
            expected_exit_dependents,
            order,
        })
    }
}

#[async_trait]
impl Launchable for Node {
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
        if self.expected_prepare_deps > 0 {
            self.prepared_gate.notified().await;
        }
        self.status.set_prepare()?;
        self.order.lock().unwrap().push(format!("{}.prepare", self.id));
        self.status.set_blocking()?;

        manager.wait_for_cleanup().await;

        if self.expected_exit_dependents > 0 {
            self.exited_gate.notified().await;
        }
        self.status.set_cleanup()?;
        self.order.lock().unwrap().push(format!("{}.cleanup", self.id));
        self.status.set_finished()?;
        Ok(())
    }
    async fn on_require_prepared(&self, ids: &HashSet<String>) {
        if ids.len() >= self.expected_prepare_deps && self.expected_prepare_deps > 0 {
            self.prepared_gate.notify_one();
        }
    }
    async fn on_require_exited(&self, ids: &HashSet<String>) {
        if ids.len() >= self.expected_exit_dependents && self.expected_exit_dependents > 0 {
            self.exited_gate.notify_one();
        }
    }
}

#[tokio::test]
async fn diamond_dependency_prepares_both_middle_layers_before_the_sink() {
    let order = Arc::new(Mutex::new(Vec::new()));
    // a <- {b, c} <- d. a has 2 dependents (b, c); b and c each have 1
    // dependent (d); d has none.
    let a = Node::new("a", &[], 0, 2, order.clone());
    let b = Node::new("b", &["a"], 1, 1, order.clone());
    let c = Node::new("c", &["a"], 1, 1, order.clone());
    let d = Node::new("d", &["b", "c"], 2, 0, order.clone());

    let manager = Launart::new();
    manager.add_launchable(a).unwrap();
    manager.add_launchable(b).unwrap();
    manager.add_launchable(c).unwrap();
    manager.add_launchable(d.clone()).unwrap();

    let manager_for_launch = manager.clone();
    let handle = tokio::spawn(async move { manager_for_launch.launch().await });

    d.status.wait_for_prepared().await;
    manager.status().set_cleanup().unwrap();
    handle.await.unwrap().unwrap();

    let observed = order.lock().unwrap().clone();
    let pos = |needle: &str| observed.iter().position(|e| e == needle).unwrap();

    assert!(pos("a.prepare") < pos("b.prepare"));
    assert!(pos("a.prepare") < pos("c.prepare"));
    assert!(pos("b.prepare") < pos("d.prepare"));
    assert!(pos("c.prepare") < pos("d.prepare"));
    // reverse order on cleanup: the sink exits first, the root last.
    assert!(pos("d.cleanup") < pos("b.cleanup"));
    assert!(pos("d.cleanup") < pos("c.cleanup"));
    assert!(pos("b.cleanup") < pos("a.cleanup"));
    assert!(pos("c.cleanup") < pos("a.cleanup"));
}

#[tokio::test]
async fn launching_with_a_dangling_requirement_fails_without_spawning_anything() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let downstream = Node::new("downstream", &["ghost"], 1, 0, order);

    let manager = Launart::new();
    manager.add_launchable(downstream).unwrap();

    let err = manager.launch().await.unwrap_err();
    assert!(matches!(err, ManagerError::Core(launart_core::CoreError::RequirementUnresolvable(_))));
}

#[tokio::test]
async fn removing_a_required_component_surfaces_at_the_next_launch() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let upstream = Node::new("upstream", &[], 0, 1, order.clone());
    let downstream = Node::new("downstream", &["upstream"], 1, 0, order);

    let manager = Launart::new();
    manager.add_launchable(upstream).unwrap();
    manager.add_launchable(downstream).unwrap();
    manager.remove_launchable("upstream").unwrap();

    let err = manager.launch().await.unwrap_err();
    assert!(matches!(err, ManagerError::Core(launart_core::CoreError::RequirementUnresolvable(_))));
}
