//! `Launart`: the launch manager facade. Owns every registered
//! `Launchable`/`Service`, keeps the service-interface binding table
//! current, and drives the three-phase supervised launch plus
//! signal-driven graceful shutdown.

use crate::error::ManagerError;
use async_trait::async_trait;
use launart_core::{resolve_layers, LaunchableStatus, ManagerStage, ManagerStatus};
use launart_interfaces::{
    resolve_priority_bindings, LaunchError, LaunchStage, Launchable, ManagerHandle, Service,
};
use log::{error, info, warn};
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use tokio::task::JoinSet;

/// A registered component, still wearing whichever of the two contracts
/// (`Launchable` or `Service`) it was added under. `Service: Launchable`
/// gives us every method through either arm; this just picks the one the
/// concrete value was registered as.
#[derive(Clone)]
enum Entry {
    Plain(Arc<dyn Launchable>),
    Service(Arc<dyn Service>),
}

impl Entry {
    fn id(&self) -> String {
        match self {
            Entry::Plain(l) => l.id().to_string(),
            Entry::Service(s) => s.id().to_string(),
        }
    }

    fn required(&self) -> HashSet<String> {
        match self {
            Entry::Plain(l) => l.required().clone(),
            Entry::Service(s) => s.required().clone(),
        }
    }

    fn declared_stages(&self) -> HashSet<LaunchStage> {
        match self {
            Entry::Plain(l) => l.declared_stages().clone(),
            Entry::Service(s) => s.declared_stages().clone(),
        }
    }

    fn status(&self) -> &LaunchableStatus {
        match self {
            Entry::Plain(l) => l.status(),
            Entry::Service(s) => s.status(),
        }
    }

    async fn launch(&self, manager: &dyn ManagerHandle) -> Result<(), LaunchError> {
        match self {
            Entry::Plain(l) => l.launch(manager).await,
            Entry::Service(s) => s.launch(manager).await,
        }
    }

    async fn on_require_prepared(&self, ids: &HashSet<String>) {
        match self {
            Entry::Plain(l) => l.on_require_prepared(ids).await,
            Entry::Service(s) => s.on_require_prepared(ids).await,
        }
    }

    async fn on_require_exited(&self, ids: &HashSet<String>) {
        match self {
            Entry::Plain(l) => l.on_require_exited(ids).await,
            Entry::Service(s) => s.on_require_exited(ids).await,
        }
    }
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    services: Vec<Arc<dyn Service>>,
    /// Read-only between `add_launchable`/`remove_launchable` calls,
    /// recomputed on every mutation.
    service_bind: HashMap<TypeId, Arc<dyn Service>>,
    /// Concrete-type accessors backing `get_component`, keyed by the
    /// `Service` implementor's own `TypeId` (distinct from the interface
    /// types it exports, which key `service_bind`).
    components: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    component_types: HashMap<String, TypeId>,
}

/// The launch-and-transport manager. Constructed behind an `Arc` since the
/// launch body hands every `Launchable` a `&dyn ManagerHandle` borrowed
/// from a clone of that same `Arc`, the way `WebsocketClientRider::new`
/// and `ConnectionRegistry::new` already return `Arc<Self>` in this
/// workspace.
pub struct Launart {
    inner: RwLock<Inner>,
    status: ManagerStatus,
}

impl Launart {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: RwLock::new(Inner::default()),
            status: ManagerStatus::new(),
        })
    }

    pub fn status(&self) -> &ManagerStatus {
        &self.status
    }

    /// Registers a plain `Launchable`. Fails with `DuplicateId` if `id` is
    /// already taken by another registered component.
    pub fn add_launchable(&self, launchable: Arc<dyn Launchable>) -> Result<(), ManagerError> {
        let id = launchable.id().to_string();
        let mut inner = self.inner.write().expect("launart registry poisoned");
        if inner.entries.contains_key(&id) {
            return Err(ManagerError::DuplicateId(id));
        }
        inner.entries.insert(id, Entry::Plain(launchable));
        Ok(())
    }

    /// Registers a `Service`, additionally recomputing the priority-based
    /// interface binding table and making it retrievable by concrete type
    /// through `get_component`.
    pub fn add_component<S: Service + 'static>(&self, service: Arc<S>) -> Result<(), ManagerError> {
        let id = service.id().to_string();
        let mut inner = self.inner.write().expect("launart registry poisoned");
        if inner.entries.contains_key(&id) {
            return Err(ManagerError::DuplicateId(id));
        }

        let as_service: Arc<dyn Service> = service.clone();
        inner.entries.insert(id.clone(), Entry::Service(as_service.clone()));
        inner.services.push(as_service);
        inner.service_bind = recompute_bindings(&inner.services)?;
        inner.components.insert(TypeId::of::<S>(), service as Arc<dyn Any + Send + Sync>);
        inner.component_types.insert(id, TypeId::of::<S>());
        Ok(())
    }

    /// Removes a registered component by id. A no-op if `id` is unknown.
    /// The next `launch()` will fail with `RequirementUnresolvable` if
    /// another component still requires the removed id.
    pub fn remove_launchable(&self, id: &str) -> Result<(), ManagerError> {
        let mut inner = self.inner.write().expect("launart registry poisoned");
        let Some(removed) = inner.entries.remove(id) else {
            return Ok(());
        };
        if matches!(removed, Entry::Service(_)) {
            inner.services.retain(|s| s.id() != id);
            inner.service_bind = recompute_bindings(&inner.services)?;
            if let Some(type_id) = inner.component_types.remove(id) {
                inner.components.remove(&type_id);
            }
        }
        Ok(())
    }

    /// Typed accessor for a registered `Service` by its concrete type.
    pub fn get_component<S: Service + 'static>(&self) -> Option<Arc<S>> {
        let inner = self.inner.read().expect("launart registry poisoned");
        inner.components.get(&TypeId::of::<S>())?.clone().downcast::<S>().ok()
    }

    fn entries_snapshot(&self) -> HashMap<String, Entry> {
        self.inner.read().expect("launart registry poisoned").entries.clone()
    }

    /// The three-phase supervised launch: prepare, blocking, cleanup.
    pub async fn launch(self: &Arc<Self>) -> Result<(), ManagerError> {
        if self.status.stage() != ManagerStage::Unset {
            return Err(ManagerError::AlreadyRunning);
        }

        let entries = self.entries_snapshot();
        let nodes: Vec<(String, HashSet<String>)> =
            entries.iter().map(|(id, entry)| (id.clone(), entry.required())).collect();
        let layers = resolve_layers(&nodes)?;

        let mut tasks: JoinSet<()> = JoinSet::new();
        for (id, entry) in entries.iter() {
            let manager = self.clone();
            let entry = entry.clone();
            let id = id.clone();
            let stages = entry.declared_stages();
            tasks.spawn(async move {
                let result = entry.launch(manager.as_ref() as &dyn ManagerHandle).await;
                log_component_completion(&id, &stages, manager.status.stage(), &result);
            });
        }

        self.status.set_prepare()?;
        info!("launart: entering prepare, {} layer(s)", layers.len());

        let mut resolved: HashSet<String> = HashSet::new();
        for layer in &layers {
            for id in layer {
                let entry = &entries[id];
                let deps: HashSet<String> =
                    entry.required().intersection(&resolved).cloned().collect();
                entry.on_require_prepared(&deps).await;
            }
            for id in layer {
                let entry = &entries[id];
                if entry.declared_stages().contains(&LaunchStage::Prepare) {
                    entry.status().wait_for_prepared().await;
                }
            }
            resolved.extend(layer.iter().cloned());
            info!("launart: layer prepared: {}", layer.join(", "));
        }

        self.status.set_blocking()?;
        info!("launart: entering blocking");

        // Only components that declare `Blocking` gate the natural (no
        // signal) transition to cleanup - one declaring neither Prepare
        // nor Cleanup simply runs to completion and never touches its
        // status at all, so it must not be waited on here.
        let blocking_entries: Vec<Entry> = entries
            .values()
            .filter(|entry| entry.declared_stages().contains(&LaunchStage::Blocking))
            .cloned()
            .collect();
        let mut blocker = tokio::spawn(async move {
            for entry in &blocking_entries {
                entry.status().wait_for_completed().await;
            }
        });

        tokio::select! {
            _ = self.status.wait_for_sigexit() => {
                blocker.abort();
            }
            result = &mut blocker => {
                if let Err(join_err) = result {
                    if !join_err.is_cancelled() {
                        error!("launart: blocker task panicked: {join_err}");
                    }
                }
                // Idempotent: a concurrent sigexit may have already set this.
                let _ = self.status.set_cleanup();
            }
        }

        info!("launart: entering cleanup");
        // `on_require_exited` tells an entry which of its *dependents* (the
        // entries that required it, not the ones it requires) have already
        // exited - the reverse-cleanup analogue of `on_require_prepared`'s
        // forward dependency set. An entry's own `required()` ids always
        // exit after it in a correct reverse pass, so intersecting against
        // them here would never fire.
        let mut dependents: HashMap<String, HashSet<String>> = HashMap::new();
        for (id, entry) in entries.iter() {
            for dep in entry.required() {
                dependents.entry(dep).or_default().insert(id.clone());
            }
        }

        let mut exited: HashSet<String> = HashSet::new();
        for layer in layers.iter().rev() {
            for id in layer {
                let entry = &entries[id];
                let deps: HashSet<String> = dependents
                    .get(id)
                    .map(|ids| ids.intersection(&exited).cloned().collect())
                    .unwrap_or_default();
                entry.on_require_exited(&deps).await;
            }
            for id in layer {
                let entry = &entries[id];
                if entry.declared_stages().contains(&LaunchStage::Cleanup) {
                    entry.status().wait_for_finished().await;
                }
            }
            exited.extend(layer.iter().cloned());
            info!("launart: layer cleaned up: {}", layer.join(", "));
        }

        // Components with no cleanup stage may still be running; let them
        // drain instead of aborting.
        while let Some(result) = tasks.join_next().await {
            if let Err(join_err) = result {
                if !join_err.is_cancelled() {
                    error!("launart: a component task panicked: {join_err}");
                }
            }
        }

        Ok(())
    }

    /// Runs `launch()` to completion, installing a `SIGINT` handler that
    /// moves the manager to cleanup on the first interrupt and
    /// force-aborts on the second (see DESIGN.md for why the second press
    /// aborts rather than being ignored).
    pub async fn launch_blocking(self: &Arc<Self>) -> Result<(), ManagerError> {
        let manager = self.clone();
        let mut launch_task = tokio::spawn(async move { manager.launch().await });

        let mut interrupts = 0u32;
        loop {
            tokio::select! {
                result = &mut launch_task => {
                    return result.map_err(|join_err| ManagerError::TaskFailed(join_err.to_string()))?;
                }
                _ = tokio::signal::ctrl_c() => {
                    interrupts += 1;
                    if interrupts == 1 {
                        info!("launart: interrupt received, moving to cleanup");
                        self.status.force_cleanup();
                    } else {
                        error!("launart: second interrupt received, force-aborting cleanup");
                        launch_task.abort();
                        return Err(ManagerError::ForceAborted);
                    }
                }
            }
        }
    }
}

fn recompute_bindings(
    services: &[Arc<dyn Service>],
) -> Result<HashMap<TypeId, Arc<dyn Service>>, ManagerError> {
    let winners = resolve_priority_bindings(services)?;
    Ok(winners.into_iter().map(|(type_id, index)| (type_id, services[index].clone())).collect())
}

fn log_component_completion(
    id: &str,
    stages: &HashSet<LaunchStage>,
    manager_stage: ManagerStage,
    result: &Result<(), LaunchError>,
) {
    match result {
        Err(err) => error!("launart: `{id}` exited with an error: {err}"),
        Ok(()) => {
            let still_expected = matches!(manager_stage, ManagerStage::Unset | ManagerStage::Prepare)
                && stages.contains(&LaunchStage::Prepare)
                || matches!(manager_stage, ManagerStage::Blocking)
                    && (stages.contains(&LaunchStage::Blocking) || stages.contains(&LaunchStage::Cleanup));
            if still_expected {
                warn!("launart: `{id}` exited before its declared stages ({stages:?}) completed (manager stage: {manager_stage:?})");
            } else {
                info!("launart: `{id}` exited cleanly");
            }
        }
    }
}

#[async_trait]
impl ManagerHandle for Launart {
    fn get_interface_any(&self, type_id: TypeId) -> Option<Arc<dyn Any + Send + Sync>> {
        let service = {
            let inner = self.inner.read().expect("launart registry poisoned");
            inner.service_bind.get(&type_id)?.clone()
        };
        service.get_interface_any(type_id)
    }

    async fn wait_for_cleanup(&self) {
        self.status.wait_for_sigexit().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launart_interfaces::{ExportInterface, Priority};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;

    /// A component that, if `required` is non-empty, waits on a shared
    /// `Notify` (fired from `on_require_prepared`/`on_require_exited`)
    /// before advancing past prepare/cleanup - the gating pattern the
    /// component-contract doc comment on `Launchable::launch` expects
    /// dependent components to implement themselves.
    struct Stage {
        id: String,
        required: HashSet<String>,
        /// Whether some other `Stage` in the test names this one in its
        /// own `required` set - on_require_exited only ever fires
        /// non-trivially for a node with at least one dependent.
        has_dependent: bool,
        stages: HashSet<LaunchStage>,
        status: LaunchableStatus,
        prepared_gate: Arc<Notify>,
        exited_gate: Arc<Notify>,
        order: Arc<StdMutex<Vec<String>>>,
    }

    impl Stage {
        fn new(id: &str, required: &[&str], has_dependent: bool, order: Arc<StdMutex<Vec<String>>>) -> Arc<Self> {
            Arc::new(Self {
                id: id.to_string(),
                required: required.iter().map(|s| s.to_string()).collect(),
                has_dependent,
                stages: [LaunchStage::Prepare, LaunchStage::Blocking, LaunchStage::Cleanup]
                    .into_iter()
                    .collect(),
                status: LaunchableStatus::new(),
                prepared_gate: Arc::new(Notify::new()),
                exited_gate: Arc::new(Notify::new()),
                order,
            })
        }
    }

    #[async_trait]
    impl Launchable for Stage {
        fn id(&self) -> &str {
            &self.id
        }
        fn required(&self) -> &HashSet<String> {
            &self.required
        }
        fn declared_stages(&self) -> &HashSet<LaunchStage> {
            &self.stages
        }
        fn status(&self) -> &LaunchableStatus {
            &self.status
        }
        async fn launch(&self, manager: &dyn ManagerHandle) -> Result<(), LaunchError> {
            if !self.required.is_empty() {
                self.prepared_gate.notified().await;
            }
            self.status.set_prepare().unwrap();
            self.order.lock().unwrap().push(format!("{}.prepare", self.id));
            self.status.set_blocking().unwrap();
            self.order.lock().unwrap().push(format!("{}.blocking", self.id));

            manager.wait_for_cleanup().await;

            if self.has_dependent {
                self.exited_gate.notified().await;
            }
            self.status.set_cleanup().unwrap();
            self.order.lock().unwrap().push(format!("{}.cleanup", self.id));
            self.status.set_finished().unwrap();
            self.order.lock().unwrap().push(format!("{}.finished", self.id));
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

    #[tokio::test]
    async fn scheduler_runs_chain_in_dependency_order_then_reverse_on_cleanup() {
        let order = Arc::new(StdMutex::new(Vec::new()));
        let a = Stage::new("a", &[], true, order.clone());
        let b = Stage::new("b", &["a"], true, order.clone());
        let c = Stage::new("c", &["b"], false, order.clone());

        let manager = Launart::new();
        manager.add_launchable(a.clone()).unwrap();
        manager.add_launchable(b.clone()).unwrap();
        manager.add_launchable(c.clone()).unwrap();

        let manager_for_launch = manager.clone();
        let launch_handle = tokio::spawn(async move { manager_for_launch.launch().await });

        c.status.wait_for_prepared().await;
        manager.status().set_cleanup().unwrap();

        launch_handle.await.unwrap().unwrap();

        let observed = order.lock().unwrap().clone();
        assert_eq!(
            observed,
            vec![
                "a.prepare", "a.blocking", "b.prepare", "b.blocking", "c.prepare", "c.blocking",
                "c.cleanup", "c.finished", "b.cleanup", "b.finished", "a.cleanup", "a.finished",
            ]
        );
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let order = Arc::new(StdMutex::new(Vec::new()));
        let manager = Launart::new();
        manager.add_launchable(Stage::new("dup", &[], false, order.clone())).unwrap();
        let err = manager.add_launchable(Stage::new("dup", &[], false, order)).unwrap_err();
        assert!(matches!(err, ManagerError::DuplicateId(id) if id == "dup"));
    }

    #[tokio::test]
    async fn already_running_is_rejected() {
        let order = Arc::new(StdMutex::new(Vec::new()));
        let a = Stage::new("solo", &[], false, order);
        let manager = Launart::new();
        manager.add_launchable(a.clone()).unwrap();

        let manager_for_launch = manager.clone();
        let launch_handle = tokio::spawn(async move { manager_for_launch.launch().await });
        tokio::task::yield_now().await;
        a.status.wait_for_prepared().await;

        let err = manager.launch().await.unwrap_err();
        assert!(matches!(err, ManagerError::AlreadyRunning));

        manager.status().set_cleanup().unwrap();
        launch_handle.await.unwrap().unwrap();
    }

    struct IFoo;
    struct IBar;

    struct StubService {
        id: String,
        pattern: Priority,
        status: LaunchableStatus,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Launchable for StubService {
        fn id(&self) -> &str {
            &self.id
        }
        fn required(&self) -> &HashSet<String> {
            static EMPTY: std::sync::OnceLock<HashSet<String>> = std::sync::OnceLock::new();
            EMPTY.get_or_init(HashSet::new)
        }
        fn declared_stages(&self) -> &HashSet<LaunchStage> {
            static EMPTY: std::sync::OnceLock<HashSet<LaunchStage>> = std::sync::OnceLock::new();
            EMPTY.get_or_init(HashSet::new)
        }
        fn status(&self) -> &LaunchableStatus {
            &self.status
        }
        async fn launch(&self, _manager: &dyn ManagerHandle) -> Result<(), LaunchError> {
            Ok(())
        }
    }

    impl Service for StubService {
        fn supported_interface_types(&self) -> Priority {
            self.pattern.clone()
        }
        fn get_interface_any(&self, type_id: TypeId) -> Option<Arc<dyn Any + Send + Sync>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if type_id == TypeId::of::<IFoo>() {
                Some(Arc::new(42u32) as Arc<dyn Any + Send + Sync>)
            } else {
                None
            }
        }
    }
    impl ExportInterface for u32 {}

    #[test]
    fn get_interface_resolves_through_priority_winner() {
        let manager = Launart::new();
        let low = Arc::new(StubService {
            id: "s1".into(),
            pattern: Priority::new().priority::<IFoo>(10),
            status: LaunchableStatus::new(),
            calls: AtomicUsize::new(0),
        });
        let high = Arc::new(StubService {
            id: "s2".into(),
            pattern: Priority::new().priority::<IFoo>(20),
            status: LaunchableStatus::new(),
            calls: AtomicUsize::new(0),
        });
        manager.add_component(low.clone()).unwrap();
        manager.add_component(high.clone()).unwrap();

        use launart_interfaces::ManagerHandleExt;
        let resolved = manager.get_interface::<u32>().unwrap();
        assert_eq!(*resolved, 42u32);
        assert_eq!(high.calls.load(Ordering::SeqCst), 1);
        assert_eq!(low.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn conflicting_unlocated_claims_fail_at_registration() {
        let manager = Launart::new();
        let s1 = Arc::new(StubService {
            id: "s1".into(),
            pattern: Priority::new().set::<IBar>(),
            status: LaunchableStatus::new(),
            calls: AtomicUsize::new(0),
        });
        let s2 = Arc::new(StubService {
            id: "s2".into(),
            pattern: Priority::new().set::<IBar>(),
            status: LaunchableStatus::new(),
            calls: AtomicUsize::new(0),
        });
        manager.add_component(s1).unwrap();
        let err = manager.add_component(s2).unwrap_err();
        assert!(matches!(err, ManagerError::Interface(_)));
    }

    #[test]
    fn get_component_returns_the_concrete_service() {
        let manager = Launart::new();
        let svc = Arc::new(StubService {
            id: "s1".into(),
            pattern: Priority::new().set::<IFoo>(),
            status: LaunchableStatus::new(),
            calls: AtomicUsize::new(0),
        });
        manager.add_component(svc.clone()).unwrap();
        let fetched = manager.get_component::<StubService>().unwrap();
        assert_eq!(fetched.id, "s1");
    }

    #[test]
    fn removing_unknown_id_is_a_no_op() {
        let manager = Launart::new();
        manager.remove_launchable("ghost").unwrap();
    }
}
