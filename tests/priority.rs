//! Priority-pattern composition and conflict reporting through the public
//! `launart` facade. `launart-interfaces`' own unit tests already cover
//! `resolve_priority_bindings` directly; this exercises the same algorithm
//! reached through `Launart::add_component`/`get_interface`, including a
//! pattern assembled with `Priority::compose`.

use async_trait::async_trait;
use launart::{
    ExportInterface, LaunchError, LaunchStage, Launchable, Launart, ManagerError, ManagerHandle,
    ManagerHandleExt, Priority, Service,
};
use launart_core::LaunchableStatus;
use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::sync::Arc;

struct Cache;
impl ExportInterface for Cache {}

struct Metrics;
impl ExportInterface for Metrics {}

struct Module {
    id: String,
    pattern: Priority,
    status: LaunchableStatus,
}

#[async_trait]
impl Launchable for Module {
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

impl Service for Module {
    fn supported_interface_types(&self) -> Priority {
        self.pattern.clone()
    }
    fn get_interface_any(&self, type_id: TypeId) -> Option<Arc<dyn Any + Send + Sync>> {
        if type_id == TypeId::of::<Cache>() {
            Some(Arc::new(Cache) as Arc<dyn Any + Send + Sync>)
        } else if type_id == TypeId::of::<Metrics>() {
            Some(Arc::new(Metrics) as Arc<dyn Any + Send + Sync>)
        } else {
            None
        }
    }
}

fn module(id: &str, pattern: Priority) -> Arc<Module> {
    Arc::new(Module { id: id.to_string(), pattern, status: LaunchableStatus::new() })
}

#[test]
fn composed_pattern_claims_both_of_its_source_patterns() {
    let manager = Launart::new();
    let cache_claim = Priority::new().priority::<Cache>(5);
    let metrics_claim = Priority::new().set::<Metrics>();
    let composed = Priority::compose([cache_claim, metrics_claim]);

    manager.add_component(module("combined", composed)).unwrap();

    assert!(manager.get_interface::<Cache>().is_ok());
    assert!(manager.get_interface::<Metrics>().is_ok());
}

#[test]
fn tied_numeric_priority_fails_registration_through_the_public_api() {
    let manager = Launart::new();
    manager.add_component(module("a", Priority::new().priority::<Cache>(5))).unwrap();
    let err = manager.add_component(module("b", Priority::new().priority::<Cache>(5))).unwrap_err();
    assert!(matches!(err, ManagerError::Interface(_)));
}

#[test]
fn unresolved_interface_reports_unsupported() {
    let manager = Launart::new();
    manager.add_component(module("a", Priority::new().set::<Cache>())).unwrap();
    let err = manager.get_interface::<Metrics>().unwrap_err();
    assert!(matches!(err, launart::InterfaceError::UnsupportedInterface(_)));
}
