use crate::error::CoreError;
use crate::statv::{StatSnapshot, Statv};

/// The overall manager's lifecycle position. Unlike [`super::launchable::Stage`]
/// there is no `finished`: once cleanup completes the manager simply returns
/// from `launch()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ManagerStage {
    #[default]
    Unset,
    Prepare,
    Blocking,
    Cleanup,
}

impl ManagerStage {
    fn name(self) -> &'static str {
        match self {
            ManagerStage::Unset => "unset",
            ManagerStage::Prepare => "prepare",
            ManagerStage::Blocking => "blocking",
            ManagerStage::Cleanup => "cleanup",
        }
    }

    fn validate_advance(self, target: ManagerStage) -> Result<(), CoreError> {
        if self == target {
            return Ok(());
        }
        let legal_next = matches!(
            (self, target),
            (ManagerStage::Unset, ManagerStage::Prepare)
                | (ManagerStage::Prepare, ManagerStage::Blocking)
                | (ManagerStage::Blocking, ManagerStage::Cleanup)
        );
        if legal_next {
            Ok(())
        } else {
            Err(CoreError::StageViolation(self.name(), self.name(), target.name()))
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ManagerSnapshot {
    pub stage: ManagerStage,
}

impl StatSnapshot for ManagerSnapshot {}

/// `Statv` specialization tracking the manager's own lifecycle.
#[derive(Debug)]
pub struct ManagerStatus {
    inner: Statv<ManagerSnapshot>,
}

impl Default for ManagerStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagerStatus {
    pub fn new() -> Self {
        Self {
            inner: Statv::new(ManagerSnapshot::default()),
        }
    }

    pub fn stage(&self) -> ManagerStage {
        self.inner.get().stage
    }

    fn advance(&self, target: ManagerStage) -> Result<(), CoreError> {
        let current = self.stage();
        current.validate_advance(target)?;
        if current != target {
            self.inner.commit(|s| s.stage = target);
        }
        Ok(())
    }

    pub fn set_prepare(&self) -> Result<(), CoreError> {
        self.advance(ManagerStage::Prepare)
    }

    pub fn set_blocking(&self) -> Result<(), CoreError> {
        self.advance(ManagerStage::Blocking)
    }

    pub fn set_cleanup(&self) -> Result<(), CoreError> {
        self.advance(ManagerStage::Cleanup)
    }

    /// Jumps straight to `Cleanup`, bypassing the forward-only validation
    /// `set_cleanup` enforces. Reserved for the signal handler: a `SIGINT`
    /// must move the manager to cleanup even if it arrives during
    /// `Unset`/`Prepare`, before `set_blocking` would otherwise have made
    /// `set_cleanup` legal. A no-op if already cleanup.
    pub fn force_cleanup(&self) {
        self.inner.commit(|s| s.stage = ManagerStage::Cleanup);
    }

    /// Returns once the manager stage has left `{Prepare, Blocking}`, i.e.
    /// once cleanup has begun (or the manager never started).
    pub async fn wait_for_sigexit(&self) {
        while matches!(self.stage(), ManagerStage::Prepare | ManagerStage::Blocking) {
            self.inner.wait_for_update().await;
        }
    }
}
