use crate::error::CoreError;
use crate::statv::{StatSnapshot, Statv};

/// The lifecycle position of a `Launchable`. Ordered; only the forward
/// transitions enumerated by [`Stage::validate_advance`] are legal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    #[default]
    Unset,
    Prepare,
    Blocking,
    Cleanup,
    Finished,
}

impl Stage {
    fn name(self) -> &'static str {
        match self {
            Stage::Unset => "unset",
            Stage::Prepare => "prepare",
            Stage::Blocking => "blocking",
            Stage::Cleanup => "cleanup",
            Stage::Finished => "finished",
        }
    }

    /// Setting the same stage again is a no-op; moving to the immediate
    /// successor is legal; anything else (skipping ahead or moving
    /// backward) is a `stage-violation`.
    fn validate_advance(self, target: Stage) -> Result<(), CoreError> {
        if self == target {
            return Ok(());
        }
        let legal_next = matches!(
            (self, target),
            (Stage::Unset, Stage::Prepare)
                | (Stage::Prepare, Stage::Blocking)
                | (Stage::Blocking, Stage::Cleanup)
                | (Stage::Cleanup, Stage::Finished)
        );
        if legal_next {
            Ok(())
        } else {
            Err(CoreError::StageViolation(self.name(), self.name(), target.name()))
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LaunchableSnapshot {
    pub stage: Stage,
}

impl StatSnapshot for LaunchableSnapshot {}

/// `Statv` specialization tracking a `Launchable`'s three-phase lifecycle.
#[derive(Debug)]
pub struct LaunchableStatus {
    inner: Statv<LaunchableSnapshot>,
}

impl Default for LaunchableStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl LaunchableStatus {
    pub fn new() -> Self {
        Self {
            inner: Statv::new(LaunchableSnapshot::default()),
        }
    }

    pub fn stage(&self) -> Stage {
        self.inner.get().stage
    }

    fn advance(&self, target: Stage) -> Result<(), CoreError> {
        let current = self.stage();
        current.validate_advance(target)?;
        if current != target {
            self.inner.commit(|s| s.stage = target);
        }
        Ok(())
    }

    pub fn set_prepare(&self) -> Result<(), CoreError> {
        self.advance(Stage::Prepare)
    }

    pub fn set_blocking(&self) -> Result<(), CoreError> {
        self.advance(Stage::Blocking)
    }

    pub fn set_cleanup(&self) -> Result<(), CoreError> {
        self.advance(Stage::Cleanup)
    }

    pub fn set_finished(&self) -> Result<(), CoreError> {
        self.advance(Stage::Finished)
    }

    /// Returns once `stage` is no longer `Unset`/`Prepare`.
    pub async fn wait_for_prepared(&self) {
        while matches!(self.stage(), Stage::Unset | Stage::Prepare) {
            self.inner.wait_for_update().await;
        }
    }

    /// Returns once `stage` has reached `Cleanup` or later.
    pub async fn wait_for_completed(&self) {
        while self.stage() < Stage::Cleanup {
            self.inner.wait_for_update().await;
        }
    }

    /// Returns once `stage` is `Finished`.
    pub async fn wait_for_finished(&self) {
        while self.stage() != Stage::Finished {
            self.inner.wait_for_update().await;
        }
    }
}
