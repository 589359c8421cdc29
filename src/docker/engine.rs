use tracing::debug;

use crate::error::{Error, Result};

use super::runner::ProcessRunner;

/// Container engine driven through its command-line interface.
#[derive(Debug)]
pub struct ContainerEngine<R> {
    pub(super) runner: R,
}

impl<R: ProcessRunner> ContainerEngine<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Whether the engine daemon answers `info`. Every failure, including a
    /// missing binary, folds into `false`.
    pub fn is_runtime_running(&self) -> bool {
        match self.runner.run(&["info"]) {
            Ok(output) => output.success(),
            Err(e) => {
                debug!(error = %e, "engine probe failed");
                false
            }
        }
    }

    /// Like [`is_runtime_running`](Self::is_runtime_running) but fails with a
    /// fatal, actionable error when the engine is unavailable.
    pub fn ensure_runtime_requirements(&self) -> Result<()> {
        if self.is_runtime_running() {
            return Ok(());
        }
        let program = self.runner.program();
        Err(Error::RuntimeUnavailable(format!(
            "{program} is not running or not installed.\n\
             Please ensure that:\n\
             1. {program} is installed on your system\n\
             2. the {program} daemon is running\n\
             3. you have the permissions needed to run {program}"
        )))
    }
}
