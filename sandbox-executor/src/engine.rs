//! The `ContainerEngine` seam: everything the executor needs from a
//! container runtime, abstracted so the classification logic in
//! [`crate::executor`] can be tested without Docker installed.

use async_trait::async_trait;
use std::path::PathBuf;

use judge_types::JudgeError;

use crate::policy::ContainerPolicy;

/// One container invocation: the image to run, the shell command to
/// execute inside it, and the work directory to bind-mount read-write at
/// the same path inside the container.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub image: String,
    pub command: String,
    pub work_dir: PathBuf,
    pub policy: ContainerPolicy,
}

/// The raw outcome of a container run: exit code plus combined
/// stdout/stderr logs. Classification into `JudgeError` variants happens
/// one layer up, in [`crate::executor::Executor`].
#[derive(Debug, Clone)]
pub struct ContainerOutcome {
    pub exit_code: i32,
    pub logs: String,
}

/// A container engine capable of running one throwaway, network-disabled,
/// resource-capped container per call and tearing it down afterwards.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Runs `spec` to completion (the container's own `timeout` wrapper
    /// bounds its wall-clock duration; the engine does not need to apply
    /// an external deadline). Returns `Err(EngineUnavailable)` if the
    /// engine itself cannot be reached; any other failure is reported as
    /// a non-zero `exit_code` in the returned [`ContainerOutcome`].
    async fn run(&self, spec: ContainerSpec) -> Result<ContainerOutcome, JudgeError>;
}
