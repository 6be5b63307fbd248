//! Judge Types - Level 1 Foundation Types (Zero Workspace Dependencies)
//!
//! Pure data structures shared by every component of the judge pipeline:
//! the processor registry, the sandbox executor, the gateway/worker pair,
//! and the plagiarism engine. Follows the same layering rule as the rest
//! of this workspace's Level 1 crates: no business logic, no workspace
//! dependencies, everything serializable.
//!
//! ## Contents
//!
//! - [`processor`]: the processor data model (C1).
//! - [`testcase`]: testcases and output comparison.
//! - [`task`]: the broker's unit of work (requests, `Task`, responses).
//! - [`result`]: per-testcase and aggregate evaluation results.
//! - [`submission`]: the plagiarism engine's submission/cluster model.
//! - [`error`]: the shared error taxonomy.

pub mod error;
pub mod processor;
pub mod result;
pub mod submission;
pub mod task;
pub mod testcase;

pub use error::JudgeError;
pub use processor::{Processor, ProcessorId};
pub use result::{EvaluationResult, EvaluationSummary, TestcaseResult, TestcaseStatus};
pub use submission::{
    Cluster, ClusterMember, ProblemCheckResult, ProblemSubmissions, Submission, SuspiciousPair,
    UserSubmissions,
};
pub use task::{
    queues, EvaluateOutcome, EvaluateRequest, ExecuteOutcome, ExecuteRequest, Task, TaskPayload,
    TaskResponse,
};
pub use testcase::{trim_output, Testcase};
