//! The error taxonomy shared by the sandbox executor, judge pipeline, and
//! gateway (spec §7). Every variant maps to a distinct `TestcaseStatus` or
//! HTTP status at its call site.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("unsupported processor: {0}")]
    UnsupportedProcessor(String),

    #[error("compile error (exit code {exit_code}): {logs}")]
    CompileError { logs: String, exit_code: i32 },

    #[error("runtime error (exit code {exit_code}): {logs}")]
    RuntimeError { logs: String, exit_code: i32 },

    #[error("time limit exceeded")]
    TimeLimitExceeded,

    #[error("memory limit exceeded")]
    MemoryLimitExceeded,

    #[error("segmentation fault: {0}")]
    SegmentationFault(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("container engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("broker failure: {0}")]
    BrokerFailure(String),

    #[error("timed out waiting for a response")]
    Timeout,

    #[error("{0}")]
    Unknown(String),
}

impl JudgeError {
    /// Maps a sandboxed process's exit code to the corresponding failure,
    /// per the Container policy exit-code table. A total function over
    /// `{0, 124, 126, 127, 137, 139, other non-zero}`; `0` is not a
    /// failure and is asserted against by callers rather than represented
    /// here.
    pub fn from_exit_code(exit_code: i32, logs: impl Into<String>) -> Self {
        let logs = logs.into();
        match exit_code {
            124 => JudgeError::TimeLimitExceeded,
            137 => JudgeError::MemoryLimitExceeded,
            139 => JudgeError::SegmentationFault(logs),
            126 | 127 => JudgeError::FileNotFound(logs),
            other => JudgeError::RuntimeError {
                logs,
                exit_code: other,
            },
        }
    }
}
