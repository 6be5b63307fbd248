//! The evaluation procedure (spec §4.3.2): compile once, run once per
//! testcase, classify, aggregate. `execute_task` is the one-shot
//! sibling used by `POST /execute` with no testcases and no scoring.

use judge_types::{
    EvaluateRequest, EvaluateOutcome, EvaluationResult, ExecuteOutcome, ExecuteRequest, JudgeError,
    TestcaseResult, TestcaseStatus,
};
use sandbox_executor::{Executor, WorkDir};

/// Time limit applied to every sandboxed run, in whole seconds. The
/// original pipeline read this from contest config; fixed here pending a
/// per-problem override surfaced through the contest catalog.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Compiles (if needed) and runs `req.code` once, with `req.stdin` as
/// input. Never returns a sandbox error to the caller as `Err` — a
/// failure inside the sandbox becomes `ExecuteOutcome::Error`, matching
/// `response_queue`'s status-tagged wire shape.
pub async fn execute_task(
    executor: &Executor,
    base_dir: &std::path::Path,
    req: &ExecuteRequest,
) -> ExecuteOutcome {
    match run_execute(executor, base_dir, req).await {
        Ok((output, execution_time)) => ExecuteOutcome::Success {
            output,
            execution_time,
        },
        Err(e) => ExecuteOutcome::Error {
            error_message: e.to_string(),
            exit_code: exit_code_of(&e),
        },
    }
}

async fn run_execute(
    executor: &Executor,
    base_dir: &std::path::Path,
    req: &ExecuteRequest,
) -> Result<(String, f64), JudgeError> {
    let processor = processor_registry::lookup(req.processor_id.as_str())
        .ok_or_else(|| JudgeError::UnsupportedProcessor(req.processor_id.to_string()))?;

    let work_dir = WorkDir::create(base_dir)
        .await
        .map_err(|e| JudgeError::Unknown(format!("failed to create work directory: {e}")))?;

    tokio::fs::write(work_dir.path().join(processor.code_filename), &req.code)
        .await
        .map_err(|e| JudgeError::Unknown(format!("failed to write source file: {e}")))?;
    tokio::fs::write(
        work_dir.path().join("input.txt"),
        req.stdin.as_deref().unwrap_or(""),
    )
    .await
    .map_err(|e| JudgeError::Unknown(format!("failed to write stdin: {e}")))?;

    let result = async {
        executor.compile(&work_dir, processor).await?;
        executor.run(&work_dir, processor, DEFAULT_TIMEOUT_SECS).await
    }
    .await;

    let _ = work_dir.finish().await;
    result
}

/// Compiles once, then runs every testcase against the compiled (or
/// interpreted) submission, scoring each and aggregating. A compile
/// failure short-circuits with a single `EvaluationResult` whose every
/// testcase reports `compile_error` — the submission never ran, but the
/// caller still gets one result per testcase to grade against.
pub async fn evaluate_task(
    executor: &Executor,
    base_dir: &std::path::Path,
    req: &EvaluateRequest,
) -> EvaluateOutcome {
    match run_evaluate(executor, base_dir, req).await {
        Ok(result) => EvaluateOutcome::Scored(result),
        Err(e) => EvaluateOutcome::Error {
            error_message: e.to_string(),
        },
    }
}

async fn run_evaluate(
    executor: &Executor,
    base_dir: &std::path::Path,
    req: &EvaluateRequest,
) -> Result<EvaluationResult, JudgeError> {
    let processor = processor_registry::lookup(req.processor_id.as_str())
        .ok_or_else(|| JudgeError::UnsupportedProcessor(req.processor_id.to_string()))?;

    let work_dir = WorkDir::create(base_dir)
        .await
        .map_err(|e| JudgeError::Unknown(format!("failed to create work directory: {e}")))?;

    tokio::fs::write(work_dir.path().join(processor.code_filename), &req.code)
        .await
        .map_err(|e| JudgeError::Unknown(format!("failed to write source file: {e}")))?;

    if let Err(e) = executor.compile(&work_dir, processor).await {
        let _ = work_dir.finish().await;
        return match e {
            JudgeError::CompileError { logs, exit_code } => Ok(compile_error_result(
                &req.testcases,
                &logs,
                exit_code,
            )),
            other => Err(other),
        };
    }

    let mut results = Vec::with_capacity(req.testcases.len());
    for (i, testcase) in req.testcases.iter().enumerate() {
        tokio::fs::write(work_dir.path().join("input.txt"), &testcase.input)
            .await
            .map_err(|e| JudgeError::Unknown(format!("failed to write testcase input: {e}")))?;

        let test_id = TestcaseResult::test_id_for_index(i + 1);
        let outcome = executor.run(&work_dir, processor, DEFAULT_TIMEOUT_SECS).await;
        results.push(score_testcase(test_id, testcase, outcome));
    }

    let _ = work_dir.finish().await;
    Ok(EvaluationResult::from_results(results))
}

fn score_testcase(
    test_id: String,
    testcase: &judge_types::Testcase,
    outcome: Result<(String, f64), JudgeError>,
) -> TestcaseResult {
    match outcome {
        Ok((output, execution_time)) => {
            let passed = judge_types::trim_output(&output) == judge_types::trim_output(&testcase.expected_output);
            TestcaseResult {
                test_id,
                status: if passed {
                    TestcaseStatus::Passed
                } else {
                    TestcaseStatus::Failed
                },
                output,
                expected: (!passed && testcase.is_public)
                    .then(|| testcase.expected_output.clone()),
                score: if passed { testcase.score } else { 0 },
                execution_time: Some(execution_time),
                exit_code: Some(0),
                error_message: None,
            }
        }
        Err(e) => TestcaseResult {
            test_id,
            status: status_of(&e),
            output: String::new(),
            expected: None,
            score: 0,
            execution_time: None,
            exit_code: exit_code_of(&e),
            error_message: Some(e.to_string()),
        },
    }
}

fn compile_error_result(
    testcases: &[judge_types::Testcase],
    logs: &str,
    exit_code: i32,
) -> EvaluationResult {
    let results = (1..=testcases.len())
        .map(|i| TestcaseResult {
            test_id: TestcaseResult::test_id_for_index(i),
            status: TestcaseStatus::CompileError,
            output: String::new(),
            expected: None,
            score: 0,
            execution_time: None,
            exit_code: Some(exit_code),
            error_message: Some(logs.to_string()),
        })
        .collect();
    EvaluationResult::from_results(results)
}

fn status_of(err: &JudgeError) -> TestcaseStatus {
    match err {
        JudgeError::TimeLimitExceeded => TestcaseStatus::Tle,
        JudgeError::MemoryLimitExceeded => TestcaseStatus::Mle,
        JudgeError::SegmentationFault(_) => TestcaseStatus::SegmentationFault,
        JudgeError::RuntimeError { .. } => TestcaseStatus::RuntimeError,
        JudgeError::CompileError { .. } => TestcaseStatus::CompileError,
        _ => TestcaseStatus::Error,
    }
}

fn exit_code_of(err: &JudgeError) -> Option<i32> {
    match err {
        JudgeError::CompileError { exit_code, .. } | JudgeError::RuntimeError { exit_code, .. } => {
            Some(*exit_code)
        }
        JudgeError::TimeLimitExceeded => Some(124),
        JudgeError::MemoryLimitExceeded => Some(137),
        JudgeError::SegmentationFault(_) => Some(139),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use judge_types::{ProcessorId, Testcase};
    use sandbox_executor::{ContainerEngine, ContainerOutcome, ContainerSpec};
    use std::sync::Arc;

    /// Mirrors `sandbox-executor`'s scripted test engine: a fake that
    /// writes a fixed output for every run, so `evaluate_task` can be
    /// exercised without a real container runtime.
    struct FixedOutputEngine {
        output: String,
    }

    #[async_trait]
    impl ContainerEngine for FixedOutputEngine {
        async fn run(&self, spec: ContainerSpec) -> Result<ContainerOutcome, JudgeError> {
            tokio::fs::write(spec.work_dir.join("output.txt"), &self.output)
                .await
                .unwrap();
            tokio::fs::write(spec.work_dir.join("time.txt"), "0.01")
                .await
                .unwrap();
            Ok(ContainerOutcome {
                exit_code: 0,
                logs: String::new(),
            })
        }
    }

    #[tokio::test]
    async fn execute_task_reports_success_with_sandbox_output() {
        let base = tempfile::tempdir().unwrap();
        let engine = Arc::new(FixedOutputEngine {
            output: "hello\n".to_string(),
        });
        let executor = Executor::new(engine);
        let req = ExecuteRequest {
            processor_id: ProcessorId::from("python3"),
            code: "print('hello')".to_string(),
            stdin: None,
        };
        let outcome = execute_task(&executor, base.path(), &req).await;
        match outcome {
            ExecuteOutcome::Success { output, .. } => assert_eq!(output, "hello\n"),
            other => panic!("expected Success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn execute_task_reports_unsupported_processor_as_error() {
        let base = tempfile::tempdir().unwrap();
        let engine = Arc::new(FixedOutputEngine {
            output: String::new(),
        });
        let executor = Executor::new(engine);
        let req = ExecuteRequest {
            processor_id: ProcessorId::from("cobol-85"),
            code: String::new(),
            stdin: None,
        };
        let outcome = execute_task(&executor, base.path(), &req).await;
        assert!(matches!(outcome, ExecuteOutcome::Error { .. }));
    }

    #[tokio::test]
    async fn evaluate_task_scores_each_testcase_independently() {
        let base = tempfile::tempdir().unwrap();
        let engine = Arc::new(FixedOutputEngine {
            output: "42".to_string(),
        });
        let executor = Executor::new(engine);
        let req = EvaluateRequest {
            processor_id: ProcessorId::from("python3"),
            code: "print(42)".to_string(),
            contest_id: "c1".to_string(),
            problem_id: "p1".to_string(),
            user_id: "u1".to_string(),
            testcases: vec![
                Testcase::new("t1", "", "42", 5, true),
                Testcase::new("t2", "", "43", 5, false),
            ],
        };
        let outcome = evaluate_task(&executor, base.path(), &req).await;
        match outcome {
            EvaluateOutcome::Scored(result) => {
                assert_eq!(result.summary.passed, 1);
                assert_eq!(result.summary.failed, 1);
                assert_eq!(result.summary.total_score, 5);
                assert_eq!(result.results[1].expected, None);
            }
            other => panic!("expected Scored, got {other:?}"),
        }
    }
}
