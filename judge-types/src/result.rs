//! Results of running a submission against testcases (spec §3, §8).

use serde::{Deserialize, Serialize};

/// The outcome of a single testcase run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestcaseStatus {
    Passed,
    Failed,
    CompileError,
    RuntimeError,
    Tle,
    Mle,
    SegmentationFault,
    Error,
}

impl TestcaseStatus {
    pub fn is_passed(self) -> bool {
        matches!(self, TestcaseStatus::Passed)
    }
}

/// The per-testcase result carried in an `EvaluationResult`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestcaseResult {
    pub test_id: String,
    pub status: TestcaseStatus,
    pub output: String,
    /// Present only when the testcase was public and the status is
    /// `failed` — a passing public testcase does not need its expected
    /// output echoed back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    pub score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl TestcaseResult {
    /// Formats `test_id` as `test{NN}` with a 1-based 2-digit index,
    /// matching testcase ordering in the request.
    pub fn test_id_for_index(index_one_based: usize) -> String {
        format!("test{index_one_based:02}")
    }
}

/// The aggregate outcome of evaluating a submission against all of a
/// problem's testcases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub results: Vec<TestcaseResult>,
    pub summary: EvaluationSummary,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvaluationSummary {
    pub passed: u32,
    pub failed: u32,
    pub total: u32,
    pub total_score: u32,
}

impl EvaluationResult {
    /// Builds the result from already-scored per-testcase results,
    /// deriving the summary so callers cannot construct an
    /// internally-inconsistent one by hand.
    pub fn from_results(results: Vec<TestcaseResult>) -> Self {
        let total = results.len() as u32;
        let passed = results.iter().filter(|r| r.status.is_passed()).count() as u32;
        let failed = total - passed;
        let total_score = results
            .iter()
            .filter(|r| r.status.is_passed())
            .map(|r| r.score)
            .sum();
        EvaluationResult {
            results,
            summary: EvaluationSummary {
                passed,
                failed,
                total,
                total_score,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status: TestcaseStatus, score: u32) -> TestcaseResult {
        TestcaseResult {
            test_id: "test01".to_string(),
            status,
            output: String::new(),
            expected: None,
            score,
            execution_time: None,
            exit_code: None,
            error_message: None,
        }
    }

    #[test]
    fn passed_plus_failed_equals_total() {
        let eval = EvaluationResult::from_results(vec![
            result(TestcaseStatus::Passed, 2),
            result(TestcaseStatus::Failed, 2),
            result(TestcaseStatus::Tle, 2),
        ]);
        assert_eq!(eval.summary.passed + eval.summary.failed, eval.summary.total);
        assert_eq!(eval.summary.total, 3);
    }

    #[test]
    fn only_passed_testcases_contribute_score() {
        let eval = EvaluationResult::from_results(vec![
            result(TestcaseStatus::Passed, 10),
            result(TestcaseStatus::Failed, 10),
            result(TestcaseStatus::CompileError, 10),
            result(TestcaseStatus::RuntimeError, 10),
        ]);
        assert_eq!(eval.summary.total_score, 10);
    }

    #[test]
    fn failed_testcase_means_total_score_below_sum() {
        let eval = EvaluationResult::from_results(vec![
            result(TestcaseStatus::Passed, 4),
            result(TestcaseStatus::Failed, 4),
        ]);
        let sum_of_scores: u32 = 8;
        assert!(eval.summary.failed >= 1);
        assert!(eval.summary.total_score < sum_of_scores);
    }

    #[test]
    fn test_id_formatting_is_two_digit_one_based() {
        assert_eq!(TestcaseResult::test_id_for_index(1), "test01");
        assert_eq!(TestcaseResult::test_id_for_index(12), "test12");
    }
}
