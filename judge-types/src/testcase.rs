//! Testcases: input/expected-output pairs with a score and a public flag.

use serde::{Deserialize, Serialize};

/// A single hidden (or public) testcase for an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testcase {
    pub id: String,
    pub input: String,
    pub expected_output: String,
    /// Non-negative; enforced at construction since a negative score would
    /// break the `total_score` monotonicity invariant.
    pub score: u32,
    #[serde(rename = "isPublic")]
    pub is_public: bool,
}

impl Testcase {
    pub fn new(
        id: impl Into<String>,
        input: impl Into<String>,
        expected_output: impl Into<String>,
        score: u32,
        is_public: bool,
    ) -> Self {
        Self {
            id: id.into(),
            input: input.into(),
            expected_output: expected_output.into(),
            score,
            is_public,
        }
    }
}

/// Right-trims the trailing spaces, CRs, and LFs used when comparing
/// program output to an expected output, per the evaluation procedure.
pub fn trim_output(s: &str) -> &str {
    s.trim_end_matches([' ', '\r', '\n'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_whitespace_variants() {
        assert_eq!(trim_output("6\r\n  \n"), "6");
        assert_eq!(trim_output("6"), "6");
        assert_eq!(trim_output(""), "");
    }

    #[test]
    fn does_not_trim_leading_or_interior_whitespace() {
        assert_eq!(trim_output("  6 7 \n"), "  6 7");
    }
}
