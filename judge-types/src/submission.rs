//! Data model for the plagiarism clustering flow (C4): submissions as they
//! move through normalize → embed → search → cluster.

use serde::{Deserialize, Serialize};

/// One user's submission for one problem, accumulating derived state
/// (normalized code, embedding vector) as the pipeline processes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub user_id: String,
    pub username: String,
    pub submission_id: String,
    pub raw_code: String,
    #[serde(default)]
    pub normalized_code: Option<String>,
    #[serde(default)]
    pub vector: Vec<f32>,
}

impl Submission {
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        submission_id: impl Into<String>,
        raw_code: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            submission_id: submission_id.into(),
            raw_code: raw_code.into(),
            normalized_code: None,
            vector: Vec::new(),
        }
    }
}

/// A user's submissions for a single problem, as batched into the
/// plagiarism check request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemSubmissions {
    pub problem_id: String,
    pub problem_name: String,
    pub submissions: Vec<Submission>,
}

/// One user's full set of per-problem submissions, the unit the
/// plagiarism batch request is built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSubmissions {
    pub user_id: String,
    pub username: String,
    pub problems: Vec<ProblemSubmissions>,
}

/// Two submissions by distinct users whose embeddings exceeded the
/// similarity threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspiciousPair {
    pub user_a: String,
    pub username_a: String,
    pub submission_a: String,
    pub raw_code_a: String,
    pub user_b: String,
    pub username_b: String,
    pub submission_b: String,
    pub raw_code_b: String,
    /// Cosine similarity (inner product on L2-normalized vectors), in
    /// `[-1, 1]`.
    pub similarity: f32,
}

/// A member of a copy cluster, stripped of derived/vector state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClusterMember {
    pub submission_id: String,
    pub user_id: String,
    pub username: String,
    pub code: String,
}

/// A connected component of suspicious pairs, containing at least two
/// submissions.
pub type Cluster = Vec<ClusterMember>;

/// The per-problem plagiarism-check result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemCheckResult {
    pub problem_id: String,
    pub problem_name: String,
    #[serde(rename = "checkResult")]
    pub check_result: Vec<Cluster>,
}
