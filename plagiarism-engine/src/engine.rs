//! Orchestrates the normalize -> embed -> search -> cluster pipeline
//! (C4) over a batch of per-user, per-problem submissions.

use std::collections::HashMap;
use std::sync::Arc;

use judge_types::{ProblemCheckResult, SuspiciousPair, UserSubmissions};

use crate::clustering::cluster_pairs;
use crate::embedder::CodeEmbedder;
use crate::normalizer::CodeNormalizer;
use crate::similarity::top1;
use judge_types::JudgeError;

/// Submissions exceeding this cosine similarity are treated as copies.
/// L2-normalized inner product in `[-1, 1]`; `0.97` is the threshold this
/// pipeline settled on (see design notes on the similarity-module vs
/// check-pipeline-default discrepancy in the original source).
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.97;

pub struct PlagiarismEngine {
    normalizer: Arc<dyn CodeNormalizer>,
    embedder: Arc<dyn CodeEmbedder>,
    threshold: f32,
}

impl PlagiarismEngine {
    pub fn new(normalizer: Arc<dyn CodeNormalizer>, embedder: Arc<dyn CodeEmbedder>) -> Self {
        Self {
            normalizer,
            embedder,
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Runs the full pipeline over a batch of users' submissions, grouped
    /// internally by problem so only same-problem, different-user
    /// submissions are ever compared.
    pub async fn check(
        &self,
        users: &[UserSubmissions],
    ) -> Result<Vec<ProblemCheckResult>, JudgeError> {
        let mut by_problem: HashMap<String, ProblemBucket> = HashMap::new();

        for user in users {
            for problem in &user.problems {
                let bucket = by_problem
                    .entry(problem.problem_id.clone())
                    .or_insert_with(|| ProblemBucket {
                        problem_name: problem.problem_name.clone(),
                        entries: Vec::new(),
                    });
                for submission in &problem.submissions {
                    let normalized = self.normalizer.normalize(&submission.raw_code).await?;
                    let vector = self.embedder.embed(&normalized).await?;
                    bucket.entries.push(Entry {
                        user_id: user.user_id.clone(),
                        username: user.username.clone(),
                        submission_id: submission.submission_id.clone(),
                        raw_code: submission.raw_code.clone(),
                        vector,
                    });
                }
            }
        }

        let mut results = Vec::with_capacity(by_problem.len());
        for (problem_id, bucket) in by_problem {
            let pairs = self.find_suspicious_pairs(&bucket.entries);
            let check_result = cluster_pairs(&pairs, self.threshold);
            results.push(ProblemCheckResult {
                problem_id,
                problem_name: bucket.problem_name,
                check_result,
            });
        }
        results.sort_by(|a, b| a.problem_id.cmp(&b.problem_id));
        Ok(results)
    }

    /// For every ordered pair of distinct users `(A, B)`, builds an index
    /// over B's vectors and queries each of A's vectors for its top-1
    /// match, recording a pair when the match clears the threshold. Each
    /// (A, B) / (B, A) direction is searched independently so a user with
    /// several above-threshold matches across different peers surfaces
    /// all of them, not just the single best one overall; a pair found
    /// from both directions is deduplicated.
    fn find_suspicious_pairs(&self, entries: &[Entry]) -> Vec<SuspiciousPair> {
        let mut by_user: HashMap<&str, Vec<&Entry>> = HashMap::new();
        for entry in entries {
            by_user.entry(entry.user_id.as_str()).or_default().push(entry);
        }
        let mut user_ids: Vec<&str> = by_user.keys().copied().collect();
        user_ids.sort_unstable();

        let mut pairs = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for &user_a in &user_ids {
            for &user_b in &user_ids {
                if user_a == user_b {
                    continue;
                }
                let entries_b = &by_user[user_b];
                let vectors_b: Vec<Vec<f32>> =
                    entries_b.iter().map(|e| e.vector.clone()).collect();

                for entry_a in &by_user[user_a] {
                    let Some((idx, similarity)) = top1(&entry_a.vector, &vectors_b) else {
                        continue;
                    };
                    if similarity < self.threshold {
                        continue;
                    }
                    let entry_b = entries_b[idx];
                    let key = dedup_key(&entry_a.submission_id, &entry_b.submission_id);
                    if !seen.insert(key) {
                        continue;
                    }
                    pairs.push(SuspiciousPair {
                        user_a: entry_a.user_id.clone(),
                        username_a: entry_a.username.clone(),
                        submission_a: entry_a.submission_id.clone(),
                        raw_code_a: entry_a.raw_code.clone(),
                        user_b: entry_b.user_id.clone(),
                        username_b: entry_b.username.clone(),
                        submission_b: entry_b.submission_id.clone(),
                        raw_code_b: entry_b.raw_code.clone(),
                        similarity,
                    });
                }
            }
        }
        pairs
    }
}

fn dedup_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

struct ProblemBucket {
    problem_name: String,
    entries: Vec<Entry>,
}

struct Entry {
    user_id: String,
    username: String,
    submission_id: String,
    raw_code: String,
    vector: Vec<f32>,
}
