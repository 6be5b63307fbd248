//! Falls back to the core service's HTTP API when the Redis contest
//! catalog has no cached entry for a problem.

use async_trait::async_trait;
use judge_types::JudgeError;

use crate::contest_client::ContestEntry;

#[async_trait]
pub trait CoreServiceClient: Send + Sync {
    async fn fetch_problem(
        &self,
        contest_id: &str,
        problem_id: &str,
    ) -> Result<ContestEntry, JudgeError>;

    /// Current number of submissions the user has made for this problem,
    /// checked against the problem's `max_submissions` before a new one
    /// is accepted.
    async fn fetch_submission_count(
        &self,
        contest_id: &str,
        user_id: &str,
        problem_id: &str,
    ) -> Result<u32, JudgeError>;
}

pub struct HttpCoreServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCoreServiceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(5))
                .build()
                .expect("reqwest client builds with default TLS config"),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CoreServiceClient for HttpCoreServiceClient {
    async fn fetch_problem(
        &self,
        contest_id: &str,
        problem_id: &str,
    ) -> Result<ContestEntry, JudgeError> {
        let response = self
            .client
            .get(format!(
                "{}/internal/contests/{contest_id}/problems/{problem_id}",
                self.base_url
            ))
            .send()
            .await
            .map_err(|e| JudgeError::Unknown(format!("core service request failed: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(JudgeError::FileNotFound(format!(
                "problem {problem_id} not found in contest {contest_id}"
            )));
        }

        response
            .error_for_status()
            .map_err(|e| JudgeError::Unknown(format!("core service rejected request: {e}")))?
            .json()
            .await
            .map_err(|e| JudgeError::Unknown(format!("malformed core service response: {e}")))
    }

    async fn fetch_submission_count(
        &self,
        contest_id: &str,
        user_id: &str,
        problem_id: &str,
    ) -> Result<u32, JudgeError> {
        #[derive(serde::Deserialize)]
        struct CountResponse {
            count: u32,
        }

        let response: CountResponse = self
            .client
            .get(format!("{}/submission/count", self.base_url))
            .query(&[
                ("userId", user_id),
                ("contestId", contest_id),
                ("problemId", problem_id),
            ])
            .send()
            .await
            .map_err(|e| JudgeError::Unknown(format!("submission count request failed: {e}")))?
            .error_for_status()
            .map_err(|e| JudgeError::Unknown(format!("submission count request rejected: {e}")))?
            .json()
            .await
            .map_err(|e| JudgeError::Unknown(format!("malformed submission count response: {e}")))?;
        Ok(response.count)
    }
}

#[cfg(test)]
pub mod fake {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Default)]
    pub struct FakeCoreServiceClient {
        entries: Mutex<HashMap<(String, String), ContestEntry>>,
        submission_counts: Mutex<HashMap<(String, String, String), u32>>,
    }

    impl FakeCoreServiceClient {
        pub async fn seed(&self, entry: ContestEntry) {
            self.entries
                .lock()
                .await
                .insert((entry.contest_id.clone(), entry.problem_id.clone()), entry);
        }

        pub async fn seed_submission_count(
            &self,
            contest_id: &str,
            user_id: &str,
            problem_id: &str,
            count: u32,
        ) {
            self.submission_counts.lock().await.insert(
                (
                    contest_id.to_string(),
                    user_id.to_string(),
                    problem_id.to_string(),
                ),
                count,
            );
        }
    }

    #[async_trait]
    impl CoreServiceClient for FakeCoreServiceClient {
        async fn fetch_problem(
            &self,
            contest_id: &str,
            problem_id: &str,
        ) -> Result<ContestEntry, JudgeError> {
            self.entries
                .lock()
                .await
                .get(&(contest_id.to_string(), problem_id.to_string()))
                .cloned()
                .ok_or_else(|| {
                    JudgeError::FileNotFound(format!(
                        "problem {problem_id} not found in contest {contest_id}"
                    ))
                })
        }

        async fn fetch_submission_count(
            &self,
            contest_id: &str,
            user_id: &str,
            problem_id: &str,
        ) -> Result<u32, JudgeError> {
            Ok(*self
                .submission_counts
                .lock()
                .await
                .get(&(
                    contest_id.to_string(),
                    user_id.to_string(),
                    problem_id.to_string(),
                ))
                .unwrap_or(&0))
        }
    }
}
