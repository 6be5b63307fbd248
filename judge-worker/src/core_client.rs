//! Side effects an evaluation performs against the platform's core
//! service once scoring completes: updating the leaderboard and
//! persisting the submission record. Kept behind a trait so worker
//! tests never need a live HTTP dependency.

use async_trait::async_trait;
use judge_types::{EvaluationResult, JudgeError};

#[async_trait]
pub trait CoreServiceClient: Send + Sync {
    async fn update_leaderboard(
        &self,
        contest_id: &str,
        user_id: &str,
        problem_id: &str,
        result: &EvaluationResult,
    ) -> Result<(), JudgeError>;

    async fn store_submission(
        &self,
        contest_id: &str,
        user_id: &str,
        problem_id: &str,
        code: &str,
        result: &EvaluationResult,
    ) -> Result<(), JudgeError>;
}

/// Calls the core service's internal HTTP API, authenticated with the
/// shared internal API key rather than a per-user JWT.
pub struct HttpCoreServiceClient {
    client: reqwest::Client,
    base_url: String,
    internal_api_key: String,
}

impl HttpCoreServiceClient {
    pub fn new(base_url: impl Into<String>, internal_api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(5))
                .build()
                .expect("reqwest client builds with default TLS config"),
            base_url: base_url.into(),
            internal_api_key: internal_api_key.into(),
        }
    }
}

#[async_trait]
impl CoreServiceClient for HttpCoreServiceClient {
    async fn update_leaderboard(
        &self,
        contest_id: &str,
        user_id: &str,
        problem_id: &str,
        result: &EvaluationResult,
    ) -> Result<(), JudgeError> {
        self.client
            .post(format!("{}/leaderboard/update", self.base_url))
            .header("X-Internal-Api-Key", &self.internal_api_key)
            .json(&serde_json::json!({
                "contest_id": contest_id,
                "user_id": user_id,
                "problem_id": problem_id,
                "score": result.summary.total_score,
            }))
            .send()
            .await
            .map_err(|e| JudgeError::Unknown(format!("leaderboard update failed: {e}")))?
            .error_for_status()
            .map_err(|e| JudgeError::Unknown(format!("leaderboard update rejected: {e}")))?;
        Ok(())
    }

    async fn store_submission(
        &self,
        contest_id: &str,
        user_id: &str,
        problem_id: &str,
        code: &str,
        result: &EvaluationResult,
    ) -> Result<(), JudgeError> {
        self.client
            .post(format!("{}/submission", self.base_url))
            .header("X-Internal-Api-Key", &self.internal_api_key)
            .json(&serde_json::json!({
                "contest_id": contest_id,
                "user_id": user_id,
                "problem_id": problem_id,
                "code": code,
                "result": result,
            }))
            .send()
            .await
            .map_err(|e| JudgeError::Unknown(format!("submission store failed: {e}")))?
            .error_for_status()
            .map_err(|e| JudgeError::Unknown(format!("submission store rejected: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
pub mod fake {
    use super::*;
    use tokio::sync::Mutex;

    #[derive(Debug, Clone)]
    pub struct RecordedLeaderboardUpdate {
        pub contest_id: String,
        pub user_id: String,
        pub problem_id: String,
        pub score: u32,
    }

    /// Records every call in-memory instead of making an HTTP request,
    /// so worker tests can assert on side effects without a server.
    #[derive(Default)]
    pub struct FakeCoreServiceClient {
        pub leaderboard_updates: Mutex<Vec<RecordedLeaderboardUpdate>>,
        pub stored_submissions: Mutex<u32>,
    }

    #[async_trait]
    impl CoreServiceClient for FakeCoreServiceClient {
        async fn update_leaderboard(
            &self,
            contest_id: &str,
            user_id: &str,
            problem_id: &str,
            result: &EvaluationResult,
        ) -> Result<(), JudgeError> {
            self.leaderboard_updates
                .lock()
                .await
                .push(RecordedLeaderboardUpdate {
                    contest_id: contest_id.to_string(),
                    user_id: user_id.to_string(),
                    problem_id: problem_id.to_string(),
                    score: result.summary.total_score,
                });
            Ok(())
        }

        async fn store_submission(
            &self,
            _contest_id: &str,
            _user_id: &str,
            _problem_id: &str,
            _code: &str,
            _result: &EvaluationResult,
        ) -> Result<(), JudgeError> {
            *self.stored_submissions.lock().await += 1;
            Ok(())
        }
    }
}
