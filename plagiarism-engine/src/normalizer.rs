//! Code normalization: strips comments/whitespace/identifier naming so
//! superficially-edited copies still land near each other in embedding
//! space. The original pipeline delegated this to an LLM call; that
//! dependency is kept behind a trait seam so tests don't need network.

use async_trait::async_trait;
use judge_types::JudgeError;

/// Rewrites raw source into a canonical form prior to embedding.
#[async_trait]
pub trait CodeNormalizer: Send + Sync {
    async fn normalize(&self, raw_code: &str) -> Result<String, JudgeError>;
}

/// Calls out to an LLM completion endpoint to canonicalize code, falling
/// back to the raw source if the call fails so a flaky normalizer never
/// blocks a plagiarism run.
pub struct LlmNormalizer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl LlmNormalizer {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl CodeNormalizer for LlmNormalizer {
    async fn normalize(&self, raw_code: &str) -> Result<String, JudgeError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "code": raw_code }))
            .send()
            .await;

        let normalized = match response {
            Ok(resp) => resp.json::<NormalizeResponse>().await.ok(),
            Err(e) => {
                tracing::warn!(error = %e, "normalizer call failed, using raw source");
                None
            }
        };

        Ok(normalized
            .map(|r| r.normalized_code)
            .unwrap_or_else(|| raw_code.to_string()))
    }
}

#[derive(serde::Deserialize)]
struct NormalizeResponse {
    normalized_code: String,
}

/// Passes code through unchanged; used by tests exercising the
/// clustering/search stages without depending on real normalization.
pub struct IdentityNormalizer;

#[async_trait]
impl CodeNormalizer for IdentityNormalizer {
    async fn normalize(&self, raw_code: &str) -> Result<String, JudgeError> {
        Ok(raw_code.to_string())
    }
}
