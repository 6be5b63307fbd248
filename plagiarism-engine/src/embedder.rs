//! Turns normalized code into a fixed-length vector, L2-normalized so
//! inner product equals cosine similarity downstream.

use async_trait::async_trait;
use judge_types::JudgeError;

#[async_trait]
pub trait CodeEmbedder: Send + Sync {
    async fn embed(&self, normalized_code: &str) -> Result<Vec<f32>, JudgeError>;
}

/// L2-normalizes a raw vector in place; a zero vector is left as-is
/// since it has no direction to project onto.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

/// Calls an embedding HTTP service and L2-normalizes the result.
pub struct HttpEmbedder {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpEmbedder {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl CodeEmbedder for HttpEmbedder {
    async fn embed(&self, normalized_code: &str) -> Result<Vec<f32>, JudgeError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "input": normalized_code }))
            .send()
            .await
            .map_err(|e| JudgeError::Unknown(format!("embedding request failed: {e}")))?;

        let mut parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| JudgeError::Unknown(format!("malformed embedding response: {e}")))?;

        l2_normalize(&mut parsed.embedding);
        Ok(parsed.embedding)
    }
}

#[derive(serde::Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// Deterministic, dependency-free embedder for tests: hashes overlapping
/// character shingles into a fixed-width bag-of-shingles vector, so
/// near-identical inputs land close together without a real model.
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl CodeEmbedder for HashEmbedder {
    async fn embed(&self, normalized_code: &str) -> Result<Vec<f32>, JudgeError> {
        const SHINGLE_LEN: usize = 4;
        let mut vector = vec![0f32; self.dims];
        let chars: Vec<char> = normalized_code.chars().collect();
        if chars.len() < SHINGLE_LEN {
            vector[0] = 1.0;
            return Ok(vector);
        }
        for window in chars.windows(SHINGLE_LEN) {
            let shingle: String = window.iter().collect();
            let bucket = fnv1a(shingle.as_bytes()) as usize % self.dims;
            vector[bucket] += 1.0;
        }
        l2_normalize(&mut vector);
        Ok(vector)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET_BASIS;
    for &byte in bytes {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
