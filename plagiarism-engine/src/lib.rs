//! Plagiarism Engine (C4): normalizes and embeds submissions, searches
//! for near-duplicates across distinct users, and clusters the result
//! into connected components. See [`PlagiarismEngine::check`].

pub mod clustering;
pub mod embedder;
pub mod engine;
pub mod normalizer;
pub mod similarity;

pub use embedder::{CodeEmbedder, HashEmbedder, HttpEmbedder};
pub use engine::{PlagiarismEngine, DEFAULT_SIMILARITY_THRESHOLD};
pub use normalizer::{CodeNormalizer, IdentityNormalizer, LlmNormalizer};
