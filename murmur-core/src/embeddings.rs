//! Pluggable embedding providers for the dense similarity phase.
//!
//! Provides a trait-based abstraction over embedding models, with a local
//! hashed term-frequency provider (always available) and an Ollama HTTP
//! provider. When no provider is available the registry simply carries no
//! trigger index and matching degrades to the lexical phase; that is an
//! expected mode, not an error.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::EmbeddingError;

/// Trait for embedding providers.
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    fn embed(&self, text: &str) -> Vec<f32>;

    /// Generate embeddings for a batch of texts.
    fn embed_batch(&self, texts: &[&str]) -> Vec<Vec<f32>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Dimensionality of the embeddings.
    fn dimensions(&self) -> usize;

    /// Provider name for logging.
    fn provider_name(&self) -> &str;
}

/// Configuration for the embedding backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider name: "local" (default), "ollama", or "none" to disable
    /// the dense phase entirely.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Provider-specific model name.
    #[serde(default)]
    pub model: Option<String>,
    /// Embedding dimensions (0 = provider default).
    #[serde(default)]
    pub dimensions: usize,
    /// Base URL for HTTP providers.
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_provider() -> String {
    "local".into()
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "local".into(),
            model: None,
            dimensions: 0,
            base_url: None,
        }
    }
}

/// Local hashed term-frequency embedder. No external dependencies, fully
/// deterministic.
#[derive(Debug, Clone)]
pub struct HashedEmbedder {
    dimensions: usize,
}

impl HashedEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

fn simple_hash(s: &str) -> usize {
    let mut hash: usize = 5381;
    for b in s.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(b as usize);
    }
    hash
}

impl Embedder for HashedEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            return vector;
        }

        // Term frequency, hashed into a fixed number of buckets.
        let mut tf: HashMap<&str, usize> = HashMap::new();
        for word in &words {
            *tf.entry(word).or_insert(0) += 1;
        }
        for (term, count) in &tf {
            let idx = simple_hash(term) % self.dimensions;
            vector[idx] += *count as f32;
        }

        // L2 normalize.
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        vector
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &str {
        "local"
    }
}

/// Ollama embedder (local Ollama HTTP API, blocking client).
pub struct OllamaEmbedder {
    client: reqwest::blocking::Client,
    model: String,
    dims: usize,
    base_url: String,
}

impl OllamaEmbedder {
    /// Create an Ollama embedder and probe the server once. An unreachable
    /// server is reported as `BackendUnavailable` so the caller can run
    /// without a dense phase instead of failing every transcript.
    pub fn new(model: Option<String>, base_url: Option<String>) -> Result<Self, EmbeddingError> {
        let model = model.unwrap_or_else(|| "nomic-embed-text".into());
        let dims = match model.as_str() {
            "nomic-embed-text" => 768,
            "mxbai-embed-large" => 1024,
            "all-minilm" => 384,
            _ => 768,
        };
        let base_url = base_url.unwrap_or_else(|| "http://localhost:11434".into());

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| EmbeddingError::Request {
                message: e.to_string(),
            })?;

        let probe_url = format!("{}/api/tags", base_url);
        client
            .get(&probe_url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| EmbeddingError::BackendUnavailable {
                provider: "ollama".into(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            model,
            dims,
            base_url,
        })
    }
}

impl Embedder for OllamaEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        let url = format!("{}/api/embed", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "input": text,
        });

        match self.client.post(&url).json(&body).send() {
            Ok(resp) => {
                if let Ok(json) = resp.json::<serde_json::Value>()
                    && let Some(embedding) = json["embeddings"][0].as_array()
                {
                    return embedding
                        .iter()
                        .filter_map(|v| v.as_f64().map(|f| f as f32))
                        .collect();
                }
                vec![0.0; self.dims]
            }
            Err(e) => {
                tracing::warn!("Ollama embedding error: {}, returning zero vector", e);
                vec![0.0; self.dims]
            }
        }
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Cached trigger vectors for one command set. Built once when the set is
/// constructed and immutable afterward.
pub struct TriggerIndex {
    vectors: HashMap<String, Vec<f32>>,
}

impl TriggerIndex {
    /// Embed every trigger phrase in one batch.
    pub fn build(embedder: &dyn Embedder, triggers: &[&str]) -> Self {
        let embeddings = embedder.embed_batch(triggers);
        let vectors = triggers
            .iter()
            .map(|t| t.to_string())
            .zip(embeddings)
            .collect();
        Self { vectors }
    }

    /// Cached vector for a normalized trigger phrase.
    pub fn vector(&self, trigger: &str) -> Option<&[f32]> {
        self.vectors.get(trigger).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl std::fmt::Debug for TriggerIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerIndex")
            .field("triggers", &self.vectors.len())
            .finish()
    }
}

/// Create an embedder from configuration. `None` disables the dense phase;
/// resolution then runs on the lexical phase alone.
pub fn create_embedder(config: &EmbeddingConfig) -> Option<Arc<dyn Embedder>> {
    let dims = if config.dimensions > 0 {
        config.dimensions
    } else {
        128
    };
    match config.provider.as_str() {
        "local" => Some(Arc::new(HashedEmbedder::new(dims))),
        "ollama" => match OllamaEmbedder::new(config.model.clone(), config.base_url.clone()) {
            Ok(embedder) => Some(Arc::new(embedder)),
            Err(e) => {
                tracing::warn!("{}, dense matching disabled", e);
                None
            }
        },
        "none" => None,
        other => {
            tracing::warn!("Unknown embedding provider '{}', dense matching disabled", other);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashed_embedder_dimensions() {
        let embedder = HashedEmbedder::new(128);
        assert_eq!(embedder.dimensions(), 128);
        assert_eq!(embedder.embed("hello world").len(), 128);
    }

    #[test]
    fn test_hashed_embedder_normalized() {
        let embedder = HashedEmbedder::new(128);
        let v = embedder.embed("open the browser");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!(
            (norm - 1.0).abs() < 0.01,
            "expected unit vector, got norm={}",
            norm
        );
    }

    #[test]
    fn test_hashed_embedder_empty_text() {
        let embedder = HashedEmbedder::new(64);
        let v = embedder.embed("");
        assert_eq!(v.len(), 64);
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_hashed_embedder_deterministic() {
        let embedder = HashedEmbedder::new(128);
        assert_eq!(embedder.embed("open chrome"), embedder.embed("open chrome"));
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_mismatched_lengths() {
        let a = vec![1.0, 2.0];
        let b = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_trigger_index_lookup() {
        let embedder = HashedEmbedder::new(64);
        let index = TriggerIndex::build(&embedder, &["open chrome", "take screenshot"]);
        assert_eq!(index.len(), 2);

        let cached = index.vector("open chrome").unwrap();
        assert_eq!(cached, embedder.embed("open chrome").as_slice());
        assert!(index.vector("unknown phrase").is_none());
    }

    #[test]
    fn test_create_embedder_local_default() {
        let embedder = create_embedder(&EmbeddingConfig::default()).unwrap();
        assert_eq!(embedder.provider_name(), "local");
        assert_eq!(embedder.dimensions(), 128);
    }

    #[test]
    fn test_create_embedder_none() {
        let config = EmbeddingConfig {
            provider: "none".into(),
            ..Default::default()
        };
        assert!(create_embedder(&config).is_none());
    }

    #[test]
    fn test_create_embedder_unknown_provider() {
        let config = EmbeddingConfig {
            provider: "word2vec".into(),
            ..Default::default()
        };
        assert!(create_embedder(&config).is_none());
    }

    #[test]
    fn test_create_embedder_custom_dimensions() {
        let config = EmbeddingConfig {
            dimensions: 64,
            ..Default::default()
        };
        let embedder = create_embedder(&config).unwrap();
        assert_eq!(embedder.dimensions(), 64);
    }
}
