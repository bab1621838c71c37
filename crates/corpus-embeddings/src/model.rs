//! Embedding type and client trait.

use async_trait::async_trait;

use crate::error::EmbeddingError;

/// A fixed-length float vector produced by the embedding service.
///
/// Values are stored as returned; the vector index works on raw distances,
/// so no normalization happens here.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    /// The embedding vector
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Get the embedding dimension
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Cosine similarity with another embedding, in [-1, 1].
    /// Returns 0.0 for mismatched dimensions or zero-length vectors.
    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        if self.values.len() != other.values.len() {
            return 0.0;
        }
        let dot: f32 = self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a * b)
            .sum();
        let norm_a: f32 = self.values.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = other.values.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot / (norm_a * norm_b)
    }
}

/// Client trait for the external embedding service.
///
/// Implementations must be thread-safe (Send + Sync) for shared use between
/// the pipeline and the agent's session memory.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text. One attempt; the error is final.
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError>;

    /// Embed multiple texts in order. Default implementation calls `embed`
    /// per text and fails on the first error.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension() {
        let emb = Embedding::new(vec![0.1, 0.2, 0.3]);
        assert_eq!(emb.dimension(), 3);
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let a = Embedding::new(vec![2.0, 0.0, 0.0]);
        let b = Embedding::new(vec![5.0, 0.0, 0.0]);
        assert!((a.cosine_similarity(&b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = Embedding::new(vec![1.0, 0.0]);
        let b = Embedding::new(vec![0.0, 3.0]);
        assert!(a.cosine_similarity(&b).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let a = Embedding::new(vec![1.0, 0.0]);
        let b = Embedding::new(vec![-4.0, 0.0]);
        assert!((a.cosine_similarity(&b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_mismatched_dimensions() {
        let a = Embedding::new(vec![1.0, 0.0]);
        let b = Embedding::new(vec![1.0, 0.0, 0.0]);
        assert_eq!(a.cosine_similarity(&b), 0.0);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        let a = Embedding::new(vec![0.0, 0.0]);
        let b = Embedding::new(vec![1.0, 1.0]);
        assert_eq!(a.cosine_similarity(&b), 0.0);
    }

    struct FixedEmbedder;

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
            Ok(Embedding::new(vec![text.len() as f32, 1.0]))
        }
    }

    #[tokio::test]
    async fn test_embed_batch_default_impl() {
        let embedder = FixedEmbedder;
        let texts = vec!["ab".to_string(), "abcd".to_string()];
        let embeddings = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].values[0], 2.0);
        assert_eq!(embeddings[1].values[0], 4.0);
    }
}
