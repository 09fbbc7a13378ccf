//! Text-to-vector embedding pipeline.
//!
//! Provides the [`EmbeddingProvider`] trait and a local implementation using
//! all-MiniLM-L6-v2 (384 dimensions, L2-normalized). The provider is created
//! via [`create_provider`], which prefers the full-precision model and falls
//! back to the quantized variant if it will not load.
//!
//! Build-time corpus vectors and runtime query vectors must live in the same
//! vector space: both paths pass raw inference rows through the one shape
//! normalizer in [`output`].

pub mod local;
pub mod output;

use anyhow::Result;

use crate::config::EmbeddingConfig;
use crate::error::BuildError;

/// Number of dimensions in the embedding vectors (all-MiniLM-L6-v2).
pub const EMBEDDING_DIM: usize = 384;

/// Trait for embedding text into vectors.
///
/// Implementations produce L2-normalized vectors of exactly [`EMBEDDING_DIM`] dimensions.
/// All methods are synchronous — callers in async contexts should use
/// `tokio::task::spawn_blocking`.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of text strings. Implementations may override for batched inference.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Return the number of dimensions this provider produces.
    fn dimensions(&self) -> usize {
        EMBEDDING_DIM
    }
}

/// Create an embedding provider from config.
///
/// Tries the full-precision ONNX model first; on load failure retries once
/// with the quantized variant. If both fail, the *original* full-precision
/// error is returned — the fallback is a detail, not the diagnosis.
pub fn create_provider(config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>> {
    match local::LocalEmbeddingProvider::new(config, local::Precision::Fp32) {
        Ok(provider) => Ok(Box::new(provider)),
        Err(primary) => {
            tracing::warn!(
                error = %primary,
                "full-precision model failed to load, retrying with quantized variant"
            );
            match local::LocalEmbeddingProvider::new(config, local::Precision::Quantized) {
                Ok(provider) => Ok(Box::new(provider)),
                Err(fallback) => {
                    tracing::warn!(error = %fallback, "quantized fallback also failed");
                    Err(BuildError::ModelLoad(primary).into())
                }
            }
        }
    }
}

/// True if every component is a finite float.
pub fn is_finite_vec(v: &[f32]) -> bool {
    v.iter().all(|x| x.is_finite())
}

/// L2-normalize a vector. Returns a zero vector if the input norm is zero.
pub fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l2_normalize_unit_vector() {
        let v = vec![3.0, 4.0];
        let normalized = l2_normalize(&v);
        assert!((normalized[0] - 0.6).abs() < 1e-6);
        assert!((normalized[1] - 0.8).abs() < 1e-6);
        let norm: f32 = normalized.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn l2_normalize_zero_vector() {
        let v = vec![0.0, 0.0, 0.0];
        assert_eq!(l2_normalize(&v), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn finite_check() {
        assert!(is_finite_vec(&[0.0, -1.5, 2.0]));
        assert!(!is_finite_vec(&[0.0, f32::NAN]));
        assert!(!is_finite_vec(&[f32::INFINITY]));
    }
}
