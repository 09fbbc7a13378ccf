#![allow(dead_code)]

use anyhow::Result;
use culina::dataset::{Record, Source};
use culina::embedding::{EmbeddingProvider, EMBEDDING_DIM};

/// Deterministic provider: each text gets a unit spike at a position derived
/// from its length. Distinct lengths produce orthogonal vectors.
pub struct SpikeProvider;

impl EmbeddingProvider for SpikeProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; EMBEDDING_DIM];
        v[text.len() % EMBEDDING_DIM] = 1.0;
        Ok(v)
    }
}

/// Provider that returns NaN for any text containing "poison".
pub struct PoisonProvider;

impl EmbeddingProvider for PoisonProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; EMBEDDING_DIM];
        if text.contains("poison") {
            v[0] = f32::NAN;
        } else {
            v[text.len() % EMBEDDING_DIM] = 1.0;
        }
        Ok(v)
    }
}

/// Build a minimal canonical record with real-looking instructions.
pub fn test_record(source: Source, ordinal: usize, title: &str, ingredients: &str) -> Record {
    Record::assemble(
        source,
        ordinal,
        title.into(),
        format!("http://example.com/{ordinal}"),
        ingredients.into(),
        format!("prepare {title} carefully and serve warm"),
    )
}
