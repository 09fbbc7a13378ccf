//! Batched corpus embedding.
//!
//! Drives the embedding model over the final record sequence in fixed-size
//! batches — one model call per batch, strictly sequential, batch size chosen
//! to bound peak memory. Every row passes through the shared output
//! normalizer; rows with non-finite values become all-zero sentinel vectors
//! (their dot product with anything is 0, so they never score).

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use tracing::warn;

use crate::dataset::Record;
use crate::embedding::{is_finite_vec, output, EmbeddingProvider, EMBEDDING_DIM};
use crate::text;

/// Instructions are truncated to this many characters in the embedding document.
const MAX_INSTRUCTIONS_CHARS: usize = 1200;

/// Build the text that gets embedded for one record: title, joined tags,
/// ingredients, and truncated instructions, whitespace-normalized.
pub fn embed_doc(record: &Record) -> String {
    let tags = record.tags.join(", ");
    let parts = [
        record.title.as_str(),
        tags.as_str(),
        record.ingredients.as_str(),
        text::truncate_chars(&record.instructions, MAX_INSTRUCTIONS_CHARS),
    ];
    text::normalize(&parts.join("\n"))
}

/// Embed every record and return one contiguous `count * DIM` vector array
/// in label order.
///
/// A model-call failure aborts the whole build — there is no partial-success
/// persistence. A non-finite row is a per-record soft failure: its slot stays
/// all zeros and the build continues.
pub fn build_vectors(
    records: &[Record],
    provider: &dyn EmbeddingProvider,
    batch_size: usize,
    pooled_len_ratio: f32,
    progress: Option<&ProgressBar>,
) -> Result<Vec<f32>> {
    let mut vectors = vec![0.0f32; records.len() * EMBEDDING_DIM];

    for (batch_idx, chunk) in records.chunks(batch_size).enumerate() {
        let docs: Vec<String> = chunk.iter().map(embed_doc).collect();
        let doc_refs: Vec<&str> = docs.iter().map(String::as_str).collect();

        let rows = provider
            .embed_batch(&doc_refs)
            .with_context(|| format!("embedding batch {batch_idx} failed"))?;
        anyhow::ensure!(
            rows.len() == chunk.len(),
            "embedding batch {batch_idx} returned {} rows for {} inputs",
            rows.len(),
            chunk.len()
        );

        for (j, row) in rows.iter().enumerate() {
            let label = batch_idx * batch_size + j;
            let vector = output::normalize_row(row, EMBEDDING_DIM, pooled_len_ratio)?;

            if !is_finite_vec(&vector) {
                // leave the all-zero sentinel in place
                warn!(id = %chunk[j].id, label, "non-finite embedding, storing zero vector");
                continue;
            }
            vectors[label * EMBEDDING_DIM..(label + 1) * EMBEDDING_DIM].copy_from_slice(&vector);
        }

        if let Some(pb) = progress {
            pb.inc(chunk.len() as u64);
        }
    }

    Ok(vectors)
}
