//! The persisted vector store: three artifacts per build.
//!
//! - `embeddings.bin` — raw little-endian f32 array, `count * dim` values in
//!   label order, no header.
//! - `recipes.json` — one JSON object per label, record fields plus `label`.
//! - `dataset_meta.json` — build id, model, dim, count, search strategy, and
//!   dataset provenance.
//!
//! All three files are produced from the same in-memory label-ordered arrays
//! in one pass, so cross-file consistency is structural rather than checked
//! at runtime. The loader re-checks lengths anyway, since files on disk can
//! be swapped out from under us.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::dataset::{Record, Source};
use crate::embedding::EMBEDDING_DIM;

pub const EMBEDDINGS_FILE: &str = "embeddings.bin";
pub const RECIPES_FILE: &str = "recipes.json";
pub const META_FILE: &str = "dataset_meta.json";

/// Identifier of the only search strategy this store supports.
pub const SEARCH_STRATEGY: &str = "brute-force-cosine";

/// A record as persisted: the canonical fields plus its dense label.
///
/// `label == index` in both `recipes.json` and `embeddings.bin`; it is the
/// sole join key between the two.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    pub label: usize,
    pub id: String,
    pub source: Source,
    pub title: String,
    pub url: String,
    pub tags: Vec<String>,
    pub ingredients: String,
    pub ingredients_lines: Vec<String>,
    pub instructions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    pub name: String,
    pub license: String,
    #[serde(rename = "ref")]
    pub reference: String,
}

/// Build metadata, written once per build and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMeta {
    #[serde(rename = "buildId")]
    pub build_id: String,
    pub model: String,
    pub dim: usize,
    pub count: usize,
    pub search: String,
    pub sources: Vec<SourceInfo>,
}

impl DatasetMeta {
    pub fn new(model: &str, count: usize) -> Self {
        Self {
            build_id: chrono::Utc::now().format("%Y-%m-%d").to_string(),
            model: model.to_string(),
            dim: EMBEDDING_DIM,
            count,
            search: SEARCH_STRATEGY.to_string(),
            sources: crate::dataset::source_manifest(),
        }
    }
}

/// A loaded store: label-aligned records and the flat vector array.
#[derive(Debug)]
pub struct VectorStore {
    pub records: Vec<StoredRecord>,
    pub vectors: Vec<f32>,
    pub meta: DatasetMeta,
}

/// Write the three store artifacts from the same label-ordered arrays.
pub fn write(dir: &Path, records: &[Record], vectors: &[f32], meta: &DatasetMeta) -> Result<()> {
    anyhow::ensure!(
        vectors.len() == records.len() * EMBEDDING_DIM,
        "vector array length {} does not match {} records of dim {}",
        vectors.len(),
        records.len(),
        EMBEDDING_DIM
    );
    anyhow::ensure!(meta.count == records.len(), "metadata count mismatch");

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output dir {}", dir.display()))?;

    let mut blob = Vec::with_capacity(vectors.len() * 4);
    for v in vectors {
        blob.extend_from_slice(&v.to_le_bytes());
    }
    std::fs::write(dir.join(EMBEDDINGS_FILE), blob)
        .context("failed to write embeddings binary")?;

    let stored: Vec<StoredRecord> = records
        .iter()
        .enumerate()
        .map(|(label, r)| StoredRecord {
            label,
            id: r.id.clone(),
            source: r.source,
            title: r.title.clone(),
            url: r.url.clone(),
            tags: r.tags.clone(),
            ingredients: r.ingredients.clone(),
            ingredients_lines: r.ingredients_lines.clone(),
            instructions: r.instructions.clone(),
        })
        .collect();
    let recipes_json = serde_json::to_vec(&stored).context("failed to serialize recipes")?;
    std::fs::write(dir.join(RECIPES_FILE), recipes_json).context("failed to write recipes")?;

    let meta_json =
        serde_json::to_vec_pretty(meta).context("failed to serialize build metadata")?;
    std::fs::write(dir.join(META_FILE), meta_json).context("failed to write build metadata")?;

    Ok(())
}

/// Load a store from disk, cross-checking the three artifacts against each
/// other.
pub fn load(dir: &Path) -> Result<VectorStore> {
    let meta_json = std::fs::read_to_string(dir.join(META_FILE))
        .with_context(|| format!("failed to read {} in {}", META_FILE, dir.display()))?;
    let meta: DatasetMeta =
        serde_json::from_str(&meta_json).context("failed to parse build metadata")?;

    let recipes_json = std::fs::read_to_string(dir.join(RECIPES_FILE))
        .with_context(|| format!("failed to read {} in {}", RECIPES_FILE, dir.display()))?;
    let records: Vec<StoredRecord> =
        serde_json::from_str(&recipes_json).context("failed to parse recipes")?;

    let blob = std::fs::read(dir.join(EMBEDDINGS_FILE))
        .with_context(|| format!("failed to read {} in {}", EMBEDDINGS_FILE, dir.display()))?;
    anyhow::ensure!(
        blob.len() % 4 == 0,
        "embeddings binary length {} is not a whole number of f32s",
        blob.len()
    );
    let vectors: Vec<f32> = blob
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    anyhow::ensure!(
        records.len() == meta.count,
        "recipes count {} does not match metadata count {}",
        records.len(),
        meta.count
    );
    anyhow::ensure!(
        vectors.len() == meta.count * meta.dim,
        "vector array length {} does not match count {} × dim {}",
        vectors.len(),
        meta.count,
        meta.dim
    );
    for (i, r) in records.iter().enumerate() {
        anyhow::ensure!(
            r.label == i,
            "record at index {i} carries label {} — store is corrupt",
            r.label
        );
    }

    Ok(VectorStore {
        records,
        vectors,
        meta,
    })
}
