//! Typed failure taxonomy for the build pipeline and the query service.
//!
//! Application plumbing uses `anyhow` throughout; these variants exist so
//! callers can distinguish failure classes (a dataset that would not parse
//! vs. a model that would not load) instead of string-matching messages.

use crate::dataset::Source;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    /// Network/HTTP failure fetching a raw dataset. Fatal to the build.
    #[error("fetch failed: {url} ({status})")]
    Fetch { url: String, status: String },

    /// Neither strict JSON nor line-wise JSON parsing succeeded. Fatal,
    /// names the dataset so the diagnostic identifies the stage.
    #[error("could not parse {dataset} as JSON or NDJSON")]
    Parse { dataset: Source },

    /// An embedding inference result had a shape the output normalizer does
    /// not recognize. Fatal during a build; surfaced to the caller as the
    /// embed failure at query time.
    #[error("unexpected embedding output shape: buffer len {len}, dims {dims:?}")]
    UnexpectedOutputShape { len: usize, dims: Option<Vec<i64>> },

    /// Model load failed after exhausting the quantization fallback. Carries
    /// the original (full-precision) load error.
    #[error("embedding model load failed: {0:#}")]
    ModelLoad(anyhow::Error),
}
