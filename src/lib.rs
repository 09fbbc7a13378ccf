//! Culina — semantic recipe search.
//!
//! Two tightly coupled pieces share one crate:
//!
//! 1. **Offline build pipeline** — ingest heterogeneous recipe corpora,
//!    normalize and dedupe them, infer tags, embed every record in batches,
//!    and write a flat-file vector store (`embeddings.bin`, `recipes.json`,
//!    `dataset_meta.json`).
//! 2. **Runtime query embedding service** — lazily load the same embedding
//!    model once per process (single-flight, with a quantized fallback) and
//!    embed query text into the exact vector space the store was built in.
//!
//! Search is a brute-force cosine scan: every vector is unit-normalized, so
//! similarity is a plain dot product over the full array.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`dataset`] — Source adapters, merge/dedup, and the instructions filter
//! - [`embedding`] — ONNX embedding provider and the shared output normalizer
//! - [`index`] — Batched corpus embedder, store writer/reader, cosine scan
//! - [`query`] — The single-flight runtime embedding service
//! - [`tags`] — Rule-table tag inference
//! - [`text`] — Whitespace normalization and ingredient-line segmentation

pub mod config;
pub mod dataset;
pub mod embedding;
pub mod error;
pub mod index;
pub mod query;
pub mod tags;
pub mod text;
