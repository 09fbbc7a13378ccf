//! Runtime query embedding service.
//!
//! Lazily loads the embedding model once per process. The first request
//! triggers the load; concurrent requests attach to the same in-flight
//! attempt instead of starting their own (single-flight, via
//! [`tokio::sync::OnceCell`]). A failed load leaves the cell empty, so a
//! later request is free to retry from scratch — transient failures
//! fetching model files are plausible and must not wedge the process.
//!
//! Query vectors must live in the exact vector space of the offline index:
//! the provider load goes through the same fp32 → quantized fallback as the
//! build, and every embedded row passes through the same output normalizer.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::config::EmbeddingConfig;
use crate::embedding::{self, output, EmbeddingProvider, EMBEDDING_DIM};

type SharedProvider = Arc<dyn EmbeddingProvider>;
type Loader = Arc<dyn Fn() -> Result<SharedProvider> + Send + Sync>;

/// One embedding request: an opaque correlation id plus the text to embed.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedRequest {
    pub id: String,
    pub text: String,
}

/// The response carries the request's id and either a vector or an error
/// description, never both.
#[derive(Debug, Clone, Serialize)]
pub struct EmbedResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Lazily-initialized, single-flight embedding service.
pub struct QueryEmbedService {
    loader: Loader,
    pooled_len_ratio: f32,
    provider: OnceCell<SharedProvider>,
}

impl QueryEmbedService {
    /// Service backed by the local ONNX provider (with quantized fallback).
    pub fn new(config: EmbeddingConfig) -> Self {
        let pooled_len_ratio = config.pooled_len_ratio;
        let loader: Loader =
            Arc::new(move || embedding::create_provider(&config).map(Arc::from));
        Self {
            loader,
            pooled_len_ratio,
            provider: OnceCell::new(),
        }
    }

    /// Service with an injected provider loader. Used by tests and by
    /// embedders that are not the local ONNX one.
    pub fn with_loader(loader: Loader, pooled_len_ratio: f32) -> Self {
        Self {
            loader,
            pooled_len_ratio,
            provider: OnceCell::new(),
        }
    }

    /// Get the shared provider, loading it on first use.
    ///
    /// `OnceCell::get_or_try_init` gives the single-flight behavior: exactly
    /// one load runs at a time and concurrent callers await it. On success
    /// the provider is cached for the process lifetime; on failure the cell
    /// stays empty and the next caller retries.
    async fn provider(&self) -> Result<SharedProvider> {
        self.provider
            .get_or_try_init(|| async {
                let loader = Arc::clone(&self.loader);
                tokio::task::spawn_blocking(move || loader())
                    .await
                    .context("model load task panicked")?
            })
            .await
            .cloned()
    }

    /// Embed one query text into a unit-normalized `DIM`-length vector.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let provider = self.provider().await?;
        let text = text.to_string();
        let raw = tokio::task::spawn_blocking(move || provider.embed(&text))
            .await
            .context("embed task panicked")??;

        let vector = output::normalize_row(&raw, EMBEDDING_DIM, self.pooled_len_ratio)?;
        Ok(vector)
    }

    /// Handle one request/response exchange. Failures are returned in-band,
    /// paired with the request's correlation id; the service itself never
    /// ends up in a partially-loaded state observable by later callers.
    pub async fn handle(&self, request: EmbedRequest) -> EmbedResponse {
        match self.embed(&request.text).await {
            Ok(vector) => EmbedResponse {
                id: request.id,
                vector: Some(vector),
                error: None,
            },
            Err(e) => {
                tracing::warn!(id = %request.id, error = %format!("{e:#}"), "embed request failed");
                EmbedResponse {
                    id: request.id,
                    vector: None,
                    error: Some(format!("{e:#}")),
                }
            }
        }
    }
}
