//! HTTP surface for the runtime query embedding service.
//!
//! One message type is in scope: embed a single text and return its vector
//! (or an error description) tagged with the caller's correlation id. Embed
//! failures travel in-band in the response body — the transport only
//! reports transport problems.

use anyhow::Result;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;

use crate::config::CulinaConfig;
use crate::query::{EmbedRequest, EmbedResponse, QueryEmbedService};

/// Start the embedding server and block until ctrl-c.
pub async fn serve(config: CulinaConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(addr = %bind_addr, "starting culina embed server");

    let service = Arc::new(QueryEmbedService::new(config.embedding.clone()));
    let router = router(service);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "embed server listening at http://{bind_addr}/embed");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to listen for ctrl-c");
            tracing::info!("shutting down embed server");
        })
        .await?;

    Ok(())
}

fn router(service: Arc<QueryEmbedService>) -> Router {
    Router::new()
        .route("/embed", post(embed))
        .route("/healthz", get(healthz))
        .with_state(service)
}

async fn embed(
    State(service): State<Arc<QueryEmbedService>>,
    Json(request): Json<EmbedRequest>,
) -> Json<EmbedResponse> {
    Json(service.handle(request).await)
}

async fn healthz() -> &'static str {
    "ok"
}
