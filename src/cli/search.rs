//! CLI `search` command — embed a query and scan the store from the terminal.

use anyhow::{Context, Result};

use crate::config::CulinaConfig;
use crate::index::{search, store};
use crate::query::QueryEmbedService;

pub async fn search(config: &CulinaConfig, query: &str, k: usize) -> Result<()> {
    let out_dir = config.resolved_out_dir();
    let store = store::load(&out_dir)
        .with_context(|| format!("failed to load vector store from {}", out_dir.display()))?;

    let service = QueryEmbedService::new(config.embedding.clone());
    let query_vector = service.embed(query).await.context("failed to embed query")?;

    let hits = search::top_k(&query_vector, &store.vectors, store.meta.dim, k);

    if hits.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!("Top {} of {} recipes:\n", hits.len(), store.meta.count);
    for (rank, (label, score)) in hits.iter().enumerate() {
        let record = &store.records[*label];
        println!(
            "  {}. {} (score: {:.4}, source: {})",
            rank + 1,
            record.title,
            score,
            record.source
        );
        if !record.tags.is_empty() {
            println!("     tags: {}", record.tags.join(", "));
        }
        if !record.url.is_empty() {
            println!("     {}", record.url);
        }
        println!();
    }

    Ok(())
}
