//! CLI `build` command — the full offline corpus-to-vector pipeline.
//!
//! Fetch both datasets concurrently, parse through the per-source adapters,
//! merge + dedupe in source-priority order, drop records without real
//! instructions, embed in sequential batches, and write the three store
//! artifacts. Any fetch or parse failure aborts the build; the writer only
//! runs once the entire corpus is embedded, so no partial store can be
//! mistaken for a complete one.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

use crate::config::CulinaConfig;
use crate::dataset::{self, openrecipes, wikibooks};
use crate::embedding::{self, EmbeddingProvider};
use crate::index::{builder, store};

pub async fn build(config: &CulinaConfig) -> Result<()> {
    let out_dir = config.resolved_out_dir();

    println!("Downloading datasets...");
    let (open_bytes, wiki_bytes) = tokio::try_join!(
        dataset::fetch_bytes(&config.build.openrecipes_url),
        dataset::fetch_bytes(&config.build.wikibooks_url),
    )
    .context("dataset fetch failed")?;

    let open_records = openrecipes::parse(&open_bytes, config.build.max_openrecipes)
        .context("failed to parse Open Recipes dataset")?;
    let wiki_records = wikibooks::parse(&wiki_bytes, config.build.max_wikibooks)
        .context("failed to parse Wikibooks dataset")?;
    tracing::info!(
        openrecipes = open_records.len(),
        wikibooks = wiki_records.len(),
        "datasets parsed"
    );

    // merge in source-priority order: first source wins dedupe ties
    let merged = dataset::dedupe(
        open_records
            .into_iter()
            .chain(wiki_records)
            .collect(),
    );
    println!("Merged recipes (before filter): {}", merged.len());

    let records = dataset::retain_with_instructions(merged);
    println!("With instructions: {}", records.len());

    println!("Loading embedding model...");
    let provider: Arc<dyn EmbeddingProvider> =
        Arc::from(embedding::create_provider(&config.embedding)
            .context("failed to create embedding provider")?);

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:40.cyan/blue} {pos}/{len} ({eta})")
            .expect("valid template")
            .progress_chars("##-"),
    );

    let batch_size = config.build.batch_size;
    let pooled_len_ratio = config.embedding.pooled_len_ratio;
    let (records, vectors) = tokio::task::spawn_blocking({
        let pb = pb.clone();
        move || -> anyhow::Result<_> {
            let vectors = builder::build_vectors(
                &records,
                provider.as_ref(),
                batch_size,
                pooled_len_ratio,
                Some(&pb),
            )?;
            Ok((records, vectors))
        }
    })
    .await?
    .context("corpus embedding failed")?;
    pb.finish_and_clear();

    let meta = store::DatasetMeta::new(&config.embedding.model, records.len());
    store::write(&out_dir, &records, &vectors, &meta)
        .context("failed to write vector store")?;

    println!("Build {} complete:", meta.build_id);
    println!("  {} records, dim {}", meta.count, meta.dim);
    println!("  {}", out_dir.join(store::EMBEDDINGS_FILE).display());
    println!("  {}", out_dir.join(store::RECIPES_FILE).display());
    println!("  {}", out_dir.join(store::META_FILE).display());

    Ok(())
}
