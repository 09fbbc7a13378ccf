//! Dataset ingestion: per-source adapters, merge, dedup, and the
//! instructions filter that gates records into the final corpus.
//!
//! Each source ships a different raw schema; the adapters in [`openrecipes`]
//! and [`wikibooks`] map them into one canonical [`Record`] shape. Sources
//! are a closed set selected by the [`Source`] enum — no structural sniffing
//! of payload shapes.

pub mod openrecipes;
pub mod wikibooks;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::BuildError;
use crate::text;

/// Dedup identity keys are truncated to this many characters.
const DEDUPE_KEY_MAX: usize = 280;

/// Minimum trimmed instructions length for a record to stay in the corpus.
const MIN_INSTRUCTIONS_LEN: usize = 10;

/// The datasets this pipeline knows how to ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Openrecipes,
    Wikibooks,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Openrecipes => "openrecipes",
            Self::Wikibooks => "wikibooks",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical recipe record, shared by every pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Source-prefixed ordinal, e.g. `openrecipes_42`.
    pub id: String,
    pub source: Source,
    pub title: String,
    pub url: String,
    /// Whitespace-normalized free text of the ingredient block.
    pub ingredients: String,
    /// Cleaned ingredient lines (bullet markers stripped, ≤300 entries).
    pub ingredients_lines: Vec<String>,
    /// Whitespace-normalized preparation text.
    pub instructions: String,
    /// Inferred tags in rule-table order, ≤14 entries.
    pub tags: Vec<String>,
}

impl Record {
    /// Build a record from adapter-extracted fields, filling in the derived
    /// id, tags, and ingredient lines.
    pub fn assemble(
        source: Source,
        ordinal: usize,
        title: String,
        url: String,
        ingredients: String,
        instructions: String,
    ) -> Self {
        let tags = crate::tags::infer_tags(&title, &ingredients, &instructions);
        let ingredients_lines = text::ingredient_lines(&ingredients);
        Self {
            id: format!("{source}_{ordinal}"),
            source,
            title,
            url,
            ingredients,
            ingredients_lines,
            instructions,
            tags,
        }
    }

    /// Identity key used only during deduplication: lowercased title plus the
    /// lowercased first ingredient line, capped at 280 characters.
    pub fn dedupe_key(&self) -> String {
        let first_ingredient = self
            .ingredients_lines
            .first()
            .map(|l| l.to_lowercase())
            .unwrap_or_default();
        let key = format!("{}|{}", self.title.to_lowercase(), first_ingredient);
        text::truncate_chars(&key, DEDUPE_KEY_MAX).to_string()
    }
}

/// Parse a dataset payload as strict JSON first; on failure fall back to
/// line-wise NDJSON, silently skipping unparseable lines. Fails with a
/// [`BuildError::Parse`] naming the dataset if neither form yields rows.
pub fn parse_json_or_ndjson(
    payload: &str,
    dataset: Source,
) -> Result<Vec<serde_json::Value>, BuildError> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(payload) {
        if let serde_json::Value::Array(rows) = value {
            return Ok(rows);
        }
    }

    let rows: Vec<serde_json::Value> = payload
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter_map(|l| serde_json::from_str(l).ok())
        .collect();

    if rows.is_empty() {
        return Err(BuildError::Parse { dataset });
    }
    Ok(rows)
}

/// Merge adapter outputs, keeping the first occurrence of every identity key.
/// Input order is source priority, so earlier sources win ties.
pub fn dedupe(records: Vec<Record>) -> Vec<Record> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|r| seen.insert(r.dedupe_key()))
        .collect()
}

/// Keep only records with non-trivial instructions. This removes the bulk of
/// junk rows — recipes that are just a title and an ingredient list.
pub fn retain_with_instructions(records: Vec<Record>) -> Vec<Record> {
    records
        .into_iter()
        .filter(|r| r.instructions.trim().chars().count() > MIN_INSTRUCTIONS_LEN)
        .collect()
}

/// Fetch a raw dataset over HTTP. Non-2xx responses are a fatal
/// [`BuildError::Fetch`].
pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>> {
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("HTTP request failed for {url}"))?;

    if !response.status().is_success() {
        return Err(BuildError::Fetch {
            url: url.to_string(),
            status: response.status().to_string(),
        }
        .into());
    }

    let bytes = response
        .bytes()
        .await
        .with_context(|| format!("error reading response body from {url}"))?;
    Ok(bytes.to_vec())
}

/// Provenance/license entries for the build metadata, in source-priority order.
pub fn source_manifest() -> Vec<crate::index::store::SourceInfo> {
    vec![
        crate::index::store::SourceInfo {
            name: "Open Recipes / open-recipe-data".into(),
            license: "CC BY 3.0".into(),
            reference: "https://github.com/jakevdp/open-recipe-data".into(),
        },
        crate::index::store::SourceInfo {
            name: "Wikibooks Cookbook".into(),
            license: "CC BY-SA 4.0".into(),
            reference: "https://en.wikibooks.org/wiki/Cookbook:Recipes".into(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(source: Source, ordinal: usize, title: &str, ingredients: &str) -> Record {
        Record::assemble(
            source,
            ordinal,
            title.into(),
            String::new(),
            ingredients.into(),
            "stir everything together and bake".into(),
        )
    }

    #[test]
    fn strict_json_array_parses() {
        let rows = parse_json_or_ndjson(r#"[{"a":1},{"a":2}]"#, Source::Openrecipes).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn ndjson_fallback_skips_bad_lines() {
        let payload = "{\"a\":1}\nnot json\n{\"a\":2}\n";
        let rows = parse_json_or_ndjson(payload, Source::Openrecipes).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn unparseable_payload_names_the_source() {
        let err = parse_json_or_ndjson("garbage\nmore garbage", Source::Wikibooks).unwrap_err();
        assert!(err.to_string().contains("wikibooks"));
    }

    #[test]
    fn top_level_object_falls_through_to_ndjson() {
        // a single JSON object is not a row set; the line-wise pass picks it up
        let rows = parse_json_or_ndjson(r#"{"a":1}"#, Source::Openrecipes).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn dedupe_first_wins() {
        let records = vec![
            record(Source::Openrecipes, 0, "Pancakes", "flour\nmilk"),
            record(Source::Wikibooks, 0, "pancakes", "FLOUR\neggs"),
            record(Source::Wikibooks, 1, "Waffles", "flour\nmilk"),
        ];
        let kept = dedupe(records);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].source, Source::Openrecipes);
        assert_eq!(kept[1].title, "Waffles");
    }

    #[test]
    fn dedupe_is_idempotent() {
        let records = vec![
            record(Source::Openrecipes, 0, "Pancakes", "flour"),
            record(Source::Openrecipes, 1, "Pancakes", "flour"),
            record(Source::Wikibooks, 0, "Soup", "water\nsalt"),
        ];
        let once = dedupe(records);
        let twice = dedupe(once.clone());
        assert_eq!(
            once.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            twice.iter().map(|r| r.id.as_str()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn dedupe_key_is_capped() {
        let long_title = "x".repeat(400);
        let r = record(Source::Openrecipes, 0, &long_title, "salt and pepper");
        assert_eq!(r.dedupe_key().chars().count(), 280);
    }

    #[test]
    fn instructions_filter_drops_trivial_records() {
        let mut keep = record(Source::Openrecipes, 0, "Kept", "flour");
        keep.instructions = "mix well and bake for an hour".into();
        let mut drop_short = record(Source::Openrecipes, 1, "Short", "flour");
        drop_short.instructions = "  mix it  ".into();
        let mut drop_empty = record(Source::Openrecipes, 2, "Empty", "flour");
        drop_empty.instructions = String::new();

        let kept = retain_with_instructions(vec![keep, drop_short, drop_empty]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Kept");
    }

    #[test]
    fn assemble_derives_id_tags_and_lines() {
        let r = Record::assemble(
            Source::Wikibooks,
            7,
            "Vegan tacos".into(),
            "http://example.com".into(),
            "- tortilla\n- beans".into(),
            "warm the tortillas and fill them".into(),
        );
        assert_eq!(r.id, "wikibooks_7");
        assert_eq!(r.ingredients_lines, vec!["tortilla", "beans"]);
        assert!(r.tags.contains(&"vegan".to_string()));
        assert!(r.tags.contains(&"mexican".to_string()));
    }
}
