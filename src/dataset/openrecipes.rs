//! Adapter for the Open Recipes dump (gzipped NDJSON, flat rows).

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::io::Read;

use super::{parse_json_or_ndjson, Record, Source};
use crate::text;

/// Parse the raw gzipped Open Recipes payload into canonical records,
/// stopping after `max` rows.
pub fn parse(raw: &[u8], max: usize) -> Result<Vec<Record>> {
    let mut payload = String::new();
    GzDecoder::new(raw)
        .read_to_string(&mut payload)
        .context("failed to decompress Open Recipes payload")?;

    let rows = parse_json_or_ndjson(&payload, Source::Openrecipes)?;

    let mut out = Vec::new();
    for row in &rows {
        let title = text::normalize(row["name"].as_str().unwrap_or_default());

        // ingredients arrive as either a single string or a list of strings
        let ingredients_raw = match &row["ingredients"] {
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            serde_json::Value::String(s) => s.clone(),
            _ => String::new(),
        };
        let ingredients = text::normalize(&ingredients_raw);
        let instructions = text::normalize(row["instructions"].as_str().unwrap_or_default());

        if title.is_empty() && instructions.is_empty() {
            continue;
        }

        let url = row["url"].as_str().unwrap_or_default().to_string();
        out.push(Record::assemble(
            Source::Openrecipes,
            out.len(),
            title,
            url,
            ingredients,
            instructions,
        ));

        if out.len() >= max {
            break;
        }
    }
    Ok(out)
}
