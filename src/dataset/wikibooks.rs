//! Adapter for the Wikibooks Cookbook dataset.
//!
//! Rows may be nested one level under `recipe_data`. Ingredients and
//! instructions are not stored inline — they are reconstructed from tagged
//! `text_lines` sections, with a fallback to concatenating every line when
//! no instruction-like section exists.

use anyhow::Result;
use regex::Regex;
use std::sync::LazyLock;

use super::{parse_json_or_ndjson, Record, Source};
use crate::text;

static INSTRUCTION_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)procedure|directions|method").expect("valid section pattern"));

/// Parse the raw Wikibooks payload into canonical records, stopping after
/// `max` rows.
pub fn parse(raw: &[u8], max: usize) -> Result<Vec<Record>> {
    let payload = String::from_utf8_lossy(raw);
    let rows = parse_json_or_ndjson(&payload, Source::Wikibooks)?;

    let mut out = Vec::new();
    for row in &rows {
        // the published dataset nests each recipe under `recipe_data`
        let data = if row["recipe_data"].is_object() {
            &row["recipe_data"]
        } else {
            row
        };

        let title = text::normalize(data["title"].as_str().unwrap_or_default());
        let url = data["url"].as_str().unwrap_or_default().to_string();

        let lines: Vec<(&str, &str)> = data["text_lines"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|l| {
                        (
                            l["section"].as_str().unwrap_or_default(),
                            l["text"].as_str().unwrap_or_default(),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();

        let ingredients_raw = joined_lines(&lines, |section| {
            section.to_lowercase().contains("ingredient")
        });
        let instructions_raw = joined_lines(&lines, |section| {
            INSTRUCTION_SECTION.is_match(section)
        });
        let fallback = joined_lines(&lines, |_| true);

        let ingredients = text::normalize(&ingredients_raw);
        let instructions = text::normalize(if instructions_raw.is_empty() {
            &fallback
        } else {
            &instructions_raw
        });

        if title.is_empty() && instructions.is_empty() {
            continue;
        }

        out.push(Record::assemble(
            Source::Wikibooks,
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

fn joined_lines(lines: &[(&str, &str)], keep: impl Fn(&str) -> bool) -> String {
    lines
        .iter()
        .filter(|(section, _)| keep(section))
        .map(|(_, text)| *text)
        .collect::<Vec<_>>()
        .join("\n")
}
