//! Whitespace/unicode cleanup and ingredient-line segmentation.
//!
//! Every downstream stage (adapters, dedup keys, embedding documents) goes
//! through these helpers, so they are deliberately total: no inputs fail,
//! empty results are fine.

/// Hard cap on ingredient lines kept per record.
const MAX_INGREDIENT_LINES: usize = 300;

/// Shortest ingredient line worth keeping, after bullet stripping.
const MIN_INGREDIENT_LINE_LEN: usize = 2;

/// Collapse all whitespace runs (including non-breaking space) to single
/// ASCII spaces and trim the edges.
pub fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() || ch == '\u{a0}' {
            in_space = true;
        } else {
            if in_space && !out.is_empty() {
                out.push(' ');
            }
            in_space = false;
            out.push(ch);
        }
    }
    out
}

/// Split an ingredient block into cleaned lines: strip leading bullet
/// markers (`-`, `*`, `•`, one or more), collapse internal whitespace, drop
/// empties and lines of ≤2 characters, cap at 300 entries.
pub fn ingredient_lines(block: &str) -> Vec<String> {
    block
        .lines()
        .map(normalize_ingredient_line)
        .filter(|l| l.chars().count() > MIN_INGREDIENT_LINE_LEN)
        .take(MAX_INGREDIENT_LINES)
        .collect()
}

fn normalize_ingredient_line(line: &str) -> String {
    let stripped = line
        .trim_start()
        .trim_start_matches(['-', '*', '•'])
        .trim_start();
    normalize(stripped)
}

/// Truncate to at most `max` characters, on a char boundary.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
