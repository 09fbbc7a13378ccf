//! Rule-based tag inference.
//!
//! Three fixed, ordered rule tables (diet, cuisine, category) are evaluated
//! against the record's combined text; three heuristics follow. A tag set is
//! built in first-encountered order and capped at [`MAX_TAGS`].

use regex::Regex;
use std::sync::LazyLock;

/// Upper bound on tags per record.
pub const MAX_TAGS: usize = 14;

type RuleTable = Vec<(&'static str, Regex)>;

fn rule(tag: &'static str, pattern: &str) -> (&'static str, Regex) {
    (tag, Regex::new(pattern).expect("valid tag pattern"))
}

static DIET_TAGS: LazyLock<RuleTable> = LazyLock::new(|| {
    vec![
        rule("vegan", r"(?i)\bvegan\b"),
        rule("vegetarian", r"(?i)\bvegetarian\b"),
        rule("gluten-free", r"(?i)\bgluten[- ]free\b|\bglutenfree\b"),
        rule("dairy-free", r"(?i)\bdairy[- ]free\b"),
        rule("nut-free", r"(?i)\bnut[- ]free\b"),
        rule("keto", r"(?i)\bketo\b"),
        rule("paleo", r"(?i)\bpaleo\b"),
        rule("low-sodium", r"(?i)\blow[- ]sodium\b"),
        rule("low-carb", r"(?i)\blow[- ]carb\b"),
    ]
});

static CUISINE_TAGS: LazyLock<RuleTable> = LazyLock::new(|| {
    vec![
        rule(
            "mexican",
            r"(?i)\b(taco|tortilla|enchil|quesad|pozole|tamale|mole|salsa|chilaqu)\b",
        ),
        rule(
            "italian",
            r"(?i)\b(pasta|risotto|pesto|parmig|gnocchi|lasagna|marinara|carbonara)\b",
        ),
        rule(
            "indian",
            r"(?i)\b(curry|masala|tandoori|naan|dal\b|paneer|biryani|garam)\b",
        ),
        rule(
            "japanese",
            r"(?i)\b(ramen|miso|teriyaki|udon|soba|yakitori|onigiri|tempura|sushi)\b",
        ),
        rule("korean", r"(?i)\b(kimchi|gochujang|bibimbap|bulgogi|tteok)\b"),
        rule(
            "thai",
            r"(?i)\b(pad thai|tom yum|coconut milk|green curry|red curry|fish sauce|lemongrass)\b",
        ),
        rule(
            "vietnamese",
            r"(?i)\b(pho\b|banh mi|nuoc mam|rice paper|vermicelli)\b",
        ),
        rule(
            "chinese",
            r"(?i)\b(mapo|szech|sichuan|kung pao|dumpling|wonton|lo mein|chow mein)\b",
        ),
        rule(
            "middle-eastern",
            r"(?i)\b(hummus|tahini|shawarma|falafel|za'atar|tabbouleh)\b",
        ),
        rule(
            "mediterranean",
            r"(?i)\b(olives|feta|tzatziki|oregano|chickpea|couscous)\b",
        ),
    ]
});

static CATEGORY_TAGS: LazyLock<RuleTable> = LazyLock::new(|| {
    vec![
        rule("snack", r"(?i)\b(snack|granola bar|trail mix)\b"),
        rule(
            "breakfast",
            r"(?i)\b(breakfast|pancake|waffle|omelet|oatmeal|granola)\b",
        ),
        rule(
            "dessert",
            r"(?i)\b(dessert|cake|cookie|brownie|pie|ice cream|pudding)\b",
        ),
        rule("soup", r"(?i)\b(soup|stew|broth|chowder)\b"),
        rule("salad", r"(?i)\b(salad)\b"),
    ]
});

static PLANT_PROTEIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(tofu|tempeh|nutritional yeast|lentil|chickpea)\b")
        .expect("valid tag pattern")
});

static QUICK_PREP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(15 min|20 min|30 min|quick|easy)\b").expect("valid tag pattern")
});

static COMMON_PROTEIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(chicken|turkey|beef|fish|salmon|tuna|tofu|lentil|beans|egg|yogurt)\b")
        .expect("valid tag pattern")
});

/// Infer diet/cuisine/category tags from a record's free text.
///
/// Deterministic: rule tables are scanned in fixed order and the result keeps
/// first-encountered order, truncated to [`MAX_TAGS`].
pub fn infer_tags(title: &str, ingredients: &str, instructions: &str) -> Vec<String> {
    let blob = [title, ingredients, instructions]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n");

    let mut tags: Vec<String> = Vec::new();
    let mut add = |tags: &mut Vec<String>, tag: &str| {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    };

    for table in [&*DIET_TAGS, &*CUISINE_TAGS, &*CATEGORY_TAGS] {
        for (tag, re) in table {
            if re.is_match(&blob) {
                add(&mut tags, tag);
            }
        }
    }

    if PLANT_PROTEIN.is_match(ingredients) {
        add(&mut tags, "plant-forward");
    }
    if QUICK_PREP.is_match(&blob) {
        add(&mut tags, "quick");
    }
    if COMMON_PROTEIN.is_match(&blob) {
        add(&mut tags, "high-protein");
    }

    tags.truncate(MAX_TAGS);
    tags
}
