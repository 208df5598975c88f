//! Entity extraction: free-text query → [`ExtractedEntities`].
//!
//! Every field has a fallback, so extraction never fails.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use mednexa_shared::{
    DEFAULT_CATEGORY, DEFAULT_REGIONS, DEFAULT_SUBJECT, DEFAULT_TIME_WINDOW, ExtractedEntities,
};

/// Open end of a window when the query names a single year.
const WINDOW_END_YEAR: u16 = 2030;

/// Subject rules, highest priority first.
static SUBJECT_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Placeholder names: "Drug A", "drug b".
        r"\b(Drug\s*[A-Z])\b",
        // Antibody / kinase-inhibitor suffixes, optionally followed by an
        // uppercase variant letter ("TrastuzumabX").
        r"\b([A-Z][a-z]+(?:mab|nib|lib|tib|zumab|tinib)(?-i:[A-Z])?)\b",
        // Fusion-receptor / antiviral / ACE / ARB suffixes.
        r"\b([A-Z][a-z]+(?:cept|vir|pril|sartan)(?-i:[A-Z])?)\b",
    ]
    .iter()
    .map(|pattern| {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("valid regex")
    })
    .collect()
});

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(20\d{2})\b").expect("valid regex"));

/// Therapeutic areas, checked in order.
const CATEGORIES: &[&str] = &[
    "oncology",
    "cardiology",
    "neurology",
    "immunology",
    "dermatology",
    "gastroenterology",
    "endocrinology",
    "pulmonology",
    "rheumatology",
    "nephrology",
];

/// Lowercase keyword → canonical region code, scanned in order.
const REGION_KEYWORDS: &[(&str, &str)] = &[
    ("us", "US"),
    ("usa", "US"),
    ("united states", "US"),
    ("eu", "EU"),
    ("europe", "EU"),
    ("european", "EU"),
    ("apac", "APAC"),
    ("asia", "APAC"),
    ("pacific", "APAC"),
    ("asia pacific", "APAC"),
    ("global", "Global"),
    ("worldwide", "Global"),
];

/// Extract all entities from a query.
pub fn extract(query: &str) -> ExtractedEntities {
    ExtractedEntities {
        subject: extract_subject(query),
        category: extract_category(query),
        regions: extract_regions(query),
        time_window: extract_time_window(query),
    }
}

/// First subject rule that matches wins; otherwise the placeholder.
pub fn extract_subject(query: &str) -> String {
    SUBJECT_RULES
        .iter()
        .find_map(|rule| rule.captures(query))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_SUBJECT.to_string())
}

pub fn extract_category(query: &str) -> String {
    let lower = query.to_lowercase();
    CATEGORIES
        .iter()
        .find(|area| lower.contains(*area))
        .copied()
        .unwrap_or(DEFAULT_CATEGORY)
        .to_string()
}

/// Canonical codes whose keyword appears anywhere in the query.
///
/// Matching is by substring, so short keywords such as `us` also hit inside
/// longer words.
pub fn extract_regions(query: &str) -> Vec<String> {
    let lower = query.to_lowercase();
    let mut found: Vec<String> = Vec::new();

    for (keyword, code) in REGION_KEYWORDS {
        if lower.contains(keyword) && !found.iter().any(|c| c == code) {
            found.push((*code).to_string());
        }
    }

    if found.is_empty() {
        return DEFAULT_REGIONS.iter().map(|r| (*r).to_string()).collect();
    }
    found
}

/// `min-max` of the 20xx years in the query.
pub fn extract_time_window(query: &str) -> String {
    let years: Vec<u16> = YEAR_RE
        .captures_iter(query)
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
        .collect();

    match years.as_slice() {
        [] => DEFAULT_TIME_WINDOW.to_string(),
        [single] => format!("{single}-{WINDOW_END_YEAR}"),
        many => {
            let min = many.iter().min().copied().unwrap_or_default();
            let max = many.iter().max().copied().unwrap_or_default();
            format!("{min}-{max}")
        }
    }
}
