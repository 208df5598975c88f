//! Keyword router: free-text query → relevant [`SourceId`]s.

use mednexa_shared::SourceId;

/// Trigger keywords for a source. Matching is substring membership on the
/// lowercased query.
fn keywords(source: SourceId) -> &'static [&'static str] {
    match source {
        SourceId::Iqvia => &[
            "market",
            "sales",
            "revenue",
            "prescription",
            "prescriptions",
            "market size",
            "growth",
        ],
        SourceId::Exim => &[
            "import", "export", "trade", "tariff", "tariffs", "trading", "exim",
        ],
        SourceId::Patent => &[
            "patent",
            "patents",
            "exclusivity",
            "ip",
            "expiration",
            "expiring",
            "intellectual property",
        ],
        SourceId::ClinicalTrials => &[
            "clinical", "trial", "trials", "pipeline", "phase", "phases", "study", "studies",
        ],
        SourceId::InternalKnowledge => &[
            "internal",
            "budget",
            "capacity",
            "forecast",
            "manufacturing",
            "rd",
            "r&d",
        ],
        SourceId::WebIntelligence => &[
            "news",
            "sentiment",
            "regulatory",
            "competitor",
            "competitors",
            "intelligence",
            "rumors",
        ],
    }
}

/// Sources whose keywords appear in `query`, in canonical order.
///
/// A query that matches nothing is ambiguous and routes to every source.
pub fn route(query: &str) -> Vec<SourceId> {
    let lower = query.to_lowercase();

    let selected: Vec<SourceId> = SourceId::ALL
        .into_iter()
        .filter(|source| keywords(*source).iter().any(|kw| lower.contains(kw)))
        .collect();

    if selected.is_empty() {
        return SourceId::ALL.to_vec();
    }
    selected
}
