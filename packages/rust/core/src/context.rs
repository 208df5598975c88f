//! Query context builder: extractor + router → [`QueryContext`].

use tracing::debug;

use mednexa_shared::QueryContext;

use crate::{extractor, router};

/// Build the immutable request shared by every data source.
pub fn build(query: &str) -> QueryContext {
    let entities = extractor::extract(query);
    let required_sources = router::route(query);

    debug!(
        subject = %entities.subject,
        category = %entities.category,
        regions = ?entities.regions,
        window = %entities.time_window,
        sources = ?required_sources,
        "query context built"
    );

    QueryContext {
        original_query: query.to_string(),
        entities,
        required_sources,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mednexa_shared::SourceId;

    #[test]
    fn build_combines_extraction_and_routing() {
        let ctx = build("Clinical trials for Pembrolizumab in Europe, 2023 to 2026");
        assert_eq!(ctx.original_query, "Clinical trials for Pembrolizumab in Europe, 2023 to 2026");
        assert_eq!(ctx.entities.subject, "Pembrolizumab");
        assert_eq!(ctx.entities.regions, vec!["EU"]);
        assert_eq!(ctx.entities.time_window, "2023-2026");
        assert_eq!(ctx.required_sources, vec![SourceId::ClinicalTrials]);
    }

    #[test]
    fn build_never_fails_on_empty_input() {
        let ctx = build("");
        assert_eq!(ctx.entities.subject, "Drug X");
        assert_eq!(ctx.required_sources.len(), 6);
    }
}
