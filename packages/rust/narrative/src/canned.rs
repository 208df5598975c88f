//! Fixed narrative responses keyed on query text.
//!
//! Never constructed by default; tests and demos build one explicitly.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use mednexa_shared::{AggregatedRecord, MednexaError, NarrativeGenerator, NarrativeOutput, Result};

/// Model name reported for canned summaries.
pub const CANNED_MODEL: &str = "canned";

/// Returns the summary of the first rule whose trigger appears in the query.
#[derive(Default)]
pub struct CannedNarrator {
    /// `(lowercased trigger, summary)`, checked in insertion order.
    rules: Vec<(String, String)>,
    fallback: Option<Arc<dyn NarrativeGenerator>>,
}

impl CannedNarrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule. Triggers match case-insensitively as substrings.
    pub fn with_rule(mut self, trigger: impl Into<String>, summary: impl Into<String>) -> Self {
        self.rules.push((trigger.into().to_lowercase(), summary.into()));
        self
    }

    /// Delegate queries no rule matches.
    pub fn with_fallback(mut self, inner: Arc<dyn NarrativeGenerator>) -> Self {
        self.fallback = Some(inner);
        self
    }

    fn matching(&self, query: &str) -> Option<&str> {
        let lower = query.to_lowercase();
        self.rules
            .iter()
            .find(|(trigger, _)| lower.contains(trigger.as_str()))
            .map(|(_, summary)| summary.as_str())
    }
}

#[async_trait]
impl NarrativeGenerator for CannedNarrator {
    async fn summarize(&self, record: &AggregatedRecord) -> Result<NarrativeOutput> {
        let query = &record.query_context.original_query;

        if let Some(summary) = self.matching(query) {
            debug!(query = %query, "canned summary matched");
            return Ok(NarrativeOutput {
                summary: summary.to_string(),
                model: CANNED_MODEL.into(),
                generated_at: Utc::now(),
            });
        }

        match &self.fallback {
            Some(inner) => inner.summarize(record).await,
            None => Err(MednexaError::Narrative(format!(
                "no canned summary for query: {query}"
            ))),
        }
    }
}
