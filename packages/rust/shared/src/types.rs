//! Core domain types for the MedNexa query pipeline.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder subject used when no drug name can be extracted.
pub const DEFAULT_SUBJECT: &str = "Drug X";

/// Category used when no therapeutic area is mentioned.
pub const DEFAULT_CATEGORY: &str = "oncology";

/// Regions used when no region keyword is mentioned.
pub const DEFAULT_REGIONS: [&str; 2] = ["US", "EU"];

/// Time window used when the query names no year.
pub const DEFAULT_TIME_WINDOW: &str = "2025-2030";

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one workflow invocation (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SourceId
// ---------------------------------------------------------------------------

/// The six data sources a query can be routed to.
///
/// Variant order is the canonical priority order; `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    /// Market intelligence (market size, prescriptions, competitor share).
    Iqvia,
    /// Import/export trade data.
    Exim,
    /// Patent landscape.
    Patent,
    /// Clinical trial pipeline.
    ClinicalTrials,
    /// Internal budget, capacity and forecast.
    InternalKnowledge,
    /// News, sentiment and regulatory chatter.
    WebIntelligence,
}

impl SourceId {
    /// All sources in canonical order.
    pub const ALL: [SourceId; 6] = [
        SourceId::Iqvia,
        SourceId::Exim,
        SourceId::Patent,
        SourceId::ClinicalTrials,
        SourceId::InternalKnowledge,
        SourceId::WebIntelligence,
    ];

    /// Wire tag for this source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iqvia => "iqvia",
            Self::Exim => "exim",
            Self::Patent => "patent",
            Self::ClinicalTrials => "clinical_trials",
            Self::InternalKnowledge => "internal_knowledge",
            Self::WebIntelligence => "web_intelligence",
        }
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SourceId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("unknown source identifier: {s}"))
    }
}

// ---------------------------------------------------------------------------
// Query understanding
// ---------------------------------------------------------------------------

/// Structured entities pulled out of a free-text query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    /// Drug/asset name the query is about.
    pub subject: String,
    /// Therapeutic area.
    pub category: String,
    /// Canonical region codes, de-duplicated, never empty.
    pub regions: Vec<String>,
    /// Analysis window as `YYYY-YYYY`.
    pub time_window: String,
}

impl Default for ExtractedEntities {
    fn default() -> Self {
        Self {
            subject: DEFAULT_SUBJECT.into(),
            category: DEFAULT_CATEGORY.into(),
            regions: DEFAULT_REGIONS.iter().map(|r| (*r).to_string()).collect(),
            time_window: DEFAULT_TIME_WINDOW.into(),
        }
    }
}

/// The immutable request handed to every data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryContext {
    /// The question exactly as the caller asked it.
    pub original_query: String,
    /// Entities extracted from the query.
    pub entities: ExtractedEntities,
    /// Sources relevant to the query, in canonical order.
    pub required_sources: Vec<SourceId>,
}

// ---------------------------------------------------------------------------
// Collaborator outputs
// ---------------------------------------------------------------------------

/// Output of one data-source provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceOutput {
    /// Which source produced this output.
    pub source: SourceId,
    /// Source-specific metrics.
    pub data: serde_json::Map<String, serde_json::Value>,
    /// When the output was produced.
    pub generated_at: DateTime<Utc>,
}

impl SourceOutput {
    /// Stamp `data` as produced by `source` now.
    pub fn new(source: SourceId, data: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            source,
            data,
            generated_at: Utc::now(),
        }
    }
}

/// Query context plus every source output that was actually produced.
///
/// Consumers must treat every source section as optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRecord {
    pub query_context: QueryContext,
    pub worker_results: BTreeMap<SourceId, SourceOutput>,
    pub aggregated_at: DateTime<Utc>,
}

impl AggregatedRecord {
    /// Data section for `source`, if that source ran.
    pub fn section(&self, source: SourceId) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.worker_results.get(&source).map(|output| &output.data)
    }
}

/// Text produced by the narrative generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeOutput {
    pub summary: String,
    /// Model (or fixture) that produced the text.
    pub model: String,
    pub generated_at: DateTime<Utc>,
}

/// What a successful run hands back to the calling layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowOutcome {
    pub summary: String,
    /// Where the rendered report can be found.
    pub artifact_locator: String,
}
