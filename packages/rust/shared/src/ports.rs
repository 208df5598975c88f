//! Collaborator interfaces the workflow engine depends on.
//!
//! Concrete implementations live in `mednexa-sources`, `mednexa-narrative`
//! and `mednexa-artifacts`; tests substitute their own.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{AggregatedRecord, NarrativeOutput, QueryContext, SourceId, SourceOutput};

/// A data-source provider: a pure function from query context to metrics.
pub trait DataSource: Send + Sync {
    /// The identifier this provider answers for.
    fn id(&self) -> SourceId;

    /// Produce this source's contribution for `context`.
    ///
    /// Unknown subjects fall back to the dataset's first record.
    fn process(&self, context: &QueryContext) -> Result<SourceOutput>;
}

/// Turns an aggregated record into narrative text.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn summarize(&self, record: &AggregatedRecord) -> Result<NarrativeOutput>;
}

/// Turns a summary plus the aggregated record into a persisted artifact.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render a new, uniquely named artifact and return its locator.
    ///
    /// Must not return `Ok` until the artifact is observable at the locator.
    async fn render(&self, summary: &str, record: &AggregatedRecord) -> Result<String>;
}
