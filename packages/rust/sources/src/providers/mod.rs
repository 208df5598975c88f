//! The six built-in data-source providers and the registry that builds them.
//!
//! Each provider answers from a JSON dataset: the embedded default, or
//! `<data_dir>/<source>.json` when a data directory is configured.

mod clinical_trials;
mod exim;
mod internal_knowledge;
mod iqvia;
mod patent;
mod web_intelligence;

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use mednexa_shared::{DataSource, MednexaError, Result, SourceId};

use crate::dataset::{Dataset, DatasetSource, SourceRecord};

pub use clinical_trials::{ClinicalTrialsSource, PhaseCounts, TrialsRecord};
pub use exim::{EximRecord, EximSource, Shipment};
pub use internal_knowledge::{InternalKnowledgeSource, InternalRecord};
pub use iqvia::{IqviaRecord, IqviaSource, PrescriptionPoint};
pub use patent::{ExpiringPatent, PatentRecord, PatentSource};
pub use web_intelligence::{WebIntelligenceSource, WebRecord};

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// One provider per [`SourceId`], in canonical order.
pub struct SourceRegistry {
    sources: Vec<Arc<dyn DataSource>>,
}

impl SourceRegistry {
    /// Providers backed by the embedded datasets.
    pub fn builtin() -> Result<Self> {
        Self::build(|_, builtin| Ok(builtin.to_string()))
    }

    /// Providers backed by `<dir>/<source>.json`.
    ///
    /// A missing file falls back to the embedded dataset; an unreadable or
    /// malformed file is an error.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        Self::build(|source, builtin| {
            let path = dir.join(format!("{}.json", source.as_str()));
            if !path.exists() {
                warn!(source = %source, path = %path.display(), "dataset file missing, using built-in");
                return Ok(builtin.to_string());
            }
            std::fs::read_to_string(&path).map_err(|e| MednexaError::io(&path, e))
        })
    }

    fn build(read: impl Fn(SourceId, &'static str) -> Result<String>) -> Result<Self> {
        let sources: Vec<Arc<dyn DataSource>> = vec![
            provider::<iqvia::IqviaRecord>(&read, iqvia::BUILTIN)?,
            provider::<exim::EximRecord>(&read, exim::BUILTIN)?,
            provider::<patent::PatentRecord>(&read, patent::BUILTIN)?,
            provider::<clinical_trials::TrialsRecord>(&read, clinical_trials::BUILTIN)?,
            provider::<internal_knowledge::InternalRecord>(&read, internal_knowledge::BUILTIN)?,
            provider::<web_intelligence::WebRecord>(&read, web_intelligence::BUILTIN)?,
        ];

        info!(count = sources.len(), "data sources registered");
        Ok(Self { sources })
    }

    pub fn sources(&self) -> &[Arc<dyn DataSource>] {
        &self.sources
    }

    pub fn get(&self, id: SourceId) -> Option<&Arc<dyn DataSource>> {
        self.sources.iter().find(|source| source.id() == id)
    }

    pub fn into_sources(self) -> Vec<Arc<dyn DataSource>> {
        self.sources
    }
}

fn provider<R: SourceRecord>(
    read: &impl Fn(SourceId, &'static str) -> Result<String>,
    builtin: &'static str,
) -> Result<Arc<dyn DataSource>> {
    let json = read(R::SOURCE, builtin)?;
    let dataset: Dataset<R> = Dataset::from_json(&json)?;
    Ok(Arc::new(DatasetSource::new(dataset)))
}
