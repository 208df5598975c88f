//! Patent landscape.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use mednexa_shared::SourceId;

use crate::dataset::{Dataset, DatasetSource, Named, SourceRecord, object};

pub(crate) const BUILTIN: &str = include_str!("../../data/patent.json");

#[derive(Debug, Clone, Deserialize)]
pub struct ExpiringPatent {
    pub id: String,
    /// ISO date, kept as text.
    pub expiry: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatentRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub active_patents: u32,
    #[serde(default)]
    pub expiring_patents: Vec<ExpiringPatent>,
    #[serde(default)]
    pub competitor_filings: u32,
    #[serde(default)]
    pub exclusivity_years: u32,
}

impl Named for PatentRecord {
    fn name(&self) -> &str {
        &self.name
    }
}

impl SourceRecord for PatentRecord {
    const SOURCE: SourceId = SourceId::Patent;

    fn to_data(&self) -> Map<String, Value> {
        let expiring: Vec<Value> = self
            .expiring_patents
            .iter()
            .map(|p| json!({ "patent_id": p.id, "expiry_date": p.expiry }))
            .collect();

        object(json!({
            "active_patents": self.active_patents,
            "expiring_soon": expiring,
            "competitor_filings": self.competitor_filings,
            "exclusivity_window_years": self.exclusivity_years,
        }))
    }
}

pub type PatentSource = DatasetSource<Dataset<PatentRecord>, PatentRecord>;
