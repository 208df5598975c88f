//! Internal budget, manufacturing capacity and revenue forecast.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use mednexa_shared::SourceId;

use crate::dataset::{Dataset, DatasetSource, Named, SourceRecord, object};

pub(crate) const BUILTIN: &str = include_str!("../../data/internal_knowledge.json");

fn default_priority() -> String {
    "medium".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct InternalRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rd_budget: u64,
    /// Units per year.
    #[serde(default)]
    pub capacity_units: u64,
    #[serde(default)]
    pub forecast_2025: u64,
    #[serde(default = "default_priority")]
    pub priority: String,
}

impl Named for InternalRecord {
    fn name(&self) -> &str {
        &self.name
    }
}

impl SourceRecord for InternalRecord {
    const SOURCE: SourceId = SourceId::InternalKnowledge;

    fn to_data(&self) -> Map<String, Value> {
        object(json!({
            "rd_budget_usd": self.rd_budget,
            "manufacturing_capacity_units_per_year": self.capacity_units,
            "forecast_revenue_2025_usd": self.forecast_2025,
            "strategic_priority": self.priority,
        }))
    }
}

pub type InternalKnowledgeSource = DatasetSource<Dataset<InternalRecord>, InternalRecord>;
