//! Market intelligence: market size, growth, prescriptions, competitor share.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value, json};

use mednexa_shared::SourceId;

use crate::dataset::{Dataset, DatasetSource, Named, SourceRecord, object};

pub(crate) const BUILTIN: &str = include_str!("../../data/iqvia.json");

#[derive(Debug, Clone, Deserialize)]
pub struct PrescriptionPoint {
    pub year: u16,
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IqviaRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub market_size_usd: u64,
    /// Compound annual growth rate as a fraction.
    #[serde(default)]
    pub growth_rate: f64,
    #[serde(default)]
    pub prescriptions: Vec<PrescriptionPoint>,
    #[serde(default)]
    pub competitors: BTreeMap<String, f64>,
}

impl Named for IqviaRecord {
    fn name(&self) -> &str {
        &self.name
    }
}

impl SourceRecord for IqviaRecord {
    const SOURCE: SourceId = SourceId::Iqvia;

    fn to_data(&self) -> Map<String, Value> {
        let trends: Vec<Value> = self
            .prescriptions
            .iter()
            .map(|p| json!({ "year": p.year, "prescriptions": p.count }))
            .collect();

        object(json!({
            "market_size_usd": self.market_size_usd,
            "growth_rate_cagr": self.growth_rate,
            "prescription_trends": trends,
            "competitor_share": self.competitors,
        }))
    }
}

pub type IqviaSource = DatasetSource<Dataset<IqviaRecord>, IqviaRecord>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Lookup;

    #[test]
    fn builtin_dataset_shapes_market_section() {
        let data: Dataset<IqviaRecord> = Dataset::from_json(BUILTIN).unwrap();
        let record = data.lookup("pembrolizumab").unwrap();
        let section = record.to_data();

        assert_eq!(section["market_size_usd"], json!(25_000_000_000u64));
        assert_eq!(section["growth_rate_cagr"], json!(0.124));
        assert_eq!(section["prescription_trends"][0]["prescriptions"], json!(2_100_000));
        assert_eq!(section["competitor_share"]["Nivolumab"], json!(0.34));
    }

    #[test]
    fn first_record_is_the_placeholder_drug() {
        let data: Dataset<IqviaRecord> = Dataset::from_json(BUILTIN).unwrap();
        assert_eq!(data.lookup("TrastuzumabX").unwrap().name, "Drug X");
    }
}
