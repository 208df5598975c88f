//! Import/export trade data, summed across a drug's shipments.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use mednexa_shared::SourceId;

use crate::dataset::{Dataset, DatasetSource, Named, SourceRecord, object};

pub(crate) const BUILTIN: &str = include_str!("../../data/exim.json");

const TOP_EXPORTERS: [&str; 2] = ["India", "China"];

#[derive(Debug, Clone, Deserialize)]
pub struct Shipment {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub import_kg: u64,
    #[serde(default)]
    pub export_kg: u64,
    #[serde(default)]
    pub tariff_pct: f64,
    #[serde(default = "no_barrier")]
    pub barriers: String,
}

fn no_barrier() -> String {
    "None".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct EximRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub shipments: Vec<Shipment>,
}

impl EximRecord {
    fn mean_tariff(&self) -> f64 {
        if self.shipments.is_empty() {
            return 0.0;
        }
        let total: f64 = self.shipments.iter().map(|s| s.tariff_pct).sum();
        let mean = total / self.shipments.len() as f64;
        (mean * 10_000.0).round() / 10_000.0
    }

    fn barriers(&self) -> Vec<String> {
        let found: Vec<String> = self
            .shipments
            .iter()
            .filter(|s| s.barriers != "None")
            .map(|s| s.barriers.clone())
            .collect();
        if found.is_empty() {
            return vec!["None identified".into()];
        }
        found
    }
}

impl Named for EximRecord {
    fn name(&self) -> &str {
        &self.name
    }
}

impl SourceRecord for EximRecord {
    const SOURCE: SourceId = SourceId::Exim;

    fn to_data(&self) -> Map<String, Value> {
        let imports: u64 = self.shipments.iter().map(|s| s.import_kg).sum();
        let exports: u64 = self.shipments.iter().map(|s| s.export_kg).sum();

        object(json!({
            "import_volume_kg": imports,
            "export_volume_kg": exports,
            "tariff_impact_pct": self.mean_tariff(),
            "trade_barriers": self.barriers(),
            "top_exporters": TOP_EXPORTERS,
        }))
    }
}

pub type EximSource = DatasetSource<Dataset<EximRecord>, EximRecord>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Lookup;

    fn builtin() -> Dataset<EximRecord> {
        Dataset::from_json(BUILTIN).unwrap()
    }

    #[test]
    fn volumes_are_summed_across_regions() {
        let data = builtin();
        let section = data.lookup("Drug X").unwrap().to_data();
        assert_eq!(section["import_volume_kg"], json!(27_700));
        assert_eq!(section["export_volume_kg"], json!(22_900));
    }

    #[test]
    fn tariff_is_mean_rounded_to_four_places() {
        let data = builtin();
        // (0.025 + 0.04 + 0.065) / 3 = 0.04333...
        let section = data.lookup("Drug X").unwrap().to_data();
        assert_eq!(section["tariff_impact_pct"], json!(0.0433));
    }

    #[test]
    fn barriers_skip_none_entries() {
        let data = builtin();
        let section = data.lookup("imatinib").unwrap().to_data();
        assert_eq!(section["trade_barriers"], json!(["Compulsory licensing review"]));

        let section = data.lookup("Trastuzumab").unwrap().to_data();
        assert_eq!(section["trade_barriers"], json!(["None identified"]));
    }

    #[test]
    fn drug_without_shipments_reports_zeroes() {
        let record = EximRecord {
            name: "Newmab".into(),
            shipments: Vec::new(),
        };
        let section = record.to_data();
        assert_eq!(section["import_volume_kg"], json!(0));
        assert_eq!(section["tariff_impact_pct"], json!(0.0));
        assert_eq!(section["top_exporters"], json!(["India", "China"]));
    }

    #[test]
    fn sparse_shipments_sum_as_zero() {
        let data: Dataset<EximRecord> = Dataset::from_json(
            r#"{"drugs":[{"shipments":[{"region":"EU","import_kg":40},{"export_kg":10}]}]}"#,
        )
        .unwrap();
        let record = data.lookup("anything").unwrap();
        assert_eq!(record.name, "");

        let section = record.to_data();
        assert_eq!(section["import_volume_kg"], json!(40));
        assert_eq!(section["export_volume_kg"], json!(10));
        assert_eq!(section["tariff_impact_pct"], json!(0.0));
        assert_eq!(section["trade_barriers"], json!(["None identified"]));
    }
}
