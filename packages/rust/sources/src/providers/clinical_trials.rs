//! Clinical trial pipeline.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use mednexa_shared::SourceId;

use crate::dataset::{Dataset, DatasetSource, Named, SourceRecord, object};

pub(crate) const BUILTIN: &str = include_str!("../../data/clinical_trials.json");

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseCounts {
    #[serde(default)]
    pub phase_1: u32,
    #[serde(default)]
    pub phase_2: u32,
    #[serde(default)]
    pub phase_3: u32,
    #[serde(default)]
    pub phase_4: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrialsRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub total_trials: u32,
    #[serde(default)]
    pub trials: PhaseCounts,
    #[serde(default)]
    pub completion_rate: f64,
    #[serde(default)]
    pub competitive_trials: u32,
}

impl Named for TrialsRecord {
    fn name(&self) -> &str {
        &self.name
    }
}

impl SourceRecord for TrialsRecord {
    const SOURCE: SourceId = SourceId::ClinicalTrials;

    fn to_data(&self) -> Map<String, Value> {
        object(json!({
            "total_trials": self.total_trials,
            "phase_distribution": self.trials,
            "completion_rate": self.completion_rate,
            "competitive_trials": self.competitive_trials,
        }))
    }
}

pub type ClinicalTrialsSource = DatasetSource<Dataset<TrialsRecord>, TrialsRecord>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Lookup;

    #[test]
    fn phase_distribution_has_four_phases() {
        let data: Dataset<TrialsRecord> = Dataset::from_json(BUILTIN).unwrap();
        let section = data.lookup("Remdesivir").unwrap().to_data();

        assert_eq!(section["total_trials"], json!(95));
        assert_eq!(
            section["phase_distribution"],
            json!({ "phase_1": 18, "phase_2": 31, "phase_3": 40, "phase_4": 6 })
        );
    }

    #[test]
    fn missing_phases_default_to_zero() {
        let data: Dataset<TrialsRecord> = Dataset::from_json(
            r#"{"drugs":[{"name":"Newmab","total_trials":1,"completion_rate":0.0,"competitive_trials":0}]}"#,
        )
        .unwrap();
        let section = data.lookup("Newmab").unwrap().to_data();
        assert_eq!(section["phase_distribution"]["phase_3"], json!(0));
    }
}
