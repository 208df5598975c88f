//! News volume, sentiment, regulatory updates and market rumours.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use mednexa_shared::SourceId;

use crate::dataset::{Dataset, DatasetSource, Named, SourceRecord, object};

pub(crate) const BUILTIN: &str = include_str!("../../data/web_intelligence.json");

#[derive(Debug, Clone, Deserialize)]
pub struct WebRecord {
    #[serde(default)]
    pub name: String,
    /// -1.0 (negative) to 1.0 (positive).
    #[serde(default)]
    pub sentiment: f64,
    #[serde(default)]
    pub news_count: u32,
    #[serde(default)]
    pub regulatory: Vec<String>,
    #[serde(default)]
    pub rumors: Vec<String>,
}

impl Named for WebRecord {
    fn name(&self) -> &str {
        &self.name
    }
}

impl SourceRecord for WebRecord {
    const SOURCE: SourceId = SourceId::WebIntelligence;

    fn to_data(&self) -> Map<String, Value> {
        object(json!({
            "sentiment_score": self.sentiment,
            "news_mentions": self.news_count,
            "regulatory_updates": self.regulatory,
            "market_rumors": self.rumors,
        }))
    }
}

pub type WebIntelligenceSource = DatasetSource<Dataset<WebRecord>, WebRecord>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Lookup;

    #[test]
    fn web_section_fields() {
        let data: Dataset<WebRecord> = Dataset::from_json(BUILTIN).unwrap();
        let section = data.lookup("trastuzumab").unwrap().to_data();

        assert_eq!(section["sentiment_score"], json!(0.35));
        assert_eq!(section["news_mentions"], json!(412));
        assert_eq!(section["market_rumors"], json!([]));
    }

    #[test]
    fn missing_metrics_default_to_zero() {
        let data: Dataset<WebRecord> = Dataset::from_json(r#"{"drugs":[{"name":"Newmab"}]}"#).unwrap();
        let section = data.lookup("Newmab").unwrap().to_data();

        assert_eq!(section["sentiment_score"], json!(0.0));
        assert_eq!(section["news_mentions"], json!(0));
    }
}
