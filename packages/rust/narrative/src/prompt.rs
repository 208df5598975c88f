//! Analyst prompt construction.

use mednexa_shared::AggregatedRecord;

const INSTRUCTIONS: &str = "\
You are a pharmaceutical portfolio analyst. Summarize the following data into an executive report.

STRICT RULES:
- Do NOT invent or modify any numbers
- Use ONLY the provided data
- Structure your output with these sections:
  1. Executive Summary (2-3 sentences overview)
  2. Key Findings (bullet points of important insights)
  3. Risks (potential concerns identified from data)
  4. Opportunities (growth potential and strategic advantages)
";

/// Instructions followed by the pretty-printed record.
pub fn build_prompt(record: &AggregatedRecord) -> String {
    let data = serde_json::to_string_pretty(record).unwrap_or_default();
    format!("{INSTRUCTIONS}\nData:\n{data}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use chrono::Utc;
    use mednexa_shared::{ExtractedEntities, QueryContext, SourceId, SourceOutput};

    #[test]
    fn prompt_carries_rules_and_data() {
        let mut data = serde_json::Map::new();
        data.insert("active_patents".into(), serde_json::json!(14));

        let mut worker_results = BTreeMap::new();
        worker_results.insert(SourceId::Patent, SourceOutput::new(SourceId::Patent, data));

        let record = AggregatedRecord {
            query_context: QueryContext {
                original_query: "patent expiry for Drug X".into(),
                entities: ExtractedEntities::default(),
                required_sources: vec![SourceId::Patent],
            },
            worker_results,
            aggregated_at: Utc::now(),
        };

        let prompt = build_prompt(&record);
        assert!(prompt.starts_with("You are a pharmaceutical portfolio analyst."));
        assert!(prompt.contains("Do NOT invent or modify any numbers"));
        assert!(prompt.contains("4. Opportunities"));
        assert!(prompt.contains("\"patent\""));
        assert!(prompt.contains("\"active_patents\": 14"));
        assert!(prompt.contains("patent expiry for Drug X"));
    }
}
