//! Merge of source outputs into one [`AggregatedRecord`].

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;

use mednexa_shared::{AggregatedRecord, QueryContext, SourceId, SourceOutput};

/// Pair the query context with every source output that was produced.
///
/// Sources that did not run are absent keys; nothing is defaulted. The result
/// does not depend on the order sources finished in.
pub fn aggregate(
    context: &QueryContext,
    worker_results: &HashMap<SourceId, SourceOutput>,
) -> AggregatedRecord {
    let worker_results: BTreeMap<SourceId, SourceOutput> = worker_results
        .iter()
        .map(|(id, output)| (*id, output.clone()))
        .collect();

    AggregatedRecord {
        query_context: context.clone(),
        worker_results,
        aggregated_at: Utc::now(),
    }
}
