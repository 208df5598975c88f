//! JSON-backed drug datasets and the [`Lookup`] capability over them.

use std::marker::PhantomData;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use mednexa_shared::{
    DataSource, MednexaError, QueryContext, Result, SourceId, SourceOutput,
};

// ---------------------------------------------------------------------------
// Record traits
// ---------------------------------------------------------------------------

/// A dataset record keyed by drug name.
pub trait Named {
    fn name(&self) -> &str;
}

/// A record that knows which source it belongs to and how to present itself.
pub trait SourceRecord: Named + DeserializeOwned + Send + Sync + 'static {
    const SOURCE: SourceId;

    /// The `SourceOutput.data` section for this record.
    fn to_data(&self) -> Map<String, Value>;
}

/// Subject lookup with fall-back-to-first semantics.
pub trait Lookup {
    type Record;

    /// Record whose name matches `subject` case-insensitively, else the first
    /// record, else `None` for an empty dataset.
    fn lookup(&self, subject: &str) -> Option<&Self::Record>;
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(bound = "R: DeserializeOwned")]
struct DatasetFile<R> {
    drugs: Vec<R>,
}

/// An in-memory list of records loaded from `{"drugs": [...]}`.
#[derive(Debug, Clone)]
pub struct Dataset<R> {
    records: Vec<R>,
}

impl<R: SourceRecord> Dataset<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self { records }
    }

    /// Parse a dataset document.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: DatasetFile<R> = serde_json::from_str(json).map_err(|e| {
            MednexaError::source_failure(R::SOURCE, format!("malformed dataset: {e}"))
        })?;
        Ok(Self::new(file.drugs))
    }

    /// Read and parse a dataset file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| MednexaError::io(path, e))?;
        Self::from_json(&json)
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R: Named> Lookup for Dataset<R> {
    type Record = R;

    fn lookup(&self, subject: &str) -> Option<&R> {
        self.records
            .iter()
            .find(|record| record.name().eq_ignore_ascii_case(subject))
            .or_else(|| self.records.first())
    }
}

// ---------------------------------------------------------------------------
// DatasetSource
// ---------------------------------------------------------------------------

/// A [`DataSource`] answering from any [`Lookup`] over its record type.
pub struct DatasetSource<L, R> {
    lookup: L,
    _record: PhantomData<fn() -> R>,
}

impl<L, R> DatasetSource<L, R>
where
    L: Lookup<Record = R>,
    R: SourceRecord,
{
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            _record: PhantomData,
        }
    }
}

impl<L, R> DataSource for DatasetSource<L, R>
where
    L: Lookup<Record = R> + Send + Sync,
    R: SourceRecord,
{
    fn id(&self) -> SourceId {
        R::SOURCE
    }

    fn process(&self, context: &QueryContext) -> Result<SourceOutput> {
        let subject = &context.entities.subject;
        let record = self
            .lookup
            .lookup(subject)
            .ok_or_else(|| MednexaError::source_failure(R::SOURCE, "dataset is empty"))?;

        debug!(
            source = %R::SOURCE,
            subject = %subject,
            matched = %record.name(),
            fallback = !record.name().eq_ignore_ascii_case(subject),
            "dataset lookup"
        );

        Ok(SourceOutput::new(R::SOURCE, record.to_data()))
    }
}

/// Unwrap a `json!` object literal into its map.
pub(crate) fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        name: String,
        score: u32,
    }

    impl Named for Sample {
        fn name(&self) -> &str {
            &self.name
        }
    }

    impl SourceRecord for Sample {
        const SOURCE: SourceId = SourceId::Patent;

        fn to_data(&self) -> Map<String, Value> {
            object(json!({ "score": self.score }))
        }
    }

    fn samples() -> Dataset<Sample> {
        Dataset::from_json(
            r#"{"drugs":[{"name":"Drug X","score":1},{"name":"Imatinib","score":2}]}"#,
        )
        .unwrap()
    }

    fn context_for(subject: &str) -> QueryContext {
        let mut entities = mednexa_shared::ExtractedEntities::default();
        entities.subject = subject.into();
        QueryContext {
            original_query: String::new(),
            entities,
            required_sources: vec![SourceId::Patent],
        }
    }

    #[test]
    fn lookup_matches_case_insensitively() {
        let data = samples();
        assert_eq!(data.lookup("IMATINIB").unwrap().score, 2);
        assert_eq!(data.lookup("imatinib").unwrap().score, 2);
    }

    #[test]
    fn lookup_falls_back_to_first_record() {
        let data = samples();
        assert_eq!(data.lookup("Unknownmab").unwrap().name, "Drug X");
    }

    #[test]
    fn empty_dataset_has_no_record() {
        let data: Dataset<Sample> = Dataset::from_json(r#"{"drugs":[]}"#).unwrap();
        assert!(data.is_empty());
        assert!(data.lookup("Drug X").is_none());
    }

    #[test]
    fn malformed_json_is_a_source_error() {
        let err = Dataset::<Sample>::from_json("{").unwrap_err();
        assert!(matches!(
            err,
            MednexaError::Source {
                source_id: SourceId::Patent,
                ..
            }
        ));
    }

    #[test]
    fn dataset_source_tags_output() {
        let source = DatasetSource::new(samples());
        let output = source.process(&context_for("Imatinib")).unwrap();
        assert_eq!(source.id(), SourceId::Patent);
        assert_eq!(output.source, SourceId::Patent);
        assert_eq!(output.data["score"], json!(2));
    }

    #[test]
    fn dataset_source_fails_on_empty_dataset() {
        let empty: Dataset<Sample> = Dataset::new(Vec::new());
        let source = DatasetSource::new(empty);
        assert!(source.process(&context_for("Drug X")).is_err());
    }

    #[test]
    fn load_reports_missing_file_as_io() {
        let path = std::env::temp_dir()
            .join(format!("mednexa-dataset-{}", uuid::Uuid::now_v7()))
            .join("patent.json");
        let err = Dataset::<Sample>::load(&path).unwrap_err();
        assert!(matches!(err, MednexaError::Io { .. }));
    }
}
