//! Markdown renderer: writes the report and confirms it is on disk.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use mednexa_shared::{AggregatedRecord, MednexaError, Renderer, Result};

use crate::report::build_report;

const POLL_ATTEMPTS: u32 = 5;
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Metadata for a written report.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ArtifactMeta {
    pub path: PathBuf,
    pub sha256: String,
    pub size_bytes: usize,
}

/// Writes `MedNexa_Report_<timestamp>_<suffix>.md` files into one directory.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    output_dir: PathBuf,
}

impl MarkdownRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write the report and return its metadata once it is observable.
    #[instrument(skip_all, fields(dir = %self.output_dir.display(), sources = record.worker_results.len()))]
    pub async fn write_report(&self, summary: &str, record: &AggregatedRecord) -> Result<ArtifactMeta> {
        let now = Utc::now();
        let body = build_report(summary, record, now);

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| MednexaError::io(&self.output_dir, e))?;

        let filename = report_filename(now);
        let target = self.output_dir.join(&filename);
        let temp = self.output_dir.join(format!(".{filename}.tmp"));

        tokio::fs::write(&temp, &body)
            .await
            .map_err(|e| MednexaError::io(&temp, e))?;
        tokio::fs::rename(&temp, &target)
            .await
            .map_err(|e| MednexaError::io(&target, e))?;

        confirm_written(&target, POLL_ATTEMPTS, POLL_INTERVAL).await?;

        let path = tokio::fs::canonicalize(&target)
            .await
            .map_err(|e| MednexaError::io(&target, e))?;

        let meta = ArtifactMeta {
            path,
            sha256: sha256_hex(&body),
            size_bytes: body.len(),
        };

        info!(
            path = %meta.path.display(),
            sha256 = %meta.sha256,
            size = meta.size_bytes,
            "report written"
        );
        Ok(meta)
    }
}

#[async_trait]
impl Renderer for MarkdownRenderer {
    async fn render(&self, summary: &str, record: &AggregatedRecord) -> Result<String> {
        let meta = self.write_report(summary, record).await?;
        Ok(meta.path.display().to_string())
    }
}

/// Timestamped name with a random tail so two renders in the same second
/// never collide.
fn report_filename(now: DateTime<Utc>) -> String {
    let id = uuid::Uuid::now_v7().simple().to_string();
    let suffix = &id[id.len() - 12..];
    format!("MedNexa_Report_{}_{suffix}.md", now.format("%Y%m%d_%H%M%S"))
}

fn sha256_hex(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Poll until `path` exists with non-empty content.
async fn confirm_written(path: &Path, attempts: u32, interval: Duration) -> Result<()> {
    for attempt in 1..=attempts {
        if matches!(tokio::fs::metadata(path).await, Ok(meta) if meta.len() > 0) {
            return Ok(());
        }
        debug!(attempt, path = %path.display(), "waiting for report file");
        tokio::time::sleep(interval).await;
    }

    Err(MednexaError::render(format!(
        "report not found after {attempts} attempts: {}",
        path.display()
    )))
}
