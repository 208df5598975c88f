//! Error types for MedNexa.
//!
//! Every crate in the workspace reports failures through [`MednexaError`].
//! The workflow engine wraps collaborator failures in [`MednexaError::Stage`]
//! so the caller sees a single error naming the stage that failed.

use std::path::PathBuf;

use crate::types::SourceId;

/// Top-level error type for all MedNexa operations.
#[derive(Debug, thiserror::Error)]
pub enum MednexaError {
    /// Configuration loading or validation error (including missing credentials).
    #[error("config error: {message}")]
    Config { message: String },

    /// A data-source provider could not produce its output.
    #[error("source {source_id} failed: {message}")]
    Source { source_id: SourceId, message: String },

    /// Narrative generator unreachable (connect, DNS, TLS, body read).
    #[error("network error: {0}")]
    Network(String),

    /// Narrative generator rejected the credential.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Narrative generator quota or rate limit exhausted.
    #[error("quota exceeded: {0}")]
    Quota(String),

    /// Malformed or unexpected narrative generator response.
    #[error("narrative error: {0}")]
    Narrative(String),

    /// The rendered artifact could not be produced or confirmed.
    #[error("render error: {message}")]
    Render { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A step ran before the step that produces its input.
    #[error("step `{step}` ran before {missing} was available")]
    OutOfOrder { step: String, missing: &'static str },

    /// A collaborator call exceeded its time budget.
    #[error("{stage} timed out after {after_ms} ms")]
    Timeout { stage: String, after_ms: u64 },

    /// A workflow stage failed; the run was aborted.
    #[error("stage `{stage}` failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: Box<MednexaError>,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, MednexaError>;

impl MednexaError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a render error from any displayable message.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    /// Create a data-source failure for `source_id`.
    pub fn source_failure(source_id: SourceId, msg: impl Into<String>) -> Self {
        Self::Source {
            source_id,
            message: msg.into(),
        }
    }

    /// A step found `missing` unset in the workflow state.
    pub fn out_of_order(step: impl Into<String>, missing: &'static str) -> Self {
        Self::OutOfOrder {
            step: step.into(),
            missing,
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Attribute an error to a workflow stage.
    pub fn stage(stage: impl Into<String>, source: MednexaError) -> Self {
        Self::Stage {
            stage: stage.into(),
            source: Box::new(source),
        }
    }

    /// Name of the failed stage, if this is a stage failure.
    pub fn failed_stage(&self) -> Option<&str> {
        match self {
            Self::Stage { stage, .. } => Some(stage),
            _ => None,
        }
    }
}
