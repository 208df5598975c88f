//! Shared types, collaborator interfaces, error model, and configuration for MedNexa.
//!
//! This crate is the foundation depended on by all other MedNexa crates.
//! It provides:
//! - [`MednexaError`]: the unified error type
//! - Domain types ([`QueryContext`], [`SourceOutput`], [`AggregatedRecord`], [`SourceId`])
//! - Collaborator traits ([`DataSource`], [`NarrativeGenerator`], [`Renderer`])
//! - Configuration ([`AppConfig`], [`WorkflowConfig`], config loading)

pub mod config;
pub mod error;
pub mod ports;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, GeminiConfig, ReportConfig, SourcesConfig, WorkflowConfig, WorkflowTimeouts,
    config_dir, config_file_in, config_file_path, init_config, init_config_in, load_config,
    load_config_from, load_config_in, resolve_api_key, validate_api_key,
};
pub use error::{MednexaError, Result};
pub use ports::{DataSource, NarrativeGenerator, Renderer};
pub use types::{
    AggregatedRecord, DEFAULT_CATEGORY, DEFAULT_REGIONS, DEFAULT_SUBJECT, DEFAULT_TIME_WINDOW,
    ExtractedEntities, NarrativeOutput, QueryContext, RunId, SourceId, SourceOutput,
    WorkflowOutcome,
};
