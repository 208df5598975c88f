//! Dataset-backed data-source providers for MedNexa.
//!
//! This crate provides:
//! - [`dataset`]: [`Dataset`] and the [`Lookup`] capability (subject match, else first record)
//! - [`providers`]: one [`DataSource`](mednexa_shared::DataSource) per source
//! - [`SourceRegistry`]: builds all six providers from embedded or on-disk datasets

pub mod dataset;
pub mod providers;

pub use dataset::{Dataset, DatasetSource, Lookup, Named, SourceRecord};
pub use providers::{
    ClinicalTrialsSource, EximSource, InternalKnowledgeSource, IqviaSource, PatentSource,
    SourceRegistry, WebIntelligenceSource,
};
