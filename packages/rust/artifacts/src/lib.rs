//! Report rendering for MedNexa.
//!
//! This crate provides:
//! - [`format`]: currency, percentage and thousands formatting
//! - [`report`]: Markdown body built from a summary and an aggregated record
//! - [`MarkdownRenderer`]: writes uniquely named reports atomically and confirms them on disk

pub mod format;
pub mod renderer;
pub mod report;

pub use format::{format_currency, format_percentage, format_thousands};
pub use renderer::{ArtifactMeta, MarkdownRenderer};
pub use report::build_report;
