//! Narrative generators for MedNexa.
//!
//! This crate provides:
//! - [`GeminiNarrator`]: summarizes an aggregated record via the Gemini `generateContent` API
//! - [`build_prompt`]: the analyst prompt sent to the model
//! - [`CannedNarrator`]: fixed responses keyed on query text, for tests and demos

pub mod canned;
pub mod gemini;
pub mod prompt;

pub use canned::CannedNarrator;
pub use gemini::GeminiNarrator;
pub use prompt::build_prompt;
