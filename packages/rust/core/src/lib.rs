//! Query understanding and orchestration for MedNexa.
//!
//! This crate turns a free-text question into a [`QueryContext`] (entity
//! extraction + keyword routing), fans the context out to the selected data
//! sources, merges their outputs, and drives the narrative generator and the
//! report renderer through the [`Workflow`] engine.
//!
//! [`QueryContext`]: mednexa_shared::QueryContext

pub mod aggregator;
pub mod context;
pub mod extractor;
pub mod router;
pub mod workflow;

pub use workflow::{Step, StepAction, Task, Workflow, WorkflowStage, WorkflowState, default_steps};
