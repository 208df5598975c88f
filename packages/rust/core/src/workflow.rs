//! Workflow engine: query → context → sources → aggregate → summarize → render.
//!
//! The topology is a fixed, ordered list of [`Step`] descriptors. Each step
//! carries a trigger predicate evaluated against the per-run
//! [`WorkflowState`]; the scheduler walks the list once. Consecutive
//! source-fetch steps form a fan-out group: every triggered source runs as its
//! own task against the shared, immutable [`QueryContext`], and the group is
//! joined before the next step sees `worker_results`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use mednexa_shared::{
    AggregatedRecord, AppConfig, DataSource, MednexaError, NarrativeGenerator, QueryContext,
    Renderer, Result, RunId, SourceId, SourceOutput, WorkflowConfig, WorkflowOutcome, load_config,
    resolve_api_key,
};

use crate::{aggregator, context};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStage {
    Start,
    ContextBuilt,
    SourcesJoined,
    Aggregated,
    Summarized,
    Rendered,
    Done,
    Failed,
}

impl WorkflowStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::ContextBuilt => "context_built",
            Self::SourcesJoined => "sources_joined",
            Self::Aggregated => "aggregated",
            Self::Summarized => "summarized",
            Self::Rendered => "rendered",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

/// The per-invocation record threaded through the steps.
///
/// Each step writes only the fields it owns, and a field is never cleared
/// once written.
#[derive(Debug, Clone)]
pub struct WorkflowState {
    pub run_id: RunId,
    pub query: String,
    /// Written by `build_context`.
    pub context: Option<Arc<QueryContext>>,
    /// Written by `build_context`.
    pub selected_sources: Vec<SourceId>,
    /// One key per source that ran; written after the fan-out join.
    pub worker_results: HashMap<SourceId, SourceOutput>,
    /// Written by `aggregate`.
    pub aggregated: Option<AggregatedRecord>,
    /// Written by `summarize`.
    pub summary: Option<String>,
    /// Written by `render`.
    pub artifact_locator: Option<String>,
    /// Written when any step fails.
    pub error: Option<String>,
    pub stage: WorkflowStage,
}

impl WorkflowState {
    /// Fresh state for one query.
    pub fn new(query: &str) -> Self {
        Self {
            run_id: RunId::new(),
            query: query.to_string(),
            context: None,
            selected_sources: Vec::new(),
            worker_results: HashMap::new(),
            aggregated: None,
            summary: None,
            artifact_locator: None,
            error: None,
            stage: WorkflowStage::Start,
        }
    }

    /// Summary and locator of a completed run.
    pub fn outcome(&self) -> Option<WorkflowOutcome> {
        if self.stage != WorkflowStage::Done {
            return None;
        }
        Some(WorkflowOutcome {
            summary: self.summary.clone()?,
            artifact_locator: self.artifact_locator.clone()?,
        })
    }
}

// ---------------------------------------------------------------------------
// Step descriptors
// ---------------------------------------------------------------------------

/// Work the scheduler performs in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    BuildContext,
    Aggregate,
    Summarize,
    Render,
}

/// What a step does when its trigger holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    Run(Task),
    /// Consecutive fetches are joined as one fan-out.
    FetchSource(SourceId),
}

/// Predicate deciding whether a step runs for the current state.
pub type Trigger = fn(&WorkflowState, StepAction) -> bool;

/// One entry in the pipeline topology.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    /// Stage name reported on failure.
    pub name: &'static str,
    pub action: StepAction,
    pub trigger: Trigger,
}

fn always(_state: &WorkflowState, _action: StepAction) -> bool {
    true
}

fn source_selected(state: &WorkflowState, action: StepAction) -> bool {
    match action {
        StepAction::FetchSource(id) => state.selected_sources.contains(&id),
        _ => false,
    }
}

/// The fixed topology: context, six sources in canonical order, then
/// aggregate, summarize, render.
pub fn default_steps() -> Vec<Step> {
    let mut steps = vec![Step {
        name: "build_context",
        action: StepAction::Run(Task::BuildContext),
        trigger: always,
    }];

    steps.extend(SourceId::ALL.into_iter().map(|id| Step {
        name: id.as_str(),
        action: StepAction::FetchSource(id),
        trigger: source_selected,
    }));

    steps.extend([
        Step {
            name: "aggregate",
            action: StepAction::Run(Task::Aggregate),
            trigger: always,
        },
        Step {
            name: "summarize",
            action: StepAction::Run(Task::Summarize),
            trigger: always,
        },
        Step {
            name: "render",
            action: StepAction::Run(Task::Render),
            trigger: always,
        },
    ]);

    steps
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Runs queries through the fixed step list against injected collaborators.
pub struct Workflow {
    steps: Vec<Step>,
    sources: HashMap<SourceId, Arc<dyn DataSource>>,
    narrator: Arc<dyn NarrativeGenerator>,
    renderer: Arc<dyn Renderer>,
    config: WorkflowConfig,
}

impl Workflow {
    /// Assemble an engine from explicit collaborators.
    ///
    /// A later provider for the same [`SourceId`] replaces an earlier one.
    pub fn new(
        sources: Vec<Arc<dyn DataSource>>,
        narrator: Arc<dyn NarrativeGenerator>,
        renderer: Arc<dyn Renderer>,
        config: WorkflowConfig,
    ) -> Self {
        let sources = sources
            .into_iter()
            .map(|source| (source.id(), source))
            .collect();

        Self {
            steps: default_steps(),
            sources,
            narrator,
            renderer,
            config,
        }
    }

    /// Build the production engine: dataset-backed sources, the Gemini
    /// narrator and the Markdown report renderer.
    ///
    /// Fails before any step can run if the narrator credential is missing.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let api_key = resolve_api_key(config)?;

        let registry = match config.sources.data_dir() {
            Some(dir) => mednexa_sources::SourceRegistry::from_dir(&dir)?,
            None => mednexa_sources::SourceRegistry::builtin()?,
        };
        let narrator = mednexa_narrative::GeminiNarrator::new(&config.gemini, api_key)?;
        let renderer = mednexa_artifacts::MarkdownRenderer::new(&config.report.output_dir);

        Ok(Self::new(
            registry.into_sources(),
            Arc::new(narrator),
            Arc::new(renderer),
            WorkflowConfig::from(config),
        ))
    }

    /// [`Workflow::from_config`] over `~/.mednexa/mednexa.toml`, or defaults
    /// when that file does not exist.
    pub fn from_user_config() -> Result<Self> {
        Self::from_config(&load_config()?)
    }

    /// The step topology, in execution order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Answer `query`, returning the summary and the rendered artifact.
    ///
    /// On failure the error is a [`MednexaError::Stage`] naming the stage.
    pub async fn run(&self, query: &str) -> Result<WorkflowOutcome> {
        let (state, result) = self.execute(query).await;
        result?;
        state
            .outcome()
            .ok_or_else(|| MednexaError::render("run finished without an artifact locator"))
    }

    /// Run every step and hand back the final state alongside the result.
    #[instrument(skip_all, fields(run_id = tracing::field::Empty))]
    pub async fn execute(&self, query: &str) -> (WorkflowState, Result<()>) {
        let mut state = WorkflowState::new(query);
        tracing::Span::current().record("run_id", tracing::field::display(&state.run_id));

        info!(query = %state.query, "workflow started");

        let result = self.drive(&mut state).await;
        match &result {
            Ok(()) => {
                state.stage = WorkflowStage::Done;
                info!(
                    sources = state.worker_results.len(),
                    artifact = state.artifact_locator.as_deref().unwrap_or_default(),
                    "workflow complete"
                );
            }
            Err(e) => {
                state.error = Some(e.to_string());
                state.stage = WorkflowStage::Failed;
                error!(stage = e.failed_stage().unwrap_or("unknown"), error = %e, "workflow failed");
            }
        }

        (state, result)
    }

    /// The scheduler: walk the steps, batching consecutive source fetches.
    async fn drive(&self, state: &mut WorkflowState) -> Result<()> {
        let mut fanout: Option<Vec<SourceId>> = None;

        for step in &self.steps {
            let task = match step.action {
                StepAction::Run(task) => task,
                StepAction::FetchSource(id) => {
                    let batch = fanout.get_or_insert_with(Vec::new);
                    if (step.trigger)(state, step.action) {
                        batch.push(id);
                    } else {
                        debug!(step = step.name, "source not selected, skipping");
                    }
                    continue;
                }
            };

            if let Some(batch) = fanout.take() {
                self.join_sources(state, batch).await?;
            }

            if !(step.trigger)(state, step.action) {
                debug!(step = step.name, "trigger not met, skipping");
                continue;
            }

            self.run_task(state, step.name, task)
                .await
                .map_err(|e| MednexaError::stage(step.name, e))?;
        }

        if let Some(batch) = fanout.take() {
            self.join_sources(state, batch).await?;
        }

        Ok(())
    }

    async fn run_task(&self, state: &mut WorkflowState, step: &str, task: Task) -> Result<()> {
        match task {
            Task::BuildContext => {
                let ctx = context::build(&state.query);
                state.selected_sources = ctx.required_sources.clone();
                info!(
                    subject = %ctx.entities.subject,
                    sources = ?state.selected_sources,
                    "context built"
                );
                state.context = Some(Arc::new(ctx));
                state.stage = WorkflowStage::ContextBuilt;
            }
            Task::Aggregate => {
                let ctx = require_context(state, step)?;
                let record = aggregator::aggregate(&ctx, &state.worker_results);
                info!(sections = record.worker_results.len(), "results aggregated");
                state.aggregated = Some(record);
                state.stage = WorkflowStage::Aggregated;
            }
            Task::Summarize => {
                let record = require_aggregated(state, step)?;
                let output = within(
                    "summarize",
                    self.config.narrative_timeout,
                    self.narrator.summarize(record),
                )
                .await?;
                info!(model = %output.model, chars = output.summary.len(), "summary generated");
                state.summary = Some(output.summary);
                state.stage = WorkflowStage::Summarized;
            }
            Task::Render => {
                let record = require_aggregated(state, step)?;
                let summary = state.summary.as_deref().unwrap_or_default();
                let locator = within(
                    "render",
                    self.config.render_timeout,
                    self.renderer.render(summary, record),
                )
                .await?;
                info!(%locator, "report rendered");
                state.artifact_locator = Some(locator);
                state.stage = WorkflowStage::Rendered;
            }
        }
        Ok(())
    }

    /// Dispatch each selected source as its own task and join them all.
    ///
    /// Outputs land in `worker_results` only after every task has returned;
    /// the first failure aborts the run and nothing from the batch is written.
    async fn join_sources(&self, state: &mut WorkflowState, batch: Vec<SourceId>) -> Result<()> {
        let ctx = require_context(state, "fetch_sources")
            .map_err(|e| MednexaError::stage("fetch_sources", e))?;
        let budget = self.config.source_timeout;
        let deadline = tokio::time::Instant::now() + budget;

        let mut handles = Vec::with_capacity(batch.len());
        for id in batch {
            let provider = self.sources.get(&id).cloned().ok_or_else(|| {
                MednexaError::stage(
                    id.as_str(),
                    MednexaError::source_failure(id, "no provider registered"),
                )
            })?;
            let ctx = Arc::clone(&ctx);
            debug!(source = %id, "dispatching source");
            handles.push((id, tokio::task::spawn_blocking(move || provider.process(&ctx))));
        }

        let mut outputs = Vec::with_capacity(handles.len());
        for (id, handle) in handles {
            let output = match tokio::time::timeout_at(deadline, handle).await {
                Ok(Ok(Ok(output))) => output,
                Ok(Ok(Err(e))) => return Err(MednexaError::stage(id.as_str(), e)),
                Ok(Err(join_err)) => {
                    return Err(MednexaError::stage(
                        id.as_str(),
                        MednexaError::source_failure(id, format!("task failed: {join_err}")),
                    ));
                }
                Err(_) => {
                    return Err(MednexaError::stage(id.as_str(), timeout_error(id.as_str(), budget)));
                }
            };

            if output.source != id {
                warn!(expected = %id, got = %output.source, "provider reported a different source id");
            }
            outputs.push((id, output));
        }

        for (id, output) in outputs {
            state.worker_results.insert(id, output);
        }
        state.stage = WorkflowStage::SourcesJoined;
        info!(joined = state.worker_results.len(), "sources joined");

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn require_context(state: &WorkflowState, step: &str) -> Result<Arc<QueryContext>> {
    state
        .context
        .clone()
        .ok_or_else(|| MednexaError::out_of_order(step, "the query context"))
}

fn require_aggregated<'a>(state: &'a WorkflowState, step: &str) -> Result<&'a AggregatedRecord> {
    state
        .aggregated
        .as_ref()
        .ok_or_else(|| MednexaError::out_of_order(step, "the aggregated record"))
}

/// Bound a collaborator call by `budget`.
async fn within<T>(
    stage: &str,
    budget: Duration,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(budget, call)
        .await
        .map_err(|_| timeout_error(stage, budget))?
}

fn timeout_error(stage: &str, budget: Duration) -> MednexaError {
    MednexaError::Timeout {
        stage: stage.to_string(),
        after_ms: u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
    }
}
