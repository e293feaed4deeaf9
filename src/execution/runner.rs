//! The config runner.
//!
//! Drives one invocation through
//! `Idle -> Resolving -> Checking -> Executing -> Success | AggregatedFailure`.
//! A resolution error ends the run in `Failed` before anything executes.

use crate::core::collaborator::{ConfigBuilder, ValidationEngine};
use crate::core::error::{ResolutionError, RunId, RunnerResult};
use crate::core::request::ExecutionRequest;
use crate::core::settings::RunnerSettings;
use crate::core::shard::ShardIndex;
use crate::execution::aggregate::BatchOutcome;
use crate::execution::executor::BatchExecutor;
use crate::execution::observer::{LogObserver, ObserverSet, RunEvent, RunObserver};
use crate::resolution::{check, ArtifactResolver, ExecutionMode, Misconfiguration, Resolution};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Where the runner is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunnerState {
    /// Nothing has run yet.
    Idle,
    /// Working out which artifacts to run.
    Resolving,
    /// Checking flags against the resolved mode.
    Checking,
    /// Running artifacts.
    Executing,
    /// Every artifact succeeded.
    Success,
    /// The batch finished with at least one failed artifact.
    AggregatedFailure,
    /// Resolution failed; nothing was executed.
    Failed,
}

impl RunnerState {
    /// Whether the run is over.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunnerState::Success | RunnerState::AggregatedFailure | RunnerState::Failed
        )
    }
}

/// Report of one completed batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Identifier of the run.
    pub run_id: RunId,
    /// Mode the request resolved to.
    pub mode: ExecutionMode,
    /// Misconfiguration warnings that were emitted.
    pub warnings: Vec<Misconfiguration>,
    /// Batch result.
    pub outcome: BatchOutcome,
    /// Wall time from resolution to the end of the batch.
    pub duration_ms: u64,
}

/// Resolves, checks, executes and aggregates one request.
pub struct ConfigRunner<B, E> {
    resolver: ArtifactResolver,
    executor: BatchExecutor<B, E>,
    shard: Option<ShardIndex>,
    observers: ObserverSet,
    state: RunnerState,
    last_summary: Option<RunSummary>,
}

impl<B, E> ConfigRunner<B, E>
where
    B: ConfigBuilder,
    E: ValidationEngine<B::Config>,
{
    /// Create a runner with default settings, no shard index and a
    /// [`LogObserver`].
    pub fn new(builder: B, engine: E) -> Self {
        let mut observers = ObserverSet::new();
        observers.push(Arc::new(LogObserver));

        Self {
            resolver: ArtifactResolver::default(),
            executor: BatchExecutor::new(builder, engine),
            shard: None,
            observers,
            state: RunnerState::Idle,
            last_summary: None,
        }
    }

    /// Use resolver settings.
    pub fn with_settings(mut self, settings: &RunnerSettings) -> Result<Self, ResolutionError> {
        self.resolver = ArtifactResolver::new(settings)?;
        Ok(self)
    }

    /// Inject the shard index read from the environment.
    pub fn with_shard_index(mut self, shard: Option<ShardIndex>) -> Self {
        self.shard = shard;
        self
    }

    /// Register an additional observer.
    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Replace all observers, including the default log observer.
    pub fn with_observers(mut self, observers: ObserverSet) -> Self {
        self.observers = observers;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// Summary of the last run that reached execution.
    pub fn last_summary(&self) -> Option<&RunSummary> {
        self.last_summary.as_ref()
    }

    /// The injected shard index.
    pub fn shard_index(&self) -> Option<ShardIndex> {
        self.shard
    }

    /// Resolve `request` without running anything.
    pub fn resolve(&self, request: &ExecutionRequest) -> Result<Resolution, ResolutionError> {
        self.resolver.resolve(request, self.shard)
    }

    /// Run `request` to completion.
    ///
    /// Returns the summary when every artifact succeeded, the aggregated
    /// validation failure when any artifact failed, or a resolution error
    /// when nothing could be run.
    pub fn run(&mut self, request: &ExecutionRequest) -> RunnerResult<RunSummary> {
        let run_id = RunId::new();
        let start = Instant::now();
        self.last_summary = None;

        self.state = RunnerState::Resolving;
        let resolution = match self.resolve(request) {
            Ok(resolution) if resolution.mode == ExecutionMode::Unresolved => {
                self.state = RunnerState::Failed;
                return Err(ResolutionError::NoTarget.into());
            }
            Ok(resolution) => resolution,
            Err(e) => {
                self.state = RunnerState::Failed;
                return Err(e.into());
            }
        };

        self.state = RunnerState::Checking;
        let warnings = check(resolution.mode, request);
        for warning in &warnings {
            self.observers.on_event(&RunEvent::Misconfigured(*warning));
        }

        self.state = RunnerState::Executing;
        self.observers.on_event(&RunEvent::Started {
            run_id,
            mode: resolution.mode,
            total: resolution.len(),
        });
        let outcome = self
            .executor
            .run(run_id, request, &resolution.artifacts, &self.observers);

        let duration_ms = start.elapsed().as_millis() as u64;
        self.observers.on_event(&RunEvent::Completed {
            attempted: outcome.attempted(),
            failed: outcome.failures().len(),
            duration_ms,
        });

        let summary = RunSummary {
            run_id,
            mode: resolution.mode,
            warnings,
            outcome: outcome.clone(),
            duration_ms,
        };
        self.last_summary = Some(summary.clone());

        match outcome.into_result() {
            Ok(_) => {
                self.state = RunnerState::Success;
                Ok(summary)
            }
            Err(e) => {
                self.state = RunnerState::AggregatedFailure;
                Err(e.into())
            }
        }
    }
}
