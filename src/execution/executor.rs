//! Sequential batch executor with per-artifact failure isolation.

use crate::core::artifact::ArtifactRef;
use crate::core::collaborator::{ConfigBuilder, ValidationEngine};
use crate::core::context::ExecutionContext;
use crate::core::error::{ArtifactFailure, RunId};
use crate::core::request::ExecutionRequest;
use crate::execution::aggregate::{BatchOutcome, FailureAggregator};
use crate::execution::observer::{RunEvent, RunObserver};
use std::time::Instant;

/// Builds and validates artifacts one at a time.
///
/// A failure in one artifact never stops the batch: every artifact is
/// attempted exactly once, in the order given.
pub struct BatchExecutor<B, E> {
    builder: B,
    engine: E,
}

impl<B, E> BatchExecutor<B, E>
where
    B: ConfigBuilder,
    E: ValidationEngine<B::Config>,
{
    /// Create an executor from its two collaborators.
    pub fn new(builder: B, engine: E) -> Self {
        Self { builder, engine }
    }

    /// The config builder.
    pub fn builder(&self) -> &B {
        &self.builder
    }

    /// The validation engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Run every artifact and fold the results.
    pub fn run(
        &self,
        run_id: RunId,
        request: &ExecutionRequest,
        artifacts: &[ArtifactRef],
        observer: &dyn RunObserver,
    ) -> BatchOutcome {
        let total = artifacts.len();
        let mut aggregator = FailureAggregator::new();

        for (index, artifact) in artifacts.iter().enumerate() {
            let ctx = ExecutionContext::new(run_id, request, artifact.clone(), index, total);
            let result = self.run_one(&ctx, observer);
            if let Err(failure) = &result {
                observer.on_event(&RunEvent::ArtifactFailed(failure.clone()));
            }
            aggregator.record(result);
        }

        aggregator.finish()
    }

    /// Build and validate a single artifact.
    fn run_one(
        &self,
        ctx: &ExecutionContext,
        observer: &dyn RunObserver,
    ) -> Result<(), ArtifactFailure> {
        let artifact = ctx.artifact();
        observer.on_event(&RunEvent::ArtifactStarted {
            artifact: artifact.clone(),
            index: ctx.index,
            total: ctx.total,
        });

        let start = Instant::now();
        let configs = self
            .builder
            .build(artifact)
            .map_err(|e| ArtifactFailure::new(artifact.clone(), e.to_string()))?;

        self.engine
            .run(ctx, &configs)
            .map_err(|e| ArtifactFailure::new(artifact.clone(), e.to_string()))?;

        observer.on_event(&RunEvent::ArtifactSucceeded {
            artifact: artifact.clone(),
            configs: configs.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collaborator::{FnBuilder, FnEngine};
    use crate::execution::observer::RecordingObserver;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn artifacts(n: usize) -> Vec<ArtifactRef> {
        (0..n)
            .map(|i| ArtifactRef::new(format!("configs/{:04}.yaml", i)))
            .collect()
    }

    fn one_config(artifact: &ArtifactRef) -> anyhow::Result<Vec<String>> {
        Ok(vec![artifact.name()])
    }

    #[test]
    fn test_all_artifacts_run_in_order() {
        let seen = parking_lot::Mutex::new(Vec::new());
        let executor = BatchExecutor::new(
            FnBuilder::new(one_config),
            FnEngine(|_: &ExecutionContext, configs: &[String]| -> anyhow::Result<()> {
                seen.lock().extend(configs.iter().cloned());
                Ok(())
            }),
        );
        let recorder = RecordingObserver::new();

        let outcome = executor.run(
            RunId::new(),
            &ExecutionRequest::default(),
            &artifacts(3),
            &recorder,
        );

        assert_eq!(outcome, BatchOutcome::AllSucceeded { attempted: 3 });
        assert_eq!(*seen.lock(), vec!["0000.yaml", "0001.yaml", "0002.yaml"]);
        assert!(recorder.failures().is_empty());
    }

    #[test]
    fn test_validation_failure_is_isolated() {
        let calls = AtomicUsize::new(0);
        let executor = BatchExecutor::new(
            FnBuilder::new(one_config),
            FnEngine(|_: &ExecutionContext, _: &[String]| -> anyhow::Result<()> {
                if calls.fetch_add(1, Ordering::SeqCst) == 1 {
                    Err(anyhow!("Boom!"))
                } else {
                    Ok(())
                }
            }),
        );
        let recorder = RecordingObserver::new();

        let outcome = executor.run(
            RunId::new(),
            &ExecutionRequest::default(),
            &artifacts(4),
            &recorder,
        );

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(outcome.attempted(), 4);
        assert_eq!(outcome.failures().len(), 1);
        assert_eq!(outcome.failures()[0].message, "Boom!");
        assert_eq!(
            recorder.messages_at(log::Level::Warn),
            vec!["Error 'Boom!' occurred while running config file 0001.yaml. Skipping it for now."]
        );
    }

    #[test]
    fn test_build_failure_skips_engine() {
        let calls = AtomicUsize::new(0);
        let executor = BatchExecutor::new(
            FnBuilder::new(|artifact: &ArtifactRef| -> anyhow::Result<Vec<String>> {
                if artifact.name() == "0000.yaml" {
                    Err(anyhow!("invalid YAML"))
                } else {
                    Ok(vec![artifact.name()])
                }
            }),
            FnEngine(|_: &ExecutionContext, _: &[String]| -> anyhow::Result<()> {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );
        let recorder = RecordingObserver::new();

        let outcome = executor.run(
            RunId::new(),
            &ExecutionRequest::default(),
            &artifacts(2),
            &recorder,
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.attempted(), 2);
        assert_eq!(outcome.failures()[0].artifact.name(), "0000.yaml");
        assert_eq!(outcome.failures()[0].message, "invalid YAML");
    }

    #[test]
    fn test_engine_sees_single_file_context() {
        let executor = BatchExecutor::new(
            FnBuilder::new(one_config),
            FnEngine(|ctx: &ExecutionContext, configs: &[String]| -> anyhow::Result<()> {
                assert!(ctx.config_dir().is_none());
                assert_eq!(ctx.config_file(), Some(ctx.artifact().path()));
                assert_eq!(configs.len(), 1);
                Ok(())
            }),
        );

        let request = ExecutionRequest::builder().config_dir("configs").build();
        let outcome = executor.run(RunId::new(), &request, &artifacts(2), &RecordingObserver::new());
        assert!(outcome.is_success());
    }

    #[test]
    fn test_empty_batch() {
        let executor = BatchExecutor::new(
            FnBuilder::new(one_config),
            FnEngine(|_: &ExecutionContext, _: &[String]| -> anyhow::Result<()> { Ok(()) }),
        );
        let outcome = executor.run(
            RunId::new(),
            &ExecutionRequest::default(),
            &[],
            &RecordingObserver::new(),
        );
        assert_eq!(outcome.attempted(), 0);
        assert!(outcome.is_success());
    }
}
