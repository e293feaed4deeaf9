//! Run observation.
//!
//! Warnings and per-artifact progress are delivered as [`RunEvent`] values
//! to every registered [`RunObserver`]. The default [`LogObserver`] writes
//! them through the `log` facade; [`RecordingObserver`] keeps them in
//! memory.

use crate::core::artifact::ArtifactRef;
use crate::core::error::{ArtifactFailure, RunId};
use crate::resolution::{ExecutionMode, Misconfiguration};
use log::Level;
use parking_lot::Mutex;
use std::sync::Arc;

/// An observable event of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// Resolution finished and execution is about to start.
    Started {
        run_id: RunId,
        mode: ExecutionMode,
        total: usize,
    },
    /// The requested flags do not fit the resolved mode.
    Misconfigured(Misconfiguration),
    /// An artifact is about to be built and validated.
    ArtifactStarted {
        artifact: ArtifactRef,
        index: usize,
        total: usize,
    },
    /// An artifact was built and validated without error.
    ArtifactSucceeded {
        artifact: ArtifactRef,
        configs: usize,
        duration_ms: u64,
    },
    /// An artifact failed and was skipped.
    ArtifactFailed(ArtifactFailure),
    /// Every artifact was attempted.
    Completed {
        attempted: usize,
        failed: usize,
        duration_ms: u64,
    },
}

impl RunEvent {
    /// Severity the event is logged at.
    pub fn level(&self) -> Level {
        match self {
            RunEvent::Misconfigured(_) | RunEvent::ArtifactFailed(_) => Level::Warn,
            RunEvent::Started { .. } | RunEvent::Completed { .. } => Level::Info,
            RunEvent::ArtifactStarted { .. } | RunEvent::ArtifactSucceeded { .. } => Level::Debug,
        }
    }

    /// Human-readable log line.
    pub fn message(&self) -> String {
        match self {
            RunEvent::Started {
                run_id,
                mode,
                total,
            } => format!("Run {}: {} mode, {} artifact(s) to validate", run_id, mode, total),
            RunEvent::Misconfigured(warning) => warning.message().to_string(),
            RunEvent::ArtifactStarted {
                artifact,
                index,
                total,
            } => format!("Running config file {} ({}/{})", artifact.name(), index + 1, total),
            RunEvent::ArtifactSucceeded {
                artifact,
                configs,
                duration_ms,
            } => format!(
                "Config file {} finished: {} validation(s) in {}ms",
                artifact.name(),
                configs,
                duration_ms
            ),
            RunEvent::ArtifactFailed(failure) => failure.skip_message(),
            RunEvent::Completed {
                attempted,
                failed,
                duration_ms,
            } => format!(
                "Attempted {} config file(s), {} failed, in {}ms",
                attempted, failed, duration_ms
            ),
        }
    }
}

/// Receives run events.
pub trait RunObserver: Send + Sync {
    /// Handle one event.
    fn on_event(&self, event: &RunEvent);
}

impl<F> RunObserver for F
where
    F: Fn(&RunEvent) + Send + Sync,
{
    fn on_event(&self, event: &RunEvent) {
        self(event)
    }
}

/// Writes events through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl RunObserver for LogObserver {
    fn on_event(&self, event: &RunEvent) {
        log::log!(event.level(), "{}", event.message());
    }
}

/// Forwards each event to several observers, in registration order.
#[derive(Clone, Default)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn RunObserver>>,
}

impl ObserverSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer.
    pub fn push(&mut self, observer: Arc<dyn RunObserver>) {
        self.observers.push(observer);
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Whether no observer is registered.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl std::fmt::Debug for ObserverSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverSet")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl RunObserver for ObserverSet {
    fn on_event(&self, event: &RunEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<RunEvent>>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events so far.
    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().clone()
    }

    /// Messages of events at `level` or more severe, in order.
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.level() <= level)
            .map(RunEvent::message)
            .collect()
    }

    /// Misconfiguration warnings seen so far.
    pub fn warnings(&self) -> Vec<Misconfiguration> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                RunEvent::Misconfigured(w) => Some(*w),
                _ => None,
            })
            .collect()
    }

    /// Failures seen so far.
    pub fn failures(&self) -> Vec<ArtifactFailure> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                RunEvent::ArtifactFailed(f) => Some(f.clone()),
                _ => None,
            })
            .collect()
    }

    /// Drop all recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl RunObserver for RecordingObserver {
    fn on_event(&self, event: &RunEvent) {
        self.events.lock().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_levels() {
        let failure = ArtifactFailure::new(ArtifactRef::new("0001.yaml"), "Boom!");
        assert_eq!(RunEvent::ArtifactFailed(failure).level(), Level::Warn);
        assert_eq!(
            RunEvent::Misconfigured(Misconfiguration::KubeCompletionsWithConfigFile).level(),
            Level::Warn
        );
        assert_eq!(
            RunEvent::Completed {
                attempted: 1,
                failed: 0,
                duration_ms: 0
            }
            .level(),
            Level::Info
        );
    }

    #[test]
    fn test_recording_filters_by_level() {
        let recorder = RecordingObserver::new();
        recorder.on_event(&RunEvent::ArtifactStarted {
            artifact: ArtifactRef::new("0000.yaml"),
            index: 0,
            total: 2,
        });
        recorder.on_event(&RunEvent::ArtifactFailed(ArtifactFailure::new(
            ArtifactRef::new("dir/0000.yaml"),
            "Boom!",
        )));

        assert_eq!(recorder.events().len(), 2);
        assert_eq!(
            recorder.messages_at(Level::Warn),
            vec!["Error 'Boom!' occurred while running config file 0000.yaml. Skipping it for now."]
        );
        assert_eq!(recorder.messages_at(Level::Debug).len(), 2);
        assert_eq!(recorder.failures().len(), 1);

        recorder.clear();
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_observer_set_fans_out() {
        let first = Arc::new(RecordingObserver::new());
        let second = Arc::new(RecordingObserver::new());
        let mut set = ObserverSet::new();
        set.push(first.clone());
        set.push(second.clone());

        set.on_event(&RunEvent::Misconfigured(
            Misconfiguration::KubeCompletionsWithConfigFile,
        ));
        assert_eq!(set.len(), 2);
        assert_eq!(first.warnings().len(), 1);
        assert_eq!(second.warnings().len(), 1);
    }

    #[test]
    fn test_closure_observer() {
        let seen = AtomicUsize::new(0);
        let observer = |_: &RunEvent| {
            seen.fetch_add(1, Ordering::Relaxed);
        };
        observer.on_event(&RunEvent::Misconfigured(
            Misconfiguration::KubeCompletionsWithoutShardIndex,
        ));
        assert_eq!(seen.load(Ordering::Relaxed), 1);
    }
}
