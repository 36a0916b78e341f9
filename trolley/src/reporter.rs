use crate::step::Step;
use crate::transport::TransportError;
use crate::StepFailure;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
#[allow(unused_imports)]
use tracing::{debug, error, trace, warn};
#[cfg(feature = "metrics")]
use trolley_core::{STEP_FAILURE, STEP_LABEL_KEY, STEP_LATENCY, STEP_SUCCESS};

/// Success/failure sink for journey steps, keyed by the step's normalized label.
pub trait Reporter {
    fn success(&self, label: &'static str, elapsed: Duration);
    fn failure(&self, label: &'static str, elapsed: Duration, message: &str);
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn success(&self, label: &'static str, elapsed: Duration) {
        (**self).success(label, elapsed)
    }

    fn failure(&self, label: &'static str, elapsed: Duration, message: &str) {
        (**self).failure(label, elapsed, message)
    }
}

impl<R: Reporter + ?Sized> Reporter for Arc<R> {
    fn success(&self, label: &'static str, elapsed: Duration) {
        (**self).success(label, elapsed)
    }

    fn failure(&self, label: &'static str, elapsed: Duration, message: &str) {
        (**self).failure(label, elapsed, message)
    }
}

/// Forward one validated response to the reporter and the metrics facade.
pub(crate) fn record<R: Reporter + ?Sized>(
    reporter: &R,
    step: Step,
    elapsed: Duration,
    result: &Result<(), StepFailure>,
) {
    let label = step.label();

    #[cfg(feature = "metrics")]
    metrics::histogram!(STEP_LATENCY, STEP_LABEL_KEY => label).record(elapsed.as_secs_f64());

    match result {
        Ok(()) => {
            debug!("{step} passed in {elapsed:?}");
            #[cfg(feature = "metrics")]
            metrics::counter!(STEP_SUCCESS, STEP_LABEL_KEY => label).increment(1);
            reporter.success(label, elapsed);
        }
        Err(failure) => {
            warn!("{step} failed: {failure}");
            #[cfg(feature = "metrics")]
            metrics::counter!(STEP_FAILURE, STEP_LABEL_KEY => label).increment(1);
            reporter.failure(label, elapsed, &failure.to_string());
        }
    }
}

/// Report a request that never produced a response.
pub(crate) fn record_fault<R: Reporter + ?Sized>(
    reporter: &R,
    step: Step,
    elapsed: Duration,
    fault: &TransportError,
) {
    let label = step.label();
    error!("{step} could not reach the gateway: {fault}");

    #[cfg(feature = "metrics")]
    metrics::counter!(STEP_FAILURE, STEP_LABEL_KEY => label).increment(1);

    reporter.failure(label, elapsed, &fault.to_string());
}

/// One entry of an [EventLog].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
    Success { label: &'static str },
    Failure { label: &'static str, message: String },
}

impl StepEvent {
    pub fn label(&self) -> &'static str {
        match self {
            StepEvent::Success { label } | StepEvent::Failure { label, .. } => label,
        }
    }
}

/// Reporter that keeps every event in order. Latencies are dropped so two runs against the same
/// responses compare equal.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<StepEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StepEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn failures(&self) -> Vec<(&'static str, String)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                StepEvent::Failure { label, message } => Some((label, message)),
                StepEvent::Success { .. } => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn push(&self, event: StepEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl Reporter for EventLog {
    fn success(&self, label: &'static str, _elapsed: Duration) {
        self.push(StepEvent::Success { label });
    }

    fn failure(&self, label: &'static str, _elapsed: Duration, message: &str) {
        self.push(StepEvent::Failure {
            label,
            message: message.to_string(),
        });
    }
}
