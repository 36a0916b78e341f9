use crate::reporter::Reporter;
use crate::step::Step;
use metrics_util::AtomicBucket;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
#[allow(unused_imports)]
use tracing::{debug, error, trace, warn};
use trolley_core::StepStats;

/// Shared statistics sink for every user of a swarm. Counting and latency capture are lock-free;
/// only failures take a lock to tally their message.
pub(crate) struct Recorder {
    steps: Vec<StepAtomics>,
    iterations: AtomicU64,
}

struct StepAtomics {
    label: &'static str,
    success: AtomicU64,
    failure: AtomicU64,
    latency: AtomicBucket<Duration>,
    stats: Mutex<StepStats>,
}

impl StepAtomics {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            success: AtomicU64::new(0),
            failure: AtomicU64::new(0),
            latency: AtomicBucket::new(),
            stats: Mutex::new(StepStats::new(label)),
        }
    }

    fn flush(&self) {
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        self.latency
            .clear_with(|latencies| stats.push_latencies(latencies));
    }
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            steps: Step::ALL
                .iter()
                .map(|step| StepAtomics::new(step.label()))
                .collect(),
            iterations: AtomicU64::new(0),
        }
    }

    pub fn complete_iteration(&self) {
        self.iterations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn iterations(&self) -> u64 {
        self.iterations.load(Ordering::Relaxed)
    }

    /// Cumulative (successes, failures) across every step.
    pub fn totals(&self) -> (u64, u64) {
        self.steps.iter().fold((0, 0), |(success, failure), step| {
            (
                success + step.success.load(Ordering::Relaxed),
                failure + step.failure.load(Ordering::Relaxed),
            )
        })
    }

    /// Move buffered latencies into the per-step digests.
    pub fn flush(&self) {
        for step in &self.steps {
            step.flush();
        }
    }

    pub fn collect(&self) -> Vec<StepStats> {
        self.steps
            .iter()
            .map(|step| {
                step.flush();
                let mut stats = step
                    .stats
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone();
                stats.record_successes(step.success.load(Ordering::Relaxed));
                stats
            })
            .collect()
    }

    fn step(&self, label: &str) -> Option<&StepAtomics> {
        let step = self.steps.iter().find(|step| step.label == label);
        if step.is_none() {
            warn!("Dropping result for unknown label {label}");
        }
        step
    }
}

impl Reporter for Recorder {
    fn success(&self, label: &'static str, elapsed: Duration) {
        if let Some(step) = self.step(label) {
            step.success.fetch_add(1, Ordering::Relaxed);
            step.latency.push(elapsed);
        }
    }

    fn failure(&self, label: &'static str, elapsed: Duration, message: &str) {
        if let Some(step) = self.step(label) {
            step.failure.fetch_add(1, Ordering::Relaxed);
            step.latency.push(elapsed);
            step.stats
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .record_failure(message);
        }
    }
}
