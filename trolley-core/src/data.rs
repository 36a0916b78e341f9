use pdatastructs::tdigest::{TDigest, K1};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::error;

const TDIGEST_BACKLOG_SIZE: usize = 100;

/// Aggregated results for one request label.
#[derive(Debug, Clone)]
pub struct StepStats {
    label: String,
    success_count: u64,
    failure_count: u64,
    latency: TDigest<K1>,
    latency_count: u64,
    latency_total: Duration,
    latency_min: Duration,
    latency_max: Duration,
    failures: BTreeMap<String, u64>,
}

impl StepStats {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            success_count: 0,
            failure_count: 0,
            latency: default_tdigest(),
            latency_count: 0,
            latency_total: Duration::ZERO,
            latency_min: Duration::MAX,
            latency_max: Duration::ZERO,
            failures: BTreeMap::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn record_success(&mut self) {
        self.success_count += 1;
    }

    pub fn record_successes(&mut self, count: u64) {
        self.success_count += count;
    }

    pub fn record_failure(&mut self, message: &str) {
        self.failure_count += 1;
        *self.failures.entry(message.to_string()).or_default() += 1;
    }

    pub fn push_latency(&mut self, latency: Duration) {
        self.latency.insert(latency.as_secs_f64());
        self.latency_count += 1;
        self.latency_total += latency;
        self.latency_min = self.latency_min.min(latency);
        self.latency_max = self.latency_max.max(latency);
    }

    pub fn push_latencies(&mut self, latencies: &[Duration]) {
        for latency in latencies {
            self.push_latency(*latency);
        }
    }

    pub fn success_count(&self) -> u64 {
        self.success_count
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count
    }

    pub fn total(&self) -> u64 {
        self.success_count + self.failure_count
    }

    pub fn error_rate(&self) -> f64 {
        if self.total() == 0 {
            0.
        } else {
            self.failure_count as f64 / self.total() as f64
        }
    }

    /// Latency at the given quantile, or zero when nothing was measured.
    pub fn latency(&self, quantile: f64) -> Duration {
        if self.latency_count == 0 {
            return Duration::ZERO;
        }

        let secs = self.latency.quantile(quantile);

        // TDigest can hand back NaN on degenerate inputs.
        if secs.is_finite() && secs >= 0. {
            Duration::from_secs_f64(secs)
        } else {
            error!("Non-finite latency quantile for {}", self.label);
            Duration::ZERO
        }
    }

    pub fn min_latency(&self) -> Duration {
        if self.latency_count == 0 {
            Duration::ZERO
        } else {
            self.latency_min
        }
    }

    pub fn max_latency(&self) -> Duration {
        self.latency_max
    }

    pub fn mean_latency(&self) -> Duration {
        if self.latency_count == 0 {
            Duration::ZERO
        } else {
            let nanos = self.latency_total.as_nanos() / u128::from(self.latency_count);
            Duration::from_nanos(nanos as u64)
        }
    }

    /// Distinct failure messages and how often each occurred, ordered by message.
    pub fn failures(&self) -> impl Iterator<Item = (&str, u64)> {
        self.failures.iter().map(|(msg, count)| (msg.as_str(), *count))
    }
}

fn default_tdigest() -> TDigest<K1> {
    TDigest::new(K1::new(10.), TDIGEST_BACKLOG_SIZE)
}
