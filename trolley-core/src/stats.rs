use crate::StepStats;
use humantime::format_duration;
use std::fmt;
use std::time::Duration;

/// Results of a swarm run, one [StepStats] per request label in journey order.
#[derive(Debug, Clone)]
pub struct RunStatistics {
    pub steps: Vec<StepStats>,
    pub users: usize,
    pub iterations: u64,
    pub elapsed: Duration,
}

impl RunStatistics {
    pub fn step(&self, label: &str) -> Option<&StepStats> {
        self.steps.iter().find(|s| s.label() == label)
    }

    pub fn total_requests(&self) -> u64 {
        self.steps.iter().map(StepStats::total).sum()
    }

    pub fn total_failures(&self) -> u64 {
        self.steps.iter().map(StepStats::failure_count).sum()
    }

    pub fn has_failures(&self) -> bool {
        self.total_failures() > 0
    }

    pub fn error_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            0.
        } else {
            self.total_failures() as f64 / total as f64
        }
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<44} {:>8} {:>8} {:>10} {:>10} {:>10} {:>10}",
            "Label", "Reqs", "Fails", "Mean", "p50", "p90", "p99"
        )?;
        for step in &self.steps {
            writeln!(
                f,
                "{:<44} {:>8} {:>8} {:>10} {:>10} {:>10} {:>10}",
                step.label(),
                step.total(),
                step.failure_count(),
                millis(step.mean_latency()),
                millis(step.latency(0.5)),
                millis(step.latency(0.9)),
                millis(step.latency(0.99)),
            )?;
        }
        writeln!(
            f,
            "{:<44} {:>8} {:>8}",
            "Aggregated",
            self.total_requests(),
            self.total_failures()
        )?;

        if self.has_failures() {
            writeln!(f)?;
            writeln!(f, "{:>8}  {:<44} Message", "Count", "Label")?;
            for step in &self.steps {
                for (message, count) in step.failures() {
                    writeln!(f, "{:>8}  {:<44} {}", count, step.label(), message)?;
                }
            }
        }

        writeln!(f)?;
        write!(
            f,
            "users={}, iterations={}, elapsed={}, error_rate={:.2}",
            self.users,
            self.iterations,
            format_duration(Duration::from_millis(self.elapsed.as_millis() as u64)),
            self.error_rate(),
        )
    }
}

fn millis(duration: Duration) -> String {
    format!("{:.1}ms", duration.as_secs_f64() * 1e3)
}
