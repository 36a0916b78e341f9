use super::recorder::Recorder;
use crate::journey::JourneyRunner;
use crate::reporter::record_fault;
use crate::step::Step;
use crate::transport::HttpTransport;
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};
use trolley_core::{SwarmConfig, ThinkTime};

#[derive(Debug, Clone, Copy)]
pub(crate) struct UserSettings {
    pub think_time: ThinkTime,
    pub iterations: Option<u64>,
}

impl From<&SwarmConfig> for UserSettings {
    fn from(config: &SwarmConfig) -> Self {
        Self {
            think_time: config.think_time,
            iterations: config.iterations,
        }
    }
}

/// One simulated user: repeat the journey until the iteration budget runs out (or forever, until
/// the swarm aborts the task).
#[instrument(name = "user", skip_all, fields(id = id))]
pub(crate) async fn simulate_user<T>(
    id: usize,
    transport: T,
    recorder: Arc<Recorder>,
    settings: UserSettings,
) where
    T: HttpTransport + Send + Sync,
{
    debug!("User started");
    let mut runner = JourneyRunner::new(transport);
    let mut completed = 0u64;
    let mut first = true;

    // One session per user. A later failed catalogue keeps the previous product id.
    runner.start_session();

    while settings.iterations.map_or(true, |max| completed < max) {
        for step in Step::ALL {
            if !first {
                think(settings.think_time).await;
            }
            first = false;

            let start = Instant::now();
            if let Err(fault) = runner.execute(step, recorder.as_ref()).await {
                record_fault(recorder.as_ref(), step, start.elapsed(), &fault);
            }
        }

        completed += 1;
        recorder.complete_iteration();
    }

    debug!("User finished after {completed} iterations");
}

/// Sleep for a uniformly random time within the think-time bounds.
pub(crate) async fn think(think_time: ThinkTime) {
    if think_time.is_zero() {
        // Still hand control back so a user against an instant transport cannot starve the swarm.
        tokio::task::yield_now().await;
        return;
    }

    let pause = {
        let mut rng = rand::thread_rng();
        rng.gen_range(think_time.min().as_secs_f64()..=think_time.max().as_secs_f64())
    };
    tokio::time::sleep(Duration::from_secs_f64(pause)).await;
}
