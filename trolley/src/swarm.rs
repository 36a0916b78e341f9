//! Load-generation host: spawns simulated users, paces them and aggregates what they report.
mod recorder;
mod timer;
mod user;

use crate::transport::{HttpTransport, ReqwestTransport, TransportError};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use recorder::Recorder;
use std::future::{pending, Future};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use timer::Timer;
use tokio::task::JoinSet;
use tokio::time::{sleep, Instant};
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};
use trolley_core::{ConfigError, RunStatistics, SwarmConfig, PROGRESS_INTERVAL};
use user::{simulate_user, UserSettings};

#[derive(Debug, Error)]
pub enum SwarmError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport setup failed: {0}")]
    Transport(#[from] TransportError),
}

/// A swarm of simulated users walking the marketplace journey.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use trolley::core::SwarmConfig;
/// use trolley::Swarm;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SwarmConfig::from_env()?
///     .users(50)
///     .run_time(Duration::from_secs(120));
///
/// let stats = Swarm::from_config(config)?.run().await?;
/// println!("{stats}");
/// # Ok(())
/// # }
/// ```
pub struct Swarm<T> {
    config: SwarmConfig,
    transport: T,
}

impl Swarm<ReqwestTransport> {
    pub fn from_config(config: SwarmConfig) -> Result<Self, SwarmError> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::new(config, transport))
    }
}

impl<T> Swarm<T>
where
    T: HttpTransport + Clone + Send + Sync + 'static,
{
    pub fn new(config: SwarmConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    /// Run until the run time elapses or every user finishes its iterations.
    pub async fn run(self) -> Result<RunStatistics, SwarmError> {
        self.run_until(pending()).await
    }

    /// Like [Swarm::run], but also stops as soon as `shutdown` completes.
    #[instrument(name = "swarm", skip_all, fields(base_url = %self.config.base_url, users = self.config.users))]
    pub async fn run_until<S>(self, shutdown: S) -> Result<RunStatistics, SwarmError>
    where
        S: Future<Output = ()>,
    {
        self.config.validate()?;
        info!(
            "Starting swarm: {} users at {}/s, think time {}",
            self.config.users, self.config.spawn_rate, self.config.think_time
        );

        let recorder = Arc::new(Recorder::new());
        let settings = UserSettings::from(&self.config);
        let limiter = spawn_limiter(self.config.spawn_rate);
        let mut progress = Timer::new(PROGRESS_INTERVAL).await;
        let mut users = JoinSet::new();
        let mut spawned = 0;
        let mut reported = (0, 0);

        let start = Instant::now();
        let run_time = self.config.run_time;
        let deadline = async move {
            match run_time {
                Some(run_time) => sleep(run_time).await,
                None => pending::<()>().await,
            }
        };
        tokio::pin!(deadline);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = limiter.until_ready(), if spawned < self.config.users => {
                    users.spawn(simulate_user(
                        spawned,
                        self.transport.clone(),
                        recorder.clone(),
                        settings,
                    ));
                    spawned += 1;
                    if spawned == self.config.users {
                        info!("All {spawned} users spawned");
                    }
                }
                Some(res) = users.join_next(), if !users.is_empty() => {
                    if let Err(err) = res {
                        error!("User task ended abnormally: {err}");
                    }
                    if spawned == self.config.users && users.is_empty() {
                        info!("All users finished their iterations");
                        break;
                    }
                }
                elapsed = progress.tick() => {
                    recorder.flush();
                    let (success, failure) = recorder.totals();
                    info!(
                        "{} requests ({} failed) in the last {}, {} users active",
                        (success + failure) - (reported.0 + reported.1),
                        failure - reported.1,
                        humantime::format_duration(Duration::from_millis(elapsed.as_millis() as u64)),
                        users.len(),
                    );
                    reported = (success, failure);
                }
                _ = &mut deadline => {
                    info!("Run time elapsed, stopping users");
                    break;
                }
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping users");
                    break;
                }
            }
        }

        users.shutdown().await;

        let stats = RunStatistics {
            steps: recorder.collect(),
            users: spawned,
            iterations: recorder.iterations(),
            elapsed: start.elapsed(),
        };
        info!(
            "Swarm complete: {} requests, {} failures",
            stats.total_requests(),
            stats.total_failures()
        );
        Ok(stats)
    }
}

fn spawn_limiter(spawn_rate: NonZeroU32) -> DefaultDirectRateLimiter {
    RateLimiter::direct(Quota::per_second(spawn_rate).allow_burst(NonZeroU32::MIN))
}
