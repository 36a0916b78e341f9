//! Command line surface of the `trolley` binary.
use clap::Parser;
use std::future::{pending, Future};
use std::io;
#[cfg(feature = "prometheus")]
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::error;
use trolley_core::{
    ConfigError, SwarmConfig, ThinkTime, BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_SPAWN_RATE,
    DEFAULT_USERS,
};

#[derive(Parser, Debug)]
#[command(
    name = "trolley",
    version,
    about = "Replay the marketplace user journey against an API gateway"
)]
pub struct TrolleyCli {
    /// Gateway base URL
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub host: String,

    /// Number of simulated users
    #[arg(short, long, default_value_t = DEFAULT_USERS)]
    pub users: usize,

    /// Users spawned per second
    #[arg(short = 'r', long, default_value_t = DEFAULT_SPAWN_RATE)]
    pub spawn_rate: NonZeroU32,

    /// Stop after this long, e.g. `90s` or `5m`
    #[arg(short = 't', long, value_parser = humantime::parse_duration)]
    pub run_time: Option<Duration>,

    /// Journeys each user completes before stopping
    #[arg(short, long)]
    pub iterations: Option<u64>,

    /// Shortest pause between steps
    #[arg(long, value_parser = humantime::parse_duration, default_value = "1s")]
    pub think_min: Duration,

    /// Longest pause between steps
    #[arg(long, value_parser = humantime::parse_duration, default_value = "3s")]
    pub think_max: Duration,

    /// Serve Prometheus metrics on this address
    #[cfg(feature = "prometheus")]
    #[arg(long)]
    pub prometheus: Option<SocketAddr>,
}

impl TrolleyCli {
    pub fn config(&self) -> Result<SwarmConfig, ConfigError> {
        let mut config = SwarmConfig::new(&self.host)?
            .users(self.users)
            .spawn_rate(self.spawn_rate)
            .think_time(ThinkTime::between(self.think_min, self.think_max)?);

        if let Some(run_time) = self.run_time {
            config = config.run_time(run_time);
        }
        if let Some(iterations) = self.iterations {
            config = config.iterations(iterations);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Completes once `signal` fires. If the listener cannot be installed the run is left to end on
/// its own deadline instead of stopping at once.
pub async fn interrupted<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(err) = signal.await {
        error!("Unable to listen for Ctrl-C, running until the run ends: {err}");
        pending::<()>().await;
    }
}
