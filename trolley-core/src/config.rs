use crate::{
    BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_SPAWN_RATE, DEFAULT_THINK_MAX, DEFAULT_THINK_MIN,
    DEFAULT_USERS,
};
use humantime::format_duration;
use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid base URL `{url}`: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Base URL `{0}` must use http or https")]
    UnsupportedScheme(String),

    #[error("Think time minimum ({min}) is greater than maximum ({max})")]
    InvertedThinkTime { min: String, max: String },

    #[error("A swarm needs at least one user")]
    NoUsers,
}

/// Bounds of the randomized pause a simulated user takes between steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThinkTime {
    min: Duration,
    max: Duration,
}

impl ThinkTime {
    pub fn between(min: Duration, max: Duration) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvertedThinkTime {
                min: format_duration(min).to_string(),
                max: format_duration(max).to_string(),
            });
        }
        Ok(Self { min, max })
    }

    /// No pause at all. Useful for tests and smoke runs.
    pub fn none() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn is_zero(&self) -> bool {
        self.max.is_zero()
    }
}

impl Default for ThinkTime {
    fn default() -> Self {
        Self {
            min: DEFAULT_THINK_MIN,
            max: DEFAULT_THINK_MAX,
        }
    }
}

impl fmt::Display for ThinkTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            format_duration(self.min),
            format_duration(self.max)
        )
    }
}

/// Settings for a single swarm run.
#[derive(Clone, Debug)]
pub struct SwarmConfig {
    pub base_url: Url,
    pub users: usize,
    pub spawn_rate: NonZeroU32,
    pub run_time: Option<Duration>,
    pub iterations: Option<u64>,
    pub think_time: ThinkTime,
}

impl SwarmConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            users: DEFAULT_USERS,
            spawn_rate: DEFAULT_SPAWN_RATE,
            run_time: None,
            iterations: None,
            think_time: ThinkTime::default(),
        })
    }

    /// Build a config targeting `API_GATEWAY_BASE_URL`, or the local default when it is unset or
    /// blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(&base_url)
    }

    pub fn users(mut self, users: usize) -> Self {
        self.users = users;
        self
    }

    pub fn spawn_rate(mut self, spawn_rate: NonZeroU32) -> Self {
        self.spawn_rate = spawn_rate;
        self
    }

    pub fn run_time(mut self, run_time: Duration) -> Self {
        self.run_time = Some(run_time);
        self
    }

    pub fn iterations(mut self, iterations: u64) -> Self {
        self.iterations = Some(iterations);
        self
    }

    pub fn think_time(mut self, think_time: ThinkTime) -> Self {
        self.think_time = think_time;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.users == 0 {
            return Err(ConfigError::NoUsers);
        }
        Ok(())
    }

    /// Base URL with any trailing slashes removed, ready to have a request path appended.
    pub fn base(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }
}

pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|source| ConfigError::InvalidBaseUrl {
        url: trimmed.to_string(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::UnsupportedScheme(trimmed.to_string())),
    }
}
