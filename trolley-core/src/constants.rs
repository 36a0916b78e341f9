use std::num::NonZeroU32;
use std::time::Duration;

/// Environment variable holding the API gateway base URL.
pub const BASE_URL_ENV: &str = "API_GATEWAY_BASE_URL";

/// Gateway address used when `API_GATEWAY_BASE_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:18080";

/// Timeout applied to every journey request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

/// Timeout for establishing the TCP/TLS connection to the gateway.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Lower bound of the think-time pause between steps.
pub const DEFAULT_THINK_MIN: Duration = Duration::from_secs(1);

/// Upper bound of the think-time pause between steps.
pub const DEFAULT_THINK_MAX: Duration = Duration::from_secs(3);

pub const DEFAULT_USERS: usize = 1;

pub const DEFAULT_SPAWN_RATE: NonZeroU32 = unsafe { NonZeroU32::new_unchecked(1) };

/// How often the swarm logs a progress line.
pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(5);
