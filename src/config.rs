//! Client configuration.

use std::time::Duration;

use crate::errors::Error;

/// Base URL of the USAspending v2 API.
pub const DEFAULT_BASE_URL: &str = "https://api.usaspending.gov/api/v2";

/// Configuration for a [`Client`](crate::Client).
///
/// All knobs are explicit; there is no environment or file loading. The
/// defaults are suitable for unauthenticated use of the public API.
#[derive(Debug, Clone)]
pub struct Config {
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Extra attempts after the first failed request.
    pub max_retries: u32,
    /// Base delay before the first retry; doubles per attempt up to
    /// `max_retry_delay`.
    pub retry_delay: Duration,
    /// Cap on the exponential retry delay.
    pub max_retry_delay: Duration,
    /// Number of requests allowed per `rate_limit_period`.
    pub rate_limit_calls: u32,
    /// Window over which `rate_limit_calls` applies.
    pub rate_limit_period: Duration,
    /// Whether successful GET responses are cached.
    pub cache_enabled: bool,
    /// Time-to-live for cached GET responses.
    pub cache_ttl: Duration,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            max_retry_delay: Duration::from_secs(30),
            rate_limit_calls: 30,
            rate_limit_period: Duration::from_secs(1),
            cache_enabled: true,
            cache_ttl: Duration::from_secs(3600),
            user_agent: concat!("usaspending-api-rs/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API base URL (trailing slash is stripped).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the number of retries after a failed request.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the base retry delay.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Sets the rate limit as calls per period.
    pub fn with_rate_limit(mut self, calls: u32, period: Duration) -> Self {
        self.rate_limit_calls = calls;
        self.rate_limit_period = period;
        self
    }

    /// Enables or disables the GET response cache.
    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Sets the cache time-to-live.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Sets the User-Agent header value.
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// Checks the configuration for values the client cannot operate with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.base_url.is_empty() {
            return Err(Error::Configuration("base_url must not be empty".into()));
        }
        if self.timeout.is_zero() {
            return Err(Error::Configuration("timeout must be positive".into()));
        }
        if self.rate_limit_calls == 0 {
            return Err(Error::Configuration(
                "rate_limit_calls must be positive".into(),
            ));
        }
        if self.rate_limit_period.is_zero() {
            return Err(Error::Configuration(
                "rate_limit_period must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Minimum spacing between request starts implied by the rate limit.
    pub(crate) fn min_request_interval(&self) -> Duration {
        self.rate_limit_period / self.rate_limit_calls
    }
}
