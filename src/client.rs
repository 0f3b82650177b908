//! HTTP transport for the USAspending API.
//!
//! Every request the crate makes goes through [`Client::get`] or
//! [`Client::post`], which apply the configured rate limit, retry policy,
//! and (for GET) the response cache.

use std::time::{Duration, Instant};

use rand::Rng;
use reqwest::Method;
use serde_json::Value;
use tokio::sync::Mutex;
use url::Url;

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::errors::Error;

/// Client for the USAspending.gov API.
///
/// The client itself holds no query state; search builders borrow it and
/// share its rate limiter and cache. Construct one per base URL and reuse it.
#[derive(Debug)]
pub struct Client {
    config: Config,
    cache: ResponseCache,
    last_request: Mutex<Option<Instant>>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Creates a client with the default [`Config`].
    pub fn new() -> Self {
        let config = Config::default();
        let cache = ResponseCache::new(config.cache_ttl);
        Self {
            config,
            cache,
            last_request: Mutex::new(None),
        }
    }

    /// Creates a client from an explicit configuration.
    pub fn with_config(config: Config) -> Result<Self, Error> {
        config.validate()?;
        let cache = ResponseCache::new(config.cache_ttl);
        Ok(Self {
            config,
            cache,
            last_request: Mutex::new(None),
        })
    }

    /// Creates a client with the default configuration pointed at another
    /// base URL. Useful for mock servers in tests.
    pub fn with_base_url(base_url: &str) -> Self {
        let config = Config::default().with_base_url(base_url);
        let cache = ResponseCache::new(config.cache_ttl);
        Self {
            config,
            cache,
            last_request: Mutex::new(None),
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Drops every cached GET response.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Issues a GET request to `path` under the configured base URL and
    /// returns the parsed JSON body.
    ///
    /// Successful responses are cached by full URL when caching is enabled.
    pub async fn get(&self, path: &str) -> Result<Value, Error> {
        let url = self.build_url(path)?;
        if self.config.cache_enabled {
            if let Some(body) = self.cache.get(url.as_str()) {
                tracing::debug!("Cache hit for {}", url);
                return Ok(body);
            }
        }
        let body = self.request(Method::GET, &url, None).await?;
        if self.config.cache_enabled {
            self.cache.set(url.to_string(), body.clone());
        }
        Ok(body)
    }

    /// Issues a POST request with a JSON `payload` to `path` under the
    /// configured base URL and returns the parsed JSON body.
    ///
    /// POST responses are never cached.
    pub async fn post(&self, path: &str, payload: &Value) -> Result<Value, Error> {
        let url = self.build_url(path)?;
        self.request(Method::POST, &url, Some(payload)).await
    }

    fn build_url(&self, path: &str) -> Result<Url, Error> {
        Url::parse(&format!("{}{}", self.config.base_url, path)).map_err(|e| {
            tracing::error!("Failed to parse URL: {}", e);
            Error::RequestFailed
        })
    }

    fn http(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .user_agent(self.config.user_agent.as_str())
            .timeout(self.config.timeout)
            .gzip(true)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to create HTTP client: {}", e);
                Error::RequestFailed
            })
    }

    /// Sends the request, retrying retryable failures with exponential
    /// backoff until `max_retries` extra attempts are spent.
    async fn request(
        &self,
        method: Method,
        url: &Url,
        payload: Option<&Value>,
    ) -> Result<Value, Error> {
        let max_attempts = self.config.max_retries + 1;
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.throttle().await;
            match self.send_once(method.clone(), url, payload).await {
                Ok(body) => return Ok(body),
                Err(err) => {
                    if attempt >= max_attempts || !is_retryable(&err) {
                        return Err(err);
                    }
                    let delay = self.retry_delay(attempt);
                    tracing::warn!(
                        "{} request to {} failed (attempt {}/{}), retrying in {:.1}s: {}",
                        method,
                        url,
                        attempt,
                        max_attempts,
                        delay.as_secs_f64(),
                        err
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn send_once(
        &self,
        method: Method,
        url: &Url,
        payload: Option<&Value>,
    ) -> Result<Value, Error> {
        tracing::debug!("{} {}", method, url);
        let http = self.http()?;
        let mut request = http
            .request(method, url.clone())
            .header("Accept", "application/json");
        if let Some(payload) = payload {
            request = request.json(payload);
        }
        let response = request.send().await.map_err(|e| {
            tracing::error!("Request to {} failed: {}", url, e);
            Error::RequestFailed
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::RequestFailed
        })?;
        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }
        let parsed: Value = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse response body: {}", e);
            Error::Api {
                message: format!("invalid JSON response: {e}"),
            }
        })?;
        if let Some(message) = api_error_message(&parsed) {
            tracing::error!("API error response: {}", message);
            return Err(Error::Api { message });
        }
        Ok(parsed)
    }

    /// Sleeps as needed so that request starts are spaced at least
    /// `min_request_interval` apart. Each caller reserves its slot under the
    /// lock and sleeps outside it.
    async fn throttle(&self) {
        let interval = self.config.min_request_interval();
        if interval.is_zero() {
            return;
        }
        let wait = {
            let mut last = self.last_request.lock().await;
            let now = Instant::now();
            match *last {
                Some(previous) => {
                    let scheduled = previous + interval;
                    if scheduled > now {
                        *last = Some(scheduled);
                        Some(scheduled - now)
                    } else {
                        *last = Some(now);
                        None
                    }
                }
                None => {
                    *last = Some(now);
                    None
                }
            }
        };
        if let Some(wait) = wait {
            tokio::time::sleep(wait).await;
        }
    }

    /// Delay before the retry that follows the given 1-based failed attempt.
    /// Doubles per attempt, capped at `max_retry_delay`, with +/-20% jitter.
    fn retry_delay(&self, attempt: u32) -> Duration {
        let shift = (attempt - 1).min(30);
        let base = self
            .config
            .retry_delay
            .saturating_mul(1u32 << shift)
            .min(self.config.max_retry_delay);
        let jitter = rand::thread_rng().gen_range(0.8..1.2);
        base.mul_f64(jitter)
    }
}

/// Transport failures and throttling or server-side statuses are worth
/// retrying; everything else is deterministic.
fn is_retryable(error: &Error) -> bool {
    match error {
        Error::RequestFailed => true,
        Error::HttpStatus { status, .. } => *status == 429 || (500..600).contains(status),
        _ => false,
    }
}

/// Extracts an error message the API placed inside a 2xx body, if any.
fn api_error_message(body: &Value) -> Option<String> {
    let map = body.as_object()?;
    for key in ["error", "message"] {
        if let Some(text) = map.get(key).and_then(Value::as_str) {
            return Some(text.to_string());
        }
    }
    None
}

const MAX_BODY_LENGTH: usize = 2000;

fn truncate_body(body: &str) -> String {
    if body.len() > MAX_BODY_LENGTH {
        let mut end = MAX_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    } else {
        body.to_string()
    }
}
