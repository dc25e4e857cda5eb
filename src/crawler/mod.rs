//! HTTP fetching with rate limiting and retry
//!
//! This module provides the HTTP capability used by both pipeline stages:
//! - User-Agent rotation
//! - Rate limiting with governor
//! - Automatic retry with exponential backoff
//!
//! A single fetcher is constructed per run and passed by reference into the
//! stages that need it.

pub mod details;

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use rand::seq::SliceRandom;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT},
    Client,
};
use std::num::NonZeroU32;
use std::time::Duration;

use crate::error::FetchError;

/// Pool of realistic User-Agent strings for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// Program page fetcher
///
/// Handles the transport concerns of fetching SIAM meeting pages: rate
/// limiting, retry logic and polite browser headers.
pub struct ProgramFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Rate limiter to control request frequency
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    /// Maximum number of retry attempts for failed requests
    max_retries: u32,

    /// Base delay in milliseconds for exponential backoff
    base_delay_ms: u64,

    /// Optional base URL override for testing with mock servers
    base_url: Option<String>,
}

impl ProgramFetcher {
    /// Create a new fetcher with default settings
    ///
    /// # Arguments
    ///
    /// * `requests_per_second` - Maximum number of requests per second
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(requests_per_second: u32) -> Result<Self, FetchError> {
        Self::with_config(requests_per_second, 3, Duration::from_secs(30))
    }

    /// Create a new fetcher with custom configuration
    ///
    /// # Arguments
    ///
    /// * `requests_per_second` - Maximum number of requests per second
    /// * `max_retries` - Maximum number of retry attempts
    /// * `timeout` - Request timeout duration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_config(
        requests_per_second: u32,
        max_retries: u32,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .cookie_store(true)
            .build()?;

        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::new(1).unwrap());
        let quota = Quota::per_second(rate);
        let rate_limiter = RateLimiter::direct(quota);

        Ok(Self {
            client,
            rate_limiter,
            max_retries,
            base_delay_ms: 1000,
            base_url: None,
        })
    }

    /// Create a new fetcher with a custom base URL for testing
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_base_url(base_url: &str, requests_per_second: u32) -> Result<Self, FetchError> {
        let mut fetcher = Self::new(requests_per_second)?;
        fetcher.base_url = Some(base_url.to_string());
        Ok(fetcher)
    }

    /// Create a new fetcher with custom config and base URL for testing
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_config_and_base_url(
        base_url: &str,
        requests_per_second: u32,
        max_retries: u32,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let mut fetcher = Self::with_config(requests_per_second, max_retries, timeout)?;
        fetcher.base_url = Some(base_url.to_string());
        Ok(fetcher)
    }

    /// Fetch a page with rate limiting and retry
    ///
    /// This is the entry point for all page fetches. Transport failures
    /// surface as a single `FetchError` after the retry budget is spent.
    ///
    /// # Errors
    ///
    /// Returns various `FetchError` variants depending on the failure mode
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        // Wait for rate limiter
        self.rate_limiter.until_ready().await;

        self.fetch_with_retry(url).await
    }

    /// Fetch with exponential backoff retry logic
    async fn fetch_with_retry(&self, url: &str) -> Result<String, FetchError> {
        let mut last_error = FetchError::MaxRetriesExceeded;

        for attempt in 0..=self.max_retries {
            // Apply exponential backoff for retries
            if attempt > 0 {
                let delay = self.base_delay_ms * 2_u64.pow(attempt - 1);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            let headers = self.build_headers();

            // Construct full URL
            let full_url = if let Some(base) = &self.base_url {
                format!("{base}{url}")
            } else {
                url.to_string()
            };

            match self.client.get(&full_url).headers(headers).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return Ok(response.text().await?);
                    } else if Self::should_retry(status.as_u16()) {
                        last_error = FetchError::ServerError(status.as_u16());
                        continue;
                    } else {
                        // Non-retryable error
                        return Err(FetchError::ServerError(status.as_u16()));
                    }
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error = FetchError::Timeout;
                    } else {
                        last_error = FetchError::Http(e);
                    }
                }
            }
        }

        tracing::debug!(url, error = %last_error, "Retry budget exhausted");
        Err(FetchError::MaxRetriesExceeded)
    }

    /// Determine if a status code should trigger a retry
    ///
    /// Retry on 429 and transient 5xx; anything else fails immediately.
    fn should_retry(status: u16) -> bool {
        matches!(status, 429 | 500 | 502 | 503 | 504)
    }

    /// Build HTTP headers with a rotated user agent
    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let user_agent = self.random_user_agent();
        headers.insert(USER_AGENT, HeaderValue::from_static(user_agent));

        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );

        headers
    }

    /// Get a random user agent from the pool
    fn random_user_agent(&self) -> &'static str {
        let mut rng = rand::thread_rng();
        USER_AGENTS.choose(&mut rng).unwrap_or(&USER_AGENTS[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_rotation() {
        let fetcher = ProgramFetcher::new(10).unwrap();

        let mut agents = std::collections::HashSet::new();
        for _ in 0..100 {
            let agent = fetcher.random_user_agent();
            assert!(USER_AGENTS.contains(&agent));
            agents.insert(agent);
        }

        // With 100 draws from a pool of 4, repetition of a single agent
        // would be vanishingly unlikely
        assert!(agents.len() > 1, "User agents should rotate");
    }

    #[test]
    fn test_should_retry() {
        assert!(ProgramFetcher::should_retry(429));
        assert!(ProgramFetcher::should_retry(500));
        assert!(ProgramFetcher::should_retry(502));
        assert!(ProgramFetcher::should_retry(503));
        assert!(ProgramFetcher::should_retry(504));

        assert!(!ProgramFetcher::should_retry(400));
        assert!(!ProgramFetcher::should_retry(401));
        assert!(!ProgramFetcher::should_retry(403));
        assert!(!ProgramFetcher::should_retry(404));
        assert!(!ProgramFetcher::should_retry(200));
    }

    #[test]
    fn test_fetcher_creation() {
        assert!(ProgramFetcher::new(10).is_ok());
        assert!(ProgramFetcher::with_config(5, 3, Duration::from_secs(10)).is_ok());
    }

    #[test]
    fn test_fetcher_with_base_url() {
        let fetcher = ProgramFetcher::with_base_url("http://localhost:8080", 10).unwrap();
        assert_eq!(fetcher.base_url, Some("http://localhost:8080".to_string()));
    }

    #[test]
    fn test_build_headers() {
        let fetcher = ProgramFetcher::new(10).unwrap();
        let headers = fetcher.build_headers();

        assert!(headers.contains_key(USER_AGENT));
        assert!(headers.contains_key(ACCEPT));
        assert!(headers.contains_key(ACCEPT_LANGUAGE));
    }
}
