//! Web crawler with per-domain rate limiting

use reqwest::blocking::Client;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::application::errors::TrendError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const WINDOW: Duration = Duration::from_secs(60);

/// Rate limiter for domains
pub struct RateLimiter {
    requests: Mutex<HashMap<String, Vec<Instant>>>,
    min_interval: Duration,
    max_per_minute: u32,
}

impl RateLimiter {
    pub fn new(min_interval_ms: u64, max_per_minute: u32) -> Self {
        Self {
            requests: Mutex::new(HashMap::new()),
            min_interval: Duration::from_millis(min_interval_ms),
            max_per_minute: max_per_minute.max(1),
        }
    }

    /// How long to wait before the next request to `domain` at `now`.
    /// Records the request when no wait is needed.
    pub fn try_acquire(&self, domain: &str, now: Instant) -> Option<Duration> {
        let mut requests = self.requests.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let times = requests.entry(domain.to_string()).or_default();

        times.retain(|t| now.saturating_duration_since(*t) < WINDOW);

        if let Some(last) = times.last() {
            let since_last = now.saturating_duration_since(*last);
            if since_last < self.min_interval {
                return Some(self.min_interval - since_last);
            }
        }

        if times.len() >= self.max_per_minute as usize {
            if let Some(oldest) = times.first() {
                return Some(WINDOW.saturating_sub(now.saturating_duration_since(*oldest)));
            }
        }

        times.push(now);
        None
    }

    /// Block until a request to this domain is allowed
    pub fn wait_for(&self, domain: &str) {
        while let Some(wait) = self.try_acquire(domain, Instant::now()) {
            tracing::debug!("Rate limited on {}, sleeping {:?}", domain, wait);
            std::thread::sleep(wait);
        }
    }
}

/// Blocking HTML fetcher used by the trend collector
pub struct WebCrawler {
    client: Client,
    rate_limiter: RateLimiter,
}

impl WebCrawler {
    pub fn new(rate_limit_ms: u64, max_per_minute: u32) -> Result<Self, TrendError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TrendError::Request(e.to_string()))?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(rate_limit_ms, max_per_minute),
        })
    }

    /// Fetch a page's HTML with rate limiting
    pub fn fetch(&self, url: &str) -> Result<String, TrendError> {
        let domain = extract_domain(url)?;
        self.rate_limiter.wait_for(&domain);

        let response = self.client
            .get(url)
            .header("Accept", "text/html,application/xhtml+xml")
            .send()
            .map_err(|e| TrendError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TrendError::Http(format!("{} returned {}", url, response.status())));
        }

        response.text().map_err(|e| TrendError::Request(e.to_string()))
    }
}

/// Extract domain from URL
pub(crate) fn extract_domain(url: &str) -> Result<String, TrendError> {
    url.split('/')
        .nth(2)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .ok_or_else(|| TrendError::InvalidUrl(url.to_string()))
}
