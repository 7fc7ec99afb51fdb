//! Upstream snapshot fetcher
//!
//! One HTTP GET per data source, rate limited with governor and bounded by a
//! request timeout. The fetcher only decodes; it never touches the baseline.
//!
//! Failures are returned as [`FetchError`] and are not retried here: the next
//! scheduled cycle is the retry.

use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT},
    Client, Response,
};
use serde_json::Value;
use std::num::NonZeroU32;
use std::time::Duration;

use crate::models::{parse_weather, StockSnapshot, WeatherOccurrence};
use crate::utils::error::FetchError;
use crate::utils::truncate_text;

const DEFAULT_USER_AGENT: &str = concat!("gardenwatch/", env!("CARGO_PKG_VERSION"));

/// Source of upstream snapshots
///
/// Implemented by [`ApiFetcher`] for the live API; tests supply canned data.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch the stock endpoint (all stock categories plus the announcement)
    async fn fetch_stock(&self) -> Result<StockSnapshot, FetchError>;

    /// Fetch the weather endpoint
    async fn fetch_weather(&self) -> Result<Vec<WeatherOccurrence>, FetchError>;
}

/// HTTP fetcher for the game-state API
#[derive(Debug)]
pub struct ApiFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Rate limiter shared by both endpoints
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    stock_url: String,
    weather_url: String,
}

impl ApiFetcher {
    /// Create a fetcher with a 10 second timeout and 2 requests per second
    pub fn new(stock_url: &str, weather_url: &str) -> Result<Self, FetchError> {
        Self::with_config(stock_url, weather_url, 2, Duration::from_secs(10))
    }

    /// Create a fetcher with custom limits
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` for a URL that does not parse, and
    /// `FetchError::Http` if the HTTP client cannot be created
    pub fn with_config(
        stock_url: &str,
        weather_url: &str,
        requests_per_second: u32,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        for url in [stock_url, weather_url] {
            reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
        }

        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .default_headers(Self::build_headers())
            .build()?;

        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
            stock_url: stock_url.to_string(),
            weather_url: weather_url.to_string(),
        })
    }

    /// Stock endpoint URL
    pub fn stock_url(&self) -> &str {
        &self.stock_url
    }

    /// Weather endpoint URL
    pub fn weather_url(&self) -> &str {
        &self.weather_url
    }

    /// GET a URL and decode the body as JSON
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        self.rate_limiter.until_ready().await;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        Self::decode_json(response).await
    }

    /// Decode a response body, rejecting anything not labelled as JSON
    async fn decode_json(response: Response) -> Result<Value, FetchError> {
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Http(e)
            }
        })?;

        if !Self::is_json(&content_type) {
            return Err(FetchError::NotJson {
                content_type,
                preview: truncate_text(&String::from_utf8_lossy(&bytes), 200),
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| FetchError::Malformed(e.to_string()))
    }

    fn is_json(content_type: &str) -> bool {
        content_type
            .split(';')
            .next()
            .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
            .unwrap_or(false)
    }

    fn build_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }
}

#[async_trait]
impl SnapshotSource for ApiFetcher {
    async fn fetch_stock(&self) -> Result<StockSnapshot, FetchError> {
        let raw = self.get_json(&self.stock_url).await?;
        let snapshot = StockSnapshot::from_value(raw)?;
        tracing::debug!(
            categories = snapshot.categories.len(),
            announcement = snapshot.announcement.is_some(),
            "Stock snapshot fetched"
        );
        Ok(snapshot)
    }

    async fn fetch_weather(&self) -> Result<Vec<WeatherOccurrence>, FetchError> {
        let raw = self.get_json(&self.weather_url).await?;
        let weather = parse_weather(raw)?;
        tracing::debug!(entries = weather.len(), "Weather snapshot fetched");
        Ok(weather)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_json() {
        assert!(ApiFetcher::is_json("application/json"));
        assert!(ApiFetcher::is_json("application/json; charset=utf-8"));
        assert!(ApiFetcher::is_json("Application/JSON"));
        assert!(!ApiFetcher::is_json("text/html; charset=utf-8"));
        assert!(!ApiFetcher::is_json(""));
    }

    #[test]
    fn test_fetcher_creation() {
        let fetcher = ApiFetcher::new("http://localhost:8080/stock", "http://localhost:8080/weather");
        assert!(fetcher.is_ok());

        let fetcher = fetcher.unwrap();
        assert_eq!(fetcher.stock_url(), "http://localhost:8080/stock");
        assert_eq!(fetcher.weather_url(), "http://localhost:8080/weather");
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = ApiFetcher::new("not a url", "http://localhost/weather");
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }

    #[test]
    fn test_build_headers() {
        let headers = ApiFetcher::build_headers();
        assert!(headers.contains_key(USER_AGENT));
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
    }
}
