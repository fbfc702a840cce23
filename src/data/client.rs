//! NewsData.io client with cache-first reads and rate-limit fallback
//!
//! Every endpoint follows the same policy:
//! - first pages are served from a fresh cache entry when one exists
//! - otherwise the upstream `latest` endpoint is queried with a rotated search phrase
//! - first-page results are written back to the cache
//! - on HTTP 429 an expired cache entry for the same key is served instead
//!
//! Failures never escape as errors. Each call returns an `ApiResponse` whose
//! status and message describe what went wrong.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::normalize::normalize_results;
use super::queries::{category_query, region_query};
use super::taxonomy::{
    categories_response, get_region_by_code, regions_response, ALL_REGIONS_CODE,
};
use super::{ApiResponse, Article, Category, Origin, Region};
use crate::cache::{CacheDuration, CacheManager};

/// Base URL for the NewsData.io API
pub const NEWSDATA_BASE_URL: &str = "https://newsdata.io/api/1";

/// Largest page size the upstream accepts
pub const MAX_PAGE_SIZE: u32 = 10;

/// Default page size for listings
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Default timeout for outbound requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const COUNTRY: &str = "in";
const LANGUAGE: &str = "en";

const BREAKING_QUERY: &str = "breaking news India";
const BREAKING_SIZE: u32 = 5;

/// Message used when stale data is served because of a 429
pub const STALE_CACHE_MESSAGE: &str = "Loaded from expired cache due to rate limit";

const RATE_LIMITED: u16 = 429;
const INTERNAL_ERROR: u16 = 500;

/// Errors that can occur when talking to the upstream API
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The API answered with a non-success status
    #[error("Upstream returned HTTP {status}")]
    Status { status: u16, message: Option<String> },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse API response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// A success response carried no `results`
    #[error("API response has no results")]
    MissingResults,

    /// A success response whose `results` is not an array
    #[error("API response results is {found}, expected an array")]
    UnexpectedShape { found: &'static str },
}

impl UpstreamError {
    /// HTTP status reported by the upstream, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            UpstreamError::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            UpstreamError::ParseError(_)
            | UpstreamError::MissingResults
            | UpstreamError::UnexpectedShape { .. } => None,
        }
    }

    /// Error message from the upstream response body, if any
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            UpstreamError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Whether the upstream is rate limiting us
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(RATE_LIMITED)
    }
}

/// Parameters of one call to the upstream `latest` endpoint
///
/// Country, language and API key are added by the source itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatestQuery {
    /// Search phrase
    pub q: Option<String>,
    /// Page size
    pub size: Option<u32>,
}

/// Something that can answer `latest` queries with raw upstream records
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Returns the raw `results` array for the query
    async fn latest(&self, query: &LatestQuery) -> Result<Vec<Value>, UpstreamError>;
}

/// Settings for the HTTP source
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Config for the public API with the default timeout
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: NEWSDATA_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// `NewsSource` backed by the NewsData.io HTTP API
#[derive(Debug, Clone)]
pub struct HttpNewsSource {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl HttpNewsSource {
    /// Creates a source with the configured timeout
    pub fn new(config: &ClientConfig) -> Result<Self, UpstreamError> {
        let http_client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn params(&self, query: &LatestQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("apikey", self.api_key.clone()),
            ("country", COUNTRY.to_string()),
            ("language", LANGUAGE.to_string()),
        ];
        if let Some(size) = query.size {
            params.push(("size", size.to_string()));
        }
        if let Some(q) = &query.q {
            params.push(("q", q.clone()));
        }
        params
    }
}

/// Extracts an error message from an upstream error body
///
/// NewsData.io reports errors either as `{"message": ...}` or as
/// `{"status": "error", "results": {"message": ...}}`.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("results").and_then(|r| r.get("message")))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl NewsSource for HttpNewsSource {
    async fn latest(&self, query: &LatestQuery) -> Result<Vec<Value>, UpstreamError> {
        let url = format!("{}/latest", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .query(&self.params(query))
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let body: Value = serde_json::from_str(&text)?;
        match body.get("results") {
            Some(Value::Array(results)) => Ok(results.clone()),
            None | Some(Value::Null) => Err(UpstreamError::MissingResults),
            Some(other) => Err(UpstreamError::UnexpectedShape {
                found: json_kind(other),
            }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Messages reported by one endpoint
struct Messages {
    cached: &'static str,
    fetched: &'static str,
    failed: &'static str,
}

/// Everything the shared fetch path needs to know about one call
struct Endpoint {
    name: &'static str,
    /// `None` for endpoints that never touch the cache
    cache_key: Option<String>,
    /// Only first pages are read from and written to the cache
    first_page: bool,
    ttl: CacheDuration,
    query: LatestQuery,
    /// Flags articles as breaking and tolerates a missing `results`
    breaking: bool,
    messages: Messages,
}

/// Appends the region's lower-cased name to a query, unless the region is
/// "all" or unknown
pub fn bias_for_region(query: &str, region: Option<&str>) -> String {
    match region
        .filter(|code| *code != ALL_REGIONS_CODE)
        .and_then(get_region_by_code)
    {
        Some(region) => format!("{} {}", query, region.name.to_lowercase()),
        None => query.to_string(),
    }
}

fn clamp_size(size: u32) -> u32 {
    size.clamp(1, MAX_PAGE_SIZE)
}

/// Client for the news endpoints
#[derive(Debug, Clone)]
pub struct NewsClient<S = HttpNewsSource> {
    source: S,
    cache_manager: Option<CacheManager>,
}

impl<S: NewsSource> NewsClient<S> {
    /// Creates a client over any source, with or without a cache
    pub fn new(source: S, cache_manager: Option<CacheManager>) -> Self {
        Self {
            source,
            cache_manager,
        }
    }

    /// The upstream source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The cache, if one is configured
    pub fn cache(&self) -> Option<&CacheManager> {
        self.cache_manager.as_ref()
    }

    /// Lists the selectable regions
    pub fn regions(&self) -> ApiResponse<Vec<Region>> {
        regions_response()
    }

    /// Lists the news categories
    pub fn categories(&self) -> ApiResponse<Vec<Category>> {
        categories_response()
    }

    /// Fetches news for a region code
    pub async fn news_by_region(
        &self,
        region: &str,
        page: u32,
        size: u32,
    ) -> ApiResponse<Vec<Article>> {
        let page = page.max(1);
        self.execute(Endpoint {
            name: "region",
            cache_key: Some(format!("news-region-{}-page-{}", region, page)),
            first_page: page == 1,
            ttl: CacheDuration::Medium,
            query: LatestQuery {
                q: Some(region_query(region, page).to_string()),
                size: Some(clamp_size(size)),
            },
            breaking: false,
            messages: Messages {
                cached: "News loaded from cache",
                fetched: "News fetched successfully",
                failed: "Failed to fetch news",
            },
        })
        .await
    }

    /// Fetches news for a category slug
    pub async fn news_by_category(
        &self,
        category: &str,
        page: u32,
        size: u32,
    ) -> ApiResponse<Vec<Article>> {
        let page = page.max(1);
        self.execute(Endpoint {
            name: "category",
            cache_key: Some(format!("news-category-{}-page-{}", category, page)),
            first_page: page == 1,
            ttl: CacheDuration::Medium,
            query: LatestQuery {
                q: Some(category_query(category, page).to_string()),
                size: Some(clamp_size(size)),
            },
            breaking: false,
            messages: Messages {
                cached: "Category news loaded from cache",
                fetched: "Category news fetched successfully",
                failed: "Failed to fetch category news",
            },
        })
        .await
    }

    /// Fetches a category's news biased toward a region
    pub async fn news_by_region_and_category(
        &self,
        region: &str,
        category: &str,
        page: u32,
        size: u32,
    ) -> ApiResponse<Vec<Article>> {
        let page = page.max(1);
        self.execute(Endpoint {
            name: "region-category",
            cache_key: Some(format!(
                "news-region-{}-category-{}-page-{}",
                region, category, page
            )),
            first_page: page == 1,
            ttl: CacheDuration::Medium,
            query: LatestQuery {
                q: Some(bias_for_region(category_query(category, page), Some(region))),
                size: Some(clamp_size(size)),
            },
            breaking: false,
            messages: Messages {
                cached: "Regional category news loaded from cache",
                fetched: "Regional category news fetched successfully",
                failed: "Failed to fetch regional category news",
            },
        })
        .await
    }

    /// Fetches breaking news; articles are flagged as breaking
    pub async fn breaking_news(&self) -> ApiResponse<Vec<Article>> {
        self.execute(Endpoint {
            name: "breaking",
            cache_key: Some("news-breaking".to_string()),
            first_page: true,
            ttl: CacheDuration::Short,
            query: LatestQuery {
                q: Some(BREAKING_QUERY.to_string()),
                size: Some(BREAKING_SIZE),
            },
            breaking: true,
            messages: Messages {
                cached: "Breaking news loaded from cache",
                fetched: "Breaking news fetched successfully",
                failed: "Failed to fetch breaking news",
            },
        })
        .await
    }

    /// Fetches the latest unfiltered headlines
    pub async fn featured_news(&self, limit: u32) -> ApiResponse<Vec<Article>> {
        self.execute(Endpoint {
            name: "featured",
            cache_key: Some(format!("news-featured-{}", limit)),
            first_page: true,
            ttl: CacheDuration::Medium,
            query: LatestQuery {
                q: None,
                size: Some(clamp_size(limit)),
            },
            breaking: false,
            messages: Messages {
                cached: "Featured news loaded from cache",
                fetched: "Featured news fetched successfully",
                failed: "Failed to fetch featured news",
            },
        })
        .await
    }

    /// Free-text search, optionally biased toward a region
    ///
    /// Search results are never cached and have no rate-limit fallback.
    pub async fn search_news(
        &self,
        query: &str,
        region: Option<&str>,
    ) -> ApiResponse<Vec<Article>> {
        self.execute(Endpoint {
            name: "search",
            cache_key: None,
            first_page: false,
            ttl: CacheDuration::Medium,
            query: LatestQuery {
                q: Some(bias_for_region(query, region)),
                size: None,
            },
            breaking: false,
            messages: Messages {
                cached: "",
                fetched: "Search completed successfully",
                failed: "Failed to search news",
            },
        })
        .await
    }

    /// Reads a non-empty article list from the cache
    fn cached(&self, key: &str, ignore_expiration: bool) -> Option<Vec<Article>> {
        self.cache_manager
            .as_ref()?
            .get::<Vec<Article>>(key, ignore_expiration)
            .filter(|articles| !articles.is_empty())
    }

    async fn execute(&self, endpoint: Endpoint) -> ApiResponse<Vec<Article>> {
        let key = endpoint.cache_key.as_deref();

        if let (true, Some(key)) = (endpoint.first_page, key) {
            if let Some(articles) = self.cached(key, false) {
                debug!(endpoint = endpoint.name, key, count = articles.len(), "Cache hit");
                return ApiResponse::ok(articles, endpoint.messages.cached, Origin::Cache);
            }
        }

        let fetched = match self.source.latest(&endpoint.query).await {
            Err(UpstreamError::MissingResults) if endpoint.breaking => Ok(Vec::new()),
            other => other,
        };

        match fetched {
            Ok(results) => {
                let mut articles = normalize_results(&results);
                if endpoint.breaking {
                    for article in &mut articles {
                        article.is_breaking = true;
                    }
                }

                if let (true, Some(key), Some(cache)) =
                    (endpoint.first_page, key, self.cache_manager.as_ref())
                {
                    cache.save(key, &articles, endpoint.ttl.as_duration());
                }

                info!(
                    endpoint = endpoint.name,
                    q = endpoint.query.q.as_deref(),
                    count = articles.len(),
                    "Fetched news"
                );
                ApiResponse::ok(articles, endpoint.messages.fetched, Origin::Network)
            }
            Err(error) => {
                if let (true, Some(key)) = (error.is_rate_limited(), key) {
                    warn!(
                        endpoint = endpoint.name,
                        key,
                        "Rate limit exceeded (429), trying expired cache"
                    );
                    if let Some(articles) = self.cached(key, true) {
                        info!(
                            endpoint = endpoint.name,
                            key,
                            count = articles.len(),
                            "Serving expired cache"
                        );
                        return ApiResponse::ok(articles, STALE_CACHE_MESSAGE, Origin::StaleCache);
                    }
                }

                warn!(endpoint = endpoint.name, error = %error, "Error fetching news");
                ApiResponse::failure(
                    error.upstream_message().unwrap_or(endpoint.messages.failed),
                    error.status().unwrap_or(INTERNAL_ERROR),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::thread;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Source that replays scripted responses and records every query
    #[derive(Default)]
    struct FakeSource {
        responses: Mutex<VecDeque<Result<Vec<Value>, UpstreamError>>>,
        calls: Mutex<Vec<LatestQuery>>,
    }

    impl FakeSource {
        fn with(responses: Vec<Result<Vec<Value>, UpstreamError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<LatestQuery> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NewsSource for FakeSource {
        async fn latest(&self, query: &LatestQuery) -> Result<Vec<Value>, UpstreamError> {
            self.calls.lock().unwrap().push(query.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn records(ids: &[&str]) -> Vec<Value> {
        ids.iter()
            .map(|id| json!({ "article_id": id, "title": format!("Story {id}") }))
            .collect()
    }

    fn status(status: u16, message: Option<&str>) -> UpstreamError {
        UpstreamError::Status {
            status,
            message: message.map(str::to_string),
        }
    }

    fn client_with(
        responses: Vec<Result<Vec<Value>, UpstreamError>>,
    ) -> (NewsClient<FakeSource>, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheManager::with_dir(temp_dir.path().to_path_buf());
        (NewsClient::new(FakeSource::with(responses), Some(cache)), temp_dir)
    }

    fn ids(response: &ApiResponse<Vec<Article>>) -> Vec<&str> {
        response.data.iter().map(|a| a.id.as_str()).collect()
    }

    /// Writes an already-expired cache entry
    fn seed_expired(client: &NewsClient<FakeSource>, key: &str, ids: &[&str]) {
        let articles = normalize_results(&records(ids));
        client
            .cache()
            .unwrap()
            .write(key, &articles, Duration::ZERO)
            .unwrap();
        thread::sleep(Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_first_page_is_fetched_then_served_from_cache() {
        let (client, _temp_dir) = client_with(vec![Ok(records(&["A1", "A2"]))]);

        let first = client.news_by_region("punjab", 1, 10).await;
        assert_eq!(first.status, 200);
        assert_eq!(first.origin, Origin::Network);
        assert_eq!(first.message, "News fetched successfully");
        assert_eq!(ids(&first), vec!["A1", "A2"]);

        let second = client.news_by_region("punjab", 1, 10).await;
        assert_eq!(second.origin, Origin::Cache);
        assert_eq!(second.message, "News loaded from cache");
        assert_eq!(ids(&second), vec!["A1", "A2"]);

        assert_eq!(client.source().calls().len(), 1, "Cache hit must skip the network");
    }

    #[tokio::test]
    async fn test_later_pages_are_never_cached() {
        let (client, temp_dir) =
            client_with(vec![Ok(records(&["B1"])), Ok(records(&["B2"]))]);

        client.news_by_category("sports", 2, 10).await;
        let again = client.news_by_category("sports", 2, 10).await;

        assert_eq!(again.origin, Origin::Network);
        assert_eq!(ids(&again), vec!["B2"]);
        assert_eq!(client.source().calls().len(), 2);
        assert!(!temp_dir.path().join("news-category-sports-page-2.json").exists());
    }

    #[tokio::test]
    async fn test_pages_rotate_the_search_phrase() {
        let (client, _temp_dir) = client_with(vec![]);

        client.news_by_region("punjab", 1, 10).await;
        client.news_by_region("punjab", 2, 10).await;
        client.news_by_category("entertainment", 2, 10).await;

        let queries: Vec<_> = client
            .source()
            .calls()
            .into_iter()
            .map(|c| c.q.unwrap())
            .collect();
        assert_eq!(queries, vec!["Punjab", "Punjab news", "Bollywood"]);
    }

    #[tokio::test]
    async fn test_page_size_is_capped() {
        let (client, _temp_dir) = client_with(vec![]);

        client.news_by_region("delhi", 1, 50).await;
        client.featured_news(25).await;

        let sizes: Vec<_> = client.source().calls().iter().map(|c| c.size).collect();
        assert_eq!(sizes, vec![Some(10), Some(10)]);
    }

    #[tokio::test]
    async fn test_rate_limit_serves_expired_cache() {
        let (client, _temp_dir) = client_with(vec![Err(status(429, None))]);
        seed_expired(&client, "news-region-kerala-page-1", &["OLD1", "OLD2"]);

        let response = client.news_by_region("kerala", 1, 10).await;

        assert_eq!(response.status, 200);
        assert_eq!(response.origin, Origin::StaleCache);
        assert_eq!(response.message, STALE_CACHE_MESSAGE);
        assert_eq!(ids(&response), vec!["OLD1", "OLD2"]);
        assert_eq!(client.source().calls().len(), 1, "Expired entry must not short-circuit");
    }

    #[tokio::test]
    async fn test_rate_limit_without_cache_soft_fails() {
        let (client, _temp_dir) =
            client_with(vec![Err(status(429, Some("Rate limit exceeded")))]);

        let response = client.news_by_category("politics", 1, 10).await;

        assert!(response.data.is_empty());
        assert_eq!(response.status, 429);
        assert_eq!(response.message, "Rate limit exceeded");
        assert_eq!(response.origin, Origin::None);
    }

    #[tokio::test]
    async fn test_other_errors_do_not_use_stale_cache() {
        let (client, _temp_dir) = client_with(vec![Err(status(503, None))]);
        seed_expired(&client, "news-breaking", &["OLD"]);

        let response = client.breaking_news().await;

        assert!(response.data.is_empty());
        assert_eq!(response.status, 503);
        assert_eq!(response.message, "Failed to fetch breaking news");
    }

    #[tokio::test]
    async fn test_errors_without_status_map_to_500() {
        let parse_error = serde_json::from_str::<Value>("{").unwrap_err();
        let (client, _temp_dir) = client_with(vec![Err(UpstreamError::ParseError(parse_error))]);

        let response = client.featured_news(10).await;

        assert_eq!(response.status, 500);
        assert_eq!(response.message, "Failed to fetch featured news");
    }

    #[tokio::test]
    async fn test_missing_results_fails_except_for_breaking() {
        let (client, temp_dir) = client_with(vec![
            Err(UpstreamError::MissingResults),
            Err(UpstreamError::MissingResults),
        ]);

        let region = client.news_by_region("delhi", 1, 10).await;
        assert!(region.data.is_empty());
        assert_eq!(region.status, 500);
        assert_eq!(region.message, "Failed to fetch news");
        assert!(!temp_dir.path().join("news-region-delhi-page-1.json").exists());

        let breaking = client.breaking_news().await;
        assert!(breaking.data.is_empty());
        assert_eq!(breaking.status, 200);
        assert_eq!(breaking.message, "Breaking news fetched successfully");
    }

    #[tokio::test]
    async fn test_empty_cached_list_counts_as_miss() {
        let (client, _temp_dir) = client_with(vec![Ok(vec![]), Ok(records(&["N1"]))]);

        let empty = client.news_by_region("mumbai", 1, 10).await;
        assert!(empty.data.is_empty());

        let refetched = client.news_by_region("mumbai", 1, 10).await;
        assert_eq!(refetched.origin, Origin::Network);
        assert_eq!(ids(&refetched), vec!["N1"]);
    }

    #[tokio::test]
    async fn test_breaking_news_is_flagged_and_cached() {
        let (client, temp_dir) = client_with(vec![Ok(records(&["BR1"]))]);

        let response = client.breaking_news().await;

        assert!(response.data.iter().all(|a| a.is_breaking));
        let call = &client.source().calls()[0];
        assert_eq!(call.q.as_deref(), Some("breaking news India"));
        assert_eq!(call.size, Some(5));
        assert!(temp_dir.path().join("news-breaking.json").exists());
    }

    #[tokio::test]
    async fn test_featured_news_sends_no_query() {
        let (client, temp_dir) = client_with(vec![Ok(records(&["F1"]))]);

        client.featured_news(6).await;

        let call = &client.source().calls()[0];
        assert!(call.q.is_none());
        assert_eq!(call.size, Some(6));
        assert!(temp_dir.path().join("news-featured-6.json").exists());
    }

    #[tokio::test]
    async fn test_search_appends_region_name() {
        let (client, _temp_dir) = client_with(vec![]);

        client.search_news("floods", Some("kerala")).await;
        client.search_news("floods", Some("all")).await;
        client.search_news("floods", Some("atlantis")).await;
        client.search_news("floods", None).await;

        let queries: Vec<_> = client
            .source()
            .calls()
            .into_iter()
            .map(|c| c.q.unwrap())
            .collect();
        assert_eq!(queries, vec!["floods kerala", "floods", "floods", "floods"]);
        assert!(client.source().calls().iter().all(|c| c.size.is_none()));
    }

    #[tokio::test]
    async fn test_search_is_not_cached_and_has_no_fallback() {
        let (client, temp_dir) =
            client_with(vec![Ok(records(&["S1"])), Err(status(429, None))]);

        let ok = client.search_news("cricket", None).await;
        assert_eq!(ok.message, "Search completed successfully");

        let limited = client.search_news("cricket", None).await;
        assert!(limited.data.is_empty());
        assert_eq!(limited.status, 429);
        assert_eq!(limited.message, "Failed to search news");
        assert_eq!(std::fs::read_dir(temp_dir.path()).map(|d| d.count()).unwrap_or(0), 0);
    }

    #[tokio::test]
    async fn test_region_and_category_key_and_query() {
        let (client, temp_dir) = client_with(vec![Ok(records(&["RC1"]))]);

        let response = client.news_by_region_and_category("punjab", "sports", 1, 10).await;

        assert_eq!(response.message, "Regional category news fetched successfully");
        assert_eq!(
            client.source().calls()[0].q.as_deref(),
            Some("sports India punjab")
        );
        assert!(temp_dir
            .path()
            .join("news-region-punjab-category-sports-page-1.json")
            .exists());
    }

    #[tokio::test]
    async fn test_client_without_cache_always_fetches() {
        let client = NewsClient::new(
            FakeSource::with(vec![Ok(records(&["X"])), Ok(records(&["Y"]))]),
            None,
        );

        client.news_by_region("in", 1, 10).await;
        let second = client.news_by_region("in", 1, 10).await;

        assert_eq!(second.origin, Origin::Network);
        assert_eq!(client.source().calls().len(), 2);
    }

    #[test]
    fn test_static_tables_in_envelope() {
        let client = NewsClient::new(FakeSource::default(), None);

        assert_eq!(client.regions().data.len(), 6);
        assert_eq!(client.categories().data.len(), 7);
        assert_eq!(client.regions().status, 200);
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"message":"Too many"}"#).as_deref(), Some("Too many"));
        assert_eq!(
            error_message(r#"{"status":"error","results":{"message":"Bad key","code":"Unauthorized"}}"#)
                .as_deref(),
            Some("Bad key")
        );
        assert_eq!(error_message("<html>"), None);
    }

    /// Serves one canned HTTP response and returns the request line it saw
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string()
        });

        (base_url, handle)
    }

    fn http_source(base_url: String) -> HttpNewsSource {
        HttpNewsSource::new(&ClientConfig::new("KEY").with_base_url(base_url)).unwrap()
    }

    #[tokio::test]
    async fn test_http_source_sends_expected_parameters() {
        let (base_url, handle) =
            serve_once("200 OK", r#"{"status":"success","results":[{"article_id":"H1"}]}"#).await;
        let source = http_source(base_url);

        let results = source
            .latest(&LatestQuery {
                q: Some("Punjab news".to_string()),
                size: Some(10),
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        let request_line = handle.await.unwrap();
        assert!(request_line.starts_with("GET /latest?"));
        assert!(request_line.contains("apikey=KEY"));
        assert!(request_line.contains("country=in"));
        assert!(request_line.contains("language=en"));
        assert!(request_line.contains("size=10"));
        assert!(request_line.contains("q=Punjab+news"));
    }

    #[tokio::test]
    async fn test_http_source_reports_rate_limit() {
        let (base_url, handle) = serve_once(
            "429 Too Many Requests",
            r#"{"status":"error","results":{"message":"Rate limit exceeded"}}"#,
        )
        .await;
        let source = http_source(base_url);

        let error = source.latest(&LatestQuery::default()).await.unwrap_err();

        assert!(error.is_rate_limited());
        assert_eq!(error.upstream_message(), Some("Rate limit exceeded"));
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_http_source_rejects_non_array_results() {
        let (base_url, handle) = serve_once(
            "200 OK",
            r#"{"status":"error","results":{"message":"Query too long"}}"#,
        )
        .await;
        let source = http_source(base_url);
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheManager::with_dir(temp_dir.path().to_path_buf());
        let stale = normalize_results(&records(&["GOOD1", "GOOD2"]));
        cache
            .write("news-region-kerala-page-1", &stale, Duration::ZERO)
            .unwrap();
        thread::sleep(Duration::from_millis(10));
        let client = NewsClient::new(source, Some(cache));

        let response = client.news_by_region("kerala", 1, 10).await;

        assert!(response.data.is_empty());
        assert_eq!(response.status, 500);
        assert_eq!(response.message, "Failed to fetch news");
        assert_eq!(response.origin, Origin::None);
        let kept = client
            .cache()
            .unwrap()
            .get::<Vec<Article>>("news-region-kerala-page-1", true)
            .unwrap();
        assert_eq!(kept.len(), 2, "Stale entry must survive a malformed response");
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_http_source_reports_missing_results() {
        let (base_url, handle) = serve_once("200 OK", r#"{"status":"success"}"#).await;
        let source = http_source(base_url);

        let error = source.latest(&LatestQuery::default()).await.unwrap_err();

        assert!(matches!(error, UpstreamError::MissingResults));
        assert_eq!(error.status(), None);
        handle.await.unwrap();
    }
}
