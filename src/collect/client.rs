//! GitHub search API client
//!
//! Minimal client for the repository search and rate limit endpoints. Search requests are
//! retried with exponential backoff when GitHub reports rate limiting, abuse detection, or a
//! server error. Every other failure is returned immediately.

use super::SearchQuery;
use super::rate_limit::RateLimitOverview;
use chrono::{DateTime, Utc};
use core::time::Duration;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Deserialize;

const LOG_TARGET: &str = "      client";

/// Longest response body excerpt included in retry log lines
const BODY_EXCERPT_CHARS: usize = 200;

/// Owner of a repository hit
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Owner {
    pub login: Option<String>,
}

/// License of a repository hit
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct License {
    pub name: Option<String>,
}

/// One entry of the `items` array of a repository search response
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SearchHit {
    pub id: Option<u64>,
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub owner: Option<Owner>,
    pub language: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub size: Option<u64>,
    pub stargazers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub open_issues_count: Option<u64>,
    pub watchers_count: Option<u64>,
    pub license: Option<License>,
    pub topics: Option<Vec<String>>,
}

/// One page of repository search results
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SearchPage {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    #[serde(default)]
    pub items: Vec<SearchHit>,
}

/// Failure of a search API call
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// A status that is not worth retrying
    #[error("request failed with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Every attempt was rate limited or hit a server error
    #[error("request still failing after {attempts} attempts (last status HTTP {last_status})")]
    RetriesExhausted { attempts: u32, last_status: u16 },

    /// The request could not be sent or timed out
    #[error("request could not be completed: {0}")]
    Transport(#[source] reqwest::Error),

    /// A successful response carried a body that could not be decoded
    #[error("response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Anything that can answer repository search queries one page at a time.
pub trait SearchSource {
    fn search(&self, query: &SearchQuery, page: u32, per_page: u32) -> impl Future<Output = Result<SearchPage, SearchError>>;
}

/// Delay before retry `attempt` (zero-based): `base * 2^attempt`
#[must_use]
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}

/// How failed search requests are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Success,
    Retry,
    Fail,
}

fn classify(status: StatusCode) -> Disposition {
    if status.is_success() {
        Disposition::Success
    } else if status.is_server_error() || matches!(status.as_u16(), 403 | 429) {
        Disposition::Retry
    } else {
        Disposition::Fail
    }
}

/// GitHub API client
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl SearchClient {
    /// Create a client authenticating with `token` against the API at `base_url`
    pub fn new(token: &str, base_url: impl Into<String>, retry: RetryPolicy, timeout: Duration) -> crate::Result<Self> {
        use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};

        let mut auth_val = HeaderValue::from_str(&format!("token {token}"))?;
        auth_val.set_sensitive(true);

        let mut headers = HeaderMap::new();
        let _ = headers.insert(AUTHORIZATION, auth_val);
        let _ = headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        let client = reqwest::Client::builder()
            .user_agent(concat!("repo-census/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry,
        })
    }

    /// Get the base URL for this client
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the current rate limit status of the authenticated token
    pub async fn rate_limit(&self) -> Result<RateLimitOverview, SearchError> {
        let url = format!("{}/rate_limit", self.base_url);
        let resp = self.client.get(&url).send().await.map_err(SearchError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        resp.json().await.map_err(SearchError::Decode)
    }
}

impl SearchSource for SearchClient {
    async fn search(&self, query: &SearchQuery, page: u32, per_page: u32) -> Result<SearchPage, SearchError> {
        let url = format!("{}/search/repositories", self.base_url);
        let q = query.to_string();
        let page_param = page.to_string();
        let per_page_param = per_page.to_string();
        let params: [(&str, &str); 3] = [("q", &q), ("page", &page_param), ("per_page", &per_page_param)];

        log::debug!(target: LOG_TARGET, "Fetching '{q}' page={page} per_page={per_page}");

        let mut last_status = 0;
        for attempt in 0..self.retry.max_attempts {
            let resp = self.client.get(&url).query(&params).send().await.map_err(SearchError::Transport)?;
            let status = resp.status();

            match classify(status) {
                Disposition::Success => {
                    let results: SearchPage = resp.json().await.map_err(SearchError::Decode)?;
                    if results.incomplete_results {
                        log::debug!(target: LOG_TARGET, "GitHub reported incomplete results for '{q}'");
                    }
                    return Ok(results);
                }

                Disposition::Retry => {
                    let body = resp.text().await.unwrap_or_default();
                    let excerpt: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
                    log::warn!(
                        target: LOG_TARGET,
                        "[Attempt {}/{}] HTTP {status} for '{q}': {excerpt}",
                        attempt + 1,
                        self.retry.max_attempts
                    );

                    last_status = status.as_u16();
                    if attempt + 1 < self.retry.max_attempts {
                        tokio::time::sleep(backoff_delay(self.retry.backoff_base, attempt)).await;
                    }
                }

                Disposition::Fail => {
                    let body = resp.text().await.unwrap_or_default();
                    log::error!(target: LOG_TARGET, "HTTP {status} for '{q}': {body}");
                    return Err(SearchError::Status {
                        status: status.as_u16(),
                        body,
                    });
                }
            }
        }

        Err(SearchError::RetriesExhausted {
            attempts: self.retry.max_attempts,
            last_status,
        })
    }
}
