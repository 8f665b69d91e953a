use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use super::types::{ApiError, ErrorResponse, ResultRecord, SearchListResponse};

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("API key rejected: {0}")]
    Auth(String),

    #[error("API quota exhausted: {0}")]
    Quota(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        SearchError::Transport(e.to_string())
    }
}

/// Abstraction for one keyword lookup against the video search API.
/// Implemented by `YouTubeClient` for production; mock implementations used in tests.
pub trait VideoSearch {
    async fn search(
        &self,
        term: &str,
        limit: u32,
        api_key: &ApiKey,
    ) -> Result<Vec<ResultRecord>, SearchError>;
}

#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }

    /// Last four characters only, for status output. Short keys are hidden entirely.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 4 {
            return "****".to_string();
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("****{tail}")
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Clone)]
pub struct YouTubeClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl YouTubeClient {
    pub fn new(http: Client, timeout: Duration) -> Self {
        Self {
            http,
            base_url: API_BASE.to_string(),
            timeout,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    fn search_url(&self, term: &str, limit: u32, api_key: &ApiKey) -> Result<Url, SearchError> {
        let endpoint = format!("{}/search", self.base_url);
        Url::parse_with_params(
            &endpoint,
            &[
                ("part", "snippet"),
                ("type", "video"),
                ("q", term),
                ("maxResults", &limit.to_string()),
                ("key", api_key.expose()),
            ],
        )
        .map_err(|e| SearchError::Transport(format!("invalid endpoint {endpoint}: {e}")))
    }
}

impl VideoSearch for YouTubeClient {
    async fn search(
        &self,
        term: &str,
        limit: u32,
        api_key: &ApiKey,
    ) -> Result<Vec<ResultRecord>, SearchError> {
        let url = self.search_url(term, limit, api_key)?;

        debug_assert!(
            url.scheme() == "https" || cfg!(test),
            "API key must only be sent over HTTPS"
        );

        let response = self
            .http
            .get(url)
            .header("User-Agent", crate::USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let classified = match serde_json::from_str::<ErrorResponse>(&text) {
                Ok(body) => classify_api_error(status.as_u16(), &body.error),
                Err(_) => {
                    let end = text.floor_char_boundary(200);
                    classify_status(status.as_u16(), format!("HTTP {status}: {}", &text[..end]))
                }
            };
            warn!(term, error = %classified, "YouTube API error");
            return Err(classified);
        }

        let body: SearchListResponse = serde_json::from_str(&text)
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;
        let records = normalize(body, term, limit)?;
        debug!(term, count = records.len(), "youtube search complete");
        Ok(records)
    }
}

fn normalize(
    body: SearchListResponse,
    term: &str,
    limit: u32,
) -> Result<Vec<ResultRecord>, SearchError> {
    body.items
        .into_iter()
        .take(limit as usize)
        .enumerate()
        .map(|(i, item)| {
            let video_id = item
                .id
                .and_then(|id| id.video_id)
                .filter(|id| !id.is_empty())
                .ok_or_else(|| SearchError::InvalidResponse(format!("item {i} has no videoId")))?;
            let snippet = item.snippet.ok_or_else(|| {
                SearchError::InvalidResponse(format!("item {i} ({video_id}) has no snippet"))
            })?;
            Ok(ResultRecord::new(
                video_id,
                snippet.title,
                snippet.description,
                snippet.channel_title,
                snippet.published_at,
                term,
            ))
        })
        .collect()
}

const AUTH_REASONS: &[&str] = &[
    "keyInvalid",
    "keyExpired",
    "forbidden",
    "accessNotConfigured",
    "ipRefererBlocked",
];
const QUOTA_REASONS: &[&str] = &[
    "quotaExceeded",
    "rateLimitExceeded",
    "userRateLimitExceeded",
    "dailyLimitExceeded",
];

fn classify_api_error(status: u16, err: &ApiError) -> SearchError {
    let message = err
        .message
        .clone()
        .unwrap_or_else(|| "Unknown error".to_string());
    let code = err.code.unwrap_or(status);

    for reason in err.errors.iter().filter_map(|d| d.reason.as_deref()) {
        if QUOTA_REASONS.contains(&reason) {
            return SearchError::Quota(message);
        }
        if AUTH_REASONS.contains(&reason) {
            return SearchError::Auth(message);
        }
    }

    if code == 400 && message.to_ascii_lowercase().contains("api key") {
        return SearchError::Auth(message);
    }
    classify_status(code, message)
}

fn classify_status(code: u16, message: String) -> SearchError {
    match code {
        401 => SearchError::Auth(message),
        429 => SearchError::Quota(message),
        _ => SearchError::Transport(format!("API error ({code}): {message}")),
    }
}
