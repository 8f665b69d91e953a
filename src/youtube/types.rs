use serde::Deserialize;

pub const WATCH_URL_BASE: &str = "https://www.youtube.com/watch?v=";

#[derive(Debug, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub id: Option<ItemId>,
    pub snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemId {
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub published_at: String,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub code: Option<u16>,
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub reason: Option<String>,
}

/// One matched video, normalized from a search item.
///
/// Identity is `video_id`; `search_term` records which query first produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub channel_name: String,
    pub published_at: String,
    pub url: String,
    pub search_term: String,
}

impl ResultRecord {
    pub fn new(
        video_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        channel_name: impl Into<String>,
        published_at: impl Into<String>,
        search_term: impl Into<String>,
    ) -> Self {
        let video_id = video_id.into();
        Self {
            url: watch_url(&video_id),
            video_id,
            title: title.into(),
            description: description.into(),
            channel_name: channel_name.into(),
            published_at: published_at.into(),
            search_term: search_term.into(),
        }
    }
}

pub fn watch_url(video_id: &str) -> String {
    format!("{WATCH_URL_BASE}{video_id}")
}
