//! Video search API client: request building, error classification, and result normalization.

pub mod client;
pub mod types;

pub use client::{ApiKey, DEFAULT_TIMEOUT, SearchError, VideoSearch, YouTubeClient};
pub use types::ResultRecord;
