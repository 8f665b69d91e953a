//! Multi-term aggregation with first-writer-wins deduplication.
//!
//! Terms are searched strictly in configured order, one request at a time.
//! Each returned record is admitted only if its id has not been seen before,
//! either earlier in this run or in the externally supplied exclusion list.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::youtube::{ResultRecord, SearchError, VideoSearch};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("cannot read exclusion list {path}: {source}")]
    Exclusions {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("search for \"{term}\" failed: {source}")]
    Search { term: String, source: SearchError },
}

/// Video ids that must not be admitted again. Grows monotonically during a run.
#[derive(Debug, Default, Clone)]
pub struct SeenSet {
    ids: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn load(path: &Path) -> std::io::Result<Self> {
        let ids = read_exclusions(path)?;
        for id in &ids {
            debug!(video_id = %id, "excluding previously seen video");
        }
        Ok(Self::from_ids(ids))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Returns `true` if `id` was not present before.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string())
    }

    /// Mark the record's id seen. `false` means the record must be discarded.
    pub fn admit(&mut self, record: &ResultRecord) -> bool {
        self.insert(&record.video_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

/// Read an exclusion list in file order: one id per line, blank lines skipped, no validation.
pub fn read_exclusions(path: &Path) -> std::io::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Append each record whose id is new to `out`, marking it seen. Returns the admitted count.
pub fn admit_all(
    seen: &mut SeenSet,
    records: impl IntoIterator<Item = ResultRecord>,
    out: &mut Vec<ResultRecord>,
) -> usize {
    let before = out.len();
    for record in records {
        if seen.admit(&record) {
            out.push(record);
        }
    }
    out.len() - before
}

/// Search every configured term in order and return the deduplicated records.
///
/// The first failing search aborts the whole run; no partial collection is returned.
pub async fn run(
    client: &impl VideoSearch,
    config: &SearchConfig,
) -> Result<Vec<ResultRecord>, RunError> {
    let seen = match &config.exclude_file {
        Some(path) => {
            let seen = SeenSet::load(path).map_err(|source| RunError::Exclusions {
                path: path.clone(),
                source,
            })?;
            info!(path = %path.display(), excluded = seen.len(), "loaded exclusion list");
            seen
        }
        None => SeenSet::new(),
    };
    collect(client, config, seen).await
}

/// Same as [`run`] but with an already-built seen set.
pub async fn collect(
    client: &impl VideoSearch,
    config: &SearchConfig,
    mut seen: SeenSet,
) -> Result<Vec<ResultRecord>, RunError> {
    let mut records = Vec::new();

    for term in &config.terms {
        let batch = client
            .search(term, config.max_results, &config.api_key)
            .await
            .map_err(|source| RunError::Search {
                term: term.clone(),
                source,
            })?;
        let returned = batch.len();
        let admitted = admit_all(&mut seen, batch, &mut records);
        info!(term = %term, returned, admitted, "term searched");
    }

    Ok(records)
}
