use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use crate::youtube::{ApiKey, DEFAULT_TIMEOUT};

pub const DEFAULT_MAX_RESULTS: u32 = 100;
/// `exclude_file` value meaning "no exclusion list".
pub const NO_EXCLUDE_FILE: &str = "NONE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("missing required config key: {0}")]
    MissingKey(&'static str),
}

/// Resolved run parameters. Term order is the tie-break for first-writer-wins.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub terms: Vec<String>,
    pub max_results: u32,
    pub api_key: ApiKey,
    pub output_file: PathBuf,
    pub exclude_file: Option<PathBuf>,
    pub timeout: Duration,
}

impl SearchConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        parse(&text)
    }
}

/// Parse `key=value` lines. Blank lines and `#` comments are skipped.
pub fn parse(text: &str) -> Result<SearchConfig, ConfigError> {
    let mut max_results = DEFAULT_MAX_RESULTS;
    let mut terms = Vec::new();
    let mut api_key = None;
    let mut output_file = None;
    let mut exclude_file = NO_EXCLUDE_FILE.to_string();
    let mut timeout = DEFAULT_TIMEOUT;

    for (lineno, line) in text.lines().enumerate().map(|(i, l)| (i + 1, l.trim())) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            debug!(line = lineno, "ignoring config line without '='");
            continue;
        };
        let value = value.trim();

        match key.trim() {
            "max_results" => match value.parse::<u32>() {
                Ok(n) if n > 0 => max_results = n,
                _ => warn!(
                    value,
                    default = DEFAULT_MAX_RESULTS,
                    "invalid max_results in config file, using default"
                ),
            },
            "search_term" => {
                let term = unquote(value);
                if term.is_empty() {
                    warn!(line = lineno, "ignoring empty search_term");
                } else {
                    terms.push(term.to_string());
                }
            }
            "api_key" => api_key = Some(unquote(value).to_string()),
            "output_file" => output_file = Some(unquote(value).to_string()),
            "exclude_file" => exclude_file = unquote(value).to_string(),
            "timeout_secs" => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => timeout = Duration::from_secs(secs),
                _ => warn!(
                    value,
                    default = DEFAULT_TIMEOUT.as_secs(),
                    "invalid timeout_secs in config file, using default"
                ),
            },
            other => debug!(key = other, line = lineno, "ignoring unknown config key"),
        }
    }

    let api_key = api_key
        .filter(|k| !k.is_empty())
        .ok_or(ConfigError::MissingKey("api_key"))?;
    let output_file = output_file
        .filter(|f| !f.is_empty())
        .ok_or(ConfigError::MissingKey("output_file"))?;

    if terms.is_empty() {
        warn!("no search_term entries configured; output will contain only the header");
    }

    Ok(SearchConfig {
        terms,
        max_results,
        api_key: ApiKey::new(api_key),
        output_file: PathBuf::from(output_file),
        exclude_file: (!exclude_file.is_empty() && exclude_file != NO_EXCLUDE_FILE)
            .then(|| PathBuf::from(exclude_file)),
        timeout,
    })
}

fn unquote(value: &str) -> &str {
    value.trim_matches('"')
}
