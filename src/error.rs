//! Error types for fetching and querying usage limits.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, fetching, caching or querying usage.
#[derive(Error, Debug)]
pub enum LimitsError {
    /// No flattened field scored above zero for the query.
    #[error("no match found for query {query:?}")]
    NoMatch { query: String },

    /// Credentials file does not exist.
    #[error("Claude Code credentials not found at {} - please authenticate with Claude Code first", path.display())]
    CredentialsNotFound { path: PathBuf },

    /// Credentials exist but cannot be used.
    #[error("invalid credentials: {0}")]
    Credentials(String),

    /// The usage API answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        retriable: bool,
    },

    /// Transport-level HTTP failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Every retry attempt failed.
    #[error("request failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<LimitsError>,
    },

    /// Cached usage is older than the requested TTL.
    #[error("cache expired")]
    CacheExpired,

    /// Cache file could not be read, parsed or written.
    #[error("cache {operation} error ({}): {source}", path.display())]
    Cache {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Config file exists but is not valid YAML for our schema.
    #[error("failed to parse config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A statusLine entry is already configured and `--force` was not given.
    #[error("statusLine already configured in {scope} settings ({})\nUse --force to overwrite", path.display())]
    StatusLineExists { scope: String, path: PathBuf },

    #[error("unknown script: {0}\nRun 'claude-limits install-script --list' to see available scripts")]
    UnknownScript(String),

    #[error("file already exists: {}\nUse --force to overwrite", .0.display())]
    FileExists(PathBuf),

    /// MCP transport or protocol failure.
    #[error("MCP server error: {0}")]
    Mcp(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LimitsError {
    /// Whether repeating the same request could succeed.
    pub fn is_retriable(&self) -> bool {
        match self {
            LimitsError::Api { retriable, .. } => *retriable,
            LimitsError::Http(_) => true,
            _ => false,
        }
    }

    pub(crate) fn cache<E>(operation: &'static str, path: impl Into<PathBuf>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        LimitsError::Cache {
            operation,
            path: path.into(),
            source: Box::new(source),
        }
    }
}

/// Result type alias for usage operations.
pub type Result<T> = std::result::Result<T, LimitsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_carries_query() {
        let err = LimitsError::NoMatch {
            query: "Weekly".to_string(),
        };
        assert!(err.to_string().contains("\"Weekly\""));
        assert!(!err.is_retriable());
    }

    #[test]
    fn test_api_error_retriable_flag() {
        let err = LimitsError::Api {
            status: 503,
            message: "Service Unavailable".to_string(),
            retriable: true,
        };
        assert!(err.is_retriable());
        assert_eq!(
            err.to_string(),
            "API error (status 503): Service Unavailable"
        );

        let err = LimitsError::Api {
            status: 401,
            message: "Unauthorized".to_string(),
            retriable: false,
        };
        assert!(!err.is_retriable());
    }

    #[test]
    fn test_retries_exhausted_keeps_source() {
        let inner = LimitsError::Api {
            status: 502,
            message: "Bad Gateway".to_string(),
            retriable: true,
        };
        let err = LimitsError::RetriesExhausted {
            attempts: 4,
            source: Box::new(inner),
        };
        let source = std::error::Error::source(&err).expect("source");
        assert!(source.to_string().contains("502"));
    }
}
