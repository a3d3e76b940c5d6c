use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrivenerError {
    #[error("Navigation to {url} timed out after {timeout_secs}s")]
    NavigationTimeout { url: String, timeout_secs: u64 },

    #[error("Member-only content, only a preview is available: {0}")]
    AccessDenied(String),

    #[error("Bot verification challenge was not resolved: {0}")]
    ChallengeUnresolved(String),

    #[error("Page returned a server error: {0}")]
    ServerError(String),

    #[error("No article content found: {0}")]
    ExtractionEmpty(String),

    #[error("Failed to persist {path}: {source}")]
    Persistence {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ScrivenerError>;
