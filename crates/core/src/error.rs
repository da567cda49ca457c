use std::path::PathBuf;

use thiserror::Error;

/// Terminal outcome of one stock-video query.
///
/// Cloneable because failed queries are memoized alongside successful ones.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("Rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("Request timed out after {attempts} attempts")]
    Timeout { attempts: u32 },

    #[error("Provider returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

/// Why a keyword response could not be used. Either variant means "ask the model again".
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("Malformed keyword response: {reason}")]
    Malformed { reason: String },

    #[error("Keyword segments end at {covered:.2}s but captions run to {expected:.2}s")]
    IncompleteCoverage { covered: f64, expected: f64 },

    #[error("Keyword segments are not contiguous: one ends at {end:.2}s, the next starts at {next_start:.2}s")]
    Discontinuous { end: f64, next_start: f64 },
}

#[derive(Error, Debug)]
pub enum ClipError {
    #[error("Keyword extraction failed after {attempts} attempts: {last}")]
    KeywordExtractionFailed { attempts: u32, last: ExtractionError },

    #[error("Chat completion failed: {reason}")]
    ChatFailed { reason: String },

    #[error("Invalid captions in {path}: {reason}")]
    InvalidCaptions { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: String },
}

pub type Result<T> = std::result::Result<T, ClipError>;
