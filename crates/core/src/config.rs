use std::time::Duration;

use crate::error::{ClipError, Result};

pub const PEXELS_ENV_VAR: &str = "PEXELS_KEY";

/// Read the stock-video provider key from the environment.
pub fn pexels_api_key() -> Result<String> {
    match std::env::var(PEXELS_ENV_VAR) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(ClipError::MissingApiKey {
            env_var: PEXELS_ENV_VAR.to_string(),
        }),
    }
}

/// Knobs for the stock-video search client.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_url: String,
    pub per_page: u32,
    /// Pause before every uncached request, to stay under the provider's rate limit.
    pub request_delay: Duration,
    pub request_timeout: Duration,
    /// Total attempts per query, first try included.
    pub max_attempts: u32,
    /// Wait after the first failed attempt; doubled after each further failure.
    pub initial_backoff: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.pexels.com/videos/search".to_string(),
            per_page: 15,
            request_delay: Duration::from_millis(500),
            request_timeout: Duration::from_secs(10),
            max_attempts: 3,
            initial_backoff: Duration::from_secs(2),
        }
    }
}

impl SearchConfig {
    /// Delays slept between consecutive attempts. There is no delay after the last one.
    pub fn backoff_schedule(&self) -> Vec<Duration> {
        (0..self.max_attempts.saturating_sub(1))
            .map(|i| self.initial_backoff * 2u32.saturating_pow(i))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// How many segments after a fresh find may replay the same clip without searching.
    pub reuse_limit: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { reuse_limit: 2 }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Upper bound on model generations before keyword extraction gives up.
    pub max_attempts: u32,
    /// Allowed difference between the last keyword interval end and the caption duration.
    pub coverage_tolerance: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            coverage_tolerance: crate::types::TIME_EPSILON,
        }
    }
}
