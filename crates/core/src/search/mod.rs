//! Stock-video search: one deduplicated, rate-limited, retried query at a time.

pub mod cache;
pub mod pexels;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{
    audit::{AuditKind, AuditLog},
    config::SearchConfig,
    error::SearchError,
    resolver::{ClipFinder, UsedVideoSet},
    selector::select_video,
    types::{Orientation, SearchResponse, VideoCandidate},
};

pub use cache::{QueryCache, SearchOutcome};
pub use pexels::{PexelsTransport, RawResponse, SearchTransport, TransportError};

pub struct SearchClient<T> {
    transport: T,
    config: SearchConfig,
    cache: QueryCache,
    audit: Option<AuditLog>,
    requests_sent: usize,
}

impl<T: SearchTransport> SearchClient<T> {
    /// The cache is owned by the client for the lifetime of one run.
    pub fn new(transport: T, config: SearchConfig, cache: QueryCache) -> Self {
        Self {
            transport,
            config,
            cache,
            audit: None,
            requests_sent: 0,
        }
    }

    pub fn with_audit(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// HTTP requests actually issued, retries included.
    pub fn requests_sent(&self) -> usize {
        self.requests_sent
    }

    pub async fn search(&mut self, query: &str, orientation: Orientation) -> SearchOutcome {
        if let Some(outcome) = self.cache.get(query, orientation) {
            debug!(query, %orientation, "using cached result");
            return outcome.clone();
        }

        let outcome = self.fetch(query, orientation).await;
        self.cache.insert(query, orientation, outcome.clone());
        outcome
    }

    async fn fetch(&mut self, query: &str, orientation: Orientation) -> SearchOutcome {
        sleep(self.config.request_delay).await;

        let backoff = self.config.backoff_schedule();
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            self.requests_sent += 1;

            let failure = match self.transport.get(query, orientation).await {
                Ok(raw) => {
                    self.audit_response(query, orientation, &raw).await;
                    match raw.status {
                        429 => SearchError::RateLimited { attempts: attempt },
                        200..=299 => return parse_search_body(&raw.body),
                        status => {
                            warn!(query, status, "search provider returned an error");
                            return Err(SearchError::Upstream {
                                status,
                                body: raw.body,
                            });
                        }
                    }
                }
                Err(TransportError::Timeout) => SearchError::Timeout { attempts: attempt },
                Err(TransportError::Other(reason)) => {
                    warn!(query, "search request failed: {reason}");
                    return Err(SearchError::Transport(reason));
                }
            };

            if attempt >= max_attempts {
                warn!(query, "{failure}, giving up");
                return Err(failure);
            }

            let delay = backoff
                .get(attempt as usize - 1)
                .copied()
                .unwrap_or(self.config.initial_backoff);
            warn!(
                query,
                attempt, max_attempts, "{failure}, retrying in {}s", delay.as_secs_f64()
            );
            sleep(delay).await;
        }
    }

    async fn audit_response(&self, query: &str, orientation: Orientation, raw: &RawResponse) {
        if let Some(audit) = &self.audit {
            audit
                .record(
                    AuditKind::Pexels,
                    query,
                    serde_json::json!({
                        "orientation": orientation,
                        "status": raw.status,
                        "body": raw.body,
                    }),
                )
                .await;
        }
    }
}

impl<T: SearchTransport> ClipFinder for SearchClient<T> {
    async fn find(
        &mut self,
        keyword: &str,
        orientation: Orientation,
        used: &UsedVideoSet,
    ) -> Option<VideoCandidate> {
        match self.search(keyword, orientation).await {
            Ok(videos) => select_video(keyword, &videos, orientation, used),
            Err(e) => {
                warn!(keyword, "no candidates: {e}");
                None
            }
        }
    }
}

fn parse_search_body(body: &str) -> SearchOutcome {
    serde_json::from_str::<SearchResponse>(body)
        .map(|response| response.videos)
        .map_err(|e| SearchError::Decode(e.to_string()))
}
