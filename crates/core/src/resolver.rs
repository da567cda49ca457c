//! Turns timed keyword groups into timed clip URLs.
//!
//! Segments are processed strictly in order: whether segment N searches at all
//! depends on what happened at segment N-1.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::{
    config::ResolverConfig,
    types::{KeywordSegment, Orientation, ResolvedSegment, VideoCandidate},
};

/// Identities of clips already placed on the timeline during one run. Only ever grows.
#[derive(Debug, Default, Clone)]
pub struct UsedVideoSet {
    ids: HashSet<String>,
}

impl UsedVideoSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn insert(&mut self, id: String) -> bool {
        self.ids.insert(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Finds one unused clip for a keyword.
pub trait ClipFinder {
    async fn find(
        &mut self,
        keyword: &str,
        orientation: Orientation,
        used: &UsedVideoSet,
    ) -> Option<VideoCandidate>;
}

/// How many segments ended up with each kind of assignment.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolveSummary {
    pub searched: usize,
    pub reused: usize,
    pub fallback: usize,
    pub unresolved: usize,
}

pub struct SegmentResolver<'a> {
    used: &'a mut UsedVideoSet,
    config: ResolverConfig,
    summary: ResolveSummary,
}

impl<'a> SegmentResolver<'a> {
    pub fn new(used: &'a mut UsedVideoSet, config: ResolverConfig) -> Self {
        Self {
            used,
            config,
            summary: ResolveSummary::default(),
        }
    }

    pub fn summary(&self) -> &ResolveSummary {
        &self.summary
    }

    /// Resolve every segment, one output per input, intervals untouched.
    pub async fn resolve<F: ClipFinder>(
        &mut self,
        finder: &mut F,
        segments: &[KeywordSegment],
        orientation: Orientation,
    ) -> Vec<ResolvedSegment> {
        let total = segments.len();
        let mut resolved = Vec::with_capacity(total);
        let mut last_found_url: Option<String> = None;
        let mut reuse_count = 0;

        for (idx, segment) in segments.iter().enumerate() {
            let position = idx + 1;

            if let Some(url) = &last_found_url
                && reuse_count < self.config.reuse_limit
            {
                reuse_count += 1;
                self.summary.reused += 1;
                info!(
                    "[{position}/{total}] reusing previous video ({reuse_count}/{})",
                    self.config.reuse_limit
                );
                resolved.push(ResolvedSegment::new(segment.interval, Some(url.clone())));
                continue;
            }

            let mut found = None;
            for keyword in &segment.keywords {
                info!("[{position}/{total}] searching for '{keyword}' ({})", segment.interval);
                if let Some(candidate) = finder.find(keyword, orientation, &*self.used).await {
                    info!("[{position}/{total}] found video for '{keyword}'");
                    found = Some(candidate);
                    break;
                }
                info!("[{position}/{total}] no video found for '{keyword}'");
            }

            let url = match found {
                Some(candidate) => {
                    self.used.insert(candidate.id);
                    last_found_url = Some(candidate.url.clone());
                    reuse_count = 0;
                    self.summary.searched += 1;
                    Some(candidate.url)
                }
                None => {
                    warn!(
                        "[{position}/{total}] no video found for any of {:?}",
                        segment.keywords
                    );
                    match &last_found_url {
                        Some(url) => {
                            self.summary.fallback += 1;
                            Some(url.clone())
                        }
                        None => {
                            self.summary.unresolved += 1;
                            None
                        }
                    }
                }
            };

            resolved.push(ResolvedSegment::new(segment.interval, url));
        }

        resolved
    }
}
