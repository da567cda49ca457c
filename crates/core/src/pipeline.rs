use tracing::{info, warn};

use crate::{
    audit::AuditLog,
    config::{ExtractionConfig, ResolverConfig, SearchConfig, pexels_api_key},
    error::Result,
    keywords::KeywordExtractor,
    merge::{covers, merge_gaps},
    provider::ChatModel,
    resolver::{ClipFinder, ResolveSummary, SegmentResolver, UsedVideoSet},
    search::{PexelsTransport, QueryCache, SearchClient},
    types::{Caption, KeywordSegment, Orientation, ResolvedSegment},
};

/// Build a search client for one run, with a fresh query cache.
pub fn build_search_client(
    config: SearchConfig,
    audit: Option<AuditLog>,
) -> Result<SearchClient<PexelsTransport>> {
    let transport = PexelsTransport::new(pexels_api_key()?, &config)?;
    let client = SearchClient::new(transport, config, QueryCache::new());
    Ok(match audit {
        Some(audit) => client.with_audit(audit),
        None => client,
    })
}

/// Ask the model for timed keywords covering the whole caption timeline
pub async fn extract_keywords<C: ChatModel>(
    chat: &C,
    script: &str,
    captions: &[Caption],
    config: ExtractionConfig,
    audit: Option<&AuditLog>,
) -> Result<Vec<KeywordSegment>> {
    let extractor = KeywordExtractor::new(chat, config);
    match audit {
        Some(audit) => extractor.with_audit(audit).extract(script, captions).await,
        None => extractor.extract(script, captions).await,
    }
}

/// Resolved clips before and after gap merging.
#[derive(Debug, Clone)]
pub struct Timeline {
    pub raw: Vec<ResolvedSegment>,
    pub segments: Vec<ResolvedSegment>,
    pub summary: ResolveSummary,
}

impl Timeline {
    /// Intervals still without a visual after merging.
    pub fn unresolved(&self) -> usize {
        self.segments.iter().filter(|s| s.url.is_none()).count()
    }
}

/// Resolve keyword segments to clips, then merge unresolved gaps.
pub async fn resolve_timeline<F: ClipFinder>(
    finder: &mut F,
    used: &mut UsedVideoSet,
    segments: &[KeywordSegment],
    orientation: Orientation,
    config: ResolverConfig,
) -> Timeline {
    let mut resolver = SegmentResolver::new(used, config);
    let raw = resolver.resolve(finder, segments, orientation).await;
    let summary = resolver.summary().clone();

    let merged = merge_gaps(&raw);
    let total = segments.last().map(|s| s.interval.end).unwrap_or(0.0);
    if !covers(&merged, total) {
        warn!(total, "timeline does not cover the narration without gaps");
    }

    info!(
        segments = raw.len(),
        merged = merged.len(),
        searched = summary.searched,
        reused = summary.reused,
        fallback = summary.fallback,
        unresolved = summary.unresolved,
        "timeline resolved"
    );

    Timeline {
        raw,
        segments: merged,
        summary,
    }
}
