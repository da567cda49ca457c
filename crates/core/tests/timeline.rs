use std::{collections::HashMap, sync::Mutex};

use anyhow::Result;
use clipline_core::{
    KeywordSegment, Orientation, QueryCache, ResolverConfig, SearchClient, SearchConfig,
    SearchTransport, TimeInterval, UsedVideoSet, covers, parse_keyword_response,
    resolve_timeline,
    search::{RawResponse, TransportError},
};
use serde_json::json;

/// Serves a fixed response per query and counts requests.
struct StockLibrary {
    responses: HashMap<&'static str, (u16, String)>,
    calls: Mutex<HashMap<String, usize>>,
}

impl StockLibrary {
    fn new() -> Self {
        let forest = json!({
            "videos": [
                {
                    "id": 2, "width": 3840, "height": 2160, "duration": 30,
                    "video_files": [
                        {"link": "https://cdn.test/forest-2.uhd.mp4", "width": 3840, "height": 2160},
                        {"link": "https://cdn.test/forest-2.hd.mp4", "width": 1920, "height": 1080}
                    ]
                },
                {
                    "id": 1, "width": 1920, "height": 1080, "duration": 15,
                    "video_files": [
                        {"link": "https://cdn.test/forest-1.hd.mp4?s=1", "width": 1920, "height": 1080}
                    ]
                },
                {
                    "id": 3, "width": 1080, "height": 1920, "duration": 15,
                    "video_files": [
                        {"link": "https://cdn.test/forest-3.hd.mp4", "width": 1080, "height": 1920}
                    ]
                }
            ]
        });

        let mut responses = HashMap::new();
        responses.insert("forest", (200, forest.to_string()));
        responses.insert("nothing", (200, json!({"videos": []}).to_string()));
        responses.insert("unknown", (200, json!({"videos": []}).to_string()));
        responses.insert("river", (500, "upstream exploded".to_string()));

        Self {
            responses,
            calls: Mutex::new(HashMap::new()),
        }
    }

    fn calls_for(&self, query: &str) -> usize {
        self.calls.lock().unwrap().get(query).copied().unwrap_or(0)
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

impl SearchTransport for &StockLibrary {
    async fn get(
        &self,
        query: &str,
        _orientation: Orientation,
    ) -> Result<RawResponse, TransportError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(query.to_string())
            .or_default() += 1;
        let (status, body) = self
            .responses
            .get(query)
            .cloned()
            .unwrap_or((404, "not found".to_string()));
        Ok(RawResponse { status, body })
    }
}

fn segments(keywords: &[&[&str]]) -> Vec<KeywordSegment> {
    keywords
        .iter()
        .enumerate()
        .map(|(i, kws)| KeywordSegment {
            interval: TimeInterval::new(i as f64 * 3.0, (i + 1) as f64 * 3.0),
            keywords: kws.iter().map(|k| k.to_string()).collect(),
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn timeline_is_gap_free_and_never_repeats_clips_out_of_order() -> Result<()> {
    let library = StockLibrary::new();
    let mut search = SearchClient::new(&library, SearchConfig::default(), QueryCache::new());
    let mut used = UsedVideoSet::new();
    let input = segments(&[
        &["nothing"],
        &["forest"],
        &["forest"],
        &["forest"],
        &["forest"],
        &["forest"],
        &["forest"],
        &["unknown", "forest"],
        &["river"],
    ]);

    let timeline = resolve_timeline(
        &mut search,
        &mut used,
        &input,
        Orientation::Landscape,
        ResolverConfig::default(),
    )
    .await;

    let raw: Vec<Option<&str>> = timeline.raw.iter().map(|s| s.url.as_deref()).collect();
    assert_eq!(
        raw,
        vec![
            None,
            Some("https://cdn.test/forest-1.hd.mp4?s=1"),
            Some("https://cdn.test/forest-1.hd.mp4?s=1"),
            Some("https://cdn.test/forest-1.hd.mp4?s=1"),
            Some("https://cdn.test/forest-2.hd.mp4"),
            Some("https://cdn.test/forest-2.hd.mp4"),
            Some("https://cdn.test/forest-2.hd.mp4"),
            Some("https://cdn.test/forest-2.hd.mp4"),
            Some("https://cdn.test/forest-2.hd.mp4"),
        ]
    );

    assert!(covers(&timeline.segments, 27.0));
    assert_eq!(timeline.segments[0].url, None);
    assert_eq!(timeline.segments[0].interval, TimeInterval::new(0.0, 3.0));

    // every clip occupies one contiguous run of segments
    let mut seen: Vec<&str> = Vec::new();
    for url in timeline.segments.iter().filter_map(|s| s.url.as_deref()) {
        if seen.last() != Some(&url) {
            assert!(!seen.contains(&url), "{url} reappears after another clip");
            seen.push(url);
        }
    }

    assert_eq!(library.calls_for("forest"), 1);
    assert_eq!(library.calls_for("river"), 1);
    assert_eq!(library.total_calls(), 4);
    assert_eq!(search.cache().len(), 4);
    assert_eq!(used.len(), 2);
    assert_eq!(timeline.summary.fallback, 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn model_output_flows_through_to_a_merged_timeline() -> Result<()> {
    let raw = "```json\n[[[0, 3], ['nothing']], [[3, 6], ['forest']], [[6, np.float64(9.0)], ['forest']],]\n```";
    let parsed = parse_keyword_response(raw)?;
    assert_eq!(parsed.len(), 3);

    let library = StockLibrary::new();
    let mut search = SearchClient::new(&library, SearchConfig::default(), QueryCache::new());
    let mut used = UsedVideoSet::new();

    let timeline = resolve_timeline(
        &mut search,
        &mut used,
        &parsed,
        Orientation::Landscape,
        ResolverConfig::default(),
    )
    .await;

    assert!(covers(&timeline.segments, 9.0));
    assert_eq!(timeline.unresolved(), 1);
    assert_eq!(library.total_calls(), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn portrait_runs_search_separately() -> Result<()> {
    let library = StockLibrary::new();
    let mut search = SearchClient::new(&library, SearchConfig::default(), QueryCache::new());
    let mut used = UsedVideoSet::new();

    let timeline = resolve_timeline(
        &mut search,
        &mut used,
        &segments(&[&["forest"]]),
        Orientation::Portrait,
        ResolverConfig::default(),
    )
    .await;

    assert_eq!(
        timeline.segments[0].url.as_deref(),
        Some("https://cdn.test/forest-3.hd.mp4")
    );
    Ok(())
}
