use std::fmt;

use serde::{Deserialize, Serialize};

/// Tolerance used when comparing interval boundaries produced by different sources.
pub const TIME_EPSILON: f64 = 1e-3;

/// A half-open span of the narration, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: f64,
    pub end: f64,
}

impl TimeInterval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// True when `next` begins exactly where this interval ends.
    pub fn touches(&self, next: &TimeInterval) -> bool {
        (self.end - next.start).abs() < TIME_EPSILON
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}-{:.2}s", self.start, self.end)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
}

impl Orientation {
    /// Exact frame size a clip variant must have to be picked.
    pub fn target_resolution(&self) -> (u32, u32) {
        match self {
            Orientation::Landscape => (1920, 1080),
            Orientation::Portrait => (1080, 1920),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One caption line of the narration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Caption {
    pub fn interval(&self) -> TimeInterval {
        TimeInterval::new(self.start, self.end)
    }
}

/// A slice of the timeline with its search keywords, most preferred first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordSegment {
    pub interval: TimeInterval,
    pub keywords: Vec<String>,
}

/// Search hit as returned by the stock-video provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockVideo {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    pub duration: f64,
    #[serde(default)]
    pub video_files: Vec<VideoFile>,
}

/// One encoding of a stock video. The provider leaves dimensions null for streaming playlists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoFile {
    pub link: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub videos: Vec<StockVideo>,
}

/// The concrete clip chosen for a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoCandidate {
    /// Link with the resolution suffix removed; two variants of one clip share it.
    pub id: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub duration: f64,
}

/// A timeline slice and the clip that plays under it. `None` means no visual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSegment {
    pub interval: TimeInterval,
    pub url: Option<String>,
}

impl ResolvedSegment {
    pub fn new(interval: TimeInterval, url: Option<String>) -> Self {
        Self { interval, url }
    }
}

/// Derive the dedup identity of a clip from one of its file links.
///
/// The query string is dropped and the last path segment is cut at the first
/// resolution marker, so `123.hd.mp4?s=x` and `123.sd.mp4?s=y` both map to `.../123`.
pub fn clip_identity(link: &str) -> String {
    const MARKERS: [&str; 6] = [".hd", ".sd", ".uhd", "-hd_", "-sd_", "-uhd_"];

    let without_query = link.split(['?', '#']).next().unwrap_or(link);
    let name_start = without_query.rfind('/').map(|i| i + 1).unwrap_or(0);
    let name = &without_query[name_start..];

    let cut = MARKERS.iter().filter_map(|m| name.find(m)).min();
    match cut {
        Some(offset) => without_query[..name_start + offset].to_string(),
        None => without_query.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_strips_legacy_resolution_suffix() {
        let hd = "https://player.vimeo.com/external/371433846.hd.mp4?s=236&profile_id=175";
        let sd = "https://player.vimeo.com/external/371433846.sd.mp4?s=a11&profile_id=165";
        assert_eq!(clip_identity(hd), "https://player.vimeo.com/external/371433846");
        assert_eq!(clip_identity(hd), clip_identity(sd));
    }

    #[test]
    fn identity_strips_current_resolution_suffix() {
        let link = "https://videos.pexels.com/video-files/855564/855564-hd_1920_1080_24fps.mp4";
        assert_eq!(
            clip_identity(link),
            "https://videos.pexels.com/video-files/855564/855564"
        );
    }

    #[test]
    fn identity_keeps_links_without_marker() {
        let link = "https://cdn.example.com/clips/ocean-waves.mp4";
        assert_eq!(clip_identity(link), link);
    }

    #[test]
    fn touching_intervals_tolerate_float_noise() {
        let a = TimeInterval::new(0.0, 3.2);
        let b = TimeInterval::new(3.2000001, 6.0);
        assert!(a.touches(&b));
        assert!(!a.touches(&TimeInterval::new(3.5, 6.0)));
    }
}
