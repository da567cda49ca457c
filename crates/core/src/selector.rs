use tracing::debug;

use crate::{
    resolver::UsedVideoSet,
    types::{Orientation, StockVideo, VideoCandidate, clip_identity},
};

/// Clip length the ranking prefers, in seconds.
pub const TARGET_CLIP_SECONDS: f64 = 15.0;

/// True when the video is exactly 16:9 (or 9:16) and at least full HD in that orientation.
fn fits_orientation(video: &StockVideo, orientation: Orientation) -> bool {
    let (min_width, min_height) = orientation.target_resolution();
    let (w, h) = (u64::from(video.width), u64::from(video.height));
    let exact_ratio = match orientation {
        Orientation::Landscape => w * 9 == h * 16,
        Orientation::Portrait => h * 9 == w * 16,
    };
    exact_ratio && video.width >= min_width && video.height >= min_height
}

/// Pick the best unused clip for `orientation` out of one page of search results.
///
/// Videos are ranked by closeness to [`TARGET_CLIP_SECONDS`]; within each, the first
/// file at exactly the target resolution whose identity is not in `used` wins.
pub fn select_video(
    query: &str,
    videos: &[StockVideo],
    orientation: Orientation,
    used: &UsedVideoSet,
) -> Option<VideoCandidate> {
    let (target_width, target_height) = orientation.target_resolution();

    let mut ranked: Vec<&StockVideo> = videos
        .iter()
        .filter(|video| fits_orientation(video, orientation))
        .collect();
    ranked.sort_by(|a, b| {
        let da = (TARGET_CLIP_SECONDS - a.duration).abs();
        let db = (TARGET_CLIP_SECONDS - b.duration).abs();
        da.total_cmp(&db)
    });

    for video in ranked {
        for file in &video.video_files {
            if file.width != Some(target_width) || file.height != Some(target_height) {
                continue;
            }
            let id = clip_identity(&file.link);
            if used.contains(&id) {
                continue;
            }
            return Some(VideoCandidate {
                id,
                url: file.link.clone(),
                width: target_width,
                height: target_height,
                duration: video.duration,
            });
        }
    }

    debug!(query, "no links found for this query");
    None
}
