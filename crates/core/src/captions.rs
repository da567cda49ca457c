use std::path::Path;

use serde::Deserialize;
use tokio::fs;

use crate::{
    error::{ClipError, Result},
    types::Caption,
};

/// Accepted caption file layouts: a bare list, or a transcript object with `segments`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CaptionFile {
    List(Vec<Caption>),
    Transcript { segments: Vec<Caption> },
}

/// Load timed captions from a JSON file
pub async fn load_captions(path: &Path) -> Result<Vec<Caption>> {
    let json_content = fs::read_to_string(path).await?;
    parse_captions(path, &json_content)
}

pub fn parse_captions(path: &Path, json_content: &str) -> Result<Vec<Caption>> {
    let captions = match serde_json::from_str::<CaptionFile>(json_content)? {
        CaptionFile::List(captions) => captions,
        CaptionFile::Transcript { segments } => segments,
    };

    let invalid = |reason: String| ClipError::InvalidCaptions {
        path: path.to_path_buf(),
        reason,
    };

    if captions.is_empty() {
        return Err(invalid("no captions".to_string()));
    }
    if let Some((index, caption)) = captions
        .iter()
        .enumerate()
        .find(|(_, c)| c.end <= c.start || c.start < 0.0)
    {
        return Err(invalid(format!(
            "caption {index} has an invalid interval {}",
            caption.interval()
        )));
    }

    Ok(captions)
}

/// Length of the narration: where the last caption ends.
pub fn caption_duration(captions: &[Caption]) -> f64 {
    captions.last().map(|c| c.end).unwrap_or(0.0)
}
