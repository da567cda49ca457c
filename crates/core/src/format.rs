use crate::types::{Caption, KeywordSegment, ResolvedSegment};

/// Format seconds as MM:SS timestamp
pub fn format_timestamp(seconds: f64) -> String {
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{:02}:{:02}", mins, secs)
}

/// Captions as the model sees them: one `[[start, end], "text"]` per line.
pub fn format_captions_for_prompt(captions: &[Caption]) -> String {
    captions
        .iter()
        .map(|c| {
            format!(
                "[[{:.2}, {:.2}], {}]",
                c.start,
                c.end,
                serde_json::Value::String(c.text.trim().to_string())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_keywords_readable(segments: &[KeywordSegment]) -> String {
    segments
        .iter()
        .map(|seg| {
            format!(
                "[{}–{}] {}",
                format_timestamp(seg.interval.start),
                format_timestamp(seg.interval.end),
                seg.keywords.join(" | ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_timeline_readable(segments: &[ResolvedSegment]) -> String {
    let mut output = String::new();
    for seg in segments {
        let start = format_timestamp(seg.interval.start);
        let end = format_timestamp(seg.interval.end);
        let visual = seg.url.as_deref().unwrap_or("(no visual)");
        output.push_str(&format!(
            "[{}–{}] {:>6.2}s  {}\n",
            start,
            end,
            seg.interval.duration(),
            visual
        ));
    }
    output
}
