use tracing::{info, warn};

use crate::{
    audit::{AuditKind, AuditLog},
    captions::caption_duration,
    config::ExtractionConfig,
    error::{ClipError, ExtractionError, Result},
    format::format_captions_for_prompt,
    keywords::parser::{ensure_full_coverage, parse_keyword_response},
    provider::ChatModel,
    types::{Caption, KeywordSegment},
};

pub const KEYWORD_SYSTEM_PROMPT: &str = r#"# Instructions

You receive the script of a short narrated video and its timed captions. Split the
timeline into consecutive segments and give every segment up to three search
phrases for finding matching stock footage.

Output format, and nothing else:
[[[t1, t2], ["phrase 1", "phrase 2", "phrase 3"]], [[t2, t3], ["phrase 4", "phrase 5"]], ...]

Rules:
- Segments must be strictly consecutive, start at 0 and end exactly at the end time of
  the last caption.
- Prefer fewer, longer segments: each should span roughly 3-5 seconds.
- Order phrases from most to least relevant; at most three per segment.
- Every phrase must describe something a camera can film. "crying child" is good,
  "emotional moment" is not. "rainy street" is good, "bad weather vibes" is not.
- Use two-word phrases when a single word would be vague ("fast car", not "car").
- If a caption is vague, use the next caption for context.
- English only, even when the script is in another language.
- Plain JSON: double quotes, no markdown, no comments, no trailing commas.
"#;

/// Collapse every run of whitespace into a single space.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn format_keyword_request(script: &str, captions: &[Caption]) -> String {
    format!(
        "Script: {}\nTimed Captions:\n{}\n",
        script.trim(),
        format_captions_for_prompt(captions)
    )
}

/// Asks the model for timed search keywords until the answer covers the whole narration.
pub struct KeywordExtractor<'a, C> {
    chat: &'a C,
    config: ExtractionConfig,
    audit: Option<&'a AuditLog>,
}

impl<'a, C: ChatModel> KeywordExtractor<'a, C> {
    pub fn new(chat: &'a C, config: ExtractionConfig) -> Self {
        Self {
            chat,
            config,
            audit: None,
        }
    }

    pub fn with_audit(mut self, audit: &'a AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    pub async fn extract(&self, script: &str, captions: &[Caption]) -> Result<Vec<KeywordSegment>> {
        let total_duration = caption_duration(captions);
        let user_prompt = format_keyword_request(script, captions);
        let mut last_error = ExtractionError::Malformed {
            reason: "no generation was requested".to_string(),
        };

        for attempt in 1..=self.config.max_attempts {
            let text = self.chat.complete(KEYWORD_SYSTEM_PROMPT, &user_prompt).await?;
            let text = collapse_whitespace(&text);

            if let Some(audit) = self.audit {
                audit
                    .record(
                        AuditKind::Llm,
                        "keywords",
                        serde_json::json!({ "attempt": attempt, "response": text }),
                    )
                    .await;
            }

            let parsed = parse_keyword_response(&text).and_then(|segments| {
                ensure_full_coverage(&segments, total_duration, self.config.coverage_tolerance)
                    .map(|_| segments)
            });

            match parsed {
                Ok(segments) => {
                    info!(
                        attempt,
                        segments = segments.len(),
                        "keyword segments cover {:.2}s",
                        total_duration
                    );
                    return Ok(segments);
                }
                Err(e) => {
                    warn!(
                        attempt,
                        max_attempts = self.config.max_attempts,
                        "{e}, requesting a new generation"
                    );
                    last_error = e;
                }
            }
        }

        Err(ClipError::KeywordExtractionFailed {
            attempts: self.config.max_attempts,
            last: last_error,
        })
    }
}
