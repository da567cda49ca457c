//! Tolerant parsing of the model's `[[[t1, t2], ["kw", ...]], ...]` answer.
//!
//! Strict JSON is tried first. Only when that fails is the text run through
//! [`NORMALIZATION_RULES`], in order, and parsed again.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::{
    error::ExtractionError,
    types::{KeywordSegment, TimeInterval},
};

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```[A-Za-z]*").unwrap());

static NUMERIC_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:np|numpy)\.(?:float|int|uint)(?:8|16|32|64)?\(\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)\s*\)",
    )
    .unwrap()
});

static TRAILING_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",(\s*[\]}])").unwrap());

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NormalizationRule {
    /// Drop markdown fences such as ```` ```json ````.
    StripCodeFences,
    /// Keep only the text between the first `[` and the last `]`.
    TrimToOuterArray,
    /// Straighten typographic quotes and turn single-quoted strings into JSON strings.
    NormalizeQuotes,
    /// `np.float64(3.5)` -> `3.5`
    UnwrapNumericTags,
    /// `[1, 2,]` -> `[1, 2]`
    RemoveTrailingCommas,
}

pub const NORMALIZATION_RULES: [NormalizationRule; 5] = [
    NormalizationRule::StripCodeFences,
    NormalizationRule::TrimToOuterArray,
    NormalizationRule::NormalizeQuotes,
    NormalizationRule::UnwrapNumericTags,
    NormalizationRule::RemoveTrailingCommas,
];

impl NormalizationRule {
    pub fn apply(&self, input: &str) -> String {
        match self {
            NormalizationRule::StripCodeFences => CODE_FENCE.replace_all(input, "").into_owned(),
            NormalizationRule::TrimToOuterArray => match (input.find('['), input.rfind(']')) {
                (Some(open), Some(close)) if open < close => input[open..=close].to_string(),
                _ => input.to_string(),
            },
            NormalizationRule::NormalizeQuotes => {
                let straightened: String = input
                    .chars()
                    .map(|c| match c {
                        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{00AB}' | '\u{00BB}' => '"',
                        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => '\'',
                        other => other,
                    })
                    .collect();
                single_to_double_quotes(&straightened)
            }
            NormalizationRule::UnwrapNumericTags => {
                NUMERIC_TAG.replace_all(input, "$1").into_owned()
            }
            NormalizationRule::RemoveTrailingCommas => {
                TRAILING_COMMA.replace_all(input, "$1").into_owned()
            }
        }
    }
}

/// Run every normalization rule over `raw`.
pub fn normalize(raw: &str) -> String {
    NORMALIZATION_RULES
        .iter()
        .fold(raw.to_string(), |text, rule| rule.apply(&text))
        .trim()
        .to_string()
}

/// Rewrite `'...'` string literals as `"..."`, leaving apostrophes inside
/// double-quoted strings alone.
fn single_to_double_quotes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_double = false;
    let mut in_single = false;
    let mut escaped = false;

    for c in input.chars() {
        if in_double {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_double = false;
            }
        } else if in_single {
            if escaped {
                if c != '\'' {
                    out.push('\\');
                }
                out.push(c);
                escaped = false;
            } else {
                match c {
                    '\\' => escaped = true,
                    '\'' => {
                        out.push('"');
                        in_single = false;
                    }
                    '"' => out.push_str("\\\""),
                    other => out.push(other),
                }
            }
        } else {
            match c {
                '"' => {
                    in_double = true;
                    out.push(c);
                }
                '\'' => {
                    in_single = true;
                    out.push('"');
                }
                other => out.push(other),
            }
        }
    }

    out
}

fn malformed(reason: impl Into<String>) -> ExtractionError {
    ExtractionError::Malformed {
        reason: reason.into(),
    }
}

/// Parse a keyword response into segments.
///
/// Any error is a signal to request a fresh generation; `Ok(vec![])` means the
/// model really answered with an empty list.
pub fn parse_keyword_response(raw: &str) -> Result<Vec<KeywordSegment>, ExtractionError> {
    let value: Value = match serde_json::from_str(raw.trim()) {
        Ok(value) => value,
        Err(strict) => {
            let cleaned = normalize(raw);
            serde_json::from_str(&cleaned)
                .map_err(|e| malformed(format!("{e} after cleanup (strict parse: {strict})")))?
        }
    };

    let items = value
        .as_array()
        .ok_or_else(|| malformed("expected a JSON array of segments"))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| segment_from_value(index, item))
        .collect()
}

fn segment_from_value(index: usize, item: &Value) -> Result<KeywordSegment, ExtractionError> {
    let pair = item
        .as_array()
        .filter(|pair| pair.len() == 2)
        .ok_or_else(|| malformed(format!("segment {index} is not an [interval, keywords] pair")))?;

    let interval = interval_from_value(&pair[0])
        .ok_or_else(|| malformed(format!("segment {index} has an invalid interval: {}", pair[0])))?;

    let keywords = keywords_from_value(&pair[1])
        .ok_or_else(|| malformed(format!("segment {index} has invalid keywords: {}", pair[1])))?;

    Ok(KeywordSegment { interval, keywords })
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn interval_from_value(value: &Value) -> Option<TimeInterval> {
    let bounds = value.as_array().filter(|bounds| bounds.len() == 2)?;
    let start = number(&bounds[0])?;
    let end = number(&bounds[1])?;
    (start >= 0.0 && end > start).then(|| TimeInterval::new(start, end))
}

fn keywords_from_value(value: &Value) -> Option<Vec<String>> {
    let raw: Vec<&str> = match value {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().map(Value::as_str).collect::<Option<_>>()?,
        _ => return None,
    };

    let mut keywords: Vec<String> = Vec::with_capacity(raw.len());
    for keyword in raw.iter().map(|k| k.trim()).filter(|k| !k.is_empty()) {
        if !keywords.iter().any(|existing| existing == keyword) {
            keywords.push(keyword.to_string());
        }
    }

    (!keywords.is_empty()).then_some(keywords)
}

/// Check that the segments tile `[0, total_duration]`: first starts at 0, each
/// starts where the previous ends, and the last ends where the narration ends.
pub fn ensure_full_coverage(
    segments: &[KeywordSegment],
    total_duration: f64,
    tolerance: f64,
) -> Result<(), ExtractionError> {
    let mut end = 0.0;
    for segment in segments {
        if (segment.interval.start - end).abs() > tolerance {
            return Err(ExtractionError::Discontinuous {
                end,
                next_start: segment.interval.start,
            });
        }
        end = segment.interval.end;
    }

    let covered = segments.last().map(|s| s.interval.end).unwrap_or(0.0);
    if (covered - total_duration).abs() <= tolerance {
        Ok(())
    } else {
        Err(ExtractionError::IncompleteCoverage {
            covered,
            expected: total_duration,
        })
    }
}
