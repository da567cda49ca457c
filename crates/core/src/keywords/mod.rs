//! Timed search keywords from a language model.

pub mod extractor;
pub mod parser;

pub use extractor::{KEYWORD_SYSTEM_PROMPT, KeywordExtractor, format_keyword_request};
pub use parser::{
    NORMALIZATION_RULES, NormalizationRule, ensure_full_coverage, normalize, parse_keyword_response,
};
