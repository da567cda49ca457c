//! Clipline Core Library
//!
//! Turns a narration's timed captions into a gap-free sequence of stock-video
//! clips: keyword extraction with a language model, rate-limited stock search,
//! clip selection with reuse and deduplication, and gap merging.

pub mod audit;
pub mod captions;
pub mod config;
pub mod error;
pub mod format;
pub mod keywords;
pub mod merge;
pub mod pipeline;
pub mod provider;
pub mod render;
pub mod resolver;
pub mod script;
pub mod search;
pub mod selector;
pub mod types;

// Re-export commonly used items at crate root
pub use audit::{AuditKind, AuditLog, get_root_log_dir};
pub use captions::{caption_duration, load_captions};
pub use config::{ExtractionConfig, ResolverConfig, SearchConfig};
pub use error::{ClipError, ExtractionError, Result, SearchError};
pub use format::{format_keywords_readable, format_timeline_readable, format_timestamp};
pub use keywords::{KeywordExtractor, parse_keyword_response};
pub use merge::{covers, merge_gaps};
pub use pipeline::{Timeline, build_search_client, extract_keywords, resolve_timeline};
pub use provider::{ChatClient, ChatModel, Provider, ProviderConfig};
pub use render::{MediaRenderer, PlanWriter, RenderPlan, load_render_plan, save_render_plan};
pub use resolver::{ClipFinder, ResolveSummary, SegmentResolver, UsedVideoSet};
pub use script::generate_script;
pub use search::{PexelsTransport, QueryCache, SearchClient, SearchTransport};
pub use selector::select_video;
pub use types::{
    Caption, KeywordSegment, Orientation, ResolvedSegment, StockVideo, TimeInterval,
    VideoCandidate, VideoFile,
};
