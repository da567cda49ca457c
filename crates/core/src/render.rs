use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::warn;

use crate::{
    error::Result,
    types::{Caption, Orientation, ResolvedSegment},
};

/// Everything the media renderer needs to compose the final video.
///
/// Segments with no URL mean "no visual for this interval".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPlan {
    pub orientation: Orientation,
    pub audio: Option<PathBuf>,
    pub captions: Vec<Caption>,
    pub segments: Vec<ResolvedSegment>,
}

impl RenderPlan {
    pub fn unresolved(&self) -> usize {
        self.segments.iter().filter(|s| s.url.is_none()).count()
    }
}

/// Consumer of a finished plan.
pub trait MediaRenderer {
    async fn render(&self, plan: &RenderPlan) -> Result<PathBuf>;
}

/// Hands the plan over by writing it as pretty JSON for an external renderer.
pub struct PlanWriter {
    output: PathBuf,
}

impl PlanWriter {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
        }
    }
}

impl MediaRenderer for PlanWriter {
    async fn render(&self, plan: &RenderPlan) -> Result<PathBuf> {
        if plan.unresolved() > 0 {
            warn!(
                unresolved = plan.unresolved(),
                "plan contains intervals without a visual"
            );
        }
        save_render_plan(plan, &self.output).await?;
        Ok(self.output.clone())
    }
}

/// Save a render plan to a file
pub async fn save_render_plan(plan: &RenderPlan, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let pretty_json = serde_json::to_string_pretty(plan)?;
    fs::write(path, &pretty_json).await?;
    Ok(())
}

/// Load a render plan from a file
pub async fn load_render_plan(path: &Path) -> Result<RenderPlan> {
    let json_content = fs::read_to_string(path).await?;
    let plan: RenderPlan = serde_json::from_str(&json_content)?;
    Ok(plan)
}
