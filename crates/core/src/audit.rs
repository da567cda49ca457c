use std::{
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use tokio::{fs, io::AsyncWriteExt};
use tracing::warn;
use uuid::Uuid;

use crate::error::Result;

/// Default root for audit logs: `<user cache dir>/clipline/logs`
pub fn get_root_log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("clipline")
        .join("logs")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuditKind {
    Pexels,
    Llm,
}

impl AuditKind {
    fn file_name(&self) -> &'static str {
        match self {
            AuditKind::Pexels => "pexels.jsonl",
            AuditKind::Llm => "llm.jsonl",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuditRecord {
    pub ts: f64,
    pub key: String,
    pub payload: serde_json::Value,
}

/// Append-only record of every upstream exchange made during one run.
#[derive(Debug, Clone)]
pub struct AuditLog {
    dir: PathBuf,
}

impl AuditLog {
    /// Create `<root>/<run_id>/` and log into it.
    pub async fn create(root: &Path, run_id: Uuid) -> Result<Self> {
        let dir = root.join(run_id.to_string());
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, kind: AuditKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    /// Append a record. Failures are logged, never propagated.
    pub async fn record(&self, kind: AuditKind, key: &str, payload: serde_json::Value) {
        if let Err(e) = self.append(kind, key, payload).await {
            warn!(path = %self.path_for(kind).display(), "failed to write audit record: {e}");
        }
    }

    async fn append(&self, kind: AuditKind, key: &str, payload: serde_json::Value) -> Result<()> {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        let record = AuditRecord {
            ts,
            key: key.to_string(),
            payload,
        };

        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(kind))
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Load every record of one kind, oldest first.
pub async fn load_records(log: &AuditLog, kind: AuditKind) -> Result<Vec<AuditRecord>> {
    let content = fs::read_to_string(log.path_for(kind)).await?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(Into::into))
        .collect()
}
