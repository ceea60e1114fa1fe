//! Flat-file query log for completed consultations.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bot::collector::CollectedData;

/// Advice preview length stored with each record, in characters.
const PREVIEW_CHARS: usize = 200;

/// Summary of one completed conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub user_id: i64,
    pub data: CollectedData,
    pub response_preview: String,
    pub timestamp: String,
}

impl QueryRecord {
    pub fn new(user_id: i64, data: CollectedData, advice: &str) -> Self {
        Self {
            record_type: "telegram_query".to_string(),
            user_id,
            data,
            response_preview: advice_preview(advice),
            timestamp: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// First 200 characters of the advice, always followed by an ellipsis marker.
pub fn advice_preview(advice: &str) -> String {
    let mut preview: String = advice.chars().take(PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}

/// Fire-and-forget write of a completed-conversation summary. Failures must
/// never abort the user-facing response already in flight; callers log and
/// continue.
pub trait RecordSink: Send + Sync {
    fn add_record(&self, record: QueryRecord) -> std::io::Result<()>;
}

/// Append-only JSON-lines file, one record per line.
pub struct QueryLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl QueryLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path, write_lock: Mutex::new(()) }
    }

    /// Query log under the data directory.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("queries.jsonl"))
    }
}

impl RecordSink for QueryLog {
    fn add_record(&self, record: QueryRecord) -> std::io::Result<()> {
        let line = serde_json::to_string(&record)?;

        let _guard = self.write_lock.lock().expect("query log lock poisoned");
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;

        info!("Logged query from user {} to {:?}", record.user_id, self.path);
        Ok(())
    }
}
