//! services/api/src/adapters/file_store.rs
//!
//! The secondary storage tier: one JSON file per search record in a single
//! directory. Files are only ever created, never reopened for writing, and
//! the directory is scanned wholesale on read.

use async_trait::async_trait;
use food_wizard_core::domain::{RawTimestamp, SearchRecord, StoredSearch};
use food_wizard_core::ports::{PortError, PortResult, SearchStore};
use serde::Deserialize;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Attempts at finding a free file name before giving up.
const MAX_NAME_ATTEMPTS: usize = 16;

/// Loose shape of a stored file; older files may use other field names.
#[derive(Deserialize)]
struct FileRecord {
    #[serde(default)]
    id: Option<Value>,
    query: String,
    #[serde(default)]
    results: Option<Value>,
    #[serde(default)]
    created_at: Option<Value>,
    #[serde(default, rename = "createdAt")]
    created_at_camel: Option<Value>,
    #[serde(default)]
    timestamp: Option<Value>,
}

impl FileRecord {
    fn to_domain(self) -> StoredSearch {
        StoredSearch {
            id: self.id.as_ref().and_then(Value::as_i64),
            query: self.query,
            results: self.results,
            created_at: self
                .created_at
                .as_ref()
                .and_then(raw_timestamp)
                .or_else(|| self.created_at_camel.as_ref().and_then(raw_timestamp)),
            timestamp: self.timestamp.as_ref().and_then(raw_timestamp),
        }
    }
}

fn raw_timestamp(value: &Value) -> Option<RawTimestamp> {
    match value {
        Value::String(text) => Some(RawTimestamp::Text(text.clone())),
        Value::Number(n) => n.as_i64().map(RawTimestamp::EpochMillis),
        _ => None,
    }
}

/// Replaces every character outside `[A-Za-z0-9]` with `_`.
pub fn sanitize_query(query: &str) -> String {
    query
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the storage directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        if fs::metadata(&self.dir).await.is_err() {
            fs::create_dir_all(&self.dir).await?;
            info!("Search storage directory created at {}", self.dir.display());
        }
        Ok(())
    }

    fn file_name(record: &SearchRecord, attempt: usize) -> String {
        let stem = format!(
            "{}_{}",
            record.created_at.timestamp_millis(),
            sanitize_query(&record.query)
        );
        if attempt == 0 {
            format!("{}.json", stem)
        } else {
            format!("{}_{}.json", stem, attempt)
        }
    }
}

#[async_trait]
impl SearchStore for FileStore {
    fn name(&self) -> &str {
        "files"
    }

    async fn create(&self, record: &SearchRecord) -> PortResult<()> {
        self.ensure_dir()
            .await
            .map_err(|e| PortError::Unexpected(format!("storage directory: {}", e)))?;
        let content =
            serde_json::to_vec(record).map_err(|e| PortError::Unexpected(e.to_string()))?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = self.dir.join(Self::file_name(record, attempt));
            let file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;
            let mut file = match file {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(PortError::Unexpected(format!("{}: {}", path.display(), e))),
            };
            file.write_all(&content)
                .await
                .map_err(|e| PortError::Unexpected(format!("{}: {}", path.display(), e)))?;
            file.flush()
                .await
                .map_err(|e| PortError::Unexpected(format!("{}: {}", path.display(), e)))?;
            return Ok(());
        }

        Err(PortError::Unexpected(format!(
            "no free file name for search '{}'",
            record.query
        )))
    }

    /// Reads every record in the directory; `limit` is left to the caller.
    async fn find_recent(&self, _limit: usize) -> PortResult<Vec<StoredSearch>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PortError::Unexpected(format!("{}: {}", self.dir.display(), e))),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let content = match fs::read(&path).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping unreadable search file {}: {}", path.display(), e);
                    continue;
                }
            };
            match serde_json::from_slice::<FileRecord>(&content) {
                Ok(record) => records.push(record.to_domain()),
                Err(e) => warn!("Skipping unreadable search file {}: {}", path.display(), e),
            }
        }
        Ok(records)
    }
}
