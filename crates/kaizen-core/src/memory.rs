use crate::error::Result;
use crate::io;
use crate::paths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const MEMORY_VERSION: &str = "1.0";

// ---------------------------------------------------------------------------
// MemoryDoc
// ---------------------------------------------------------------------------

/// Free-form key/value session memory, independent of the workflow
/// document. Values are arbitrary JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryDoc {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub data: BTreeMap<String, serde_json::Value>,
}

fn default_version() -> String {
    MEMORY_VERSION.to_string()
}

impl Default for MemoryDoc {
    fn default() -> Self {
        Self {
            version: MEMORY_VERSION.to_string(),
            last_updated: Utc::now(),
            data: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MemoryStore {
    root: PathBuf,
}

impl MemoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Load session memory. Missing or corrupt files yield an empty
    /// default document.
    pub async fn read(&self) -> MemoryDoc {
        let path = paths::memory_path(&self.root);
        if io::file_exists(&path).await {
            match io::read_json::<MemoryDoc>(&path).await {
                Ok(doc) => return doc,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "unreadable session memory, using defaults");
                }
            }
        }
        MemoryDoc::default()
    }

    /// Write one key and persist the whole document.
    pub async fn write_key(&self, key: &str, value: serde_json::Value) -> Result<MemoryDoc> {
        let mut doc = self.read().await;
        doc.data.insert(key.to_string(), value);
        doc.last_updated = Utc::now();
        io::write_json(&paths::memory_path(&self.root), &doc).await?;
        Ok(doc)
    }

    pub fn path(&self) -> PathBuf {
        paths::memory_path(&self.root)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
