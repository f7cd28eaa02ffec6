pub mod migrate;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::category::CategoryItem;
use crate::core::task::Task;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The persisted blob: a schema version plus the full state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub version: u32,
    pub state: PersistedState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub saved_texts: Vec<Task>,
    pub categories: Vec<CategoryItem>,
}

/// Synchronous single-key blob store holding one document.
///
/// `load` hands back raw JSON because the stored shape may predate the
/// current schema; the migration engine turns it into a [`Document`].
pub trait Backing {
    fn load(&self) -> Result<Option<Value>, StorageError>;
    fn save(&mut self, document: &Document) -> Result<(), StorageError>;
}

/// A JSON file named after the storage key.
#[derive(Debug, Clone)]
pub struct JsonFileBacking {
    path: PathBuf,
}

impl JsonFileBacking {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Backing for JsonFileBacking {
    fn load(&self) -> Result<Option<Value>, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Writes to a sibling temp file and renames it over the target.
    fn save(&mut self, document: &Document) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_string_pretty(document)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

/// In-memory backing. Keeps the last saved document as raw JSON.
#[derive(Debug, Clone, Default)]
pub struct MemoryBacking {
    value: Option<Value>,
    saves: usize,
}

impl MemoryBacking {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an arbitrary stored value, e.g. a legacy document.
    pub fn with_value(value: Value) -> Self {
        Self {
            value: Some(value),
            saves: 0,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Number of successful writes so far.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl Backing for MemoryBacking {
    fn load(&self) -> Result<Option<Value>, StorageError> {
        Ok(self.value.clone())
    }

    fn save(&mut self, document: &Document) -> Result<(), StorageError> {
        self.value = Some(serde_json::to_value(document)?);
        self.saves += 1;
        Ok(())
    }
}
