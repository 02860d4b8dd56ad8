//! Where the template document comes from

use crate::{Result, StickerError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Source of the template PDF bytes
///
/// Callers get a shared immutable buffer and never write to it; every
/// composition parses its own copy.
pub trait TemplateStore: Send + Sync {
    fn load(&self) -> Result<Arc<[u8]>>;
}

/// Reads the template from disk on every call
#[derive(Debug, Clone)]
pub struct FileTemplateStore {
    path: PathBuf,
}

impl FileTemplateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TemplateStore for FileTemplateStore {
    fn load(&self) -> Result<Arc<[u8]>> {
        match std::fs::read(&self.path) {
            Ok(bytes) => {
                debug!(path = %self.path.display(), size = bytes.len(), "loaded template");
                Ok(Arc::from(bytes))
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "template unavailable");
                Err(StickerError::TemplateUnavailable(format!(
                    "{}: {e}",
                    self.path.display()
                )))
            }
        }
    }
}

/// Holds the template in memory
#[derive(Debug, Clone)]
pub struct MemoryTemplateStore {
    bytes: Arc<[u8]>,
}

impl MemoryTemplateStore {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Load once from another store and keep the bytes
    pub fn preload(store: &dyn TemplateStore) -> Result<Self> {
        Ok(Self {
            bytes: store.load()?,
        })
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn load(&self) -> Result<Arc<[u8]>> {
        Ok(Arc::clone(&self.bytes))
    }
}
