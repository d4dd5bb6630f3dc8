//! Persistence backends for the knowledge base
//!
//! The whole aggregate is serialized as a single JSON document per user
//! profile, timestamps as RFC3339 strings. The file backend is the normal
//! mode; the in-memory backend serves tests and path-less configurations.

use super::types::KnowledgeBase;
use crate::error::KnowledgeResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Storage seam for the knowledge base document
#[async_trait]
pub trait KnowledgeStorage: Send + Sync {
    /// Load the persisted knowledge base, if one exists
    ///
    /// `Ok(None)` means nothing has been persisted yet; an error means a
    /// document exists but could not be read or parsed.
    async fn load(&self) -> KnowledgeResult<Option<KnowledgeBase>>;

    /// Persist the full knowledge base, replacing any previous document
    async fn save(&self, base: &KnowledgeBase) -> KnowledgeResult<()>;
}

/// File-backed storage, one JSON document per profile
#[derive(Debug)]
pub struct FileKnowledgeStorage {
    path: PathBuf,
}

impl FileKnowledgeStorage {
    /// Create storage rooted at the given profile path
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the profile path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl KnowledgeStorage for FileKnowledgeStorage {
    async fn load(&self) -> KnowledgeResult<Option<KnowledgeBase>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        let base: KnowledgeBase = serde_json::from_str(&content)?;
        Ok(Some(base))
    }

    async fn save(&self, base: &KnowledgeBase) -> KnowledgeResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(base)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

/// In-memory storage (for tests and path-less configurations)
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    document: RwLock<Option<KnowledgeBase>>,
}

impl InMemoryStorage {
    /// Create empty in-memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KnowledgeStorage for InMemoryStorage {
    async fn load(&self) -> KnowledgeResult<Option<KnowledgeBase>> {
        Ok(self.document.read().await.clone())
    }

    async fn save(&self, base: &KnowledgeBase) -> KnowledgeResult<()> {
        *self.document.write().await = Some(base.clone());
        Ok(())
    }
}
