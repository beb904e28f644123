//! Durable byte store for the configuration document

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Where the configuration document lives between boots
#[async_trait]
pub trait ConfigStorage: Send + Sync {
    /// Read the stored document
    ///
    /// Returns `None` if nothing has been stored yet.
    async fn read(&self) -> StorageResult<Option<Vec<u8>>>;

    /// Replace the stored document
    async fn write(&self, bytes: &[u8]) -> StorageResult<()>;
}

/// Single JSON file on disk
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl ConfigStorage for FileStorage {
    async fn read(&self) -> StorageResult<Option<Vec<u8>>> {
        match fs::read(&self.path).await {
            Ok(bytes) => {
                debug!(path = ?self.path, len = bytes.len(), "Loaded configuration file");
                Ok(Some(bytes))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "Configuration file not found");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Writes atomically by first writing to a temp file, then renaming.
    async fn write(&self, bytes: &[u8]) -> StorageResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = self.temp_path();
        fs::write(&temp_path, bytes).await?;
        fs::rename(&temp_path, &self.path).await?;

        debug!(path = ?self.path, len = bytes.len(), "Saved configuration file");
        Ok(())
    }
}

/// Volatile store, for tests and hosts without a filesystem
#[derive(Debug, Default)]
pub struct MemoryStorage {
    document: RwLock<Option<Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start out holding `bytes`
    pub fn with_document(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            document: RwLock::new(Some(bytes.into())),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every later write fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Current contents
    pub async fn document(&self) -> Option<Vec<u8>> {
        self.document.read().await.clone()
    }
}

#[async_trait]
impl ConfigStorage for MemoryStorage {
    async fn read(&self) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.document.read().await.clone())
    }

    async fn write(&self, bytes: &[u8]) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                reason: "writes disabled".to_string(),
            });
        }
        *self.document.write().await = Some(bytes.to_vec());
        Ok(())
    }
}
