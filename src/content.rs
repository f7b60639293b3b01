//! Opaque storage for uploaded photo bytes.
//!
//! The game only keeps the returned reference; how and where the bytes live is
//! up to the store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::types::StorageRef;

/// Longest file name stem kept from the client-supplied name
const MAX_NAME_CHARS: usize = 64;

/// Trait that all photo content stores must implement
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store bytes under a fresh unique reference derived from `suggested_name`
    async fn put(&self, bytes: &[u8], suggested_name: &str) -> Result<StorageRef, StorageError>;

    /// Remove stored content
    async fn delete(&self, reference: &str) -> Result<(), StorageError>;

    /// Location the content can be served from
    fn path(&self, reference: &str) -> PathBuf;
}

/// Generate a unique reference: `<ulid>_<sanitized name>`
pub fn new_reference(suggested_name: &str) -> StorageRef {
    let name = sanitize_file_name(suggested_name);
    if name.is_empty() {
        ulid::Ulid::new().to_string()
    } else {
        format!("{}_{}", ulid::Ulid::new(), name)
    }
}

/// Keep only ASCII alphanumerics, '.', '-' and '_'; strip any directory part
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| match c {
            c if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' => c,
            _ => '_',
        })
        .collect();
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    trimmed.chars().take(MAX_NAME_CHARS).collect()
}

/// Photos stored as files in a single directory
#[derive(Debug, Clone)]
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ContentStore for FsContentStore {
    async fn put(&self, bytes: &[u8], suggested_name: &str) -> Result<StorageRef, StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let reference = new_reference(suggested_name);
        tokio::fs::write(self.root.join(&reference), bytes).await?;
        tracing::debug!("Stored {} bytes as {}", bytes.len(), reference);
        Ok(reference)
    }

    async fn delete(&self, reference: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.path(reference)).await {
            Ok(()) => Ok(()),
            // Already gone is fine
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn path(&self, reference: &str) -> PathBuf {
        // References never contain directories; refuse to leave the root
        let name = Path::new(reference).file_name().unwrap_or_default();
        self.root.join(name)
    }
}

/// Keeps photo bytes in memory (tests and throwaway games)
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    blobs: RwLock<HashMap<StorageRef, Vec<u8>>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, reference: &str) -> bool {
        self.blobs.read().await.contains_key(reference)
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn put(&self, bytes: &[u8], suggested_name: &str) -> Result<StorageRef, StorageError> {
        let reference = new_reference(suggested_name);
        self.blobs
            .write()
            .await
            .insert(reference.clone(), bytes.to_vec());
        Ok(reference)
    }

    async fn delete(&self, reference: &str) -> Result<(), StorageError> {
        self.blobs.write().await.remove(reference);
        Ok(())
    }

    fn path(&self, reference: &str) -> PathBuf {
        PathBuf::from(reference)
    }
}
