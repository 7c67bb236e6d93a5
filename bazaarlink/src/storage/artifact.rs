//! Similarity table artifacts

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::similarity::SimilarityTable;
use crate::storage::errors::{StorageError, StorageResult};
use crate::storage::traits::ArtifactStore;

/// Envelope version written by this build
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SimilarityArtifact {
    format_version: u32,
    published_at: DateTime<Utc>,
    table: SimilarityTable,
}

#[derive(Debug, Deserialize)]
struct ArtifactHeader {
    format_version: u32,
}

fn validate_name(name: &str) -> StorageResult<()> {
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(StorageError::Validation(format!(
            "invalid artifact name: {:?}",
            name
        )));
    }
    Ok(())
}

/// Stores each artifact as `<dir>/<name>.json`.
///
/// Publishing writes a temporary file in the same directory and renames it over
/// the target, so a reader sees either the previous file or the new one.
#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    dir: PathBuf,
}

impl FileArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

#[async_trait]
impl ArtifactStore for FileArtifactStore {
    async fn load_similarity(&self, name: &str) -> StorageResult<Option<SimilarityTable>> {
        validate_name(name)?;
        let path = self.path_for(name);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let header: ArtifactHeader = serde_json::from_slice(&bytes)?;
        if header.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(StorageError::UnsupportedFormat(header.format_version));
        }

        let artifact: SimilarityArtifact = serde_json::from_slice(&bytes)?;
        debug!(
            "Loaded artifact {} published at {}",
            path.display(),
            artifact.published_at
        );
        Ok(Some(artifact.table))
    }

    async fn publish_similarity(&self, name: &str, table: &SimilarityTable) -> StorageResult<()> {
        validate_name(name)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let artifact = SimilarityArtifact {
            format_version: ARTIFACT_FORMAT_VERSION,
            published_at: Utc::now(),
            table: table.clone(),
        };
        let bytes = serde_json::to_vec(&artifact)?;

        let tmp = self
            .dir
            .join(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4()));
        let target = self.path_for(name);
        let written = match write_synced(&tmp, &bytes).await {
            Ok(()) => tokio::fs::rename(&tmp, &target).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                warn!("Failed to remove temporary artifact {}: {}", tmp.display(), cleanup);
            }
            return Err(e.into());
        }

        debug!("Published artifact {}", target.display());
        Ok(())
    }
}

/// Write `bytes` to a fresh file and flush it to disk, so a later rename never
/// exposes a partially written artifact
async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

/// Keeps artifacts in process memory
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    tables: RwLock<HashMap<String, Arc<SimilarityTable>>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.tables.read().await.contains_key(name)
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn load_similarity(&self, name: &str) -> StorageResult<Option<SimilarityTable>> {
        Ok(self
            .tables
            .read()
            .await
            .get(name)
            .map(|table| table.as_ref().clone()))
    }

    async fn publish_similarity(&self, name: &str, table: &SimilarityTable) -> StorageResult<()> {
        validate_name(name)?;
        self.tables
            .write()
            .await
            .insert(name.to_string(), Arc::new(table.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::Neighbor;
    use std::collections::BTreeMap;

    fn table() -> SimilarityTable {
        let mut neighbors = BTreeMap::new();
        neighbors.insert("u1".to_string(), vec![Neighbor::new("u2", 0.5)]);
        neighbors.insert("u2".to_string(), vec![Neighbor::new("u1", 0.5)]);
        SimilarityTable::new(neighbors, Utc::now())
    }

    #[tokio::test]
    async fn test_file_store_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileArtifactStore::new(dir.path().join("models"));
        assert!(store.load_similarity("user_similarity").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_publish_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileArtifactStore::new(dir.path());

        store
            .publish_similarity("user_similarity", &SimilarityTable::empty())
            .await
            .unwrap();
        let table = table();
        store.publish_similarity("user_similarity", &table).await.unwrap();

        let loaded = store.load_similarity("user_similarity").await.unwrap();
        assert_eq!(loaded, Some(table));

        // no temporary files left behind
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_publish_keeps_directory_clean() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileArtifactStore::new(dir.path());
        // a directory in the way makes the final rename fail
        std::fs::create_dir(store.path_for("user_similarity")).unwrap();

        let result = store.publish_similarity("user_similarity", &table()).await;
        assert!(result.is_err());

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["user_similarity.json".to_string()]);
    }

    #[tokio::test]
    async fn test_file_store_rejects_unknown_version() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileArtifactStore::new(dir.path());
        std::fs::write(
            store.path_for("user_similarity"),
            r#"{"format_version": 99, "published_at": "2024-01-01T00:00:00Z", "table": {}}"#,
        )
        .unwrap();

        let result = store.load_similarity("user_similarity").await;
        assert!(matches!(result, Err(StorageError::UnsupportedFormat(99))));
    }

    #[tokio::test]
    async fn test_invalid_names() {
        let store = MemoryArtifactStore::new();
        for name in ["", "../escape", ".hidden"] {
            assert!(store.publish_similarity(name, &table()).await.is_err());
        }
        assert!(!store.contains("../escape").await);
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryArtifactStore::new();
        assert!(store.load_similarity("m").await.unwrap().is_none());
        let table = table();
        store.publish_similarity("m", &table).await.unwrap();
        assert_eq!(store.load_similarity("m").await.unwrap(), Some(table));
    }
}
