//! App-managed media collection.
//!
//! Images are staged to a temporary `.part` file inside the collection and
//! moved into place without clobbering, then recorded in a JSON-lines index
//! with their display name, mime type and relative path.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use super::{StorageSaver, numbered_name};
use crate::app_data::gallery_data;
use crate::config::Config;
use crate::error::StorageError;

/// One inserted image in `media_index.jsonl`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaEntry {
    pub display_name: String,
    pub mime_type: String,
    pub relative_path: String,
    pub size: u64,
    pub inserted_at: DateTime<Utc>,
}

/// Media collection rooted at a directory
pub struct MediatedStorage {
    dir: PathBuf,
}

impl MediatedStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<app data dir>/Pictures`
    pub fn default_dir() -> Result<PathBuf> {
        let dirs = Config::project_dirs()?;
        Ok(dirs.data_dir().join(&gallery_data().storage.media_dir))
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(&gallery_data().storage.media_index)
    }

    /// Read back all index entries, skipping malformed lines
    #[cfg(test)]
    async fn entries(&self) -> Result<Vec<MediaEntry>, StorageError> {
        let content = match tokio::fs::read_to_string(self.index_path()).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(content
            .lines()
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping malformed media index line: {}", e);
                    None
                }
            })
            .collect())
    }

    /// Collection-relative path of an inserted file, e.g. `Pictures/Image_1.jpg`
    fn relative_path(&self, name: &str) -> String {
        match self.dir.file_name() {
            Some(collection) => format!("{}/{}", collection.to_string_lossy(), name),
            None => name.to_string(),
        }
    }

    async fn append_entry(&self, entry: &MediaEntry) -> Result<(), StorageError> {
        let mut line =
            serde_json::to_string(entry).map_err(|e| StorageError::Io(e.to_string()))?;
        line.push('\n');

        let mut index = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.index_path())
            .await?;
        index.write_all(line.as_bytes()).await?;
        index.sync_all().await?;
        Ok(())
    }
}

/// Stage `bytes` next to the collection and move them to the first free
/// numbered variant of `filename`. Blocking; run on the blocking pool.
fn stage_and_insert(dir: &Path, bytes: &[u8], filename: &str) -> Result<String, StorageError> {
    let storage = &gallery_data().storage;

    let mut staged = tempfile::Builder::new()
        .prefix(".insert_")
        .suffix(&storage.temp_extension)
        .tempfile_in(dir)?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;

    for n in 0..=storage.max_name_collisions {
        let name = numbered_name(filename, n);
        match staged.persist_noclobber(dir.join(&name)) {
            Ok(_) => return Ok(name),
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => staged = e.file,
            Err(e) => return Err(e.error.into()),
        }
    }

    Err(StorageError::Io(format!(
        "no free file name for {} after {} attempts",
        filename, storage.max_name_collisions
    )))
}

#[async_trait]
impl StorageSaver for MediatedStorage {
    async fn persist(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: &str,
    ) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let size = bytes.len() as u64;
        let dir = self.dir.clone();
        let target = filename.to_string();
        let name = tokio::task::spawn_blocking(move || stage_and_insert(&dir, &bytes, &target))
            .await
            .map_err(|e| StorageError::Io(format!("insert task failed: {}", e)))??;

        let entry = MediaEntry {
            display_name: name.clone(),
            mime_type: mime_type.to_string(),
            relative_path: self.relative_path(&name),
            size,
            inserted_at: Utc::now(),
        };
        if let Err(e) = self.append_entry(&entry).await {
            // An unindexed file is not part of the collection
            tracing::warn!("Indexing {} failed, removing it: {}", name, e);
            let _ = tokio::fs::remove_file(self.dir.join(&name)).await;
            return Err(e);
        }

        tracing::info!("Inserted {} into media collection ({} bytes)", name, size);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("mediated: {}", self.dir.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_insert_writes_file_and_index() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("Pictures");
        let storage = MediatedStorage::new(&dir);

        storage
            .persist(b"jpeg bytes".to_vec(), "Image_42.jpg", "image/jpeg")
            .await
            .unwrap();

        assert_eq!(
            std::fs::read(dir.join("Image_42.jpg")).unwrap(),
            b"jpeg bytes"
        );

        let entries = storage.entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].display_name, "Image_42.jpg");
        assert_eq!(entries[0].mime_type, "image/jpeg");
        assert_eq!(entries[0].relative_path, "Pictures/Image_42.jpg");
        assert_eq!(entries[0].size, 10);
    }

    #[tokio::test]
    async fn test_insert_leaves_no_staging_files() {
        let temp_dir = TempDir::new().unwrap();
        let storage = MediatedStorage::new(temp_dir.path());

        storage
            .persist(b"a".to_vec(), "Image_1.jpg", "image/jpeg")
            .await
            .unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_insert_numbers_collisions() {
        let temp_dir = TempDir::new().unwrap();
        let storage = MediatedStorage::new(temp_dir.path());

        for payload in [b"one".to_vec(), b"two".to_vec()] {
            storage
                .persist(payload, "Image_1.jpg", "image/jpeg")
                .await
                .unwrap();
        }

        assert_eq!(std::fs::read(temp_dir.path().join("Image_1.jpg")).unwrap(), b"one");
        assert_eq!(std::fs::read(temp_dir.path().join("Image_1_1.jpg")).unwrap(), b"two");

        let names: Vec<String> = storage
            .entries()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.display_name)
            .collect();
        assert_eq!(names, vec!["Image_1.jpg", "Image_1_1.jpg"]);
    }

    #[tokio::test]
    async fn test_no_permission_probe_needed() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();

        // The collection grants access itself; failures surface from persist
        let storage = MediatedStorage::new(blocker.join("Pictures"));
        assert!(storage.check_permission().await.is_ok());
        assert!(storage
            .persist(b"a".to_vec(), "Image_1.jpg", "image/jpeg")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_relative_path_follows_collection_dir() {
        let temp_dir = TempDir::new().unwrap();
        let storage = MediatedStorage::new(temp_dir.path().join("Gallery"));

        storage
            .persist(b"a".to_vec(), "Image_7.jpg", "image/jpeg")
            .await
            .unwrap();

        let entries = storage.entries().await.unwrap();
        assert_eq!(entries[0].relative_path, "Gallery/Image_7.jpg");
    }

    #[tokio::test]
    async fn test_failed_index_write_removes_inserted_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("Pictures");
        let storage = MediatedStorage::new(&dir);

        // A directory where the index file should be makes the append fail
        std::fs::create_dir_all(storage.index_path()).unwrap();

        for _ in 0..2 {
            let result = storage
                .persist(b"a".to_vec(), "Image_1.jpg", "image/jpeg")
                .await;
            assert!(matches!(result, Err(StorageError::Io(_))));
        }

        assert!(!dir.join("Image_1.jpg").exists());
        assert!(!dir.join("Image_1_1.jpg").exists());
        let leftovers: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path() != storage.index_path())
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_entries_missing_index_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let storage = MediatedStorage::new(temp_dir.path());
        assert!(storage.entries().await.unwrap().is_empty());
    }
}
