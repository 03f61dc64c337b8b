//! Direct filesystem writes into the picture directory.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::{StorageSaver, check_write_access, numbered_name};
use crate::app_data::gallery_data;
use crate::error::StorageError;

/// Writes saved images as plain files into a directory
pub struct DirectStorage {
    dir: PathBuf,
}

impl DirectStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create `filename` without overwriting anything, numbering on collision
    async fn create_unique(&self, filename: &str) -> Result<(PathBuf, tokio::fs::File), StorageError> {
        let max = gallery_data().storage.max_name_collisions;
        for n in 0..=max {
            let path = self.dir.join(numbered_name(filename, n));
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(StorageError::Io(format!(
            "no free file name for {} after {} attempts",
            filename, max
        )))
    }
}

#[async_trait]
impl StorageSaver for DirectStorage {
    async fn check_permission(&self) -> Result<(), StorageError> {
        check_write_access(&self.dir).await
    }

    async fn persist(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: &str,
    ) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let (path, mut file) = self.create_unique(filename).await?;
        let written = async {
            file.write_all(&bytes).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e.into());
        }

        tracing::info!(
            "Saved {} ({}, {} bytes)",
            path.display(),
            mime_type,
            bytes.len()
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!("direct: {}", self.dir.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_persist_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("Pictures");
        let storage = DirectStorage::new(&dir);

        storage
            .persist(b"jpeg bytes".to_vec(), "Image_1.jpg", "image/jpeg")
            .await
            .unwrap();

        let saved = dir.join("Image_1.jpg");
        assert_eq!(std::fs::read(saved).unwrap(), b"jpeg bytes");
    }

    #[tokio::test]
    async fn test_persist_never_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let storage = DirectStorage::new(temp_dir.path());

        storage
            .persist(b"first".to_vec(), "Image_1.jpg", "image/jpeg")
            .await
            .unwrap();
        storage
            .persist(b"second".to_vec(), "Image_1.jpg", "image/jpeg")
            .await
            .unwrap();

        assert_eq!(
            std::fs::read(temp_dir.path().join("Image_1.jpg")).unwrap(),
            b"first"
        );
        assert_eq!(
            std::fs::read(temp_dir.path().join("Image_1_1.jpg")).unwrap(),
            b"second"
        );
    }

    #[tokio::test]
    async fn test_permission_check_uses_target_dir() {
        let temp_dir = TempDir::new().unwrap();
        let storage = DirectStorage::new(temp_dir.path().join("Pictures"));
        assert!(storage.check_permission().await.is_ok());

        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let storage = DirectStorage::new(blocker.join("Pictures"));
        assert_eq!(
            storage.check_permission().await,
            Err(StorageError::PermissionDenied)
        );
    }
}
