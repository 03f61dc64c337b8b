//! Pre-flight write access check for picture directories.

use std::path::Path;

use crate::app_data::gallery_data;
use crate::error::StorageError;

/// Check that we can create files in `dir`.
///
/// Creates the directory if needed, then writes and removes a probe file.
/// Any failure is reported as [`StorageError::PermissionDenied`]: from the
/// user's point of view the app is not allowed to save there.
pub async fn check_write_access(dir: &Path) -> Result<(), StorageError> {
    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        tracing::warn!("Cannot create picture directory {:?}: {}", dir, e);
        return Err(StorageError::PermissionDenied);
    }

    let probe = dir.join(&gallery_data().storage.permission_probe);
    match tokio::fs::write(&probe, b"test").await {
        Ok(_) => {
            let _ = tokio::fs::remove_file(&probe).await;
            tracing::debug!("Write access check passed for {:?}", dir);
            Ok(())
        }
        Err(e) => {
            tracing::warn!("Cannot write to picture directory {:?}: {}", dir, e);
            Err(StorageError::PermissionDenied)
        }
    }
}
