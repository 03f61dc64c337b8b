//! Picture storage for saved images.
//!
//! The save workflow sees a single [`StorageSaver`] capability. Two
//! strategies implement it:
//!
//! - [`DirectStorage`]: writes files straight into the user's picture
//!   directory and needs a write-permission probe first
//! - [`MediatedStorage`]: inserts into an app-managed media collection with an
//!   index, so no permission grant is involved
//!
//! [`from_config`] picks one at startup based on what the platform reports.

mod access;
mod direct;
mod mediated;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::{Config, StorageStrategy};
use crate::error::StorageError;

pub use access::check_write_access;
pub use direct::DirectStorage;
pub use mediated::MediatedStorage;

/// Write-only picture storage
#[async_trait]
pub trait StorageSaver: Send + Sync {
    /// Verify the app may write here. Denial must map to
    /// [`StorageError::PermissionDenied`].
    async fn check_permission(&self) -> Result<(), StorageError> {
        Ok(())
    }

    /// Store `bytes` under `filename` (or a collision-free variant of it)
    async fn persist(&self, bytes: Vec<u8>, filename: &str, mime_type: &str)
        -> Result<(), StorageError>;

    /// Human-readable description for logs and diagnostics
    fn describe(&self) -> String;
}

/// Resolve the storage strategy for this platform and configuration
pub fn from_config(config: &Config) -> Result<Arc<dyn StorageSaver>> {
    let override_dir = config.storage.directory.as_ref().map(PathBuf::from);
    let picture_dir = directories::UserDirs::new()
        .and_then(|dirs| dirs.picture_dir().map(|p| p.to_path_buf()));

    let strategy = match config.storage.strategy {
        StorageStrategy::Auto if picture_dir.is_some() || override_dir.is_some() => {
            StorageStrategy::Direct
        }
        StorageStrategy::Auto => StorageStrategy::Mediated,
        forced => forced,
    };

    let saver: Arc<dyn StorageSaver> = match strategy {
        StorageStrategy::Direct => {
            let dir = override_dir
                .or(picture_dir)
                .ok_or_else(|| anyhow::anyhow!("Platform reports no picture directory"))?;
            Arc::new(DirectStorage::new(dir))
        }
        _ => {
            let dir = match override_dir {
                Some(dir) => dir,
                None => MediatedStorage::default_dir()?,
            };
            Arc::new(MediatedStorage::new(dir))
        }
    };

    tracing::debug!("Saving pictures to {}", saver.describe());
    Ok(saver)
}

/// `Image_1.jpg` -> `Image_1_<n>.jpg`
pub(crate) fn numbered_name(filename: &str, n: u32) -> String {
    if n == 0 {
        return filename.to_string();
    }
    match filename.rsplit_once('.') {
        Some((stem, ext)) => format!("{}_{}.{}", stem, n, ext),
        None => format!("{}_{}", filename, n),
    }
}
