//! Save-to-storage workflow and its outcome stream

use std::io::Cursor;
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::{ImageError, ImageReader, Limits};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::app_data::{gallery_data, messages};
use crate::error::{DecodeError, SaveError, StorageError};
use crate::repository::ImageSource;
use crate::storage::StorageSaver;

/// Buffered outcomes per subscriber before the oldest are dropped
const OUTCOME_CAPACITY: usize = 16;

/// Result of one save attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SaveOutcome {
    Success,
    Failure { message: String },
}

impl SaveOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SaveOutcome::Success)
    }
}

/// Saves displayed images to picture storage.
///
/// Every [`save`](Self::save) emits exactly one [`SaveOutcome`] on a
/// broadcast channel. Outcomes are not replayed: a receiver obtained from
/// [`subscribe`](Self::subscribe) after an emission never sees it. Saves are
/// independent of each other and may run concurrently.
#[derive(Clone)]
pub struct SaveWorkflow {
    source: Arc<dyn ImageSource>,
    storage: Arc<dyn StorageSaver>,
    outcome_tx: broadcast::Sender<SaveOutcome>,
}

impl SaveWorkflow {
    pub fn new(source: Arc<dyn ImageSource>, storage: Arc<dyn StorageSaver>) -> Self {
        let (outcome_tx, _) = broadcast::channel(OUTCOME_CAPACITY);
        Self {
            source,
            storage,
            outcome_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SaveOutcome> {
        self.outcome_tx.subscribe()
    }

    /// Description of where images end up
    pub fn destination(&self) -> String {
        self.storage.describe()
    }

    /// Save the image at `image_url` on a background task.
    ///
    /// The outcome is broadcast to current subscribers and also returned
    /// through the handle.
    pub fn save(&self, image_url: impl Into<String>) -> JoinHandle<SaveOutcome> {
        let image_url = image_url.into();
        let source = Arc::clone(&self.source);
        let storage = Arc::clone(&self.storage);
        let outcome_tx = self.outcome_tx.clone();

        tokio::spawn(async move {
            let outcome = match save_image(source.as_ref(), storage.as_ref(), &image_url).await {
                Ok(()) => SaveOutcome::Success,
                Err(e) => {
                    tracing::warn!("Saving {} failed: {}", image_url, e);
                    SaveOutcome::Failure {
                        message: e.user_message(),
                    }
                }
            };
            // No live subscribers is fine: outcomes are at-most-once
            let _ = outcome_tx.send(outcome.clone());
            outcome
        })
    }

    /// Save and wait for the outcome
    pub async fn save_and_wait(&self, image_url: impl Into<String>) -> SaveOutcome {
        match self.save(image_url).await {
            Ok(outcome) => outcome,
            Err(e) => SaveOutcome::Failure {
                message: format!("{}{}", messages().save_failed_prefix, e),
            },
        }
    }
}

/// Timestamp-based target name, e.g. `Image_1727041906123.jpg`
pub fn generate_filename() -> String {
    let save = &gallery_data().save;
    format!(
        "{}{}.{}",
        save.filename_prefix,
        chrono::Utc::now().timestamp_millis(),
        save.extension
    )
}

/// Permission check, download, decode, re-encode, persist
async fn save_image(
    source: &dyn ImageSource,
    storage: &dyn StorageSaver,
    image_url: &str,
) -> Result<(), SaveError> {
    storage.check_permission().await?;

    let bytes = source.fetch_bytes(image_url).await?;

    let save = &gallery_data().save;
    let quality = save.jpeg_quality;
    let max_alloc = save.max_decode_alloc_mb * 1024 * 1024;
    let jpeg = tokio::task::spawn_blocking(move || reencode_as_jpeg(&bytes, quality, max_alloc))
        .await
        .map_err(|e| SaveError::Encode(e.to_string()))??;

    storage
        .persist(jpeg, &generate_filename(), &save.mime_type)
        .await?;
    Ok(())
}

/// Decode any supported format and encode it as JPEG at `quality`
fn reencode_as_jpeg(bytes: &[u8], quality: u8, max_alloc: u64) -> Result<Vec<u8>, SaveError> {
    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError(e.to_string()))?;

    let mut limits = Limits::default();
    limits.max_alloc = Some(max_alloc);
    reader.limits(limits);

    let decoded = reader.decode().map_err(|e| match e {
        ImageError::Limits(_) => SaveError::Storage(StorageError::OutOfMemory),
        other => SaveError::Decode(DecodeError(other.to_string())),
    })?;

    // JPEG has no alpha channel
    let rgb = decoded.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(&rgb)
        .map_err(|e| match e {
            ImageError::Limits(_) => SaveError::Storage(StorageError::OutOfMemory),
            other => SaveError::Encode(other.to_string()),
        })?;
    Ok(out)
}
