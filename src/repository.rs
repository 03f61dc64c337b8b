//! Remote reads behind trait seams.
//!
//! [`ImageRepository`] supplies the gallery collection and [`ImageSource`]
//! supplies raw image bytes for saving. Both are implemented by
//! [`PetsApiClient`]; tests substitute in-memory fakes.

use async_trait::async_trait;

use crate::api::PetsApiClient;
use crate::error::NetworkError;
use crate::model::PetImage;

/// Source of the pet image collection.
///
/// No caching and no retries: every call is a fresh remote read and the
/// caller decides whether to try again.
#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn fetch(&self) -> Result<Vec<PetImage>, NetworkError>;
}

/// Source of the raw bytes behind an image URL
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, NetworkError>;
}

/// Turn a plain file path into a `file://` URL; URLs pass through unchanged
pub fn image_url(input: &str) -> String {
    if input.contains("://") {
        return input.to_string();
    }
    match std::path::Path::new(input).canonicalize() {
        Ok(path) => format!("file://{}", path.display()),
        Err(_) => format!("file://{}", input),
    }
}

#[async_trait]
impl ImageRepository for PetsApiClient {
    async fn fetch(&self) -> Result<Vec<PetImage>, NetworkError> {
        self.get_pets().await
    }
}

#[async_trait]
impl ImageSource for PetsApiClient {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, NetworkError> {
        // Local uploads carry file:// URLs
        if let Some(path) = url.strip_prefix("file://") {
            return tokio::fs::read(path)
                .await
                .map_err(|e| NetworkError::Other(format!("{}: {}", path, e)));
        }
        self.get_bytes(url).await
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    //! In-memory doubles shared by the gallery and save tests

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    /// Repository that replays scripted responses, one per fetch
    pub struct ScriptedRepository {
        responses: Mutex<Vec<Result<Vec<PetImage>, NetworkError>>>,
        delay: Option<Duration>,
        pub calls: AtomicUsize,
    }

    impl ScriptedRepository {
        pub fn new(responses: Vec<Result<Vec<PetImage>, NetworkError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn returning(images: Vec<PetImage>) -> Self {
            Self::new(vec![Ok(images)])
        }

        pub fn failing(err: NetworkError) -> Self {
            Self::new(vec![Err(err)])
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageRepository for ScriptedRepository {
        async fn fetch(&self) -> Result<Vec<PetImage>, NetworkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok(Vec::new())
            } else {
                responses.remove(0)
            }
        }
    }

    /// Image source returning fixed bytes for every URL
    pub struct StaticSource(pub Result<Vec<u8>, NetworkError>);

    #[async_trait]
    impl ImageSource for StaticSource {
        async fn fetch_bytes(&self, _url: &str) -> Result<Vec<u8>, NetworkError> {
            self.0.clone()
        }
    }
}
