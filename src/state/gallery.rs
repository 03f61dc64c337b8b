//! Gallery state machine: the image collection and its derived view

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};

use crate::app_data::messages;
use crate::config::AddedImagePolicy;
use crate::error::NetworkError;
use crate::model::PetImage;
use crate::repository::ImageRepository;
use crate::state::StateEvent;
use crate::task::{PollResult, poll_task};

/// What the gallery is currently showing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum GalleryState {
    /// Initial state, and the state while a refresh is in flight
    Loading,
    /// The displayed (filtered and sorted) collection
    Success { images: Vec<PetImage> },
    /// The last refresh failed
    Error { message: String },
}

impl GalleryState {
    /// Displayed images, if any are being shown
    pub fn images(&self) -> Option<&[PetImage]> {
        match self {
            GalleryState::Success { images } => Some(images),
            _ => None,
        }
    }
}

/// Title ordering of the displayed collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        }
    }
}

/// Images whose title or description contains `search`, ignoring case.
/// An empty search keeps everything.
pub fn filter_images(images: &[PetImage], search: &str) -> Vec<PetImage> {
    let needle = search.to_lowercase();
    images
        .iter()
        .filter(|image| image.matches(&needle))
        .cloned()
        .collect()
}

/// Sort by title. `sort_by` is stable, so equal titles keep their order in
/// both directions.
pub fn sort_images(images: &mut [PetImage], order: SortOrder) {
    match order {
        SortOrder::Ascending => images.sort_by(|a, b| a.title.cmp(&b.title)),
        SortOrder::Descending => images.sort_by(|a, b| b.title.cmp(&a.title)),
    }
}

/// The displayed collection is always `sort(filter(baseline))`
pub fn derive_view(baseline: &[PetImage], search: &str, order: Option<SortOrder>) -> Vec<PetImage> {
    let mut view = filter_images(baseline, search);
    if let Some(order) = order {
        sort_images(&mut view, order);
    }
    view
}

/// Owns the authoritative image collection and publishes [`GalleryState`].
///
/// Intents take `&mut self`, so there is a single writer. Refreshes run on a
/// tokio task; their result is applied by [`poll`](Self::poll) or
/// [`settle`](Self::settle) and always goes through [`derive_view`] with the
/// search text and sort order current at that moment.
pub struct GalleryStateMachine {
    repository: Arc<dyn ImageRepository>,
    added_policy: AddedImagePolicy,
    /// Last fetched collection plus local uploads, in insertion order
    baseline: Vec<PetImage>,
    /// Last derived view; survives an `Error` state
    displayed: Vec<PetImage>,
    search_text: String,
    sort_order: Option<SortOrder>,
    /// In-flight refresh
    task: Option<JoinHandle<Result<Vec<PetImage>, NetworkError>>>,
    state_tx: watch::Sender<GalleryState>,
}

impl GalleryStateMachine {
    pub fn new(repository: Arc<dyn ImageRepository>, added_policy: AddedImagePolicy) -> Self {
        let (state_tx, _) = watch::channel(GalleryState::Loading);
        Self {
            repository,
            added_policy,
            baseline: Vec::new(),
            displayed: Vec::new(),
            search_text: String::new(),
            sort_order: None,
            task: None,
            state_tx,
        }
    }

    /// Current state
    pub fn state(&self) -> GalleryState {
        self.state_tx.borrow().clone()
    }

    /// Receiver that starts at the latest state
    pub fn subscribe(&self) -> watch::Receiver<GalleryState> {
        self.state_tx.subscribe()
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn sort_order(&self) -> Option<SortOrder> {
        self.sort_order
    }

    pub fn baseline(&self) -> &[PetImage] {
        &self.baseline
    }

    pub fn is_loading(&self) -> bool {
        self.task.is_some()
    }

    /// Start a full refresh.
    ///
    /// Publishes `Loading` and fetches on a background task. Returns `false`
    /// without starting anything if a refresh is already in flight; the
    /// caller sees that refresh's result instead.
    pub fn refresh(&mut self) -> bool {
        if self.task.is_some() {
            tracing::debug!("Refresh already in flight, coalescing");
            return false;
        }

        self.publish(GalleryState::Loading);

        let repository = Arc::clone(&self.repository);
        self.task = Some(tokio::spawn(async move { repository.fetch().await }));
        true
    }

    /// Apply the refresh result if the task has finished. Never blocks.
    pub fn poll(&mut self) -> Option<StateEvent> {
        match poll_task(&mut self.task) {
            PollResult::Complete(result) => Some(self.apply_refresh(result)),
            PollResult::Pending | PollResult::NoTask => None,
        }
    }

    /// Wait for the in-flight refresh, if any, and apply it.
    ///
    /// The handle stays owned until the task completes, so dropping this
    /// future leaves the refresh pending for a later `poll` or `settle`.
    pub async fn settle(&mut self) -> Option<StateEvent> {
        let handle = self.task.as_mut()?;
        let result = handle.await;
        self.task = None;
        Some(self.apply_refresh(result))
    }

    /// Filter the baseline. Bypasses `Loading`, even while a refresh runs.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
        tracing::debug!("Search text set to {:?}", self.search_text);
        self.rederive();
    }

    /// Sort the displayed collection by title
    pub fn set_sort_order(&mut self, ascending: bool) {
        self.sort_order = Some(SortOrder::from_ascending(ascending));
        tracing::debug!("Sort order set to {:?}", self.sort_order);
        self.rederive();
    }

    /// Append a locally uploaded image to the baseline and the displayed list.
    ///
    /// With [`AddedImagePolicy::Pinned`] the image is shown last even if the
    /// active search would exclude it; with [`AddedImagePolicy::Filtered`] it
    /// is shown only when it matches.
    pub fn add_image(&mut self, image: PetImage) {
        self.baseline.push(image.clone());

        let visible = match self.added_policy {
            AddedImagePolicy::Pinned => true,
            AddedImagePolicy::Filtered => image.matches(&self.search_text.to_lowercase()),
        };
        tracing::debug!("Added image {:?} (visible: {})", image.title, visible);
        if visible {
            self.displayed.push(image);
        }

        self.publish(GalleryState::Success {
            images: self.displayed.clone(),
        });
    }

    /// Abort an in-flight refresh. Its result is discarded.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.task.take() {
            tracing::debug!("Aborting in-flight refresh");
            handle.abort();
        }
    }

    fn apply_refresh(
        &mut self,
        result: Result<Result<Vec<PetImage>, NetworkError>, JoinError>,
    ) -> StateEvent {
        match result {
            Ok(Ok(images)) => {
                let count = images.len();
                self.baseline = images;
                self.rederive();
                StateEvent::Refreshed { count }
            }
            Ok(Err(e)) => {
                tracing::warn!("Failed to fetch pet images: {}", e);
                let message = e.user_message();
                self.publish(GalleryState::Error {
                    message: message.clone(),
                });
                StateEvent::RefreshFailed { message }
            }
            Err(e) => {
                tracing::error!("Refresh task failed: {}", e);
                let message = format!("{}{}", messages().load_failed_prefix, e);
                self.publish(GalleryState::Error {
                    message: message.clone(),
                });
                StateEvent::RefreshFailed { message }
            }
        }
    }

    fn rederive(&mut self) {
        self.displayed = derive_view(&self.baseline, &self.search_text, self.sort_order);
        self.publish(GalleryState::Success {
            images: self.displayed.clone(),
        });
    }

    fn publish(&self, state: GalleryState) {
        // send_replace updates the value even with no live receivers
        self.state_tx.send_replace(state);
    }
}

impl Drop for GalleryStateMachine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
