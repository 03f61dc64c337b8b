//! Gallery session state
//!
//! This module contains the state containers a front end owns for the
//! lifetime of a gallery session. Each one owns its background tasks and
//! publishes results on a channel the front end subscribes to.

mod gallery;
mod save;

pub use gallery::{GalleryState, GalleryStateMachine};
pub use save::{SaveOutcome, SaveWorkflow};

/// Events returned when a background refresh is applied.
/// Front ends use them for status lines; the state itself is on the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    /// Refresh finished and `count` images were fetched
    Refreshed { count: usize },

    /// Refresh failed with a user-facing message
    RefreshFailed { message: String },
}
