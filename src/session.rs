//! Gallery session: the state containers one front end owns.
//!
//! A session is created when a front end starts, wires the gallery state
//! machine and the save workflow to the configured API client and storage,
//! and is torn down with [`GallerySession::shutdown`] (or on drop).

use std::sync::Arc;

use anyhow::Result;

use crate::api::PetsApiClient;
use crate::config::Config;
use crate::state::{GalleryStateMachine, SaveWorkflow};
use crate::storage;

/// Everything a front end needs to drive the gallery
pub struct GallerySession {
    pub gallery: GalleryStateMachine,
    pub saver: SaveWorkflow,
}

impl GallerySession {
    /// Build a session from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Arc::new(PetsApiClient::new(config)?);
        let storage = storage::from_config(config)?;

        tracing::debug!("Starting gallery session against {}", client.pets_url());

        Ok(Self {
            gallery: GalleryStateMachine::new(client.clone(), config.gallery.added_images),
            saver: SaveWorkflow::new(client, storage),
        })
    }

    /// Start a session and wait for the first refresh
    pub async fn start(config: &Config) -> Result<Self> {
        let mut session = Self::from_config(config)?;
        session.gallery.refresh();
        session.gallery.settle().await;
        Ok(session)
    }

    /// Cancel in-flight work owned by the session
    pub fn shutdown(&mut self) {
        self.gallery.shutdown();
        tracing::debug!("Gallery session closed");
    }
}
