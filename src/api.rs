//! HTTP client for the pets gallery API.
//!
//! This module provides:
//!
//! - `PetsApiClient`: reqwest wrapper with a configured timeout and user agent
//! - `get_pets`: the `GET /pets` listing
//! - `get_bytes`: raw download of an image URL, used when saving
//!
//! Every failure is classified into [`NetworkError`] so callers never see
//! reqwest types.

use std::time::{Duration, Instant};

use anyhow::Result;

use crate::config::Config;
use crate::error::NetworkError;
use crate::model::PetImage;

/// User agent for API requests
const USER_AGENT: &str = concat!("pets-gallery/", env!("CARGO_PKG_VERSION"));

/// Pets API client
#[derive(Clone)]
pub struct PetsApiClient {
    client: reqwest::Client,
    pets_url: String,
}

impl PetsApiClient {
    /// Create a client for the endpoint and timeout in `config`
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            pets_url: config.pets_url(),
        })
    }

    /// Full URL of the listing endpoint
    pub fn pets_url(&self) -> &str {
        &self.pets_url
    }

    /// Fetch the current pet image collection
    pub async fn get_pets(&self) -> Result<Vec<PetImage>, NetworkError> {
        let start = Instant::now();

        let response = self
            .client
            .get(&self.pets_url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| NetworkError::from_reqwest(&e))?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!("Pets API returned {}", status);
            return Err(NetworkError::Other(format!("HTTP {}", status)));
        }

        let images: Vec<PetImage> = response
            .json()
            .await
            .map_err(|e| NetworkError::from_reqwest(&e))?;

        tracing::info!(
            "Fetched {} pet images in {:.1}s",
            images.len(),
            start.elapsed().as_secs_f32()
        );

        Ok(images)
    }

    /// Download the raw bytes behind an image URL
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, NetworkError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NetworkError::from_reqwest(&e))?;

        if !response.status().is_success() {
            return Err(NetworkError::Other(format!(
                "HTTP {} - {}",
                response.status(),
                response.status().canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| NetworkError::from_reqwest(&e))?;

        tracing::debug!("Downloaded {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}
