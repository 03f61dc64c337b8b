//! Application data embedded from TOML at compile time.
//!
//! This module provides access to application-level constants that are:
//! - Embedded at compile time via `include_str!`
//! - Parsed lazily on first access via `OnceLock`
//! - Immutable at runtime (not user-configurable)
//!
//! This is distinct from `config.rs` which handles user preferences.
//! App data defines *how the application works* (API paths, user-facing
//! messages, file naming), while config defines *user choices* (endpoint
//! override, storage strategy, theme).

use serde::Deserialize;
use std::sync::OnceLock;

const GALLERY_TOML: &str = include_str!("../embedded/gallery.toml");

/// Gallery application constants
#[derive(Debug, Deserialize)]
pub struct GalleryData {
    pub api: ApiData,
    pub messages: Messages,
    pub save: SaveData,
    pub storage: StorageData,
}

#[derive(Debug, Deserialize)]
pub struct ApiData {
    pub default_base_url: String,
    pub pets_path: String,
    pub default_timeout_secs: u64,
}

/// User-facing messages published in gallery states and save outcomes
#[derive(Debug, Deserialize)]
pub struct Messages {
    pub no_connectivity: String,
    pub timeout: String,
    pub load_failed_prefix: String,
    pub permission_required: String,
    pub decode_failed: String,
    pub out_of_memory: String,
    pub save_failed_prefix: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveData {
    pub filename_prefix: String,
    pub extension: String,
    pub mime_type: String,
    pub jpeg_quality: u8,
    /// Decoder allocation ceiling; images above it are treated as out of memory
    pub max_decode_alloc_mb: u64,
}

#[derive(Debug, Deserialize)]
pub struct StorageData {
    pub temp_extension: String,
    pub media_dir: String,
    pub media_index: String,
    pub permission_probe: String,
    pub max_name_collisions: u32,
}

/// Get gallery constants (lazy-loaded)
pub fn gallery_data() -> &'static GalleryData {
    static DATA: OnceLock<GalleryData> = OnceLock::new();
    DATA.get_or_init(|| {
        toml::from_str(GALLERY_TOML).unwrap_or_else(|e| {
            panic!("Failed to parse gallery.toml: {}", e);
        })
    })
}

/// Shorthand for the embedded user-facing messages
pub fn messages() -> &'static Messages {
    &gallery_data().messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_data_parses() {
        let data = gallery_data();
        assert_eq!(data.api.pets_path, "/pets");
        assert!(data.api.default_base_url.starts_with("https://"));
        assert_eq!(data.save.jpeg_quality, 100);
        assert_eq!(data.save.mime_type, "image/jpeg");
    }

    #[test]
    fn test_messages() {
        let m = messages();
        assert_eq!(m.no_connectivity, "No Internet Connection. Please try again later.");
        assert_eq!(m.timeout, "Request Timeout. Please try again.");
        assert_eq!(m.permission_required, "Permission required to save image.");
        assert_eq!(m.decode_failed, "Failed to decode image.");
    }
}
