use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::app_data::gallery_data;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub gallery: GalleryConfig,
    #[serde(default)]
    pub appearance: AppearanceConfig,
}

/// Remote pets API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base host the `/pets` path is appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    gallery_data().api.default_base_url.clone()
}

fn default_timeout_secs() -> u64 {
    gallery_data().api.default_timeout_secs
}

/// Which picture storage backend to write saved images into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageStrategy {
    /// Direct when the platform reports a picture directory, mediated otherwise
    #[default]
    Auto,
    /// Write files straight into the picture directory
    Direct,
    /// Insert into the app-managed media collection
    Mediated,
}

impl std::str::FromStr for StorageStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "direct" => Ok(Self::Direct),
            "mediated" => Ok(Self::Mediated),
            _ => anyhow::bail!("Invalid storage strategy: {} (expected auto, direct or mediated)", s),
        }
    }
}

/// Saved picture settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub strategy: StorageStrategy,
    /// Override the target directory
    #[serde(default)]
    pub directory: Option<String>,
}

/// How a locally added image interacts with an active search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddedImagePolicy {
    /// Always append the new image to the displayed list, even if the active
    /// search would hide it. The next search, sort or refresh re-derives.
    #[default]
    Pinned,
    /// Show the new image only if it matches the active search
    Filtered,
}

impl std::str::FromStr for AddedImagePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pinned" => Ok(Self::Pinned),
            "filtered" => Ok(Self::Filtered),
            _ => anyhow::bail!("Invalid added image policy: {} (expected pinned or filtered)", s),
        }
    }
}

/// Gallery behavior settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GalleryConfig {
    #[serde(default)]
    pub added_images: AddedImagePolicy,
}

/// Theme preference, stored for front ends that render colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl std::str::FromStr for ThemePreference {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            _ => anyhow::bail!("Invalid theme: {} (expected light, dark or system)", s),
        }
    }
}

/// Appearance settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppearanceConfig {
    #[serde(default)]
    pub theme: ThemePreference,
}

impl Config {
    /// Platform project directories for this application
    pub fn project_dirs() -> Result<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "petsgallery", "PetsGallery")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;

        let config_dir = dirs.config_dir();
        std::fs::create_dir_all(config_dir)?;

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            tracing::debug!("Loaded configuration from {:?}", path);
            Ok(config)
        } else {
            tracing::debug!("No configuration file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Full URL of the pets listing endpoint
    pub fn pets_url(&self) -> String {
        format!(
            "{}{}",
            self.api.base_url.trim_end_matches('/'),
            gallery_data().api.pets_path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.api.base_url, "https://eulerity-hackathon.appspot.com");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.storage.strategy, StorageStrategy::Auto);
        assert!(config.storage.directory.is_none());
        assert_eq!(config.gallery.added_images, AddedImagePolicy::Pinned);
        assert_eq!(config.appearance.theme, ThemePreference::System);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [storage]
            strategy = "mediated"

            [appearance]
            theme = "dark"
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.strategy, StorageStrategy::Mediated);
        assert_eq!(config.appearance.theme, ThemePreference::Dark);
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.api.base_url = "http://localhost:8080/".to_string();
        config.gallery.added_images = AddedImagePolicy::Filtered;

        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.api.base_url, "http://localhost:8080/");
        assert_eq!(back.gallery.added_images, AddedImagePolicy::Filtered);
    }

    #[test]
    fn test_pets_url_trims_trailing_slash() {
        let mut config = Config::default();
        config.api.base_url = "http://localhost:8080/".to_string();
        assert_eq!(config.pets_url(), "http://localhost:8080/pets");
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("Dark".parse::<ThemePreference>().unwrap(), ThemePreference::Dark);
        assert_eq!("direct".parse::<StorageStrategy>().unwrap(), StorageStrategy::Direct);
        assert_eq!("filtered".parse::<AddedImagePolicy>().unwrap(), AddedImagePolicy::Filtered);
        assert!("purple".parse::<ThemePreference>().is_err());
    }
}
