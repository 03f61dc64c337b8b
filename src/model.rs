//! Pet image entity as served by the `/pets` endpoint.

use serde::{Deserialize, Serialize};

/// Display format used by the API for `created` (e.g. `Sun Sep 22 21:51:46 UTC 2024`)
const CREATED_FORMAT: &str = "%a %b %d %H:%M:%S %Z %Y";

/// A pet image
///
/// `url` is the identity used when saving. `created` is a free-form display
/// string and is never parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetImage {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created: String,
}

impl PetImage {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        created: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            description: description.into(),
            created: created.into(),
        }
    }

    /// Build an image for a local upload, stamping `created` with the current
    /// UTC time when none is given
    pub fn upload(
        url: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        created: Option<String>,
    ) -> Self {
        let created =
            created.unwrap_or_else(|| chrono::Utc::now().format(CREATED_FORMAT).to_string());
        Self::new(url, title, description, created)
    }

    /// Case-insensitive substring match on title or description.
    ///
    /// `needle_lower` must already be lowercased.
    pub fn matches(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty()
            || self.title.to_lowercase().contains(needle_lower)
            || self.description.to_lowercase().contains(needle_lower)
    }
}

// Display identity is title + description; two uploads of the same picture
// under different URLs are the same entry as far as the list is concerned.
impl PartialEq for PetImage {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title && self.description == other.description
    }
}

impl Eq for PetImage {}
