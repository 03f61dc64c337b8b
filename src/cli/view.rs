//! Presentation adapters for gallery state and save outcomes.
//!
//! The core never knows which adapter is attached. Both render the same
//! [`GalleryState`] / [`SaveOutcome`] values:
//!
//! - [`ListView`]: numbered text list, one image per row
//! - [`JsonView`]: the state serialized as JSON for scripts

use crate::cli::output::{OutputFormat, truncate};
use crate::state::{GalleryState, SaveOutcome};

/// Something that can show gallery state to the user
pub trait GalleryView {
    fn render_state(&self, state: &GalleryState);
    fn render_save(&self, outcome: &SaveOutcome);
}

/// Pick the adapter for an output format
pub fn view_for(format: OutputFormat, quiet: bool) -> Box<dyn GalleryView> {
    match format {
        OutputFormat::Text => Box::new(ListView { quiet }),
        OutputFormat::Json => Box::new(JsonView),
    }
}

/// Numbered text list
pub struct ListView {
    pub quiet: bool,
}

impl GalleryView for ListView {
    fn render_state(&self, state: &GalleryState) {
        match state {
            GalleryState::Error { message } => eprintln!("Error: {}", message),
            _ => println!("{}", format_list(state, self.quiet)),
        }
    }

    fn render_save(&self, outcome: &SaveOutcome) {
        match outcome {
            SaveOutcome::Success => {
                if !self.quiet {
                    println!("Image saved successfully.");
                }
            }
            SaveOutcome::Failure { message } => eprintln!("Error: {}", message),
        }
    }
}

/// Machine-readable JSON
pub struct JsonView;

impl GalleryView for JsonView {
    fn render_state(&self, state: &GalleryState) {
        if let Ok(json) = serde_json::to_string_pretty(state) {
            println!("{}", json);
        }
    }

    fn render_save(&self, outcome: &SaveOutcome) {
        if let Ok(json) = serde_json::to_string(outcome) {
            println!("{}", json);
        }
    }
}

/// Text rendering of a gallery state. Row numbers start at 1 and are what
/// the shell's `save <n>` refers to.
pub fn format_list(state: &GalleryState, quiet: bool) -> String {
    match state {
        GalleryState::Loading => "Loading...".to_string(),
        GalleryState::Error { message } => format!("Error: {}", message),
        GalleryState::Success { images } if images.is_empty() => "No images found.".to_string(),
        GalleryState::Success { images } => {
            let mut lines = Vec::new();
            if !quiet {
                lines.push(format!(
                    "{:>3}  {:<24} {:<40} {}",
                    "#", "TITLE", "DESCRIPTION", "CREATED"
                ));
                lines.push("-".repeat(96));
            }
            for (i, image) in images.iter().enumerate() {
                lines.push(format!(
                    "{:>3}  {:<24} {:<40} {}",
                    i + 1,
                    truncate(&image.title, 24),
                    truncate(&image.description, 40),
                    image.created
                ));
                if !quiet {
                    lines.push(format!("     {}", image.url));
                }
            }
            if !quiet {
                lines.push(format!("\n{} image(s)", images.len()));
            }
            lines.join("\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PetImage;

    #[test]
    fn test_format_list_states() {
        assert_eq!(format_list(&GalleryState::Loading, false), "Loading...");
        assert_eq!(
            format_list(
                &GalleryState::Error {
                    message: "Request Timeout. Please try again.".to_string()
                },
                false
            ),
            "Error: Request Timeout. Please try again."
        );
        assert_eq!(
            format_list(&GalleryState::Success { images: vec![] }, false),
            "No images found."
        );
    }

    #[test]
    fn test_format_list_rows() {
        let state = GalleryState::Success {
            images: vec![
                PetImage::new("https://example.com/z.jpg", "Zeus", "King", "today"),
                PetImage::new("https://example.com/a.jpg", "Annie", "Sleepy", "today"),
            ],
        };

        let quiet = format_list(&state, true);
        let rows: Vec<&str> = quiet.lines().collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].trim_start().starts_with("1  Zeus"));
        assert!(rows[1].trim_start().starts_with("2  Annie"));

        let full = format_list(&state, false);
        assert!(full.contains("https://example.com/a.jpg"));
        assert!(full.ends_with("2 image(s)"));
    }

    #[test]
    fn test_json_shape() {
        let state = GalleryState::Success {
            images: vec![PetImage::new("u", "Zeus", "King", "today")],
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "success");
        assert_eq!(json["images"][0]["title"], "Zeus");

        let outcome = SaveOutcome::Failure {
            message: "Failed to decode image.".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "failure");
        assert_eq!(json["message"], "Failed to decode image.");
    }
}
