//! One-shot image save

use anyhow::Result;

use crate::cli::output::OutputFormat;
use crate::cli::view::view_for;
use crate::config::Config;
use crate::repository::image_url;
use crate::session::GallerySession;
use crate::state::SaveOutcome;

pub async fn run(url: String, format: OutputFormat, quiet: bool) -> Result<()> {
    let config = Config::load()?;
    let session = GallerySession::from_config(&config)?;

    let url = image_url(&url);
    tracing::info!("Saving {} to {}", url, session.saver.destination());
    let outcome = session.saver.save_and_wait(url).await;

    // Text failures are printed once, by main; JSON callers still get a document
    if outcome.is_success() || format == OutputFormat::Json {
        view_for(format, quiet).render_save(&outcome);
    }

    match outcome {
        SaveOutcome::Success => Ok(()),
        SaveOutcome::Failure { message } => anyhow::bail!(message),
    }
}
