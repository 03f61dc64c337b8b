//! One-shot gallery browsing

use anyhow::Result;
use clap::Args;

use super::SortArg;
use crate::cli::output::OutputFormat;
use crate::cli::view::view_for;
use crate::config::Config;
use crate::session::GallerySession;
use crate::state::GalleryState;

#[derive(Args, Debug)]
pub struct GalleryArgs {
    /// Only show images whose title or description contains this text
    #[arg(long, short)]
    pub search: Option<String>,

    /// Sort by title
    #[arg(long, value_enum)]
    pub sort: Option<SortArg>,

    /// Maximum number of images to show
    #[arg(long)]
    pub limit: Option<usize>,
}

pub async fn run(args: GalleryArgs, format: OutputFormat, quiet: bool) -> Result<()> {
    let config = Config::load()?;
    let mut session = GallerySession::start(&config).await?;

    if let Some(search) = args.search {
        session.gallery.set_search_text(search);
    }
    if let Some(sort) = args.sort {
        session.gallery.set_sort_order(sort.ascending());
    }

    let state = limit_state(session.gallery.state(), args.limit);
    session.shutdown();

    let view = view_for(format, quiet);
    if let GalleryState::Error { message } = &state {
        // Text errors go to stderr through main; JSON callers still get a document
        if format == OutputFormat::Json {
            view.render_state(&state);
        }
        anyhow::bail!(message.clone());
    }
    view.render_state(&state);
    Ok(())
}

/// Cut a `Success` state down to its first `limit` images
fn limit_state(state: GalleryState, limit: Option<usize>) -> GalleryState {
    match (state, limit) {
        (GalleryState::Success { mut images }, Some(limit)) => {
            images.truncate(limit);
            GalleryState::Success { images }
        }
        (state, _) => state,
    }
}
