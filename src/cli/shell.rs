//! Interactive gallery shell
//!
//! Keeps one gallery session alive across commands, so search, sort and
//! uploads act on the same collection. Provides history and tab completion.

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Config as EditorConfig, Editor, Helper};
use tokio::sync::broadcast;

use super::OutputFormat;
use super::commands::SortArg;
use super::output::print_error;
use super::view::{GalleryView, view_for};
use crate::config::Config;
use crate::model::PetImage;
use crate::repository::image_url;
use crate::session::GallerySession;
use crate::state::{GalleryState, SaveOutcome, StateEvent};

/// Commands available inside the shell
#[derive(Parser, Debug)]
#[command(name = "gallery", no_binary_name = true, disable_help_subcommand = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Fetch the gallery again
    Refresh,

    /// Show the displayed images
    List,

    /// Filter by title or description (no text clears the filter)
    Search { text: Vec<String> },

    /// Sort by title
    Sort {
        #[arg(value_enum)]
        order: SortArg,
    },

    /// Add a local image to the gallery
    Add {
        /// Image URL or file path
        url: String,
        title: String,
        description: String,
        /// Display timestamp (defaults to now)
        #[arg(long)]
        created: Option<String>,
    },

    /// Save an image by list number or URL
    Save { target: String },

    /// Show search, sort and storage details
    Status,
}

/// How often `refresh` checks the background fetch
const REFRESH_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Command completer for the shell
struct ShellCompleter {
    commands: Vec<(&'static str, Vec<&'static str>)>,
}

impl ShellCompleter {
    fn new() -> Self {
        Self {
            commands: vec![
                ("refresh", vec![]),
                ("list", vec![]),
                ("search", vec![]),
                ("sort", vec!["asc", "desc"]),
                ("add", vec![]),
                ("save", vec![]),
                ("status", vec![]),
                ("help", vec![]),
                ("exit", vec![]),
                ("quit", vec![]),
            ],
        }
    }

    fn pairs<'a>(words: impl Iterator<Item = &'a &'static str>, prefix: &str) -> Vec<Pair> {
        words
            .filter(|w| w.starts_with(prefix))
            .map(|w| Pair {
                display: w.to_string(),
                replacement: w.to_string(),
            })
            .collect()
    }
}

impl Completer for ShellCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        let words: Vec<&str> = line.split_whitespace().collect();
        let start = line.rfind(' ').map(|i| i + 1).unwrap_or(0);

        match (words.as_slice(), line.ends_with(' ')) {
            ([], _) => Ok((0, Self::pairs(self.commands.iter().map(|(c, _)| c), ""))),
            ([prefix], false) => Ok((
                start,
                Self::pairs(self.commands.iter().map(|(c, _)| c), prefix),
            )),
            ([cmd], true) | ([cmd, _], false) => {
                let prefix = if line.ends_with(' ') { "" } else { words[1] };
                let candidates = self
                    .commands
                    .iter()
                    .find(|(c, _)| c == cmd)
                    .map(|(_, subs)| Self::pairs(subs.iter(), prefix))
                    .unwrap_or_default();
                Ok((start, candidates))
            }
            _ => Ok((pos, vec![])),
        }
    }
}

impl Hinter for ShellCompleter {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for ShellCompleter {}
impl Validator for ShellCompleter {}
impl Helper for ShellCompleter {}

/// Parse a command line into arguments, handling quotes
fn parse_args(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut quoted_empty = false;

    for c in line.chars() {
        match (quote, c) {
            (None, '"' | '\'') => {
                quote = Some(c);
                quoted_empty = true;
            }
            (Some(q), c) if c == q => quote = None,
            (None, c) if c.is_whitespace() => {
                if !current.is_empty() || quoted_empty {
                    args.push(std::mem::take(&mut current));
                }
                quoted_empty = false;
            }
            (_, c) => {
                current.push(c);
                quoted_empty = false;
            }
        }
    }

    if !current.is_empty() || quoted_empty {
        args.push(current);
    }

    args
}

/// Resolve a `save` target: a 1-based row of the displayed list, a URL or a
/// local path
fn resolve_save_target(state: &GalleryState, target: &str) -> Result<String> {
    match target.parse::<usize>() {
        Ok(n) => {
            let images = state
                .images()
                .ok_or_else(|| anyhow::anyhow!("No images are displayed"))?;
            images
                .get(n.wrapping_sub(1))
                .map(|image| image.url.clone())
                .ok_or_else(|| anyhow::anyhow!("No image #{} (showing {})", n, images.len()))
        }
        Err(_) => Ok(image_url(target)),
    }
}

/// Print any save outcomes that arrived since the last prompt
fn drain_outcomes(outcomes: &mut broadcast::Receiver<SaveOutcome>, view: &dyn GalleryView) {
    loop {
        match outcomes.try_recv() {
            Ok(outcome) => view.render_save(&outcome),
            Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                tracing::warn!("Missed {} save outcomes", missed);
            }
            Err(_) => break,
        }
    }
}

/// Run a single shell line against the session.
/// Returns Ok(true) to continue, Ok(false) to exit gracefully.
async fn run_command(
    args: Vec<String>,
    session: &mut GallerySession,
    view: &dyn GalleryView,
    quiet: bool,
) -> Result<bool> {
    match args.first().map(String::as_str) {
        None => return Ok(true),
        Some("help") => {
            print_help();
            return Ok(true);
        }
        Some("exit" | "quit") => return Ok(false),
        Some(_) => {}
    }

    let line = match ShellLine::try_parse_from(&args) {
        Ok(line) => line,
        Err(e) => {
            // Print clap's error message (includes usage hints)
            println!("{}", e);
            return Ok(true);
        }
    };

    let gallery = &mut session.gallery;
    match line.command {
        ShellCommand::Refresh => {
            let mut states = gallery.subscribe();
            if !gallery.refresh() {
                println!("Refresh already in progress.");
            }
            if !quiet {
                view.render_state(&states.borrow_and_update());
            }

            let mut event = None;
            while event.is_none() && gallery.is_loading() {
                tokio::time::sleep(REFRESH_POLL_INTERVAL).await;
                event = gallery.poll();
            }
            match event {
                Some(StateEvent::Refreshed { count }) => {
                    tracing::debug!("Shell refresh fetched {} images", count)
                }
                Some(StateEvent::RefreshFailed { message }) => {
                    tracing::debug!("Shell refresh failed: {}", message)
                }
                None => {}
            }
            view.render_state(&states.borrow_and_update());
        }
        ShellCommand::List => view.render_state(&gallery.state()),
        ShellCommand::Search { text } => {
            gallery.set_search_text(text.join(" "));
            view.render_state(&gallery.state());
        }
        ShellCommand::Sort { order } => {
            gallery.set_sort_order(order.ascending());
            view.render_state(&gallery.state());
        }
        ShellCommand::Add {
            url,
            title,
            description,
            created,
        } => {
            gallery.add_image(PetImage::upload(image_url(&url), title, description, created));
            view.render_state(&gallery.state());
        }
        ShellCommand::Save { target } => {
            let url = resolve_save_target(&gallery.state(), &target)?;
            if !quiet {
                println!("Saving {}...", url);
            }
            // Outcome arrives on the broadcast channel
            drop(session.saver.save(url));
        }
        ShellCommand::Status => {
            let sort = match gallery.sort_order() {
                Some(order) => format!("{:?}", order).to_lowercase(),
                None => "none".to_string(),
            };
            println!("Search:   {:?}", gallery.search_text());
            println!("Sort:     {}", sort);
            println!("Baseline: {} image(s)", gallery.baseline().len());
            println!("Loading:  {}", gallery.is_loading());
            println!("Saves go: {}", session.saver.destination());
        }
    }

    Ok(true)
}

fn print_help() {
    println!(
        r#"Pets Gallery Interactive Shell

Commands:
  refresh                          Fetch the gallery again
  list                             Show the displayed images
  search [text]                    Filter by title or description (empty clears)
  sort asc|desc                    Sort by title
  add <url|path> <title> <description> [--created <text>]
                                   Add a local image to the gallery
  save <n|url>                     Save image #n from the list, or a URL
  status                           Show search, sort and storage details

  help                             Show this help
  exit, quit                       Exit the shell

Quote arguments that contain spaces: add ./rex.png "Rex" "Very good dog"
"#
    );
}

/// Get the history file path
fn history_path() -> Option<std::path::PathBuf> {
    Config::project_dirs()
        .ok()
        .map(|dirs| dirs.data_dir().join("shell_history"))
}

/// Run the interactive shell
pub async fn run(format: OutputFormat, quiet: bool) -> Result<()> {
    println!("Pets Gallery Shell v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'help' for available commands, 'exit' to quit.\n");

    let config = Config::load()?;
    let view = view_for(format, quiet);

    let mut session = GallerySession::from_config(&config)?;
    let mut outcomes = session.saver.subscribe();
    session.gallery.refresh();
    session.gallery.settle().await;
    view.render_state(&session.gallery.state());

    let editor_config = EditorConfig::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();

    let mut rl = Editor::with_config(editor_config)?;
    rl.set_helper(Some(ShellCompleter::new()));

    // Load history
    if let Some(path) = history_path() {
        let _ = rl.load_history(&path);
    }

    loop {
        drain_outcomes(&mut outcomes, view.as_ref());

        match rl.readline("gallery> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                rl.add_history_entry(line)?;

                let args = parse_args(line);
                match run_command(args, &mut session, view.as_ref(), quiet).await {
                    Ok(true) => continue,
                    Ok(false) => break,
                    Err(e) => print_error(&e.to_string()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("exit");
                break;
            }
            Err(err) => {
                print_error(&format!("{:?}", err));
                break;
            }
        }
    }

    session.shutdown();

    // Save history
    if let Some(path) = history_path() {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = rl.save_history(&path);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args_quotes() {
        assert_eq!(
            parse_args(r#"add ./rex.png "Rex" 'Very good dog'"#),
            vec!["add", "./rex.png", "Rex", "Very good dog"]
        );
        assert_eq!(parse_args("  sort   asc "), vec!["sort", "asc"]);
        assert_eq!(parse_args(r#"search """#), vec!["search", ""]);
        assert!(parse_args("").is_empty());
    }

    #[test]
    fn test_shell_line_parsing() {
        let line = ShellLine::try_parse_from(["sort", "desc"]).unwrap();
        assert!(matches!(
            line.command,
            ShellCommand::Sort {
                order: SortArg::Desc
            }
        ));

        let line = ShellLine::try_parse_from(["search", "good", "dog"]).unwrap();
        match line.command {
            ShellCommand::Search { text } => assert_eq!(text.join(" "), "good dog"),
            other => panic!("unexpected {:?}", other),
        }

        let line = ShellLine::try_parse_from(["search"]).unwrap();
        assert!(matches!(line.command, ShellCommand::Search { text } if text.is_empty()));

        assert!(ShellLine::try_parse_from(["sort", "sideways"]).is_err());
    }

    #[test]
    fn test_resolve_save_target() {
        let state = GalleryState::Success {
            images: vec![
                PetImage::new("https://example.com/z.jpg", "Zeus", "", ""),
                PetImage::new("https://example.com/a.jpg", "Annie", "", ""),
            ],
        };

        assert_eq!(
            resolve_save_target(&state, "2").unwrap(),
            "https://example.com/a.jpg"
        );
        assert!(resolve_save_target(&state, "0").is_err());
        assert!(resolve_save_target(&state, "3").is_err());
        assert_eq!(
            resolve_save_target(&state, "https://example.com/x.png").unwrap(),
            "https://example.com/x.png"
        );
        assert!(resolve_save_target(&GalleryState::Loading, "1").is_err());
    }
}
