//! CLI module for the pets gallery
//!
//! Provides the command-line front ends: one-shot `gallery` and `save`
//! commands, the interactive `shell`, and `config` management.

mod commands;
mod output;
mod shell;
mod view;

use clap::{Parser, Subcommand};

pub use output::{OutputFormat, print_error};

/// Pets Gallery - browse, search and save pet images
#[derive(Parser, Debug)]
#[command(name = "pets-gallery")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[command(flatten)]
    pub output: OutputOptions,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output formatting options
#[derive(Parser, Debug, Clone)]
pub struct OutputOptions {
    /// Output in JSON format (for machine parsing)
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl OutputOptions {
    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the gallery and print it once
    Gallery(commands::gallery::GalleryArgs),

    /// Save an image URL to picture storage
    Save {
        /// Image URL (http(s):// or file://) or a local file path
        url: String,
    },

    /// Interactive gallery session
    Shell,

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: commands::config::ConfigCommands,
    },
}

/// Run the CLI with parsed arguments
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let format = cli.output.format();
    let quiet = cli.output.quiet;

    match cli.command {
        Commands::Gallery(args) => commands::gallery::run(args, format, quiet).await,
        Commands::Save { url } => commands::save::run(url, format, quiet).await,
        Commands::Shell => shell::run(format, quiet).await,
        Commands::Config { command } => commands::config::run(command, format, quiet).await,
    }
}
