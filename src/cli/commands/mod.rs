//! Subcommand implementations

pub mod config;
pub mod gallery;
pub mod save;

use clap::ValueEnum;

/// Sort direction accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Asc,
    Desc,
}

impl SortArg {
    pub fn ascending(self) -> bool {
        self == SortArg::Asc
    }
}
