//! CLI argument definitions using clap.
//!
//! A single command validates one piece of schema source, read from exactly
//! one of a file path, standard input, or the system clipboard.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
#[clap(rename_all = "camelCase")]
pub enum CliConfigName {
    ExtremelySafe,
    Medium,
    Relaxed,
}

impl Default for CliConfigName {
    fn default() -> Self {
        Self::Relaxed
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    /// Path to a file containing schema source. Mutually exclusive with
    /// --stdin and --clipboard.
    pub path: Option<PathBuf>,

    /// Read schema source from standard input.
    #[arg(long, conflicts_with = "path")]
    pub stdin: bool,

    /// Read schema source from the system clipboard.
    #[arg(long, conflicts_with_all = ["path", "stdin"])]
    pub clipboard: bool,

    /// Named configuration preset.
    #[arg(long, value_enum, default_value_t = CliConfigName::Relaxed)]
    pub config: CliConfigName,

    /// Emit only the cleaned source to stdout.
    #[arg(long)]
    pub clean_only: bool,

    /// Emit the entire validation result as JSON.
    #[arg(long)]
    pub json: bool,

    /// Emit the largest schema group's inlined code (requires unification).
    #[arg(long)]
    pub get_unified_largest: bool,

    /// Replace a group's top-level `z.array(X)` with `X`.
    #[arg(long)]
    pub unwrap_arrays: bool,
}

impl Arguments {
    pub fn input_source_count(&self) -> usize {
        [self.path.is_some(), self.stdin, self.clipboard]
            .into_iter()
            .filter(|present| *present)
            .count()
    }
}
