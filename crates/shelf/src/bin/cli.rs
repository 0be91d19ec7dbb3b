use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log output format (logs go to stderr, level from RUST_LOG)
    #[arg(
        long,
        global = true,
        env = "SHELF_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the recognized record keys in canonical order
    Keys,
    /// Validate a JSON Lines dump of entry records
    Check {
        /// Input file, `-` or nothing for stdin
        input: Option<PathBuf>,
    },
    /// Rewrite records with every key present and defaults filled in
    Normalize {
        input: Option<PathBuf>,
        /// Drop invalid records instead of aborting
        #[arg(long)]
        skip_invalid: bool,
    },
    /// Print the first record with the given `_id`
    Get { id: String, input: Option<PathBuf> },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}
