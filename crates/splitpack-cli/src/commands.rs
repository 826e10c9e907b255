use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "splitpack")]
#[command(about = "Pack directory trees into size-bounded groups and split oversized files", long_about = None)]
pub struct Cli {
    /// Raise log verbosity (-v debug, -vv trace); TRACING_LEVEL overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Collect items under the given paths and pack them into groups
    Plan {
        /// Roots to scan (defaults to the configured root_paths, then ".")
        paths: Vec<PathBuf>,
        /// Split oversized files and collect again before packing
        #[arg(long)]
        split: bool,
        /// Write the plan as CSV to this file
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },
    /// Split files into fixed-size parts
    Split {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Directory for the parts (defaults to <file>-split beside each file)
        #[arg(long, value_name = "DIR")]
        target: Option<PathBuf>,
    },
    /// Merge split directories back into single files
    Merge {
        /// Split directories to merge (defaults to every *-split under ".")
        split_dirs: Vec<PathBuf>,
        /// Search subdirectories when discovering split directories
        #[arg(short, long)]
        recursive: bool,
        /// Replace existing merged outputs
        #[arg(short, long)]
        force: bool,
    },
    /// Print configuration values
    PrintConfig,
}
