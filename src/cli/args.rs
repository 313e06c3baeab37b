//! CLI argument definitions using clap
//!
//! Commands:
//! - aerofilter validate <file>
//! - aerofilter format <file> [--compact]
//! - aerofilter explain <file>
//!
//! `<file>` holds one wire filter as JSON; `-` reads stdin.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// aerofilter - inspect portable filter payloads
#[derive(Parser, Debug)]
#[command(name = "aerofilter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to pipeline configuration file (filter limits)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a filter payload and report its shape
    Validate {
        /// Filter file, or `-` for stdin
        file: PathBuf,
    },

    /// Print a filter payload in canonical form
    Format {
        /// Filter file, or `-` for stdin
        file: PathBuf,

        /// Single-line output
        #[arg(long)]
        compact: bool,
    },

    /// Print a filter payload as an indented tree
    Explain {
        /// Filter file, or `-` for stdin
        file: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
