//! CLI module for aerofilter
//!
//! Provides command-line interface for:
//! - validate: Check a wire filter and summarize it
//! - format: Print a wire filter in canonical JSON
//! - explain: Print a wire filter as an indented tree

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{explain, format, run, run_command, validate};
pub use errors::{CliError, CliErrorKind, CliResult};
pub use io::{read_input, write_error, write_json, write_text};
