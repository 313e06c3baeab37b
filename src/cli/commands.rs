//! CLI command implementations
//!
//! Each command parses one wire filter through the same validator the
//! filter interceptor uses, so a payload accepted here is accepted by a
//! pipeline built from the same configuration.

use std::fmt::Write as _;
use std::path::Path;

use serde_json::{json, Value};
use tracing::debug;

use crate::config::PipelineConfig;
use crate::filter::{FilterNode, FilterSerializer, FilterValidator};

use super::args::{Cli, Command};
use super::errors::CliResult;
use super::io::{read_input, write_json, write_text};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    run_command(Cli::parse_args())
}

/// Run the appropriate command based on CLI args
pub fn run_command(cli: Cli) -> CliResult<()> {
    let config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    debug!(?config, "Loaded configuration");

    match cli.command {
        Command::Validate { file } => write_json(&validate(&load(&file)?, &config)?),
        Command::Format { file, compact } => write_text(&format(&load(&file)?, &config, compact)?),
        Command::Explain { file } => write_text(&explain(&load(&file)?, &config)?),
    }
}

fn load(file: &Path) -> CliResult<String> {
    read_input(file)
}

fn serializer(config: &PipelineConfig) -> FilterSerializer {
    FilterSerializer::with_validator(FilterValidator::new().with_max_depth(config.filter.max_depth))
}

/// Validate a payload and summarize its shape
pub fn validate(payload: &str, config: &PipelineConfig) -> CliResult<Value> {
    let node = serializer(config).from_str(payload)?;
    Ok(json!({
        "status": "ok",
        "valid": true,
        "depth": node.depth(),
        "nodes": count_nodes(&node),
        "filter": node.to_string(),
    }))
}

/// Canonical JSON form of a payload
pub fn format(payload: &str, config: &PipelineConfig, compact: bool) -> CliResult<String> {
    let serializer = serializer(config);
    let node = serializer.from_str(payload)?;
    let text = if compact {
        serializer.to_string(&node)?
    } else {
        serializer.to_string_pretty(&node)?
    };
    Ok(text)
}

/// Indented, human-readable tree of a payload
pub fn explain(payload: &str, config: &PipelineConfig) -> CliResult<String> {
    let node = serializer(config).from_str(payload)?;
    let mut out = String::new();
    explain_node(&node, 0, &mut out);
    Ok(out)
}

fn explain_node(node: &FilterNode, indent: usize, out: &mut String) {
    let pad = "  ".repeat(indent);
    // writes into a String never fail
    match node {
        FilterNode::Condition(c) => {
            let case = if c.ignore_case() && c.operator().is_string_match() {
                " (ignore case)"
            } else {
                ""
            };
            writeln!(
                out,
                "{}{} {} {:?}{}",
                pad,
                c.path(),
                c.operator().symbol(),
                c.value(),
                case
            )
            .ok();
        }
        FilterNode::Group(g) => {
            writeln!(out, "{}{}", pad, g.combination().as_str().to_uppercase()).ok();
            for child in g.children() {
                explain_node(child, indent + 1, out);
            }
        }
        FilterNode::Collection(c) => {
            writeln!(out, "{}{} {}", pad, c.path(), c.operator().as_str()).ok();
            if let Some(predicate) = c.predicate() {
                explain_node(predicate, indent + 1, out);
            }
        }
    }
}

fn count_nodes(node: &FilterNode) -> usize {
    match node {
        FilterNode::Condition(_) => 1,
        FilterNode::Group(g) => 1 + g.children().iter().map(count_nodes).sum::<usize>(),
        FilterNode::Collection(c) => 1 + c.predicate().map_or(0, count_nodes),
    }
}
