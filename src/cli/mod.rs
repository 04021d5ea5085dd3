//! CLI module for clusterun
//!
//! This module provides the command-line interface: argument parsing,
//! shared context, and subcommand handling.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Clusterun - run a script on every node of a cluster
///
/// Resolves one usable address per node, executes the script over SSH on all
/// nodes concurrently, and reports one outcome per node.
#[derive(Parser, Debug, Clone)]
#[command(name = "clusterun")]
#[command(author = "Clusterun Contributors")]
#[command(version)]
#[command(about = "Run a script on every node of a cluster", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the cluster inventory JSON file
    #[arg(short = 'i', long, global = true, env = "CLUSTERUN_INVENTORY")]
    pub inventory: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true, env = "CLUSTERUN_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a script on every node of the cluster
    Run(commands::run::RunArgs),

    /// Resolve each node's address without running anything
    Resolve(commands::resolve::ResolveArgs),
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-3)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(3)
    }

    /// Check if JSON output is requested
    pub fn is_json(&self) -> bool {
        matches!(self.output, OutputFormat::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli =
            Cli::try_parse_from(["clusterun", "-i", "nodes.json", "run", "script.sh"]).unwrap();
        assert!(matches!(cli.command, Commands::Run(_)));
        assert_eq!(cli.inventory.as_deref().unwrap().to_str(), Some("nodes.json"));
    }

    #[test]
    fn test_verbosity() {
        let cli = Cli::try_parse_from(["clusterun", "-vv", "run", "script.sh"]).unwrap();
        assert_eq!(cli.verbosity(), 2);
    }

    #[test]
    fn test_resolve_subcommand() {
        let cli = Cli::try_parse_from(["clusterun", "resolve", "--network", "private"]).unwrap();
        assert!(matches!(cli.command, Commands::Resolve(_)));
    }

    #[test]
    fn test_json_output_flag() {
        let cli = Cli::try_parse_from(["clusterun", "--output", "json", "run", "s.sh"]).unwrap();
        assert!(cli.is_json());
    }
}
