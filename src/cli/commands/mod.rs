//! Subcommands module for the clusterun CLI
//!
//! This module contains the subcommand implementations.

pub mod resolve;
pub mod run;

use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::cli::output::OutputFormatter;
use clusterun::config::Config;
use clusterun::inventory::{self, NodeAddresses};

/// Common context shared between commands
pub struct CommandContext {
    /// Configuration
    pub config: Config,
    /// Output formatter
    pub output: OutputFormatter,
    /// Inventory path
    pub inventory_path: Option<PathBuf>,
}

impl CommandContext {
    /// Create a new command context from CLI arguments
    pub fn new(cli: &crate::cli::Cli, config: Config) -> Self {
        let output = OutputFormatter::new(!cli.no_color, cli.is_json(), cli.verbosity());

        Self {
            config,
            output,
            inventory_path: cli.inventory.clone(),
        }
    }

    /// Load the node/address inventory named on the command line.
    ///
    /// Any failure here is fatal to the whole run; it happens before any
    /// node is attempted.
    pub fn load_inventory(&self) -> Result<Vec<NodeAddresses>> {
        let Some(path) = &self.inventory_path else {
            bail!("no inventory specified (use --inventory or CLUSTERUN_INVENTORY)");
        };
        Ok(inventory::load_inventory(path)?)
    }
}
