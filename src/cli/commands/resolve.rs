//! Resolve command - dry-run address resolution
//!
//! Runs only the address resolution stage for every node and prints the
//! selected address or the failure reason. Useful for checking filters
//! before letting a script loose on the cluster.

use anyhow::Result;
use clap::Parser;

use super::CommandContext;
use clusterun::inventory::{AddressKind, IpVersion};
use clusterun::resolver::{self, AddressFilter};

/// Arguments for the resolve command
#[derive(Parser, Debug, Clone)]
pub struct ResolveArgs {
    /// Network to pick the address from (default: the node's sole network)
    #[arg(long)]
    pub network: Option<String>,

    /// Address type to select (fixed or floating)
    #[arg(long, default_value = "floating")]
    pub address_type: AddressKind,

    /// Use IPv6 addresses instead of IPv4
    #[arg(short = '6', long = "ipv6")]
    pub ipv6: bool,
}

impl ResolveArgs {
    /// Execute the resolve command
    pub async fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        let inventory = match ctx.load_inventory() {
            Ok(inventory) => inventory,
            Err(e) => {
                ctx.output.error(&format!("{e:#}"));
                return Ok(1);
            }
        };

        let filter = AddressFilter {
            network: self.network.clone(),
            kind: self.address_type,
            version: if self.ipv6 {
                IpVersion::V6
            } else {
                IpVersion::V4
            },
        };

        let outcomes: Vec<_> = inventory
            .iter()
            .map(|node| (node.id.clone(), resolver::resolve(&node.addresses, &filter)))
            .collect();

        ctx.output.resolve_report(&outcomes);

        let any_failed = outcomes.iter().any(|(_, outcome)| outcome.is_err());
        Ok(if any_failed { 2 } else { 0 })
    }
}
