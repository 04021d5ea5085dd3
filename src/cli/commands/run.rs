//! Run command - execute a script on every node of the cluster
//!
//! Loads the script and inventory, merges CLI arguments with configuration
//! defaults, and hands the fan-out to the execution coordinator.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::CommandContext;
use clusterun::coordinator::ExecutionCoordinator;
use clusterun::inventory::{AddressKind, IpVersion};
use clusterun::runner::{RunSpec, SshScriptRunner};

/// Arguments for the run command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to the script to execute on every node
    #[arg(required = true)]
    pub script: PathBuf,

    /// Network to pick the address from (default: the node's sole network)
    #[arg(long)]
    pub network: Option<String>,

    /// Address type to select (fixed or floating)
    #[arg(long, default_value = "floating")]
    pub address_type: AddressKind,

    /// Use IPv6 addresses instead of IPv4
    #[arg(short = '6', long = "ipv6")]
    pub ipv6: bool,

    /// Remote ssh port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Remote user
    #[arg(short = 'u', long)]
    pub user: Option<String>,

    /// Private key file passed to ssh with -i
    #[arg(long)]
    pub identity_file: Option<PathBuf>,

    /// Extra options passed through to the ssh client
    #[arg(long)]
    pub ssh_options: Option<String>,

    /// Maximum number of nodes contacted in parallel
    #[arg(short = 'f', long)]
    pub forks: Option<usize>,

    /// Per-node timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// ssh executable to invoke
    #[arg(long, env = "CLUSTERUN_SSH_COMMAND")]
    pub ssh_command: Option<PathBuf>,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        let mut spec = match RunSpec::from_script_file(&self.script) {
            Ok(spec) => spec,
            Err(e) => {
                ctx.output.error(&e.to_string());
                return Ok(1);
            }
        };

        let inventory = match ctx.load_inventory() {
            Ok(inventory) => inventory,
            Err(e) => {
                ctx.output.error(&format!("{e:#}"));
                return Ok(1);
            }
        };
        if inventory.is_empty() {
            ctx.output.warning("inventory contains no nodes");
        }
        ctx.output.info(&format!(
            "Running {} on {} nodes",
            self.script.display(),
            inventory.len()
        ));

        self.apply(ctx, &mut spec)?;
        let forks = self.forks.unwrap_or(ctx.config.defaults.forks);

        let program = self
            .ssh_command
            .clone()
            .unwrap_or_else(|| ctx.config.ssh.command.clone());
        let runner = Arc::new(SshScriptRunner::with_program(program));

        let coordinator = ExecutionCoordinator::new(runner).with_forks(forks);
        let report = coordinator.run_on_cluster(&inventory, spec).await;

        ctx.output.report(&report);
        Ok(report.exit_code())
    }

    /// Merge CLI arguments over configuration defaults into the run spec.
    fn apply(&self, ctx: &CommandContext, spec: &mut RunSpec) -> Result<()> {
        spec.network = self.network.clone();
        spec.kind = self.address_type;
        spec.version = if self.ipv6 {
            IpVersion::V6
        } else {
            IpVersion::V4
        };
        spec.port = self.port.unwrap_or(ctx.config.defaults.port);
        spec.user = self
            .user
            .clone()
            .unwrap_or_else(|| ctx.config.defaults.user.clone());
        spec.identity_file = self
            .identity_file
            .clone()
            .or_else(|| ctx.config.ssh.identity_file.clone());
        spec.timeout = self
            .timeout
            .or(ctx.config.defaults.timeout)
            .map(Duration::from_secs);

        let options = self
            .ssh_options
            .as_deref()
            .or(ctx.config.ssh.options.as_deref());
        if let Some(options) = options {
            spec.ssh_options = shell_words::split(options)
                .with_context(|| format!("Invalid ssh options: {options}"))?;
            ctx.output
                .debug(&format!("ssh options: {:?}", spec.ssh_options));
        }

        Ok(())
    }
}
