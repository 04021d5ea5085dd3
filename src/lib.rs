//! # Clusterun - Cluster-wide remote script execution
//!
//! Clusterun runs a script on every node of a cluster over SSH, concurrently,
//! and reports one outcome per node. One node's failure never aborts
//! another's attempt; the run is complete once every node has a result.
//!
//! ## Core Concepts
//!
//! - **Inventory**: the cluster service's per-node network/address dump,
//!   parsed into typed structures
//! - **Resolver**: pure decision function selecting exactly one usable
//!   address per node, or a specific failure reason
//! - **Runner**: executes the script against one resolved address via an ssh
//!   child process, capturing output and classifying the exit
//! - **Coordinator**: fans out one bounded-concurrency unit of work per node
//!   and joins them all into a report
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     CLI Interface                        │
//! │               (clap-based command parsing)               │
//! └─────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                 ExecutionCoordinator                     │
//! │      (semaphore-bounded fan-out, one task per node)      │
//! └─────────────────────────────────────────────────────────┘
//!              │ per node                      │ per node
//!              ▼                               ▼
//! ┌─────────────────────────┐   ┌─────────────────────────────┐
//! │     AddressResolver     │──▶│       SshScriptRunner       │
//! │  (unique address or a   │   │  (ssh child process, full   │
//! │   specific reason)      │   │   output capture)           │
//! └─────────────────────────┘   └─────────────────────────────┘
//!                            │
//!                            ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                   ClusterRunReport                       │
//! │            (exactly one result per node)                 │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use clusterun::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let inventory = inventory::load_inventory("nodes.json".as_ref())?;
//!
//!     let coordinator = ExecutionCoordinator::new(Arc::new(SshScriptRunner::new()))
//!         .with_forks(10);
//!     let report = coordinator
//!         .run_on_cluster(&inventory, RunSpec::new("uptime"))
//!         .await;
//!
//!     std::process::exit(report.exit_code());
//! }
//! ```

#![warn(clippy::all)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::config::Config;
    pub use crate::coordinator::ExecutionCoordinator;
    pub use crate::error::{Error, FailureReason, ResolveError, Result};
    pub use crate::inventory::{AddressKind, AddressRecord, IpVersion, NetworkMap, NodeAddresses};
    pub use crate::report::{ClusterRunReport, ExecutionResult, NodeStatus};
    pub use crate::resolver::AddressFilter;
    pub use crate::runner::{ExecutionRequest, RunSpec, ScriptRunner, SshScriptRunner};
}

/// Error types and result aliases for clusterun operations.
///
/// Distinguishes fatal pre-run errors from the per-node failure taxonomy
/// recorded in the run report.
pub mod error;

/// Typed node/address inventory parsed from the cluster service's dump.
pub mod inventory;

/// Pure per-node address resolution.
pub mod resolver;

/// Per-node outcomes and the final cluster report.
pub mod report;

/// Remote script execution over an ssh child process.
pub mod runner;

/// Concurrent per-node fan-out with a full join.
pub mod coordinator;

/// Configuration loading and defaults.
pub mod config;

/// Returns the current version of clusterun.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
