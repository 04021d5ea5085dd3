//! Error types for clusterun.
//!
//! Two families of errors live here. [`Error`] covers fatal conditions that
//! abort a run before any node is attempted (unreadable inventory, missing
//! script). [`ResolveError`] and [`FailureReason`] describe per-node failures,
//! which are recorded in the run report and never interrupt other nodes.

use std::path::PathBuf;
use thiserror::Error;

use crate::inventory::{AddressKind, IpVersion};

/// Result type alias for clusterun operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors raised before the per-node fan-out starts.
#[derive(Error, Debug)]
pub enum Error {
    /// Error loading the node/address inventory.
    #[error("Failed to load inventory from '{path}': {message}")]
    InventoryLoad {
        /// Path to the inventory file
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Script file not found.
    #[error("Script file not found: {0}")]
    ScriptNotFound(PathBuf),

    /// Error reading the script file.
    #[error("Failed to read script '{path}': {message}")]
    ScriptRead {
        /// Path to the script file
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Creates a new inventory load error.
    pub fn inventory_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InventoryLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new script read error.
    pub fn script_read(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ScriptRead {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Why address resolution failed for one node.
///
/// Resolution happens in two stages (network selection, then address
/// filtering) and each variant pins down exactly where the decision stopped.
/// Anything short of a unique answer at either stage is an error; ambiguity
/// is always reported, never silently resolved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The requested network is not attached to this node.
    #[error("network '{0}' is not attached to this node")]
    NetworkNotFound(String),

    /// No network filter was given and the node has no network attachments.
    #[error("node is not attached to any network")]
    NoNetwork,

    /// No network filter was given and the node has more than one attachment.
    #[error("node is attached to more than one network, specify one with --network")]
    AmbiguousNetwork,

    /// A candidate network exists but no address matches the filters.
    #[error("no {kind} IPv{version} address found on network '{network}'")]
    NoMatchingAddress {
        /// Candidate network name
        network: String,
        /// Requested address type
        kind: AddressKind,
        /// Requested IP version
        version: IpVersion,
    },

    /// More than one address matches the filters.
    #[error("more than one {kind} IPv{version} address found on network '{network}'")]
    AmbiguousAddress {
        /// Candidate network name
        network: String,
        /// Requested address type
        kind: AddressKind,
        /// Requested IP version
        version: IpVersion,
    },
}

/// Classification of a per-node failure, as recorded in the run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Requested network absent from the node's inventory.
    NetworkNotFound,
    /// Node has no network attachments and none was requested.
    NoNetwork,
    /// Node has several network attachments and none was requested.
    AmbiguousNetwork,
    /// No address matched the type/version filters.
    NoMatchingAddress,
    /// More than one address matched the type/version filters.
    AmbiguousAddress,
    /// The remote shell invocation failed or exited nonzero.
    RemoteCommandError,
    /// The remote shell invocation exceeded the per-node timeout.
    Timeout,
}

impl FailureReason {
    /// Stable identifier used in rendered output.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::NetworkNotFound => "network-not-found",
            FailureReason::NoNetwork => "no-network",
            FailureReason::AmbiguousNetwork => "ambiguous-network",
            FailureReason::NoMatchingAddress => "no-matching-address",
            FailureReason::AmbiguousAddress => "ambiguous-address",
            FailureReason::RemoteCommandError => "remote-command-error",
            FailureReason::Timeout => "timeout",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&ResolveError> for FailureReason {
    fn from(err: &ResolveError) -> Self {
        match err {
            ResolveError::NetworkNotFound(_) => FailureReason::NetworkNotFound,
            ResolveError::NoNetwork => FailureReason::NoNetwork,
            ResolveError::AmbiguousNetwork => FailureReason::AmbiguousNetwork,
            ResolveError::NoMatchingAddress { .. } => FailureReason::NoMatchingAddress,
            ResolveError::AmbiguousAddress { .. } => FailureReason::AmbiguousAddress,
        }
    }
}
