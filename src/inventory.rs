//! Typed node/address inventory.
//!
//! The cluster service reports each node's network attachments as a map from
//! network name to a list of address objects with fields `addr`, `version`,
//! and an OpenStack-style extension key (`OS-EXT-IPS:type`) classifying the
//! address as fixed or floating; when the key is absent the address is
//! floating. This module turns that dump into explicit typed structures so
//! the resolver's branching is exhaustive and statically checkable.
//!
//! The inventory is produced fresh per invocation and is read-only for the
//! duration of a run.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Fixed/floating classification of an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressKind {
    /// Address assigned directly on the network.
    Fixed,
    /// Floating address associated with the node.
    #[default]
    Floating,
}

impl AddressKind {
    /// Get the plain string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressKind::Fixed => "fixed",
            AddressKind::Floating => "floating",
        }
    }
}

impl std::fmt::Display for AddressKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(AddressKind::Fixed),
            "floating" => Ok(AddressKind::Floating),
            other => Err(format!(
                "invalid address type '{other}' (expected 'fixed' or 'floating')"
            )),
        }
    }
}

/// IP protocol version of an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum IpVersion {
    /// IPv4
    V4,
    /// IPv6
    V6,
}

impl IpVersion {
    /// The ssh client flag selecting this protocol version.
    pub fn ssh_flag(&self) -> &'static str {
        match self {
            IpVersion::V4 => "-4",
            IpVersion::V6 => "-6",
        }
    }
}

impl TryFrom<u8> for IpVersion {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            4 => Ok(IpVersion::V4),
            6 => Ok(IpVersion::V6),
            other => Err(format!("unsupported IP version {other}")),
        }
    }
}

impl From<IpVersion> for u8 {
    fn from(version: IpVersion) -> u8 {
        match version {
            IpVersion::V4 => 4,
            IpVersion::V6 => 6,
        }
    }
}

impl std::fmt::Display for IpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// One IP address entry for a node's network attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// The address itself.
    pub addr: String,
    /// IP protocol version.
    pub version: IpVersion,
    /// Fixed/floating classification; absent in the service dump means floating.
    #[serde(rename = "OS-EXT-IPS:type", default)]
    pub kind: AddressKind,
}

/// Ordered mapping from network name to that network's address records.
pub type NetworkMap = IndexMap<String, Vec<AddressRecord>>;

/// One cluster node's identifier and network attachments.
///
/// `addresses` may be empty (node attached to nothing) and each network's
/// record list may itself be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAddresses {
    /// Opaque node identifier.
    pub id: String,
    /// Per-network address records.
    #[serde(default)]
    pub addresses: NetworkMap,
}

impl NodeAddresses {
    /// Create a node entry with no network attachments.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            addresses: NetworkMap::new(),
        }
    }
}

/// Accepts either a bare node array or a `{"nodes": [...]}` wrapper.
#[derive(Deserialize)]
#[serde(untagged)]
enum InventoryDocument {
    Wrapped { nodes: Vec<NodeAddresses> },
    Bare(Vec<NodeAddresses>),
}

/// Parse an inventory JSON document.
pub fn parse_inventory(json: &str) -> serde_json::Result<Vec<NodeAddresses>> {
    match serde_json::from_str::<InventoryDocument>(json)? {
        InventoryDocument::Wrapped { nodes } => Ok(nodes),
        InventoryDocument::Bare(nodes) => Ok(nodes),
    }
}

/// Load an inventory JSON document from a file.
///
/// Read and parse failures here are fatal to the whole run; they happen
/// before any node is attempted.
pub fn load_inventory(path: &Path) -> Result<Vec<NodeAddresses>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::inventory_load(path, e.to_string()))?;
    parse_inventory(&content).map_err(|e| Error::inventory_load(path, e.to_string()))
}
