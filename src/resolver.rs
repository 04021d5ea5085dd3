//! Per-node address resolution.
//!
//! [`resolve`] is a pure decision function: given one node's network map and
//! the user-supplied filters it either selects exactly one usable address or
//! reports a specific [`ResolveError`]. It runs per node, independently of
//! every other node, and has no side effects.
//!
//! The two stages run in a fixed order: network selection first, then
//! address filtering. Which stage stops decides which error is reported, so
//! the ordering is part of the contract.

use tracing::trace;

use crate::error::ResolveError;
use crate::inventory::{AddressKind, IpVersion, NetworkMap};

/// User-supplied address selection filters, shared by every node in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressFilter {
    /// Network to select; `None` (or empty) means pick automatically, which
    /// only succeeds when the node is attached to exactly one network.
    pub network: Option<String>,
    /// Required address type.
    pub kind: AddressKind,
    /// Required IP version.
    pub version: IpVersion,
}

impl Default for AddressFilter {
    fn default() -> Self {
        Self {
            network: None,
            kind: AddressKind::Floating,
            version: IpVersion::V4,
        }
    }
}

/// Select exactly one address from a node's network map.
///
/// Stage one picks the candidate network: the named one when a filter is
/// given, otherwise the node's sole attachment. Stage two keeps records
/// matching the requested type and version and demands a unique survivor.
/// Anything else is a [`ResolveError`]; there is no "first wins" fallback.
pub fn resolve(networks: &NetworkMap, filter: &AddressFilter) -> Result<String, ResolveError> {
    let wanted = filter.network.as_deref().filter(|n| !n.is_empty());

    let (name, records) = match wanted {
        Some(network) => {
            let records = networks
                .get(network)
                .ok_or_else(|| ResolveError::NetworkNotFound(network.to_string()))?;
            (network, records)
        }
        None => match networks.len() {
            0 => return Err(ResolveError::NoNetwork),
            1 => match networks.iter().next() {
                Some((name, records)) => (name.as_str(), records),
                None => return Err(ResolveError::NoNetwork),
            },
            _ => return Err(ResolveError::AmbiguousNetwork),
        },
    };

    trace!(network = name, candidates = records.len(), "selected network");

    let mut matches = records
        .iter()
        .filter(|r| r.version == filter.version && r.kind == filter.kind);

    match (matches.next(), matches.next()) {
        (Some(record), None) => Ok(record.addr.clone()),
        (None, _) => Err(ResolveError::NoMatchingAddress {
            network: name.to_string(),
            kind: filter.kind,
            version: filter.version,
        }),
        (Some(_), Some(_)) => Err(ResolveError::AmbiguousAddress {
            network: name.to_string(),
            kind: filter.kind,
            version: filter.version,
        }),
    }
}
