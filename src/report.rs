//! Per-node run outcomes and the final cluster report.
//!
//! An [`ExecutionResult`] is produced exactly once per node and never updated
//! afterward. The [`ClusterRunReport`] collects them and is only handed to
//! the caller once every node has finished.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::FailureReason;

/// Final status of one node's unit of work.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NodeStatus {
    /// The script ran and exited zero.
    Succeeded {
        /// Exit code of the remote invocation (always zero).
        exit_code: i32,
    },
    /// Address resolution or the remote invocation failed.
    Failed {
        /// Failure classification.
        reason: FailureReason,
        /// Human-readable detail.
        detail: String,
    },
}

impl NodeStatus {
    /// Whether this status counts as a success.
    pub fn is_success(&self) -> bool {
        matches!(self, NodeStatus::Succeeded { .. })
    }
}

/// One node's recorded outcome: status plus captured output.
///
/// Captured stderr is attached regardless of status; a zero exit with
/// non-empty stderr is still a success but carries the stderr text for
/// operator visibility.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    /// Opaque node identifier.
    pub node_id: String,
    /// Final status.
    #[serde(flatten)]
    pub status: NodeStatus,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl ExecutionResult {
    /// Successful outcome with captured output.
    pub fn succeeded(
        node_id: impl Into<String>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            status: NodeStatus::Succeeded { exit_code: 0 },
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Failed outcome with no captured output.
    pub fn failed(
        node_id: impl Into<String>,
        reason: FailureReason,
        detail: impl Into<String>,
    ) -> Self {
        Self::failed_with_output(node_id, reason, detail, "", "")
    }

    /// Failed outcome that still captured output from the child process.
    pub fn failed_with_output(
        node_id: impl Into<String>,
        reason: FailureReason,
        detail: impl Into<String>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            status: NodeStatus::Failed {
                reason,
                detail: detail.into(),
            },
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Whether this node's run counts as a success.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// The per-node outcome map produced by one cluster run.
///
/// Contains exactly one entry per input node. There is no cluster-wide
/// failure state; callers wanting an aggregate verdict compute it from the
/// per-node statuses (or use [`ClusterRunReport::exit_code`]).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ClusterRunReport {
    results: BTreeMap<String, ExecutionResult>,
}

impl ClusterRunReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one node's result under its own key.
    pub fn insert(&mut self, result: ExecutionResult) {
        self.results.insert(result.node_id.clone(), result);
    }

    /// Number of recorded nodes.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the report is empty.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Look up one node's result.
    pub fn get(&self, node_id: &str) -> Option<&ExecutionResult> {
        self.results.get(node_id)
    }

    /// Iterate results ordered by node id.
    pub fn results(&self) -> impl Iterator<Item = &ExecutionResult> {
        self.results.values()
    }

    /// Recorded node ids, ordered.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.results.keys().map(String::as_str)
    }

    /// Number of nodes whose status is `Failed`.
    pub fn failed_count(&self) -> usize {
        self.results.values().filter(|r| !r.is_success()).count()
    }

    /// Whether every node succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.failed_count() == 0
    }

    /// Deterministic process exit code for the run: zero when every node
    /// succeeded, `2` when any node failed.
    pub fn exit_code(&self) -> i32 {
        if self.all_succeeded() {
            0
        } else {
            2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_report_aggregation() {
        let mut report = ClusterRunReport::new();
        report.insert(ExecutionResult::succeeded("node-1", "ok\n", ""));
        report.insert(ExecutionResult::failed(
            "node-2",
            FailureReason::NoNetwork,
            "node is not attached to any network",
        ));

        assert_eq!(report.len(), 2);
        assert_eq!(report.failed_count(), 1);
        assert!(!report.all_succeeded());
        assert_eq!(report.exit_code(), 2);
        assert!(report.get("node-1").unwrap().is_success());
    }

    #[test]
    fn test_empty_report_exit_code() {
        let report = ClusterRunReport::new();
        assert!(report.is_empty());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_json_shape() {
        let mut report = ClusterRunReport::new();
        report.insert(ExecutionResult::succeeded("node-1", "hi\n", "warn\n"));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["node-1"]["status"], "succeeded");
        assert_eq!(json["node-1"]["exit_code"], 0);
        assert_eq!(json["node-1"]["stderr"], "warn\n");
    }

    #[test]
    fn test_failed_json_shape() {
        let mut report = ClusterRunReport::new();
        report.insert(ExecutionResult::failed(
            "node-2",
            FailureReason::AmbiguousAddress,
            "more than one match",
        ));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["node-2"]["status"], "failed");
        assert_eq!(json["node-2"]["reason"], "ambiguous_address");
    }
}
