//! Concurrent fan-out of one script run per cluster node.
//!
//! The coordinator launches one independent unit of work per node, gated by
//! a semaphore so very large clusters do not spawn an unbounded number of
//! in-flight ssh sessions. Each unit resolves the node's address and, only
//! on success, invokes the script runner. The coordinator joins every unit
//! before returning; no unit observes another's result and no unit's failure
//! cancels any other.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::error::FailureReason;
use crate::inventory::NodeAddresses;
use crate::report::{ClusterRunReport, ExecutionResult};
use crate::resolver;
use crate::runner::{ExecutionRequest, RunSpec, ScriptRunner};

/// Default bound on concurrently running nodes.
pub const DEFAULT_FORKS: usize = 5;

/// Orchestrates one resolver + runner pass per node.
pub struct ExecutionCoordinator {
    runner: Arc<dyn ScriptRunner>,
    forks: usize,
}

impl ExecutionCoordinator {
    /// Coordinator with the default concurrency bound.
    pub fn new(runner: Arc<dyn ScriptRunner>) -> Self {
        Self {
            runner,
            forks: DEFAULT_FORKS,
        }
    }

    /// Set the maximum number of nodes worked on in parallel (minimum one).
    pub fn with_forks(mut self, forks: usize) -> Self {
        self.forks = forks.max(1);
        self
    }

    /// Run the spec's script on every node in `inventory`.
    ///
    /// Returns only after every node has finished, with exactly one
    /// [`ExecutionResult`] per input node. There is no cluster-wide failure
    /// state; per-node failures are recorded, never propagated.
    pub async fn run_on_cluster(
        &self,
        inventory: &[NodeAddresses],
        spec: RunSpec,
    ) -> ClusterRunReport {
        let spec = Arc::new(spec);
        let semaphore = Arc::new(Semaphore::new(self.forks));
        info!(
            nodes = inventory.len(),
            forks = self.forks,
            "starting cluster run"
        );

        let mut handles = Vec::with_capacity(inventory.len());
        for node in inventory {
            let node_id = node.id.clone();
            let node = node.clone();
            let spec = Arc::clone(&spec);
            let runner = Arc::clone(&self.runner);
            let semaphore = Arc::clone(&semaphore);

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("Semaphore should not be closed");
                run_one(runner.as_ref(), node, spec).await
            });
            handles.push((node_id, handle));
        }

        // Results funnel into the report through this single collector; the
        // workers themselves share no mutable state.
        let mut report = ClusterRunReport::new();
        for (node_id, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => ExecutionResult::failed(
                    &node_id,
                    FailureReason::RemoteCommandError,
                    format!("worker task failed: {e}"),
                ),
            };
            report.insert(result);
        }

        info!(
            nodes = report.len(),
            failed = report.failed_count(),
            "cluster run complete"
        );
        report
    }
}

/// One node's unit of work: resolve, then (only on success) run.
async fn run_one(
    runner: &dyn ScriptRunner,
    node: NodeAddresses,
    spec: Arc<RunSpec>,
) -> ExecutionResult {
    let address = match resolver::resolve(&node.addresses, &spec.filter()) {
        Ok(address) => address,
        Err(e) => {
            debug!(node = %node.id, error = %e, "address resolution failed");
            return ExecutionResult::failed(&node.id, FailureReason::from(&e), e.to_string());
        }
    };

    debug!(node = %node.id, %address, "resolved node address");
    let request = ExecutionRequest {
        node_id: node.id,
        spec,
    };
    runner.run(&request, &address).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{AddressKind, AddressRecord, IpVersion};
    use crate::report::NodeStatus;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counting stub runner; fails nodes listed in `fail_nodes`.
    struct StubRunner {
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        fail_nodes: HashSet<String>,
        delay: Option<Duration>,
    }

    impl StubRunner {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                fail_nodes: HashSet::new(),
                delay: None,
            }
        }

        fn failing(nodes: &[&str]) -> Self {
            let mut stub = Self::new();
            stub.fail_nodes = nodes.iter().map(|n| n.to_string()).collect();
            stub
        }

        fn with_delay(delay: Duration) -> Self {
            let mut stub = Self::new();
            stub.delay = Some(delay);
            stub
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ScriptRunner for StubRunner {
        async fn run(&self, request: &ExecutionRequest, address: &str) -> ExecutionResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail_nodes.contains(&request.node_id) {
                ExecutionResult::failed_with_output(
                    &request.node_id,
                    FailureReason::RemoteCommandError,
                    "exit code 1",
                    "",
                    "simulated remote failure\n",
                )
            } else {
                ExecutionResult::succeeded(&request.node_id, format!("ran on {address}\n"), "")
            }
        }
    }

    fn node_with_floating_v4(id: &str, network: &str, addr: &str) -> NodeAddresses {
        let mut node = NodeAddresses::new(id);
        node.addresses.insert(
            network.to_string(),
            vec![AddressRecord {
                addr: addr.to_string(),
                version: IpVersion::V4,
                kind: AddressKind::Floating,
            }],
        );
        node
    }

    #[tokio::test]
    async fn test_one_result_per_node() {
        let inventory = vec![
            node_with_floating_v4("node-1", "private", "10.0.0.1"),
            node_with_floating_v4("node-2", "private", "10.0.0.2"),
            NodeAddresses::new("node-3"),
        ];

        let runner = Arc::new(StubRunner::new());
        let coordinator = ExecutionCoordinator::new(runner);
        let report = coordinator
            .run_on_cluster(&inventory, RunSpec::new("uptime"))
            .await;

        assert_eq!(report.len(), inventory.len());
        let ids: HashSet<&str> = report.node_ids().collect();
        assert_eq!(ids, HashSet::from(["node-1", "node-2", "node-3"]));
    }

    #[tokio::test]
    async fn test_resolver_failure_skips_runner() {
        // Every node fails resolution, so the runner must never be invoked.
        let inventory = vec![NodeAddresses::new("node-1"), NodeAddresses::new("node-2")];

        let runner = Arc::new(StubRunner::new());
        let coordinator = ExecutionCoordinator::new(Arc::clone(&runner) as Arc<dyn ScriptRunner>);
        let report = coordinator
            .run_on_cluster(&inventory, RunSpec::new("uptime"))
            .await;

        assert_eq!(runner.call_count(), 0);
        for result in report.results() {
            match &result.status {
                NodeStatus::Failed { reason, .. } => {
                    assert_eq!(*reason, FailureReason::NoNetwork);
                }
                other => panic!("expected resolver failure, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_node_failures_are_independent() {
        let inventory = vec![
            node_with_floating_v4("node-1", "private", "10.0.0.1"),
            node_with_floating_v4("node-2", "private", "10.0.0.2"),
            node_with_floating_v4("node-3", "private", "10.0.0.3"),
        ];

        let runner = Arc::new(StubRunner::failing(&["node-2"]));
        let coordinator = ExecutionCoordinator::new(runner);
        let report = coordinator
            .run_on_cluster(&inventory, RunSpec::new("uptime"))
            .await;

        assert!(report.get("node-1").unwrap().is_success());
        assert!(!report.get("node-2").unwrap().is_success());
        assert!(report.get("node-3").unwrap().is_success());
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_empty_inventory_yields_empty_report() {
        let runner = Arc::new(StubRunner::new());
        let coordinator = ExecutionCoordinator::new(runner);
        let report = coordinator.run_on_cluster(&[], RunSpec::new("uptime")).await;

        assert!(report.is_empty());
        assert_eq!(report.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_forks_bound_concurrency() {
        let inventory: Vec<NodeAddresses> = (0..8)
            .map(|i| node_with_floating_v4(&format!("node-{i}"), "private", &format!("10.0.0.{i}")))
            .collect();

        let runner = Arc::new(StubRunner::with_delay(Duration::from_millis(30)));
        let coordinator =
            ExecutionCoordinator::new(Arc::clone(&runner) as Arc<dyn ScriptRunner>).with_forks(2);
        let report = coordinator
            .run_on_cluster(&inventory, RunSpec::new("uptime"))
            .await;

        assert_eq!(report.len(), 8);
        assert!(runner.max_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_shared_filters_apply_per_node() {
        // node-1 resolves; node-2 only has a fixed address, so the shared
        // floating filter rejects it without touching node-1's outcome.
        let mut node2 = NodeAddresses::new("node-2");
        node2.addresses.insert(
            "private".to_string(),
            vec![AddressRecord {
                addr: "10.0.0.2".to_string(),
                version: IpVersion::V4,
                kind: AddressKind::Fixed,
            }],
        );
        let inventory = vec![node_with_floating_v4("node-1", "private", "10.0.0.1"), node2];

        let runner = Arc::new(StubRunner::new());
        let coordinator = ExecutionCoordinator::new(Arc::clone(&runner) as Arc<dyn ScriptRunner>);
        let report = coordinator
            .run_on_cluster(&inventory, RunSpec::new("uptime"))
            .await;

        assert!(report.get("node-1").unwrap().is_success());
        match &report.get("node-2").unwrap().status {
            NodeStatus::Failed { reason, .. } => {
                assert_eq!(*reason, FailureReason::NoMatchingAddress);
            }
            other => panic!("expected NoMatchingAddress, got {other:?}"),
        }
        assert_eq!(runner.call_count(), 1);
    }
}
