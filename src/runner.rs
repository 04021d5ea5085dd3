//! Remote script execution over an ssh child process.
//!
//! [`SshScriptRunner`] builds an invocation equivalent to
//! `ssh -<4|6> -p<port> [-i <identity>] <options> <user>@<address> <script>`,
//! spawns it, captures both output streams fully, and classifies the exit.
//! It never returns an error: every failure mode is encoded in the
//! [`ExecutionResult`], so one node's trouble can never unwind another's.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, trace, warn};

use crate::error::FailureReason;
use crate::inventory::{AddressKind, IpVersion};
use crate::report::ExecutionResult;
use crate::resolver::AddressFilter;

/// Everything one run shares across nodes: filters, connection parameters,
/// and the script body. An [`ExecutionRequest`] is this plus a node id.
#[derive(Debug, Clone)]
pub struct RunSpec {
    /// Network filter; `None` means auto-select.
    pub network: Option<String>,
    /// Address type filter.
    pub kind: AddressKind,
    /// IP version filter.
    pub version: IpVersion,
    /// Remote ssh port.
    pub port: u16,
    /// Remote user.
    pub user: String,
    /// Identity file passed with `-i`, if any.
    pub identity_file: Option<PathBuf>,
    /// Extra options appended to the ssh invocation.
    pub ssh_options: Vec<String>,
    /// Full script text, shared read-only across all nodes.
    pub script: Arc<str>,
    /// Optional per-node timeout; a node that exceeds it is recorded as
    /// `Failed(Timeout, ...)` rather than hanging the run.
    pub timeout: Option<Duration>,
}

impl RunSpec {
    /// Create a spec for the given script body with default parameters.
    pub fn new(script: impl Into<Arc<str>>) -> Self {
        Self {
            network: None,
            kind: AddressKind::Floating,
            version: IpVersion::V4,
            port: 22,
            user: "root".to_string(),
            identity_file: None,
            ssh_options: Vec::new(),
            script: script.into(),
            timeout: None,
        }
    }

    /// Create a spec from a script file on disk.
    ///
    /// A read failure here is fatal to the whole run; it happens before any
    /// node is attempted.
    pub fn from_script_file(path: &Path) -> crate::error::Result<Self> {
        if !path.exists() {
            return Err(crate::error::Error::ScriptNotFound(path.to_path_buf()));
        }
        let script = std::fs::read_to_string(path)
            .map_err(|e| crate::error::Error::script_read(path, e.to_string()))?;
        Ok(Self::new(script))
    }

    /// The address selection filters carried by this spec.
    pub fn filter(&self) -> AddressFilter {
        AddressFilter {
            network: self.network.clone(),
            kind: self.kind,
            version: self.version,
        }
    }
}

/// One node's immutable execution request.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    /// Target node id.
    pub node_id: String,
    /// Shared run parameters.
    pub spec: Arc<RunSpec>,
}

/// Executes one script against one resolved address.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    /// Run the request's script against `address`.
    ///
    /// Never errors: all failure modes are encoded in the returned result.
    async fn run(&self, request: &ExecutionRequest, address: &str) -> ExecutionResult;
}

/// Runs scripts through the system ssh client.
#[derive(Debug, Clone)]
pub struct SshScriptRunner {
    /// The ssh executable to invoke.
    program: PathBuf,
}

impl SshScriptRunner {
    /// Runner using `ssh` from `PATH`.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("ssh"),
        }
    }

    /// Runner using an alternative ssh executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The configured ssh executable.
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn build_command(&self, spec: &RunSpec, address: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(spec.version.ssh_flag());
        cmd.arg(format!("-p{}", spec.port));
        if let Some(identity) = &spec.identity_file {
            cmd.arg("-i").arg(identity);
        }
        cmd.args(&spec.ssh_options);
        cmd.arg(format!("{}@{}", spec.user, address));
        cmd.arg(spec.script.as_ref());
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Reap the child if we stop waiting on a timeout.
            .kill_on_drop(true);
        cmd
    }
}

impl Default for SshScriptRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScriptRunner for SshScriptRunner {
    async fn run(&self, request: &ExecutionRequest, address: &str) -> ExecutionResult {
        let spec = request.spec.as_ref();
        debug!(node = %request.node_id, %address, "spawning remote script");

        let mut cmd = self.build_command(spec, address);
        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                return ExecutionResult::failed(
                    &request.node_id,
                    FailureReason::RemoteCommandError,
                    format!("failed to launch '{}': {}", self.program.display(), e),
                );
            }
        };

        let wait = child.wait_with_output();
        let output = if let Some(timeout) = spec.timeout {
            match tokio::time::timeout(timeout, wait).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(node = %request.node_id, %address, "remote script timed out");
                    return ExecutionResult::failed(
                        &request.node_id,
                        FailureReason::Timeout,
                        format!("no result after {} seconds", timeout.as_secs()),
                    );
                }
            }
        } else {
            wait.await
        };

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                return ExecutionResult::failed(
                    &request.node_id,
                    FailureReason::RemoteCommandError,
                    format!("failed to wait for process: {e}"),
                );
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code().unwrap_or(-1);
        trace!(node = %request.node_id, exit_code, stdout_len = stdout.len(), stderr_len = stderr.len(), "remote script completed");

        if output.status.success() {
            ExecutionResult::succeeded(&request.node_id, stdout, stderr)
        } else {
            ExecutionResult::failed_with_output(
                &request.node_id,
                FailureReason::RemoteCommandError,
                format!("exit code {exit_code}"),
                stdout,
                stderr,
            )
        }
    }
}
