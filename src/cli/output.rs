//! Output formatting for clusterun
//!
//! Renders the per-node run report as colored human-readable blocks or as
//! JSON for scripting.

use colored::Colorize;

use clusterun::error::ResolveError;
use clusterun::report::{ClusterRunReport, NodeStatus};

/// Output formatter for different output modes
pub struct OutputFormatter {
    /// Use colored output
    use_color: bool,
    /// JSON output mode
    json_mode: bool,
    /// Verbosity level
    verbosity: u8,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(use_color: bool, json_mode: bool, verbosity: u8) -> Self {
        // Respect NO_COLOR environment variable
        let use_color = use_color && std::env::var("NO_COLOR").is_err();

        Self {
            use_color,
            json_mode,
            verbosity,
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "ERROR:".red().bold(), message);
        } else {
            eprintln!("ERROR: {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.json_mode {
            return;
        }
        if self.use_color {
            eprintln!("{} {}", "WARNING:".yellow(), message);
        } else {
            eprintln!("WARNING: {}", message);
        }
    }

    /// Print an informational message
    pub fn info(&self, message: &str) {
        if self.json_mode {
            return;
        }
        println!("{}", message);
    }

    /// Print a debug message (verbosity >= 2)
    pub fn debug(&self, message: &str) {
        if self.json_mode || self.verbosity < 2 {
            return;
        }
        if self.use_color {
            println!("{} {}", "DEBUG:".cyan(), message);
        } else {
            println!("DEBUG: {}", message);
        }
    }

    /// Render the full cluster run report.
    pub fn report(&self, report: &ClusterRunReport) {
        if self.json_mode {
            match serde_json::to_string_pretty(report) {
                Ok(json) => println!("{}", json),
                Err(e) => self.error(&format!("failed to serialize report: {}", e)),
            }
            return;
        }

        for result in report.results() {
            self.node_header(&result.node_id);

            match &result.status {
                NodeStatus::Succeeded { exit_code } => {
                    println!("status: {} (exit code {})", self.ok("succeeded"), exit_code);
                }
                NodeStatus::Failed { reason, detail } => {
                    println!("status: {}", self.fail("failed"));
                    println!("reason: {}: {}", reason.as_str(), detail);
                }
            }

            if !result.stdout.is_empty() {
                println!("stdout:\n{}", result.stdout.trim_end());
            }
            if !result.stderr.is_empty() {
                println!("stderr:\n{}", result.stderr.trim_end());
            }
            println!();
        }

        let succeeded = report.len() - report.failed_count();
        let summary = format!("{} of {} nodes succeeded", succeeded, report.len());
        if report.all_succeeded() {
            println!("{}", self.ok(&summary));
        } else {
            println!("{}", self.fail(&summary));
        }
    }

    /// Render the outcome of a resolve-only pass.
    pub fn resolve_report(&self, outcomes: &[(String, Result<String, ResolveError>)]) {
        if self.json_mode {
            let value: serde_json::Value = outcomes
                .iter()
                .map(|(node_id, outcome)| {
                    let entry = match outcome {
                        Ok(address) => serde_json::json!({ "address": address }),
                        Err(e) => serde_json::json!({
                            "reason": clusterun::error::FailureReason::from(e).as_str(),
                            "detail": e.to_string(),
                        }),
                    };
                    (node_id.clone(), entry)
                })
                .collect::<serde_json::Map<String, serde_json::Value>>()
                .into();
            match serde_json::to_string_pretty(&value) {
                Ok(json) => println!("{}", json),
                Err(e) => self.error(&format!("failed to serialize report: {}", e)),
            }
            return;
        }

        for (node_id, outcome) in outcomes {
            match outcome {
                Ok(address) => println!("{}: {}", node_id, self.ok(address)),
                Err(e) => println!("{}: {} ({})", node_id, self.fail("unresolvable"), e),
            }
        }
    }

    fn node_header(&self, node_id: &str) {
        let line = "-".repeat(node_id.len() + 6);
        if self.use_color {
            println!("{}", line.bright_blue());
            println!("{}", format!("node {}", node_id).bright_blue().bold());
            println!("{}", line.bright_blue());
        } else {
            println!("{}", line);
            println!("node {}", node_id);
            println!("{}", line);
        }
    }

    fn ok(&self, text: &str) -> String {
        if self.use_color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    fn fail(&self, text: &str) -> String {
        if self.use_color {
            text.red().bold().to_string()
        } else {
            text.to_string()
        }
    }
}
