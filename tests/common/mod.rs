//! Shared fixtures for integration tests.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Write an executable stand-in for the ssh client into `dir`.
///
/// The stand-in receives the same argument vector a real ssh invocation
/// would (`-4 -p22 ... user@addr <script>`), so `$#` and positional
/// arguments can be inspected from the body.
pub fn fake_ssh(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-ssh");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Write an inventory JSON document into `dir`.
pub fn inventory_file(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("nodes.json");
    std::fs::write(&path, json).unwrap();
    path
}

/// Write a script file into `dir`.
pub fn script_file(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("script.sh");
    std::fs::write(&path, body).unwrap();
    path
}

/// Two-node inventory: node-a has one floating IPv4 address on "private",
/// node-b is attached to nothing.
pub const TWO_NODE_INVENTORY: &str = r#"[
    {
        "id": "node-a",
        "addresses": {
            "private": [
                {"addr": "10.0.0.10", "version": 4, "OS-EXT-IPS:type": "floating"}
            ]
        }
    },
    {
        "id": "node-b",
        "addresses": {}
    }
]"#;
